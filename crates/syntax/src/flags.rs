// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Strongly typed views of the `flags` integer, one type per family of kinds.
//!
//! The same integer means different things under different kinds, so every node kind that
//! carries meaningful flags resolves them through exactly one of these types. Values are the
//! `ast\flags\*` constants of php-ast (AST version 85, PHP 8.x).

use std::fmt::Display;
use strum::{EnumIter, FromRepr};

/// Raw flag constants, as emitted by php-ast.
pub mod raw {
    pub const NAME_FQ: u32 = 0;
    pub const NAME_NOT_FQ: u32 = 1;
    pub const NAME_RELATIVE: u32 = 2;

    pub const MODIFIER_PUBLIC: u32 = 1;
    pub const MODIFIER_PROTECTED: u32 = 2;
    pub const MODIFIER_PRIVATE: u32 = 4;
    pub const MODIFIER_STATIC: u32 = 16;
    pub const MODIFIER_FINAL: u32 = 32;
    pub const MODIFIER_ABSTRACT: u32 = 64;
    pub const MODIFIER_READONLY: u32 = 128;

    pub const FUNC_RETURNS_REF: u32 = 4096;
    pub const FUNC_GENERATOR: u32 = 16_777_216;

    pub const ARRAY_ELEM_REF: u32 = 1;
    pub const CLOSURE_USE_REF: u32 = 1;

    pub const CLASS_INTERFACE: u32 = 1;
    pub const CLASS_TRAIT: u32 = 2;
    pub const CLASS_ANONYMOUS: u32 = 4;
    pub const CLASS_FINAL: u32 = 32;
    pub const CLASS_ABSTRACT: u32 = 64;
    pub const CLASS_READONLY: u32 = 65_536;
    pub const CLASS_ENUM: u32 = 268_435_456;

    pub const PARAM_REF: u32 = 8;
    pub const PARAM_VARIADIC: u32 = 16;

    pub const ARRAY_SYNTAX_LIST: u32 = 1;
    pub const ARRAY_SYNTAX_LONG: u32 = 2;
    pub const ARRAY_SYNTAX_SHORT: u32 = 3;
}

/// Operators of `AST_BINARY_OP`, also used by `AST_ASSIGN_OP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u32)]
pub enum BinaryOp {
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    Mod = 5,
    ShiftLeft = 6,
    ShiftRight = 7,
    Concat = 8,
    BitwiseOr = 9,
    BitwiseAnd = 10,
    BitwiseXor = 11,
    Pow = 12,
    BoolXor = 15,
    IsIdentical = 16,
    IsNotIdentical = 17,
    IsEqual = 18,
    IsNotEqual = 19,
    IsSmaller = 20,
    IsSmallerOrEqual = 21,
    Spaceship = 170,
    IsGreater = 256,
    IsGreaterOrEqual = 257,
    BoolOr = 258,
    BoolAnd = 259,
    Coalesce = 260,
}

impl BinaryOp {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Concat => ".",
            Self::BitwiseOr => "|",
            Self::BitwiseAnd => "&",
            Self::BitwiseXor => "^",
            Self::Pow => "**",
            Self::BoolXor => "xor",
            Self::IsIdentical => "===",
            Self::IsNotIdentical => "!==",
            Self::IsEqual => "==",
            Self::IsNotEqual => "!=",
            Self::IsSmaller => "<",
            Self::IsSmallerOrEqual => "<=",
            Self::Spaceship => "<=>",
            Self::IsGreater => ">",
            Self::IsGreaterOrEqual => ">=",
            Self::BoolOr => "||",
            Self::BoolAnd => "&&",
            Self::Coalesce => "??",
        }
    }

    /// The compound-assignment token for this operator, if the grammar has one.
    pub fn assign_token(&self) -> Option<&'static str> {
        Some(match self {
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
            Self::Mod => "%=",
            Self::ShiftLeft => "<<=",
            Self::ShiftRight => ">>=",
            Self::Concat => ".=",
            Self::BitwiseOr => "|=",
            Self::BitwiseAnd => "&=",
            Self::BitwiseXor => "^=",
            Self::Pow => "**=",
            Self::Coalesce => "??=",
            _ => return None,
        })
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Operators of `AST_UNARY_OP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u32)]
pub enum UnaryOp {
    BitwiseNot = 13,
    BoolNot = 14,
    Silence = 260,
    Plus = 261,
    Minus = 262,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BitwiseNot => write!(f, "~"),
            Self::BoolNot => write!(f, "!"),
            Self::Silence => write!(f, "@"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
        }
    }
}

/// Increment and decrement, which php-ast encodes as four distinct kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum IncDec {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl IncDec {
    pub fn is_prefix(&self) -> bool {
        matches!(self, Self::PreInc | Self::PreDec)
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::PreInc | Self::PostInc => "++",
            Self::PreDec | Self::PostDec => "--",
        }
    }
}

/// Target types of `AST_CAST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u32)]
pub enum CastType {
    Null = 1,
    Long = 4,
    Double = 5,
    String = 6,
    Array = 7,
    Object = 8,
    Bool = 18,
}

impl Display for CastType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Null => "unset",
            Self::Long => "int",
            Self::Double => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Bool => "bool",
        };
        write!(f, "({name})")
    }
}

/// Builtin types of `AST_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u32)]
pub enum TypeFlag {
    Null = 1,
    False = 2,
    True = 3,
    Long = 4,
    Double = 5,
    String = 6,
    Array = 7,
    Object = 8,
    Callable = 12,
    Iterable = 13,
    Void = 14,
    Static = 15,
    Mixed = 16,
    Never = 17,
    Bool = 18,
}

impl Display for TypeFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::False => "false",
            Self::True => "true",
            Self::Long => "int",
            Self::Double => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Callable => "callable",
            Self::Iterable => "iterable",
            Self::Void => "void",
            Self::Static => "static",
            Self::Mixed => "mixed",
            Self::Never => "never",
            Self::Bool => "bool",
        };
        write!(f, "{name}")
    }
}

/// `AST_MAGIC_CONST`; the values are the PHP 8.0 tokenizer's `T_*` numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u32)]
pub enum MagicConst {
    Line = 341,
    File = 342,
    Dir = 343,
    Class = 344,
    Trait = 345,
    Method = 346,
    Function = 347,
    Namespace = 348,
}

impl Display for MagicConst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Line => "__LINE__",
            Self::File => "__FILE__",
            Self::Dir => "__DIR__",
            Self::Class => "__CLASS__",
            Self::Trait => "__TRAIT__",
            Self::Method => "__METHOD__",
            Self::Function => "__FUNCTION__",
            Self::Namespace => "__NAMESPACE__",
        };
        write!(f, "{name}")
    }
}

/// `AST_INCLUDE_OR_EVAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u32)]
pub enum IncludeKind {
    Eval = 1,
    Include = 2,
    IncludeOnce = 4,
    Require = 8,
    RequireOnce = 16,
}

impl Display for IncludeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Eval => "eval",
            Self::Include => "include",
            Self::IncludeOnce => "include_once",
            Self::Require => "require",
            Self::RequireOnce => "require_once",
        };
        write!(f, "{name}")
    }
}

/// Symbol class imported by `AST_USE`, `AST_GROUP_USE` and `AST_USE_ELEM`.
/// `Unspecified` only appears on group-use declarations whose elements carry their own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u32)]
pub enum UseKind {
    Unspecified = 0,
    Normal = 1,
    Function = 2,
    Const = 4,
}

impl UseKind {
    /// The keyword following `use`, with its trailing space.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Unspecified | Self::Normal => "",
            Self::Function => "function ",
            Self::Const => "const ",
        }
    }
}

/// Qualification of `AST_NAME`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u32)]
pub enum NameKind {
    FullyQualified = 0,
    NotFullyQualified = 1,
    Relative = 2,
}

/// Spelling of `AST_ARRAY`. php-ast leaves the flags at zero for some array positions; those
/// render with the short syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u32)]
pub enum ArraySyntax {
    Unspecified = 0,
    List = 1,
    Long = 2,
    Short = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

/// Member modifiers, resolved bit category by bit category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_readonly: bool,
}

impl Modifiers {
    pub const MASK: u32 = raw::MODIFIER_PUBLIC
        | raw::MODIFIER_PROTECTED
        | raw::MODIFIER_PRIVATE
        | raw::MODIFIER_STATIC
        | raw::MODIFIER_FINAL
        | raw::MODIFIER_ABSTRACT
        | raw::MODIFIER_READONLY;

    /// Resolve the modifier bits of `flags`. Returns `None` for bits outside the modifier set and
    /// for combinations the grammar cannot produce (two visibilities, abstract with final).
    pub fn from_bits(flags: u32) -> Option<Self> {
        if flags & !Self::MASK != 0 {
            return None;
        }
        let visibility = match flags
            & (raw::MODIFIER_PUBLIC | raw::MODIFIER_PROTECTED | raw::MODIFIER_PRIVATE)
        {
            0 => None,
            raw::MODIFIER_PUBLIC => Some(Visibility::Public),
            raw::MODIFIER_PROTECTED => Some(Visibility::Protected),
            raw::MODIFIER_PRIVATE => Some(Visibility::Private),
            _ => return None,
        };
        let modifiers = Self {
            visibility,
            is_static: flags & raw::MODIFIER_STATIC != 0,
            is_abstract: flags & raw::MODIFIER_ABSTRACT != 0,
            is_final: flags & raw::MODIFIER_FINAL != 0,
            is_readonly: flags & raw::MODIFIER_READONLY != 0,
        };
        if modifiers.is_abstract && modifiers.is_final {
            return None;
        }
        Some(modifiers)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Keywords in declaration order: `abstract|final`, visibility, `static`, `readonly`.
    pub fn keywords(&self) -> Vec<&'static str> {
        let mut words = Vec::with_capacity(4);
        if self.is_abstract {
            words.push("abstract");
        }
        if self.is_final {
            words.push("final");
        }
        if let Some(visibility) = self.visibility {
            words.push(visibility.keyword());
        }
        if self.is_static {
            words.push("static");
        }
        if self.is_readonly {
            words.push("readonly");
        }
        words
    }
}

impl Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keywords().join(" "))
    }
}

/// Flags of functions, closures, arrow functions and methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FuncFlags {
    pub returns_ref: bool,
    /// Only set for methods.
    pub modifiers: Modifiers,
}

impl FuncFlags {
    /// Functions and closures accept the by-ref and generator bits; closures also `static`.
    pub fn for_function(flags: u32, allow_static: bool) -> Option<Self> {
        let mut allowed = raw::FUNC_RETURNS_REF | raw::FUNC_GENERATOR;
        if allow_static {
            allowed |= raw::MODIFIER_STATIC;
        }
        if flags & !allowed != 0 {
            return None;
        }
        Some(Self {
            returns_ref: flags & raw::FUNC_RETURNS_REF != 0,
            modifiers: Modifiers {
                is_static: flags & raw::MODIFIER_STATIC != 0,
                ..Default::default()
            },
        })
    }

    pub fn for_method(flags: u32) -> Option<Self> {
        let modifiers =
            Modifiers::from_bits(flags & !(raw::FUNC_RETURNS_REF | raw::FUNC_GENERATOR))?;
        if modifiers.is_readonly {
            return None;
        }
        Some(Self {
            returns_ref: flags & raw::FUNC_RETURNS_REF != 0,
            modifiers,
        })
    }
}

/// Flags of `AST_PARAM`: by-reference, variadic, and constructor promotion modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParamFlags {
    pub by_ref: bool,
    pub variadic: bool,
    pub promotion: Modifiers,
}

impl ParamFlags {
    pub fn from_bits(flags: u32) -> Option<Self> {
        let rest = flags & !(raw::PARAM_REF | raw::PARAM_VARIADIC);
        let promotion = Modifiers::from_bits(rest)?;
        if promotion.is_static || promotion.is_abstract || promotion.is_final {
            return None;
        }
        Some(Self {
            by_ref: flags & raw::PARAM_REF != 0,
            variadic: flags & raw::PARAM_VARIADIC != 0,
            promotion,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl Display for ClassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Interface => write!(f, "interface"),
            Self::Trait => write!(f, "trait"),
            Self::Enum => write!(f, "enum"),
        }
    }
}

/// Flags of `AST_CLASS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassFlags {
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_readonly: bool,
    pub is_anonymous: bool,
}

impl ClassFlags {
    pub fn from_bits(flags: u32) -> Option<Self> {
        let known = raw::CLASS_INTERFACE
            | raw::CLASS_TRAIT
            | raw::CLASS_ANONYMOUS
            | raw::CLASS_FINAL
            | raw::CLASS_ABSTRACT
            | raw::CLASS_READONLY
            | raw::CLASS_ENUM;
        if flags & !known != 0 {
            return None;
        }
        let kind = match flags & (raw::CLASS_INTERFACE | raw::CLASS_TRAIT | raw::CLASS_ENUM) {
            0 => ClassKind::Class,
            raw::CLASS_INTERFACE => ClassKind::Interface,
            raw::CLASS_TRAIT => ClassKind::Trait,
            raw::CLASS_ENUM => ClassKind::Enum,
            _ => return None,
        };
        let class_flags = Self {
            kind,
            is_abstract: flags & raw::CLASS_ABSTRACT != 0,
            is_final: flags & raw::CLASS_FINAL != 0,
            is_readonly: flags & raw::CLASS_READONLY != 0,
            is_anonymous: flags & raw::CLASS_ANONYMOUS != 0,
        };
        if (class_flags.is_abstract || class_flags.is_final || class_flags.is_readonly)
            && kind != ClassKind::Class
        {
            return None;
        }
        if class_flags.is_abstract && class_flags.is_final {
            return None;
        }
        Some(class_flags)
    }

    pub fn class() -> Self {
        Self {
            kind: ClassKind::Class,
            is_abstract: false,
            is_final: false,
            is_readonly: false,
            is_anonymous: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    #[test]
    fn every_binary_op_resolves_from_its_repr() {
        for op in BinaryOp::iter() {
            assert_eq!(BinaryOp::from_repr(op as u32), Some(op));
            assert!(!op.token().is_empty());
        }
        assert_eq!(BinaryOp::from_repr(0), None);
        assert_eq!(BinaryOp::from_repr(13), None);
    }

    #[test]
    fn shift_assignments_keep_their_direction() {
        assert_eq!(BinaryOp::ShiftLeft.assign_token(), Some("<<="));
        assert_eq!(BinaryOp::ShiftRight.assign_token(), Some(">>="));
        assert_eq!(BinaryOp::IsEqual.assign_token(), None);
    }

    #[test_case(raw::MODIFIER_PUBLIC, "public"; "public")]
    #[test_case(raw::MODIFIER_ABSTRACT | raw::MODIFIER_PUBLIC | raw::MODIFIER_STATIC, "abstract public static"; "abstract public static")]
    #[test_case(raw::MODIFIER_FINAL | raw::MODIFIER_PRIVATE, "final private"; "final private")]
    #[test_case(raw::MODIFIER_PROTECTED | raw::MODIFIER_READONLY, "protected readonly"; "protected readonly")]
    #[test_case(raw::MODIFIER_STATIC, "static"; "implicit visibility")]
    fn modifier_keywords(flags: u32, expected: &str) {
        assert_eq!(Modifiers::from_bits(flags).unwrap().to_string(), expected);
    }

    #[test_case(raw::MODIFIER_PUBLIC, Visibility::Public; "public")]
    #[test_case(raw::MODIFIER_PROTECTED, Visibility::Protected; "protected")]
    #[test_case(raw::MODIFIER_PRIVATE, Visibility::Private; "private")]
    fn visibility_keyword_leads_modifiers(flags: u32, visibility: Visibility) {
        let modifiers = Modifiers::from_bits(flags).unwrap();
        assert_eq!(modifiers.visibility, Some(visibility));
        assert_eq!(modifiers.keywords(), vec![visibility.keyword()]);
    }

    #[test_case(raw::MODIFIER_PUBLIC | raw::MODIFIER_PRIVATE; "two visibilities")]
    #[test_case(raw::MODIFIER_ABSTRACT | raw::MODIFIER_FINAL; "abstract and final")]
    #[test_case(1 << 9; "unknown bit")]
    fn rejects_impossible_modifiers(flags: u32) {
        assert_eq!(Modifiers::from_bits(flags), None);
    }

    #[test]
    fn param_flags() {
        let flags = ParamFlags::from_bits(raw::PARAM_REF | raw::PARAM_VARIADIC).unwrap();
        assert!(flags.by_ref && flags.variadic);
        assert!(flags.promotion.is_empty());

        let promoted =
            ParamFlags::from_bits(raw::MODIFIER_PRIVATE | raw::MODIFIER_READONLY).unwrap();
        assert_eq!(promoted.promotion.to_string(), "private readonly");
        assert_eq!(ParamFlags::from_bits(raw::MODIFIER_ABSTRACT), None);
    }

    #[test]
    fn class_flags() {
        assert_eq!(ClassFlags::from_bits(0), Some(ClassFlags::class()));
        assert_eq!(
            ClassFlags::from_bits(raw::CLASS_TRAIT).map(|f| f.kind),
            Some(ClassKind::Trait)
        );
        assert_eq!(ClassFlags::from_bits(raw::CLASS_TRAIT | raw::CLASS_FINAL), None);
        assert_eq!(ClassFlags::from_bits(raw::CLASS_TRAIT | raw::CLASS_INTERFACE), None);
    }

    #[test]
    fn closures_may_be_static_but_functions_may_not() {
        assert!(FuncFlags::for_function(raw::MODIFIER_STATIC, true).is_some());
        assert!(FuncFlags::for_function(raw::MODIFIER_STATIC, false).is_none());
        let flags = FuncFlags::for_function(raw::FUNC_RETURNS_REF, false).unwrap();
        assert!(flags.returns_ref);
    }
}
