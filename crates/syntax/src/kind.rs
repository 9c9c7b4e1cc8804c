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

//! The node-kind vocabulary of the input trees.
//!
//! Names follow the `ast\AST_*` constants of php-ast; the `AST_` prefix is stripped on input and
//! restored on display.

use std::fmt::Display;
use std::str::FromStr;
use strum::{EnumIter, EnumString, IntoStaticStr};

/// The php-ast AST version whose child names and flag encodings this crate decodes.
pub const AST_VERSION: u32 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    // Declarations
    FuncDecl,
    Closure,
    Method,
    ArrowFunc,
    Class,

    // Lists
    ArgList,
    Array,
    CatchList,
    ClassConstDecl,
    ClosureUses,
    ConstDecl,
    EncapsList,
    ExprList,
    If,
    MatchArmList,
    NameList,
    ParamList,
    PropDecl,
    StmtList,
    SwitchList,
    TraitAdaptations,
    Use,
    TypeUnion,
    TypeIntersection,

    // No children
    MagicConst,
    Type,
    CallableConvert,

    // One child
    Var,
    Const,
    Unpack,
    UnaryOp,
    Cast,
    Empty,
    Isset,
    ShellExec,
    Clone,
    Exit,
    Print,
    IncludeOrEval,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    YieldFrom,
    ClassName,
    Global,
    Unset,
    Return,
    Label,
    Ref,
    HaltCompiler,
    Echo,
    Throw,
    Goto,
    Break,
    Continue,
    Name,
    ClosureVar,
    NullableType,

    // Two children
    Dim,
    Prop,
    NullsafeProp,
    StaticProp,
    Call,
    ClassConst,
    Assign,
    AssignRef,
    AssignOp,
    BinaryOp,
    ArrayElem,
    New,
    Instanceof,
    Yield,
    Static,
    While,
    DoWhile,
    IfElem,
    Switch,
    SwitchCase,
    Declare,
    UseTrait,
    TraitPrecedence,
    MethodReference,
    Namespace,
    UseElem,
    TraitAlias,
    GroupUse,
    MatchArm,
    NamedArg,
    ClassConstGroup,
    ConstElem,
    PropElem,
    PropGroup,

    // Three or more children
    MethodCall,
    NullsafeMethodCall,
    StaticCall,
    Conditional,
    Try,
    Catch,
    Param,
    Match,
    EnumCase,
    For,
    Foreach,

    // Kinds from earlier AST versions, translated on input.
    And,
    Or,
    Coalesce,
    Greater,
    GreaterEqual,
    UnaryPlus,
    UnaryMinus,
    Silence,
    List,
}

impl Kind {
    /// Parse a kind name, with or without the `AST_` prefix.
    pub fn from_name(name: &str) -> Option<Self> {
        let bare = name.strip_prefix("AST_").unwrap_or(name);
        Self::from_str(bare).ok()
    }

    /// Kinds that only exist in earlier versions of the vocabulary.
    pub fn is_legacy(&self) -> bool {
        matches!(
            self,
            Self::And
                | Self::Or
                | Self::Coalesce
                | Self::Greater
                | Self::GreaterEqual
                | Self::UnaryPlus
                | Self::UnaryMinus
                | Self::Silence
                | Self::List
        )
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        write!(f, "AST_{name}")
    }
}
