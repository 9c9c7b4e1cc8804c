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

//! The canonical typed tree. Every kind of the targeted vocabulary maps to exactly one variant,
//! with flags already resolved into their per-kind types.

use crate::flags::{
    ArraySyntax, BinaryOp, CastType, ClassFlags, FuncFlags, IncDec, IncludeKind, MagicConst,
    Modifiers, NameKind, ParamFlags, TypeFlag, UnaryOp, UseKind,
};
use crate::kind::Kind;

/// Raw scalar children.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

/// A slot that holds either a plain identifier or a computed expression, e.g. `$name` vs `$$name`,
/// or `->prop` vs `->{$expr}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Ident(String),
    Expr(Box<Node>),
}

/// Named functions, closures and methods.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub doc_comment: Option<String>,
    pub flags: FuncFlags,
    pub params: Vec<Node>,
    /// Closure `use` variables; always empty for functions and methods.
    pub uses: Vec<Node>,
    /// `None` for abstract and interface methods.
    pub stmts: Option<Box<Node>>,
    pub return_type: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunc {
    pub doc_comment: Option<String>,
    pub params: Vec<Node>,
    pub return_type: Option<Box<Node>>,
    pub by_ref: bool,
    pub is_static: bool,
    pub expr: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// `None` for anonymous classes.
    pub name: Option<String>,
    pub doc_comment: Option<String>,
    pub flags: ClassFlags,
    pub extends: Option<Box<Node>>,
    pub implements: Vec<Node>,
    pub stmts: Box<Node>,
    /// Backing type of an enum.
    pub enum_type: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub doc_comment: Option<String>,
    pub flags: ParamFlags,
    pub type_: Option<Box<Node>>,
    pub default: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(Literal),

    FuncDecl(FuncDecl),
    Closure(FuncDecl),
    Method(FuncDecl),
    ArrowFunc(ArrowFunc),
    Class(ClassDecl),

    ArgList(Vec<Node>),
    /// Elements may be `None` for skipped positions in list destructuring (`[, $b] = ...`).
    Array {
        syntax: ArraySyntax,
        elems: Vec<Option<Node>>,
    },
    CatchList(Vec<Node>),
    ClassConstDecl(Vec<Node>),
    ClosureUses(Vec<Node>),
    ConstDecl(Vec<Node>),
    EncapsList(Vec<Node>),
    ExprList(Vec<Node>),
    If(Vec<Node>),
    MatchArmList(Vec<Node>),
    NameList(Vec<Node>),
    ParamList(Vec<Node>),
    PropDecl(Vec<Node>),
    StmtList(Vec<Node>),
    SwitchList(Vec<Node>),
    TraitAdaptations(Vec<Node>),
    Use {
        kind: UseKind,
        elems: Vec<Node>,
    },
    TypeUnion(Vec<Node>),
    TypeIntersection(Vec<Node>),

    MagicConst(MagicConst),
    Type(TypeFlag),
    CallableConvert,

    Var(Member),
    Const(Box<Node>),
    Unpack(Box<Node>),
    UnaryOp {
        op: UnaryOp,
        expr: Box<Node>,
    },
    Cast {
        to: CastType,
        expr: Box<Node>,
    },
    Empty(Box<Node>),
    Isset(Box<Node>),
    ShellExec(Box<Node>),
    Clone(Box<Node>),
    Exit(Option<Box<Node>>),
    Print(Box<Node>),
    IncludeOrEval {
        kind: IncludeKind,
        expr: Box<Node>,
    },
    IncDec {
        op: IncDec,
        var: Box<Node>,
    },
    YieldFrom(Box<Node>),
    ClassName(Box<Node>),
    Global(Box<Node>),
    Unset(Box<Node>),
    Return(Option<Box<Node>>),
    Label(String),
    Ref(Box<Node>),
    HaltCompiler,
    Echo(Box<Node>),
    Throw(Box<Node>),
    Goto(String),
    Break(Option<Box<Node>>),
    Continue(Option<Box<Node>>),
    Name {
        kind: NameKind,
        name: String,
    },
    ClosureVar {
        name: String,
        by_ref: bool,
    },
    NullableType(Box<Node>),

    Dim {
        expr: Box<Node>,
        dim: Option<Box<Node>>,
    },
    Prop {
        expr: Box<Node>,
        prop: Member,
        nullsafe: bool,
    },
    StaticProp {
        class: Box<Node>,
        prop: Member,
    },
    Call {
        expr: Box<Node>,
        args: Box<Node>,
    },
    ClassConst {
        class: Box<Node>,
        name: Member,
    },
    Assign {
        var: Box<Node>,
        expr: Box<Node>,
    },
    AssignRef {
        var: Box<Node>,
        expr: Box<Node>,
    },
    AssignOp {
        op: BinaryOp,
        var: Box<Node>,
        expr: Box<Node>,
    },
    BinaryOp {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    ArrayElem {
        value: Box<Node>,
        key: Option<Box<Node>>,
        by_ref: bool,
    },
    New {
        class: Box<Node>,
        args: Box<Node>,
    },
    Instanceof {
        expr: Box<Node>,
        class: Box<Node>,
    },
    Yield {
        value: Option<Box<Node>>,
        key: Option<Box<Node>>,
    },
    Static {
        var: Box<Node>,
        default: Option<Box<Node>>,
    },
    While {
        cond: Box<Node>,
        stmts: Box<Node>,
    },
    DoWhile {
        stmts: Box<Node>,
        cond: Box<Node>,
    },
    IfElem {
        cond: Option<Box<Node>>,
        stmts: Box<Node>,
    },
    Switch {
        cond: Box<Node>,
        cases: Vec<Node>,
    },
    SwitchCase {
        cond: Option<Box<Node>>,
        stmts: Box<Node>,
    },
    Declare {
        declares: Vec<Node>,
        stmts: Option<Box<Node>>,
    },
    UseTrait {
        traits: Vec<Node>,
        adaptations: Option<Vec<Node>>,
    },
    TraitPrecedence {
        method: Box<Node>,
        insteadof: Vec<Node>,
    },
    MethodReference {
        class: Option<Box<Node>>,
        method: String,
    },
    Namespace {
        name: Option<String>,
        stmts: Option<Box<Node>>,
    },
    UseElem {
        kind: UseKind,
        name: String,
        alias: Option<String>,
    },
    TraitAlias {
        method: Box<Node>,
        modifiers: Modifiers,
        alias: Option<String>,
    },
    GroupUse {
        kind: UseKind,
        prefix: String,
        uses: Vec<Node>,
    },
    MatchArm {
        /// `None` for the `default` arm.
        conds: Option<Vec<Node>>,
        expr: Box<Node>,
    },
    NamedArg {
        name: String,
        expr: Box<Node>,
    },
    ClassConstGroup {
        modifiers: Modifiers,
        consts: Vec<Node>,
    },
    ConstElem {
        name: String,
        value: Box<Node>,
        doc_comment: Option<String>,
    },
    PropElem {
        name: String,
        default: Option<Box<Node>>,
        doc_comment: Option<String>,
    },
    PropGroup {
        modifiers: Modifiers,
        type_: Option<Box<Node>>,
        props: Vec<Node>,
    },

    MethodCall {
        expr: Box<Node>,
        method: Member,
        args: Box<Node>,
        nullsafe: bool,
    },
    StaticCall {
        class: Box<Node>,
        method: Member,
        args: Box<Node>,
    },
    Conditional {
        cond: Box<Node>,
        /// `None` for the short form `a ?: b`.
        if_true: Option<Box<Node>>,
        if_false: Box<Node>,
    },
    Try {
        stmts: Box<Node>,
        catches: Vec<Node>,
        finally: Option<Box<Node>>,
    },
    Catch {
        types: Vec<Node>,
        var: Option<Box<Node>>,
        stmts: Box<Node>,
    },
    Param(Param),
    Match {
        cond: Box<Node>,
        arms: Vec<Node>,
    },
    EnumCase {
        name: String,
        expr: Option<Box<Node>>,
        doc_comment: Option<String>,
    },
    For {
        init: Option<Vec<Node>>,
        cond: Option<Vec<Node>>,
        step: Option<Vec<Node>>,
        stmts: Box<Node>,
    },
    Foreach {
        expr: Box<Node>,
        value: Box<Node>,
        key: Option<Box<Node>>,
        stmts: Box<Node>,
    },
}

impl Node {
    /// The canonical kind this node was decoded from. Literals have no kind of their own.
    pub fn kind(&self) -> Option<Kind> {
        let kind = match self {
            Node::Literal(_) => return None,
            Node::FuncDecl(_) => Kind::FuncDecl,
            Node::Closure(_) => Kind::Closure,
            Node::Method(_) => Kind::Method,
            Node::ArrowFunc(_) => Kind::ArrowFunc,
            Node::Class(_) => Kind::Class,
            Node::ArgList(_) => Kind::ArgList,
            Node::Array { .. } => Kind::Array,
            Node::CatchList(_) => Kind::CatchList,
            Node::ClassConstDecl(_) => Kind::ClassConstDecl,
            Node::ClosureUses(_) => Kind::ClosureUses,
            Node::ConstDecl(_) => Kind::ConstDecl,
            Node::EncapsList(_) => Kind::EncapsList,
            Node::ExprList(_) => Kind::ExprList,
            Node::If(_) => Kind::If,
            Node::MatchArmList(_) => Kind::MatchArmList,
            Node::NameList(_) => Kind::NameList,
            Node::ParamList(_) => Kind::ParamList,
            Node::PropDecl(_) => Kind::PropDecl,
            Node::StmtList(_) => Kind::StmtList,
            Node::SwitchList(_) => Kind::SwitchList,
            Node::TraitAdaptations(_) => Kind::TraitAdaptations,
            Node::Use { .. } => Kind::Use,
            Node::TypeUnion(_) => Kind::TypeUnion,
            Node::TypeIntersection(_) => Kind::TypeIntersection,
            Node::MagicConst(_) => Kind::MagicConst,
            Node::Type(_) => Kind::Type,
            Node::CallableConvert => Kind::CallableConvert,
            Node::Var(_) => Kind::Var,
            Node::Const(_) => Kind::Const,
            Node::Unpack(_) => Kind::Unpack,
            Node::UnaryOp { .. } => Kind::UnaryOp,
            Node::Cast { .. } => Kind::Cast,
            Node::Empty(_) => Kind::Empty,
            Node::Isset(_) => Kind::Isset,
            Node::ShellExec(_) => Kind::ShellExec,
            Node::Clone(_) => Kind::Clone,
            Node::Exit(_) => Kind::Exit,
            Node::Print(_) => Kind::Print,
            Node::IncludeOrEval { .. } => Kind::IncludeOrEval,
            Node::IncDec { op, .. } => match op {
                IncDec::PreInc => Kind::PreInc,
                IncDec::PreDec => Kind::PreDec,
                IncDec::PostInc => Kind::PostInc,
                IncDec::PostDec => Kind::PostDec,
            },
            Node::YieldFrom(_) => Kind::YieldFrom,
            Node::ClassName(_) => Kind::ClassName,
            Node::Global(_) => Kind::Global,
            Node::Unset(_) => Kind::Unset,
            Node::Return(_) => Kind::Return,
            Node::Label(_) => Kind::Label,
            Node::Ref(_) => Kind::Ref,
            Node::HaltCompiler => Kind::HaltCompiler,
            Node::Echo(_) => Kind::Echo,
            Node::Throw(_) => Kind::Throw,
            Node::Goto(_) => Kind::Goto,
            Node::Break(_) => Kind::Break,
            Node::Continue(_) => Kind::Continue,
            Node::Name { .. } => Kind::Name,
            Node::ClosureVar { .. } => Kind::ClosureVar,
            Node::NullableType(_) => Kind::NullableType,
            Node::Dim { .. } => Kind::Dim,
            Node::Prop { nullsafe: false, .. } => Kind::Prop,
            Node::Prop { nullsafe: true, .. } => Kind::NullsafeProp,
            Node::StaticProp { .. } => Kind::StaticProp,
            Node::Call { .. } => Kind::Call,
            Node::ClassConst { .. } => Kind::ClassConst,
            Node::Assign { .. } => Kind::Assign,
            Node::AssignRef { .. } => Kind::AssignRef,
            Node::AssignOp { .. } => Kind::AssignOp,
            Node::BinaryOp { .. } => Kind::BinaryOp,
            Node::ArrayElem { .. } => Kind::ArrayElem,
            Node::New { .. } => Kind::New,
            Node::Instanceof { .. } => Kind::Instanceof,
            Node::Yield { .. } => Kind::Yield,
            Node::Static { .. } => Kind::Static,
            Node::While { .. } => Kind::While,
            Node::DoWhile { .. } => Kind::DoWhile,
            Node::IfElem { .. } => Kind::IfElem,
            Node::Switch { .. } => Kind::Switch,
            Node::SwitchCase { .. } => Kind::SwitchCase,
            Node::Declare { .. } => Kind::Declare,
            Node::UseTrait { .. } => Kind::UseTrait,
            Node::TraitPrecedence { .. } => Kind::TraitPrecedence,
            Node::MethodReference { .. } => Kind::MethodReference,
            Node::Namespace { .. } => Kind::Namespace,
            Node::UseElem { .. } => Kind::UseElem,
            Node::TraitAlias { .. } => Kind::TraitAlias,
            Node::GroupUse { .. } => Kind::GroupUse,
            Node::MatchArm { .. } => Kind::MatchArm,
            Node::NamedArg { .. } => Kind::NamedArg,
            Node::ClassConstGroup { .. } => Kind::ClassConstGroup,
            Node::ConstElem { .. } => Kind::ConstElem,
            Node::PropElem { .. } => Kind::PropElem,
            Node::PropGroup { .. } => Kind::PropGroup,
            Node::MethodCall {
                nullsafe: false, ..
            } => Kind::MethodCall,
            Node::MethodCall { nullsafe: true, .. } => Kind::NullsafeMethodCall,
            Node::StaticCall { .. } => Kind::StaticCall,
            Node::Conditional { .. } => Kind::Conditional,
            Node::Try { .. } => Kind::Try,
            Node::Catch { .. } => Kind::Catch,
            Node::Param(_) => Kind::Param,
            Node::Match { .. } => Kind::Match,
            Node::EnumCase { .. } => Kind::EnumCase,
            Node::For { .. } => Kind::For,
            Node::Foreach { .. } => Kind::Foreach,
        };
        Some(kind)
    }

    /// A short name for diagnostics and tracing.
    pub fn describe(&self) -> String {
        match self.kind() {
            Some(kind) => kind.to_string(),
            None => "literal".to_string(),
        }
    }

    pub fn int(i: i64) -> Self {
        Node::Literal(Literal::Int(i))
    }

    pub fn string(s: &str) -> Self {
        Node::Literal(Literal::Str(s.to_string()))
    }

    pub fn var(name: &str) -> Self {
        Node::Var(Member::Ident(name.to_string()))
    }

    pub fn name(name: &str) -> Self {
        Node::Name {
            kind: NameKind::NotFullyQualified,
            name: name.to_string(),
        }
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
