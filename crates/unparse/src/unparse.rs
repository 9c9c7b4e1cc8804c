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

use crate::errors::UnparseError;
use crate::literal::{escape_str, is_identifier, literal, quote_str};
use crate::options::UnparseOptions;
use crate::precedence::{Precedence, binary_precedence, get_precedence};
use crate::scope::Scope;
use rephp_syntax::flags::{
    ArraySyntax, BinaryOp, ClassKind, IncludeKind, NameKind, UnaryOp, UseKind,
};
use rephp_syntax::{ArrowFunc, ClassDecl, DecodeError, FuncDecl, Kind, Literal, Member, Node, Param};
use tracing::trace;

/// Stack left before a nested render moves onto a fresh segment, and the size of that segment.
const RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// How a statement ends inside a statement list. Decided from the node, never from the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminator {
    /// Expressions and simple statements: `;` then a line break.
    Semicolon,
    /// Labels and nested statement lists, which carry their own ending.
    SelfTerminated,
    /// Constructs that end in a closing brace: a line break only.
    Block,
}

impl Terminator {
    pub(crate) fn of(node: &Node) -> Self {
        match node {
            Node::If(_)
            | Node::While { .. }
            | Node::For { .. }
            | Node::Foreach { .. }
            | Node::Switch { .. }
            | Node::Try { .. }
            | Node::FuncDecl(_)
            | Node::Class(_) => Terminator::Block,
            Node::Method(decl) if decl.stmts.is_some() => Terminator::Block,
            Node::Namespace { stmts: Some(_), .. }
            | Node::Declare { stmts: Some(_), .. }
            | Node::UseTrait {
                adaptations: Some(_),
                ..
            } => Terminator::Block,
            Node::Label(_) | Node::StmtList(_) => Terminator::SelfTerminated,
            _ => Terminator::Semicolon,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Terminator::Semicolon => ";\n",
            Terminator::SelfTerminated | Terminator::Block => "\n",
        }
    }
}

/// One render. State is the indentation level and recursion depth, both scoped by guards; a fresh
/// instance is made per call.
#[derive(Debug)]
pub(crate) struct Unparse<'a> {
    options: &'a UnparseOptions,
    scope: Scope,
}

impl<'a> Unparse<'a> {
    pub(crate) fn new(options: &'a UnparseOptions) -> Self {
        Self {
            options,
            scope: Scope::default(),
        }
    }

    pub(crate) fn indent_level(&self) -> usize {
        self.scope.level()
    }

    pub(crate) fn depth(&self) -> usize {
        self.scope.depth()
    }

    fn indent_frag(&self) -> String {
        " ".repeat(self.scope.level() * self.options.indent_width)
    }

    /// Render a whole file: the optional prologue, then the root statement list.
    pub(crate) fn unparse_file(&self, root: &Node) -> Result<String, UnparseError> {
        let mut buffer = String::new();
        if self.options.file_prologue {
            buffer.push_str("<?php\n\n");
        }
        match root {
            Node::StmtList(stmts) => buffer.push_str(&self.unparse_stmts(stmts)?),
            single => buffer.push_str(&self.unparse_stmts(std::slice::from_ref(single))?),
        }
        Ok(buffer)
    }

    /// Each statement on its own line at the current indentation, terminated per its kind.
    pub(crate) fn unparse_stmts(&self, stmts: &[Node]) -> Result<String, UnparseError> {
        let mut buffer = String::new();
        for stmt in stmts {
            if let Node::StmtList(inner) = stmt {
                buffer.push_str(&self.unparse_stmts(inner)?);
                continue;
            }
            buffer.push_str(&self.indent_frag());
            buffer.push_str(&self.unparse_node(stmt)?);
            buffer.push_str(Terminator::of(stmt).suffix());
        }
        Ok(buffer)
    }

    /// Statements of a body one level deeper. A brace-less single statement is treated as a
    /// one-element list.
    fn unparse_body(&self, body: &Node) -> Result<String, UnparseError> {
        let _indent = self.scope.indent();
        match body {
            Node::StmtList(stmts) => self.unparse_stmts(stmts),
            single => self.unparse_stmts(std::slice::from_ref(single)),
        }
    }

    /// `{`, the body, and `}` at the current indentation.
    fn unparse_block(&self, body: &Node) -> Result<String, UnparseError> {
        let stmt_frag = self.unparse_body(body)?;
        Ok(format!("{{\n{stmt_frag}{}}}", self.indent_frag()))
    }

    fn unparse_opt_block(&self, body: Option<&Node>) -> Result<String, UnparseError> {
        match body {
            Some(body) => self.unparse_block(body),
            None => self.unparse_block(&Node::StmtList(vec![])),
        }
    }

    /// Declarations put their opening brace on its own line.
    fn unparse_decl_block(&self, body: &Node) -> Result<String, UnparseError> {
        Ok(format!("\n{}{}", self.indent_frag(), self.unparse_block(body)?))
    }

    fn unparse_list(&self, nodes: &[Node], separator: &str) -> Result<String, UnparseError> {
        Ok(nodes
            .iter()
            .map(|node| self.unparse_node(node))
            .collect::<Result<Vec<String>, _>>()?
            .join(separator))
    }

    fn brace_if_lower(&self, node: &Node, precedence: Precedence) -> Result<String, UnparseError> {
        let frag = self.unparse_node(node)?;
        if get_precedence(node) < precedence.as_u8() {
            Ok(format!("({frag})"))
        } else {
            Ok(frag)
        }
    }

    fn brace_if_lower_eq(
        &self,
        node: &Node,
        precedence: Precedence,
    ) -> Result<String, UnparseError> {
        let frag = self.unparse_node(node)?;
        if get_precedence(node) <= precedence.as_u8() {
            Ok(format!("({frag})"))
        } else {
            Ok(frag)
        }
    }

    /// The left side of `->`, `::`, `[` and `(`. Anything that isn't primary (`new`, closures,
    /// operators) is bracketed.
    fn unparse_receiver(&self, node: &Node) -> Result<String, UnparseError> {
        self.brace_if_lower(node, Precedence::Primary)
    }

    fn unparse_doc(&self, doc_comment: &Option<String>) -> String {
        match doc_comment {
            Some(doc) => format!("{doc}\n{}", self.indent_frag()),
            None => String::new(),
        }
    }

    /// `$name`, `${"not an identifier"}`, `$$name`, `${expr}`.
    fn unparse_variable(&self, name: &Member) -> Result<String, UnparseError> {
        match name {
            Member::Ident(name) if is_identifier(name) => Ok(format!("${name}")),
            Member::Ident(name) => Ok(format!("${{{}}}", quote_str(name))),
            Member::Expr(expr) => match expr.as_ref() {
                Node::Var(_) => Ok(format!("${}", self.unparse_node(expr)?)),
                other => Ok(format!("${{{}}}", self.unparse_node(other)?)),
            },
        }
    }

    /// A property, method or constant name after `->` or `::`.
    fn unparse_member(&self, member: &Member) -> Result<String, UnparseError> {
        match member {
            Member::Ident(name) if is_identifier(name) => Ok(name.clone()),
            Member::Ident(name) => Ok(format!("{{{}}}", quote_str(name))),
            Member::Expr(expr) => match expr.as_ref() {
                Node::Var(_) => self.unparse_node(expr),
                other => Ok(format!("{{{}}}", self.unparse_node(other)?)),
            },
        }
    }

    fn unparse_args(&self, args: &Node) -> Result<String, UnparseError> {
        match args {
            Node::ArgList(args) => Ok(format!("({})", self.unparse_list(args, ", ")?)),
            Node::CallableConvert => Ok("(...)".to_string()),
            other => Ok(format!("({})", self.unparse_node(other)?)),
        }
    }

    /// The body of a double-quoted or backtick string with embedded expressions.
    fn unparse_encaps(&self, parts: &[Node], quote: char) -> Result<String, UnparseError> {
        let mut buffer = String::new();
        buffer.push(quote);
        for part in parts {
            match part {
                Node::Literal(Literal::Str(s)) => buffer.push_str(&escape_str(s, quote)),
                other => {
                    buffer.push('{');
                    buffer.push_str(&self.unparse_node(other)?);
                    buffer.push('}');
                }
            }
        }
        buffer.push(quote);
        Ok(buffer)
    }

    fn unparse_class_ref(&self, class: &Node) -> Result<String, UnparseError> {
        match class {
            Node::Name { .. } => self.unparse_node(class),
            other => self.unparse_receiver(other),
        }
    }

    fn unparse_return_type(&self, return_type: &Option<Box<Node>>) -> Result<String, UnparseError> {
        match return_type {
            Some(return_type) => Ok(format!(": {}", self.unparse_node(return_type)?)),
            None => Ok(String::new()),
        }
    }

    fn unparse_func(&self, kind: Kind, decl: &FuncDecl) -> Result<String, UnparseError> {
        let mut buffer = self.unparse_doc(&decl.doc_comment);
        let modifiers = decl.flags.modifiers.keywords();
        if !modifiers.is_empty() {
            buffer.push_str(&modifiers.join(" "));
            buffer.push(' ');
        }
        buffer.push_str("function ");
        if decl.flags.returns_ref {
            buffer.push('&');
        }
        if kind != Kind::Closure {
            buffer.push_str(&decl.name);
        }
        buffer.push('(');
        buffer.push_str(&self.unparse_list(&decl.params, ", ")?);
        buffer.push(')');
        if !decl.uses.is_empty() {
            buffer.push_str(" use (");
            buffer.push_str(&self.unparse_list(&decl.uses, ", ")?);
            buffer.push(')');
        }
        buffer.push_str(&self.unparse_return_type(&decl.return_type)?);
        match (kind, decl.stmts.as_deref()) {
            (Kind::Closure, stmts) => {
                buffer.push(' ');
                buffer.push_str(&self.unparse_opt_block(stmts)?);
            }
            (_, Some(stmts)) => buffer.push_str(&self.unparse_decl_block(stmts)?),
            (_, None) => {}
        }
        Ok(buffer)
    }

    fn unparse_arrow_func(&self, func: &ArrowFunc) -> Result<String, UnparseError> {
        let mut buffer = String::new();
        if func.is_static {
            buffer.push_str("static ");
        }
        buffer.push_str("fn");
        if func.by_ref {
            buffer.push_str(" &");
        }
        buffer.push('(');
        buffer.push_str(&self.unparse_list(&func.params, ", ")?);
        buffer.push(')');
        buffer.push_str(&self.unparse_return_type(&func.return_type)?);
        buffer.push_str(" => ");
        buffer.push_str(&self.unparse_node(&func.expr)?);
        Ok(buffer)
    }

    /// Everything from the class keyword to the end of the body. Anonymous classes start at
    /// `class` and take their constructor arguments from the enclosing `new`.
    fn unparse_class(&self, decl: &ClassDecl, args: Option<&Node>) -> Result<String, UnparseError> {
        let mut buffer = String::new();
        if decl.name.is_some() {
            buffer.push_str(&self.unparse_doc(&decl.doc_comment));
        }
        if decl.flags.is_abstract {
            buffer.push_str("abstract ");
        }
        if decl.flags.is_final {
            buffer.push_str("final ");
        }
        if decl.flags.is_readonly {
            buffer.push_str("readonly ");
        }
        buffer.push_str(&decl.flags.kind.to_string());
        if let Some(name) = &decl.name {
            buffer.push(' ');
            buffer.push_str(name);
        }
        if let Some(args) = args {
            buffer.push_str(&self.unparse_args(args)?);
        }
        if let Some(enum_type) = &decl.enum_type {
            buffer.push_str(": ");
            buffer.push_str(&self.unparse_node(enum_type)?);
        }
        if let Some(extends) = &decl.extends {
            buffer.push_str(" extends ");
            buffer.push_str(&self.unparse_node(extends)?);
        }
        if !decl.implements.is_empty() {
            // Interfaces list their parents where classes list implemented interfaces.
            if decl.flags.kind == ClassKind::Interface {
                buffer.push_str(" extends ");
            } else {
                buffer.push_str(" implements ");
            }
            buffer.push_str(&self.unparse_list(&decl.implements, ", ")?);
        }
        if decl.name.is_some() {
            buffer.push_str(&self.unparse_decl_block(&decl.stmts)?);
        } else {
            buffer.push(' ');
            buffer.push_str(&self.unparse_block(&decl.stmts)?);
        }
        Ok(buffer)
    }

    fn unparse_param(&self, param: &Param) -> Result<String, UnparseError> {
        let mut buffer = self.unparse_doc(&param.doc_comment);
        let promotion = param.flags.promotion.keywords();
        if !promotion.is_empty() {
            buffer.push_str(&promotion.join(" "));
            buffer.push(' ');
        }
        if let Some(type_) = &param.type_ {
            buffer.push_str(&self.unparse_node(type_)?);
            buffer.push(' ');
        }
        if param.flags.by_ref {
            buffer.push('&');
        }
        if param.flags.variadic {
            buffer.push_str("...");
        }
        buffer.push_str(&self.unparse_variable(&Member::Ident(param.name.clone()))?);
        if let Some(default) = &param.default {
            buffer.push_str(" = ");
            buffer.push_str(&self.unparse_node(default)?);
        }
        Ok(buffer)
    }

    fn unparse_if(&self, elems: &[Node]) -> Result<String, UnparseError> {
        let mut buffer = String::new();
        for (i, elem) in elems.iter().enumerate() {
            let Node::IfElem { cond, stmts } = elem else {
                return Err(unexpected_child(Kind::If, i, elem));
            };
            match cond {
                Some(cond) => {
                    buffer.push_str(if i == 0 { "if (" } else { " elseif (" });
                    buffer.push_str(&self.unparse_node(cond)?);
                    buffer.push_str(") ");
                    buffer.push_str(&self.unparse_block(stmts)?);
                }
                // `else if` renders as `elseif` by continuing the chain.
                None if matches!(stmts.as_ref(), Node::If(_)) => {
                    buffer.push_str(" else");
                    buffer.push_str(&self.unparse_node(stmts)?);
                }
                None => {
                    buffer.push_str(" else ");
                    buffer.push_str(&self.unparse_block(stmts)?);
                }
            }
        }
        Ok(buffer)
    }

    fn unparse_switch_case(
        &self,
        cond: &Option<Box<Node>>,
        stmts: &Node,
    ) -> Result<String, UnparseError> {
        let label = match cond {
            Some(cond) => format!("case {}:", self.unparse_node(cond)?),
            None => "default:".to_string(),
        };
        Ok(format!("{label}\n{}", self.unparse_body(stmts)?))
    }

    /// Cases each on their own line one level in, sharing the switch's braces.
    fn unparse_cases(&self, cases: &[Node]) -> Result<String, UnparseError> {
        let mut buffer = String::new();
        for case in cases {
            buffer.push_str(&self.indent_frag());
            match case {
                Node::SwitchCase { cond, stmts } => {
                    buffer.push_str(&self.unparse_switch_case(cond, stmts)?);
                }
                other => {
                    buffer.push_str(&self.unparse_node(other)?);
                    buffer.push('\n');
                }
            }
        }
        Ok(buffer)
    }

    fn unparse_match_arms(&self, arms: &[Node]) -> Result<String, UnparseError> {
        let mut buffer = String::new();
        for arm in arms {
            buffer.push_str(&self.indent_frag());
            buffer.push_str(&self.unparse_node(arm)?);
            buffer.push_str(",\n");
        }
        Ok(buffer)
    }

    fn unparse_use_elem(&self, elem: &Node, with_kind: bool) -> Result<String, UnparseError> {
        match elem {
            Node::UseElem { kind, name, alias } => {
                let mut buffer = String::new();
                if with_kind {
                    buffer.push_str(kind.keyword());
                }
                buffer.push_str(name);
                if let Some(alias) = alias {
                    buffer.push_str(" as ");
                    buffer.push_str(alias);
                }
                Ok(buffer)
            }
            other => self.unparse_node(other),
        }
    }

    fn unparse_use_elems(&self, elems: &[Node], with_kind: bool) -> Result<String, UnparseError> {
        Ok(elems
            .iter()
            .map(|elem| self.unparse_use_elem(elem, with_kind))
            .collect::<Result<Vec<String>, _>>()?
            .join(", "))
    }

    /// Modifier keywords with a trailing space, or nothing.
    fn modifier_prefix(keywords: Vec<&'static str>) -> String {
        if keywords.is_empty() {
            String::new()
        } else {
            format!("{} ", keywords.join(" "))
        }
    }

    /// Doc comment of the first element of a property or constant group, which is where the
    /// comment preceding the whole declaration is attached.
    fn group_doc(elems: &[Node]) -> &Option<String> {
        const NONE: &Option<String> = &None;
        match elems.first() {
            Some(Node::PropElem { doc_comment, .. })
            | Some(Node::ConstElem { doc_comment, .. }) => doc_comment,
            _ => NONE,
        }
    }

    fn unparse_unary(&self, op: UnaryOp, expr: &Node) -> Result<String, UnparseError> {
        let precedence = match op {
            UnaryOp::BoolNot => Precedence::Not,
            _ => Precedence::Unary,
        };
        let expr_frag = self.brace_if_lower(expr, precedence)?;
        let op_frag = op.to_string();
        // `-(-1)` and `-(--$a)`, never `--1` or `---$a`.
        let same_sign = matches!(op, UnaryOp::Minus | UnaryOp::Plus)
            && expr_frag.starts_with(op_frag.as_str());
        if same_sign {
            Ok(format!("{op_frag}({expr_frag})"))
        } else {
            Ok(format!("{op_frag}{expr_frag}"))
        }
    }

    fn unparse_binary(
        &self,
        op: BinaryOp,
        left: &Node,
        right: &Node,
    ) -> Result<String, UnparseError> {
        let precedence = binary_precedence(op);
        let (left_frag, right_frag) = match op {
            BinaryOp::Coalesce => {
                let left_frag = self.brace_if_lower(left, precedence)?;
                let right_frag = self.brace_if_lower(right, precedence)?;
                return Ok(format!("({left_frag} ?? {right_frag})"));
            }
            BinaryOp::Pow => (
                self.brace_if_lower_eq(left, precedence)?,
                self.brace_if_lower(right, precedence)?,
            ),
            // Comparisons don't associate at all.
            _ if matches!(precedence, Precedence::Equality | Precedence::Relational) => (
                self.brace_if_lower_eq(left, precedence)?,
                self.brace_if_lower_eq(right, precedence)?,
            ),
            _ => (
                self.brace_if_lower(left, precedence)?,
                self.brace_if_lower_eq(right, precedence)?,
            ),
        };
        Ok(format!("{left_frag} {op} {right_frag}"))
    }

    pub(crate) fn unparse_node(&self, node: &Node) -> Result<String, UnparseError> {
        let _depth = self.scope.descend(self.options.max_depth)?;
        trace!(kind = %node.describe(), depth = self.scope.depth(), "unparse");
        stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || self.unparse_kind(node))
    }

    fn unparse_kind(&self, node: &Node) -> Result<String, UnparseError> {
        match node {
            Node::Literal(value) => Ok(literal(value)),

            Node::FuncDecl(decl) => self.unparse_func(Kind::FuncDecl, decl),
            Node::Closure(decl) => self.unparse_func(Kind::Closure, decl),
            Node::Method(decl) => self.unparse_func(Kind::Method, decl),
            Node::ArrowFunc(func) => self.unparse_arrow_func(func),
            Node::Class(decl) => self.unparse_class(decl, None),

            Node::ArgList(args) => self.unparse_list(args, ", "),
            Node::Array { syntax, elems } => {
                let elem_frags = elems
                    .iter()
                    .map(|elem| match elem {
                        Some(elem) => self.unparse_node(elem),
                        None => Ok(String::new()),
                    })
                    .collect::<Result<Vec<String>, _>>()?
                    .join(", ");
                match syntax {
                    ArraySyntax::List => Ok(format!("list({elem_frags})")),
                    ArraySyntax::Long => Ok(format!("array({elem_frags})")),
                    ArraySyntax::Short | ArraySyntax::Unspecified => Ok(format!("[{elem_frags}]")),
                }
            }
            Node::CatchList(catches) => self.unparse_list(catches, " "),
            Node::ClassConstDecl(consts) => self.unparse_list(consts, ", "),
            Node::ClosureUses(uses) => self.unparse_list(uses, ", "),
            Node::ConstDecl(consts) => Ok(format!("const {}", self.unparse_list(consts, ", ")?)),
            Node::EncapsList(parts) => self.unparse_encaps(parts, '"'),
            Node::ExprList(exprs) => self.unparse_list(exprs, ", "),
            Node::If(elems) => self.unparse_if(elems),
            Node::MatchArmList(arms) => self.unparse_match_arms(arms),
            Node::NameList(names) => self.unparse_list(names, ", "),
            Node::ParamList(params) => self.unparse_list(params, ", "),
            Node::PropDecl(props) => self.unparse_list(props, ", "),
            Node::StmtList(stmts) => self.unparse_stmts(stmts),
            Node::SwitchList(cases) => self.unparse_cases(cases),
            Node::TraitAdaptations(adaptations) => self.unparse_stmts(adaptations),
            Node::Use { kind, elems } => Ok(format!(
                "use {}{}",
                kind.keyword(),
                self.unparse_use_elems(elems, false)?
            )),
            Node::TypeUnion(types) => {
                let type_frags = types
                    .iter()
                    .map(|t| match t {
                        Node::TypeIntersection(_) => Ok(format!("({})", self.unparse_node(t)?)),
                        _ => self.unparse_node(t),
                    })
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(type_frags.join("|"))
            }
            Node::TypeIntersection(types) => self.unparse_list(types, "&"),

            Node::MagicConst(magic) => Ok(magic.to_string()),
            Node::Type(type_) => Ok(type_.to_string()),
            Node::CallableConvert => Ok("...".to_string()),

            Node::Var(name) => self.unparse_variable(name),
            Node::Const(name) => self.unparse_node(name),
            Node::Unpack(expr) => Ok(format!("...{}", self.unparse_node(expr)?)),
            Node::UnaryOp { op, expr } => self.unparse_unary(*op, expr),
            Node::Cast { to, expr } => Ok(format!(
                "{to} {}",
                self.brace_if_lower(expr, Precedence::Unary)?
            )),
            Node::Empty(expr) => Ok(format!("empty({})", self.unparse_node(expr)?)),
            Node::Isset(var) => Ok(format!("isset({})", self.unparse_node(var)?)),
            Node::ShellExec(expr) => match expr.as_ref() {
                Node::EncapsList(parts) => self.unparse_encaps(parts, '`'),
                Node::Literal(Literal::Str(s)) => Ok(format!("`{}`", escape_str(s, '`'))),
                other => self.unparse_encaps(std::slice::from_ref(other), '`'),
            },
            Node::Clone(expr) => Ok(format!(
                "clone {}",
                self.brace_if_lower(expr, Precedence::New)?
            )),
            Node::Exit(expr) => match expr {
                Some(expr) => Ok(format!("exit({})", self.unparse_node(expr)?)),
                None => Ok("exit".to_string()),
            },
            Node::Print(expr) => Ok(format!(
                "print {}",
                self.brace_if_lower(expr, Precedence::Keyword)?
            )),
            Node::IncludeOrEval { kind, expr } => match kind {
                IncludeKind::Eval => {
                    Ok(format!("eval({})", self.unparse_node(expr)?))
                }
                _ => Ok(format!(
                    "{kind} {}",
                    self.brace_if_lower(expr, Precedence::Keyword)?
                )),
            },
            Node::IncDec { op, var } => {
                let var_frag = self.brace_if_lower(var, Precedence::Primary)?;
                if op.is_prefix() {
                    Ok(format!("{}{var_frag}", op.token()))
                } else {
                    Ok(format!("{var_frag}{}", op.token()))
                }
            }
            Node::YieldFrom(expr) => Ok(format!(
                "yield from {}",
                self.brace_if_lower(expr, Precedence::Keyword)?
            )),
            Node::ClassName(class) => Ok(format!("{}::class", self.unparse_class_ref(class)?)),
            Node::Global(var) => Ok(format!("global {}", self.unparse_node(var)?)),
            Node::Unset(var) => Ok(format!("unset({})", self.unparse_node(var)?)),
            Node::Return(expr) => match expr {
                Some(expr) => Ok(format!("return {}", self.unparse_node(expr)?)),
                None => Ok("return".to_string()),
            },
            Node::Label(name) => Ok(format!("{name}:")),
            Node::Ref(var) => Ok(format!("&{}", self.unparse_node(var)?)),
            Node::HaltCompiler => Ok("__halt_compiler()".to_string()),
            Node::Echo(expr) => Ok(format!("echo {}", self.unparse_node(expr)?)),
            Node::Throw(expr) => Ok(format!(
                "throw {}",
                self.brace_if_lower(expr, Precedence::Keyword)?
            )),
            Node::Goto(label) => Ok(format!("goto {label}")),
            Node::Break(depth) => match depth {
                Some(depth) => Ok(format!("break {}", self.unparse_node(depth)?)),
                None => Ok("break".to_string()),
            },
            Node::Continue(depth) => match depth {
                Some(depth) => Ok(format!("continue {}", self.unparse_node(depth)?)),
                None => Ok("continue".to_string()),
            },
            Node::Name { kind, name } => match kind {
                NameKind::FullyQualified => Ok(format!("\\{name}")),
                NameKind::NotFullyQualified => Ok(name.clone()),
                NameKind::Relative => Ok(format!("namespace\\{name}")),
            },
            Node::ClosureVar { name, by_ref } => {
                let var_frag = self.unparse_variable(&Member::Ident(name.clone()))?;
                if *by_ref {
                    Ok(format!("&{var_frag}"))
                } else {
                    Ok(var_frag)
                }
            }
            Node::NullableType(type_) => Ok(format!("?{}", self.unparse_node(type_)?)),

            Node::Dim { expr, dim } => {
                let expr_frag = self.unparse_receiver(expr)?;
                match dim {
                    Some(dim) => Ok(format!("{expr_frag}[{}]", self.unparse_node(dim)?)),
                    None => Ok(format!("{expr_frag}[]")),
                }
            }
            Node::Prop {
                expr,
                prop,
                nullsafe,
            } => Ok(format!(
                "{}{}{}",
                self.unparse_receiver(expr)?,
                if *nullsafe { "?->" } else { "->" },
                self.unparse_member(prop)?
            )),
            Node::StaticProp { class, prop } => Ok(format!(
                "{}::{}",
                self.unparse_class_ref(class)?,
                self.unparse_variable(prop)?
            )),
            Node::Call { expr, args } => {
                let callee = match expr.as_ref() {
                    Node::Name { .. } => self.unparse_node(expr)?,
                    Node::Prop { .. } | Node::StaticProp { .. } => {
                        format!("({})", self.unparse_node(expr)?)
                    }
                    other => self.unparse_receiver(other)?,
                };
                Ok(format!("{callee}{}", self.unparse_args(args)?))
            }
            Node::ClassConst { class, name } => {
                let constant = match name {
                    Member::Ident(_) => self.unparse_member(name)?,
                    Member::Expr(expr) => format!("{{{}}}", self.unparse_node(expr)?),
                };
                Ok(format!("{}::{constant}", self.unparse_class_ref(class)?))
            }
            Node::Assign { var, expr } => Ok(format!(
                "{} = {}",
                self.unparse_node(var)?,
                self.brace_if_lower(expr, Precedence::Assign)?
            )),
            Node::AssignRef { var, expr } => Ok(format!(
                "{} = &{}",
                self.unparse_node(var)?,
                self.brace_if_lower(expr, Precedence::Assign)?
            )),
            Node::AssignOp { op, var, expr } => {
                let Some(token) = op.assign_token() else {
                    return Err(DecodeError::UnknownFlag {
                        kind: Kind::AssignOp.to_string(),
                        flags: *op as u32,
                    }
                    .into());
                };
                Ok(format!(
                    "{} {token} {}",
                    self.unparse_node(var)?,
                    self.brace_if_lower(expr, Precedence::Assign)?
                ))
            }
            Node::BinaryOp { op, left, right } => self.unparse_binary(*op, left, right),
            Node::ArrayElem { value, key, by_ref } => {
                let mut buffer = String::new();
                if let Some(key) = key {
                    buffer.push_str(&self.unparse_node(key)?);
                    buffer.push_str(" => ");
                }
                if *by_ref {
                    buffer.push('&');
                }
                buffer.push_str(&self.unparse_node(value)?);
                Ok(buffer)
            }
            Node::New { class, args } => match class.as_ref() {
                Node::Class(decl) => Ok(format!("new {}", self.unparse_class(decl, Some(args))?)),
                plain if is_plain_class_ref(plain) => Ok(format!(
                    "new {}{}",
                    self.unparse_node(class)?,
                    self.unparse_args(args)?
                )),
                other => Ok(format!(
                    "new ({}){}",
                    self.unparse_node(other)?,
                    self.unparse_args(args)?
                )),
            },
            Node::Instanceof { expr, class } => Ok(format!(
                "{} instanceof {}",
                self.brace_if_lower_eq(expr, Precedence::Instanceof)?,
                self.unparse_class_ref(class)?
            )),
            Node::Yield { value, key } => match (key, value) {
                (Some(key), Some(value)) => Ok(format!(
                    "yield {} => {}",
                    self.brace_if_lower(key, Precedence::Keyword)?,
                    self.brace_if_lower(value, Precedence::Keyword)?
                )),
                (None, Some(value)) => Ok(format!(
                    "yield {}",
                    self.brace_if_lower(value, Precedence::Keyword)?
                )),
                (_, None) => Ok("yield".to_string()),
            },
            Node::Static { var, default } => match default {
                Some(default) => Ok(format!(
                    "static {} = {}",
                    self.unparse_node(var)?,
                    self.unparse_node(default)?
                )),
                None => Ok(format!("static {}", self.unparse_node(var)?)),
            },
            Node::While { cond, stmts } => {
                let cond_frag = self.unparse_node(cond)?;
                Ok(format!("while ({cond_frag}) {}", self.unparse_block(stmts)?))
            }
            Node::DoWhile { stmts, cond } => {
                let stmt_frag = self.unparse_block(stmts)?;
                Ok(format!("do {stmt_frag} while ({})", self.unparse_node(cond)?))
            }
            Node::IfElem { cond, stmts } => match cond {
                Some(cond) => Ok(format!(
                    "if ({}) {}",
                    self.unparse_node(cond)?,
                    self.unparse_block(stmts)?
                )),
                None => Ok(format!("else {}", self.unparse_block(stmts)?)),
            },
            Node::Switch { cond, cases } => {
                let cond_frag = self.unparse_node(cond)?;
                let case_frag = {
                    let _indent = self.scope.indent();
                    self.unparse_cases(cases)?
                };
                Ok(format!(
                    "switch ({cond_frag}) {{\n{case_frag}{}}}",
                    self.indent_frag()
                ))
            }
            Node::SwitchCase { cond, stmts } => self.unparse_switch_case(cond, stmts),
            Node::Declare { declares, stmts } => {
                let declare_frags = declares
                    .iter()
                    .map(|declare| match declare {
                        Node::ConstElem { name, value, .. } => {
                            Ok(format!("{name}={}", self.unparse_node(value)?))
                        }
                        other => self.unparse_node(other),
                    })
                    .collect::<Result<Vec<String>, _>>()?
                    .join(", ");
                match stmts {
                    Some(stmts) => Ok(format!(
                        "declare({declare_frags}) {}",
                        self.unparse_block(stmts)?
                    )),
                    None => Ok(format!("declare({declare_frags})")),
                }
            }
            Node::UseTrait {
                traits,
                adaptations,
            } => {
                let trait_frag = self.unparse_list(traits, ", ")?;
                match adaptations {
                    Some(adaptations) => Ok(format!(
                        "use {trait_frag} {}",
                        self.unparse_block(&Node::StmtList(adaptations.clone()))?
                    )),
                    None => Ok(format!("use {trait_frag}")),
                }
            }
            Node::TraitPrecedence { method, insteadof } => Ok(format!(
                "{} insteadof {}",
                self.unparse_node(method)?,
                self.unparse_list(insteadof, ", ")?
            )),
            Node::MethodReference { class, method } => match class {
                Some(class) => Ok(format!("{}::{method}", self.unparse_node(class)?)),
                None => Ok(method.clone()),
            },
            Node::Namespace { name, stmts } => {
                let mut buffer = "namespace".to_string();
                if let Some(name) = name {
                    buffer.push(' ');
                    buffer.push_str(name);
                }
                if let Some(stmts) = stmts {
                    buffer.push(' ');
                    buffer.push_str(&self.unparse_block(stmts)?);
                }
                Ok(buffer)
            }
            Node::UseElem { .. } => self.unparse_use_elem(node, true),
            Node::TraitAlias {
                method,
                modifiers,
                alias,
            } => {
                let mut buffer = format!("{} as", self.unparse_node(method)?);
                for keyword in modifiers.keywords() {
                    buffer.push(' ');
                    buffer.push_str(keyword);
                }
                if let Some(alias) = alias {
                    buffer.push(' ');
                    buffer.push_str(alias);
                }
                Ok(buffer)
            }
            Node::GroupUse { kind, prefix, uses } => Ok(format!(
                "use {}{prefix}\\{{{}}}",
                kind.keyword(),
                self.unparse_use_elems(uses, *kind == UseKind::Unspecified)?
            )),
            Node::MatchArm { conds, expr } => {
                let cond_frag = match conds {
                    Some(conds) => self.unparse_list(conds, ", ")?,
                    None => "default".to_string(),
                };
                Ok(format!("{cond_frag} => {}", self.unparse_node(expr)?))
            }
            Node::NamedArg { name, expr } => Ok(format!("{name}: {}", self.unparse_node(expr)?)),
            Node::ClassConstGroup { modifiers, consts } => Ok(format!(
                "{}{}const {}",
                self.unparse_doc(Self::group_doc(consts)),
                Self::modifier_prefix(modifiers.keywords()),
                self.unparse_list(consts, ", ")?
            )),
            Node::ConstElem { name, value, .. } => {
                Ok(format!("{name} = {}", self.unparse_node(value)?))
            }
            Node::PropElem { name, default, .. } => {
                let var_frag = self.unparse_variable(&Member::Ident(name.clone()))?;
                match default {
                    Some(default) => Ok(format!("{var_frag} = {}", self.unparse_node(default)?)),
                    None => Ok(var_frag),
                }
            }
            Node::PropGroup {
                modifiers,
                type_,
                props,
            } => {
                let mut buffer = self.unparse_doc(Self::group_doc(props));
                if modifiers.is_empty() {
                    buffer.push_str("var ");
                } else {
                    buffer.push_str(&Self::modifier_prefix(modifiers.keywords()));
                }
                if let Some(type_) = type_ {
                    buffer.push_str(&self.unparse_node(type_)?);
                    buffer.push(' ');
                }
                buffer.push_str(&self.unparse_list(props, ", ")?);
                Ok(buffer)
            }

            Node::MethodCall {
                expr,
                method,
                args,
                nullsafe,
            } => Ok(format!(
                "{}{}{}{}",
                self.unparse_receiver(expr)?,
                if *nullsafe { "?->" } else { "->" },
                self.unparse_member(method)?,
                self.unparse_args(args)?
            )),
            Node::StaticCall {
                class,
                method,
                args,
            } => Ok(format!(
                "{}::{}{}",
                self.unparse_class_ref(class)?,
                self.unparse_member(method)?,
                self.unparse_args(args)?
            )),
            Node::Conditional {
                cond,
                if_true,
                if_false,
            } => {
                let cond_frag = self.brace_if_lower_eq(cond, Precedence::Ternary)?;
                let false_frag = self.brace_if_lower_eq(if_false, Precedence::Ternary)?;
                match if_true {
                    Some(if_true) => Ok(format!(
                        "({cond_frag} ? {} : {false_frag})",
                        self.brace_if_lower_eq(if_true, Precedence::Ternary)?
                    )),
                    None => Ok(format!("({cond_frag} ?: {false_frag})")),
                }
            }
            Node::Try {
                stmts,
                catches,
                finally,
            } => {
                let mut buffer = format!("try {}", self.unparse_block(stmts)?);
                for catch in catches {
                    buffer.push(' ');
                    buffer.push_str(&self.unparse_node(catch)?);
                }
                if let Some(finally) = finally {
                    buffer.push_str(" finally ");
                    buffer.push_str(&self.unparse_block(finally)?);
                }
                Ok(buffer)
            }
            Node::Catch { types, var, stmts } => {
                let mut buffer = format!("catch ({}", self.unparse_list(types, " | ")?);
                if let Some(var) = var {
                    buffer.push(' ');
                    buffer.push_str(&self.unparse_node(var)?);
                }
                buffer.push_str(") ");
                buffer.push_str(&self.unparse_block(stmts)?);
                Ok(buffer)
            }
            Node::Param(param) => self.unparse_param(param),
            Node::Match { cond, arms } => {
                let cond_frag = self.unparse_node(cond)?;
                let arm_frag = {
                    let _indent = self.scope.indent();
                    self.unparse_match_arms(arms)?
                };
                Ok(format!(
                    "match ({cond_frag}) {{\n{arm_frag}{}}}",
                    self.indent_frag()
                ))
            }
            Node::EnumCase {
                name,
                expr,
                doc_comment,
            } => {
                let mut buffer = self.unparse_doc(doc_comment);
                buffer.push_str("case ");
                buffer.push_str(name);
                if let Some(expr) = expr {
                    buffer.push_str(" = ");
                    buffer.push_str(&self.unparse_node(expr)?);
                }
                Ok(buffer)
            }
            Node::For {
                init,
                cond,
                step,
                stmts,
            } => {
                let mut clause_frags = Vec::with_capacity(3);
                for clause in [init, cond, step] {
                    clause_frags.push(match clause {
                        Some(exprs) => self.unparse_list(exprs, ", ")?,
                        None => String::new(),
                    });
                }
                let header = if clause_frags.iter().all(String::is_empty) {
                    "for (;;)".to_string()
                } else {
                    format!("for ({})", clause_frags.join("; "))
                };
                Ok(format!("{header} {}", self.unparse_block(stmts)?))
            }
            Node::Foreach {
                expr,
                value,
                key,
                stmts,
            } => {
                let mut buffer = format!("foreach ({} as ", self.unparse_node(expr)?);
                if let Some(key) = key {
                    buffer.push_str(&self.unparse_node(key)?);
                    buffer.push_str(" => ");
                }
                buffer.push_str(&self.unparse_node(value)?);
                buffer.push_str(") ");
                buffer.push_str(&self.unparse_block(stmts)?);
                Ok(buffer)
            }
        }
    }
}

/// Whether `new` can take `class` without brackets: a name or variable, optionally followed by
/// `[...]`, `->` and `::$` accesses.
fn is_plain_class_ref(class: &Node) -> bool {
    match class {
        Node::Name { .. } | Node::Var(_) => true,
        Node::Dim { expr, .. } => is_plain_class_ref(expr),
        Node::Prop {
            expr,
            nullsafe: false,
            ..
        } => is_plain_class_ref(expr),
        Node::StaticProp { class, .. } => is_plain_class_ref(class),
        _ => false,
    }
}

fn unexpected_child(kind: Kind, index: usize, found: &Node) -> UnparseError {
    DecodeError::UnexpectedValue {
        kind: kind.to_string(),
        slot: index.to_string(),
        found: found.describe(),
    }
    .into()
}
