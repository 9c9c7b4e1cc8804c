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

//! Raw php-ast nodes to the canonical typed tree.
//!
//! This is where the versioned vocabulary is pinned: child slot names, flag encodings, and the
//! translation of kinds that only earlier AST versions produce.

use crate::ast::{ArrowFunc, ClassDecl, FuncDecl, Literal, Member, Node, Param};
use crate::errors::DecodeError;
use crate::flags::{
    ArraySyntax, BinaryOp, CastType, ClassFlags, FuncFlags, IncDec, IncludeKind, MagicConst,
    Modifiers, NameKind, ParamFlags, TypeFlag, UnaryOp, UseKind, raw as raw_flags,
};
use crate::kind::Kind;
use crate::raw::{RawChild, RawNode};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use tracing::{debug, trace, warn};

/// Stack left before a nested decode moves onto a fresh segment, and the size of that segment.
const RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Kinds php-ast emits that have no rendering here.
pub const UNSUPPORTED_KINDS: &[&str] = &[
    "AST_ATTRIBUTE",
    "AST_ATTRIBUTE_LIST",
    "AST_ATTRIBUTE_GROUP",
    "AST_PROPERTY_HOOK",
    "AST_PROPERTY_HOOK_SHORT_BODY",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Accept kinds from earlier AST versions and translate them to their canonical form.
    pub translate_legacy: bool,
    /// Maximum node nesting before decoding gives up with `TooDeep`.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            translate_legacy: true,
            max_depth: 256,
        }
    }
}

/// Decode with default options.
pub fn decode(raw: &RawNode) -> Result<Node, DecodeError> {
    Decoder::new(DecodeOptions::default()).decode(raw)
}

/// Parse a JSON-serialised php-ast dump and decode it.
/// Nesting is bounded by `max_depth` rather than by the JSON parser's own recursion limit, which
/// a tree of ordinary depth would exceed: every node takes two JSON levels.
pub fn decode_json(json: &str, options: DecodeOptions) -> Result<Node, DecodeError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let raw = RawNode::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    debug!(kind = %raw.kind, children = raw.len(), bytes = json.len(), "decoding tree");
    Decoder::new(options).decode(&raw)
}

fn missing(kind: Kind, slot: &str) -> DecodeError {
    DecodeError::MissingChild {
        kind: kind.to_string(),
        slot: slot.to_string(),
    }
}

fn unexpected(kind: Kind, slot: &str, found: &RawChild) -> DecodeError {
    DecodeError::UnexpectedValue {
        kind: kind.to_string(),
        slot: slot.to_string(),
        found: found.describe(),
    }
}

pub struct Decoder {
    options: DecodeOptions,
    depth: Cell<usize>,
}

impl Decoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            depth: Cell::new(0),
        }
    }

    fn resolve_kind(&self, raw: &RawNode) -> Result<Kind, DecodeError> {
        let prefixed = if raw.kind.starts_with("AST_") {
            raw.kind.clone()
        } else {
            format!("AST_{}", raw.kind)
        };
        if UNSUPPORTED_KINDS.contains(&prefixed.as_str()) {
            return Err(DecodeError::UnsupportedKind(prefixed));
        }
        let Some(kind) = Kind::from_name(&raw.kind) else {
            return Err(DecodeError::UnknownKind(raw.kind.clone()));
        };
        if kind.is_legacy() && !self.options.translate_legacy {
            return Err(DecodeError::UnsupportedKind(kind.to_string()));
        }
        Ok(kind)
    }

    fn flags<T>(&self, raw: &RawNode, kind: Kind, resolved: Option<T>) -> Result<T, DecodeError> {
        resolved.ok_or_else(|| DecodeError::UnknownFlag {
            kind: kind.to_string(),
            flags: raw.flags,
        })
    }

    fn value(&self, kind: Kind, slot: &str, child: &RawChild) -> Result<Option<Node>, DecodeError> {
        let node = match child {
            RawChild::Node(node) => self.decode(node)?,
            RawChild::Bool(b) => Node::Literal(Literal::Bool(*b)),
            RawChild::Int(i) => Node::Literal(Literal::Int(*i)),
            RawChild::Float(f) => Node::Literal(Literal::Float(*f)),
            RawChild::Str(s) => Node::Literal(Literal::Str(s.clone())),
            RawChild::Null => return Ok(None),
            RawChild::Unexpected(_) => return Err(unexpected(kind, slot, child)),
        };
        Ok(Some(node))
    }

    /// An optional slot; absent and `null` are the same thing.
    fn opt(
        &self,
        raw: &RawNode,
        kind: Kind,
        index: usize,
        slot: &str,
    ) -> Result<Option<Box<Node>>, DecodeError> {
        match raw.slot(index, slot) {
            None => Ok(None),
            Some(child) => Ok(self.value(kind, slot, child)?.map(Box::new)),
        }
    }

    fn req(
        &self,
        raw: &RawNode,
        kind: Kind,
        index: usize,
        slot: &str,
    ) -> Result<Box<Node>, DecodeError> {
        self.opt(raw, kind, index, slot)?
            .ok_or_else(|| missing(kind, slot))
    }

    fn opt_ident(
        &self,
        raw: &RawNode,
        kind: Kind,
        index: usize,
        slot: &str,
    ) -> Result<Option<String>, DecodeError> {
        match raw.slot(index, slot) {
            None | Some(RawChild::Null) => Ok(None),
            Some(RawChild::Str(s)) => Ok(Some(s.clone())),
            Some(other) => Err(unexpected(kind, slot, other)),
        }
    }

    fn ident(
        &self,
        raw: &RawNode,
        kind: Kind,
        index: usize,
        slot: &str,
    ) -> Result<String, DecodeError> {
        self.opt_ident(raw, kind, index, slot)?
            .ok_or_else(|| missing(kind, slot))
    }

    /// `name` and `docComment` are children in current dumps and side attributes in older ones.
    fn decl_attr(
        &self,
        raw: &RawNode,
        kind: Kind,
        index: usize,
        slot: &str,
        side: &Option<String>,
    ) -> Result<Option<String>, DecodeError> {
        Ok(self.opt_ident(raw, kind, index, slot)?.or_else(|| side.clone()))
    }

    fn member(
        &self,
        raw: &RawNode,
        kind: Kind,
        index: usize,
        slot: &str,
    ) -> Result<Member, DecodeError> {
        match raw.slot(index, slot) {
            Some(RawChild::Str(s)) => Ok(Member::Ident(s.clone())),
            Some(child) => match self.value(kind, slot, child)? {
                Some(node) => Ok(Member::Expr(Box::new(node))),
                None => Err(missing(kind, slot)),
            },
            None => Err(missing(kind, slot)),
        }
    }

    /// The children of a list node, with `null` placeholders dropped.
    fn items(&self, raw: &RawNode, kind: Kind) -> Result<Vec<Node>, DecodeError> {
        let mut nodes = Vec::with_capacity(raw.len());
        for (i, child) in raw.items().into_iter().enumerate() {
            if let Some(node) = self.value(kind, &i.to_string(), child)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn opt_list(
        &self,
        raw: &RawNode,
        kind: Kind,
        index: usize,
        slot: &str,
        expected: Kind,
    ) -> Result<Option<Vec<Node>>, DecodeError> {
        match raw.slot(index, slot) {
            None | Some(RawChild::Null) => Ok(None),
            Some(RawChild::Node(list)) if self.resolve_kind(list)? == expected => {
                self.items(list, expected).map(Some)
            }
            Some(other) => Err(unexpected(kind, slot, other)),
        }
    }

    fn list(
        &self,
        raw: &RawNode,
        kind: Kind,
        index: usize,
        slot: &str,
        expected: Kind,
    ) -> Result<Vec<Node>, DecodeError> {
        self.opt_list(raw, kind, index, slot, expected)?
            .ok_or_else(|| missing(kind, slot))
    }

    fn reject_unsupported_slot(
        &self,
        raw: &RawNode,
        index: usize,
        slot: &str,
        unsupported: &str,
    ) -> Result<(), DecodeError> {
        match raw.slot(index, slot) {
            None | Some(RawChild::Null) => Ok(()),
            Some(_) => Err(DecodeError::UnsupportedKind(unsupported.to_string())),
        }
    }

    fn reject_attributes(&self, raw: &RawNode, index: usize) -> Result<(), DecodeError> {
        self.reject_unsupported_slot(raw, index, "attributes", "AST_ATTRIBUTE_LIST")
    }

    fn func_decl(&self, raw: &RawNode, kind: Kind) -> Result<FuncDecl, DecodeError> {
        let flags = match kind {
            Kind::Method => FuncFlags::for_method(raw.flags),
            Kind::Closure => FuncFlags::for_function(raw.flags, true),
            _ => FuncFlags::for_function(raw.flags, false),
        };
        let flags = self.flags(raw, kind, flags)?;
        self.reject_attributes(raw, 6)?;
        let name = self.decl_attr(raw, kind, 0, "name", &raw.name)?;
        let name = match (kind, name) {
            (Kind::Closure, name) => name.unwrap_or_else(|| "{closure}".to_string()),
            (_, Some(name)) => name,
            (_, None) => return Err(missing(kind, "name")),
        };
        let stmts = self.opt(raw, kind, 4, "stmts")?;
        if stmts.is_none() && kind != Kind::Method {
            return Err(missing(kind, "stmts"));
        }
        Ok(FuncDecl {
            name,
            doc_comment: self.decl_attr(raw, kind, 1, "docComment", &raw.doc_comment)?,
            flags,
            params: self.list(raw, kind, 2, "params", Kind::ParamList)?,
            uses: self
                .opt_list(raw, kind, 3, "uses", Kind::ClosureUses)?
                .unwrap_or_default(),
            stmts,
            return_type: self.opt(raw, kind, 5, "returnType")?,
        })
    }

    fn arrow_func(&self, raw: &RawNode, kind: Kind) -> Result<ArrowFunc, DecodeError> {
        let flags = self.flags(raw, kind, FuncFlags::for_function(raw.flags, true))?;
        self.reject_attributes(raw, 6)?;
        // The body is always a synthesized `return`.
        let expr = match self.opt(raw, kind, 4, "stmts")?.map(|b| *b) {
            Some(Node::Return(Some(expr))) => expr,
            Some(other) => {
                return Err(DecodeError::UnexpectedValue {
                    kind: kind.to_string(),
                    slot: "stmts".to_string(),
                    found: other.describe(),
                });
            }
            None => return Err(missing(kind, "stmts")),
        };
        Ok(ArrowFunc {
            doc_comment: self.decl_attr(raw, kind, 1, "docComment", &raw.doc_comment)?,
            params: self.list(raw, kind, 2, "params", Kind::ParamList)?,
            return_type: self.opt(raw, kind, 5, "returnType")?,
            by_ref: flags.returns_ref,
            is_static: flags.modifiers.is_static,
            expr,
        })
    }

    fn class_decl(&self, raw: &RawNode, kind: Kind) -> Result<ClassDecl, DecodeError> {
        let flags = self.flags(raw, kind, ClassFlags::from_bits(raw.flags))?;
        self.reject_attributes(raw, 5)?;
        let name = self.decl_attr(raw, kind, 0, "name", &raw.name)?;
        if name.is_none() && !flags.is_anonymous {
            return Err(missing(kind, "name"));
        }
        Ok(ClassDecl {
            name,
            doc_comment: self.decl_attr(raw, kind, 1, "docComment", &raw.doc_comment)?,
            flags,
            extends: self.opt(raw, kind, 2, "extends")?,
            implements: self
                .opt_list(raw, kind, 3, "implements", Kind::NameList)?
                .unwrap_or_default(),
            stmts: self.req(raw, kind, 4, "stmts")?,
            enum_type: self.opt(raw, kind, 6, "type")?,
        })
    }

    fn param(&self, raw: &RawNode, kind: Kind) -> Result<Param, DecodeError> {
        let flags = self.flags(raw, kind, ParamFlags::from_bits(raw.flags))?;
        self.reject_attributes(raw, 3)?;
        self.reject_unsupported_slot(raw, 5, "hooks", "AST_PROPERTY_HOOK")?;
        Ok(Param {
            name: self.ident(raw, kind, 1, "name")?,
            doc_comment: self.decl_attr(raw, kind, 4, "docComment", &raw.doc_comment)?,
            flags,
            type_: self.opt(raw, kind, 0, "type")?,
            default: self.opt(raw, kind, 2, "default")?,
        })
    }

    fn legacy_binary(&self, raw: &RawNode, kind: Kind, op: BinaryOp) -> Result<Node, DecodeError> {
        warn!(%kind, lineno = raw.lineno, "translating legacy kind to binary operation");
        Ok(Node::BinaryOp {
            op,
            left: self.req(raw, kind, 0, "left")?,
            right: self.req(raw, kind, 1, "right")?,
        })
    }

    fn legacy_unary(&self, raw: &RawNode, kind: Kind, op: UnaryOp) -> Result<Node, DecodeError> {
        warn!(%kind, lineno = raw.lineno, "translating legacy kind to unary operation");
        Ok(Node::UnaryOp {
            op,
            expr: self.req(raw, kind, 0, "expr")?,
        })
    }

    fn array_elems(&self, raw: &RawNode, kind: Kind) -> Result<Vec<Option<Node>>, DecodeError> {
        raw.items()
            .into_iter()
            .enumerate()
            .map(|(i, child)| self.value(kind, &i.to_string(), child))
            .collect()
    }

    pub fn decode(&self, raw: &RawNode) -> Result<Node, DecodeError> {
        let depth = self.depth.get();
        if depth >= self.options.max_depth {
            return Err(DecodeError::TooDeep {
                limit: self.options.max_depth,
            });
        }
        self.depth.set(depth + 1);
        let node = stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || self.decode_node(raw));
        self.depth.set(depth);
        node
    }

    fn decode_node(&self, raw: &RawNode) -> Result<Node, DecodeError> {
        let kind = self.resolve_kind(raw)?;
        trace!(%kind, lineno = raw.lineno, "decode");
        let node = match kind {
            Kind::FuncDecl => Node::FuncDecl(self.func_decl(raw, kind)?),
            Kind::Closure => Node::Closure(self.func_decl(raw, kind)?),
            Kind::Method => Node::Method(self.func_decl(raw, kind)?),
            Kind::ArrowFunc => Node::ArrowFunc(self.arrow_func(raw, kind)?),
            Kind::Class => Node::Class(self.class_decl(raw, kind)?),

            Kind::ArgList => Node::ArgList(self.items(raw, kind)?),
            Kind::Array => Node::Array {
                syntax: self.flags(raw, kind, ArraySyntax::from_repr(raw.flags))?,
                elems: self.array_elems(raw, kind)?,
            },
            Kind::CatchList => Node::CatchList(self.items(raw, kind)?),
            Kind::ClassConstDecl => Node::ClassConstDecl(self.items(raw, kind)?),
            Kind::ClosureUses => Node::ClosureUses(self.items(raw, kind)?),
            Kind::ConstDecl => Node::ConstDecl(self.items(raw, kind)?),
            Kind::EncapsList => Node::EncapsList(self.items(raw, kind)?),
            Kind::ExprList => Node::ExprList(self.items(raw, kind)?),
            Kind::If => Node::If(self.items(raw, kind)?),
            Kind::MatchArmList => Node::MatchArmList(self.items(raw, kind)?),
            Kind::NameList => Node::NameList(self.items(raw, kind)?),
            Kind::ParamList => Node::ParamList(self.items(raw, kind)?),
            Kind::PropDecl => Node::PropDecl(self.items(raw, kind)?),
            Kind::StmtList => Node::StmtList(self.items(raw, kind)?),
            Kind::SwitchList => Node::SwitchList(self.items(raw, kind)?),
            Kind::TraitAdaptations => Node::TraitAdaptations(self.items(raw, kind)?),
            Kind::Use => Node::Use {
                kind: self.flags(raw, kind, UseKind::from_repr(raw.flags))?,
                elems: self.items(raw, kind)?,
            },
            Kind::TypeUnion => Node::TypeUnion(self.items(raw, kind)?),
            Kind::TypeIntersection => Node::TypeIntersection(self.items(raw, kind)?),

            Kind::MagicConst => {
                Node::MagicConst(self.flags(raw, kind, MagicConst::from_repr(raw.flags))?)
            }
            Kind::Type => Node::Type(self.flags(raw, kind, TypeFlag::from_repr(raw.flags))?),
            Kind::CallableConvert => Node::CallableConvert,

            Kind::Var => Node::Var(self.member(raw, kind, 0, "name")?),
            Kind::Const => Node::Const(self.req(raw, kind, 0, "name")?),
            Kind::Unpack => Node::Unpack(self.req(raw, kind, 0, "expr")?),
            Kind::UnaryOp => Node::UnaryOp {
                op: self.flags(raw, kind, UnaryOp::from_repr(raw.flags))?,
                expr: self.req(raw, kind, 0, "expr")?,
            },
            Kind::Cast => Node::Cast {
                to: self.flags(raw, kind, CastType::from_repr(raw.flags))?,
                expr: self.req(raw, kind, 0, "expr")?,
            },
            Kind::Empty => Node::Empty(self.req(raw, kind, 0, "expr")?),
            Kind::Isset => Node::Isset(self.req(raw, kind, 0, "var")?),
            Kind::ShellExec => Node::ShellExec(self.req(raw, kind, 0, "expr")?),
            Kind::Clone => Node::Clone(self.req(raw, kind, 0, "expr")?),
            Kind::Exit => Node::Exit(self.opt(raw, kind, 0, "expr")?),
            Kind::Print => Node::Print(self.req(raw, kind, 0, "expr")?),
            Kind::IncludeOrEval => Node::IncludeOrEval {
                kind: self.flags(raw, kind, IncludeKind::from_repr(raw.flags))?,
                expr: self.req(raw, kind, 0, "expr")?,
            },
            Kind::PreInc | Kind::PreDec | Kind::PostInc | Kind::PostDec => {
                let op = match kind {
                    Kind::PreInc => IncDec::PreInc,
                    Kind::PreDec => IncDec::PreDec,
                    Kind::PostInc => IncDec::PostInc,
                    _ => IncDec::PostDec,
                };
                Node::IncDec {
                    op,
                    var: self.req(raw, kind, 0, "var")?,
                }
            }
            Kind::YieldFrom => Node::YieldFrom(self.req(raw, kind, 0, "expr")?),
            Kind::ClassName => Node::ClassName(self.req(raw, kind, 0, "class")?),
            Kind::Global => Node::Global(self.req(raw, kind, 0, "var")?),
            Kind::Unset => Node::Unset(self.req(raw, kind, 0, "var")?),
            Kind::Return => Node::Return(self.opt(raw, kind, 0, "expr")?),
            Kind::Label => Node::Label(self.ident(raw, kind, 0, "name")?),
            Kind::Ref => Node::Ref(self.req(raw, kind, 0, "var")?),
            Kind::HaltCompiler => Node::HaltCompiler,
            Kind::Echo => Node::Echo(self.req(raw, kind, 0, "expr")?),
            Kind::Throw => Node::Throw(self.req(raw, kind, 0, "expr")?),
            Kind::Goto => Node::Goto(self.ident(raw, kind, 0, "label")?),
            Kind::Break => Node::Break(self.opt(raw, kind, 0, "depth")?),
            Kind::Continue => Node::Continue(self.opt(raw, kind, 0, "depth")?),
            Kind::Name => Node::Name {
                kind: self.flags(raw, kind, NameKind::from_repr(raw.flags))?,
                name: self.ident(raw, kind, 0, "name")?,
            },
            Kind::ClosureVar => {
                let by_ref = match raw.flags {
                    0 => false,
                    raw_flags::CLOSURE_USE_REF => true,
                    _ => self.flags(raw, kind, None)?,
                };
                Node::ClosureVar {
                    name: self.ident(raw, kind, 0, "name")?,
                    by_ref,
                }
            }
            Kind::NullableType => Node::NullableType(self.req(raw, kind, 0, "type")?),

            Kind::Dim => Node::Dim {
                expr: self.req(raw, kind, 0, "expr")?,
                dim: self.opt(raw, kind, 1, "dim")?,
            },
            Kind::Prop | Kind::NullsafeProp => Node::Prop {
                expr: self.req(raw, kind, 0, "expr")?,
                prop: self.member(raw, kind, 1, "prop")?,
                nullsafe: kind == Kind::NullsafeProp,
            },
            Kind::StaticProp => Node::StaticProp {
                class: self.req(raw, kind, 0, "class")?,
                prop: self.member(raw, kind, 1, "prop")?,
            },
            Kind::Call => Node::Call {
                expr: self.req(raw, kind, 0, "expr")?,
                args: self.req(raw, kind, 1, "args")?,
            },
            Kind::ClassConst => Node::ClassConst {
                class: self.req(raw, kind, 0, "class")?,
                name: self.member(raw, kind, 1, "const")?,
            },
            Kind::Assign => Node::Assign {
                var: self.req(raw, kind, 0, "var")?,
                expr: self.req(raw, kind, 1, "expr")?,
            },
            Kind::AssignRef => Node::AssignRef {
                var: self.req(raw, kind, 0, "var")?,
                expr: self.req(raw, kind, 1, "expr")?,
            },
            Kind::AssignOp => {
                let op = BinaryOp::from_repr(raw.flags).filter(|op| op.assign_token().is_some());
                Node::AssignOp {
                    op: self.flags(raw, kind, op)?,
                    var: self.req(raw, kind, 0, "var")?,
                    expr: self.req(raw, kind, 1, "expr")?,
                }
            }
            Kind::BinaryOp => Node::BinaryOp {
                op: self.flags(raw, kind, BinaryOp::from_repr(raw.flags))?,
                left: self.req(raw, kind, 0, "left")?,
                right: self.req(raw, kind, 1, "right")?,
            },
            Kind::ArrayElem => {
                let by_ref = match raw.flags {
                    0 => false,
                    raw_flags::ARRAY_ELEM_REF => true,
                    _ => self.flags(raw, kind, None)?,
                };
                Node::ArrayElem {
                    value: self.req(raw, kind, 0, "value")?,
                    key: self.opt(raw, kind, 1, "key")?,
                    by_ref,
                }
            }
            Kind::New => Node::New {
                class: self.req(raw, kind, 0, "class")?,
                args: self.req(raw, kind, 1, "args")?,
            },
            Kind::Instanceof => Node::Instanceof {
                expr: self.req(raw, kind, 0, "expr")?,
                class: self.req(raw, kind, 1, "class")?,
            },
            Kind::Yield => Node::Yield {
                value: self.opt(raw, kind, 0, "value")?,
                key: self.opt(raw, kind, 1, "key")?,
            },
            Kind::Static => Node::Static {
                var: self.req(raw, kind, 0, "var")?,
                default: self.opt(raw, kind, 1, "default")?,
            },
            Kind::While => Node::While {
                cond: self.req(raw, kind, 0, "cond")?,
                stmts: self.req(raw, kind, 1, "stmts")?,
            },
            Kind::DoWhile => Node::DoWhile {
                stmts: self.req(raw, kind, 0, "stmts")?,
                cond: self.req(raw, kind, 1, "cond")?,
            },
            Kind::IfElem => Node::IfElem {
                cond: self.opt(raw, kind, 0, "cond")?,
                stmts: self.req(raw, kind, 1, "stmts")?,
            },
            Kind::Switch => Node::Switch {
                cond: self.req(raw, kind, 0, "cond")?,
                cases: self.list(raw, kind, 1, "stmts", Kind::SwitchList)?,
            },
            Kind::SwitchCase => Node::SwitchCase {
                cond: self.opt(raw, kind, 0, "cond")?,
                stmts: self.req(raw, kind, 1, "stmts")?,
            },
            Kind::Declare => Node::Declare {
                declares: self.list(raw, kind, 0, "declares", Kind::ConstDecl)?,
                stmts: self.opt(raw, kind, 1, "stmts")?,
            },
            Kind::UseTrait => Node::UseTrait {
                traits: self.list(raw, kind, 0, "traits", Kind::NameList)?,
                adaptations: self.opt_list(raw, kind, 1, "adaptations", Kind::TraitAdaptations)?,
            },
            Kind::TraitPrecedence => Node::TraitPrecedence {
                method: self.req(raw, kind, 0, "method")?,
                insteadof: self.list(raw, kind, 1, "insteadof", Kind::NameList)?,
            },
            Kind::MethodReference => Node::MethodReference {
                class: self.opt(raw, kind, 0, "class")?,
                method: self.ident(raw, kind, 1, "method")?,
            },
            Kind::Namespace => Node::Namespace {
                name: self.opt_ident(raw, kind, 0, "name")?,
                stmts: self.opt(raw, kind, 1, "stmts")?,
            },
            Kind::UseElem => Node::UseElem {
                kind: self.flags(raw, kind, UseKind::from_repr(raw.flags))?,
                name: self.ident(raw, kind, 0, "name")?,
                alias: self.opt_ident(raw, kind, 1, "alias")?,
            },
            Kind::TraitAlias => Node::TraitAlias {
                method: self.req(raw, kind, 0, "method")?,
                modifiers: self.flags(raw, kind, Modifiers::from_bits(raw.flags))?,
                alias: self.opt_ident(raw, kind, 1, "alias")?,
            },
            Kind::GroupUse => Node::GroupUse {
                kind: self.flags(raw, kind, UseKind::from_repr(raw.flags))?,
                prefix: self.ident(raw, kind, 0, "prefix")?,
                uses: self.list(raw, kind, 1, "uses", Kind::Use)?,
            },
            Kind::MatchArm => Node::MatchArm {
                conds: self.opt_list(raw, kind, 0, "cond", Kind::ExprList)?,
                expr: self.req(raw, kind, 1, "expr")?,
            },
            Kind::NamedArg => Node::NamedArg {
                name: self.ident(raw, kind, 0, "name")?,
                expr: self.req(raw, kind, 1, "expr")?,
            },
            Kind::ClassConstGroup => {
                self.reject_attributes(raw, 1)?;
                Node::ClassConstGroup {
                    modifiers: self.flags(raw, kind, Modifiers::from_bits(raw.flags))?,
                    consts: self.list(raw, kind, 0, "const", Kind::ClassConstDecl)?,
                }
            }
            Kind::ConstElem => Node::ConstElem {
                name: self.ident(raw, kind, 0, "name")?,
                value: self.req(raw, kind, 1, "value")?,
                doc_comment: self.decl_attr(raw, kind, 2, "docComment", &raw.doc_comment)?,
            },
            Kind::PropElem => {
                self.reject_unsupported_slot(raw, 3, "hooks", "AST_PROPERTY_HOOK")?;
                Node::PropElem {
                    name: self.ident(raw, kind, 0, "name")?,
                    default: self.opt(raw, kind, 1, "default")?,
                    doc_comment: self.decl_attr(raw, kind, 2, "docComment", &raw.doc_comment)?,
                }
            }
            Kind::PropGroup => {
                self.reject_attributes(raw, 2)?;
                Node::PropGroup {
                    modifiers: self.flags(raw, kind, Modifiers::from_bits(raw.flags))?,
                    type_: self.opt(raw, kind, 0, "type")?,
                    props: self.list(raw, kind, 1, "props", Kind::PropDecl)?,
                }
            }

            Kind::MethodCall | Kind::NullsafeMethodCall => Node::MethodCall {
                expr: self.req(raw, kind, 0, "expr")?,
                method: self.member(raw, kind, 1, "method")?,
                args: self.req(raw, kind, 2, "args")?,
                nullsafe: kind == Kind::NullsafeMethodCall,
            },
            Kind::StaticCall => Node::StaticCall {
                class: self.req(raw, kind, 0, "class")?,
                method: self.member(raw, kind, 1, "method")?,
                args: self.req(raw, kind, 2, "args")?,
            },
            Kind::Conditional => Node::Conditional {
                cond: self.req(raw, kind, 0, "cond")?,
                if_true: self.opt(raw, kind, 1, "true")?,
                if_false: self.req(raw, kind, 2, "false")?,
            },
            Kind::Try => Node::Try {
                stmts: self.req(raw, kind, 0, "try")?,
                catches: self.list(raw, kind, 1, "catches", Kind::CatchList)?,
                finally: self.opt(raw, kind, 2, "finally")?,
            },
            Kind::Catch => Node::Catch {
                types: self.list(raw, kind, 0, "class", Kind::NameList)?,
                var: self.opt(raw, kind, 1, "var")?,
                stmts: self.req(raw, kind, 2, "stmts")?,
            },
            Kind::Param => Node::Param(self.param(raw, kind)?),
            Kind::Match => Node::Match {
                cond: self.req(raw, kind, 0, "cond")?,
                arms: self.list(raw, kind, 1, "stmts", Kind::MatchArmList)?,
            },
            Kind::EnumCase => {
                self.reject_attributes(raw, 3)?;
                Node::EnumCase {
                    name: self.ident(raw, kind, 0, "name")?,
                    expr: self.opt(raw, kind, 1, "expr")?,
                    doc_comment: self.decl_attr(raw, kind, 2, "docComment", &raw.doc_comment)?,
                }
            }
            Kind::For => Node::For {
                init: self.opt_list(raw, kind, 0, "init", Kind::ExprList)?,
                cond: self.opt_list(raw, kind, 1, "cond", Kind::ExprList)?,
                step: self.opt_list(raw, kind, 2, "loop", Kind::ExprList)?,
                stmts: self.req(raw, kind, 3, "stmts")?,
            },
            Kind::Foreach => Node::Foreach {
                expr: self.req(raw, kind, 0, "expr")?,
                value: self.req(raw, kind, 1, "value")?,
                key: self.opt(raw, kind, 2, "key")?,
                stmts: self.req(raw, kind, 3, "stmts")?,
            },

            Kind::And => self.legacy_binary(raw, kind, BinaryOp::BoolAnd)?,
            Kind::Or => self.legacy_binary(raw, kind, BinaryOp::BoolOr)?,
            Kind::Coalesce => self.legacy_binary(raw, kind, BinaryOp::Coalesce)?,
            Kind::Greater => self.legacy_binary(raw, kind, BinaryOp::IsGreater)?,
            Kind::GreaterEqual => self.legacy_binary(raw, kind, BinaryOp::IsGreaterOrEqual)?,
            Kind::UnaryPlus => self.legacy_unary(raw, kind, UnaryOp::Plus)?,
            Kind::UnaryMinus => self.legacy_unary(raw, kind, UnaryOp::Minus)?,
            Kind::Silence => self.legacy_unary(raw, kind, UnaryOp::Silence)?,
            Kind::List => {
                warn!(%kind, lineno = raw.lineno, "translating legacy list to array");
                Node::Array {
                    syntax: ArraySyntax::List,
                    elems: self.array_elems(raw, kind)?,
                }
            }
        };
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::raw;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn var(name: &str) -> RawNode {
        RawNode::new("AST_VAR").child("name", name)
    }

    #[test]
    fn decodes_binary_op() {
        let raw = RawNode::new("AST_BINARY_OP")
            .with_flags(1)
            .child("left", 2i64)
            .child("right", 3i64);
        assert_eq!(
            decode(&raw).unwrap(),
            Node::binary(BinaryOp::Add, Node::int(2), Node::int(3))
        );
    }

    #[test]
    fn unknown_kind_is_fatal() {
        let err = decode(&RawNode::new("AST_NOT_A_THING")).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownKind(name) if name == "AST_NOT_A_THING"));
    }

    #[test_case("AST_ATTRIBUTE_LIST"; "attribute list")]
    #[test_case("AST_ATTRIBUTE_GROUP"; "attribute group")]
    #[test_case("PROPERTY_HOOK"; "bare property hook")]
    fn unsupported_kinds(name: &str) {
        let err = decode(&RawNode::new(name)).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedKind(_)), "{err}");
    }

    #[test]
    fn attributes_on_declarations_are_rejected() {
        let raw = RawNode::new("AST_PARAM")
            .child("type", None::<RawNode>)
            .child("name", "a")
            .child("default", None::<RawNode>)
            .child("attributes", RawNode::new("AST_ATTRIBUTE_LIST"));
        let err = decode(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedKind(name) if name == "AST_ATTRIBUTE_LIST"));
    }

    #[test]
    fn unknown_flag_is_fatal() {
        let raw = RawNode::new("AST_BINARY_OP")
            .with_flags(9999)
            .child("left", 1i64)
            .child("right", 2i64);
        let err = decode(&raw).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnknownFlag { ref kind, flags: 9999 } if kind == "AST_BINARY_OP"
        ));
    }

    #[test]
    fn comparison_has_no_compound_assignment() {
        let raw = RawNode::new("AST_ASSIGN_OP")
            .with_flags(BinaryOp::IsIdentical as u32)
            .child("var", var("a"))
            .child("expr", 1i64);
        assert!(matches!(
            decode(&raw).unwrap_err(),
            DecodeError::UnknownFlag { .. }
        ));
    }

    #[test]
    fn missing_child_is_reported_by_slot() {
        let raw = RawNode::new("AST_ASSIGN").child("var", var("a"));
        let err = decode(&raw).unwrap_err();
        assert_eq!(err.to_string(), "Missing child `expr` of AST_ASSIGN");
    }

    #[test]
    fn malformed_values_are_reported() {
        let raw: RawNode =
            serde_json::from_str(r#"{"kind": "AST_ECHO", "children": {"expr": [1, 2]}}"#).unwrap();
        let err = decode(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedValue { ref slot, .. } if slot == "expr"));
    }

    #[test]
    fn identifier_slot_rejects_nodes() {
        let raw = RawNode::new("AST_LABEL").child("name", var("x"));
        assert!(matches!(
            decode(&raw).unwrap_err(),
            DecodeError::UnexpectedValue { .. }
        ));
    }

    #[test]
    fn positional_children() {
        let raw = RawNode::new("AST_ASSIGN").push(var("a")).push(1i64);
        assert_eq!(
            decode(&raw).unwrap(),
            Node::Assign {
                var: Box::new(Node::var("a")),
                expr: Box::new(Node::int(1)),
            }
        );
    }

    #[test]
    fn statement_lists_drop_null_placeholders() {
        let raw = RawNode::new("AST_STMT_LIST")
            .push(None::<RawNode>)
            .push(var("x"))
            .push(None::<RawNode>);
        assert_eq!(decode(&raw).unwrap(), Node::StmtList(vec![Node::var("x")]));
    }

    #[test]
    fn arrays_keep_skipped_positions() {
        let raw = RawNode::new("AST_ARRAY")
            .with_flags(raw::ARRAY_SYNTAX_LIST)
            .push(None::<RawNode>)
            .push(
                RawNode::new("AST_ARRAY_ELEM")
                    .child("value", var("b"))
                    .child("key", None::<RawNode>),
            );
        let Node::Array { syntax, elems } = decode(&raw).unwrap() else {
            panic!("expected an array");
        };
        assert_eq!(syntax, ArraySyntax::List);
        assert_eq!(elems.len(), 2);
        assert!(elems[0].is_none());
    }

    #[test_case("AST_AND", BinaryOp::BoolAnd; "and")]
    #[test_case("AST_OR", BinaryOp::BoolOr; "or")]
    #[test_case("AST_COALESCE", BinaryOp::Coalesce; "coalesce")]
    #[test_case("AST_GREATER", BinaryOp::IsGreater; "greater")]
    #[test_case("AST_GREATER_EQUAL", BinaryOp::IsGreaterOrEqual; "greater equal")]
    fn legacy_binary_kinds(name: &str, op: BinaryOp) {
        let raw = RawNode::new(name).push(var("a")).push(var("b"));
        assert_eq!(
            decode(&raw).unwrap(),
            Node::binary(op, Node::var("a"), Node::var("b"))
        );
    }

    #[test]
    fn legacy_kinds_can_be_refused() {
        let raw = RawNode::new("AST_UNARY_MINUS").push(1i64);
        let strict = Decoder::new(DecodeOptions {
            translate_legacy: false,
            ..Default::default()
        });
        assert!(matches!(
            strict.decode(&raw).unwrap_err(),
            DecodeError::UnsupportedKind(name) if name == "AST_UNARY_MINUS"
        ));
        assert_eq!(
            decode(&raw).unwrap(),
            Node::UnaryOp {
                op: UnaryOp::Minus,
                expr: Box::new(Node::int(1)),
            }
        );
    }

    #[test]
    fn legacy_list_becomes_list_array() {
        let raw = RawNode::new("AST_LIST").push(var("a"));
        assert_eq!(
            decode(&raw).unwrap(),
            Node::Array {
                syntax: ArraySyntax::List,
                elems: vec![Some(Node::var("a"))],
            }
        );
    }

    #[test]
    fn declaration_names_come_from_side_attributes() {
        let mut raw = RawNode::new("AST_FUNC_DECL")
            .child("params", RawNode::new("AST_PARAM_LIST"))
            .child("stmts", RawNode::new("AST_STMT_LIST"));
        raw.name = Some("f".to_string());
        raw.doc_comment = Some("/** doc */".to_string());
        let Node::FuncDecl(decl) = decode(&raw).unwrap() else {
            panic!("expected a function");
        };
        assert_eq!(decl.name, "f");
        assert_eq!(decl.doc_comment.as_deref(), Some("/** doc */"));
        assert!(decl.params.is_empty());
    }

    #[test]
    fn arrow_function_body_must_be_return() {
        let raw = RawNode::new("AST_ARROW_FUNC")
            .child("params", RawNode::new("AST_PARAM_LIST"))
            .child("stmts", RawNode::new("AST_ECHO").child("expr", 1i64));
        assert!(matches!(
            decode(&raw).unwrap_err(),
            DecodeError::UnexpectedValue { ref slot, .. } if slot == "stmts"
        ));
    }

    #[test]
    fn list_slot_checks_its_kind() {
        let raw = RawNode::new("AST_SWITCH")
            .child("cond", var("a"))
            .child("stmts", RawNode::new("AST_STMT_LIST"));
        assert!(matches!(
            decode(&raw).unwrap_err(),
            DecodeError::UnexpectedValue { .. }
        ));
    }

    #[test]
    fn decode_json_reports_malformed_json() {
        let err = decode_json("{\"kind\": ", DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn decode_stops_at_max_depth() {
        let mut tree = var("x");
        for _ in 0..4 {
            tree = RawNode::new("AST_UNARY_OP")
                .with_flags(UnaryOp::BoolNot as u32)
                .child("expr", tree);
        }
        let options = DecodeOptions {
            max_depth: 3,
            ..Default::default()
        };
        let decoder = Decoder::new(options);
        let err = decoder.decode(&tree).unwrap_err();
        assert!(matches!(err, DecodeError::TooDeep { limit: 3 }));
        assert_eq!(decoder.depth.get(), 0);
    }

    #[test]
    fn decode_json_accepts_nesting_past_the_parser_default() {
        let mut json = r#"{"kind": "AST_VAR", "children": {"name": "x"}}"#.to_string();
        for _ in 0..100 {
            json = format!(
                r#"{{"kind": "AST_UNARY_OP", "flags": 14, "children": {{"expr": {json}}}}}"#
            );
        }
        let mut node = decode_json(&json, DecodeOptions::default()).unwrap();
        let mut levels = 0;
        while let Node::UnaryOp { expr, .. } = node {
            node = *expr;
            levels += 1;
        }
        assert_eq!(levels, 100);
        assert_eq!(node, Node::var("x"));
    }
}
