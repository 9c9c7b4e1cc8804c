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

//! Proptest strategies for generating typed PHP trees.
//!
//! Strings and identifiers are drawn from alphabets without brackets or quotes, so bracket
//! counting over the rendered text only sees structure.

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use rephp_syntax::flags::{ArraySyntax, BinaryOp, CastType, FuncFlags, IncDec, ParamFlags, UnaryOp};
use rephp_syntax::{FuncDecl, Literal, Member, Node, Param};
use strum::IntoEnumIterator;

// =============================================================================
// Literals and names
// =============================================================================

pub fn arb_integer() -> impl Strategy<Value = Node> {
    (-1_000_000i64..1_000_000i64).prop_map(Node::int)
}

pub fn arb_float() -> impl Strategy<Value = Node> {
    prop_oneof![
        (-1000.0f64..1000.0).prop_map(|f| Node::Literal(Literal::Float(f))),
        Just(Node::Literal(Literal::Float(0.0))),
        Just(Node::Literal(Literal::Float(-1.5))),
    ]
}

pub fn arb_string() -> impl Strategy<Value = Node> {
    "[a-zA-Z0-9 .,!?:;]{0,20}".prop_map(|s| Node::string(&s))
}

pub fn arb_bool() -> impl Strategy<Value = Node> {
    any::<bool>().prop_map(|b| Node::Literal(Literal::Bool(b)))
}

pub fn arb_literal() -> impl Strategy<Value = Node> {
    prop_oneof![
        4 => arb_integer(),
        2 => arb_float(),
        2 => arb_string(),
        1 => arb_bool(),
    ]
}

pub fn arb_identifier() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}"
}

pub fn arb_variable() -> impl Strategy<Value = Node> {
    arb_identifier().prop_map(|name| Node::var(&name))
}

pub fn arb_name() -> impl Strategy<Value = Node> {
    "[A-Z][a-zA-Z0-9]{0,8}".prop_map(|name| Node::name(&name))
}

// =============================================================================
// Operators
// =============================================================================

pub fn arb_binary_op() -> impl Strategy<Value = BinaryOp> {
    proptest::sample::select(BinaryOp::iter().collect::<Vec<_>>())
}

pub fn arb_assign_op() -> impl Strategy<Value = BinaryOp> {
    proptest::sample::select(
        BinaryOp::iter()
            .filter(|op| op.assign_token().is_some())
            .collect::<Vec<_>>(),
    )
}

pub fn arb_unary_op() -> impl Strategy<Value = UnaryOp> {
    proptest::sample::select(UnaryOp::iter().collect::<Vec<_>>())
}

pub fn arb_cast_type() -> impl Strategy<Value = CastType> {
    proptest::sample::select(CastType::iter().collect::<Vec<_>>())
}

pub fn arb_inc_dec() -> impl Strategy<Value = IncDec> {
    proptest::sample::select(IncDec::iter().collect::<Vec<_>>())
}

// =============================================================================
// Expressions
// =============================================================================

fn args(args: Vec<Node>) -> Box<Node> {
    Box::new(Node::ArgList(args))
}

/// Expressions nested up to `depth` levels.
pub fn arb_expr(depth: usize) -> BoxedStrategy<Node> {
    if depth == 0 {
        return prop_oneof![3 => arb_literal(), 2 => arb_variable()].boxed();
    }
    let sub = arb_expr(depth - 1);
    prop_oneof![
        3 => arb_literal(),
        2 => arb_variable(),
        4 => (arb_binary_op(), sub.clone(), sub.clone())
            .prop_map(|(op, left, right)| Node::binary(op, left, right)),
        2 => (arb_unary_op(), sub.clone())
            .prop_map(|(op, expr)| Node::UnaryOp { op, expr: Box::new(expr) }),
        1 => (arb_cast_type(), sub.clone())
            .prop_map(|(to, expr)| Node::Cast { to, expr: Box::new(expr) }),
        1 => (arb_inc_dec(), arb_variable())
            .prop_map(|(op, var)| Node::IncDec { op, var: Box::new(var) }),
        1 => (arb_variable(), sub.clone())
            .prop_map(|(var, expr)| Node::Assign { var: Box::new(var), expr: Box::new(expr) }),
        1 => (arb_assign_op(), arb_variable(), sub.clone())
            .prop_map(|(op, var, expr)| Node::AssignOp { op, var: Box::new(var), expr: Box::new(expr) }),
        1 => (sub.clone(), proptest::option::of(sub.clone()), sub.clone())
            .prop_map(|(cond, if_true, if_false)| Node::Conditional {
                cond: Box::new(cond),
                if_true: if_true.map(Box::new),
                if_false: Box::new(if_false),
            }),
        1 => (arb_name(), prop::collection::vec(sub.clone(), 0..3))
            .prop_map(|(name, a)| Node::Call { expr: Box::new(name), args: args(a) }),
        1 => (sub.clone(), arb_identifier(), prop::collection::vec(sub.clone(), 0..3), any::<bool>())
            .prop_map(|(expr, method, a, nullsafe)| Node::MethodCall {
                expr: Box::new(expr),
                method: Member::Ident(method),
                args: args(a),
                nullsafe,
            }),
        1 => (sub.clone(), arb_identifier())
            .prop_map(|(expr, prop)| Node::Prop {
                expr: Box::new(expr),
                prop: Member::Ident(prop),
                nullsafe: false,
            }),
        1 => (sub.clone(), proptest::option::of(sub.clone()))
            .prop_map(|(expr, dim)| Node::Dim { expr: Box::new(expr), dim: dim.map(Box::new) }),
        1 => prop::collection::vec((sub.clone(), proptest::option::of(arb_string())), 0..4)
            .prop_map(|elems| Node::Array {
                syntax: ArraySyntax::Short,
                elems: elems
                    .into_iter()
                    .map(|(value, key)| {
                        Some(Node::ArrayElem {
                            value: Box::new(value),
                            key: key.map(Box::new),
                            by_ref: false,
                        })
                    })
                    .collect(),
            }),
        1 => (arb_name(), prop::collection::vec(sub.clone(), 0..3))
            .prop_map(|(class, a)| Node::New { class: Box::new(class), args: args(a) }),
        1 => (sub.clone(), arb_name())
            .prop_map(|(expr, class)| Node::Instanceof { expr: Box::new(expr), class: Box::new(class) }),
        1 => sub.clone().prop_map(|expr| Node::Clone(Box::new(expr))),
        1 => sub.prop_map(|expr| Node::Print(Box::new(expr))),
    ]
    .boxed()
}

// =============================================================================
// Statements
// =============================================================================

pub fn arb_stmt_list(depth: usize) -> BoxedStrategy<Node> {
    prop::collection::vec(arb_stmt(depth), 0..4)
        .prop_map(Node::StmtList)
        .boxed()
}

fn simple_stmt() -> BoxedStrategy<Node> {
    prop_oneof![
        3 => arb_expr(2),
        2 => arb_expr(2).prop_map(|expr| Node::Echo(Box::new(expr))),
        1 => proptest::option::of(arb_expr(1)).prop_map(|expr| Node::Return(expr.map(Box::new))),
        1 => arb_variable().prop_map(|var| Node::Unset(Box::new(var))),
    ]
    .boxed()
}

fn arb_param() -> impl Strategy<Value = Node> {
    (arb_identifier(), proptest::option::of(arb_literal()), any::<bool>()).prop_map(
        |(name, default, by_ref)| {
            Node::Param(Param {
                name,
                doc_comment: None,
                flags: ParamFlags {
                    by_ref,
                    ..Default::default()
                },
                type_: None,
                default: default.map(Box::new),
            })
        },
    )
}

/// Statements whose bodies nest up to `depth` levels.
pub fn arb_stmt(depth: usize) -> BoxedStrategy<Node> {
    if depth == 0 {
        return simple_stmt();
    }
    let body = arb_stmt_list(depth - 1);
    let cond = arb_expr(2);
    prop_oneof![
        4 => simple_stmt(),
        2 => (prop::collection::vec((cond.clone(), body.clone()), 1..3), proptest::option::of(body.clone()))
            .prop_map(|(branches, otherwise)| {
                let mut elems: Vec<Node> = branches
                    .into_iter()
                    .map(|(cond, stmts)| Node::IfElem { cond: Some(Box::new(cond)), stmts: Box::new(stmts) })
                    .collect();
                if let Some(stmts) = otherwise {
                    elems.push(Node::IfElem { cond: None, stmts: Box::new(stmts) });
                }
                Node::If(elems)
            }),
        1 => (cond.clone(), body.clone())
            .prop_map(|(cond, stmts)| Node::While { cond: Box::new(cond), stmts: Box::new(stmts) }),
        1 => (body.clone(), cond.clone())
            .prop_map(|(stmts, cond)| Node::DoWhile { stmts: Box::new(stmts), cond: Box::new(cond) }),
        1 => (arb_variable(), proptest::option::of(arb_variable()), arb_variable(), body.clone())
            .prop_map(|(expr, key, value, stmts)| Node::Foreach {
                expr: Box::new(expr),
                value: Box::new(value),
                key: key.map(Box::new),
                stmts: Box::new(stmts),
            }),
        1 => (
            proptest::option::of(prop::collection::vec(cond.clone(), 1..3)),
            proptest::option::of(prop::collection::vec(cond.clone(), 1..2)),
            proptest::option::of(prop::collection::vec(cond.clone(), 1..3)),
            body.clone(),
        )
            .prop_map(|(init, cond, step, stmts)| Node::For { init, cond, step, stmts: Box::new(stmts) }),
        1 => (cond.clone(), prop::collection::vec((proptest::option::of(arb_literal()), body.clone()), 0..4))
            .prop_map(|(cond, cases)| Node::Switch {
                cond: Box::new(cond),
                cases: cases
                    .into_iter()
                    .map(|(cond, stmts)| Node::SwitchCase { cond: cond.map(Box::new), stmts: Box::new(stmts) })
                    .collect(),
            }),
        1 => (body.clone(), prop::collection::vec((arb_name(), arb_variable(), body.clone()), 1..3), proptest::option::of(body.clone()))
            .prop_map(|(stmts, catches, finally)| Node::Try {
                stmts: Box::new(stmts),
                catches: catches
                    .into_iter()
                    .map(|(class, var, stmts)| Node::Catch {
                        types: vec![class],
                        var: Some(Box::new(var)),
                        stmts: Box::new(stmts),
                    })
                    .collect(),
                finally: finally.map(Box::new),
            }),
        1 => (arb_identifier(), prop::collection::vec(arb_param(), 0..3), body)
            .prop_map(|(name, params, stmts)| Node::FuncDecl(FuncDecl {
                name,
                doc_comment: None,
                flags: FuncFlags::default(),
                params,
                uses: vec![],
                stmts: Some(Box::new(stmts)),
                return_type: None,
            })),
    ]
    .boxed()
}

/// A whole file's statement list.
pub fn arb_file() -> BoxedStrategy<Node> {
    prop::collection::vec(arb_stmt(3), 1..6)
        .prop_map(Node::StmtList)
        .boxed()
}
