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

/// Operator precedence for unparsing.
/// Higher numbers = higher precedence (more tightly binding)
use crate::literal::is_negative;
use rephp_syntax::flags::{BinaryOp, UnaryOp};
use rephp_syntax::{Literal, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    LowXor = 1,          // xor
    Keyword = 2,         // yield, yield from, print, include, throw
    Assign = 3,          // = += -= ... and arrow functions
    Ternary = 4,         // ? :
    Coalesce = 5,        // ??
    Or = 6,              // ||
    And = 7,             // && (and `and`, which renders the same)
    BitOr = 8,           // |
    BitXor = 9,          // ^
    BitAnd = 10,         // &
    Equality = 11,       // == != === !== <=>
    Relational = 12,     // < <= > >=
    Concat = 13,         // .
    Shift = 14,          // << >>
    Additive = 15,       // + -
    Multiplicative = 16, // * / %
    Not = 17,            // !
    Instanceof = 18,     // instanceof
    Unary = 19,          // ++ -- ~ casts @ and unary + -
    Pow = 20,            // ** (right associative)
    New = 21,            // new, clone, closures
    Primary = 22,        // variables, literals, calls, and anything that wraps itself
}

impl Precedence {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

pub fn binary_precedence(op: BinaryOp) -> Precedence {
    match op {
        BinaryOp::BoolXor => Precedence::LowXor,
        BinaryOp::Coalesce => Precedence::Coalesce,
        BinaryOp::BoolOr => Precedence::Or,
        BinaryOp::BoolAnd => Precedence::And,
        BinaryOp::BitwiseOr => Precedence::BitOr,
        BinaryOp::BitwiseXor => Precedence::BitXor,
        BinaryOp::BitwiseAnd => Precedence::BitAnd,
        BinaryOp::IsIdentical
        | BinaryOp::IsNotIdentical
        | BinaryOp::IsEqual
        | BinaryOp::IsNotEqual
        | BinaryOp::Spaceship => Precedence::Equality,
        BinaryOp::IsSmaller
        | BinaryOp::IsSmallerOrEqual
        | BinaryOp::IsGreater
        | BinaryOp::IsGreaterOrEqual => Precedence::Relational,
        BinaryOp::Concat => Precedence::Concat,
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight => Precedence::Shift,
        BinaryOp::Add | BinaryOp::Sub => Precedence::Additive,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Precedence::Multiplicative,
        BinaryOp::Pow => Precedence::Pow,
    }
}

/// Get the precedence a node presents to its parent. Ternaries and `??` wrap themselves in
/// parentheses, so they present as primary.
pub fn get_precedence(node: &Node) -> u8 {
    let precedence = match node {
        Node::Literal(literal) if is_negative(literal) => Precedence::Unary,
        Node::Literal(Literal::Int(_) | Literal::Float(_) | Literal::Bool(_) | Literal::Str(_)) => {
            Precedence::Primary
        }
        Node::BinaryOp {
            op: BinaryOp::Coalesce,
            ..
        } => Precedence::Primary,
        Node::BinaryOp { op, .. } => binary_precedence(*op),
        Node::Conditional { .. } => Precedence::Primary,
        Node::Assign { .. } | Node::AssignRef { .. } | Node::AssignOp { .. } => Precedence::Assign,
        Node::ArrowFunc(_) => Precedence::Assign,
        Node::Yield { .. }
        | Node::YieldFrom(_)
        | Node::Print(_)
        | Node::Throw(_)
        | Node::IncludeOrEval { .. } => Precedence::Keyword,
        Node::UnaryOp {
            op: UnaryOp::BoolNot,
            ..
        } => Precedence::Not,
        Node::UnaryOp { .. } | Node::Cast { .. } | Node::IncDec { .. } => Precedence::Unary,
        Node::Instanceof { .. } => Precedence::Instanceof,
        Node::New { .. } | Node::Clone(_) | Node::Closure(_) => Precedence::New,
        _ => Precedence::Primary,
    };
    precedence.as_u8()
}
