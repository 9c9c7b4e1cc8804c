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

//! Input boundary of the unparser: the php-ast node vocabulary, its JSON serialisation, and the
//! canonical typed tree it is decoded into.

mod ast;
mod decode;
mod errors;
pub mod flags;
mod kind;
mod raw;

pub use crate::ast::{ArrowFunc, ClassDecl, FuncDecl, Literal, Member, Node, Param};
pub use crate::decode::{DecodeOptions, Decoder, UNSUPPORTED_KINDS, decode, decode_json};
pub use crate::errors::DecodeError;
pub use crate::kind::{AST_VERSION, Kind};
pub use crate::raw::{RawChild, RawChildren, RawNode};
