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

use thiserror::Error;

/// Contract violations in the shape of an input tree. None of these are recoverable; the node,
/// slot or flag that triggered them is reported so the gap can be traced back to the vocabulary.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unknown node kind: {0}")]
    UnknownKind(String),
    #[error("Unsupported node kind: {0}")]
    UnsupportedKind(String),
    #[error("Unknown flags {flags} for {kind}")]
    UnknownFlag { kind: String, flags: u32 },
    #[error("Missing child `{slot}` of {kind}")]
    MissingChild { kind: String, slot: String },
    #[error("Unexpected value in `{slot}` of {kind}: {found}")]
    UnexpectedValue {
        kind: String,
        slot: String,
        found: String,
    },
    #[error("Tree nesting exceeds the limit of {limit} levels")]
    TooDeep { limit: usize },
    #[error("Malformed JSON tree: {0}")]
    Json(#[from] serde_json::Error),
}
