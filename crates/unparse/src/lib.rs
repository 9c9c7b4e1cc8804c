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

//! Regenerates PHP source text from php-ast trees.
//!
//! Trees come either typed (a [`Node`] from `rephp-syntax`) or as the JSON serialisation of a
//! php-ast dump, which [`render_json`] decodes first.

mod errors;
mod literal;
mod options;
mod precedence;
mod scope;
mod unparse;

#[cfg(test)]
mod tests;

pub use crate::errors::UnparseError;
pub use crate::options::UnparseOptions;
pub use rephp_syntax::{DecodeError, Node};

use crate::unparse::Unparse;
use rephp_syntax::decode_json;
use tracing::debug;

/// Render a tree as a file (or, with `file_prologue` off, as the statements of one).
pub fn unparse(tree: &Node, options: &UnparseOptions) -> Result<String, UnparseError> {
    debug!(kind = %tree.describe(), prologue = options.file_prologue, "unparsing tree");
    let source = Unparse::new(options).unparse_file(tree)?;
    debug!(bytes = source.len(), "unparsed");
    Ok(source)
}

/// Render a tree for embedding: no prologue, no trailing line break.
pub fn unparse_fragment(tree: &Node, options: &UnparseOptions) -> Result<String, UnparseError> {
    debug!(kind = %tree.describe(), "unparsing fragment");
    let unparse = Unparse::new(options);
    let source = match tree {
        Node::StmtList(stmts) => unparse.unparse_stmts(stmts)?,
        other => unparse.unparse_node(other)?,
    };
    Ok(source.trim_end_matches('\n').to_string())
}

/// Decode a JSON php-ast dump and render it as a file.
pub fn render_json(json: &str, options: &UnparseOptions) -> Result<String, UnparseError> {
    let tree = decode_json(json, options.decode_options())?;
    unparse(&tree, options)
}
