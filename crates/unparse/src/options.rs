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

//! Options for a single render, created by the caller (usually from CLI flags and an optional
//! config file) and passed by reference into every entry point.

use rephp_syntax::DecodeOptions;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnparseOptions {
    /// Emit the `<?php` opening tag and a blank line before a whole-file render.
    pub file_prologue: bool,
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Maximum node nesting before rendering gives up with `TooDeep`.
    pub max_depth: usize,
    /// Accept kinds from earlier AST versions when decoding JSON input.
    pub translate_legacy: bool,
}

impl Default for UnparseOptions {
    fn default() -> Self {
        Self {
            file_prologue: true,
            indent_width: 4,
            max_depth: 256,
            translate_legacy: true,
        }
    }
}

impl UnparseOptions {
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            translate_legacy: self.translate_legacy,
            max_depth: self.max_depth,
        }
    }
}
