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

//! Deeply nested JSON dumps, where every node costs two levels of JSON nesting.

use pretty_assertions::assert_eq;
use rephp_unparse::{DecodeError, UnparseError, UnparseOptions, render_json};
use test_case::test_case;

/// `echo "a" . "a" . ...;` with `levels` left-nested concatenations.
fn concat_chain(levels: usize) -> String {
    let mut expr = r#""a""#.to_string();
    for _ in 0..levels {
        expr = format!(
            r#"{{"kind": "AST_BINARY_OP", "flags": 8, "children": {{"left": {expr}, "right": "a"}}}}"#
        );
    }
    format!(
        r#"{{"kind": "AST_STMT_LIST", "children": [{{"kind": "AST_ECHO", "children": {{"expr": {expr}}}}}]}}"#
    )
}

#[test_case(70, 256; "beyond the json parser default")]
#[test_case(2000, 4096; "very deep")]
fn deep_chains_render(levels: usize, max_depth: usize) {
    let options = UnparseOptions {
        max_depth,
        ..Default::default()
    };
    let source = render_json(&concat_chain(levels), &options).unwrap();
    let operands = vec![r#""a""#; levels + 1].join(" . ");
    assert_eq!(source, format!("<?php\n\necho {operands};\n"));
}

#[test]
fn nesting_past_the_limit_is_rejected() {
    let options = UnparseOptions {
        max_depth: 32,
        ..Default::default()
    };
    let err = render_json(&concat_chain(70), &options).unwrap_err();
    assert!(matches!(
        err,
        UnparseError::Decode(DecodeError::TooDeep { limit: 32 })
    ));
}
