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

//! Properties every rendering must have, whatever the tree.

use super::generators::{arb_expr, arb_file, arb_stmt};
use crate::options::UnparseOptions;
use crate::unparse::Unparse;
use crate::{UnparseError, unparse, unparse_fragment};
use proptest::prelude::*;

fn brackets_balance(source: &str) -> bool {
    let mut open = Vec::new();
    for c in source.chars() {
        match c {
            '(' | '[' | '{' => open.push(c),
            ')' if open.pop() != Some('(') => return false,
            ']' if open.pop() != Some('[') => return false,
            '}' if open.pop() != Some('{') => return false,
            _ => {}
        }
    }
    open.is_empty()
}

/// Every line ends a statement, opens or closes a block, or is a declaration header whose brace
/// follows on the next line.
fn lines_terminate(source: &str) -> bool {
    let lines: Vec<&str> = source.lines().map(str::trim).collect();
    lines.iter().enumerate().all(|(i, line)| {
        line.is_empty()
            || line.ends_with([';', '{', '}', ':'])
            || (line.ends_with(')') && lines.get(i + 1) == Some(&"{"))
    })
}

fn no_prologue() -> UnparseOptions {
    UnparseOptions {
        file_prologue: false,
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_expressions_render(expr in arb_expr(4)) {
        let options = UnparseOptions::default();
        let source = unparse_fragment(&expr, &options)?;
        prop_assert!(!source.is_empty());
        prop_assert!(!source.contains('\n'), "expression spans lines: {source}");
        prop_assert!(brackets_balance(&source), "unbalanced: {source}");
    }

    #[test]
    fn prop_rendering_is_deterministic(file in arb_file()) {
        let options = UnparseOptions::default();
        let first = unparse(&file, &options)?;
        let second = unparse(&file, &options)?;
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_files_are_well_formed(file in arb_file()) {
        let options = no_prologue();
        let source = unparse(&file, &options)?;
        prop_assert!(brackets_balance(&source), "unbalanced:\n{source}");
        prop_assert!(lines_terminate(&source), "unterminated line:\n{source}");
        for line in source.lines() {
            let indent = line.len() - line.trim_start_matches(' ').len();
            prop_assert_eq!(indent % options.indent_width, 0, "misaligned line: {:?}", line);
        }
    }

    #[test]
    fn prop_prologue_only_prefixes(file in arb_file()) {
        let with = unparse(&file, &UnparseOptions::default())?;
        let without = unparse(&file, &no_prologue())?;
        prop_assert_eq!(with, format!("<?php\n\n{without}"));
    }

    #[test]
    fn prop_state_is_restored(stmt in arb_stmt(3), max_depth in 1usize..12) {
        let options = UnparseOptions {
            max_depth,
            ..Default::default()
        };
        let unparse = Unparse::new(&options);
        let result = unparse.unparse_file(&stmt);
        prop_assert_eq!(unparse.indent_level(), 0);
        prop_assert_eq!(unparse.depth(), 0);
        if let Err(err) = result {
            let limited = matches!(err, UnparseError::TooDeep { limit } if limit == max_depth);
            prop_assert!(limited, "unexpected error: {}", err);
        }
    }
}
