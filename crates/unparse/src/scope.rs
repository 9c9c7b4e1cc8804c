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

//! Renderer state: the indentation level, and the recursion depth used to bound stack use.
//! Both only ever change through guards, so every exit path (including `?` on an error) restores
//! them.

use crate::errors::UnparseError;
use std::cell::Cell;

#[derive(Debug, Default)]
pub(crate) struct Scope {
    indent: Cell<usize>,
    depth: Cell<usize>,
}

/// Holds one level of indentation until dropped.
#[must_use]
pub(crate) struct IndentGuard<'a> {
    level: &'a Cell<usize>,
}

impl Drop for IndentGuard<'_> {
    fn drop(&mut self) {
        self.level.set(self.level.get() - 1);
    }
}

/// Holds one level of recursion until dropped.
#[must_use]
pub(crate) struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

impl Scope {
    pub(crate) fn indent(&self) -> IndentGuard<'_> {
        self.indent.set(self.indent.get() + 1);
        IndentGuard {
            level: &self.indent,
        }
    }

    pub(crate) fn level(&self) -> usize {
        self.indent.get()
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth.get()
    }

    pub(crate) fn descend(&self, limit: usize) -> Result<DepthGuard<'_>, UnparseError> {
        let depth = self.depth.get();
        if depth >= limit {
            return Err(UnparseError::TooDeep { limit });
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_restore_on_drop() {
        let scope = Scope::default();
        {
            let _outer = scope.indent();
            let _inner = scope.indent();
            assert_eq!(scope.level(), 2);
        }
        assert_eq!(scope.level(), 0);
    }

    #[test]
    fn guards_restore_on_early_return() {
        fn fails(scope: &Scope) -> Result<(), UnparseError> {
            let _indent = scope.indent();
            let _depth = scope.descend(10)?;
            let _never = scope.descend(1)?;
            Ok(())
        }
        let scope = Scope::default();
        assert!(matches!(fails(&scope), Err(UnparseError::TooDeep { limit: 1 })));
        assert_eq!(scope.level(), 0);
        assert_eq!(scope.depth(), 0);
    }
}
