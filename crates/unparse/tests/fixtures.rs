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

//! Whole-file renders of JSON php-ast dumps. Each `<name>.json` renders to `<name>.php`.

use pretty_assertions::assert_eq;
use rephp_unparse::{UnparseOptions, render_json};
use test_each_file::test_each_file;

fn render_fixture([json, expected]: [&str; 2]) {
    let source = render_json(json, &UnparseOptions::default()).unwrap();
    assert_eq!(source, expected);
}

test_each_file! { for ["json", "php"] in "./crates/unparse/tests/fixtures" => render_fixture }
