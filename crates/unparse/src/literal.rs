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

//! Scalar rendering: numbers, booleans, and double-quoted string bodies.

use rephp_syntax::Literal;

/// Escape `s` for the inside of a double-quoted (or, with `quote` set to a backtick, shell-exec)
/// string. `$` is always escaped so that no interpolation is introduced.
pub(crate) fn escape_str(s: &str, quote: char) -> String {
    s.chars().fold(String::with_capacity(s.len()), |mut acc, c| {
        match c {
            '\\' => acc.push_str("\\\\"),
            '$' => acc.push_str("\\$"),
            '\n' => acc.push_str("\\n"),
            '\r' => acc.push_str("\\r"),
            '\t' => acc.push_str("\\t"),
            '\x0b' => acc.push_str("\\v"),
            '\x0c' => acc.push_str("\\f"),
            '\x1b' => acc.push_str("\\e"),
            c if c == quote => {
                acc.push('\\');
                acc.push(c);
            }
            c if c.is_ascii_control() => acc.push_str(&format!("\\x{:02X}", c as u32)),
            _ => acc.push(c),
        }
        acc
    })
}

pub(crate) fn quote_str(s: &str) -> String {
    format!("\"{}\"", escape_str(s, '"'))
}

pub(crate) fn float_literal(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    // Debug formatting always keeps a fractional part or exponent, so the value stays a float.
    format!("{f:?}")
}

pub(crate) fn literal(literal: &Literal) -> String {
    match literal {
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => float_literal(*f),
        Literal::Bool(true) => "true".to_string(),
        Literal::Bool(false) => "false".to_string(),
        Literal::Str(s) => quote_str(s),
    }
}

/// Literals that render with a leading sign.
pub(crate) fn is_negative(literal: &Literal) -> bool {
    match literal {
        Literal::Int(i) => *i < 0,
        Literal::Float(f) => f.is_sign_negative() && !f.is_nan(),
        Literal::Bool(_) | Literal::Str(_) => false,
    }
}

/// Whether `s` can be written as a bare `$name`.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() || !c.is_ascii() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric() || !c.is_ascii())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("a\\\"b", r#""a\\\"b""#; "backslash and quote")]
    #[test_case("line\nbreak", r#""line\nbreak""#; "newline")]
    #[test_case("$x", r#""\$x""#; "interpolation marker")]
    #[test_case("tab\there", r#""tab\there""#; "tab")]
    #[test_case("\u{7f}\u{1}", r#""\x7F\x01""#; "other control characters")]
    #[test_case("héllo", "\"héllo\""; "non ascii passes through")]
    fn quotes_strings(input: &str, expected: &str) {
        assert_eq!(quote_str(input), expected);
    }

    #[test]
    fn shell_exec_escapes_backticks_not_quotes() {
        assert_eq!(escape_str("echo \"`x`\"", '`'), "echo \"\\`x\\`\"");
    }

    #[test_case(1.0, "1.0"; "whole")]
    #[test_case(0.5, "0.5"; "fraction")]
    #[test_case(1e100, "1e100"; "exponent")]
    #[test_case(-2.5, "-2.5"; "negative")]
    #[test_case(f64::INFINITY, "INF"; "infinity")]
    #[test_case(f64::NEG_INFINITY, "-INF"; "negative infinity")]
    fn floats(value: f64, expected: &str) {
        assert_eq!(float_literal(value), expected);
    }

    #[test]
    fn nan_is_the_constant() {
        assert_eq!(float_literal(f64::NAN), "NAN");
    }

    #[test_case("x", true; "simple")]
    #[test_case("_under_score9", true; "underscore and digits")]
    #[test_case("9lives", false; "leading digit")]
    #[test_case("with space", false; "space")]
    #[test_case("", false; "empty")]
    #[test_case("ünï", true; "high bytes")]
    fn identifiers(name: &str, expected: bool) {
        assert_eq!(is_identifier(name), expected);
    }
}
