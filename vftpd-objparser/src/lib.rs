//! Parser for the MUD's line-oriented "LPC object" dump format.
//!
//! Each record is `IDENT SPACE VALUE\n`. Values are one of nil, integer, float,
//! string, sized array, sized mapping, or a back-reference into an earlier
//! array/mapping of the same parse. See [`parse_strict`] and [`parse_lenient`].

mod error;
mod value;

mod lexer;
mod parser;

pub use error::{ParseCause, ParseError};
pub use value::Value;

use std::collections::HashMap;

/// The decoded top-level object: a record name maps to its parsed [`Value`].
pub type Object = HashMap<String, Value>;

/// Result of a lenient parse: whatever records parsed cleanly, plus every
/// error encountered along the way.
#[derive(Debug, Default)]
pub struct LenientResult {
    pub object: Object,
    pub errors: Vec<ParseError>,
}

/// Parse `input` in strict mode: the first malformed record aborts the whole
/// parse and its [`ParseError`] is returned.
pub fn parse_strict(input: &str) -> Result<Object, ParseError> {
    parser::Parser::new(input).parse_strict()
}

/// Parse `input` in lenient mode: malformed records are skipped and recorded
/// in [`LenientResult::errors`]; every well-formed record is still returned.
pub fn parse_lenient(input: &str) -> LenientResult {
    parser::Parser::new(input).parse_lenient()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars() {
        let obj = parse_strict("password \"$argon2id$m=1,t=1,p=1$YQ$YQ\"\nlevel 31\n").unwrap();
        assert_eq!(
            obj.get("password"),
            Some(&Value::Str("$argon2id$m=1,t=1,p=1$YQ$YQ".to_string()))
        );
        assert_eq!(obj.get("level"), Some(&Value::Int(31)));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let obj = parse_strict("# a comment\n\nlevel 5\n").unwrap();
        assert_eq!(obj.get("level"), Some(&Value::Int(5)));
    }

    #[test]
    fn rejects_leading_whitespace() {
        let err = parse_strict(" level 5\n").unwrap_err();
        assert!(matches!(err.cause, ParseCause::LeadingWhitespace));
    }

    #[test]
    fn rejects_tab_in_record() {
        let err = parse_strict("level\t5\n").unwrap_err();
        assert!(matches!(err.cause, ParseCause::TabInRecord));
    }

    #[test]
    fn rejects_more_than_one_space() {
        let err = parse_strict("level  5\n").unwrap_err();
        assert!(matches!(err.cause, ParseCause::UnexpectedRune { .. }));
    }

    #[test]
    fn parses_array_with_trailing_comma() {
        let obj = parse_strict("items ({2|1,2,})\n").unwrap();
        assert_eq!(
            obj.get("items"),
            Some(&Value::Array(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn parses_empty_array_both_forms() {
        let obj = parse_strict("a ({0|})\nb ({0|,})\n").unwrap();
        assert_eq!(obj.get("a"), Some(&Value::Array(vec![])));
        assert_eq!(obj.get("b"), Some(&Value::Array(vec![])));
    }

    #[test]
    fn rejects_array_size_mismatch_in_strict_mode() {
        let err = parse_strict("items ({3|1,2,})\n").unwrap_err();
        assert!(matches!(err.cause, ParseCause::SizeMismatch { .. }));
    }

    #[test]
    fn lenient_mode_keeps_good_siblings() {
        let result = parse_lenient("a ({3|1,2,})\nb 7\n");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.object.get("b"), Some(&Value::Int(7)));
        assert!(result.object.get("a").is_none());
    }

    #[test]
    fn parses_map_and_drops_compound_keys_but_counts_them() {
        let obj = parse_strict(r#"m ([3|"x":1,({1|1}):2,"y":3,])"#).unwrap();
        let map = match obj.get("m") {
            Some(Value::Map(m)) => m,
            other => panic!("expected map, got {:?}", other),
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("x"), Some(&Value::Int(1)));
        assert_eq!(map.get("y"), Some(&Value::Int(3)));
    }

    #[test]
    fn parses_nested_back_references() {
        let obj = parse_strict("a ({1|({0|})})\nb #0\n").unwrap();
        let inner = match obj.get("a") {
            Some(Value::Array(v)) => v[0].clone(),
            other => panic!("expected array, got {:?}", other),
        };
        assert_eq!(obj.get("b"), Some(&inner));
    }

    #[test]
    fn parses_float_with_exact_hex_suffix() {
        let obj = parse_strict("f 1.5=3ff8000000000000\n").unwrap();
        match obj.get("f") {
            Some(Value::Float(v, bits)) => {
                assert!((v - 1.5).abs() < f64::EPSILON);
                assert_eq!(*bits, Some(0x3ff8000000000000));
            }
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn string_escapes_decode() {
        let obj = parse_strict(r#"s "line1\nline2\ttab\"quote""#).unwrap();
        assert_eq!(
            obj.get("s"),
            Some(&Value::Str("line1\nline2\ttab\"quote".to_string()))
        );
    }

    #[test]
    fn unknown_escape_yields_literal_char() {
        let obj = parse_strict(r#"s "a\zb""#).unwrap();
        assert_eq!(obj.get("s"), Some(&Value::Str("azb".to_string())));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = parse_strict("s \"abc").unwrap_err();
        assert!(matches!(err.cause, ParseCause::UnterminatedString));
    }

    #[test]
    fn nil_parses() {
        let obj = parse_strict("x nil\n").unwrap();
        assert_eq!(obj.get("x"), Some(&Value::Null));
    }
}
