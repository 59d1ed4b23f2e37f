use std::collections::HashMap;

use crate::error::{ParseCause, ParseError};
use crate::lexer::Cursor;
use crate::value::Value;
use crate::{LenientResult, Object};

pub struct Parser<'a> {
    input: &'a str,
    array_refs: Vec<Value>,
    map_refs: Vec<Value>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            array_refs: Vec::new(),
            map_refs: Vec::new(),
        }
    }

    pub fn parse_strict(mut self) -> Result<Object, ParseError> {
        let mut object = Object::new();
        for (idx, raw_line) in self.input.lines().enumerate() {
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let lineno = idx + 1;
            let (ident, value) = self.parse_record(line, lineno)?;
            object.insert(ident, value);
        }
        Ok(object)
    }

    pub fn parse_lenient(mut self) -> LenientResult {
        let mut result = LenientResult::default();
        for (idx, raw_line) in self.input.lines().enumerate() {
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let lineno = idx + 1;
            match self.parse_record(line, lineno) {
                Ok((ident, value)) => {
                    result.object.insert(ident, value);
                }
                Err(err) => result.errors.push(err),
            }
        }
        result
    }

    fn parse_record(&mut self, line: &str, lineno: usize) -> Result<(String, Value), ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };

        let first = line.chars().next();
        if matches!(first, Some(' ') | Some('\t')) {
            return Err(err(1, ParseCause::LeadingWhitespace));
        }
        let last = line.chars().last();
        if matches!(last, Some(' ') | Some('\t')) {
            return Err(err(line.chars().count(), ParseCause::TrailingWhitespace));
        }

        let mut cursor = Cursor::new(line);

        // IDENT = letter, then letters/digits/underscore.
        let ident_start_col = cursor.column();
        match cursor.peek() {
            Some(c) if c.is_ascii_alphabetic() => {}
            Some(c) => return Err(err(ident_start_col, ParseCause::UnexpectedRune {
                found: c,
                expected: "identifier",
            })),
            None => {
                return Err(err(
                    ident_start_col,
                    ParseCause::UnexpectedEof {
                        expected: "identifier",
                    },
                ))
            }
        }
        let mut ident = String::new();
        while let Some(c) = cursor.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                ident.push(c);
                cursor.bump();
            } else {
                break;
            }
        }

        // Tabs may only have been excluded from the very first/last position
        // above; any tab remaining in the middle of the record is an error.
        if line.contains('\t') {
            return Err(err(
                line.find('\t').unwrap() + 1,
                ParseCause::TabInRecord,
            ));
        }

        match cursor.peek() {
            Some(' ') => cursor.bump(),
            Some(c) => {
                return Err(err(
                    cursor.column(),
                    ParseCause::UnexpectedRune {
                        found: c,
                        expected: "single space before value",
                    },
                ))
            }
            None => {
                return Err(err(
                    cursor.column(),
                    ParseCause::UnexpectedEof {
                        expected: "single space before value",
                    },
                ))
            }
        }

        // Exactly one space: the next char must not itself be a space.
        if cursor.peek() == Some(' ') {
            return Err(err(
                cursor.column(),
                ParseCause::UnexpectedRune {
                    found: ' ',
                    expected: "value (only one space allowed)",
                },
            ));
        }

        let value = self.parse_value(&mut cursor, lineno)?;

        if !cursor.at_end() {
            let c = cursor.peek().unwrap();
            return Err(err(
                cursor.column(),
                ParseCause::UnexpectedRune {
                    found: c,
                    expected: "end of record",
                },
            ));
        }

        Ok((ident, value))
    }

    fn parse_value(&mut self, cursor: &mut Cursor, lineno: usize) -> Result<Value, ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };

        match cursor.peek() {
            Some('"') => self.parse_string(cursor, lineno),
            Some('-') | Some('0'..='9') => self.parse_number(cursor, lineno),
            Some('(') => self.parse_compound(cursor, lineno),
            Some('n') => self.parse_nil(cursor, lineno),
            Some('#') => self.parse_backref(cursor, lineno, '#', "array"),
            Some('@') => self.parse_backref(cursor, lineno, '@', "map"),
            Some(c) => Err(err(
                cursor.column(),
                ParseCause::UnexpectedRune {
                    found: c,
                    expected: "value",
                },
            )),
            None => Err(err(
                cursor.column(),
                ParseCause::UnexpectedEof { expected: "value" },
            )),
        }
    }

    fn parse_string(&mut self, cursor: &mut Cursor, lineno: usize) -> Result<Value, ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };
        let start_col = cursor.column();
        cursor.bump(); // opening quote
        let mut out = String::new();
        loop {
            match cursor.next() {
                None => return Err(err(start_col, ParseCause::UnterminatedString)),
                Some('"') => return Ok(Value::Str(out)),
                Some('\\') => match cursor.next() {
                    None => return Err(err(start_col, ParseCause::UnterminatedString)),
                    Some(c) => out.push(decode_escape(c)),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_number(&mut self, cursor: &mut Cursor, lineno: usize) -> Result<Value, ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };
        let start_col = cursor.column();
        let mut text = String::new();
        if cursor.peek() == Some('-') {
            text.push('-');
            cursor.bump();
        }
        let digits_start = text.len();
        while let Some(c) = cursor.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                cursor.bump();
            } else {
                break;
            }
        }
        if text.len() == digits_start {
            return Err(err(start_col, ParseCause::InvalidNumber));
        }

        let mut is_float = false;
        if cursor.peek() == Some('.') {
            is_float = true;
            text.push('.');
            cursor.bump();
            while let Some(c) = cursor.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    cursor.bump();
                } else {
                    break;
                }
            }
        }

        let mut bits: Option<u64> = None;
        if cursor.peek() == Some('=') {
            is_float = true;
            cursor.bump();
            let hex_start = cursor.column();
            let mut hex = String::new();
            while let Some(c) = cursor.peek() {
                if c.is_ascii_hexdigit() {
                    hex.push(c);
                    cursor.bump();
                } else {
                    break;
                }
            }
            if hex.is_empty() {
                return Err(err(hex_start, ParseCause::InvalidNumber));
            }
            match u64::from_str_radix(&hex, 16) {
                Ok(v) => bits = Some(v),
                Err(_) => return Err(err(hex_start, ParseCause::InvalidNumber)),
            }
        }

        if is_float {
            match text.parse::<f64>() {
                Ok(v) => Ok(Value::Float(v, bits)),
                Err(_) => Err(err(start_col, ParseCause::InvalidNumber)),
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => Ok(Value::Int(v)),
                Err(_) => Err(err(start_col, ParseCause::InvalidNumber)),
            }
        }
    }

    fn parse_nil(&mut self, cursor: &mut Cursor, lineno: usize) -> Result<Value, ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };
        let start_col = cursor.column();
        for expected in ['n', 'i', 'l'] {
            match cursor.next() {
                Some(c) if c == expected => {}
                Some(c) => {
                    return Err(err(
                        start_col,
                        ParseCause::UnexpectedRune {
                            found: c,
                            expected: "nil",
                        },
                    ))
                }
                None => {
                    return Err(err(
                        start_col,
                        ParseCause::UnexpectedEof { expected: "nil" },
                    ))
                }
            }
        }
        match cursor.peek() {
            None => Ok(Value::Null),
            Some(c) if is_terminator(c) => Ok(Value::Null),
            Some(c) => Err(err(
                cursor.column(),
                ParseCause::UnexpectedRune {
                    found: c,
                    expected: "terminator after nil",
                },
            )),
        }
    }

    fn parse_backref(
        &mut self,
        cursor: &mut Cursor,
        lineno: usize,
        sigil: char,
        kind: &'static str,
    ) -> Result<Value, ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };
        let start_col = cursor.column();
        cursor.bump(); // sigil
        let mut digits = String::new();
        while let Some(c) = cursor.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                cursor.bump();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(err(
                start_col,
                ParseCause::UnexpectedRune {
                    found: sigil,
                    expected: "digits after back-reference sigil",
                },
            ));
        }
        let index: i64 = digits.parse().map_err(|_| err(start_col, ParseCause::InvalidNumber))?;
        let table = if sigil == '#' {
            &self.array_refs
        } else {
            &self.map_refs
        };
        match usize::try_from(index).ok().and_then(|i| table.get(i)) {
            Some(v) => Ok(v.clone()),
            None => Err(err(start_col, ParseCause::BadReference { kind, index })),
        }
    }

    fn parse_compound(&mut self, cursor: &mut Cursor, lineno: usize) -> Result<Value, ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };
        let open_col = cursor.column();
        cursor.bump(); // '('
        match cursor.peek() {
            Some('{') => {
                cursor.bump();
                self.parse_array_body(cursor, lineno, open_col)
            }
            Some('[') => {
                cursor.bump();
                self.parse_map_body(cursor, lineno, open_col)
            }
            Some(c) => Err(err(
                cursor.column(),
                ParseCause::UnexpectedRune {
                    found: c,
                    expected: "'{' or '[' after '('",
                },
            )),
            None => Err(err(
                cursor.column(),
                ParseCause::UnexpectedEof {
                    expected: "'{' or '[' after '('",
                },
            )),
        }
    }

    fn parse_size(&mut self, cursor: &mut Cursor, lineno: usize) -> Result<i64, ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };
        let start_col = cursor.column();
        let mut digits = String::new();
        while let Some(c) = cursor.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                cursor.bump();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(err(start_col, ParseCause::InvalidNumber));
        }
        digits
            .parse()
            .map_err(|_| err(start_col, ParseCause::InvalidNumber))
    }

    fn expect(
        &mut self,
        cursor: &mut Cursor,
        lineno: usize,
        expected_char: char,
        expected_desc: &'static str,
    ) -> Result<(), ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };
        match cursor.peek() {
            Some(c) if c == expected_char => {
                cursor.bump();
                Ok(())
            }
            Some(c) => Err(err(
                cursor.column(),
                ParseCause::UnexpectedRune {
                    found: c,
                    expected: expected_desc,
                },
            )),
            None => Err(err(
                cursor.column(),
                ParseCause::UnexpectedEof {
                    expected: expected_desc,
                },
            )),
        }
    }

    fn parse_array_body(
        &mut self,
        cursor: &mut Cursor,
        lineno: usize,
        open_col: usize,
    ) -> Result<Value, ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };
        let size = self.parse_size(cursor, lineno)?;
        self.expect(cursor, lineno, '|', "'|' after array size")?;

        let mut elements = Vec::new();
        if cursor.peek() == Some('}') {
            // "({0|})"
        } else if cursor.peek() == Some(',') && cursor.peek_at(1) == Some('}') {
            // "({0|,})"
            cursor.bump();
        } else {
            loop {
                let v = self.parse_value(cursor, lineno)?;
                elements.push(v);
                match cursor.peek() {
                    Some(',') => {
                        cursor.bump();
                        if cursor.peek() == Some('}') {
                            break;
                        }
                    }
                    Some('}') => break,
                    Some(c) => {
                        return Err(err(
                            cursor.column(),
                            ParseCause::UnexpectedRune {
                                found: c,
                                expected: "',' or '}' in array",
                            },
                        ))
                    }
                    None => {
                        return Err(err(
                            cursor.column(),
                            ParseCause::UnexpectedEof {
                                expected: "',' or '}' in array",
                            },
                        ))
                    }
                }
            }
        }
        self.expect(cursor, lineno, '}', "'}' closing array")?;
        self.expect(cursor, lineno, ')', "')' closing array")?;

        if elements.len() as i64 != size {
            return Err(err(
                open_col,
                ParseCause::SizeMismatch {
                    declared: size,
                    actual: elements.len(),
                },
            ));
        }

        let value = Value::Array(elements);
        self.array_refs.push(value.clone());
        Ok(value)
    }

    fn parse_map_body(
        &mut self,
        cursor: &mut Cursor,
        lineno: usize,
        open_col: usize,
    ) -> Result<Value, ParseError> {
        let err = |column: usize, cause: ParseCause| ParseError {
            line: lineno,
            column,
            cause,
        };
        let size = self.parse_size(cursor, lineno)?;
        self.expect(cursor, lineno, '|', "'|' after map size")?;

        let mut entries: Vec<(Value, Value)> = Vec::new();
        if cursor.peek() == Some(']') {
            // "([0|])"
        } else if cursor.peek() == Some(',') && cursor.peek_at(1) == Some(']') {
            cursor.bump();
        } else {
            loop {
                let key = self.parse_value(cursor, lineno)?;
                self.expect(cursor, lineno, ':', "':' between map key and value")?;
                let val = self.parse_value(cursor, lineno)?;
                entries.push((key, val));
                match cursor.peek() {
                    Some(',') => {
                        cursor.bump();
                        if cursor.peek() == Some(']') {
                            break;
                        }
                    }
                    Some(']') => break,
                    Some(c) => {
                        return Err(err(
                            cursor.column(),
                            ParseCause::UnexpectedRune {
                                found: c,
                                expected: "',' or ']' in map",
                            },
                        ))
                    }
                    None => {
                        return Err(err(
                            cursor.column(),
                            ParseCause::UnexpectedEof {
                                expected: "',' or ']' in map",
                            },
                        ))
                    }
                }
            }
        }
        self.expect(cursor, lineno, ']', "']' closing map")?;
        self.expect(cursor, lineno, ')', "')' closing map")?;

        if entries.len() as i64 != size {
            return Err(err(
                open_col,
                ParseCause::SizeMismatch {
                    declared: size,
                    actual: entries.len(),
                },
            ));
        }

        let mut map = HashMap::new();
        for (key, val) in entries {
            if let Some(key_str) = key.to_key_string() {
                map.insert(key_str, val);
            }
            // compound (array/map) keys are counted above but dropped here.
        }

        let value = Value::Map(map);
        self.map_refs.push(value.clone());
        Ok(value)
    }
}

fn decode_escape(c: char) -> char {
    match c {
        '0' => '\0',
        'a' => '\u{7}',
        'b' => '\u{8}',
        't' => '\t',
        'n' => '\n',
        'v' => '\u{b}',
        'f' => '\u{c}',
        'r' => '\r',
        '"' => '"',
        '\\' => '\\',
        other => other,
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, ',' | ':' | ']' | '}' | ')')
}
