// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP parameter tokenizer (nom) and entity instance scanner (memchr).

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};

/// A single STEP parameter value, borrowing from the file content
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Entity reference: #123
    EntityRef(u32),
    /// String literal body, still STEP-escaped: 'it''s'
    String(&'a str),
    /// Integer: 42
    Integer(i64),
    /// Real: 3.14, 0., 1.5E-10
    Float(f64),
    /// Enumeration: .T., .ELEMENT.
    Enum(&'a str),
    /// Aggregate: (1,2,3)
    List(Vec<Token<'a>>),
    /// Typed parameter: IFCLABEL('x'), IFCBOOLEAN(.T.)
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Unset: $
    Null,
    /// Derived: *
    Derived,
}

fn ws(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace())(input)
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn entity_ref(input: &str) -> IResult<&str, Token> {
    map(
        preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
        Token::EntityRef,
    )(input)
}

/// String body up to the closing quote; `''` is an escaped quote.
fn string_body(input: &str) -> IResult<&str, &str> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while let Some(offset) = memchr::memchr(b'\'', &bytes[i..]) {
        let quote = i + offset;
        if bytes.get(quote + 1) == Some(&b'\'') {
            i = quote + 2;
            continue;
        }
        return Ok((&input[quote..], &input[..quote]));
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn string_literal(input: &str) -> IResult<&str, Token> {
    map(delimited(char('\''), string_body, char('\'')), Token::String)(input)
}

fn integer(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(pair(opt(one_of("+-")), digit1)),
        |s: &str| s.parse::<i64>().map(Token::Integer),
    )(input)
}

/// Reals always carry a decimal point in STEP; the fraction may be empty ("0.").
fn real(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| fast_float::parse::<f64, _>(s).map(Token::Float),
    )(input)
}

fn enumeration(input: &str) -> IResult<&str, Token> {
    map(delimited(char('.'), keyword, char('.')), Token::Enum)(input)
}

fn null(input: &str) -> IResult<&str, Token> {
    map(char('$'), |_| Token::Null)(input)
}

fn derived(input: &str) -> IResult<&str, Token> {
    map(char('*'), |_| Token::Derived)(input)
}

fn parameter_list(input: &str) -> IResult<&str, Vec<Token>> {
    delimited(
        terminated(char('('), ws),
        separated_list0(delimited(ws, char(','), ws), token),
        preceded(ws, char(')')),
    )(input)
}

fn list(input: &str) -> IResult<&str, Token> {
    map(parameter_list, Token::List)(input)
}

fn typed_value(input: &str) -> IResult<&str, Token> {
    map(pair(keyword, parameter_list), |(name, args)| {
        Token::TypedValue(name, args)
    })(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    delimited(
        ws,
        alt((
            real,
            integer,
            entity_ref,
            string_literal,
            enumeration,
            list,
            typed_value,
            null,
            derived,
        )),
        ws,
    )(input)
}

/// Parse one entity instance: `#123=IFCWALL('guid',$,...);`
///
/// Returns the express id, the upper-case type keyword and the attribute tokens.
pub fn parse_entity(input: &str) -> Result<(u32, &str, Vec<Token>)> {
    let result: IResult<&str, (u32, &str, Vec<Token>)> = tuple((
        delimited(
            ws,
            preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
            ws,
        ),
        preceded(char('='), delimited(ws, keyword, ws)),
        terminated(parameter_list, pair(ws, char(';'))),
    ))(input);

    match result {
        Ok((_, parsed)) => Ok(parsed),
        Err(e) => {
            let position = match &e {
                nom::Err::Error(inner) | nom::Err::Failure(inner) => {
                    input.len() - inner.input.len()
                }
                nom::Err::Incomplete(_) => input.len(),
            };
            Err(Error::parse(
                position,
                format!("malformed entity instance: {}", preview(input)),
            ))
        }
    }
}

fn preview(line: &str) -> &str {
    match line.char_indices().nth(80) {
        Some((end, _)) => &line[..end],
        None => line,
    }
}

/// Linear scanner over the DATA section, one entity instance at a time
///
/// Semicolons and hashes inside string literals are skipped, so the scanner
/// never splits an instance in the middle of a label.
pub struct EntityScanner<'a> {
    content: &'a str,
    position: usize,
}

impl<'a> EntityScanner<'a> {
    /// Create a scanner positioned at the start of the DATA section
    /// (or at the start of the input for bare instance fragments)
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            position: data_section_start(content),
        }
    }

    /// Next instance as `(id, type_name, start, end)`; `end` is past the `;`
    pub fn next_entity(&mut self) -> Option<(u32, &'a str, usize, usize)> {
        let bytes = self.content.as_bytes();
        let len = bytes.len();

        loop {
            let start = self.position + memchr::memchr(b'#', &bytes[self.position..])?;
            let mut pos = start + 1;

            let id_start = pos;
            while pos < len && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            let id_end = pos;
            while pos < len && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }

            if id_end == id_start || pos >= len || bytes[pos] != b'=' {
                // A reference inside some other construct, keep looking
                self.position = start + 1;
                continue;
            }

            let end = find_instance_end(bytes, pos)?;
            let Ok(id) = self.content[id_start..id_end].parse::<u32>() else {
                // Id out of range: drop this instance only
                self.position = end;
                continue;
            };

            pos += 1;
            while pos < end && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            let type_start = pos;
            while pos < end && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                pos += 1;
            }

            self.position = end;
            return Some((id, &self.content[type_start..pos], start, end));
        }
    }
}

/// Type keyword of a single instance line (`#12=IFCWALL(...);` gives `IFCWALL`)
pub fn entity_type_name(line: &str) -> Option<&str> {
    let after_eq = &line[line.find('=')? + 1..];
    let trimmed = after_eq.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    (end > 0).then(|| &trimmed[..end])
}

/// Byte offset just past `DATA;`, or 0 when the input has no header
pub fn data_section_start(content: &str) -> usize {
    memchr::memmem::find(content.as_bytes(), b"DATA;")
        .map(|offset| offset + "DATA;".len())
        .unwrap_or(0)
}

/// Index one past the terminating `;`, skipping quoted strings
fn find_instance_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let offset = memchr::memchr2(b';', b'\'', &bytes[pos..])?;
        pos += offset;
        if bytes[pos] == b';' {
            return Some(pos + 1);
        }
        // Skip the string literal; '' stays inside it
        pos += 1;
        loop {
            let close = memchr::memchr(b'\'', &bytes[pos..])?;
            pos += close + 1;
            if bytes.get(pos) == Some(&b'\'') {
                pos += 1;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_tokens() {
        assert_eq!(entity_ref("#123"), Ok(("", Token::EntityRef(123))));
        assert_eq!(integer("-42"), Ok(("", Token::Integer(-42))));
        assert_eq!(real("0."), Ok(("", Token::Float(0.0))));
        assert_eq!(real("1.5E-10"), Ok(("", Token::Float(1.5e-10))));
        assert_eq!(enumeration(".ELEMENT."), Ok(("", Token::Enum("ELEMENT"))));
        assert_eq!(null("$"), Ok(("", Token::Null)));
        assert_eq!(derived("*"), Ok(("", Token::Derived)));
    }

    #[test]
    fn test_string_with_escaped_quote() {
        assert_eq!(
            string_literal("'it''s; #1'"),
            Ok(("", Token::String("it''s; #1")))
        );
    }

    #[test]
    fn test_nested_list_and_typed_value() {
        let (_, token) = list("( 1 , (2.,3.) , IFCLABEL('x') )").unwrap();
        let Token::List(items) = token else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], Token::List(vec![Token::Float(2.0), Token::Float(3.0)]));
        assert_eq!(
            items[2],
            Token::TypedValue("IFCLABEL", vec![Token::String("x")])
        );
    }

    #[test]
    fn test_parse_entity() {
        let (id, type_name, args) =
            parse_entity("#9= IFCDIRECTION((0.,0.,1.)) ;").unwrap();
        assert_eq!(id, 9);
        assert_eq!(type_name, "IFCDIRECTION");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_parse_entity_rejects_complex_instance() {
        let err = parse_entity("#5=(IFCA()IFCB());").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_entity_type_name() {
        assert_eq!(entity_type_name("#12= IfcWall('x',$);"), Some("IfcWall"));
        assert_eq!(entity_type_name("#12=('x');"), None);
    }

    #[test]
    fn test_scanner_skips_header_and_strings() {
        let content = "ISO-10303-21;\nHEADER;\nFILE_NAME('a;#1=b','',(''),(''),'','','');\nENDSEC;\nDATA;\n\
#1=IFCPROJECT('guid',$,'Name; with #2=semicolon',$,$,$,$,$,$);\n\
#2=IFCWALL('guid2',$,$,$,$,$,$,$);\n\
#3 = IFCDOOR('guid3',$,$,$,$,$,$,$,$,$);\nENDSEC;\nEND-ISO-10303-21;\n";

        let mut scanner = EntityScanner::new(content);
        let ids: Vec<(u32, &str)> = std::iter::from_fn(|| scanner.next_entity())
            .map(|(id, name, _, _)| (id, name))
            .collect();
        assert_eq!(ids, vec![(1, "IFCPROJECT"), (2, "IFCWALL"), (3, "IFCDOOR")]);
    }

    #[test]
    fn test_scanner_skips_out_of_range_id() {
        let content = "DATA;\n\
#1=IFCWALL('a',$);\n\
#99999999999=IFCSLAB('b',$);\n\
#3=IFCDOOR('c',$);\n";

        let mut scanner = EntityScanner::new(content);
        let ids: Vec<u32> = std::iter::from_fn(|| scanner.next_entity())
            .map(|(id, _, _, _)| id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
