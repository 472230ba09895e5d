//! Parser for the index-depend text format.
//!
//! A stream of sections, each starting with a `==> <eggfile> <==` header, each containing
//! `key = literal` assignments. Literals are restricted to strings, integers, `None` and flat
//! lists of strings — deliberately not a general expression grammar, since the source this system
//! is modeled on evaluates section bodies as code, which is a code-execution vector. This parser
//! only ever recognizes the four literal shapes below; anything else is a parse error.

use std::collections::BTreeMap;

use winnow::{
    ModalResult,
    Parser,
    ascii::{dec_int, line_ending, space0},
    combinator::{alt, cut_err, delimited, eof, opt, peek, preceded, repeat, repeat_till, terminated},
    error::{StrContext, StrContextValue},
    token::{take_till, take_while},
};

use crate::Error;

/// A single parsed value from an index section body.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    None,
    List(Vec<String>),
}

impl Literal {
    /// Returns the value as a string, if it is [`Literal::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is [`Literal::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a list of strings, if it is [`Literal::List`].
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Literal::List(items) => Some(items),
            _ => None,
        }
    }
}

/// One `==> <eggfile> <==` section: the egg filename and its `key = literal` body.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexSection {
    pub filename: String,
    pub fields: BTreeMap<String, Literal>,
}

fn quoted_string(input: &mut &str) -> ModalResult<String> {
    let single = delimited('\'', take_till(0.., '\''), '\'');
    let double = delimited('"', take_till(0.., '"'), '"');
    alt((single, double)).map(str::to_string).parse_next(input)
}

fn none_literal(input: &mut &str) -> ModalResult<Literal> {
    "None".value(Literal::None).parse_next(input)
}

fn int_literal(input: &mut &str) -> ModalResult<Literal> {
    dec_int.map(Literal::Int).parse_next(input)
}

fn str_literal(input: &mut &str) -> ModalResult<Literal> {
    quoted_string.map(Literal::Str).parse_next(input)
}

fn list_literal(input: &mut &str) -> ModalResult<Literal> {
    let item = delimited(
        space0,
        quoted_string,
        (space0, opt(','), space0, line_ending),
    );
    let items = preceded(
        ('[', space0, line_ending),
        repeat_till(0.., item, (space0, ']')),
    )
    .map(|(items, _): (Vec<String>, _)| items);
    items.map(Literal::List).parse_next(input)
}

fn literal(input: &mut &str) -> ModalResult<Literal> {
    alt((none_literal, list_literal, str_literal, int_literal))
        .context(StrContext::Label("literal value"))
        .context(StrContext::Expected(StrContextValue::Description(
            "a quoted string, integer, None, or a bracketed list of quoted strings",
        )))
        .parse_next(input)
}

fn key(input: &mut &str) -> ModalResult<String> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
        .map(str::to_string)
        .parse_next(input)
}

fn field(input: &mut &str) -> ModalResult<(String, Literal)> {
    let key = terminated(key, (space0, '=', space0)).parse_next(input)?;
    let value = cut_err(literal)
        .context(StrContext::Label("field value"))
        .parse_next(input)?;
    terminated(space0, alt((line_ending, eof))).parse_next(input)?;
    Ok((key, value))
}

fn blank_line(input: &mut &str) -> ModalResult<()> {
    terminated(space0, line_ending).void().parse_next(input)
}

fn header(input: &mut &str) -> ModalResult<String> {
    delimited(
        ("==>", space0),
        take_till(1.., |c: char| c == ' ' || c == '\t'),
        (space0, "<==", space0, alt((line_ending, eof))),
    )
    .map(str::to_string)
    .parse_next(input)
}

fn section(input: &mut &str) -> ModalResult<IndexSection> {
    let filename = cut_err(header)
        .context(StrContext::Label("section header"))
        .context(StrContext::Expected(StrContextValue::Description(
            "a `==> <eggfile> <==` header line",
        )))
        .parse_next(input)?;

    let mut fields = BTreeMap::new();
    loop {
        if peek(alt((blank_line.void(), header.void(), eof.void())))
            .parse_next(input)
            .is_ok()
        {
            break;
        }
        let (key, value) = field(input)?;
        fields.insert(key, value);
    }

    Ok(IndexSection { filename, fields })
}

/// Parses a single section body with no `==> ... <==` header, as found inside an egg archive's
/// `EGG-INFO/spec/depend` member.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the body does not match the bounded grammar.
pub fn parse_body(text: &str) -> Result<BTreeMap<String, Literal>, Error> {
    let mut input = text;
    let mut fields = BTreeMap::new();
    loop {
        if peek(alt((blank_line.void(), eof.void()))).parse_next(&mut input).is_ok() {
            break;
        }
        let (key, value) = field(&mut input).map_err(|err| Error::Parse {
            context: "EGG-INFO/spec/depend".to_string(),
            detail: err.to_string(),
        })?;
        fields.insert(key, value);
    }
    Ok(fields)
}

/// Parses a complete `index-depend.txt` document into its sections.
///
/// # Errors
///
/// Returns [`Error::Parse`] if any section header or body does not match the bounded grammar.
pub fn parse_index(text: &str) -> Result<Vec<IndexSection>, Error> {
    let mut input = text;
    let sections = repeat_till::<_, _, Vec<IndexSection>, _, _, _, _>(
        0..,
        preceded(repeat(0.., blank_line).map(|(): ()| ()), section),
        (repeat(0.., blank_line).map(|(): ()| ()), eof),
    )
    .parse_next(&mut input)
    .map(|(sections, _)| sections)
    .map_err(|err: winnow::error::ErrMode<winnow::error::ContextError>| Error::Parse {
        context: "index-depend".to_string(),
        detail: err.to_string(),
    })?;
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_section_with_every_literal_shape() {
        let text = "==> numpy-1.26.0-3.egg <==\n\
                     name = 'numpy'\n\
                     version = '1.26.0'\n\
                     build = 3\n\
                     arch = None\n\
                     packages = [\n\
                       'six 1.0.0',\n\
                       'scipy',\n\
                     ]\n\
                     md5 = 'd41d8cd98f00b204e9800998ecf8427e'\n\
                     size = 1024\n\n";
        let sections = parse_index(text).unwrap();
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.filename, "numpy-1.26.0-3.egg");
        assert_eq!(section.fields.get("name").unwrap().as_str(), Some("numpy"));
        assert_eq!(section.fields.get("build").unwrap().as_int(), Some(3));
        assert_eq!(section.fields.get("arch").unwrap(), &Literal::None);
        assert_eq!(
            section.fields.get("packages").unwrap().as_list(),
            Some(&["six 1.0.0".to_string(), "scipy".to_string()][..])
        );
    }

    #[test]
    fn parses_multiple_sections() {
        let text = "==> a-1-1.egg <==\n\
                     name = 'a'\n\
                     version = '1'\n\
                     build = 1\n\
                     md5 = 'd41d8cd98f00b204e9800998ecf8427e'\n\
                     size = 1\n\
                     \n\
                     ==> b-1-1.egg <==\n\
                     name = 'b'\n\
                     version = '1'\n\
                     build = 1\n\
                     md5 = 'd41d8cd98f00b204e9800998ecf8427e'\n\
                     size = 2\n";
        let sections = parse_index(text).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].filename, "a-1-1.egg");
        assert_eq!(sections[1].filename, "b-1-1.egg");
    }

    #[test]
    fn rejects_unbounded_expressions() {
        let text = "==> a-1-1.egg <==\n\
                     name = __import__('os').system('echo pwned')\n";
        assert!(parse_index(text).is_err());
    }
}
