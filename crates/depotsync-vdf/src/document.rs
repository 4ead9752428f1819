use std::vec::IntoIter;

use crate::error::{Error, Result};
use crate::lexer::Token;

/// Deepest section nesting the parser accepts.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Section(Document),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Section(_) => None,
        }
    }

    pub fn as_section(&self) -> Option<&Document> {
        match self {
            Value::Section(d) => Some(d),
            Value::Str(_) => None,
        }
    }
}

/// An ordered list of key/value pairs; keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    entries: Vec<(String, Value)>,
}

impl Document {
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First value whose key matches ASCII case-insensitively.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_section(&self, key: &str) -> Option<&Document> {
        self.get(key).and_then(Value::as_section)
    }

    /// Named subsections, in document order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_section().map(|d| (k.as_str(), d)))
    }

    /// Depth-first visit of every section, including nested ones.
    pub fn walk_sections<'a>(&'a self, visit: &mut impl FnMut(&'a str, &'a Document)) {
        let mut stack: Vec<_> = self.sections().collect();
        stack.reverse();
        while let Some((key, section)) = stack.pop() {
            visit(key, section);
            let start = stack.len();
            stack.extend(section.sections());
            stack[start..].reverse();
        }
    }
}

pub(crate) fn parse_tokens(tokens: Vec<Token>) -> Result<Document> {
    let mut tokens = tokens.into_iter();
    let doc = parse_body(&mut tokens, None, 0)?;
    Ok(doc)
}

fn parse_body(
    tokens: &mut IntoIter<Token>,
    parent: Option<&str>,
    depth: usize,
) -> Result<Document> {
    let mut entries = Vec::new();

    loop {
        let (key, key_line) = match tokens.next() {
            None => {
                return match parent {
                    Some(key) => Err(Error::UnclosedSection {
                        key: key.to_string(),
                    }),
                    None => Ok(Document { entries }),
                };
            }
            Some(Token::Close { line }) => {
                return match parent {
                    Some(_) => Ok(Document { entries }),
                    None => Err(Error::UnexpectedClose { line }),
                };
            }
            Some(Token::Open { line }) => return Err(Error::UnexpectedOpen { line }),
            Some(Token::Str { text, line }) => (text, line),
        };

        let value = match tokens.next() {
            Some(Token::Str { text, .. }) => Value::Str(text),
            Some(Token::Open { line }) => {
                if depth >= MAX_DEPTH {
                    return Err(Error::TooDeep { line });
                }
                Value::Section(parse_body(tokens, Some(key.as_str()), depth + 1)?)
            }
            Some(Token::Close { .. }) | None => {
                return Err(Error::MissingValue {
                    key,
                    line: key_line,
                });
            }
        };

        entries.push((key, value));
    }
}
