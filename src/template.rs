//! Placeholder detection and substitution for translation templates.
//!
//! Templates use `{0}`-style index placeholders and `{name}`-style named
//! placeholders. `{{` and `}}` are escapes for literal braces, so `{{0}}`
//! renders as the text `{0}` and is not a placeholder.

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{error::Error, value::ParamValue};

lazy_static! {
    // Alternation order matters: escapes win over placeholders at the same position.
    static ref TOKEN_REGEX: Regex =
        Regex::new(r"\{\{|\}\}|\{(\d+)\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

/// A lexical piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    /// `{{` or `}}`, rendered as a single brace.
    Brace(char),
    Index(usize),
    Name(&'a str),
}

/// Splits `template` into tokens in occurrence order.
pub fn tokenize(template: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in TOKEN_REGEX.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            tokens.push(Token::Text(&template[last..whole.start()]));
        }
        last = whole.end();

        if let Some(digits) = caps.get(1) {
            match digits.as_str().parse::<usize>() {
                Ok(index) => tokens.push(Token::Index(index)),
                // Too large to ever be in range; keep it as written.
                Err(_) => tokens.push(Token::Text(whole.as_str())),
            }
        } else if let Some(name) = caps.get(2) {
            tokens.push(Token::Name(name.as_str()));
        } else if whole.as_str() == "{{" {
            tokens.push(Token::Brace('{'));
        } else {
            tokens.push(Token::Brace('}'));
        }
    }

    if last < template.len() {
        tokens.push(Token::Text(&template[last..]));
    }
    tokens
}

/// Whether `template` contains at least one index or named placeholder.
pub fn has_placeholders(template: &str) -> bool {
    tokenize(template)
        .iter()
        .any(|token| matches!(token, Token::Index(_) | Token::Name(_)))
}

/// Distinct index placeholders referenced by `template`.
pub fn required_indices(template: &str) -> BTreeSet<usize> {
    tokenize(template)
        .into_iter()
        .filter_map(|token| match token {
            Token::Index(index) => Some(index),
            _ => None,
        })
        .collect()
}

/// Distinct named placeholders referenced by `template`.
pub fn required_names(template: &str) -> BTreeSet<String> {
    tokenize(template)
        .into_iter()
        .filter_map(|token| match token {
            Token::Name(name) => Some(name.to_string()),
            _ => None,
        })
        .collect()
}

/// Substitutes `{i}` with `values[i]`. An empty slot renders as nothing.
///
/// Named placeholders are left as written.
pub fn resolve_indexed(template: &str, values: &[Option<ParamValue>]) -> Result<String, Error> {
    render(template, Some(Indexed::Dense(values)), None)
}

/// Substitutes `{i}` with `values[i]` from a sparse map. An absent index is
/// [`Error::IndexOutOfRange`].
///
/// Named placeholders are left as written.
pub fn resolve_indexed_map(
    template: &str,
    values: &BTreeMap<usize, ParamValue>,
) -> Result<String, Error> {
    render(template, Some(Indexed::Sparse(values)), None)
}

/// Substitutes `{name}` with `values[name]`.
///
/// Index placeholders are left as written.
pub fn resolve_named(
    template: &str,
    values: &BTreeMap<String, ParamValue>,
) -> Result<String, Error> {
    render(template, None, Some(values))
}

/// Substitutes both placeholder kinds in one pass.
pub fn resolve(
    template: &str,
    indexed: &[Option<ParamValue>],
    named: &BTreeMap<String, ParamValue>,
) -> Result<String, Error> {
    render(template, Some(Indexed::Dense(indexed)), Some(named))
}

#[derive(Clone, Copy)]
enum Indexed<'a> {
    Dense(&'a [Option<ParamValue>]),
    Sparse(&'a BTreeMap<usize, ParamValue>),
}

impl<'a> Indexed<'a> {
    fn lookup(self, index: usize) -> Result<Option<&'a ParamValue>, Error> {
        match self {
            Indexed::Dense(values) => values
                .get(index)
                .map(Option::as_ref)
                .ok_or(Error::IndexOutOfRange {
                    index,
                    len: values.len(),
                }),
            Indexed::Sparse(values) => values.get(&index).map(Some).ok_or(Error::IndexOutOfRange {
                index,
                len: values.len(),
            }),
        }
    }
}

fn render(
    template: &str,
    indexed: Option<Indexed<'_>>,
    named: Option<&BTreeMap<String, ParamValue>>,
) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len());

    for token in tokenize(template) {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Brace(brace) => out.push(brace),
            Token::Index(index) => match indexed {
                Some(values) => {
                    if let Some(value) = values.lookup(index)? {
                        out.push_str(&value.to_string());
                    }
                }
                None => {
                    out.push('{');
                    out.push_str(&index.to_string());
                    out.push('}');
                }
            },
            Token::Name(name) => match named {
                Some(values) => {
                    let value = values.get(name).ok_or_else(|| Error::MissingParameter {
                        name: name.to_string(),
                        available: values.keys().cloned().collect::<Vec<_>>().join(", "),
                    })?;
                    out.push_str(&value.to_string());
                }
                None => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            },
        }
    }

    Ok(out)
}
