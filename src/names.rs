//! Name normalization and first-name pattern alignment used by the person
//! resolver.

use crate::error::{Error, Result};
use crate::nicknames;
use crate::types::Person;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Order of the name parts in a query string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameFormat {
    /// `C.W. Bill Young`
    #[default]
    FirstLast,
    /// `Young, C.W. Bill`
    LastFirst,
}

/// Remove accent marks by decomposing characters (NFD) and dropping the
/// combining marks.
pub fn strip_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Put a space after every period that is directly followed by another
/// character, so `C.W.` becomes `C. W.`
pub fn split_initials(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c != '.' {
            continue;
        }
        if let Some(&next) = chars.peek() {
            if !next.is_whitespace() {
                out.push(' ');
                out.push(next);
                chars.next();
            }
        }
    }
    out
}

/// Remove quotes around a nickname token. The trailing quote is sometimes
/// missing, so only a leading quote is required.
fn strip_quotes(token: &str) -> &str {
    if token.starts_with('"') {
        token.trim_start_matches('"').trim_end_matches('"')
    } else {
        token
    }
}

/// A name string split into its last name and first-name tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub last_name: String,
    pub first_names: Vec<String>,
}

impl ParsedName {
    pub fn parse(raw: &str, format: NameFormat) -> Result<Self> {
        let name = split_initials(&strip_diacritics(raw));

        let (last_name, first_names): (String, Vec<String>) = match format {
            NameFormat::LastFirst => {
                let (last, rest) = name.split_once(',').ok_or_else(|| {
                    Error::MalformedName(format!("expected 'Last, First' but got '{}'", raw))
                })?;
                (
                    last.to_string(),
                    rest.trim().split(' ').map(str::to_string).collect(),
                )
            }
            NameFormat::FirstLast => {
                let mut tokens: Vec<String> = name.split(' ').map(str::to_string).collect();
                let last = tokens.pop().unwrap_or_default();
                (last, tokens)
            }
        };

        let first_names = first_names
            .iter()
            .map(|t| strip_quotes(t).to_string())
            .collect();

        Ok(Self {
            last_name,
            first_names,
        })
    }

    /// The last name plus its hyphen/space variants, used to query the roster
    pub fn last_name_variants(&self) -> Vec<String> {
        let mut variants = vec![
            self.last_name.clone(),
            self.last_name.replace(' ', "-"),
            self.last_name.replace('-', " "),
        ];
        variants.sort();
        variants.dedup();
        variants
    }

    pub fn display(&self) -> String {
        let mut parts = self.first_names.clone();
        parts.push(self.last_name.clone());
        parts.join(" ")
    }
}

/// One ranked arrangement of a person's given names. Each token may list
/// several accepted spellings separated by `|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    tokens: Vec<String>,
}

impl NamePattern {
    fn from_fields(fields: &[Option<&str>]) -> Option<Self> {
        let tokens: Vec<String> = fields
            .iter()
            .flatten()
            .filter(|f| !f.is_empty())
            .flat_map(|f| {
                strip_diacritics(f)
                    .split(' ')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// The patterns for a person, best first: (first, middle, nickname),
    /// (first, nickname), (middle, nickname), (nickname). Absent fields are
    /// dropped and patterns left without any token are skipped.
    pub fn for_person(person: &Person) -> Vec<Self> {
        let first = person.first_name.as_deref();
        let middle = person.middle_name.as_deref();
        let nick = person.nickname.as_deref();
        [
            vec![first, middle, nick],
            vec![first, nick],
            vec![middle, nick],
            vec![nick],
        ]
        .iter()
        .filter_map(|fields| Self::from_fields(fields))
        .collect()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Score of this pattern against the query tokens: the token count when
    /// every position aligns, `None` otherwise.
    pub fn score(&self, query: &[String]) -> Option<usize> {
        if self.tokens.len() != query.len() {
            return None;
        }
        for (a, spellings) in query.iter().zip(&self.tokens) {
            if !spellings.split('|').any(|b| tokens_align(a, b)) {
                return None;
            }
        }
        Some(self.tokens.len())
    }
}

/// Whether a query token and a single accepted spelling match: same text
/// ignoring case, an abbreviation on either side with the same first letter,
/// or a listed nickname pair.
pub fn tokens_align(a: &str, b: &str) -> bool {
    if a.to_lowercase() == b.to_lowercase() {
        return true;
    }

    if a.contains('.') || b.contains('.') {
        let first_a = a.chars().next().map(|c| c.to_lowercase().collect::<String>());
        let first_b = b.chars().next().map(|c| c.to_lowercase().collect::<String>());
        if first_a.is_some() && first_a == first_b {
            return true;
        }
    }

    nicknames::equivalent(a, b)
}

/// Best score over all of a person's patterns
pub fn best_score(person: &Person, query: &[String]) -> Option<usize> {
    NamePattern::for_person(person)
        .iter()
        .filter_map(|p| p.score(query))
        .max()
}
