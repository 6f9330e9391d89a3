use crate::error::{Error, Result};
use crate::names::{best_score, NameFormat, ParsedName};
use crate::roster::{RosterMatch, RosterQuery, RosterStore};
use crate::types::{PersonId, RoleType};
use chrono::NaiveDate;
use tracing::debug;

/// A free-text name plus the context used to narrow the roster
#[derive(Debug, Clone)]
pub struct NameQuery {
    pub text: String,
    pub format: NameFormat,
    pub as_of: NaiveDate,
    pub role_type: Option<RoleType>,
    pub state: Option<String>,
    pub district: Option<u32>,
}

impl NameQuery {
    pub fn new(text: impl Into<String>, as_of: NaiveDate) -> Self {
        Self {
            text: text.into(),
            format: NameFormat::FirstLast,
            as_of,
            role_type: None,
            state: None,
            district: None,
        }
    }

    pub fn format(mut self, format: NameFormat) -> Self {
        self.format = format;
        self
    }

    pub fn role_type(mut self, role_type: RoleType) -> Self {
        self.role_type = Some(role_type);
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn district(mut self, district: u32) -> Self {
        self.district = Some(district);
        self
    }

    fn describe_filters(&self) -> String {
        format!(
            "role_type={}, state={}, district={}",
            self.role_type.map_or("None".to_string(), |r| r.to_string()),
            self.state.as_deref().unwrap_or("None"),
            self.district.map_or("None".to_string(), |d| d.to_string()),
        )
    }
}

/// Resolves informal legislator names to roster ids
pub struct PersonResolver<'a, R: RosterStore + ?Sized> {
    roster: &'a R,
}

impl<'a, R: RosterStore + ?Sized> PersonResolver<'a, R> {
    pub fn new(roster: &'a R) -> Self {
        Self { roster }
    }

    /// Resolve a name to exactly one person id.
    ///
    /// Candidates come from the roster (last name or its hyphen/space
    /// variants, an active role on the query date, and the optional filters).
    /// Each candidate is scored by its best aligning first-name pattern; the
    /// highest score wins and a tie or an empty field is an
    /// [`Error::AmbiguousMatch`].
    pub fn resolve(&self, query: &NameQuery) -> Result<PersonId> {
        let parsed = ParsedName::parse(&query.text, query.format)?;

        let roster_query = RosterQuery {
            last_names: parsed.last_name_variants(),
            as_of: Some(query.as_of),
            role_type: query.role_type,
            state: query.state.clone(),
            district: query.district,
        };
        let candidates = self.roster.find_people(&roster_query);

        let mut max_score = 0;
        let mut matches: Vec<PersonId> = Vec::new();
        for candidate in &candidates {
            let Some(score) = best_score(candidate.person, &parsed.first_names) else {
                continue;
            };
            debug!(
                name = %parsed.display(),
                person = candidate.person.id,
                score,
                "name pattern aligned"
            );
            if score > max_score {
                max_score = score;
                matches = vec![candidate.person.id];
            } else if score == max_score && !matches.contains(&candidate.person.id) {
                matches.push(candidate.person.id);
            }
        }

        match matches.as_slice() {
            [id] => Ok(*id),
            _ => Err(Error::AmbiguousMatch {
                name: parsed.display(),
                as_of: query.as_of,
                filters: query.describe_filters(),
                matches: matches.len(),
                candidates: candidates.iter().map(describe_candidate).collect(),
            }),
        }
    }
}

fn describe_candidate(candidate: &RosterMatch<'_>) -> String {
    let p = candidate.person;
    let r = candidate.role;
    let mut name = Vec::new();
    if let Some(first) = &p.first_name {
        name.push(first.clone());
    }
    if let Some(middle) = &p.middle_name {
        name.push(middle.clone());
    }
    if let Some(nick) = &p.nickname {
        name.push(format!("\"{}\"", nick));
    }
    name.push(p.last_name.clone());
    if let Some(native) = &p.last_name_native {
        name.push(format!("[{}]", native));
    }
    if let Some(modifier) = &p.name_modifier {
        name.push(modifier.clone());
    }
    let seat = match r.district {
        Some(d) => format!("{}-{}", r.state, d),
        None => r.state.clone(),
    };
    format!(
        "{} {} ({} {} {}..{})",
        p.id,
        name.join(" "),
        r.role_type,
        seat,
        r.start_date,
        r.end_date
    )
}
