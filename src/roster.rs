//! Read-only roster of people and their roles.

use crate::error::{Error, Result};
use crate::types::{Person, PersonId, Role, RoleType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Filters for a roster lookup
#[derive(Debug, Clone, Default)]
pub struct RosterQuery {
    pub last_names: Vec<String>,
    pub as_of: Option<NaiveDate>,
    pub role_type: Option<RoleType>,
    pub state: Option<String>,
    pub district: Option<u32>,
}

/// A person together with the role that satisfied the query
#[derive(Debug, Clone, Copy)]
pub struct RosterMatch<'a> {
    pub person: &'a Person,
    pub role: &'a Role,
}

/// Source of person/role records
pub trait RosterStore: Send + Sync {
    /// Rows whose last name is one of `query.last_names` and that hold a role
    /// active on `query.as_of` matching every supplied filter. A person with
    /// several qualifying roles appears once per role.
    fn find_people(&self, query: &RosterQuery) -> Vec<RosterMatch<'_>>;
}

/// Roster file layout: people with their roles nested
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RosterFile {
    people: Vec<RosterFileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RosterFileEntry {
    #[serde(flatten)]
    person: Person,
    #[serde(default)]
    roles: Vec<RosterFileRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RosterFileRole {
    #[serde(rename = "type")]
    role_type: RoleType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    state: String,
    #[serde(default)]
    district: Option<u32>,
}

/// In-memory roster
#[derive(Debug, Clone, Default)]
pub struct Roster {
    people: HashMap<PersonId, Person>,
    roles: Vec<Role>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_person(&mut self, person: Person) {
        self.people.insert(person.id, person);
    }

    pub fn add_role(&mut self, role: Role) {
        self.roles.push(role);
    }

    pub fn with_person(mut self, person: Person, roles: Vec<Role>) -> Self {
        self.add_person(person);
        for role in roles {
            self.add_role(role);
        }
        self
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.people.get(&id)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Load a roster from a YAML or JSON file (chosen by extension)
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file: RosterFile = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)?,
            Some("yml") | Some("yaml") => serde_yaml::from_str(&contents)?,
            _ => {
                return Err(Error::Config(format!(
                    "Roster file must be .yaml, .yml or .json: {}",
                    path.display()
                )))
            }
        };
        Ok(Self::from_file(file))
    }

    /// Parse a roster from YAML text
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let file: RosterFile = serde_yaml::from_str(contents)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: RosterFile) -> Self {
        let mut roster = Self::new();
        for entry in file.people {
            let id = entry.person.id;
            roster.add_person(entry.person);
            for role in entry.roles {
                roster.add_role(Role {
                    person_id: id,
                    role_type: role.role_type,
                    start_date: role.start_date,
                    end_date: role.end_date,
                    state: role.state,
                    district: role.district,
                });
            }
        }
        roster
    }
}

impl RosterStore for Roster {
    fn find_people(&self, query: &RosterQuery) -> Vec<RosterMatch<'_>> {
        self.roles
            .iter()
            .filter(|role| query.as_of.map_or(true, |date| role.is_active_on(date)))
            .filter(|role| query.role_type.map_or(true, |t| role.role_type == t))
            .filter(|role| query.state.as_ref().map_or(true, |s| &role.state == s))
            .filter(|role| query.district.map_or(true, |d| role.district == Some(d)))
            .filter_map(|role| {
                let person = self.people.get(&role.person_id)?;
                if query.last_names.iter().any(|n| n == &person.last_name) {
                    Some(RosterMatch { person, role })
                } else {
                    None
                }
            })
            .collect()
    }
}

static GLOBAL_ROSTER: OnceLock<Roster> = OnceLock::new();

/// Install the process-wide roster. Only the first call takes effect; later
/// calls hand the rejected roster back.
pub fn install(roster: Roster) -> std::result::Result<&'static Roster, Roster> {
    let mut pending = Some(roster);
    let installed = GLOBAL_ROSTER.get_or_init(|| pending.take().unwrap_or_default());
    match pending {
        Some(rejected) => Err(rejected),
        None => Ok(installed),
    }
}

/// The process-wide roster, if one has been installed
pub fn global() -> Option<&'static Roster> {
    GLOBAL_ROSTER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER_YAML: &str = r#"
people:
  - id: 400440
    first_name: Charles
    middle_name: William
    nickname: Bill
    last_name: Young
    roles:
      - type: rep
        start_date: 2007-01-04
        end_date: 2008-12-31
        state: FL
        district: 10
      - type: rep
        start_date: 2009-01-06
        end_date: 2010-12-31
        state: FL
        district: 10
  - id: 300002
    first_name: Lamar
    last_name: Alexander
    roles:
      - type: sen
        start_date: 2009-01-06
        end_date: 2014-12-31
        state: TN
"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_load_yaml() {
        let roster = Roster::from_yaml_str(ROSTER_YAML).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.person(400440).unwrap().nickname.as_deref(), Some("Bill"));
    }

    #[test]
    fn test_find_people_filters() {
        let roster = Roster::from_yaml_str(ROSTER_YAML).unwrap();
        let mut query = RosterQuery {
            last_names: vec!["Young".to_string()],
            as_of: Some(date(2009, 3, 1)),
            ..Default::default()
        };
        assert_eq!(roster.find_people(&query).len(), 1);

        query.role_type = Some(RoleType::Sen);
        assert!(roster.find_people(&query).is_empty());

        query.role_type = Some(RoleType::Rep);
        query.state = Some("FL".to_string());
        query.district = Some(10);
        assert_eq!(roster.find_people(&query).len(), 1);

        query.district = Some(11);
        assert!(roster.find_people(&query).is_empty());
    }

    #[test]
    fn test_role_interval_is_inclusive() {
        let roster = Roster::from_yaml_str(ROSTER_YAML).unwrap();
        for (day, expected) in [
            (date(2009, 1, 5), 0),
            (date(2009, 1, 6), 1),
            (date(2010, 12, 31), 1),
            (date(2011, 1, 1), 0),
        ] {
            let query = RosterQuery {
                last_names: vec!["Young".to_string()],
                as_of: Some(day),
                ..Default::default()
            };
            assert_eq!(roster.find_people(&query).len(), expected, "on {}", day);
        }
    }
}
