//! Assembles a [`Bill`] from its scraped source: resolves the sponsor and
//! cosponsors against the roster and folds the action log into a status.

use crate::classifier::{ActionClassifier, ActionContext};
use crate::error::{Error, Result};
use crate::names::NameFormat;
use crate::resolver::{NameQuery, PersonResolver};
use crate::roster::RosterStore;
use crate::status::StatusCode;
use crate::types::{
    Action, ActionDate, Bill, BillType, Consideration, Cosponsor, PersonId, RoleType,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A legislator as printed on a bill page: `Rep Young, C.W. Bill` at `FL-10`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSource {
    pub name: String,
    pub seat: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosponsorSource {
    #[serde(flatten)]
    pub member: MemberSource,
    /// `MM/DD/YYYY`
    pub joined: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawn: Option<String>,
}

/// One line of the action log. `indent_delta` is +1 when the line opens a
/// nested (committee) block and -1 when it closes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAction {
    pub timestamp: String,
    #[serde(default)]
    pub indent_delta: i32,
    pub text: String,
}

/// Everything scraped for a single bill, before resolution and classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSource {
    pub congress: u32,
    #[serde(rename = "type")]
    pub bill_type: BillType,
    pub number: u32,
    pub title: String,
    /// `MM/DD/YYYY`
    pub introduced: String,
    /// `None` for bills printed with "No Sponsor"
    #[serde(default)]
    pub sponsor: Option<MemberSource>,
    #[serde(default)]
    pub cosponsors: Vec<CosponsorSource>,
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

impl BillSource {
    /// `111 h1234` style label for logs
    pub fn label(&self) -> String {
        format!("{} {}{}", self.congress, self.bill_type, self.number)
    }
}

/// A member label split into the parts used to narrow the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub role_type: RoleType,
    pub name: String,
    pub state: String,
    pub district: Option<u32>,
}

impl MemberRef {
    /// Split `Rep Last, First` plus `ST` or `ST-NN`. A seat district that is
    /// not a number (at-large seats) leaves the district filter unset.
    pub fn parse(member: &MemberSource) -> Result<Self> {
        let (role_type, name) = if let Some(rest) = member.name.strip_prefix("Rep ") {
            (RoleType::Rep, rest)
        } else if let Some(rest) = member.name.strip_prefix("Sen ") {
            (RoleType::Sen, rest)
        } else {
            return Err(Error::MalformedName(format!(
                "missing title: {}",
                member.name
            )));
        };

        let seat = member.seat.trim();
        let (state, district) = match seat.split_once('-') {
            Some((state, district)) => (state, district.parse().ok()),
            None => (seat, None),
        };

        Ok(Self {
            role_type,
            name: name.trim().to_string(),
            state: state.to_string(),
            district,
        })
    }

    fn query(&self, as_of: NaiveDate) -> NameQuery {
        let query = NameQuery::new(self.name.clone(), as_of)
            .format(NameFormat::LastFirst)
            .role_type(self.role_type)
            .state(self.state.clone());
        match self.district {
            Some(district) => query.district(district),
            None => query,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y")
        .map_err(|_| Error::MalformedDate(s.to_string()))
}

/// Builds bills from their sources against one roster
pub struct BillAssembler<'a, R: RosterStore + ?Sized> {
    resolver: PersonResolver<'a, R>,
    classifier: &'a ActionClassifier,
    trailing_refs: Regex,
    roll_ref: Regex,
}

impl<'a, R: RosterStore + ?Sized> BillAssembler<'a, R> {
    pub fn new(roster: &'a R, classifier: &'a ActionClassifier) -> Result<Self> {
        Ok(Self {
            resolver: PersonResolver::new(roster),
            classifier,
            trailing_refs: Regex::new(r"\s+\((.*)\)\s*$")?,
            roll_ref: Regex::new(r"(?i)^(Roll no\.|Record Vote No:) \d+$")?,
        })
    }

    /// References given in a parenthetical group at the very end of an
    /// action line, e.g. `(consideration: CR H1234-1240; CR H1250)`.
    /// A roll call group belongs to the vote and is not a reference.
    pub fn parse_considerations(&self, text: &str) -> Vec<Consideration> {
        let Some(group) = self.trailing_refs.captures(text).and_then(|c| c.get(1)) else {
            return Vec::new();
        };
        if self.roll_ref.is_match(group.as_str()) {
            return Vec::new();
        }
        group
            .as_str()
            .split("; ")
            .map(|item| match item.split_once(": ") {
                Some((label, reference)) => Consideration {
                    label: label.to_string(),
                    reference: reference.to_string(),
                },
                None => Consideration {
                    label: String::new(),
                    reference: item.to_string(),
                },
            })
            .collect()
    }

    pub fn assemble(&self, source: &BillSource) -> Result<Bill> {
        if source.title.contains("Reserved for the") {
            warn!(bill = %source.label(), "reserved bill number");
            return Err(Error::ReservedBill(source.title.to_lowercase()));
        }

        let introduced = parse_date(&source.introduced)?;

        let sponsor = match &source.sponsor {
            Some(member) => Some(self.resolve_member(member, introduced)?),
            None => None,
        };

        let cosponsors = source
            .cosponsors
            .iter()
            .map(|c| self.resolve_cosponsor(c))
            .collect::<Result<Vec<_>>>()?;

        let (status, status_date, actions) = self.fold_actions(source, introduced)?;

        debug!(bill = %source.label(), %status, actions = actions.len(), "bill assembled");

        Ok(Bill {
            congress: source.congress,
            bill_type: source.bill_type,
            number: source.number,
            title: source.title.clone(),
            introduced,
            sponsor,
            cosponsors,
            status,
            status_date,
            actions,
        })
    }

    fn resolve_member(&self, member: &MemberSource, as_of: NaiveDate) -> Result<PersonId> {
        let member = MemberRef::parse(member)?;
        self.resolver.resolve(&member.query(as_of))
    }

    fn resolve_cosponsor(&self, cosponsor: &CosponsorSource) -> Result<Cosponsor> {
        let joined = parse_date(&cosponsor.joined)?;
        let withdrawn = cosponsor.withdrawn.as_deref().map(parse_date).transpose()?;
        let member = MemberSource {
            name: cosponsor.member.name.replace("Colordao", "Colorado"),
            seat: cosponsor.member.seat.clone(),
        };
        Ok(Cosponsor {
            id: self.resolve_member(&member, joined)?,
            joined,
            withdrawn,
        })
    }

    /// Classify the action log oldest-first, threading the running status
    /// into each classification. Status starts at INTRODUCED on the
    /// introduced date.
    fn fold_actions(
        &self,
        source: &BillSource,
        introduced: NaiveDate,
    ) -> Result<(StatusCode, ActionDate, Vec<Action>)> {
        let mut status = StatusCode::Introduced;
        let mut status_date = ActionDate::Date(introduced);
        let mut indent = 0;
        let mut actions = Vec::with_capacity(source.actions.len());

        for raw in &source.actions {
            let datetime = ActionDate::parse(&raw.timestamp)?;
            indent += raw.indent_delta;

            let ctx = ActionContext {
                bill_type: source.bill_type,
                previous_status: status,
                title: &source.title,
            };
            let attributes = self.classifier.classify(&raw.text, &ctx);
            if let Some(next) = attributes.status {
                status = next;
                status_date = datetime;
            }

            actions.push(Action {
                datetime,
                indent,
                text: raw.text.clone(),
                attributes,
                references: self.parse_considerations(&raw.text),
            });
        }

        Ok((status, status_date, actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;
    use crate::types::{Chamber, Person, Role};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn roster() -> Roster {
        let young = Person {
            id: 400440,
            first_name: Some("Charles".to_string()),
            middle_name: Some("William".to_string()),
            nickname: Some("Bill".to_string()),
            last_name: "Young".to_string(),
            last_name_native: None,
            name_modifier: None,
        };
        let udall = Person {
            id: 412247,
            first_name: Some("Mark".to_string()),
            middle_name: None,
            nickname: None,
            last_name: "Udall".to_string(),
            last_name_native: None,
            name_modifier: None,
        };
        Roster::new()
            .with_person(
                young,
                vec![Role {
                    person_id: 400440,
                    role_type: RoleType::Rep,
                    start_date: date(2009, 1, 6),
                    end_date: date(2010, 12, 31),
                    state: "FL".to_string(),
                    district: Some(10),
                }],
            )
            .with_person(
                udall,
                vec![Role {
                    person_id: 412247,
                    role_type: RoleType::Sen,
                    start_date: date(2009, 1, 6),
                    end_date: date(2014, 12, 31),
                    state: "CO".to_string(),
                    district: None,
                }],
            )
    }

    fn source() -> BillSource {
        BillSource {
            congress: 111,
            bill_type: BillType::HouseBill,
            number: 1234,
            title: "To amend title 10, United States Code.".to_string(),
            introduced: "03/02/2009".to_string(),
            sponsor: Some(MemberSource {
                name: "Rep Young, C.W. Bill".to_string(),
                seat: "FL-10".to_string(),
            }),
            cosponsors: vec![],
            actions: vec![
                RawAction {
                    timestamp: "03/02/2009".to_string(),
                    indent_delta: 0,
                    text: "Referred to the House Committee on Armed Services.".to_string(),
                },
                RawAction {
                    timestamp: "07/15/2009 2:33pm".to_string(),
                    indent_delta: 0,
                    text: "On passage Passed by the Yeas and Nays: 300 - 100 (Roll no. 45).".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_member_ref_parse() {
        let member = MemberRef::parse(&MemberSource {
            name: "Rep Young, C.W. Bill".to_string(),
            seat: "FL-10".to_string(),
        })
        .unwrap();
        assert_eq!(member.role_type, RoleType::Rep);
        assert_eq!(member.name, "Young, C.W. Bill");
        assert_eq!(member.state, "FL");
        assert_eq!(member.district, Some(10));

        let senator = MemberRef::parse(&MemberSource {
            name: "Sen Udall, Mark".to_string(),
            seat: "CO".to_string(),
        })
        .unwrap();
        assert_eq!(senator.role_type, RoleType::Sen);
        assert_eq!(senator.district, None);

        let err = MemberRef::parse(&MemberSource {
            name: "Del Norton, Eleanor".to_string(),
            seat: "DC".to_string(),
        });
        assert!(matches!(err, Err(Error::MalformedName(_))));
    }

    #[test]
    fn test_parse_considerations() {
        let roster = roster();
        let classifier = ActionClassifier::new().unwrap();
        let assembler = BillAssembler::new(&roster, &classifier).unwrap();
        let refs = assembler.parse_considerations(
            "Motion to reconsider laid on the table Agreed to without objection. (consideration: CR H1234-1240; CR H1250)",
        );
        assert_eq!(
            refs,
            vec![
                Consideration {
                    label: "consideration".to_string(),
                    reference: "CR H1234-1240".to_string(),
                },
                Consideration {
                    label: String::new(),
                    reference: "CR H1250".to_string(),
                },
            ]
        );

        // a parenthetical followed by a period is part of the sentence
        assert!(assembler
            .parse_considerations("Passed (Roll no. 45).")
            .is_empty());
    }

    #[test]
    fn test_roll_group_is_not_a_reference() {
        let roster = roster();
        let classifier = ActionClassifier::new().unwrap();
        let mut src = source();
        src.actions[1].text =
            "On passage Passed by the Yeas and Nays: 300 - 100 (Roll no. 45)".to_string();
        let bill = BillAssembler::new(&roster, &classifier).unwrap().assemble(&src).unwrap();

        let vote = &bill.actions[1];
        assert!(vote.references.is_empty());
        assert_eq!(vote.attributes.roll.as_deref(), Some("45"));
        assert_eq!(vote.attributes.status, Some(StatusCode::PassOver(Chamber::House)));

        let assembler = BillAssembler::new(&roster, &classifier).unwrap();
        assert!(assembler
            .parse_considerations(
                "Cloture motion agreed to. Record Vote Number: 12 (Record Vote No: 12)"
            )
            .is_empty());
    }

    #[test]
    fn test_assemble_folds_status() {
        let roster = roster();
        let classifier = ActionClassifier::new().unwrap();
        let bill = BillAssembler::new(&roster, &classifier)
            .unwrap()
            .assemble(&source())
            .unwrap();

        assert_eq!(bill.sponsor, Some(400440));
        assert_eq!(bill.introduced, date(2009, 3, 2));
        assert_eq!(bill.status, StatusCode::PassOver(Chamber::House));
        assert_eq!(bill.status_date.to_iso(), "2009-07-15T14:33:00-04:00");
        assert_eq!(bill.actions.len(), 2);
        assert_eq!(bill.actions[0].attributes.status, Some(StatusCode::Referred));
        assert_eq!(bill.actions[1].attributes.roll.as_deref(), Some("45"));
    }

    #[test]
    fn test_no_actions_keeps_introduced() {
        let roster = roster();
        let classifier = ActionClassifier::new().unwrap();
        let mut src = source();
        src.actions.clear();
        let bill = BillAssembler::new(&roster, &classifier).unwrap().assemble(&src).unwrap();
        assert_eq!(bill.status, StatusCode::Introduced);
        assert_eq!(bill.status_date, ActionDate::Date(date(2009, 3, 2)));
    }

    #[test]
    fn test_indent_is_running_sum() {
        let roster = roster();
        let classifier = ActionClassifier::new().unwrap();
        let mut src = source();
        src.actions[0].indent_delta = 1;
        src.actions.push(RawAction {
            timestamp: "07/16/2009".to_string(),
            indent_delta: -1,
            text: "Received in the Senate.".to_string(),
        });
        let bill = BillAssembler::new(&roster, &classifier).unwrap().assemble(&src).unwrap();
        let indents: Vec<i32> = bill.actions.iter().map(|a| a.indent).collect();
        assert_eq!(indents, vec![1, 1, 0]);
    }

    #[test]
    fn test_cosponsor_typo_and_withdrawal() {
        let roster = roster();
        let classifier = ActionClassifier::new().unwrap();
        let mut src = source();
        src.cosponsors.push(CosponsorSource {
            member: MemberSource {
                name: "Sen Udall, Mark".to_string(),
                seat: "CO".to_string(),
            },
            joined: "04/01/2009".to_string(),
            withdrawn: Some("05/01/2009".to_string()),
        });
        let bill = BillAssembler::new(&roster, &classifier).unwrap().assemble(&src).unwrap();
        assert_eq!(
            bill.cosponsors,
            vec![Cosponsor {
                id: 412247,
                joined: date(2009, 4, 1),
                withdrawn: Some(date(2009, 5, 1)),
            }]
        );
    }

    #[test]
    fn test_reserved_bill_is_skipped() {
        let roster = roster();
        let classifier = ActionClassifier::new().unwrap();
        let mut src = source();
        src.title = "Reserved for the Speaker.".to_string();
        let err = BillAssembler::new(&roster, &classifier).unwrap().assemble(&src).unwrap_err();
        assert_eq!(err.to_string(), "Skipping bill reserved for the speaker.");
    }

    #[test]
    fn test_malformed_action_date() {
        let roster = roster();
        let classifier = ActionClassifier::new().unwrap();
        let mut src = source();
        src.actions[1].timestamp = "2009-07-15".to_string();
        let err = BillAssembler::new(&roster, &classifier).unwrap().assemble(&src).unwrap_err();
        assert!(matches!(err, Error::MalformedDate(_)));
    }
}
