use crate::classifier::ActionAttributes;
use crate::error::{Error, Result};
use crate::status::StatusCode;
use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::US::Eastern;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Roster person identifier
pub type PersonId = u32;

/// Legislative chamber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    /// Uppercase suffix used in status codes
    pub fn as_status_suffix(&self) -> &'static str {
        match self {
            Chamber::House => "HOUSE",
            Chamber::Senate => "SENATE",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_status_suffix())
    }
}

/// Bill type code. The first letter is the originating chamber, the rest
/// encodes the kind of measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillType {
    /// House bill (`h`)
    HouseBill,
    /// House simple resolution (`hr`)
    HouseResolution,
    /// House joint resolution (`hj`)
    HouseJointResolution,
    /// House concurrent resolution (`hc`)
    HouseConcurrentResolution,
    /// Senate bill (`s`)
    SenateBill,
    /// Senate simple resolution (`sr`)
    SenateResolution,
    /// Senate joint resolution (`sj`)
    SenateJointResolution,
    /// Senate concurrent resolution (`sc`)
    SenateConcurrentResolution,
}

impl BillType {
    pub fn code(&self) -> &'static str {
        match self {
            BillType::HouseBill => "h",
            BillType::HouseResolution => "hr",
            BillType::HouseJointResolution => "hj",
            BillType::HouseConcurrentResolution => "hc",
            BillType::SenateBill => "s",
            BillType::SenateResolution => "sr",
            BillType::SenateJointResolution => "sj",
            BillType::SenateConcurrentResolution => "sc",
        }
    }

    /// Map a THOMAS search list code (`HR`, `HE`, `SN`, ...) to a bill type
    pub fn from_thomas_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "HR" => Some(BillType::HouseBill),
            "HE" => Some(BillType::HouseResolution),
            "HJ" => Some(BillType::HouseJointResolution),
            "HC" => Some(BillType::HouseConcurrentResolution),
            "SN" => Some(BillType::SenateBill),
            "SE" => Some(BillType::SenateResolution),
            "SJ" => Some(BillType::SenateJointResolution),
            "SC" => Some(BillType::SenateConcurrentResolution),
            _ => None,
        }
    }

    pub fn origin_chamber(&self) -> Chamber {
        match self {
            BillType::HouseBill
            | BillType::HouseResolution
            | BillType::HouseJointResolution
            | BillType::HouseConcurrentResolution => Chamber::House,
            _ => Chamber::Senate,
        }
    }

    pub fn is_simple_resolution(&self) -> bool {
        matches!(self, BillType::HouseResolution | BillType::SenateResolution)
    }

    pub fn is_joint_resolution(&self) -> bool {
        matches!(
            self,
            BillType::HouseJointResolution | BillType::SenateJointResolution
        )
    }

    pub fn is_concurrent_resolution(&self) -> bool {
        matches!(
            self,
            BillType::HouseConcurrentResolution | BillType::SenateConcurrentResolution
        )
    }
}

impl FromStr for BillType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "h" => Ok(BillType::HouseBill),
            "hr" => Ok(BillType::HouseResolution),
            "hj" => Ok(BillType::HouseJointResolution),
            "hc" => Ok(BillType::HouseConcurrentResolution),
            "s" => Ok(BillType::SenateBill),
            "sr" => Ok(BillType::SenateResolution),
            "sj" => Ok(BillType::SenateJointResolution),
            "sc" => Ok(BillType::SenateConcurrentResolution),
            other => Err(Error::Config(format!(
                "Invalid bill type '{}'. Allowed values are: h, hr, hj, hc, s, sr, sj, sc",
                other
            ))),
        }
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for BillType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for BillType {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        // THOMAS list codes are upper case; `HR` is a bill there, not a resolution
        match BillType::from_thomas_code(&s) {
            Some(bill_type) if s.chars().all(|c| c.is_ascii_uppercase()) => Ok(bill_type),
            _ => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Vote result as read off an action line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteResult {
    Pass,
    Fail,
}

impl From<bool> for VoteResult {
    fn from(passed: bool) -> Self {
        if passed {
            VoteResult::Pass
        } else {
            VoteResult::Fail
        }
    }
}

/// Kind of seat a role holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Rep,
    Sen,
}

impl FromStr for RoleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rep" => Ok(RoleType::Rep),
            "sen" => Ok(RoleType::Sen),
            other => Err(Error::Config(format!(
                "Invalid role type '{}'. Allowed values are: rep, sen",
                other
            ))),
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleType::Rep => f.write_str("rep"),
            RoleType::Sen => f.write_str("sen"),
        }
    }
}

/// A legislator as stored in the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    /// ASCII-normalized last name, used for lookup
    pub last_name: String,
    /// Last name with its native accents
    #[serde(default)]
    pub last_name_native: Option<String>,
    #[serde(default)]
    pub name_modifier: Option<String>,
}

/// A term of service. `start_date` and `end_date` are both inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub person_id: PersonId,
    #[serde(rename = "type")]
    pub role_type: RoleType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub state: String,
    #[serde(default)]
    pub district: Option<u32>,
}

impl Role {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Timestamp of an action, which THOMAS gives either as a bare date or as a
/// date with a time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionDate {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ActionDate {
    /// Parse `MM/DD/YYYY HH:MMam` or `MM/DD/YYYY`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%m/%d/%Y %I:%M%p") {
            return Ok(ActionDate::DateTime(dt));
        }
        NaiveDate::parse_from_str(s, "%m/%d/%Y")
            .map(ActionDate::Date)
            .map_err(|_| Error::MalformedDate(s.to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            ActionDate::Date(d) => *d,
            ActionDate::DateTime(dt) => dt.date(),
        }
    }

    /// ISO-8601 rendering. Times carry the US/Eastern offset; bare dates stay
    /// bare. A wall time skipped by the spring-forward change is read one hour
    /// later, as clocks showed it after the change.
    pub fn to_iso(&self) -> String {
        match self {
            ActionDate::Date(d) => d.format("%Y-%m-%d").to_string(),
            ActionDate::DateTime(dt) => {
                let local = Eastern
                    .from_local_datetime(dt)
                    .earliest()
                    .or_else(|| Eastern.from_local_datetime(&(*dt + Duration::hours(1))).earliest());
                match local {
                    Some(local) => local.to_rfc3339(),
                    None => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
                }
            }
        }
    }
}

impl Serialize for ActionDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

/// A `(label, reference)` pair taken from the trailing parenthetical of an
/// action line, e.g. `CR H1234`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Consideration {
    pub label: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

/// One classified entry of a bill's action log
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    pub datetime: ActionDate,
    pub indent: i32,
    pub text: String,
    #[serde(flatten)]
    pub attributes: ActionAttributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Consideration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cosponsor {
    pub id: PersonId,
    pub joined: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawn: Option<NaiveDate>,
}

/// A fully assembled bill
#[derive(Debug, Clone, Serialize)]
pub struct Bill {
    pub congress: u32,
    #[serde(rename = "type")]
    pub bill_type: BillType,
    pub number: u32,
    pub title: String,
    pub introduced: NaiveDate,
    pub sponsor: Option<PersonId>,
    pub cosponsors: Vec<Cosponsor>,
    pub status: StatusCode,
    pub status_date: ActionDate,
    pub actions: Vec<Action>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_type_chambers() {
        assert_eq!("hr".parse::<BillType>().unwrap(), BillType::HouseResolution);
        assert_eq!(BillType::HouseResolution.origin_chamber(), Chamber::House);
        assert_eq!(BillType::SenateJointResolution.origin_chamber(), Chamber::Senate);
        assert!(BillType::SenateResolution.is_simple_resolution());
        assert!(!BillType::SenateBill.is_simple_resolution());
        assert!("hz".parse::<BillType>().is_err());
    }

    #[test]
    fn test_thomas_codes() {
        assert_eq!(BillType::from_thomas_code("HE"), Some(BillType::HouseResolution));
        assert_eq!(BillType::from_thomas_code("SN"), Some(BillType::SenateBill));
        assert_eq!(BillType::from_thomas_code("HZ"), None);
    }

    #[test]
    fn test_bill_type_accepts_thomas_codes() {
        let parse = |s: &str| serde_json::from_str::<BillType>(s).unwrap();
        assert_eq!(parse(r#""HR""#), BillType::HouseBill);
        assert_eq!(parse(r#""SN""#), BillType::SenateBill);
        assert_eq!(parse(r#""hr""#), BillType::HouseResolution);
        assert_eq!(parse(r#""sj""#), BillType::SenateJointResolution);
        assert!(serde_json::from_str::<BillType>(r#""HZ""#).is_err());
    }

    #[test]
    fn test_action_date_formats() {
        let d = ActionDate::parse("1/6/2009").unwrap();
        assert_eq!(d, ActionDate::Date(NaiveDate::from_ymd_opt(2009, 1, 6).unwrap()));
        assert_eq!(d.to_iso(), "2009-01-06");

        let dt = ActionDate::parse("7/15/2009 2:33pm").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2009, 7, 15).unwrap());
        assert_eq!(dt.to_iso(), "2009-07-15T14:33:00-04:00");

        let winter = ActionDate::parse("12/1/2009 9:05am").unwrap();
        assert_eq!(winter.to_iso(), "2009-12-01T09:05:00-05:00");
    }

    #[test]
    fn test_spring_forward_gap_shifts_forward() {
        let dt = ActionDate::parse("03/08/2009 2:30am").unwrap();
        assert_eq!(dt.to_iso(), "2009-03-08T03:30:00-04:00");

        // the repeated hour in November takes the earlier, daylight reading
        let dt = ActionDate::parse("11/01/2009 1:30am").unwrap();
        assert_eq!(dt.to_iso(), "2009-11-01T01:30:00-04:00");
    }

    #[test]
    fn test_malformed_date() {
        let err = ActionDate::parse("sometime in June").unwrap_err();
        assert!(matches!(err, Error::MalformedDate(_)));
    }
}
