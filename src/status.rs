//! Bill lifecycle status codes and the vote-outcome transition table.

use crate::error::{Error, Result};
use crate::types::{BillType, Chamber};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const CONSTITUTIONAL_AMENDMENT_TITLE: &str =
    "Proposing an amendment to the Constitution of the United States";

/// Procedural status of a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Introduced,
    Referred,
    Reported,
    /// Passed the originating chamber, now in the other one
    PassOver(Chamber),
    /// Passed the second chamber with changes, back to the first
    PassBack(Chamber),
    PassedSimpleRes,
    PassedBill,
    PassedConstAmend,
    PassedConcurrentRes,
    FailOriginating(Chamber),
    FailSecond(Chamber),
    ProvKillSuspensionFailed,
    ProvKillClotureFailed,
    ProvKillPingpongFail,
    ProvKillVeto,
    ConferencePassed(Chamber),
    VetoedPocket,
    VetoedOverrideFailOriginating(Chamber),
    VetoedOverrideFailSecond(Chamber),
    VetoedOverridePassOver(Chamber),
    EnactedSigned,
    EnactedVetoOverride,
}

impl StatusCode {
    /// Any of the `VETOED:*` codes
    pub fn is_vetoed(&self) -> bool {
        matches!(
            self,
            StatusCode::VetoedPocket
                | StatusCode::VetoedOverrideFailOriginating(_)
                | StatusCode::VetoedOverrideFailSecond(_)
                | StatusCode::VetoedOverridePassOver(_)
        )
    }

    /// Any of the `CONFERENCE:PASSED:*` codes
    pub fn is_conference_passed(&self) -> bool {
        matches!(self, StatusCode::ConferencePassed(_))
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Introduced => f.write_str("INTRODUCED"),
            StatusCode::Referred => f.write_str("REFERRED"),
            StatusCode::Reported => f.write_str("REPORTED"),
            StatusCode::PassOver(c) => write!(f, "PASS_OVER:{}", c),
            StatusCode::PassBack(c) => write!(f, "PASS_BACK:{}", c),
            StatusCode::PassedSimpleRes => f.write_str("PASSED:SIMPLERES"),
            StatusCode::PassedBill => f.write_str("PASSED:BILL"),
            StatusCode::PassedConstAmend => f.write_str("PASSED:CONSTAMEND"),
            StatusCode::PassedConcurrentRes => f.write_str("PASSED:CONCURRENTRES"),
            StatusCode::FailOriginating(c) => write!(f, "FAIL:ORIGINATING:{}", c),
            StatusCode::FailSecond(c) => write!(f, "FAIL:SECOND:{}", c),
            StatusCode::ProvKillSuspensionFailed => f.write_str("PROV_KILL:SUSPENSIONFAILED"),
            StatusCode::ProvKillClotureFailed => f.write_str("PROV_KILL:CLOTUREFAILED"),
            StatusCode::ProvKillPingpongFail => f.write_str("PROV_KILL:PINGPONGFAIL"),
            StatusCode::ProvKillVeto => f.write_str("PROV_KILL:VETO"),
            StatusCode::ConferencePassed(c) => write!(f, "CONFERENCE:PASSED:{}", c),
            StatusCode::VetoedPocket => f.write_str("VETOED:POCKET"),
            StatusCode::VetoedOverrideFailOriginating(c) => {
                write!(f, "VETOED:OVERRIDE_FAIL_ORIGINATING:{}", c)
            }
            StatusCode::VetoedOverrideFailSecond(c) => {
                write!(f, "VETOED:OVERRIDE_FAIL_SECOND:{}", c)
            }
            StatusCode::VetoedOverridePassOver(c) => {
                write!(f, "VETOED:OVERRIDE_PASS_OVER:{}", c)
            }
            StatusCode::EnactedSigned => f.write_str("ENACTED:SIGNED"),
            StatusCode::EnactedVetoOverride => f.write_str("ENACTED:VETO_OVERRIDE"),
        }
    }
}

fn parse_chamber(s: &str) -> Option<Chamber> {
    match s {
        "HOUSE" => Some(Chamber::House),
        "SENATE" => Some(Chamber::Senate),
        _ => None,
    }
}

impl FromStr for StatusCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_uppercase();
        let simple = match code.as_str() {
            "INTRODUCED" => Some(StatusCode::Introduced),
            "REFERRED" => Some(StatusCode::Referred),
            "REPORTED" => Some(StatusCode::Reported),
            "PASSED:SIMPLERES" => Some(StatusCode::PassedSimpleRes),
            "PASSED:BILL" => Some(StatusCode::PassedBill),
            "PASSED:CONSTAMEND" => Some(StatusCode::PassedConstAmend),
            "PASSED:CONCURRENTRES" => Some(StatusCode::PassedConcurrentRes),
            "PROV_KILL:SUSPENSIONFAILED" => Some(StatusCode::ProvKillSuspensionFailed),
            "PROV_KILL:CLOTUREFAILED" => Some(StatusCode::ProvKillClotureFailed),
            "PROV_KILL:PINGPONGFAIL" => Some(StatusCode::ProvKillPingpongFail),
            "PROV_KILL:VETO" => Some(StatusCode::ProvKillVeto),
            "VETOED:POCKET" => Some(StatusCode::VetoedPocket),
            "ENACTED:SIGNED" => Some(StatusCode::EnactedSigned),
            "ENACTED:VETO_OVERRIDE" => Some(StatusCode::EnactedVetoOverride),
            _ => None,
        };
        if let Some(status) = simple {
            return Ok(status);
        }

        let chambered = code.rsplit_once(':').and_then(|(prefix, chamber)| {
            let chamber = parse_chamber(chamber)?;
            match prefix {
                "PASS_OVER" => Some(StatusCode::PassOver(chamber)),
                "PASS_BACK" => Some(StatusCode::PassBack(chamber)),
                "FAIL:ORIGINATING" => Some(StatusCode::FailOriginating(chamber)),
                "FAIL:SECOND" => Some(StatusCode::FailSecond(chamber)),
                "CONFERENCE:PASSED" => Some(StatusCode::ConferencePassed(chamber)),
                "VETOED:OVERRIDE_FAIL_ORIGINATING" => {
                    Some(StatusCode::VetoedOverrideFailOriginating(chamber))
                }
                "VETOED:OVERRIDE_FAIL_SECOND" => Some(StatusCode::VetoedOverrideFailSecond(chamber)),
                "VETOED:OVERRIDE_PASS_OVER" => Some(StatusCode::VetoedOverridePassOver(chamber)),
                _ => None,
            }
        });

        chambered.ok_or_else(|| Error::Config(format!("Unknown status code '{}'", s)))
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What a recorded floor vote was about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    /// Passage in the originating chamber
    Vote,
    /// Passage in the second chamber
    Vote2,
    Cloture,
    Override,
    /// Agreeing to / concurring in the other chamber's amendments
    Pingpong,
    Conference,
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoteType::Vote => "vote",
            VoteType::Vote2 => "vote2",
            VoteType::Cloture => "cloture",
            VoteType::Override => "override",
            VoteType::Pingpong => "pingpong",
            VoteType::Conference => "conference",
        };
        f.write_str(s)
    }
}

/// Outcome of a single floor vote as read off an action line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub vote_type: VoteType,
    pub chamber: Chamber,
    pub passed: bool,
    /// Taken under suspension of the rules
    pub suspension: bool,
    pub amended: bool,
}

/// Status a bill moves to after a vote, or `None` when the vote does not
/// change it.
pub fn transition(
    vote: &VoteOutcome,
    bill_type: BillType,
    title: &str,
    previous: StatusCode,
) -> Option<StatusCode> {
    let chamber = vote.chamber;
    match (vote.vote_type, vote.passed) {
        (VoteType::Vote, true) => {
            if bill_type.is_simple_resolution() {
                Some(StatusCode::PassedSimpleRes)
            } else {
                Some(StatusCode::PassOver(chamber))
            }
        }
        (VoteType::Vote, false) => {
            if vote.suspension {
                Some(StatusCode::ProvKillSuspensionFailed)
            } else {
                Some(StatusCode::FailOriginating(chamber))
            }
        }
        (VoteType::Vote2, true) => {
            if bill_type.is_joint_resolution() && title.starts_with(CONSTITUTIONAL_AMENDMENT_TITLE)
            {
                Some(StatusCode::PassedConstAmend)
            } else if bill_type.is_concurrent_resolution() {
                Some(StatusCode::PassedConcurrentRes)
            } else if vote.amended {
                Some(StatusCode::PassBack(chamber))
            } else {
                Some(StatusCode::PassedBill)
            }
        }
        (VoteType::Vote2, false) => {
            if vote.suspension {
                Some(StatusCode::ProvKillSuspensionFailed)
            } else {
                Some(StatusCode::FailSecond(chamber))
            }
        }
        (VoteType::Cloture, false) => Some(StatusCode::ProvKillClotureFailed),
        (VoteType::Cloture, true) => None,
        (VoteType::Override, false) => {
            if bill_type.origin_chamber() == chamber {
                Some(StatusCode::VetoedOverrideFailOriginating(chamber))
            } else {
                Some(StatusCode::VetoedOverrideFailSecond(chamber))
            }
        }
        (VoteType::Override, true) => {
            if bill_type.origin_chamber() == chamber {
                Some(StatusCode::VetoedOverridePassOver(chamber))
            } else {
                // wait for the enactment line
                None
            }
        }
        (VoteType::Pingpong, true) => Some(StatusCode::PassedBill),
        (VoteType::Pingpong, false) => Some(StatusCode::ProvKillPingpongFail),
        (VoteType::Conference, true) => {
            if previous.is_conference_passed() {
                Some(StatusCode::PassedBill)
            } else {
                Some(StatusCode::ConferencePassed(chamber))
            }
        }
        (VoteType::Conference, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(vote_type: VoteType, chamber: Chamber, passed: bool) -> VoteOutcome {
        VoteOutcome {
            vote_type,
            chamber,
            passed,
            suspension: false,
            amended: false,
        }
    }

    #[test]
    fn test_status_code_strings() {
        let codes = [
            "INTRODUCED",
            "PASS_OVER:HOUSE",
            "PASS_BACK:SENATE",
            "FAIL:ORIGINATING:SENATE",
            "CONFERENCE:PASSED:HOUSE",
            "VETOED:OVERRIDE_FAIL_SECOND:HOUSE",
            "VETOED:POCKET",
            "ENACTED:VETO_OVERRIDE",
            "PROV_KILL:VETO",
        ];
        for code in codes {
            let status: StatusCode = code.parse().unwrap();
            assert_eq!(status.to_string(), code);
        }
        assert!("PROV_KILL:VETO'".parse::<StatusCode>().is_err());
        assert!("PASS_OVER:CONGRESS".parse::<StatusCode>().is_err());
    }

    #[test]
    fn test_vote_originating_chamber() {
        let passed = outcome(VoteType::Vote, Chamber::House, true);
        assert_eq!(
            transition(&passed, BillType::HouseResolution, "", StatusCode::Introduced),
            Some(StatusCode::PassedSimpleRes)
        );
        assert_eq!(
            transition(&passed, BillType::HouseBill, "", StatusCode::Introduced),
            Some(StatusCode::PassOver(Chamber::House))
        );

        let failed = outcome(VoteType::Vote, Chamber::House, false);
        assert_eq!(
            transition(&failed, BillType::HouseBill, "", StatusCode::Referred),
            Some(StatusCode::FailOriginating(Chamber::House))
        );
        let suspension = VoteOutcome {
            suspension: true,
            ..failed
        };
        assert_eq!(
            transition(&suspension, BillType::HouseBill, "", StatusCode::Referred),
            Some(StatusCode::ProvKillSuspensionFailed)
        );
    }

    #[test]
    fn test_vote_second_chamber() {
        let vote = outcome(VoteType::Vote2, Chamber::Senate, true);
        let title = "Proposing an amendment to the Constitution of the United States relative to the balanced budget.";
        assert_eq!(
            transition(
                &vote,
                BillType::HouseJointResolution,
                title,
                StatusCode::PassOver(Chamber::House)
            ),
            Some(StatusCode::PassedConstAmend)
        );
        assert_eq!(
            transition(&vote, BillType::HouseJointResolution, "Making appropriations", StatusCode::Introduced),
            Some(StatusCode::PassedBill)
        );
        assert_eq!(
            transition(&vote, BillType::HouseConcurrentResolution, "", StatusCode::Introduced),
            Some(StatusCode::PassedConcurrentRes)
        );
        let amended = VoteOutcome {
            amended: true,
            ..vote
        };
        assert_eq!(
            transition(&amended, BillType::HouseBill, "", StatusCode::Introduced),
            Some(StatusCode::PassBack(Chamber::Senate))
        );
        let failed = outcome(VoteType::Vote2, Chamber::Senate, false);
        assert_eq!(
            transition(&failed, BillType::HouseBill, "", StatusCode::Introduced),
            Some(StatusCode::FailSecond(Chamber::Senate))
        );
    }

    #[test]
    fn test_cloture_and_pingpong() {
        let cloture = outcome(VoteType::Cloture, Chamber::Senate, false);
        assert_eq!(
            transition(&cloture, BillType::SenateBill, "", StatusCode::Reported),
            Some(StatusCode::ProvKillClotureFailed)
        );
        let invoked = outcome(VoteType::Cloture, Chamber::Senate, true);
        assert_eq!(transition(&invoked, BillType::SenateBill, "", StatusCode::Reported), None);

        let pingpong = outcome(VoteType::Pingpong, Chamber::House, true);
        assert_eq!(
            transition(&pingpong, BillType::HouseBill, "", StatusCode::PassBack(Chamber::Senate)),
            Some(StatusCode::PassedBill)
        );
        let rejected = outcome(VoteType::Pingpong, Chamber::House, false);
        assert_eq!(
            transition(&rejected, BillType::HouseBill, "", StatusCode::PassBack(Chamber::Senate)),
            Some(StatusCode::ProvKillPingpongFail)
        );
    }

    #[test]
    fn test_override() {
        let house_fail = outcome(VoteType::Override, Chamber::House, false);
        assert_eq!(
            transition(&house_fail, BillType::HouseBill, "", StatusCode::ProvKillVeto),
            Some(StatusCode::VetoedOverrideFailOriginating(Chamber::House))
        );
        assert_eq!(
            transition(&house_fail, BillType::SenateBill, "", StatusCode::ProvKillVeto),
            Some(StatusCode::VetoedOverrideFailSecond(Chamber::House))
        );

        let house_pass = outcome(VoteType::Override, Chamber::House, true);
        assert_eq!(
            transition(&house_pass, BillType::HouseBill, "", StatusCode::ProvKillVeto),
            Some(StatusCode::VetoedOverridePassOver(Chamber::House))
        );
        assert_eq!(
            transition(&house_pass, BillType::SenateBill, "", StatusCode::ProvKillVeto),
            None
        );
    }

    #[test]
    fn test_conference() {
        let vote = outcome(VoteType::Conference, Chamber::House, true);
        assert_eq!(
            transition(
                &vote,
                BillType::HouseBill,
                "",
                StatusCode::ConferencePassed(Chamber::Senate)
            ),
            Some(StatusCode::PassedBill)
        );
        assert_eq!(
            transition(&vote, BillType::HouseBill, "", StatusCode::Introduced),
            Some(StatusCode::ConferencePassed(Chamber::House))
        );
        let failed = outcome(VoteType::Conference, Chamber::House, false);
        assert_eq!(transition(&failed, BillType::HouseBill, "", StatusCode::Introduced), None);
    }
}
