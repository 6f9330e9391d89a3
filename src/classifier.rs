//! Classification of bill action lines.
//!
//! A line is run through an ordered list of independent rules. Rules are not
//! mutually exclusive: every rule whose pattern matches contributes a patch,
//! and a later patch overwrites the same attributes set by an earlier one.

use crate::error::Result;
use crate::status::{transition, StatusCode, VoteOutcome, VoteType};
use crate::types::{BillType, Chamber, VoteResult};
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

/// Outcome recorded for "Passed House pursuant to ..." lines. Existing
/// status data reads these as failed votes and must stay comparable.
const PASSED_HOUSE_PURSUANT_OUTCOME: bool = false;

/// Kind of node an action is rendered as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NodeKind {
    #[default]
    #[serde(rename = "action")]
    Action,
    #[serde(rename = "vote")]
    Vote,
    /// A vote that is not on passage (cloture)
    #[serde(rename = "vote-aux")]
    VoteAux,
    #[serde(rename = "calendar")]
    Calendar,
    #[serde(rename = "reported")]
    Reported,
    #[serde(rename = "discharged")]
    Discharged,
    #[serde(rename = "topresident")]
    ToPresident,
    #[serde(rename = "signed")]
    Signed,
    #[serde(rename = "vetoed")]
    Vetoed,
    #[serde(rename = "enacted")]
    Enacted,
    #[serde(rename = "referral")]
    Referral,
}

/// Structured attributes of one action line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionAttributes {
    pub node: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amendment: Option<String>,
    #[serde(rename = "votetype", skip_serializing_if = "Option::is_none")]
    pub vote_type: Option<VoteType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VoteResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub under: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcommittee: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pocket: bool,
    #[serde(rename = "state", skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusCode>,
}

/// Attributes contributed by one rule
#[derive(Debug, Clone, Default)]
struct AttributePatch {
    node: Option<NodeKind>,
    amendment: Option<String>,
    vote_type: Option<VoteType>,
    result: Option<VoteResult>,
    how: Option<String>,
    roll: Option<String>,
    calendar: Option<String>,
    under: Option<String>,
    number: Option<String>,
    committee: Option<String>,
    subcommittee: Option<String>,
    pocket: Option<bool>,
    status: Option<StatusCode>,
}

fn overwrite<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

impl ActionAttributes {
    fn apply(&mut self, patch: AttributePatch) {
        if let Some(node) = patch.node {
            self.node = node;
        }
        if let Some(pocket) = patch.pocket {
            self.pocket = pocket;
        }
        overwrite(&mut self.amendment, patch.amendment);
        overwrite(&mut self.vote_type, patch.vote_type);
        overwrite(&mut self.result, patch.result);
        overwrite(&mut self.how, patch.how);
        overwrite(&mut self.roll, patch.roll);
        overwrite(&mut self.calendar, patch.calendar);
        overwrite(&mut self.under, patch.under);
        overwrite(&mut self.number, patch.number);
        overwrite(&mut self.committee, patch.committee);
        overwrite(&mut self.subcommittee, patch.subcommittee);
        overwrite(&mut self.status, patch.status);
    }
}

/// Bill context a line is classified against
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub bill_type: BillType,
    pub previous_status: StatusCode,
    pub title: &'a str,
}

/// Secondary patterns consulted inside rule bodies
struct AuxPatterns {
    house_roll: Regex,
    senate_roll: Regex,
    senate_amendment_motion: Regex,
}

struct RuleInput<'a> {
    line: &'a str,
    ctx: &'a ActionContext<'a>,
    aux: &'a AuxPatterns,
}

type RuleBody = fn(&Captures<'_>, &RuleInput<'_>) -> Option<AttributePatch>;

struct Rule {
    name: &'static str,
    pattern: Regex,
    body: RuleBody,
    /// Skip all later rules when this one fires
    terminal: bool,
}

const AMENDMENT_PATTERN: &str = r"(?i)^r^(H|S)\.Amdt\.(\d+)";

const HOUSE_VOTE_PATTERN: &str = concat!(
    r"(?i)(On passage|On motion to suspend the rules and pass the bill",
    r"|On motion to suspend the rules and agree to the resolution",
    r"|On motion to suspend the rules and pass the resolution",
    r"|On agreeing to the resolution|On agreeing to the conference report",
    r"|Two-thirds of the Members present having voted in the affirmative the bill is passed,?",
    r"|On motion that the House agree to the Senate amendments?",
    r"|On motion that the House suspend the rules and concur in the Senate amendments?",
    r"|On motion that the House suspend the rules and agree to the Senate amendments?",
    r"|On motion that the House agree with an amendment to the Senate amendments?",
    r"|House Agreed to Senate Amendments.*?|Passed House)",
    r"(, the objections of the President to the contrary notwithstanding.?)?",
    r"(, as amended| \(Amended\))? (Passed|Failed|Agreed to|Rejected)? ?",
    r"(by voice vote|without objection|by (the Yeas and Nays|Yea-Nay Vote|recorded vote)",
    r"((:)? \(2/3 required\))?: \d+ - \d+(, \d+ Present)? [ \)]*\((Roll no\.|Record Vote No:) \d+\))",
);

const PASSED_HOUSE_PURSUANT_PATTERN: &str = r"(?i)Passed House pursuant to";

const SENATE_VOTE_PATTERN: &str = concat!(
    r"(?i)(Passed Senate|Failed of passage in Senate|Resolution agreed to in Senate",
    r"|Received in the Senate, considered, and agreed to",
    r"|Submitted in the Senate, considered, and agreed to",
    r"|Introduced in the Senate, read twice, considered, read the third time, and passed",
    r"|Received in the Senate, read twice, considered, read the third time, and passed",
    r"|Senate agreed to conference report",
    r"|Cloture \S*\s?on the motion to proceed .*?not invoked in Senate",
    r"|Cloture on the bill not invoked in Senate|Cloture on the bill invoked in Senate",
    r"|Cloture on the motion to proceed to the bill invoked in Senate",
    r"|Cloture on the motion to proceed to the bill not invoked in Senate",
    r"|Senate agreed to House amendment|Senate concurred in the House amendment)",
    r"(,?.*,?) (without objection|by Unanimous Consent|by Voice Vote",
    r"|by Yea-Nay( Vote)?\. \d+\s*-\s*\d+\. Record Vote (No|Number): \d+)",
);

const CALENDAR_PATTERN: &str = concat!(
    r"(?i)Placed on (the )?([\w ]+) Calendar( under ([\w ]+))?[,\.] Calendar No\. (\d+)\.",
    r"|Committee Agreed to Seek Consideration Under Suspension of the Rules",
    r"|Ordered to be Reported",
);

const REPORTED_PATTERN: &str = r"(?i)Committee on (.*)\. Reported by";
const DISCHARGED_PATTERN: &str = r"(?i)Committee on (.*)\. Discharged (by Unanimous Consent)?";
const TO_PRESIDENT_PATTERN: &str = r"(?i)Cleared for White House|Presented to President";
const SIGNED_PATTERN: &str = r"(?i)Signed by President";
const POCKET_VETO_PATTERN: &str = r"(?i)Pocket Vetoed by President";
const VETO_PATTERN: &str = r"(?i)Vetoed by President";
const ENACTED_PATTERN: &str = r"(?i)Became (Public|Private) Law No: ([\d\-]+)\.";
const REFERRAL_PATTERN: &str = r"(?i)Referred to (the )?((House|Senate|Committee) [^\.]+).?";
const SUBCOMMITTEE_REFERRAL_PATTERN: &str = r"(?i)Referred to the Subcommittee on (.*[^\.]).?";
const SENATE_RECEIVED_REFERRAL_PATTERN: &str =
    r"(?i)Received in the Senate and referred to (the )?(.*[^\.]).?";

fn group(caps: &Captures<'_>, i: usize) -> Option<String> {
    caps.get(i).map(|m| m.as_str().to_string())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn originating_or_second(bill_type: BillType, chamber: Chamber) -> VoteType {
    if bill_type.origin_chamber() == chamber {
        VoteType::Vote
    } else {
        VoteType::Vote2
    }
}

fn promote_to_reported(previous: StatusCode) -> Option<StatusCode> {
    match previous {
        StatusCode::Introduced | StatusCode::Referred => Some(StatusCode::Reported),
        _ => None,
    }
}

fn promote_to_referred(previous: StatusCode) -> Option<StatusCode> {
    (previous == StatusCode::Introduced).then_some(StatusCode::Referred)
}

// The amendment pattern is anchored twice and can never match; the rule is
// kept so amendment lines stay ordinary actions.
fn amendment_rule(caps: &Captures<'_>, _input: &RuleInput<'_>) -> Option<AttributePatch> {
    let chamber = caps.get(1)?.as_str().to_lowercase();
    let number = caps.get(2)?.as_str();
    Some(AttributePatch {
        amendment: Some(format!("{}{}", chamber, number)),
        ..Default::default()
    })
}

fn house_vote_rule(caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    let motion = caps.get(1)?.as_str();
    let how = caps.get(5)?.as_str();
    let bill_type = input.ctx.bill_type;

    let passed = if contains_ci(motion, "Passed House") || contains_ci(motion, "House Agreed to") {
        true
    } else {
        caps.get(4)
            .map(|m| contains_ci(m.as_str(), "Pass") || contains_ci(m.as_str(), "Agreed"))
            .unwrap_or(false)
    };

    let is_override = caps.get(2).is_some() || motion.contains("Two-thirds of the Members present");

    let vote_type = if is_override {
        VoteType::Override
    } else if input.aux.senate_amendment_motion.is_match(input.line) {
        VoteType::Pingpong
    } else if contains_ci(input.line, "conference report") {
        VoteType::Conference
    } else {
        originating_or_second(bill_type, Chamber::House)
    };

    let roll = input
        .aux
        .house_roll
        .captures(how)
        .and_then(|c| group(&c, 2));
    let suspension = roll.is_some() && motion.contains("On motion to suspend the rules");

    let outcome = VoteOutcome {
        vote_type,
        chamber: Chamber::House,
        passed,
        suspension,
        amended: caps.get(3).is_some(),
    };

    Some(AttributePatch {
        node: Some(NodeKind::Vote),
        vote_type: Some(vote_type),
        result: Some(VoteResult::from(passed)),
        how: Some(how.to_string()),
        roll,
        status: transition(&outcome, bill_type, input.ctx.title, input.ctx.previous_status),
        ..Default::default()
    })
}

fn passed_house_pursuant_rule(_caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    let bill_type = input.ctx.bill_type;
    let vote_type = originating_or_second(bill_type, Chamber::House);
    let outcome = VoteOutcome {
        vote_type,
        chamber: Chamber::House,
        passed: PASSED_HOUSE_PURSUANT_OUTCOME,
        suspension: false,
        amended: false,
    };
    Some(AttributePatch {
        node: Some(NodeKind::Vote),
        vote_type: Some(vote_type),
        how: Some("by special rule".to_string()),
        status: transition(&outcome, bill_type, input.ctx.title, input.ctx.previous_status),
        ..Default::default()
    })
}

fn senate_vote_rule(caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    let motion = caps.get(1)?.as_str();
    let extra = caps.get(2).map_or("", |m| m.as_str());
    let mut how = caps.get(3)?.as_str().to_string();
    let bill_type = input.ctx.bill_type;

    let passed = ["passed", "agreed", "concurred", "bill invoked"]
        .iter()
        .any(|cue| contains_ci(motion, cue));

    let mut node = NodeKind::Vote;
    let vote_type = if contains_ci(extra, "over veto") {
        VoteType::Override
    } else if contains_ci(motion, "conference report") {
        VoteType::Conference
    } else if contains_ci(motion, "cloture") {
        node = NodeKind::VoteAux;
        VoteType::Cloture
    } else if contains_ci(motion, "Senate agreed to House amendment")
        || contains_ci(motion, "Senate concurred in the House amendment")
    {
        VoteType::Pingpong
    } else {
        originating_or_second(bill_type, Chamber::Senate)
    };

    let roll = input
        .aux
        .senate_roll
        .captures(&how)
        .and_then(|c| group(&c, 2));
    if roll.is_some() {
        how = "roll".to_string();
    }

    let amended = contains_ci(extra, "with amendments") || contains_ci(extra, "with an amendment");

    let outcome = VoteOutcome {
        vote_type,
        chamber: Chamber::Senate,
        passed,
        suspension: false,
        amended,
    };

    Some(AttributePatch {
        node: Some(node),
        vote_type: Some(vote_type),
        result: Some(VoteResult::from(passed)),
        how: Some(how),
        roll,
        status: transition(&outcome, bill_type, input.ctx.title, input.ctx.previous_status),
        ..Default::default()
    })
}

fn calendar_rule(caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    Some(AttributePatch {
        node: Some(NodeKind::Calendar),
        calendar: group(caps, 2),
        under: group(caps, 4),
        number: group(caps, 5),
        status: promote_to_reported(input.ctx.previous_status),
        ..Default::default()
    })
}

fn reported_rule(caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    Some(AttributePatch {
        node: Some(NodeKind::Reported),
        committee: group(caps, 1),
        status: promote_to_reported(input.ctx.previous_status),
        ..Default::default()
    })
}

fn discharged_rule(caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    Some(AttributePatch {
        node: Some(NodeKind::Discharged),
        committee: group(caps, 1),
        status: promote_to_reported(input.ctx.previous_status),
        ..Default::default()
    })
}

fn to_president_rule(_caps: &Captures<'_>, _input: &RuleInput<'_>) -> Option<AttributePatch> {
    Some(AttributePatch {
        node: Some(NodeKind::ToPresident),
        ..Default::default()
    })
}

fn signed_rule(_caps: &Captures<'_>, _input: &RuleInput<'_>) -> Option<AttributePatch> {
    Some(AttributePatch {
        node: Some(NodeKind::Signed),
        ..Default::default()
    })
}

fn pocket_veto_rule(_caps: &Captures<'_>, _input: &RuleInput<'_>) -> Option<AttributePatch> {
    Some(AttributePatch {
        node: Some(NodeKind::Vetoed),
        pocket: Some(true),
        status: Some(StatusCode::VetoedPocket),
        ..Default::default()
    })
}

fn veto_rule(_caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    if contains_ci(input.line, "Pocket Vetoed by President") {
        return None;
    }
    Some(AttributePatch {
        node: Some(NodeKind::Vetoed),
        status: Some(StatusCode::ProvKillVeto),
        ..Default::default()
    })
}

fn enacted_rule(_caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    let previous = input.ctx.previous_status;
    let status = if previous == StatusCode::ProvKillVeto || previous.is_vetoed() {
        StatusCode::EnactedVetoOverride
    } else {
        StatusCode::EnactedSigned
    };
    Some(AttributePatch {
        node: Some(NodeKind::Enacted),
        status: Some(status),
        ..Default::default()
    })
}

fn referral_rule(caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    Some(AttributePatch {
        node: Some(NodeKind::Referral),
        committee: group(caps, 2),
        status: promote_to_referred(input.ctx.previous_status),
        ..Default::default()
    })
}

fn subcommittee_referral_rule(caps: &Captures<'_>, input: &RuleInput<'_>) -> Option<AttributePatch> {
    Some(AttributePatch {
        node: Some(NodeKind::Referral),
        subcommittee: group(caps, 1),
        status: promote_to_referred(input.ctx.previous_status),
        ..Default::default()
    })
}

fn senate_received_referral_rule(caps: &Captures<'_>, _input: &RuleInput<'_>) -> Option<AttributePatch> {
    Some(AttributePatch {
        node: Some(NodeKind::Referral),
        committee: group(caps, 2),
        ..Default::default()
    })
}

/// Maps action lines to [`ActionAttributes`]
pub struct ActionClassifier {
    rules: Vec<Rule>,
    aux: AuxPatterns,
}

impl ActionClassifier {
    /// Compile the rule table
    pub fn new() -> Result<Self> {
        let table: [(&'static str, &str, RuleBody, bool); 15] = [
            ("amendment", AMENDMENT_PATTERN, amendment_rule, true),
            ("house-vote", HOUSE_VOTE_PATTERN, house_vote_rule, false),
            ("passed-house-pursuant", PASSED_HOUSE_PURSUANT_PATTERN, passed_house_pursuant_rule, false),
            ("senate-vote", SENATE_VOTE_PATTERN, senate_vote_rule, false),
            ("calendar", CALENDAR_PATTERN, calendar_rule, false),
            ("reported", REPORTED_PATTERN, reported_rule, false),
            ("discharged", DISCHARGED_PATTERN, discharged_rule, false),
            ("to-president", TO_PRESIDENT_PATTERN, to_president_rule, false),
            ("signed", SIGNED_PATTERN, signed_rule, false),
            ("pocket-veto", POCKET_VETO_PATTERN, pocket_veto_rule, false),
            ("veto", VETO_PATTERN, veto_rule, false),
            ("enacted", ENACTED_PATTERN, enacted_rule, false),
            ("referral", REFERRAL_PATTERN, referral_rule, false),
            ("subcommittee-referral", SUBCOMMITTEE_REFERRAL_PATTERN, subcommittee_referral_rule, false),
            ("senate-received-referral", SENATE_RECEIVED_REFERRAL_PATTERN, senate_received_referral_rule, false),
        ];

        let rules = table
            .into_iter()
            .map(|(name, pattern, body, terminal)| -> Result<Rule> {
                Ok(Rule {
                    name,
                    pattern: Regex::new(pattern)?,
                    body,
                    terminal,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let aux = AuxPatterns {
            house_roll: Regex::new(r"(?i)\((Roll no\.|Record Vote No:) (\d+)\)")?,
            senate_roll: Regex::new(r"(?i)Record Vote (No|Number): (\d+)")?,
            senate_amendment_motion: Regex::new(
                r"(?i)(agree (with an amendment )?to|concur in) the Senate amendment",
            )?,
        };

        Ok(Self { rules, aux })
    }

    /// Classify one action line. Never fails: a line no rule recognizes comes
    /// back as a plain `action` node.
    pub fn classify(&self, text: &str, ctx: &ActionContext<'_>) -> ActionAttributes {
        // 106 h4733 and others
        let line = text.replace(", the Passed", ", Passed");
        let input = RuleInput {
            line: &line,
            ctx,
            aux: &self.aux,
        };

        let mut attrs = ActionAttributes::default();
        for rule in &self.rules {
            let Some(caps) = rule.pattern.captures(&line) else {
                continue;
            };
            let Some(patch) = (rule.body)(&caps, &input) else {
                continue;
            };
            debug!(rule = rule.name, "action rule matched");
            attrs.apply(patch);
            if rule.terminal {
                break;
            }
        }
        attrs
    }
}
