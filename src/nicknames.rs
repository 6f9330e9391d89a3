use std::collections::HashSet;
use std::sync::OnceLock;

/// Informal given names and the formal names they stand for. Lookups are
/// symmetric, so the order inside a pair only documents intent.
const NICKNAME_PAIRS: &[(&str, &str)] = &[
    ("tom", "thomas"),
    ("dan", "daniel"),
    ("ken", "kenneth"),
    ("ted", "theodore"),
    ("ron", "ronald"),
    ("rob", "robert"),
    ("bob", "robert"),
    ("bill", "william"),
    ("tim", "timothy"),
    ("rick", "richard"),
    ("ric", "richard"),
    ("jim", "james"),
    ("russ", "russell"),
    ("mike", "michael"),
    ("les", "leslie"),
    ("doug", "douglas"),
    ("wm.", "william"),
    ("rod", "rodney"),
    ("geo.", "george"),
    ("chuck", "charles"),
    ("roy", "royden"),
    ("fred", "frederick"),
    ("vic", "victor"),
    ("newt", "newton"),
    ("joe", "joseph"),
    ("mel", "melanie"),
    ("dave", "david"),
    ("sid", "sidney"),
    ("stan", "stanley"),
    ("don", "donald"),
    ("marty", "martin"),
    ("gerry", "gerald"),
    ("jerry", "gerald"),
    ("jerry", "jerald"),
    ("al", "allen"),
    ("al", "allan"),
    ("vin", "vincent"),
    ("vince", "vincent"),
    ("pat", "patrick"),
    ("steve", "steven"),
    ("greg", "gregory"),
    ("frank", "francis"),
    ("dick", "richard"),
    ("charlie", "charles"),
    ("sam", "samuel"),
    ("herb", "herbert"),
    ("max", "maxwell"),
    ("cathy", "catherine"),
    ("ray", "raymond"),
    ("ed", "edwin"),
];

/// Get the nickname table, initializing it on first use
fn get_nickname_pairs() -> &'static HashSet<(&'static str, &'static str)> {
    static PAIRS: OnceLock<HashSet<(&'static str, &'static str)>> = OnceLock::new();
    PAIRS.get_or_init(|| NICKNAME_PAIRS.iter().copied().collect())
}

/// True when `a` and `b` are listed as an informal/formal pair, in either
/// order. Comparison is case-insensitive.
pub fn equivalent(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let pairs = get_nickname_pairs();
    pairs.contains(&(a.as_str(), b.as_str())) || pairs.contains(&(b.as_str(), a.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_lookup() {
        assert!(equivalent("bob", "robert"));
        assert!(equivalent("robert", "bob"));
        assert!(equivalent("Bill", "WILLIAM"));
        assert!(equivalent("wm.", "william"));
    }

    #[test]
    fn test_unlisted_pairs() {
        assert!(!equivalent("bob", "william"));
        assert!(!equivalent("robert", "robert"));
        // not transitive: both map to richard but are not paired with each other
        assert!(!equivalent("rick", "dick"));
    }
}
