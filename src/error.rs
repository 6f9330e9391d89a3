use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Zero or more than one person matched a name. Carries every roster row
    /// that passed the last-name and role filters so the roster or the
    /// nickname table can be corrected by hand.
    #[error(
        "{matches} matches for person {name} on {as_of} [{filters}]. Choices were:{}",
        format_candidates(.candidates)
    )]
    AmbiguousMatch {
        name: String,
        as_of: NaiveDate,
        filters: String,
        matches: usize,
        candidates: Vec<String>,
    },

    #[error("Could not parse date: {0}")]
    MalformedDate(String),

    #[error("Invalid name: {0}")]
    MalformedName(String),

    #[error("Skipping bill {0}")]
    ReservedBill(String),
}

fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        return " (none)".to_string();
    }
    candidates.iter().map(|c| format!("\n{}", c)).collect()
}
