use crate::error::{Error, Result};
use std::path::PathBuf;

/// Environment variable naming the roster file
pub const ROSTER_ENV: &str = "BILLSTATUS_ROSTER";
/// Environment variable giving the number of parallel jobs
pub const JOBS_ENV: &str = "BILLSTATUS_JOBS";

const DEFAULT_JOBS: usize = 4;

/// Order in which batch results are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputOrder {
    /// Same order as the input files
    #[default]
    Input,
    /// As soon as each bill is done
    Completion,
}

impl From<&str> for OutputOrder {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "completion" => OutputOrder::Completion,
            _ => OutputOrder::Input,
        }
    }
}

/// Configuration for batch bill assembly
#[derive(Debug, Clone)]
pub struct Config {
    pub roster_path: PathBuf,
    pub input_dir: Option<PathBuf>,
    pub paths: Vec<PathBuf>,
    pub jobs: usize,
    pub order: OutputOrder,
}

impl Config {
    pub fn new(roster_path: impl Into<PathBuf>) -> Self {
        Self {
            roster_path: roster_path.into(),
            input_dir: None,
            paths: Vec::new(),
            jobs: DEFAULT_JOBS,
            order: OutputOrder::Input,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.roster_path.is_file() {
            return Err(Error::Config(format!(
                "Roster file does not exist: {}",
                self.roster_path.display()
            )));
        }

        if let Some(dir) = &self.input_dir {
            if !dir.is_dir() {
                return Err(Error::Config(format!(
                    "Input directory is not a directory: {}",
                    dir.display()
                )));
            }
        }

        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".to_string()));
        }

        Ok(())
    }
}

/// Builder for creating configurations
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new(roster_path: impl Into<PathBuf>) -> Self {
        Self {
            config: Config::new(roster_path),
        }
    }

    /// Start from the environment: roster path from the flag or
    /// `BILLSTATUS_ROSTER`, jobs from `BILLSTATUS_JOBS` when set.
    pub fn from_env(roster_flag: Option<PathBuf>) -> Result<Self> {
        let roster_path = match roster_flag {
            Some(path) => path,
            None => std::env::var(ROSTER_ENV).map(PathBuf::from).map_err(|_| {
                Error::Config(format!("No roster given: pass --roster or set {}", ROSTER_ENV))
            })?,
        };
        let mut builder = Self::new(roster_path);
        if let Some(jobs) = std::env::var(JOBS_ENV).ok().and_then(|s| s.parse().ok()) {
            builder = builder.jobs(jobs);
        }
        Ok(builder)
    }

    /// Directory searched for `*.json` bill sources
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = Some(dir.into());
        self
    }

    /// Add an explicit bill source file
    pub fn add_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.push(path.into());
        self
    }

    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.paths = paths;
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = jobs;
        self
    }

    pub fn order(mut self, order: OutputOrder) -> Self {
        self.config.order = order;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_build_validates_paths() {
        let dir = tempfile::tempdir().unwrap();
        let roster = dir.path().join("roster.yaml");
        fs::write(&roster, "people: []\n").unwrap();

        let config = ConfigBuilder::new(&roster)
            .input_dir(dir.path())
            .jobs(2)
            .build()
            .unwrap();
        assert_eq!(config.jobs, 2);
        assert_eq!(config.order, OutputOrder::Input);

        let missing = ConfigBuilder::new(dir.path().join("nope.yaml")).build();
        assert!(matches!(missing, Err(Error::Config(_))));

        let not_dir = ConfigBuilder::new(&roster).input_dir(&roster).build();
        assert!(matches!(not_dir, Err(Error::Config(_))));

        let no_jobs = ConfigBuilder::new(&roster).jobs(0).build();
        assert!(matches!(no_jobs, Err(Error::Config(_))));
    }

    #[test]
    fn test_roster_flag_sets_roster_path() {
        let dir = tempfile::tempdir().unwrap();
        let roster = dir.path().join("roster.yaml");
        fs::write(&roster, "people: []\n").unwrap();

        let config = ConfigBuilder::from_env(Some(roster.clone()))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.roster_path, roster);
    }

    #[test]
    fn test_output_order_from_str() {
        assert_eq!(OutputOrder::from("completion"), OutputOrder::Completion);
        assert_eq!(OutputOrder::from("INPUT"), OutputOrder::Input);
        assert_eq!(OutputOrder::from("anything"), OutputOrder::Input);
    }
}
