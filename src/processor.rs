use crate::assembler::{BillAssembler, BillSource};
use crate::classifier::ActionClassifier;
use crate::config::{Config, OutputOrder};
use crate::error::{Error, Result};
use crate::roster::{self, RosterStore};
use crate::types::Bill;
use async_stream::stream;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use jwalk::WalkDir;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Result of assembling one bill source file
#[derive(Debug)]
pub struct BillOutcome {
    pub path: PathBuf,
    pub result: Result<Bill>,
}

/// Assembles bill source files in parallel against a shared roster
pub struct BatchProcessor {
    config: Config,
    roster: &'static dyn RosterStore,
    classifier: Arc<ActionClassifier>,
}

impl BatchProcessor {
    pub fn new(config: Config, roster: &'static dyn RosterStore) -> Result<Self> {
        Ok(Self {
            config,
            roster,
            classifier: Arc::new(ActionClassifier::new()?),
        })
    }

    /// Use the roster installed with [`roster::install`]
    pub fn from_global(config: Config) -> Result<Self> {
        let roster = roster::global()
            .ok_or_else(|| Error::Config("No roster has been installed".to_string()))?;
        Self::new(config, roster)
    }

    /// Discover bill sources and assemble them, `jobs` at a time.
    ///
    /// Yields an error only when discovery itself fails; a bill that cannot
    /// be assembled comes back as a [`BillOutcome`] holding its error and the
    /// rest of the batch carries on.
    pub fn process(&self) -> impl Stream<Item = Result<BillOutcome>> {
        let config = self.config.clone();
        let roster = self.roster;
        let classifier = self.classifier.clone();
        Box::pin(stream! {
            // jwalk is synchronous
            let discovery_config = config.clone();
            let files = match tokio::task::spawn_blocking(move || {
                Self::discover_files(&discovery_config)
            }).await {
                Ok(Ok(files)) => files,
                Ok(Err(e)) => {
                    yield Err(e);
                    return;
                }
                Err(e) => {
                    yield Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("Task join error: {}", e)
                    )));
                    return;
                }
            };

            info!(files = files.len(), jobs = config.jobs, "assembling bills");

            let mut outcomes = Self::assemble_files(roster, classifier, files, config.jobs, config.order);
            while let Some(outcome) = outcomes.next().await {
                yield Ok(outcome);
            }
        })
    }

    /// Explicit paths first, then every `*.json` file under the input
    /// directory in path order
    fn discover_files(config: &Config) -> Result<Vec<PathBuf>> {
        let mut files = config.paths.clone();

        if let Some(dir) = &config.input_dir {
            for entry_result in WalkDir::new(dir).sort(true) {
                let entry = match entry_result {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable entry");
                        continue;
                    }
                };

                if !entry.file_type().is_file() {
                    continue;
                }

                let path = entry.path();
                if path.extension().map(|ext| ext == "json").unwrap_or(false) {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    fn assemble_files(
        roster: &'static dyn RosterStore,
        classifier: Arc<ActionClassifier>,
        files: Vec<PathBuf>,
        jobs: usize,
        order: OutputOrder,
    ) -> BoxStream<'static, BillOutcome> {
        let tasks = stream::iter(files).map(move |path| {
            let classifier = classifier.clone();
            async move {
                let task_path = path.clone();
                let joined = tokio::task::spawn_blocking(move || {
                    Self::assemble_file(roster, &classifier, &task_path)
                })
                .await;

                let result = match joined {
                    Ok(result) => result,
                    Err(e) => Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("Task join error: {}", e),
                    ))),
                };

                match &result {
                    Ok(_) => {}
                    Err(Error::ReservedBill(title)) => {
                        warn!(path = %path.display(), %title, "skipped reserved bill");
                    }
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "failed to assemble bill");
                    }
                }

                BillOutcome { path, result }
            }
        });

        match order {
            OutputOrder::Input => tasks.buffered(jobs.max(1)).boxed(),
            OutputOrder::Completion => tasks.buffer_unordered(jobs.max(1)).boxed(),
        }
    }

    fn assemble_file(
        roster: &dyn RosterStore,
        classifier: &ActionClassifier,
        path: &Path,
    ) -> Result<Bill> {
        let contents = std::fs::read_to_string(path)?;
        let source: BillSource = serde_json::from_str(&contents)?;
        BillAssembler::new(roster, classifier)?.assemble(&source)
    }
}
