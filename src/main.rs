use billstatus::prelude::*;
use billstatus::roster;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::info;

/// Legislator name resolution and bill status tracking
#[derive(Parser, Debug)]
#[command(name = "billstatus")]
#[command(about = "Resolve legislator names and fold bill action logs into a status")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a legislator name to a roster id
    Resolve {
        /// Name as printed, e.g. "C.W. Bill Young" or "Young, C.W. Bill" with --last-first
        name: String,

        /// Date the name must hold a role on (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Name is given as "Last, First"
        #[arg(long)]
        last_first: bool,

        /// Role type filter: rep or sen
        #[arg(long, value_parser = ["rep", "sen"])]
        role: Option<String>,

        /// Two-letter state filter
        #[arg(long)]
        state: Option<String>,

        /// District filter
        #[arg(long)]
        district: Option<u32>,

        /// Roster file (default: BILLSTATUS_ROSTER env var)
        #[arg(long)]
        roster: Option<PathBuf>,
    },

    /// Classify a single action line and print its attributes as JSON
    Classify {
        /// Action text
        text: String,

        /// Bill type code: h, hr, hj, hc, s, sr, sj, sc
        #[arg(long = "bill-type")]
        bill_type: String,

        /// Status of the bill before this action
        #[arg(long, default_value = "INTRODUCED")]
        previous: String,

        /// Bill title (decides constitutional amendments)
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Assemble bill source files and print one JSON bill per line
    Bills {
        /// Bill source files
        #[arg(num_args = 0..)]
        paths: Vec<PathBuf>,

        /// Directory searched for *.json bill sources
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Roster file (default: BILLSTATUS_ROSTER env var)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Number of parallel jobs (default: 4, or BILLSTATUS_JOBS env var)
        #[arg(long)]
        jobs: Option<usize>,

        /// Output order: input or completion
        #[arg(long, default_value = "input", value_parser = ["input", "completion"])]
        order: String,

        /// Read file paths from stdin (one per line)
        /// Useful for stdio pipelines: find ... | billstatus bills --stdin
        #[arg(long)]
        stdin: bool,
    },
}

fn print_available_commands() {
    println!("Available commands:");
    println!("  resolve   Resolve a legislator name to a roster id");
    println!("  classify  Classify a single action line");
    println!("  bills     Assemble bill source files");
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run_resolve_command(cmd: Command) -> anyhow::Result<()> {
    let Command::Resolve {
        name,
        date,
        last_first,
        role,
        state,
        district,
        roster: roster_path,
    } = cmd
    else {
        unreachable!()
    };

    let as_of = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}', expected YYYY-MM-DD", date))?;

    let config = ConfigBuilder::from_env(roster_path)?.build()?;
    let roster = Roster::load(&config.roster_path)?;

    let mut query = NameQuery::new(name, as_of);
    if last_first {
        query = query.format(NameFormat::LastFirst);
    }
    if let Some(role) = role {
        query = query.role_type(role.parse()?);
    }
    if let Some(state) = state {
        query = query.state(state);
    }
    if let Some(district) = district {
        query = query.district(district);
    }

    let id = PersonResolver::new(&roster).resolve(&query)?;
    println!("{}", id);
    Ok(())
}

fn run_classify_command(cmd: Command) -> anyhow::Result<()> {
    let Command::Classify {
        text,
        bill_type,
        previous,
        title,
    } = cmd
    else {
        unreachable!()
    };

    let ctx = ActionContext {
        bill_type: bill_type.parse()?,
        previous_status: previous.parse()?,
        title: &title,
    };
    let attributes = ActionClassifier::new()?.classify(&text, &ctx);
    println!("{}", serde_json::to_string(&attributes)?);
    Ok(())
}

async fn run_bills_command(cmd: Command) -> anyhow::Result<()> {
    let Command::Bills {
        mut paths,
        dir,
        roster: roster_path,
        jobs,
        order,
        stdin,
    } = cmd
    else {
        unreachable!()
    };

    if stdin {
        let stdin = io::stdin();
        paths.extend(
            stdin
                .lock()
                .lines()
                .filter_map(|line| line.ok())
                .filter(|line| !line.trim().is_empty())
                .map(PathBuf::from),
        );
    }

    if paths.is_empty() && dir.is_none() {
        anyhow::bail!("No bill sources given: pass paths, --dir or --stdin");
    }

    let mut builder = ConfigBuilder::from_env(roster_path)?
        .paths(paths)
        .order(OutputOrder::from(order.as_str()));
    if let Some(dir) = dir {
        builder = builder.input_dir(dir);
    }
    if let Some(jobs) = jobs {
        builder = builder.jobs(jobs);
    }
    let config = builder.build()?;

    let loaded = Roster::load(&config.roster_path)?;
    info!(people = loaded.len(), roster = %config.roster_path.display(), "roster loaded");
    if roster::install(loaded).is_err() {
        anyhow::bail!("A roster is already installed");
    }

    let processor = BatchProcessor::from_global(config)?;
    let mut stream = processor.process();

    let mut assembled = 0usize;
    let mut failed = 0usize;

    // Write JSON to stdout (one per line)
    while let Some(result) = stream.next().await {
        let outcome = result?;
        match outcome.result {
            Ok(bill) => {
                assembled += 1;
                println!("{}", serde_json::to_string(&bill)?);
            }
            Err(_) => failed += 1,
        }
    }

    info!(assembled, failed, "done");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    match args.command {
        Some(cmd @ Command::Resolve { .. }) => run_resolve_command(cmd),
        Some(cmd @ Command::Classify { .. }) => run_classify_command(cmd),
        Some(cmd @ Command::Bills { .. }) => run_bills_command(cmd).await,
        None => {
            print_available_commands();
            Ok(())
        }
    }
}
