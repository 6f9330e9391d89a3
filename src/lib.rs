//! Resolves informal legislator names against a roster and folds THOMAS bill
//! action logs into a procedural status.
//!
//! The pieces compose bottom-up: [`names`] and [`nicknames`] feed the
//! [`resolver`], [`classifier`] turns one action line into attributes using
//! the [`status`] transition table, and the [`assembler`] threads both over a
//! whole bill. [`processor`] runs the assembler across many bills at once.

pub mod assembler;
pub mod classifier;
pub mod config;
pub mod error;
pub mod names;
pub mod nicknames;
pub mod processor;
pub mod resolver;
pub mod roster;
pub mod status;
pub mod types;

pub use assembler::{BillAssembler, BillSource};
pub use classifier::{ActionAttributes, ActionClassifier, ActionContext, NodeKind};
pub use config::{Config, ConfigBuilder, OutputOrder};
pub use error::{Error, Result};
pub use processor::{BatchProcessor, BillOutcome};
pub use resolver::{NameQuery, PersonResolver};
pub use roster::{Roster, RosterStore};
pub use status::{StatusCode, VoteType};
pub use types::{Bill, BillType, Chamber, PersonId, RoleType};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::assembler::{BillAssembler, BillSource};
    pub use crate::classifier::{ActionClassifier, ActionContext};
    pub use crate::config::{Config, ConfigBuilder, OutputOrder};
    pub use crate::error::{Error, Result};
    pub use crate::names::NameFormat;
    pub use crate::processor::{BatchProcessor, BillOutcome};
    pub use crate::resolver::{NameQuery, PersonResolver};
    pub use crate::roster::{Roster, RosterStore};
    pub use crate::status::{StatusCode, VoteType};
    pub use crate::types::{Bill, BillType, RoleType};
    pub use futures::StreamExt;
}
