//! Rule-based file sorter
//!
//! Reads an ordered table of (regex, destination) rules and moves the files
//! directly inside a target directory into the destination of each rule
//! whose pattern matches their name.

pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod matcher;
pub mod models;
pub mod orchestrator;
pub mod rules;

pub use config::{RuleErrorPolicy, Settings};
pub use error::{FileMoveError, Result, SortError};
pub use logging::{LogEvent, RunLog};
pub use models::Rule;
pub use orchestrator::{run_and_report, run_with_handler, Organizer, RunState, RunSummary};
