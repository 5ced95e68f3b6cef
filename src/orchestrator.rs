//! Run orchestration
//!
//! Loads the rules table, then for each rule in order matches files in the
//! target directory and moves them to the rule's destination. Matcher
//! failures end the run unless the settings ask to skip the failing rule.

use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{RuleErrorPolicy, Settings};
use crate::error::{Result, SortError};
use crate::execution::move_batch;
use crate::logging::{LogEvent, RunLog};
use crate::matcher::find_matching;
use crate::models::Rule;
use crate::rules::load_rule_table;

/// Where the organizer is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    /// Processing the rule with this 1-based index
    ProcessingRule(usize),
    Done,
    Failed,
}

/// What happened for one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// 1-based position in the rules table
    pub index: usize,
    pub pattern: String,
    pub destination: PathBuf,
    /// Files the pattern matched
    pub matched: usize,
    /// Base names of files moved, in order
    pub moved: Vec<String>,
    /// Set when the rule was skipped after a matcher failure
    pub error: Option<String>,
}

impl RuleOutcome {
    fn new(index: usize, rule: &Rule) -> Self {
        Self {
            index,
            pattern: rule.pattern.clone(),
            destination: rule.destination.clone(),
            matched: 0,
            moved: Vec::new(),
            error: None,
        }
    }

    pub fn failed(&self) -> usize {
        self.matched - self.moved.len()
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rules_loaded: usize,
    pub outcomes: Vec<RuleOutcome>,
}

impl RunSummary {
    pub fn total_moved(&self) -> usize {
        self.outcomes.iter().map(|o| o.moved.len()).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.outcomes.iter().map(RuleOutcome::failed).sum()
    }

    /// Rules skipped after a matcher failure
    pub fn rule_errors(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }
}

/// Drives one sorting run
pub struct Organizer {
    settings: Settings,
    state: RunState,
}

impl Organizer {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run every rule once. Returns the first fatal error.
    pub fn run(&mut self, log: &mut RunLog) -> Result<RunSummary> {
        let result = self.run_inner(log);
        self.state = match result {
            Ok(_) => RunState::Done,
            Err(_) => RunState::Failed,
        };
        result
    }

    fn run_inner(&mut self, log: &mut RunLog) -> Result<RunSummary> {
        self.state = RunState::Loading;
        let table = load_rule_table(&self.settings.rules_file)?;
        log.record(LogEvent::RuleFileLoaded {
            path: self.settings.rules_file.clone(),
            rule_count: table.len(),
            skipped_rows: table.skipped_rows,
        });

        let mut summary = RunSummary {
            rules_loaded: table.len(),
            outcomes: Vec::with_capacity(table.len()),
        };

        for (i, rule) in table.rules.iter().enumerate() {
            let index = i + 1;
            self.state = RunState::ProcessingRule(index);
            let outcome = self.process_rule(index, rule, log)?;
            summary.outcomes.push(outcome);
        }

        tracing::debug!(
            rules = summary.rules_loaded,
            moved = summary.total_moved(),
            failed = summary.total_failed(),
            "Run finished"
        );

        Ok(summary)
    }

    fn process_rule(&self, index: usize, rule: &Rule, log: &mut RunLog) -> Result<RuleOutcome> {
        let mut outcome = RuleOutcome::new(index, rule);

        log.record(LogEvent::RuleStart {
            index,
            pattern: rule.pattern.clone(),
            destination: rule.destination.clone(),
        });

        let files = match find_matching(&self.settings.target_dir, &rule.pattern) {
            Ok(files) => files,
            Err(err) => {
                log.record(LogEvent::RuleError {
                    index,
                    error: err.to_string(),
                });
                match self.settings.on_rule_error {
                    RuleErrorPolicy::Abort => return Err(err),
                    RuleErrorPolicy::Skip => {
                        outcome.error = Some(err.to_string());
                        return Ok(outcome);
                    }
                }
            }
        };

        outcome.matched = files.len();
        log.record(LogEvent::FilesFound {
            index,
            count: files.len(),
        });

        if files.is_empty() {
            log.record(LogEvent::NoMatch { index });
            return Ok(outcome);
        }

        let report = move_batch(&files, &rule.destination, log);
        log.record(LogEvent::RuleSummary {
            index,
            moved: report.moved_count(),
        });
        outcome.moved = report.moved;

        Ok(outcome)
    }
}

/// Run with a top-level handler: any fatal error is logged once and reported
/// on stderr with a pointer to the log. Returns `None` when the run failed.
pub fn run_with_handler(settings: Settings, log: &mut RunLog) -> Option<RunSummary> {
    let mut organizer = Organizer::new(settings);

    match organizer.run(log) {
        Ok(summary) => Some(summary),
        Err(err) => {
            report_fatal(&err, log);
            None
        }
    }
}

/// [`run_with_handler`] mapped to a process exit code
pub fn run_and_report(settings: Settings, log: &mut RunLog) -> ExitCode {
    match run_with_handler(settings, log) {
        Some(summary) => {
            println!(
                "Processed {} rules: {} files moved, {} failed",
                summary.rules_loaded,
                summary.total_moved(),
                summary.total_failed()
            );
            ExitCode::SUCCESS
        }
        None => ExitCode::FAILURE,
    }
}

fn report_fatal(err: &SortError, log: &mut RunLog) {
    log.record(LogEvent::FatalError {
        error: err.to_string(),
    });
    eprintln!("{}", fatal_message(err, log));
}

/// Operator-facing message, pointing at the log file only if one was written
fn fatal_message(err: &SortError, log: &RunLog) -> String {
    match log.path() {
        Some(path) => format!(
            "An error occurred. Check the log file {}: {}",
            path.display(),
            err
        ),
        None => format!(
            "An error occurred. The log was written to the console only: {}",
            err
        ),
    }
}
