//! Rules table loading
//!
//! The rules table is a CSV file with a header row and at least the columns
//! `regexp` and `dist`. Each complete row becomes one `Rule`, in row order.
//! Patterns are not compiled here; a bad pattern only fails when its rule runs.

pub mod loader;

pub use loader::{load_rule_table, load_rules, load_rules_from_reader, RuleTable};
