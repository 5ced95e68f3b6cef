//! Data types shared across the sorting pipeline

pub mod rule;

pub use rule::Rule;
