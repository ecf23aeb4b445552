//! Workflow pipelines for candidate evaluation and interview automation.

pub mod interview;
pub mod recruiting;
pub mod report;
