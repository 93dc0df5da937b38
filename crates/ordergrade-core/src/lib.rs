//! ordergrade-core: grading engine for ordering questions.
//!
//! A learner arranges a fixed set of items; this crate scores each placed
//! item against the correct order under one of several grading policies,
//! classifies the scores, and batches the work over whole grading sets.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod policy;
pub mod relations;
pub mod report;
pub mod results;
pub mod sequence;
pub mod session;
pub mod statistics;
