//! CROSSLINE: cross-provider sports market reconciliation
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod odds;
pub mod aliases;
pub mod matching;
pub mod merge;
pub mod pricing;
pub mod strategy;
pub mod platforms;
pub mod engine;
