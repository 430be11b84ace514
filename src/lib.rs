//! Macro Sentiment
//!
//! Batch pipeline that tags social-media posts with a macroeconomic topic,
//! scores their sentiment with an external classifier, and aggregates a daily
//! mean sentiment per topic.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingester;
pub mod pipeline;
pub mod sentiment;
pub mod storage;
pub mod topic;
pub mod types;

#[cfg(test)]
mod error_tests;
