// src/lib.rs

//! LLM News collector library
//!
//! Periodically gathers AI repositories and research articles from several
//! public sources, merges and scores them, and serves the latest snapshot
//! over HTTP.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;
