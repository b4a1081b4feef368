//! repo-onboarder: repository context extraction and LLM documentation
//! generation (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod cache;
pub mod collect;
pub mod config;
pub mod constants;
pub mod context;
pub mod debug;
pub mod env;
pub mod history;
pub mod mcp;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod prompts;
pub mod providers;
pub mod tool;
