//! # toolchat
//!
//! A tool-calling chat assistant for the terminal and the browser.
//!
//! ## Features
//!
//! - **OpenAI Chat Completions:** function-calling agent loop over any compatible endpoint
//! - **Built-in Tools:** current weather, Google web search, URL summaries
//! - **Conversation Memory:** per-session history replayed on every turn
//! - **Two Front Ends:** one-shot CLI prompt or a browser chat widget

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod tools;
pub mod web;

pub use config::Config;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
