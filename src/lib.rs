//! Playground Saver - continue OpenAI Playground conversations outside the Playground
//!
//! Takes text and images over HTTP or the command line, forwards them to the
//! Responses API chained onto an earlier response or conversation, and relays
//! the reply back as plain text.

pub mod ai;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod payload;
pub mod server;
pub mod turn;

pub use error::{Error, Result};
