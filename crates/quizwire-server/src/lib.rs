//! # Quizwire server
//!
//! The runnable surface of Quizwire: a WebSocket listener speaking the
//! quiz protocol, a rooms directory shared by every connection, and an
//! HTTP health probe.

mod config;
mod error;
mod handler;
pub mod health;
mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::QuizServer;
