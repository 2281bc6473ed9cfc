//! Local static-content web server for previewing a website project
//! during development.
//!
//! The binary in `main.rs` wires these modules together; the library
//! surface exists so integration tests can drive the server lifecycle
//! in-process.

pub mod config;
pub mod diagnostics;
pub mod handler;
pub mod logger;
pub mod network;
pub mod qr;
pub mod resolve;
pub mod server;
pub mod shutdown;

pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVER_SIGNATURE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
