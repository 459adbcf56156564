//! Infrastructure layer for Parley.
//!
//! Contains implementations of the port traits defined in `parley-core`:
//! the Gemini REST client, OS keychain and environment credential stores,
//! and the config file loader.

pub mod config;
pub mod credential;
pub mod gemini;
pub mod keychain;
