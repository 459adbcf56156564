//! Session logic and port trait definitions for Parley.
//!
//! This crate defines the "ports" (generation service, credential store) that
//! the infrastructure layer implements, and the session manager that drives
//! them. It depends only on `parley-types` -- never on `parley-infra` or any
//! HTTP/keychain crate.

pub mod chat;
pub mod credential;
pub mod llm;
