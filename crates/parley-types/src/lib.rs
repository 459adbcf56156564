//! Shared domain types for Parley.
//!
//! This crate contains the conversation types (Turn, Transcript), session
//! configuration, role presets, generation request/response shapes, and the
//! error types shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod preset;
