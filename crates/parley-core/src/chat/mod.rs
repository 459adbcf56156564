//! Conversation session management.
//!
//! `SessionManager` owns the transcript and configuration for one
//! conversation and runs submissions through a `GenerationService`.

pub mod session;
