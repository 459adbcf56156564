//! Text-generation service abstractions.

pub mod box_provider;
pub mod provider;
