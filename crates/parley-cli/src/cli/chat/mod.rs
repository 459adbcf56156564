//! Interactive CLI chat for Parley.
//!
//! Implements the chat loop: welcome banner, slash commands, streaming or
//! spinner-backed replies, and input that stays live while a request is in
//! flight. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
