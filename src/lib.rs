//! Rpachat is a full-screen terminal chat client for RPA coding help,
//! streaming replies from OpenRouter's chat-completions API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns configuration, the session transcript, and the streaming
//!   relay that decodes SSE chunks from the remote endpoint.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`commands`] implements the slash-command surface used by the chat
//!   loop.
//! - [`api`] defines the chat-completion payloads exchanged with the
//!   endpoint.
//! - [`auth`] resolves the API credential from the environment, and
//!   [`error`] defines the error taxonomy surfaced in the transcript.
//!
//! The binary entrypoint (`src/main.rs`) loads configuration, resolves the
//! credential, and hands off to [`ui::chat_loop`] for the session.

pub mod api;
pub mod auth;
pub mod commands;
pub mod core;
pub mod error;
pub mod logging;
pub mod ui;
pub mod utils;
