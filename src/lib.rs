//! Fandom Activity Notifier library.
//!
//! Polls Fandom wikis for new edits, log events, and discussion posts, and
//! forwards normalized notifications to chat-webhook transports.

pub mod checkpoint;
pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
pub mod fandom;
pub mod handlers;
pub mod poller;
pub mod transports;
