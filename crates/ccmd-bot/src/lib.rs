//! # CCmd Bot
//!
//! Discord bot that registers configuration-defined slash commands and
//! answers them with embed replies.
//!
//! This is the main binary crate that orchestrates the application lifecycle
//! using the Poise framework for Discord interactions.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;

pub use bot::*;
pub use error::*;
