//! # CCmd Commands
//!
//! Custom slash command synchronization and reply dispatch using the Poise
//! framework.
//!
//! The [`reconciler`] computes which configured commands must be registered,
//! skipped or deleted; the [`sync`] module applies that plan against Discord
//! through injected [`remote::CommandService`] and [`store::StateStore`]
//! implementations and hands back the [`routes::CommandRoutes`] that the
//! framework's event handler answers interactions with.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod framework;
pub mod reconciler;
pub mod remote;
pub mod reply;
pub mod routes;
pub mod store;
pub mod sync;

pub use error::*;
pub use framework::*;
pub use reconciler::*;
pub use remote::*;
pub use routes::*;
pub use store::*;
pub use sync::*;
