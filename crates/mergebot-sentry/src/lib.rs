//! Sentry module.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;

pub use client::with_sentry_configuration;
pub use sentry;
