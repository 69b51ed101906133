//! # saucery-core
//!
//! Core types for reporting behavioral test stories to Sauce Labs.
//!
//! ## Model
//!
//! - A worker owns one [`StoryContext`] and hands it to every lifecycle callback
//! - A finished story becomes one [`JobStatus`] payload, PUT to the job endpoint
//! - Credentials and build metadata live in [`SauceConfig`], built once per run
//! - Reporting is best effort: failures go through [`fail_open`] and are logged

pub mod config;
mod error;
pub mod fail_open;
mod types;

pub use config::SauceConfig;
pub use error::{error_chain, Result, SauceError};
pub use fail_open::fail_open;
pub use types::*;
