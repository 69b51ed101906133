//! Story lifecycle reporting for Sauce Labs
//!
//! This crate listens to the lifecycle of behavioral test stories and, when a
//! story ends, reports its pass/fail status to the Sauce Labs job that ran it.
//!
//! # Example
//!
//! ```no_run
//! use saucery_core::{SauceConfig, StoryContext};
//! use saucery_reporter::{FixedSession, HttpTransport, SauceStoryReporter, StoryReporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SauceConfig::new("alice", "access-key").with_build_id("42");
//!     let transport = HttpTransport::from_config(&config)?;
//!     let reporter = SauceStoryReporter::new(config, FixedSession::new("4f2c91"), transport);
//!
//!     // One context per worker
//!     let mut ctx = StoryContext::new();
//!     reporter.on_story_start(&mut ctx, "Login");
//!     reporter.on_scenario_start(&mut ctx, "valid password");
//!     if let Some(update) = reporter.on_story_end(&mut ctx).await {
//!         println!("job updated: {:?}", update.job_urls);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`tracker`]: lifecycle callbacks and the Sauce Labs reporter
//! - [`submitter`]: payload construction, the PUT, and response scanning
//! - [`session`]: where the current browser session comes from
//! - [`transport`]: the HTTP seam
//! - [`replay`]: driving a reporter from a recorded lifecycle log

pub mod replay;
pub mod session;
pub mod submitter;
pub mod tracker;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use replay::{parse_events, replay, LifecycleEvent};
pub use session::{FixedSession, SessionProvider, SharedSession};
pub use submitter::{extract_job_urls, job_url_message, DefaultJobDetails, JobDetails, ResultSubmitter};
pub use tracker::{SauceStoryReporter, StoryReporter};
pub use transport::{HttpTransport, JobStatusTransport, TransportResponse};
