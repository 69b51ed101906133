//! Lifecycle log replay
//!
//! Runners that cannot host a reporter in-process can write their lifecycle
//! as JSON lines and have it reported afterwards:
//!
//! ```text
//! {"event":"story_start","name":"Login"}
//! {"event":"scenario_start","title":"valid password","session_id":"4f2c91"}
//! {"event":"step_failed","step":"Then I see the dashboard","cause":"timeout"}
//! {"event":"story_end"}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::session::SharedSession;
use crate::tracker::StoryReporter;
use saucery_core::{JobUpdate, Result, SauceError, SessionId, StoryContext};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One recorded lifecycle callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    StoryStart {
        name: String,
    },
    ScenarioStart {
        title: String,
        /// Session the scenario ran on; absent keeps the previous one
        #[serde(default)]
        session_id: Option<SessionId>,
    },
    StepFailed {
        step: String,
        #[serde(default)]
        cause: Option<String>,
    },
    StoryEnd,
}

/// Parse a JSON-lines lifecycle log
pub fn parse_events(input: &str) -> Result<Vec<LifecycleEvent>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| SauceError::Replay {
                line: idx + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Drive `reporter` through `events` with a single worker context
///
/// `sessions` must be the provider the reporter was built with; scenario
/// events carrying a session id switch it before the scenario starts.
pub async fn replay<R>(
    reporter: &R,
    sessions: &SharedSession,
    events: &[LifecycleEvent],
) -> Vec<JobUpdate>
where
    R: StoryReporter + ?Sized,
{
    let mut ctx = StoryContext::new();
    let mut updates = Vec::new();

    for event in events {
        match event {
            LifecycleEvent::StoryStart { name } => reporter.on_story_start(&mut ctx, name),
            LifecycleEvent::ScenarioStart { title, session_id } => {
                if let Some(id) = session_id {
                    sessions.set(id.clone());
                }
                reporter.on_scenario_start(&mut ctx, title);
            }
            LifecycleEvent::StepFailed { step, cause } => {
                reporter.on_step_failed(&mut ctx, step, cause.as_deref().unwrap_or(""))
            }
            LifecycleEvent::StoryEnd => {
                if let Some(update) = reporter.on_story_end(&mut ctx).await {
                    updates.push(update);
                }
            }
        }
    }

    info!(
        "Replayed {} lifecycle events, {} job updates",
        events.len(),
        updates.len()
    );
    updates
}
