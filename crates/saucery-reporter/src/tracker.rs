//! Story lifecycle tracking
//!
//! The test framework calls a [`StoryReporter`] around every story and
//! scenario. Each worker passes its own [`StoryContext`], so concurrent
//! workers never see each other's story, session or pass/fail state.

use crate::session::SessionProvider;
use crate::submitter::{JobDetails, ResultSubmitter};
use crate::transport::JobStatusTransport;
use async_trait::async_trait;
use saucery_core::{is_bookkeeping_story, JobUpdate, SauceConfig, StoryContext};
use tracing::debug;

/// Lifecycle callbacks fired by the story runner
#[async_trait]
pub trait StoryReporter: Send + Sync {
    /// A story is about to run
    fn on_story_start(&self, ctx: &mut StoryContext, name: &str);

    /// A scenario of the current story is about to run
    fn on_scenario_start(&self, ctx: &mut StoryContext, title: &str);

    /// A step of the current scenario failed
    fn on_step_failed(&self, ctx: &mut StoryContext, step: &str, cause: &str);

    /// The current story finished; the context is cleared afterwards
    async fn on_story_end(&self, ctx: &mut StoryContext) -> Option<JobUpdate>;
}

/// Reports every finished story to the Sauce Labs job that ran it
pub struct SauceStoryReporter<P, T> {
    sessions: P,
    submitter: ResultSubmitter<T>,
}

impl<P, T> SauceStoryReporter<P, T>
where
    P: SessionProvider,
    T: JobStatusTransport,
{
    pub fn new(config: SauceConfig, sessions: P, transport: T) -> Self {
        Self {
            sessions,
            submitter: ResultSubmitter::new(config, transport),
        }
    }

    /// Replace the job naming/tagging/response hooks
    pub fn with_job_details(mut self, details: impl JobDetails + 'static) -> Self {
        self.submitter = self.submitter.with_job_details(details);
        self
    }

    pub fn submitter(&self) -> &ResultSubmitter<T> {
        &self.submitter
    }
}

#[async_trait]
impl<P, T> StoryReporter for SauceStoryReporter<P, T>
where
    P: SessionProvider,
    T: JobStatusTransport,
{
    fn on_story_start(&self, ctx: &mut StoryContext, name: &str) {
        debug!("Story '{}' started", name);
        ctx.start(name);
    }

    fn on_scenario_start(&self, ctx: &mut StoryContext, title: &str) {
        ctx.session_id = self.sessions.current_session();
        ctx.current_scenario = Some(title.to_string());
        debug!(
            "Scenario '{}' started on session {:?}",
            title,
            ctx.session_id.as_ref().map(|s| s.as_str())
        );
    }

    fn on_step_failed(&self, ctx: &mut StoryContext, step: &str, cause: &str) {
        debug!("Step '{}' failed: {}", step, cause);
        ctx.passed = false;
    }

    async fn on_story_end(&self, ctx: &mut StoryContext) -> Option<JobUpdate> {
        let finished = ctx.finish();

        let story = finished.story_name?;
        if is_bookkeeping_story(&story) {
            return None;
        }

        let Some(session) = finished.session_id else {
            // no executed scenarios, most likely all excluded
            debug!("No session captured for story '{}', skipping job update", story);
            return None;
        };

        self.submitter.submit(&story, &session, finished.passed).await
    }
}
