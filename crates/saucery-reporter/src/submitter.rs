//! Job status submission
//!
//! Builds the status payload for a finished story, PUTs it to the Sauce Labs
//! job, and scans the response for the job's video URL.

use crate::transport::JobStatusTransport;
use regex::Regex;
use saucery_core::{fail_open, JobStatus, JobUpdate, Result, SauceConfig, SessionId};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Matches the video link in a job response, e.g.
/// `"video_url": "http://saucelabs.com/jobs/3bd3.../video.flv",`
static VIDEO_URL_PATTERN: OnceLock<Regex> = OnceLock::new();

const VIDEO_SUFFIX: &str = "/video.flv";

fn video_url_pattern() -> &'static Regex {
    VIDEO_URL_PATTERN.get_or_init(|| Regex::new(r"http.*\.flv").unwrap())
}

/// Job URLs found in one response line, with the video suffix removed
pub fn extract_job_urls(line: &str) -> Vec<String> {
    video_url_pattern()
        .find_iter(line)
        .map(|m| m.as_str().replace(VIDEO_SUFFIX, ""))
        .collect()
}

/// The console line announcing a job URL
pub fn job_url_message(story: &str, passed: bool, url: &str) -> String {
    format!(
        "Saucelabs Job URL for {} '{}' : {}",
        if passed { "passing" } else { "failing" },
        story,
        url
    )
}

/// Per-job customization points
///
/// Override to rename jobs, tag them, or read more out of the response.
pub trait JobDetails: Send + Sync {
    /// Job name shown on Sauce Labs (default: the story name)
    fn job_name(&self, story: &str) -> String {
        story.to_string()
    }

    /// Tags attached to the job (default: the configured tags)
    fn job_tags(&self, _story: &str, configured: &[String]) -> Vec<String> {
        configured.to_vec()
    }

    /// Job URLs to announce for one line of a successful response
    fn on_response_line(&self, line: &str) -> Vec<String> {
        extract_job_urls(line)
    }
}

/// Names jobs after their story and applies the configured tags
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultJobDetails;

impl JobDetails for DefaultJobDetails {}

/// Reports finished stories to their Sauce Labs job
pub struct ResultSubmitter<T> {
    config: SauceConfig,
    transport: T,
    details: Box<dyn JobDetails>,
}

impl<T: JobStatusTransport> ResultSubmitter<T> {
    pub fn new(config: SauceConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            details: Box::new(DefaultJobDetails),
        }
    }

    /// Replace the job naming/tagging/response hooks
    pub fn with_job_details(mut self, details: impl JobDetails + 'static) -> Self {
        self.details = Box::new(details);
        self
    }

    pub fn config(&self) -> &SauceConfig {
        &self.config
    }

    /// Payload for a finished story
    pub fn build_payload(&self, story: &str, passed: bool) -> JobStatus {
        JobStatus::new(self.details.job_name(story), passed)
            .with_tags(self.details.job_tags(story, &self.config.tags))
            .with_build(self.config.build_id.clone())
    }

    /// Report a story, logging and swallowing any failure
    pub async fn submit(&self, story: &str, session: &SessionId, passed: bool) -> Option<JobUpdate> {
        fail_open("Updating Sauce Labs job info", || {
            self.try_submit(story, session, passed)
        })
        .await
    }

    /// Report a story, returning transport and encoding errors to the caller
    pub async fn try_submit(
        &self,
        story: &str,
        session: &SessionId,
        passed: bool,
    ) -> Result<JobUpdate> {
        let body = self.build_payload(story, passed).to_json()?;
        let url = self.config.job_url(session);

        info!(
            "Updating Sauce Labs job {} for story '{}' (passed: {})",
            session, story, passed
        );

        let response = self
            .transport
            .put_job_status(&url, &self.config.credentials(), body)
            .await?;

        let mut update = JobUpdate {
            story: story.to_string(),
            session_id: session.clone(),
            passed,
            status: response.status,
            job_urls: Vec::new(),
        };

        if !update.is_accepted() {
            debug!(
                "Sauce Labs answered {} for job {}, not scanning response",
                response.status, session
            );
            return Ok(update);
        }

        for line in response.body.lines() {
            for job_url in self.details.on_response_line(line) {
                println!("{}", job_url_message(story, passed, &job_url));
                update.job_urls.push(job_url);
            }
        }

        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingTransport, RecordingTransport, VIDEO_RESPONSE};
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn config() -> SauceConfig {
        SauceConfig::new("alice", "key").with_base_url("http://sauce.test")
    }

    #[test]
    fn test_extract_job_url_strips_video_suffix() {
        let urls = extract_job_urls(r#"  "video_url": "http://x.com/jobs/abc/video.flv","#);
        assert_eq!(urls, vec!["http://x.com/jobs/abc".to_string()]);
    }

    #[test]
    fn test_extract_job_url_no_match() {
        assert!(extract_job_urls(r#""log_url": "http://x.com/jobs/abc/selenium-server.log","#).is_empty());
        assert!(extract_job_urls("").is_empty());
    }

    #[test]
    fn test_job_url_message() {
        assert_eq!(
            job_url_message("Login", true, "http://x.com/jobs/abc"),
            "Saucelabs Job URL for passing 'Login' : http://x.com/jobs/abc"
        );
        assert!(job_url_message("Login", false, "u").contains("failing 'Login'"));
    }

    #[test]
    fn test_payload_for_passing_story() {
        let submitter = ResultSubmitter::new(config(), RecordingTransport::ok(""));
        let json = submitter.build_payload("Login", true).to_json().unwrap();

        assert!(json.contains(r#""passed":"true""#));
        assert!(json.contains(r#""name":" Login""#));
        assert!(!json.contains("build"));
    }

    #[test]
    fn test_payload_includes_configured_build_and_tags() {
        let config = config()
            .with_build_id("42")
            .with_tags(vec!["smoke".to_string()]);
        let submitter = ResultSubmitter::new(config, RecordingTransport::ok(""));
        let json = submitter.build_payload("Login", false).to_json().unwrap();

        assert!(json.contains(r#""build":"42","#));
        assert!(json.contains(r#""tags":["smoke"]"#));
        assert!(json.contains(r#""passed":"false""#));
    }

    #[test]
    fn test_custom_job_details() {
        struct Prefixed;

        impl JobDetails for Prefixed {
            fn job_name(&self, story: &str) -> String {
                format!("checkout/{}", story)
            }

            fn job_tags(&self, story: &str, _configured: &[String]) -> Vec<String> {
                vec![story.to_lowercase()]
            }
        }

        let submitter =
            ResultSubmitter::new(config(), RecordingTransport::ok("")).with_job_details(Prefixed);
        let payload = submitter.build_payload("Login", true);

        assert_eq!(payload.name, "checkout/Login");
        assert_eq!(payload.tags, vec!["login".to_string()]);
    }

    #[test]
    fn test_renamed_job_keeps_configured_tags() {
        struct Renamed;

        impl JobDetails for Renamed {
            fn job_name(&self, story: &str) -> String {
                format!("nightly: {}", story)
            }
        }

        let config = config().with_tags(vec!["nightly".to_string()]);
        let submitter =
            ResultSubmitter::new(config, RecordingTransport::ok("")).with_job_details(Renamed);
        let payload = submitter.build_payload("Login", true);

        assert_eq!(payload.name, "nightly: Login");
        assert_eq!(payload.tags, vec!["nightly".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_puts_to_job_endpoint() {
        let transport = Arc::new(RecordingTransport::ok(VIDEO_RESPONSE));
        let submitter = ResultSubmitter::new(config(), transport.clone());

        let update = submitter
            .submit("Login", &SessionId::from("abc"), true)
            .await
            .unwrap();

        assert!(update.is_accepted());
        assert_eq!(update.job_urls, vec!["http://x.com/jobs/abc".to_string()]);
        assert!(update.job_urls.iter().all(|u| !u.contains("/video.flv")));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://sauce.test/rest/v1/alice/jobs/abc");
        assert_eq!(requests[0].credentials.user, "alice");
        assert_eq!(requests[0].credentials.access_key, "key");
        assert!(requests[0].payload.contains(r#""name":" Login""#));
    }

    #[tokio::test]
    async fn test_non_200_is_not_scanned() {
        let transport = RecordingTransport::with_status(401, VIDEO_RESPONSE);
        let submitter = ResultSubmitter::new(config(), transport);

        let update = submitter
            .submit("Login", &SessionId::from("abc"), true)
            .await
            .unwrap();

        assert_eq!(update.status, 401);
        assert!(!update.is_accepted());
        assert!(update.job_urls.is_empty());
    }

    #[traced_test]
    #[tokio::test]
    async fn test_transport_failure_is_logged_and_swallowed() {
        let submitter = ResultSubmitter::new(config(), FailingTransport);

        let update = submitter.submit("Login", &SessionId::from("abc"), true).await;

        assert!(update.is_none());
        assert!(logs_contain("Updating Sauce Labs job info failed"));
        assert!(logs_contain("connection refused"));
    }

    #[tokio::test]
    async fn test_try_submit_surfaces_failure() {
        let submitter = ResultSubmitter::new(config(), FailingTransport);
        let result = submitter.try_submit("Login", &SessionId::from("abc"), true).await;
        assert!(result.is_err());
    }
}
