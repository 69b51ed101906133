//! Core type definitions for story reporting

use serde::{Deserialize, Serialize};

use crate::Result;

/// Synthetic story names emitted by the test framework for its own bookkeeping.
///
/// These never correspond to real test content and are never reported.
pub const BOOKKEEPING_STORY_NAMES: [&str; 6] = [
    "BeforeStories",
    "AfterStories",
    "BeforeStory",
    "AfterStory",
    "BeforeScenario",
    "AfterScenario",
];

/// Whether a story name is one of the framework's bookkeeping markers
pub fn is_bookkeeping_story(name: &str) -> bool {
    BOOKKEEPING_STORY_NAMES.contains(&name)
}

/// Remote browser session identifier (the Sauce Labs job id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Basic-auth credentials for the Sauce Labs REST API
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub access_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Per-worker execution context
///
/// Each worker owns exactly one context and passes it through every
/// lifecycle callback. It is reset at story start and cleared at story end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryContext {
    /// Name of the story currently running
    pub story_name: Option<String>,
    /// Browser session captured when the last scenario started
    pub session_id: Option<SessionId>,
    /// False once any step has failed
    pub passed: bool,
    /// Title of the scenario currently running
    pub current_scenario: Option<String>,
}

impl StoryContext {
    pub fn new() -> Self {
        Self {
            story_name: None,
            session_id: None,
            passed: true,
            current_scenario: None,
        }
    }

    /// Begin a new story, discarding anything left from the previous one
    pub fn start(&mut self, name: impl Into<String>) {
        *self = Self {
            story_name: Some(name.into()),
            ..Self::new()
        };
    }

    /// Take the finished story's state, leaving a fresh context behind
    pub fn finish(&mut self) -> StoryContext {
        std::mem::take(self)
    }
}

impl Default for StoryContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Job status payload sent to `PUT /rest/v1/<user>/jobs/<session>`
///
/// Serializes as `{"tags":[..],"build":"..","passed":"true","name":" <job>"}`.
/// `build` is omitted when unset, `passed` is a string and `name` keeps the
/// single leading space existing Sauce Labs dashboards were built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(with = "bool_as_string")]
    pub passed: bool,
    #[serde(with = "leading_space")]
    pub name: String,
}

impl JobStatus {
    pub fn new(name: impl Into<String>, passed: bool) -> Self {
        Self {
            tags: Vec::new(),
            build: None,
            passed,
            name: name.into(),
        }
    }

    pub fn with_build(mut self, build: Option<String>) -> Self {
        self.build = build;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Render the compact JSON body for the request
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Outcome of one job status update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobUpdate {
    /// Story that was reported
    pub story: String,
    /// Job the status was attached to
    pub session_id: SessionId,
    /// Reported pass/fail
    pub passed: bool,
    /// HTTP status returned by Sauce Labs
    pub status: u16,
    /// Job URLs found in the response (video suffix stripped)
    pub job_urls: Vec<String>,
}

impl JobUpdate {
    /// Sauce Labs answers 200 when the job was updated
    pub fn is_accepted(&self) -> bool {
        self.status == 200
    }
}

mod bool_as_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(de::Error::custom(format!("invalid passed flag: {}", other))),
        }
    }
}

mod leading_space {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!(" {}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.strip_prefix(' ').map(str::to_string).unwrap_or(raw))
    }
}
