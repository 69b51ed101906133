//! Browser session providers
//!
//! The reporter asks for the current session when a scenario starts, the way
//! a test harness would ask its remote web driver.

use saucery_core::SessionId;
use std::sync::{Arc, RwLock};

/// Source of the remote browser session currently driving the tests
pub trait SessionProvider: Send + Sync {
    /// The active session, or `None` if no driver is running
    fn current_session(&self) -> Option<SessionId>;
}

impl<P: SessionProvider + ?Sized> SessionProvider for Arc<P> {
    fn current_session(&self) -> Option<SessionId> {
        (**self).current_session()
    }
}

/// A session that never changes for the lifetime of the provider
#[derive(Debug, Clone, Default)]
pub struct FixedSession(Option<SessionId>);

impl FixedSession {
    pub fn new(id: impl Into<SessionId>) -> Self {
        Self(Some(id.into()))
    }

    /// A provider with no driver behind it
    pub fn none() -> Self {
        Self(None)
    }
}

impl SessionProvider for FixedSession {
    fn current_session(&self) -> Option<SessionId> {
        self.0.clone()
    }
}

/// A session handle that can be swapped while the reporter holds it
#[derive(Debug, Default)]
pub struct SharedSession {
    current: RwLock<Option<SessionId>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, id: impl Into<SessionId>) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(id.into());
    }

    pub fn clear(&self) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }
}

impl SessionProvider for SharedSession {
    fn current_session(&self) -> Option<SessionId> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
