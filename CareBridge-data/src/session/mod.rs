//! Session persistence
//!
//! Only page-level collaborators (the API client and the binary) touch the
//! session; aggregation code never does.

use std::sync::{Arc, Mutex};

use crate::api::DataError;
use crate::models::Session;

mod file;

pub use file::FileSessionStore;

/// Storage for the authenticated session
pub trait SessionStore: Send + Sync {
    /// Current session, `None` when logged out
    fn load(&self) -> Result<Option<Session>, DataError>;

    /// Replace the stored session
    fn save(&self, session: &Session) -> Result<(), DataError>;

    /// Forget the stored session
    fn clear(&self) -> Result<(), DataError>;
}

/// Process-local session store
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    session: Arc<Mutex<Option<Session>>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<Session>, DataError> {
        let session = self.session.lock()?;
        Ok(session.clone())
    }

    fn save(&self, session: &Session) -> Result<(), DataError> {
        let mut slot = self.session.lock()?;
        *slot = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), DataError> {
        let mut slot = self.session.lock()?;
        *slot = None;
        Ok(())
    }
}
