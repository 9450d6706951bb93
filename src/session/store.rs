//! `SessionStore`: typed access to the two persisted flow keys.

use std::sync::Arc;

use tracing::{debug, info};

use super::migration::migrate_profile;
use super::model::UserProfile;
use crate::error::DatabaseError;
use crate::store::KeyValueStore;

/// Key holding the serialized [`UserProfile`].
pub const PROFILE_KEY: &str = "userFormData";
/// Key holding the completion flag.
pub const COMPLETED_KEY: &str = "interviewCompleted";
/// Literal stored under [`COMPLETED_KEY`] once the interview is submitted.
const COMPLETED_VALUE: &str = "true";

/// Sole owner of the profile and completion flag across page transitions.
///
/// Cheap to clone; all clones share the same backend and scope.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    scope: String,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, scope: impl Into<String>) -> Self {
        Self {
            backend,
            scope: scope.into(),
        }
    }

    /// Persist the profile, replacing any previous one.
    pub async fn save(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(profile)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        self.backend.set(&self.scope, PROFILE_KEY, &json).await?;
        info!(scope = %self.scope, position = %profile.position, "Profile saved");
        Ok(())
    }

    /// The stored profile, normalized to the current shape, or `None`.
    pub async fn load(&self) -> Result<Option<UserProfile>, DatabaseError> {
        let raw = self.backend.get(&self.scope, PROFILE_KEY).await?;
        Ok(raw.map(|raw| migrate_profile(&raw)))
    }

    pub async fn mark_completed(&self) -> Result<(), DatabaseError> {
        self.backend
            .set(&self.scope, COMPLETED_KEY, COMPLETED_VALUE)
            .await?;
        info!(scope = %self.scope, "Interview marked completed");
        Ok(())
    }

    pub async fn is_completed(&self) -> Result<bool, DatabaseError> {
        let value = self.backend.get(&self.scope, COMPLETED_KEY).await?;
        Ok(value.as_deref() == Some(COMPLETED_VALUE))
    }

    /// Remove both keys.
    pub async fn clear(&self) -> Result<(), DatabaseError> {
        let had_profile = self.backend.remove(&self.scope, PROFILE_KEY).await?;
        let had_flag = self.backend.remove(&self.scope, COMPLETED_KEY).await?;
        debug!(scope = %self.scope, had_profile, had_flag, "Session cleared");
        Ok(())
    }
}
