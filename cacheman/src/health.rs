//! Backend self-test and the info document built from it.

use cacheman_backend::Backend;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Value written and read back by the probe.
pub const PROBE_VALUE: &[u8] = b"CacheMan";

const PROBE_KEY_PREFIX: &str = "cacheman-";

/// Outcome of one probe step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Not attempted because an earlier step failed.
    #[default]
    Untested,
    /// Step succeeded.
    Passed,
    /// Step failed.
    Failed,
}

/// Result of [`health_check`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    /// Writing the probe entry.
    pub set_result: HealthStatus,
    /// Reading it back with the same value.
    pub get_result: HealthStatus,
    /// Deleting it.
    pub delete_result: HealthStatus,
}

impl HealthCheckResult {
    /// Whether every step passed.
    pub fn is_healthy(&self) -> bool {
        [self.set_result, self.get_result, self.delete_result]
            .iter()
            .all(|status| *status == HealthStatus::Passed)
    }
}

/// Document served on the info path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    /// Backend type name.
    #[serde(rename = "type")]
    pub backend_type: String,
    /// Fresh probe result.
    pub operation_health: HealthCheckResult,
}

/// Write, read back and delete a random probe key.
///
/// Steps run in order and the first failure leaves the remaining steps
/// [`HealthStatus::Untested`]. Reading back a different value counts as a
/// failed read.
pub async fn health_check<B>(backend: &B) -> HealthCheckResult
where
    B: Backend + ?Sized,
{
    let mut result = HealthCheckResult::default();
    let key = format!("{PROBE_KEY_PREFIX}{}", rand::random::<u32>());

    if let Err(error) = backend.set(&key, PROBE_VALUE.into()).await {
        warn!(%key, %error, "Health check write failed");
        result.set_result = HealthStatus::Failed;
        return result;
    }
    result.set_result = HealthStatus::Passed;

    match backend.get(&key).await {
        Ok(Some(value)) if value.as_ref() == PROBE_VALUE => {
            result.get_result = HealthStatus::Passed;
        }
        Ok(value) => {
            warn!(%key, found = value.is_some(), "Health check read back wrong value");
            result.get_result = HealthStatus::Failed;
            return result;
        }
        Err(error) => {
            warn!(%key, %error, "Health check read failed");
            result.get_result = HealthStatus::Failed;
            return result;
        }
    }

    result.delete_result = match backend.delete(&key).await {
        Ok(_) => HealthStatus::Passed,
        Err(error) => {
            warn!(%key, %error, "Health check delete failed");
            HealthStatus::Failed
        }
    };
    result
}
