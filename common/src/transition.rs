//! Phase transitions of the status subresource.
//!
//! Each transition re-reads the object and only replaces `status.phase` on
//! the fresh copy, so status fields written concurrently by other actors are
//! kept. Writes rejected for a stale resourceVersion are retried with the
//! client's [`RetryPolicy`](crate::RetryPolicy); any other failure is returned at once.
use crate::{
    Error, Result,
    client::{DebugModeClient, WriteOptions},
    debugmode::{DebugMode, DebugModeStatus, StatusPhase},
    retry::Outcome,
};
use tracing::info;

impl DebugModeClient {
    /// Set the phase to `SetDebugMode`
    pub async fn update_status_debug_mode_set(&self, obj: &DebugMode) -> Result<DebugMode> {
        self.update_status_with_retry(obj, StatusPhase::SetDebugMode).await
    }

    /// Set the phase to `WaitForRollback`
    pub async fn update_status_wait_for_rollback(&self, obj: &DebugMode) -> Result<DebugMode> {
        self.update_status_with_retry(obj, StatusPhase::WaitForRollback).await
    }

    /// Set the phase to `Rollback`
    pub async fn update_status_rollback(&self, obj: &DebugMode) -> Result<DebugMode> {
        self.update_status_with_retry(obj, StatusPhase::Rollback).await
    }

    /// Set the phase to `Completed`
    pub async fn update_status_completed(&self, obj: &DebugMode) -> Result<DebugMode> {
        self.update_status_with_retry(obj, StatusPhase::Completed).await
    }

    /// Set the phase to `Failed`
    pub async fn update_status_failed(&self, obj: &DebugMode) -> Result<DebugMode> {
        self.update_status_with_retry(obj, StatusPhase::Failed).await
    }

    async fn update_status_with_retry(&self, obj: &DebugMode, target: StatusPhase) -> Result<DebugMode> {
        let name = Self::required_name(obj)?;
        let name = name.as_str();
        let outcome = self
            .options
            .retry
            .on_conflict(&self.cancel, move || async move {
                let mut fresh = self.get(name).await?;
                fresh.status.get_or_insert_with(DebugModeStatus::default).phase = Some(target);
                self.update_status(&fresh, &WriteOptions::default()).await
            })
            .await;
        match outcome {
            Outcome::Done(updated) => {
                info!("debugmode {} is now in phase {target}", updated.key());
                Ok(updated)
            }
            Outcome::Failed(e) => Err(e),
            Outcome::Exhausted { attempts, last_error } => Err(Error::RetriesExhausted {
                phase: target.to_string(),
                object: obj.key(),
                attempts,
                source: Box::new(last_error),
            }),
        }
    }
}
