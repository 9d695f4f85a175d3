use crate::{
    Error, Result,
    client::{DebugModeClient, WriteOptions},
    debugmode::{CONDITION_LOG_LEVELS_SET, ConditionStatus, DebugMode, DebugModeCondition, DebugModeStatus},
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

const DEFAULT_REASON: &str = "Initialized";
const DEFAULT_MESSAGE: &str = "Condition set to initialized";

/// Insert `next` or merge it into the record of the same type.
///
/// The transition time of an existing record only moves when its status
/// flips. Returns whether anything changed.
pub fn upsert_condition(conditions: &mut Vec<DebugModeCondition>, next: DebugModeCondition, now: DateTime<Utc>) -> bool {
    let Some(existing) = conditions
        .iter_mut()
        .find(|c| c.condition_type == next.condition_type)
    else {
        let mut next = next;
        next.last_transition_time.get_or_insert(now);
        conditions.push(next);
        return true;
    };
    let mut changed = false;
    if existing.status != next.status {
        existing.status = next.status;
        existing.last_transition_time = Some(next.last_transition_time.unwrap_or(now));
        changed = true;
    }
    if existing.reason != next.reason {
        existing.reason = next.reason;
        changed = true;
    }
    if existing.message != next.message {
        existing.message = next.message;
        changed = true;
    }
    if existing.observed_generation != next.observed_generation {
        existing.observed_generation = next.observed_generation;
        changed = true;
    }
    changed
}

impl DebugModeClient {
    /// Upsert a condition on a copy of `obj` and persist it.
    ///
    /// Empty `reason` and `message` are replaced by placeholders. The write goes
    /// to the status subresource unless the client was configured without it.
    pub async fn set_condition(
        &self,
        obj: &DebugMode,
        condition_type: &str,
        status: ConditionStatus,
        reason: &str,
        message: &str,
    ) -> Result<DebugMode> {
        let next = DebugModeCondition {
            condition_type: condition_type.to_string(),
            status,
            reason: if reason.is_empty() { DEFAULT_REASON } else { reason }.to_string(),
            message: if message.is_empty() { DEFAULT_MESSAGE } else { message }.to_string(),
            last_transition_time: None,
            observed_generation: obj.metadata.generation,
        };
        let mut copy = obj.clone();
        let conditions = &mut copy.status.get_or_insert_with(DebugModeStatus::default).conditions;
        if upsert_condition(conditions, next, Utc::now()) {
            info!("condition {condition_type} of debugmode {} is now {status:?}", obj.key());
        } else {
            debug!("condition {condition_type} of debugmode {} unchanged", obj.key());
        }
        let written = if self.options.status_subresource {
            self.update_status(&copy, &WriteOptions::default()).await
        } else {
            self.update(&copy, &WriteOptions::default()).await
        };
        written.map_err(|e| Error::Condition {
            condition: condition_type.to_string(),
            object: obj.key(),
            source: Box::new(e),
        })
    }

    /// Record whether the target log levels were applied
    pub async fn add_or_update_log_levels_set(
        &self,
        obj: &DebugMode,
        set: bool,
        message: &str,
        reason: &str,
    ) -> Result<DebugMode> {
        self.set_condition(obj, CONDITION_LOG_LEVELS_SET, set.into(), reason, message)
            .await
    }
}
