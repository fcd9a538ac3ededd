//! Status conditions shared by every Dockyard resource kind
//!
//! Three condition types are tracked, using abnormal-true polarity:
//! - **Reconciling**: work is in progress (`True` is noteworthy)
//! - **Stalled**: the last pass failed (`True` is noteworthy)
//! - **Ready**: the remote entity matches the declared state (`True` is nominal)
//!
//! The composite helpers keep Reconciling and Stalled mutually exclusive and
//! stamp the observed generation on every call.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ConditionType {
    Reconciling,
    Stalled,
    Ready,
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Reconciling => "Reconciling",
            Self::Stalled => "Stalled",
            Self::Ready => "Ready",
        };
        write!(f, "{}", s)
    }
}

/// Condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

/// A typed, timestamped status record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: ConditionType,

    pub status: ConditionStatus,

    /// Machine-readable reason (CamelCase)
    #[serde(default)]
    pub reason: String,

    /// Human-readable message
    #[serde(default)]
    pub message: String,

    /// Last time `status` changed
    pub last_transition_time: DateTime<Utc>,
}

/// Reasons written by the composite helpers on the non-primary conditions
pub mod reasons {
    pub const SUCCEEDED: &str = "Succeeded";
    pub const PROGRESSING: &str = "Progressing";
    pub const FAILED: &str = "Failed";
}

/// Condition bookkeeping for a status type
///
/// Implementors only expose their condition list and generation marker; the
/// state machine is provided.
pub trait StatusConditions {
    fn conditions(&self) -> &[Condition];

    fn conditions_mut(&mut self) -> &mut Vec<Condition>;

    fn set_observed_generation(&mut self, generation: i64);

    /// Look up a condition by type
    fn condition(&self, type_: ConditionType) -> Option<&Condition> {
        self.conditions().iter().find(|c| c.type_ == type_)
    }

    /// Whether the condition exists with status `True`
    fn is_true(&self, type_: ConditionType) -> bool {
        self.condition(type_)
            .is_some_and(|c| c.status == ConditionStatus::True)
    }

    /// Set a condition, stamping transitions with the current time
    fn set_condition(
        &mut self,
        type_: ConditionType,
        status: ConditionStatus,
        reason: &str,
        message: &str,
    ) {
        self.set_condition_at(type_, status, reason, message, Utc::now());
    }

    /// Set a condition, stamping transitions with `now`
    ///
    /// The transition time only moves when `status` changes; reason and
    /// message are always replaced.
    fn set_condition_at(
        &mut self,
        type_: ConditionType,
        status: ConditionStatus,
        reason: &str,
        message: &str,
        now: DateTime<Utc>,
    ) {
        let conditions = self.conditions_mut();
        match conditions.iter_mut().find(|c| c.type_ == type_) {
            Some(existing) => {
                if existing.status != status {
                    existing.status = status;
                    existing.last_transition_time = now;
                }
                existing.reason = reason.to_string();
                existing.message = message.to_string();
            }
            None => conditions.push(Condition {
                type_,
                status,
                reason: reason.to_string(),
                message: message.to_string(),
                last_transition_time: now,
            }),
        }
    }

    /// Remove a condition if present
    fn remove_condition(&mut self, type_: ConditionType) {
        self.conditions_mut().retain(|c| c.type_ != type_);
    }

    /// Work is in progress: Reconciling=True, Stalled=False, Ready=False
    fn mark_reconciling(&mut self, generation: i64, reason: &str, message: &str) {
        self.set_observed_generation(generation);
        self.set_condition(ConditionType::Reconciling, ConditionStatus::True, reason, message);
        self.set_condition(ConditionType::Stalled, ConditionStatus::False, reasons::PROGRESSING, "");
        self.set_condition(ConditionType::Ready, ConditionStatus::False, reason, message);
    }

    /// Converged: Ready=True, Reconciling=False, Stalled=False
    fn mark_ready(&mut self, generation: i64, reason: &str, message: &str) {
        self.set_observed_generation(generation);
        self.set_condition(ConditionType::Ready, ConditionStatus::True, reason, message);
        self.set_condition(ConditionType::Reconciling, ConditionStatus::False, reasons::SUCCEEDED, "");
        self.set_condition(ConditionType::Stalled, ConditionStatus::False, reasons::SUCCEEDED, "");
    }

    /// Failed: Stalled=True, Reconciling=False, Ready=False
    fn mark_stalled(&mut self, generation: i64, reason: &str, message: &str) {
        self.set_observed_generation(generation);
        self.set_condition(ConditionType::Stalled, ConditionStatus::True, reason, message);
        self.set_condition(ConditionType::Reconciling, ConditionStatus::False, reasons::FAILED, "");
        self.set_condition(ConditionType::Ready, ConditionStatus::False, reason, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Default)]
    struct TestStatus {
        generation: i64,
        conditions: Vec<Condition>,
    }

    impl StatusConditions for TestStatus {
        fn conditions(&self) -> &[Condition] {
            &self.conditions
        }

        fn conditions_mut(&mut self) -> &mut Vec<Condition> {
            &mut self.conditions
        }

        fn set_observed_generation(&mut self, generation: i64) {
            self.generation = generation;
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn assert_exclusive(status: &TestStatus) {
        assert!(
            !(status.is_true(ConditionType::Reconciling) && status.is_true(ConditionType::Stalled)),
            "Reconciling and Stalled both true: {:?}",
            status.conditions
        );
        let ready = status.is_true(ConditionType::Ready);
        assert!(!(ready && status.is_true(ConditionType::Stalled)));
    }

    #[test]
    fn test_set_condition_appends() {
        let mut status = TestStatus::default();
        status.set_condition_at(ConditionType::Ready, ConditionStatus::True, "Ok", "fine", at(0));

        assert_eq!(status.conditions.len(), 1);
        assert!(status.is_true(ConditionType::Ready));
        assert_eq!(status.condition(ConditionType::Ready).unwrap().last_transition_time, at(0));
    }

    #[test]
    fn test_unchanged_status_keeps_transition_time() {
        let mut status = TestStatus::default();
        status.set_condition_at(ConditionType::Stalled, ConditionStatus::True, "GetError", "first", at(0));
        status.set_condition_at(ConditionType::Stalled, ConditionStatus::True, "CreateError", "second", at(60));

        let cond = status.condition(ConditionType::Stalled).unwrap();
        assert_eq!(cond.last_transition_time, at(0));
        assert_eq!(cond.reason, "CreateError");
        assert_eq!(cond.message, "second");
        assert_eq!(status.conditions.len(), 1);
    }

    #[test]
    fn test_status_change_refreshes_transition_time() {
        let mut status = TestStatus::default();
        status.set_condition_at(ConditionType::Ready, ConditionStatus::False, "Pending", "", at(0));
        status.set_condition_at(ConditionType::Ready, ConditionStatus::True, "Synced", "", at(30));

        let cond = status.condition(ConditionType::Ready).unwrap();
        assert_eq!(cond.last_transition_time, at(30));
        assert_eq!(cond.status, ConditionStatus::True);
    }

    #[test]
    fn test_remove_condition() {
        let mut status = TestStatus::default();
        status.set_condition(ConditionType::Reconciling, ConditionStatus::True, "Working", "");
        status.remove_condition(ConditionType::Reconciling);
        assert!(status.condition(ConditionType::Reconciling).is_none());

        // Removing an absent type is a no-op
        status.remove_condition(ConditionType::Reconciling);
        assert!(status.conditions.is_empty());
    }

    #[test]
    fn test_mark_helpers_are_exclusive() {
        let mut status = TestStatus::default();

        status.mark_reconciling(1, "Creating", "creating");
        assert_exclusive(&status);
        assert!(status.is_true(ConditionType::Reconciling));
        assert!(!status.is_true(ConditionType::Ready));

        status.mark_stalled(2, "CreateError", "boom");
        assert_exclusive(&status);
        assert!(status.is_true(ConditionType::Stalled));
        assert!(!status.is_true(ConditionType::Reconciling));

        status.mark_ready(3, "Synced", "in sync");
        assert_exclusive(&status);
        assert!(status.is_true(ConditionType::Ready));
        assert!(!status.is_true(ConditionType::Stalled));

        status.mark_reconciling(4, "RemoteMissing", "gone");
        assert_exclusive(&status);

        // One condition per type, whatever the sequence
        assert_eq!(status.conditions.len(), 3);
    }

    #[test]
    fn test_mark_sets_observed_generation() {
        let mut status = TestStatus::default();
        status.mark_stalled(7, "InvalidSpec", "bad");
        assert_eq!(status.generation, 7);
        status.mark_ready(8, "Synced", "");
        assert_eq!(status.generation, 8);
    }

    #[test]
    fn test_repeated_ready_keeps_timestamps() {
        let mut status = TestStatus::default();
        status.mark_ready(1, "Synced", "");
        let before = status.conditions.clone();

        status.mark_ready(1, "Synced", "");
        for (old, new) in before.iter().zip(status.conditions.iter()) {
            assert_eq!(old.last_transition_time, new.last_transition_time);
        }
    }

    #[test]
    fn test_condition_serialization() {
        let cond = Condition {
            type_: ConditionType::Ready,
            status: ConditionStatus::True,
            reason: "Synced".to_string(),
            message: String::new(),
            last_transition_time: at(0),
        };
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json["type"], "Ready");
        assert_eq!(json["status"], "True");
        assert!(json.get("lastTransitionTime").is_some());
    }
}
