// ── Compound operation sequencer ──
//
// A resource mutation is an ordered list of primitive set/delete steps, each
// tagged `Required` or `BestEffort`. The whole plan (every path) is built
// before the first remote call, so invalid input never leaves a device
// half-configured. There is no rollback: a failed required step stops the
// run, a failed best-effort step is logged and skipped.

use tracing::{debug, warn};
use vyos_api::{ConfigPath, ConfigStore, PathError};

use crate::classify::classify_mutation;
use crate::error::CoreError;
use crate::session::DeviceSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    Set,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Failure aborts the remaining steps and is reported.
    Required,
    /// Failure is logged and otherwise ignored.
    BestEffort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub op: StepOp,
    pub path: ConfigPath,
    pub policy: StepPolicy,
}

/// Ordered steps realizing one resource-level mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundOp {
    steps: Vec<Step>,
}

impl CompoundOp {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, op: StepOp, path: ConfigPath, policy: StepPolicy) -> Self {
        self.steps.push(Step { op, path, policy });
        self
    }

    pub fn set(self, path: ConfigPath) -> Self {
        self.push(StepOp::Set, path, StepPolicy::Required)
    }

    pub fn delete(self, path: ConfigPath) -> Self {
        self.push(StepOp::Delete, path, StepPolicy::Required)
    }

    pub fn try_set(self, path: ConfigPath) -> Self {
        self.push(StepOp::Set, path, StepPolicy::BestEffort)
    }

    pub fn try_delete(self, path: ConfigPath) -> Self {
        self.push(StepOp::Delete, path, StepPolicy::BestEffort)
    }

    /// Best-effort `set` of `base <keyword> <value>`, skipped when `value`
    /// is empty.
    pub fn optional(
        self,
        base: &ConfigPath,
        keyword: &'static str,
        field: &str,
        value: &str,
    ) -> Result<Self, PathError> {
        if value.is_empty() {
            return Ok(self);
        }
        Ok(self.try_set(base.child(keyword).value(field, value)?))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Issue every step in order.
    pub async fn run<S: ConfigStore>(&self, session: &DeviceSession<'_, S>) -> Result<(), CoreError> {
        for step in &self.steps {
            let result = classify_mutation(session.apply(step.op, &step.path).await);
            match (step.policy, result) {
                (_, Ok(())) => debug!(op = ?step.op, path = %step.path, "step applied"),
                (_, Err(CoreError::Cancelled)) => return Err(CoreError::Cancelled),
                (StepPolicy::Required, Err(err)) => return Err(err),
                (StepPolicy::BestEffort, Err(err)) => {
                    warn!(op = ?step.op, path = %step.path, error = %err, "optional step failed, continuing");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::testing::{Script, ScriptedStore};

    fn vrf_plan() -> CompoundOp {
        let base = ConfigPath::root("vrf").kw("name").value("name", "MGMT").unwrap();
        CompoundOp::new()
            .set(base.child("table").value("table", "100").unwrap())
            .optional(&base, "description", "description", "mgmt")
            .unwrap()
    }

    #[test]
    fn optional_skips_empty_values() {
        let base = ConfigPath::root("x");
        let plan = CompoundOp::new().optional(&base, "description", "description", "").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn optional_validates_before_running() {
        let base = ConfigPath::root("x");
        let err = CompoundOp::new()
            .optional(&base, "description", "description", "two words")
            .unwrap_err();
        assert_eq!(err.field(), "description");
    }

    #[test]
    fn plan_records_policies_in_order() {
        let policies: Vec<StepPolicy> = vrf_plan().steps().iter().map(|s| s.policy).collect();
        assert_eq!(policies, vec![StepPolicy::Required, StepPolicy::BestEffort]);
    }

    #[tokio::test]
    async fn runs_steps_in_order() {
        let store = ScriptedStore::new();
        let session = DeviceSession::new(&store, CancellationToken::new());
        vrf_plan().run(&session).await.unwrap();
        assert_eq!(
            store.calls(),
            vec![
                "set vrf name MGMT table 100",
                "set vrf name MGMT description mgmt"
            ]
        );
    }

    #[tokio::test]
    async fn required_failure_stops_the_run() {
        let store = ScriptedStore::new().refusing("set vrf name MGMT table 100", "bad table");
        let session = DeviceSession::new(&store, CancellationToken::new());
        let err = vrf_plan().run(&session).await.unwrap_err();
        assert!(matches!(err, CoreError::RemoteRejected { .. }));
        assert_eq!(store.calls(), vec!["set vrf name MGMT table 100"]);
    }

    #[tokio::test]
    async fn best_effort_failure_is_swallowed() {
        let store = ScriptedStore::new().on(
            "set vrf name MGMT description mgmt",
            Script::Timeout,
        );
        let session = DeviceSession::new(&store, CancellationToken::new());
        vrf_plan().run(&session).await.unwrap();
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn cancelled_session_issues_nothing() {
        let store = ScriptedStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let session = DeviceSession::new(&store, cancel);
        let err = vrf_plan().run(&session).await.unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_step() {
        let store = ScriptedStore::new().on("set vrf name MGMT table 100", Script::Hang);
        let cancel = CancellationToken::new();
        let session = DeviceSession::new(&store, cancel.clone());

        let canceller = async {
            tokio::task::yield_now().await;
            cancel.cancel();
        };
        let plan = vrf_plan();
        let (result, ()) = tokio::join!(plan.run(&session), canceller);

        assert!(matches!(result, Err(CoreError::Cancelled)));
        assert_eq!(store.calls(), vec!["set vrf name MGMT table 100"]);
    }

    #[tokio::test]
    async fn best_effort_step_still_honours_cancellation() {
        let store = ScriptedStore::new().on("set vrf name MGMT description mgmt", Script::Hang);
        let cancel = CancellationToken::new();
        let session = DeviceSession::new(&store, cancel.clone());

        let canceller = async {
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
            cancel.cancel();
        };
        let plan = vrf_plan();
        let (result, ()) = tokio::join!(plan.run(&session), canceller);
        assert!(matches!(result, Err(CoreError::Cancelled)));
    }
}
