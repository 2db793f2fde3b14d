//! Lifecycle hooks that snapshot resource state into the debug archive

use std::fmt;

use serde::Serialize;

use crate::debug::archive::DebugHandle;
use crate::debug::error::HookError;
use crate::debug::instance::{InstanceDiff, InstanceInfo, InstanceState};

/// What the engine should do after a hook returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    Halt,
}

/// Callbacks the orchestration engine fires around resource operations.
///
/// Every method defaults to `Ok(HookAction::Continue)`. Hook errors are
/// advisory: the engine reports them and carries on with the operation.
#[allow(unused_variables)]
pub trait Hook: Send + Sync {
    fn pre_apply(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
        diff: Option<&InstanceDiff>,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn post_apply(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
        error: Option<&dyn fmt::Display>,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn pre_diff(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn post_diff(
        &self,
        info: &InstanceInfo,
        diff: Option<&InstanceDiff>,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn pre_provision_resource(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn post_provision_resource(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn pre_provision(
        &self,
        info: &InstanceInfo,
        provisioner: &str,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn post_provision(
        &self,
        info: &InstanceInfo,
        provisioner: &str,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn provision_output(&self, info: &InstanceInfo, provisioner: &str, message: &str) {}

    fn pre_refresh(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn post_refresh(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn pre_import_state(
        &self,
        info: &InstanceInfo,
        import_id: &str,
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    fn post_import_state(
        &self,
        info: &InstanceInfo,
        states: &[InstanceState],
    ) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }

    /// Fired with the whole state after each update.
    fn post_state_update(&self, state: &serde_json::Value) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }
}

/// Hook that writes a text snapshot of every lifecycle event to the archive.
///
/// Each event becomes a `debug/<step>-hook-<Event>` entry. Archive failures
/// are logged and swallowed; only diff rendering errors are returned.
#[derive(Debug, Clone, Default)]
pub struct DebugHook {
    handle: DebugHandle,
}

impl DebugHook {
    pub fn new(handle: DebugHandle) -> Self {
        Self { handle }
    }

    /// Hook bound to the process-wide session at the time of the call.
    pub fn from_runtime() -> Self {
        Self::new(crate::debug::runtime::handle())
    }

    fn record(&self, event: &str, text: &str) -> HookAction {
        let label = format!("hook-{event}");
        if let Err(e) = self.handle.append_blob(&label, text.as_bytes()) {
            tracing::warn!(event, error = %e, "Failed to record lifecycle snapshot");
        }
        HookAction::Continue
    }
}

impl Hook for DebugHook {
    fn pre_apply(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
        diff: Option<&InstanceDiff>,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.state(state);
        snapshot.json(&diff)?;
        Ok(self.record("PreApply", &snapshot.buf))
    }

    fn post_apply(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
        error: Option<&dyn fmt::Display>,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.state(state);
        if let Some(error) = error {
            snapshot.buf.push_str(&error.to_string());
        }
        Ok(self.record("PostApply", &snapshot.buf))
    }

    fn pre_diff(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.state(state);
        Ok(self.record("PreDiff", &snapshot.buf))
    }

    fn post_diff(
        &self,
        info: &InstanceInfo,
        diff: Option<&InstanceDiff>,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.json(&diff)?;
        Ok(self.record("PostDiff", &snapshot.buf))
    }

    fn pre_provision_resource(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.state(state);
        Ok(self.record("PreProvisionResource", &snapshot.buf))
    }

    fn post_provision_resource(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.state(state);
        Ok(self.record("PostProvisionResource", &snapshot.buf))
    }

    fn pre_provision(
        &self,
        info: &InstanceInfo,
        provisioner: &str,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.line(provisioner);
        Ok(self.record("PreProvision", &snapshot.buf))
    }

    fn post_provision(
        &self,
        info: &InstanceInfo,
        provisioner: &str,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.line(provisioner);
        Ok(self.record("PostProvision", &snapshot.buf))
    }

    fn provision_output(&self, info: &InstanceInfo, provisioner: &str, message: &str) {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.line(provisioner);
        snapshot.line(message);
        self.record("ProvisionOutput", &snapshot.buf);
    }

    fn pre_refresh(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.state(state);
        Ok(self.record("PreRefresh", &snapshot.buf))
    }

    fn post_refresh(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.state(state);
        Ok(self.record("PostRefresh", &snapshot.buf))
    }

    fn pre_import_state(
        &self,
        info: &InstanceInfo,
        import_id: &str,
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        snapshot.line(import_id);
        Ok(self.record("PreImportState", &snapshot.buf))
    }

    fn post_import_state(
        &self,
        info: &InstanceInfo,
        states: &[InstanceState],
    ) -> Result<HookAction, HookError> {
        let mut snapshot = Snapshot::for_instance(info);
        for state in states {
            snapshot.state(Some(state));
        }
        Ok(self.record("PostImportState", &snapshot.buf))
    }

    // The full state can be arbitrarily large; not recorded.
    fn post_state_update(&self, _state: &serde_json::Value) -> Result<HookAction, HookError> {
        Ok(HookAction::Continue)
    }
}

struct Snapshot {
    buf: String,
}

impl Snapshot {
    fn for_instance(info: &InstanceInfo) -> Self {
        let mut snapshot = Self { buf: String::new() };
        snapshot.line(&info.human_id());
        snapshot
    }

    fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn state(&mut self, state: Option<&InstanceState>) {
        if let Some(state) = state {
            self.line(&state.to_string());
        }
    }

    fn json<T: Serialize>(&mut self, value: &T) -> Result<(), HookError> {
        self.buf.push_str(&serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
