//! Integration tests for lifecycle event capture
//!
//! Drives `DebugHook` the way the orchestration engine would during an
//! apply, interleaved with graph snapshots and step logs.

use super::common::archive_reader::read_entries;
use debug_archive::{
    AttrDiff, DebugHandle, DebugHook, Hook, HookAction, InstanceDiff, InstanceInfo, InstanceState,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;

fn ami_diff() -> InstanceDiff {
    let mut diff = InstanceDiff::default();
    diff.attributes.insert(
        "ami".to_string(),
        AttrDiff {
            old: "ami-1".to_string(),
            new: "ami-2".to_string(),
            requires_new: true,
            ..Default::default()
        },
    );
    diff
}

/// Test a full apply walk as seen in the archive
#[test]
fn test_apply_walk_is_captured_in_order() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let handle = DebugHandle::create(dir.path()).unwrap();
    let hooks: Vec<Arc<dyn Hook>> = vec![Arc::new(DebugHook::new(handle.clone()))];

    let info = InstanceInfo::new("aws_instance", "web").with_module_path(vec!["app".to_string()]);
    let before = InstanceState::new("i-1").with_attribute("ami", "ami-1");
    let after = InstanceState::new("i-2").with_attribute("ami", "ami-2");

    handle.append_graph("apply", "digraph { root }").unwrap();
    let mut walk = handle.new_step_log("apply-walk");
    for hook in &hooks {
        assert_eq!(
            hook.pre_apply(&info, Some(&before), Some(&ami_diff())).unwrap(),
            HookAction::Continue
        );
    }
    writeln!(walk, "applied {}", info.human_id()).unwrap();
    for hook in &hooks {
        hook.post_apply(&info, Some(&after), None).unwrap();
    }
    walk.close().unwrap();
    handle.close().unwrap();

    let entries = read_entries(handle.archive().unwrap().path());
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "debug/0-apply.dot",
            "debug/2-hook-PreApply",
            "debug/3-hook-PostApply",
            "debug/1-apply-walk.log",
        ]
    );
    assert!(entries[1]
        .text()
        .starts_with("module.app.aws_instance.web\nID = i-1\nami = ami-1\n{"));
    assert!(entries[1].text().contains("\"requires_new\": true"));
    assert_eq!(
        entries[2].text(),
        "module.app.aws_instance.web\nID = i-2\nami = ami-2\n"
    );
    assert_eq!(entries[3].text(), "applied module.app.aws_instance.web\n");
}

/// Test that hooks never fail the operation when debugging is off
#[test]
fn test_hooks_with_debugging_disabled() {
    let hook: Box<dyn Hook> = Box::new(DebugHook::new(DebugHandle::disabled()));
    let info = InstanceInfo::new("null_resource", "x");
    let state = InstanceState::new("1");

    assert_eq!(
        hook.pre_apply(&info, Some(&state), Some(&ami_diff())).unwrap(),
        HookAction::Continue
    );
    assert_eq!(hook.pre_refresh(&info, None).unwrap(), HookAction::Continue);
    assert_eq!(
        hook.post_import_state(&info, &[state]).unwrap(),
        HookAction::Continue
    );
    hook.provision_output(&info, "local-exec", "done");
}
