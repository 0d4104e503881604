#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Role grant and revoke tests against an in-memory host.

use typewright::prelude::*;
use typewright_test_utils::{HostCall, MemoryHost, Operation, test_role};

const EDITOR_PLUS: [&str; 6] = [
    "read",
    "delete_post",
    "delete_posts",
    "delete_published_posts",
    "delete_private_posts",
    "delete_others_posts",
];

fn editor_plus() -> RoleDefinition {
    RoleDefinition::new(
        &["Editor Plus"],
        CapabilityType::new("post").unwrap(),
        PermissionSpec::scoped([(Action::Delete, Scope::All)]),
    )
    .unwrap()
}

#[test]
fn test_grant_reaches_role_and_bootstrap_roles() {
    let mut host = MemoryHost::with_bootstrap_roles().with_role("editor_plus", &["read"]);
    let role = editor_plus();
    assert_eq!(role.capabilities().len(), 6);

    role.grant(&mut host, false).unwrap();

    for name in ["editor_plus", "administrator", "editor", "author"] {
        let stored = host.role(name).unwrap();
        for capability in EDITOR_PLUS {
            assert!(stored.has(capability), "{name} is missing {capability}");
        }
    }
}

#[test]
fn test_grant_only_this_role() {
    let mut host = MemoryHost::with_bootstrap_roles().with_role("editor_plus", &["read"]);
    editor_plus().grant(&mut host, true).unwrap();

    assert_eq!(host.role("editor_plus").unwrap().capabilities, EDITOR_PLUS);
    assert_eq!(host.role("editor").unwrap().capabilities, ["read"]);
}

#[test]
fn test_grant_is_idempotent() {
    let mut host = MemoryHost::new().with_role("editor_plus", &["read"]);
    let role = editor_plus();
    role.grant(&mut host, true).unwrap();
    role.grant(&mut host, true).unwrap();

    assert_eq!(host.role("editor_plus").unwrap().capabilities, EDITOR_PLUS);
}

#[test]
fn test_grant_without_own_role_targets_bootstrap_roles() {
    let mut host = MemoryHost::with_bootstrap_roles();
    editor_plus().grant(&mut host, false).unwrap();

    assert!(host.role("editor_plus").is_none());
    assert!(host.role("author").unwrap().has("delete_others_posts"));
}

#[test]
fn test_missing_role_fails_before_any_change() {
    let mut host = MemoryHost::new();
    let err = editor_plus().grant(&mut host, true).unwrap_err();
    assert!(matches!(err, Error::RoleNotFound(ref name) if name == "editor_plus"));
    assert!(host.untouched());
}

#[test]
fn test_missing_bootstrap_role_fails_before_any_change() {
    let mut host = MemoryHost::new()
        .with_role("editor_plus", &["read"])
        .with_role("administrator", &["read"]);

    let err = editor_plus().grant(&mut host, false).unwrap_err();
    assert!(matches!(err, Error::RoleNotFound(ref name) if name == "editor"));
    assert!(host.untouched());
    assert_eq!(host.role("editor_plus").unwrap().capabilities, ["read"]);
}

#[test]
fn test_revoke_only_this_role_keeps_read() {
    let mut host = MemoryHost::new().with_role("widget_editor", &["read", "edit_widget"]);
    let role = test_role("Widget Editor", "widget", Action::Edit, Scope::Own);

    role.revoke(&mut host, true).unwrap();

    assert_eq!(host.role("widget_editor").unwrap().capabilities, ["read"]);
    assert!(
        !host
            .calls
            .contains(&HostCall::RemoveCapability("widget_editor".into(), "read".into()))
    );
}

#[test]
fn test_revoke_reaches_bootstrap_roles() {
    let mut host = MemoryHost::with_bootstrap_roles().with_role("editor_plus", &["read"]);
    let role = editor_plus();
    role.grant(&mut host, false).unwrap();
    role.revoke(&mut host, false).unwrap();

    for name in ["editor_plus", "administrator", "editor", "author"] {
        assert_eq!(host.role(name).unwrap().capabilities, ["read"]);
    }
}

#[test]
fn test_revoke_missing_role_is_an_error() {
    let mut host = MemoryHost::new();
    let role = test_role("Widget Editor", "widget", Action::Edit, Scope::Own);
    let err = role.revoke(&mut host, true).unwrap_err();
    assert!(matches!(err, Error::RoleNotFound(_)));
}

#[test]
fn test_host_capability_failure_is_passed_through() {
    let mut host = MemoryHost::new()
        .with_role("editor_plus", &["read"])
        .failing(Operation::AddCapability);

    let err = editor_plus().grant(&mut host, true).unwrap_err();
    assert!(matches!(err, Error::HostRegistration(_)));
}

#[test]
fn test_custom_bootstrap_roles() {
    let mut host = MemoryHost::new()
        .with_role("editor_plus", &["read"])
        .with_role("shop_manager", &["read"]);
    let mut role = editor_plus();
    role.set_bootstrap_roles(["shop_manager"]).unwrap();

    role.grant(&mut host, false).unwrap();
    assert!(host.role("shop_manager").unwrap().has("delete_posts"));
}

#[test]
fn test_re_derived_capabilities_are_granted() {
    let mut host = MemoryHost::new().with_role("editor_plus", &["read"]);
    let mut role = editor_plus();
    role.set_permissions(PermissionSpec::scoped([(Action::Read, Scope::All)]))
        .unwrap();

    role.grant(&mut host, true).unwrap();
    assert_eq!(
        host.role("editor_plus").unwrap().capabilities,
        ["read", "read_post", "read_private_posts"]
    );
}
