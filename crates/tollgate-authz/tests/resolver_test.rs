//! Integration tests for effective permission resolution.

mod common;

use tollgate_authz::PermissionSource;
use tollgate_core::error::TollgateError;
use tollgate_core::models::action::Action;
use tollgate_core::models::resource::Resource;
use tollgate_core::models::role::{CreateRole, UpdateRole};
use tollgate_core::repository::{PermissionRepository, RoleRepository};
use uuid::Uuid;

use common::{Harness, seeded};

/// Create a non-core role granting exactly `grants`.
async fn custom_role(h: &Harness, name: &str, grants: &[(Resource, Action)]) -> Uuid {
    let role = h
        .roles
        .create(CreateRole {
            name: name.into(),
            description: String::new(),
            is_core: false,
        })
        .await
        .unwrap();

    let mut ids = Vec::new();
    for (resource, action) in grants {
        let p = h
            .permissions
            .get_by_resource_action(*resource, *action)
            .await
            .unwrap();
        ids.push(p.id);
    }
    h.permissions.bulk_grant_to_role(role.id, &ids).await.unwrap();
    role.id
}

// ---------------------------------------------------------------------------
// Fallback precedence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn default_role_applies_without_assignments() {
    let h = seeded().await;
    let user = h.user("idp|u1", None).await;
    let resolver = h.admin.guard().resolver();

    let effective = resolver
        .get_user_permissions_with_fallback(user.id)
        .await
        .unwrap();
    assert_eq!(effective.source, PermissionSource::DefaultRole);
    assert_eq!(effective.roles.len(), 1);
    assert_eq!(effective.roles[0].name, "GUEST");
    assert_eq!(effective.permissions.len(), 3);

    assert!(resolver
        .has_permission(user.id, Resource::Course, Action::Read)
        .await
        .unwrap());
    assert!(!resolver
        .has_permission(user.id, Resource::Course, Action::Create)
        .await
        .unwrap());
}

#[tokio::test]
async fn explicit_assignment_replaces_default_role() {
    let h = seeded().await;
    let user = h.user("idp|u1", None).await;
    let editor = custom_role(&h, "EDITOR", &[(Resource::Blog, Action::Update)]).await;
    h.roles.assign_to_user(user.id, editor, None).await.unwrap();

    let resolver = h.admin.guard().resolver();
    let effective = resolver
        .get_user_permissions_with_fallback(user.id)
        .await
        .unwrap();
    assert_eq!(effective.source, PermissionSource::Explicit);
    assert!(effective.has_role("EDITOR"));
    assert!(!effective.has_role("GUEST"));

    // GUEST would grant this, but the explicit role wins outright.
    assert!(!resolver
        .has_permission(user.id, Resource::Course, Action::Read)
        .await
        .unwrap());
    assert!(resolver
        .has_permission(user.id, Resource::Blog, Action::Update)
        .await
        .unwrap());
}

#[tokio::test]
async fn removed_assignment_restores_fallback() {
    let h = seeded().await;
    let user = h.user("idp|u1", None).await;
    let editor = custom_role(&h, "EDITOR", &[(Resource::Blog, Action::Update)]).await;
    h.roles.assign_to_user(user.id, editor, None).await.unwrap();
    h.roles.unassign_from_user(user.id, editor).await.unwrap();

    let effective = h
        .admin
        .guard()
        .resolver()
        .get_user_permissions_with_fallback(user.id)
        .await
        .unwrap();
    assert_eq!(effective.source, PermissionSource::DefaultRole);
    assert!(effective.allows(Resource::Course, Action::Read));
}

#[tokio::test]
async fn inactive_explicit_role_is_ignored() {
    let h = seeded().await;
    let user = h.user("idp|u1", None).await;
    let editor = custom_role(&h, "EDITOR", &[(Resource::Blog, Action::Update)]).await;
    h.roles.assign_to_user(user.id, editor, None).await.unwrap();
    h.roles
        .update(
            editor,
            UpdateRole {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let effective = h
        .admin
        .guard()
        .resolver()
        .get_user_permissions_with_fallback(user.id)
        .await
        .unwrap();
    assert_eq!(effective.source, PermissionSource::DefaultRole);
}

#[tokio::test]
async fn unknown_default_role_yields_empty_set() {
    let h = seeded().await;
    let user = h.user("idp|u1", Some("NO_SUCH_ROLE")).await;

    let effective = h
        .admin
        .guard()
        .resolver()
        .get_user_permissions_with_fallback(user.id)
        .await
        .unwrap();
    assert_eq!(effective.source, PermissionSource::None);
    assert!(effective.roles.is_empty());
    assert!(effective.permissions.is_empty());
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let h = seeded().await;
    let result = h
        .admin
        .guard()
        .resolver()
        .get_user_permissions_with_fallback(Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(TollgateError::NotFound { .. })));
}

// ---------------------------------------------------------------------------
// Wildcard and deduplication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn manage_grants_every_action_on_its_resource() {
    let h = seeded().await;
    let user = h.user("idp|u1", None).await;
    let curator = custom_role(&h, "CURATOR", &[(Resource::Gallery, Action::Manage)]).await;
    h.roles.assign_to_user(user.id, curator, None).await.unwrap();

    let resolver = h.admin.guard().resolver();
    for action in [Action::Create, Action::Read, Action::Update, Action::Delete] {
        assert!(
            resolver
                .has_permission(user.id, Resource::Gallery, action)
                .await
                .unwrap(),
            "GALLERY_MANAGE should satisfy GALLERY:{action}"
        );
    }
    assert!(!resolver
        .has_permission(user.id, Resource::Blog, Action::Read)
        .await
        .unwrap());
}

#[tokio::test]
async fn shared_permission_appears_once() {
    let h = seeded().await;
    let user = h.user("idp|u1", None).await;
    let a = custom_role(&h, "SUPPORT", &[(Resource::User, Action::Read)]).await;
    let b = custom_role(
        &h,
        "AUDITOR",
        &[(Resource::User, Action::Read), (Resource::Payment, Action::Read)],
    )
    .await;
    h.roles.assign_to_user(user.id, a, None).await.unwrap();
    h.roles.assign_to_user(user.id, b, None).await.unwrap();

    let effective = h
        .admin
        .guard()
        .resolver()
        .get_user_permissions_with_fallback(user.id)
        .await
        .unwrap();
    assert_eq!(effective.roles.len(), 2);
    assert_eq!(effective.permissions.len(), 2);
    let user_read = effective
        .permissions
        .iter()
        .filter(|p| p.resource == Resource::User && p.action == Action::Read)
        .count();
    assert_eq!(user_read, 1);
}

#[tokio::test]
async fn role_membership_over_effective_roles() {
    let h = seeded().await;
    let user = h.user_with_role("idp|staff", "ADMIN").await;
    let resolver = h.admin.guard().resolver();

    assert!(resolver.has_role(user.id, "ADMIN").await.unwrap());
    assert!(!resolver.has_role(user.id, "GUEST").await.unwrap());
    assert!(resolver
        .has_any_role(user.id, &["SUPER_ADMIN", "ADMIN"])
        .await
        .unwrap());
    assert!(!resolver
        .has_all_roles(user.id, &["SUPER_ADMIN", "ADMIN"])
        .await
        .unwrap());
}
