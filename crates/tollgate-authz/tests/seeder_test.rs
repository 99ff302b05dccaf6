//! Integration tests for catalog seeding.

mod common;

use tollgate_authz::SeedReport;
use tollgate_core::models::action::Action;
use tollgate_core::models::resource::Resource;
use tollgate_core::repository::{PermissionRepository, RoleRepository};

use common::{Harness, setup};

/// `(permissions, roles, links)` currently in the catalog.
async fn catalog_size(h: &Harness) -> (usize, usize, usize) {
    let permissions = h.permissions.list().await.unwrap().len();
    let roles = h.roles.list().await.unwrap();
    let mut links = 0;
    for role in &roles {
        links += h.permissions.get_role_permissions(role.id).await.unwrap().len();
    }
    (permissions, roles.len(), links)
}

#[tokio::test]
async fn first_run_populates_catalog() {
    let h = setup().await;

    let report = h.admin.seeder().seed_rbac_data().await.unwrap();
    assert_eq!(
        report,
        SeedReport {
            permissions_created: 60,
            roles_created: 3,
            links_ensured: 27,
        }
    );
    assert_eq!(catalog_size(&h).await, (60, 3, 27));

    for name in ["SUPER_ADMIN", "ADMIN", "GUEST"] {
        let role = h.roles.get_by_name(name).await.unwrap();
        assert!(role.is_core, "{name} should be seeded as core");
        assert!(role.is_active);
    }

    let course_read = h
        .permissions
        .get_by_resource_action(Resource::Course, Action::Read)
        .await
        .unwrap();
    assert_eq!(course_read.name, "COURSE_READ");
}

#[tokio::test]
async fn second_run_changes_nothing() {
    let h = setup().await;
    h.admin.seeder().seed_rbac_data().await.unwrap();
    let before = catalog_size(&h).await;

    let report = h.admin.seeder().seed_rbac_data().await.unwrap();
    assert_eq!(report.permissions_created, 0);
    assert_eq!(report.roles_created, 0);
    assert_eq!(catalog_size(&h).await, before);
}

#[tokio::test]
async fn seeding_is_additive_only() {
    let h = setup().await;
    h.admin.seeder().seed_rbac_data().await.unwrap();

    let guest = h.roles.get_by_name("GUEST").await.unwrap();
    let settings_read = h
        .permissions
        .get_by_resource_action(Resource::Settings, Action::Read)
        .await
        .unwrap();
    h.permissions
        .grant_to_role(guest.id, settings_read.id)
        .await
        .unwrap();

    let blog_read = h
        .permissions
        .get_by_resource_action(Resource::Blog, Action::Read)
        .await
        .unwrap();
    h.permissions
        .revoke_from_role(guest.id, blog_read.id)
        .await
        .unwrap();

    h.admin.seeder().seed_rbac_data().await.unwrap();

    let linked: Vec<_> = h
        .permissions
        .get_role_permissions(guest.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert!(linked.contains(&settings_read.id), "extra link must survive");
    assert!(linked.contains(&blog_read.id), "default link is restored");
    assert_eq!(linked.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_cold_starts_all_succeed() {
    let h = setup().await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let seeder = h.admin.seeder().clone();
        tasks.push(tokio::spawn(async move { seeder.seed_rbac_data().await }));
    }

    let mut permissions_created = 0;
    let mut roles_created = 0;
    for task in tasks {
        let report = task
            .await
            .unwrap()
            .unwrap_or_else(|e| panic!("concurrent seed failed: {e}"));
        assert_eq!(report.links_ensured, 27);
        permissions_created += report.permissions_created;
        roles_created += report.roles_created;
    }

    assert_eq!(permissions_created, 60, "each permission is created once");
    assert_eq!(roles_created, 3, "each core role is created once");
    assert_eq!(catalog_size(&h).await, (60, 3, 27));
}
