//! Integration tests for the authorization guard.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use tollgate_authz::RequestContext;
use tollgate_core::error::TollgateError;
use tollgate_core::models::action::Action;
use tollgate_core::models::resource::Resource;
use tollgate_core::repository::RoleRepository;

use common::{as_subject, seeded};

#[tokio::test]
async fn guest_reads_courses_then_creates_after_admin_assignment() {
    let h = seeded().await;
    let u1 = h.user("idp|u1", None).await;
    let granter = h.user_with_role("idp|root", "SUPER_ADMIN").await;
    let guard = h.admin.guard();
    let calls = AtomicUsize::new(0);
    let request = as_subject(&u1);

    let handler = |ctx: tollgate_authz::RbacContext| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, TollgateError>(ctx.user_id) }
    };

    let read = guard.protect_api_route(Resource::Course, Action::Read, handler);
    assert_eq!(read.call(&request).await.unwrap(), u1.id);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let create = guard.protect_api_route(Resource::Course, Action::Create, handler);
    let denied = create.call(&request).await;
    assert!(matches!(denied, Err(TollgateError::Forbidden { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "handler must not run");

    let admin_role = h.role_id("ADMIN").await;
    h.roles
        .assign_to_user(u1.id, admin_role, Some(granter.id))
        .await
        .unwrap();

    assert_eq!(create.call(&request).await.unwrap(), u1.id);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_subject_is_unauthenticated() {
    let h = seeded().await;
    let calls = AtomicUsize::new(0);
    let route = h
        .admin
        .guard()
        .protect_api_route(Resource::Course, Action::Read, |_ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, TollgateError>(()) }
        });

    let result = route.call(&RequestContext::anonymous()).await;
    assert!(matches!(result, Err(TollgateError::Unauthenticated)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unmapped_subject_is_user_not_found() {
    let h = seeded().await;
    let result = h
        .admin
        .guard()
        .authorize(
            &RequestContext::with_subject("idp|stranger"),
            Resource::Course,
            Action::Read,
        )
        .await;
    assert!(matches!(result, Err(TollgateError::UserNotFound)));
}

#[tokio::test]
async fn handler_errors_pass_through_unchanged() {
    let h = seeded().await;
    let u1 = h.user("idp|u1", None).await;
    let route = h
        .admin
        .guard()
        .protect_api_route(Resource::Blog, Action::Read, |_ctx| async {
            Err::<(), _>(TollgateError::conflict("handler said no"))
        });

    match route.call(&as_subject(&u1)).await {
        Err(TollgateError::Conflict { message }) => assert_eq!(message, "handler said no"),
        other => panic!("expected handler conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn rbac_context_resolves_identity_only() {
    let h = seeded().await;
    let u1 = h.user("idp|u1", None).await;
    let guard = h.admin.guard();

    let ctx = guard.get_rbac_context(&as_subject(&u1)).await.unwrap();
    let ctx = ctx.expect("known subject should resolve");
    assert_eq!(ctx.user_id, u1.id);
    assert_eq!(ctx.external_id, "idp|u1");

    assert!(guard
        .get_rbac_context(&RequestContext::anonymous())
        .await
        .unwrap()
        .is_none());
    assert!(guard
        .get_rbac_context(&RequestContext::with_subject("idp|stranger"))
        .await
        .unwrap()
        .is_none());
}
