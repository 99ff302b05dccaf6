//! Identity bridge: external subject to local user id.

use tollgate_core::error::{TollgateError, TollgateResult};
use tollgate_core::repository::UserRepository;
use uuid::Uuid;

/// Maps the subject id supplied by the upstream identity provider onto the
/// local user record. Every call reads the store.
#[derive(Clone)]
pub struct IdentityBridge<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> IdentityBridge<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// `Ok(None)` means the subject is authenticated but has no local
    /// user, which callers must keep distinct from a missing subject.
    pub async fn resolve_local_user_id(&self, subject: &str) -> TollgateResult<Option<Uuid>> {
        match self.users.get_by_external_id(subject).await {
            Ok(user) => Ok(Some(user.id)),
            Err(TollgateError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
