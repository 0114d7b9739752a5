//! GetMembershipHandler - Query handler for a user's current membership.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::membership::{Membership, MembershipError};
use crate::ports::MembershipRepository;

#[derive(Debug, Clone)]
pub struct GetMembershipQuery {
    pub user_id: UserId,
}

pub struct GetMembershipHandler {
    memberships: Arc<dyn MembershipRepository>,
}

impl GetMembershipHandler {
    pub fn new(memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { memberships }
    }

    pub async fn handle(&self, query: GetMembershipQuery) -> Result<Option<Membership>, MembershipError> {
        Ok(self.memberships.find_by_user_id(&query.user_id).await?)
    }
}
