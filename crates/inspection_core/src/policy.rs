//! crates/inspection_core/src/policy.rs
//!
//! The authorization decision table. Pure functions only: the caller resolves
//! roles and owners, this module decides.

use uuid::Uuid;

use crate::domain::Role;
use crate::error::AuthError;

/// Every operation that goes through an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListOwnSubmissions,
    ListAllSubmissions,
    EditSubmission,
    DeleteSubmission,
    UpdateStatus,
}

impl Operation {
    /// Whether owning the target submission is enough on its own.
    pub fn ownership_grants(&self) -> bool {
        matches!(self, Operation::EditSubmission | Operation::DeleteSubmission)
    }
}

/// Whether the caller is allowed through on ownership alone, without a role lookup.
pub fn granted_by_ownership(op: Operation, caller_id: Uuid, owner_id: Option<Uuid>) -> bool {
    op.ownership_grants() && owner_id == Some(caller_id)
}

/// Decides whether `caller_id` may perform `op`.
///
/// `caller_role` is the role freshly read from the store; `None` means the caller
/// no longer exists there and is treated as holding no role at all. `owner_id`
/// is the owner of the targeted submission, if the operation targets one.
pub fn authorize(
    op: Operation,
    caller_id: Uuid,
    caller_role: Option<Role>,
    owner_id: Option<Uuid>,
) -> Result<(), AuthError> {
    let is_ahli = caller_role == Some(Role::Ahli);
    let allowed = match op {
        Operation::ListOwnSubmissions => true,
        Operation::ListAllSubmissions | Operation::UpdateStatus => is_ahli,
        Operation::EditSubmission | Operation::DeleteSubmission => {
            granted_by_ownership(op, caller_id, owner_id) || is_ahli
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyone_may_list_their_own() {
        let caller = Uuid::new_v4();
        for role in [None, Some(Role::User), Some(Role::Ahli)] {
            assert_eq!(authorize(Operation::ListOwnSubmissions, caller, role, None), Ok(()));
        }
    }

    #[test]
    fn only_ahli_lists_everything() {
        let caller = Uuid::new_v4();
        assert_eq!(
            authorize(Operation::ListAllSubmissions, caller, Some(Role::Ahli), None),
            Ok(())
        );
        assert_eq!(
            authorize(Operation::ListAllSubmissions, caller, Some(Role::User), None),
            Err(AuthError::Forbidden)
        );
        assert_eq!(
            authorize(Operation::ListAllSubmissions, caller, None, None),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn owner_or_ahli_may_edit_and_delete() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        for op in [Operation::EditSubmission, Operation::DeleteSubmission] {
            assert_eq!(authorize(op, owner, Some(Role::User), Some(owner)), Ok(()));
            assert_eq!(authorize(op, owner, None, Some(owner)), Ok(()));
            assert_eq!(authorize(op, stranger, Some(Role::Ahli), Some(owner)), Ok(()));
            assert_eq!(
                authorize(op, stranger, Some(Role::User), Some(owner)),
                Err(AuthError::Forbidden)
            );
        }
    }

    #[test]
    fn ownership_never_grants_status_updates() {
        let owner = Uuid::new_v4();
        assert!(!granted_by_ownership(Operation::UpdateStatus, owner, Some(owner)));
        assert_eq!(
            authorize(Operation::UpdateStatus, owner, Some(Role::User), Some(owner)),
            Err(AuthError::Forbidden)
        );
        assert_eq!(
            authorize(Operation::UpdateStatus, owner, Some(Role::Ahli), Some(owner)),
            Ok(())
        );
    }
}
