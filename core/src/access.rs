//! Role checks, performed before any state is touched.

use crate::error::{BookingError, Result};
use crate::types::{Caller, UserId};

/// Requires an admin caller.
///
/// # Errors
///
/// Returns [`BookingError::Unauthorized`] naming `action` for non-admins.
pub fn ensure_admin(caller: &Caller, action: &str) -> Result<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(BookingError::Unauthorized(format!(
            "only admins may {action}"
        )))
    }
}

/// Requires the caller to be `owner` or an admin.
///
/// # Errors
///
/// Returns [`BookingError::Unauthorized`] otherwise.
pub fn ensure_owner_or_admin(caller: &Caller, owner: UserId) -> Result<()> {
    if caller.is_admin() || caller.user_id == owner {
        Ok(())
    } else {
        Err(BookingError::Unauthorized(
            "resource belongs to another user".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_admin_checks() {
        let admin = Caller::new(UserId::new(), Role::Admin);
        let client = Caller::new(UserId::new(), Role::Client);

        assert!(ensure_admin(&admin, "approve bookings").is_ok());
        assert_eq!(
            ensure_admin(&client, "approve bookings"),
            Err(BookingError::Unauthorized("only admins may approve bookings".into()))
        );
    }

    #[test]
    fn test_owner_checks() {
        let owner = UserId::new();
        let client = Caller::new(owner, Role::Client);
        let stranger = Caller::new(UserId::new(), Role::Client);
        let admin = Caller::new(UserId::new(), Role::Admin);

        assert!(ensure_owner_or_admin(&client, owner).is_ok());
        assert!(ensure_owner_or_admin(&admin, owner).is_ok());
        assert!(ensure_owner_or_admin(&stranger, owner).is_err());
    }
}
