//! Client-side validation of mutation payloads.
//!
//! These checks gate remote calls: a payload that fails validation never
//! produces a network round-trip.

use crate::error::{Result, ValidationError};
use crate::types::{EntityKind, NewUser};

/// Validate a user-creation payload.
///
/// Username and password are required; the display name is optional.
/// Whitespace-only usernames are rejected, matching the rename rules.
pub fn validate_new_user(new: &NewUser) -> Result<()> {
    if new.username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    if new.password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

/// Validate a name used for entity creation or rename.
///
/// Names are compared after trimming: "   " is as invalid as "".
pub fn validate_name(kind: EntityKind, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName(kind));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, password: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: password.into(),
            display_name: None,
        }
    }

    #[test]
    fn test_valid_user() {
        assert!(validate_new_user(&new_user("fschilder", "s3cret")).is_ok());
    }

    #[test]
    fn test_empty_username_rejected() {
        assert_eq!(
            validate_new_user(&new_user("", "s3cret")),
            Err(ValidationError::EmptyUsername)
        );
        assert_eq!(
            validate_new_user(&new_user("   ", "s3cret")),
            Err(ValidationError::EmptyUsername)
        );
    }

    #[test]
    fn test_empty_password_rejected() {
        assert_eq!(
            validate_new_user(&new_user("fschilder", "")),
            Err(ValidationError::EmptyPassword)
        );
    }

    #[test]
    fn test_name_trimmed() {
        assert!(validate_name(EntityKind::Role, "marketing").is_ok());
        assert_eq!(
            validate_name(EntityKind::Role, "  "),
            Err(ValidationError::EmptyName(EntityKind::Role))
        );
    }
}
