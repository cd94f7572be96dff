//! Validation helpers for query parameters.

use uuid::Uuid;
use validator::ValidationError;

use crate::error::ServiceError;

/// Longest accepted server alias.
const MAX_ALIAS_LEN: usize = 64;
/// Longest accepted party display name, in characters.
const MAX_NAME_LEN: usize = 32;

/// Parse a required UUID query parameter, naming the parameter in the error.
///
/// # Examples
///
/// ```ignore
/// required_uuid("playerUUID", None)           // Err - "Missing parameter: playerUUID"
/// required_uuid("playerUUID", Some("nope"))   // Err - "Invalid UUID for playerUUID: ..."
/// ```
pub fn required_uuid(name: &str, raw: Option<&str>) -> Result<Uuid, ServiceError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ServiceError::InvalidInput(format!("Missing parameter: {name}")))?;

    Uuid::parse_str(raw)
        .map_err(|err| ServiceError::InvalidInput(format!("Invalid UUID for {name}: {err}")))
}

/// Validates that a server alias is 1 to 64 ASCII letters, digits, `-`, `_` or `.`.
pub fn validate_server_alias(alias: &str) -> Result<(), ValidationError> {
    if alias.is_empty() || alias.len() > MAX_ALIAS_LEN {
        let mut err = ValidationError::new("server_alias_length");
        err.message = Some(
            format!(
                "Server alias must be between 1 and {MAX_ALIAS_LEN} characters (got {})",
                alias.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        let mut err = ValidationError::new("server_alias_format");
        err.message =
            Some("Server alias may only contain letters, digits, '-', '_' and '.'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a party display name: at most 32 characters, no control characters.
pub fn validate_party_name(name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if length == 0 || length > MAX_NAME_LEN {
        let mut err = ValidationError::new("party_name_length");
        err.message = Some(
            format!("Party name must be between 1 and {MAX_NAME_LEN} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("party_name_format");
        err.message = Some("Party name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_uuid_missing() {
        let err = required_uuid("playerUUID", None).unwrap_err();
        assert_eq!(err.to_string(), "Missing parameter: playerUUID");
        assert!(required_uuid("playerUUID", Some("  ")).is_err());
    }

    #[test]
    fn test_required_uuid_malformed() {
        let err = required_uuid("partyUUID", Some("not-a-uuid")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid UUID for partyUUID"));
    }

    #[test]
    fn test_required_uuid_valid() {
        let id = Uuid::new_v4();
        assert_eq!(required_uuid("leaderUuid", Some(&id.to_string())).unwrap(), id);
    }

    #[test]
    fn test_validate_server_alias() {
        assert!(validate_server_alias("lobby").is_ok());
        assert!(validate_server_alias("survival-1.eu_west").is_ok());
        assert!(validate_server_alias("").is_err());
        assert!(validate_server_alias(&"a".repeat(65)).is_err());
        assert!(validate_server_alias("lobby 2").is_err());
        assert!(validate_server_alias("../admin").is_err());
    }

    #[test]
    fn test_validate_party_name() {
        assert!(validate_party_name("Night Raid").is_ok());
        assert!(validate_party_name("ééééé").is_ok());
        assert!(validate_party_name(&"x".repeat(33)).is_err());
        assert!(validate_party_name("tab\there").is_err());
    }
}
