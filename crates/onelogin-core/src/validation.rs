use crate::error::{CoreError, Result};

/// Checks that `value` is a member of `allowed`.
///
/// The error message lists the allowed values verbatim:
/// `match must be one of [all any], got: some`.
pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(CoreError::InvalidEnumValue {
        field: field.to_string(),
        allowed: format_allowed(allowed),
        value: value.to_string(),
    })
}

/// Renders an allowed-value list as `[a b c]`.
pub fn format_allowed(allowed: &[&str]) -> String {
    format!("[{}]", allowed.join(" "))
}

/// Rule match types shared by app rules and user mappings.
pub const MATCH_TYPES: &[&str] = &["all", "any"];

pub const SMARTHOOK_TYPES: &[&str] = &["pre-authentication", "user-migration"];

/// Signature algorithms accepted for SAML apps, as the API spells them.
pub const SIGNATURE_ALGORITHMS: &[&str] = &["SHA-1", "SHA-256", "SHA-348", "SHA-512"];

/// `0` is blacklist, `1` is whitelist.
pub const DOMAIN_LIST_STRATEGIES: &[&str] = &["0", "1"];

pub const EMAIL_VERIFICATION_TYPES: &[&str] = &["Email MagicLink", "Email OTP"];
