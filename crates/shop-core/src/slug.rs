//! # Custom Referral Slug Rules
//!
//! Validation, phone verification, and rate limiting for collaborator
//! custom slugs. The database layer performs the collision lookups; every
//! rule that needs no I/O lives here.
//!
//! ## Slug Rules
//! - 4 to 20 characters
//! - Lowercase letters, digits, hyphens only
//! - No leading or trailing hyphen, no consecutive hyphens
//! - Not a reserved word (route names the storefront already owns)

use crate::error::ValidationError;

/// Slugs the system reserves for itself.
pub const RESERVED_SLUGS: &[&str] = &[
    "admin", "api", "ctv", "login", "register", "search", "results",
    "dashboard", "settings", "profile", "orders", "products", "cart",
    "checkout", "payment", "about", "contact", "help", "support",
    "terms", "privacy", "blog", "news", "shop", "store",
];

/// Maximum slug changes inside one rolling window.
pub const MAX_SLUG_CHANGES: i64 = 3;

/// Rolling rate-limit window: 365 days in seconds.
pub const SLUG_CHANGE_WINDOW_SECS: i64 = 365 * 24 * 60 * 60;

/// Validates a custom slug against the format rules and the reserved list.
///
/// ## Example
/// ```rust
/// use shop_core::slug::validate_slug;
///
/// assert!(validate_slug("mai-shop").is_ok());
/// assert!(validate_slug("ab").is_err());        // too short
/// assert!(validate_slug("ABC123").is_err());    // uppercase
/// assert!(validate_slug("-abc").is_err());      // leading hyphen
/// assert!(validate_slug("a--b").is_err());      // double hyphen
/// assert!(validate_slug("admin").is_err());     // reserved
/// ```
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(ValidationError::Required {
            field: "slug".to_string(),
        });
    }

    if slug.len() < 4 {
        return Err(ValidationError::TooShort {
            field: "slug".to_string(),
            min: 4,
        });
    }

    if slug.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "slug".to_string(),
            max: 20,
        });
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "slug".to_string(),
            reason: "only lowercase letters, digits and hyphens allowed".to_string(),
        });
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(ValidationError::InvalidFormat {
            field: "slug".to_string(),
            reason: "cannot start or end with a hyphen".to_string(),
        });
    }

    if slug.contains("--") {
        return Err(ValidationError::InvalidFormat {
            field: "slug".to_string(),
            reason: "consecutive hyphens not allowed".to_string(),
        });
    }

    if RESERVED_SLUGS.contains(&slug) {
        return Err(ValidationError::Reserved {
            field: "slug".to_string(),
            value: slug.to_string(),
        });
    }

    Ok(())
}

/// Compares two phone numbers, tolerating +84/0 prefix differences.
///
/// Matches when the trimmed strings are equal, or equal after stripping one
/// leading `0` from each side ("0912345678" matches "912345678").
pub fn phones_match(registered: &str, supplied: &str) -> bool {
    let a = registered.trim();
    let b = supplied.trim();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let strip = |p: &str| p.strip_prefix('0').map(str::to_string).unwrap_or_else(|| p.to_string());
    strip(a) == strip(b)
}

/// Whether another slug change is allowed at `now`.
///
/// At most [`MAX_SLUG_CHANGES`] changes per rolling 365 days: once the
/// counter reaches the cap, further changes are refused until the last
/// change ages out of the window (the counter then resets on the next
/// successful change).
pub fn can_change_slug(change_count: i64, last_changed_unix: Option<i64>, now: i64) -> bool {
    if change_count < MAX_SLUG_CHANGES {
        return true;
    }
    match last_changed_unix {
        Some(last) => now - last >= SLUG_CHANGE_WINDOW_SECS,
        None => true,
    }
}

/// Changes remaining after a change that sets the counter to `change_count`.
pub fn slug_changes_remaining(change_count: i64) -> i64 {
    (MAX_SLUG_CHANGES - change_count).max(0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(validate_slug("mai-shop").is_ok());
        assert!(validate_slug("shop99").is_ok());
        assert!(validate_slug("ctv9").is_ok()); // prefix of a reserved word, not reserved itself
    }

    #[test]
    fn test_slug_length_bounds() {
        assert!(validate_slug("abcd").is_ok());
        assert!(validate_slug(&"a".repeat(20)).is_ok());
        assert!(validate_slug("ab").is_err());
        assert!(validate_slug(&"a".repeat(21)).is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_slug_rejection_table() {
        // The full rejection set from the format rules
        assert!(validate_slug("ab").is_err()); // too short
        assert!(validate_slug("ABC123").is_err()); // uppercase
        assert!(validate_slug("-abc").is_err()); // leading hyphen
        assert!(validate_slug("abc-").is_err()); // trailing hyphen
        assert!(validate_slug("a--b").is_err()); // double hyphen
        assert!(validate_slug("admin").is_err()); // reserved
        assert!(validate_slug("shop").is_err()); // reserved
        assert!(validate_slug("mai shop").is_err()); // space
        assert!(validate_slug("mai_shop").is_err()); // underscore
    }

    #[test]
    fn test_phones_match() {
        assert!(phones_match("0912345678", "0912345678"));
        assert!(phones_match("0912345678", "912345678"));
        assert!(phones_match("912345678", "0912345678"));
        assert!(phones_match(" 0912345678 ", "0912345678"));
        assert!(!phones_match("0912345678", "0912345679"));
        assert!(!phones_match("", "0912345678"));
        assert!(!phones_match("0912345678", ""));
    }

    #[test]
    fn test_slug_change_rate_limit() {
        const DAY: i64 = 24 * 60 * 60;
        let now = 1_700_000_000;

        // Under the cap: always allowed
        assert!(can_change_slug(0, None, now));
        assert!(can_change_slug(2, Some(now - DAY), now));

        // At the cap inside the window: refused
        assert!(!can_change_slug(3, Some(now - 100 * DAY), now));
        assert!(!can_change_slug(5, Some(now - 364 * DAY), now));

        // Window aged out: allowed again
        assert!(can_change_slug(3, Some(now - 366 * DAY), now));
    }

    #[test]
    fn test_changes_remaining() {
        assert_eq!(slug_changes_remaining(1), 2);
        assert_eq!(slug_changes_remaining(3), 0);
        assert_eq!(slug_changes_remaining(7), 0);
    }
}
