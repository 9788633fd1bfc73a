//! Key name validation.
//!
//! Keys double as file names in [`FileKvStore`](crate::FileKvStore), so they
//! are restricted to a portable character set.

use crate::error::{KvError, KvResult};

/// Longest accepted key, in bytes.
pub const MAX_KEY_LEN: usize = 128;

/// Validate a storage key.
///
/// Rules:
/// - Must not be empty or longer than [`MAX_KEY_LEN`].
/// - Only ASCII letters, digits, `_`, `-` and `.` are allowed.
/// - Must not start with `.` (no hidden files, no `..`).
pub fn validate_key(key: &str) -> KvResult<()> {
    let invalid = |reason: &str| KvError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(invalid(&format!("must be at most {MAX_KEY_LEN} bytes")));
    }
    if key.starts_with('.') {
        return Err(invalid("must not start with '.'"));
    }
    if let Some(ch) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(invalid(&format!("forbidden character {ch:?}")));
    }

    Ok(())
}
