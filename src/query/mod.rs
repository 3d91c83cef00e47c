//! Read-only lookups over a cleaned dataset, plus the one composite write.

pub mod lookup;
pub mod register;

pub use lookup::*;
pub use register::*;

use crate::clean::title_case;
use crate::error::{Error, Result};

pub const MAX_NAME_LEN: usize = 30;

/// Validate a user-supplied name (ASCII letters and hyphens, 1 to 30 chars)
/// and turn it into the stored form: hyphens become spaces, then title case.
pub fn normalize_name(raw: &str) -> Result<String> {
    let len = raw.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "name must be 1 to {} characters, got {}",
            MAX_NAME_LEN, len
        )));
    }
    if !raw.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        return Err(Error::Validation(format!(
            "name may only contain letters and hyphens: {:?}",
            raw
        )));
    }
    if !raw.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(Error::Validation(format!("name has no letters: {:?}", raw)));
    }

    Ok(title_case(&raw.replace('-', " ")))
}
