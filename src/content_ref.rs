/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// Opaque, non-empty, immutable content-addressed reference (spec.md §3.1).
/// In production this is a hex digest; the core treats it as an opaque byte
/// string and never parses it.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(raw: impl Into<String>) -> Result<Self, LookupError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(LookupError::InvalidArgument);
        }
        Ok(ContentRef(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContentRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(Err(LookupError::InvalidArgument), ContentRef::new(""));
    }

    #[test]
    fn test_new_accepts_nonempty() {
        assert_eq!("abc123", ContentRef::new("abc123").unwrap().as_str());
    }

    #[test]
    fn test_equality_is_bytewise() {
        assert_eq!(ContentRef::new("r1").unwrap(), ContentRef::new("r1").unwrap());
        assert_ne!(ContentRef::new("r1").unwrap(), ContentRef::new("r2").unwrap());
    }
}
