/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Represents a dotted namespace path, e.g. `"a.b.c"`.
#[derive(Debug, Clone, Hash, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct PathName(String);

/// A single path component (directory/entry name). May be empty — see
/// [`PathName::components`].
pub type Name = String;

/// The literal root shorthand, handled specially by the lookup state
/// machine rather than by the tokenizer (spec.md §4.2).
pub const ROOT_SHORTHAND: &str = ".";

impl Display for PathName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PathName {
    fn from(value: &str) -> Self {
        PathName(value.to_owned())
    }
}

impl From<String> for PathName {
    fn from(value: String) -> Self {
        PathName(value)
    }
}

impl AsRef<str> for PathName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PathName {
    pub fn is_root_shorthand(&self) -> bool {
        self.0 == ROOT_SHORTHAND
    }

    /// Split into ordered components on `.`. Unlike a filesystem path, an
    /// empty component (from a leading/trailing/doubled `.`) is not
    /// filtered out: the source falls through to a key lookup for `""`,
    /// and this is preserved here (spec.md §4.2, §9 open question 1).
    pub fn components(&self) -> Vec<Name> {
        self.0.split('.').map(|s| s.to_owned()).collect()
    }
}
