/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{content_ref::ContentRef, pathname::Name, pathname::PathName};

/// A directory entry / node descriptor (spec.md §3.2). Exactly one of five
/// shapes, matching the wire schema of §6.2: a dirent object has exactly one
/// of the keys `DIRREF`, `DIRVAL`, `FILEREF`, `FILEVAL`, `LINKVAL`. Serde's
/// externally-tagged enum representation already produces and expects this
/// exact shape, so a dirent object carrying more than one of those keys (or
/// none) fails to deserialize — the "multi-tagged dirent" protocol
/// violation of §3.2 is rejected at the wire boundary, not re-checked by
/// the walk logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dirent {
    /// Child directory, fetched by reference.
    DirRef(ContentRef),
    /// Child directory, embedded inline.
    DirVal(DirectoryVal),
    /// File contents, fetched by reference.
    FileRef(ContentRef),
    /// File contents, embedded inline.
    FileVal(serde_json::Value),
    /// Symbolic link target, a dotted path.
    LinkVal(PathName),
}

/// A directory: a mapping from component name to dirent (spec.md §3.3).
/// Component names are non-empty and `.`-free by construction in a
/// well-formed tree; the core does not re-validate this on read, matching
/// the "the fetcher returns normalized directories" invariant.
pub type DirectoryVal = BTreeMap<Name, Dirent>;

impl Dirent {
    pub fn is_dir(&self) -> bool {
        matches!(self, Dirent::DirRef(_) | Dirent::DirVal(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Dirent::FileRef(_) | Dirent::FileVal(_))
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Dirent::LinkVal(_))
    }
}
