/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use thiserror::Error;

use crate::pathname::PathName;

/// Terminal errors a lookup can finish with (spec.md §6.4/§7).
///
/// `EAGAIN` (stall) is deliberately not a variant here: a stall is a control
/// signal reported through [`crate::lookup::DriveOutcome::Stalled`], not a
/// failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("'{0}' is a directory")]
    IsDir(PathName),
    #[error("'{0}' is not a directory")]
    NotDir(PathName),
    #[error("symbolic link loop resolving '{0}'")]
    Loop(PathName),
    #[error("corrupt dirent encountered resolving '{0}'")]
    Corrupt(PathName),
    #[error("unknown dirent kind encountered resolving '{0}'")]
    UnknownDirent(PathName),
}

impl LookupError {
    /// Numeric code surfaced to callers expecting the errno-style wire
    /// values of spec.md §6.4. `ENOENT` is never produced here: absence is
    /// communicated by [`crate::lookup::LookupHandle::value`] returning
    /// `None` with `error()` returning `None` as well.
    pub fn code(&self) -> i32 {
        match self {
            LookupError::InvalidArgument => libc_einval(),
            LookupError::IsDir(_) => libc_eisdir(),
            LookupError::NotDir(_) => libc_enotdir(),
            LookupError::Loop(_) => libc_eloop(),
            LookupError::Corrupt(_) => libc_eproto(),
            LookupError::UnknownDirent(_) => libc_eperm(),
        }
    }
}

// The core has no `libc` dependency (it never makes a syscall); these are
// just the well-known numeric values from <errno.h> so that `code()` stays
// wire-compatible with spec.md §6.4 without pulling in a platform crate.
const fn libc_einval() -> i32 {
    22
}
const fn libc_eisdir() -> i32 {
    21
}
const fn libc_enotdir() -> i32 {
    20
}
const fn libc_eloop() -> i32 {
    40
}
const fn libc_eperm() -> i32 {
    1
}
const fn libc_eproto() -> i32 {
    71
}

/// Returned by [`crate::lookup::LookupHandle::errnum`] while a handle is
/// stalled, mirroring the source's overloading of `EAGAIN` for "queried
/// while not finished" (spec.md §6.4, §7).
pub const EAGAIN: i32 = 11;
