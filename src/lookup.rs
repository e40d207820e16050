/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::any::Any;
use std::sync::Arc;

use log::{debug, trace};

use crate::{
    cache::{CacheLookup, KvsCache, NodeBody},
    content_ref::ContentRef,
    dirent::{Dirent, DirectoryVal},
    error::{LookupError, EAGAIN},
    pathname::PathName,
    walk::{WalkFrame, WalkStack, SYMLINK_CYCLE_LIMIT},
};

/// Bit values for [`LookupFlags`] (spec.md §6.3).
pub const READDIR: u8 = 1 << 0;
pub const READLINK: u8 = 1 << 1;
pub const TREEOBJ: u8 = 1 << 2;

/// Bitset of `{READDIR, READLINK, TREEOBJ}` modifying terminal handling
/// (spec.md §3.5, §4.5.1, §6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LookupFlags(u8);

impl LookupFlags {
    pub fn new(bits: u8) -> Self {
        LookupFlags(bits)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn readdir(&self) -> bool {
        self.0 & READDIR != 0
    }

    pub fn readlink(&self) -> bool {
        self.0 & READLINK != 0
    }

    pub fn treeobj(&self) -> bool {
        self.0 & TREEOBJ != 0
    }
}

/// Explicit enum-state driver (spec.md §4.5.2, §9 "restartable state
/// machine"). Avoids coroutines deliberately: the suspension points are few
/// and the explicit state is directly testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupState {
    Init,
    CheckRoot,
    Walk,
    Value,
    Finished,
}

/// Outcome of one [`LookupHandle::drive`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveOutcome {
    /// The handle has reached `Finished`; inspect `value()`/`error()`.
    Complete,
    /// The walk needs `missing_ref` loaded into the cache before the next
    /// drive can make progress.
    Stalled { missing_ref: ContentRef },
}

/// The value a finished, successful lookup carries, tagged by which
/// terminal-handling rule of spec.md §4.5.1 produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupValue {
    /// `TREEOBJ`, or the root shorthand with `TREEOBJ`: the raw dirent.
    Dirent(Dirent),
    /// `READDIR`: a directory listing, copied out of the cache.
    Directory(DirectoryVal),
    /// Default terminal handling of a file: its value.
    File(serde_json::Value),
    /// `READLINK`: the unfollowed link's target path.
    Link(PathName),
}

enum WalkOutcome {
    Stall(ContentRef),
    Error(LookupError),
    /// Walk could not resolve the path but this is not necessarily an
    /// error — let the caller interpret absence (spec.md §4.5.3).
    Absent,
    Done(Dirent),
}

/// Externally held lookup handle (spec.md §3.5, §4.6). Single-shot: once
/// `Finished` it does not re-drive.
///
/// Grounded on `examples/original_source/src/modules/kvs/lookup.c`'s
/// `lookup_t`/`lookup()`, re-architected per spec.md §9: the C version uses
/// a magic-number tag to validate the handle pointer and a `zlist_t` of
/// `walk_level_t` frames holding borrowed JSON pointers into the cache. In
/// Rust, the type system replaces the magic-number validation (there is no
/// way to construct an invalid `LookupHandle`), and [`WalkStack`] owns its
/// frames by value so a directory fetched from the cache is copied into the
/// frame rather than aliasing cache-internal storage (spec.md §5, resource
/// policy).
pub struct LookupHandle {
    cache: Arc<dyn KvsCache>,
    epoch: u64,
    root_dir: ContentRef,
    root_ref: ContentRef,
    path: PathName,
    flags: LookupFlags,
    aux: Option<Box<dyn Any + Send>>,

    state: LookupState,
    stack: Option<WalkStack>,
    wdirent: Option<Dirent>,
    val: Option<LookupValue>,
    missing_ref: Option<ContentRef>,
    errnum: Option<LookupError>,
}

impl LookupHandle {
    /// Creates a handle. `root_ref` defaults to `root_dir` when absent
    /// (spec.md §3.5).
    pub fn create(
        cache: Arc<dyn KvsCache>,
        epoch: u64,
        root_dir: ContentRef,
        root_ref: Option<ContentRef>,
        path: PathName,
        flags_bits: u8,
    ) -> Result<LookupHandle, LookupError> {
        if path.as_ref().is_empty() {
            return Err(LookupError::InvalidArgument);
        }
        let root_ref = root_ref.unwrap_or_else(|| root_dir.clone());
        Ok(LookupHandle {
            cache,
            epoch,
            root_dir,
            root_ref,
            path,
            flags: LookupFlags::new(flags_bits),
            aux: None,
            state: LookupState::Init,
            stack: None,
            wdirent: None,
            val: None,
            missing_ref: None,
            errnum: None,
        })
    }

    fn finish(&mut self) {
        self.state = LookupState::Finished;
        self.missing_ref = None;
        debug!(
            "lookup '{}' finished: errnum={:?}",
            self.path,
            self.errnum.as_ref().map(LookupError::code)
        );
    }

    /// Drives the state machine one step further (spec.md §4.5.2, §4.6).
    /// Never blocks: a cache miss is reported as `Stalled`, never awaited.
    pub fn drive(&mut self) -> DriveOutcome {
        loop {
            match self.state {
                LookupState::Init => {
                    debug!("lookup '{}': init", self.path);
                    if self.path.is_root_shorthand() {
                        self.state = LookupState::CheckRoot;
                    } else {
                        let root_dirent = Dirent::DirRef(self.root_ref.clone());
                        self.stack = Some(WalkStack::new(WalkFrame::new(&self.path, 0, root_dirent)));
                        self.state = LookupState::Walk;
                    }
                }
                LookupState::CheckRoot => {
                    if self.flags.treeobj() {
                        self.val = Some(LookupValue::Dirent(Dirent::DirRef(self.root_dir.clone())));
                        self.finish();
                        return DriveOutcome::Complete;
                    }
                    if !self.flags.readdir() {
                        self.errnum = Some(LookupError::IsDir(self.path.clone()));
                        self.finish();
                        return DriveOutcome::Complete;
                    }
                    match self.cache.lookup(&self.root_ref, self.epoch) {
                        CacheLookup::Hit(NodeBody::Dir(dir)) => {
                            self.val = Some(LookupValue::Directory(dir));
                            self.finish();
                            return DriveOutcome::Complete;
                        }
                        CacheLookup::Hit(NodeBody::File(_)) => {
                            self.errnum = Some(LookupError::Corrupt(self.path.clone()));
                            self.finish();
                            return DriveOutcome::Complete;
                        }
                        CacheLookup::Miss => {
                            self.missing_ref = Some(self.root_ref.clone());
                            return DriveOutcome::Stalled {
                                missing_ref: self.root_ref.clone(),
                            };
                        }
                    }
                }
                LookupState::Walk => match self.walk_step() {
                    WalkOutcome::Stall(r) => {
                        self.missing_ref = Some(r.clone());
                        return DriveOutcome::Stalled { missing_ref: r };
                    }
                    WalkOutcome::Error(e) => {
                        self.errnum = Some(e);
                        self.finish();
                        return DriveOutcome::Complete;
                    }
                    WalkOutcome::Absent => {
                        self.finish();
                        return DriveOutcome::Complete;
                    }
                    WalkOutcome::Done(dirent) => {
                        self.wdirent = Some(dirent);
                        self.state = LookupState::Value;
                    }
                },
                LookupState::Value => {
                    if let Some(outcome) = self.apply_terminal_flags() {
                        return outcome;
                    }
                }
                LookupState::Finished => return DriveOutcome::Complete,
            }
        }
    }

    /// Walk algorithm (spec.md §4.5.3). Returns as soon as it can no longer
    /// make progress without a fetch, hits an error, or resolves to a
    /// terminal dirent.
    fn walk_step(&mut self) -> WalkOutcome {
        loop {
            let stack = self.stack.as_mut().expect("walk stack initialized before Walk state");
            if stack.top().components.is_empty() {
                return WalkOutcome::Done(stack.top().dirent.clone());
            }
            let pathcomp = stack.top().components.front().cloned().expect("checked non-empty above");
            trace!("walk '{}': component '{}'", self.path, pathcomp);

            // Step 2: resolve a directory mapping from the dirent in hand.
            let dir: DirectoryVal = match stack.top().dirent.clone() {
                Dirent::DirRef(r) => match self.cache.lookup(&r, self.epoch) {
                    CacheLookup::Hit(NodeBody::Dir(d)) => d,
                    CacheLookup::Hit(NodeBody::File(_)) => {
                        return WalkOutcome::Error(LookupError::Corrupt(self.path.clone()));
                    }
                    CacheLookup::Miss => return WalkOutcome::Stall(r),
                },
                Dirent::DirVal(d) => d,
                Dirent::FileRef(_) | Dirent::FileVal(_) => {
                    // a non-directory reached with components remaining;
                    // don't return ENOENT/ENOTDIR here, caller decides.
                    return WalkOutcome::Absent;
                }
                Dirent::LinkVal(_) => {
                    // unreachable for a well-formed walk: a LinkVal only
                    // ever sits in `dirent` right after step 4's
                    // assignment, and is resolved (followed or left as a
                    // terminal) before the next directory-resolution step.
                    return WalkOutcome::Error(LookupError::UnknownDirent(self.path.clone()));
                }
            };

            // Step 3: look up the component in the directory.
            let child = match dir.get(&pathcomp) {
                Some(c) => c.clone(),
                None => return WalkOutcome::Absent,
            };

            // Step 4: descend.
            let stack = self.stack.as_mut().unwrap();
            stack.top_mut().dirent = child.clone();

            // Step 5: resolve a link.
            if let Dirent::LinkVal(target) = &child {
                let is_last = stack.top().is_last();
                let follow = !is_last || (!self.flags.readlink() && !self.flags.treeobj());
                if follow {
                    let depth = stack.top().depth;
                    if depth == SYMLINK_CYCLE_LIMIT {
                        return WalkOutcome::Error(LookupError::Loop(self.path.clone()));
                    }
                    let root_dirent = Dirent::DirRef(self.root_ref.clone());
                    stack.push(WalkFrame::new(target, depth + 1, root_dirent));
                    continue; // defer consuming pathcomp until unwind
                }
                // else: fall through to unwind/consume below, unresolved.
            }

            // Step 6: unwind a link-terminated descent back to its origin.
            let stack = self.stack.as_mut().unwrap();
            if stack.top().is_last() && stack.top().depth > 0 {
                loop {
                    let finished = stack.pop();
                    let parent = stack.top_mut();
                    parent.dirent = finished.dirent;
                    if !(parent.depth > 0 && parent.is_last()) {
                        break;
                    }
                }
            }

            // Step 7: consume the component and loop.
            self.stack.as_mut().unwrap().top_mut().components.pop_front();
        }
    }

    /// Applies the flag matrix to `wdirent` (spec.md §4.5.1). Returns
    /// `Some` when the drive should return to its caller (either stalled
    /// on a terminal fetch or finished); `None` means this call fully
    /// resolved in-place and the outer loop should continue (never actually
    /// happens here since every branch finishes or stalls, kept as an
    /// `Option` for symmetry with the other state handlers).
    fn apply_terminal_flags(&mut self) -> Option<DriveOutcome> {
        let wdirent = self.wdirent.clone().expect("Value state requires wdirent");

        if self.flags.treeobj() {
            self.val = Some(LookupValue::Dirent(wdirent));
            self.finish();
            return Some(DriveOutcome::Complete);
        }

        match wdirent {
            Dirent::DirRef(r) => {
                if self.flags.readlink() {
                    self.errnum = Some(LookupError::InvalidArgument);
                    self.finish();
                    return Some(DriveOutcome::Complete);
                }
                if !self.flags.readdir() {
                    self.errnum = Some(LookupError::IsDir(self.path.clone()));
                    self.finish();
                    return Some(DriveOutcome::Complete);
                }
                match self.cache.lookup(&r, self.epoch) {
                    CacheLookup::Hit(NodeBody::Dir(d)) => {
                        self.val = Some(LookupValue::Directory(d));
                        self.finish();
                        Some(DriveOutcome::Complete)
                    }
                    CacheLookup::Hit(NodeBody::File(_)) => {
                        self.errnum = Some(LookupError::Corrupt(self.path.clone()));
                        self.finish();
                        Some(DriveOutcome::Complete)
                    }
                    CacheLookup::Miss => {
                        self.missing_ref = Some(r.clone());
                        Some(DriveOutcome::Stalled { missing_ref: r })
                    }
                }
            }
            Dirent::DirVal(d) => {
                if self.flags.readlink() {
                    self.errnum = Some(LookupError::InvalidArgument);
                } else if !self.flags.readdir() {
                    self.errnum = Some(LookupError::IsDir(self.path.clone()));
                } else {
                    self.val = Some(LookupValue::Directory(d));
                }
                self.finish();
                Some(DriveOutcome::Complete)
            }
            Dirent::FileRef(r) => {
                if self.flags.readlink() {
                    self.errnum = Some(LookupError::InvalidArgument);
                    self.finish();
                    return Some(DriveOutcome::Complete);
                }
                if self.flags.readdir() {
                    self.errnum = Some(LookupError::NotDir(self.path.clone()));
                    self.finish();
                    return Some(DriveOutcome::Complete);
                }
                match self.cache.lookup(&r, self.epoch) {
                    CacheLookup::Hit(NodeBody::File(v)) => {
                        self.val = Some(LookupValue::File(v));
                        self.finish();
                        Some(DriveOutcome::Complete)
                    }
                    CacheLookup::Hit(NodeBody::Dir(_)) => {
                        self.errnum = Some(LookupError::Corrupt(self.path.clone()));
                        self.finish();
                        Some(DriveOutcome::Complete)
                    }
                    CacheLookup::Miss => {
                        self.missing_ref = Some(r.clone());
                        Some(DriveOutcome::Stalled { missing_ref: r })
                    }
                }
            }
            Dirent::FileVal(v) => {
                if self.flags.readlink() {
                    self.errnum = Some(LookupError::InvalidArgument);
                } else if self.flags.readdir() {
                    self.errnum = Some(LookupError::NotDir(self.path.clone()));
                } else {
                    self.val = Some(LookupValue::File(v));
                }
                self.finish();
                Some(DriveOutcome::Complete)
            }
            Dirent::LinkVal(target) => {
                // Reaching here with neither READLINK nor TREEOBJ set would
                // mean the walk left a link unfollowed without being asked
                // to — a protocol violation we treat defensively rather
                // than silently following it this late.
                if !self.flags.readlink() {
                    self.errnum = Some(LookupError::Corrupt(self.path.clone()));
                } else if self.flags.readdir() {
                    self.errnum = Some(LookupError::NotDir(self.path.clone()));
                } else {
                    self.val = Some(LookupValue::Link(target));
                }
                self.finish();
                Some(DriveOutcome::Complete)
            }
        }
    }

    /// Non-null only when `Finished` with no error (spec.md §4.6).
    pub fn value(&self) -> Option<&LookupValue> {
        if self.state == LookupState::Finished && self.errnum.is_none() {
            self.val.as_ref()
        } else {
            None
        }
    }

    /// Non-null only in `{CheckRoot, Walk, Value}` after a stalled drive
    /// (spec.md §4.6).
    pub fn missing_ref(&self) -> Option<&ContentRef> {
        match self.state {
            LookupState::CheckRoot | LookupState::Walk | LookupState::Value => {
                self.missing_ref.as_ref()
            }
            _ => None,
        }
    }

    /// `Finished` returns the stored error (`None` on success); any other
    /// state returns `None` too — use [`LookupHandle::errnum_code`] for the
    /// `EAGAIN`-while-stalled semantics of spec.md §6.4/§7.
    pub fn error(&self) -> Option<&LookupError> {
        if self.state == LookupState::Finished {
            self.errnum.as_ref()
        } else {
            None
        }
    }

    /// Numeric code matching spec.md §4.6/§6.4: `0` on success, the error's
    /// `.code()` when finished with an error, `EAGAIN` while stalled, and
    /// `EINVAL` for a handle that has not yet been driven at all — `Init`
    /// falls through to the "invalid handle" case exactly as
    /// `lookup_get_errnum` does, not the stall case.
    pub fn errnum_code(&self) -> i32 {
        match self.state {
            LookupState::Finished => self.errnum.as_ref().map_or(0, LookupError::code),
            LookupState::CheckRoot | LookupState::Walk | LookupState::Value => EAGAIN,
            LookupState::Init => LookupError::InvalidArgument.code(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == LookupState::Finished
    }

    pub fn cache(&self) -> &Arc<dyn KvsCache> {
        &self.cache
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn set_epoch(&mut self, epoch: u64) {
        self.epoch = epoch;
    }

    pub fn root_dir(&self) -> &ContentRef {
        &self.root_dir
    }

    pub fn root_ref(&self) -> &ContentRef {
        &self.root_ref
    }

    pub fn path(&self) -> &PathName {
        &self.path
    }

    pub fn flags(&self) -> LookupFlags {
        self.flags
    }

    pub fn aux(&self) -> Option<&(dyn Any + Send)> {
        self.aux.as_deref()
    }

    pub fn set_aux(&mut self, aux: Box<dyn Any + Send>) {
        self.aux = Some(aux);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;

    fn r(s: &str) -> ContentRef {
        ContentRef::new(s).unwrap()
    }

    fn dir(entries: &[(&str, Dirent)]) -> NodeBody {
        NodeBody::Dir(entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    fn make_handle(
        cache: Arc<InMemoryCache>,
        root_ref: &str,
        path: &str,
        flags: u8,
    ) -> LookupHandle {
        LookupHandle::create(cache, 0, r(root_ref), None, path.into(), flags).unwrap()
    }

    /// S1 — simple hit.
    #[test]
    fn test_simple_hit() {
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(r("R0"), dir(&[("a", Dirent::DirRef(r("R1")))]));
        cache.insert(r("R1"), dir(&[("b", Dirent::FileVal(serde_json::json!("hello")))]));
        let mut h = make_handle(cache, "R0", "a.b", 0);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupValue::File(serde_json::json!("hello"))), h.value());
    }

    /// S2 — stall then resume.
    #[test]
    fn test_stall_then_resume() {
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(r("R0"), dir(&[("a", Dirent::DirRef(r("R1")))]));
        let mut h = make_handle(cache.clone(), "R0", "a.b", 0);
        match h.drive() {
            DriveOutcome::Stalled { missing_ref } => assert_eq!(r("R1"), missing_ref),
            other => panic!("expected stall, got {:?}", other),
        }
        assert_eq!(Some(&r("R1")), h.missing_ref());
        assert_eq!(EAGAIN, h.errnum_code());
        cache.insert(r("R1"), dir(&[("b", Dirent::FileVal(serde_json::json!("hello")))]));
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupValue::File(serde_json::json!("hello"))), h.value());
    }

    /// S3 — link follow.
    #[test]
    fn test_link_follow() {
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(
            r("R0"),
            dir(&[
                ("a", Dirent::LinkVal("b.c".into())),
                ("b", Dirent::DirRef(r("R1"))),
            ]),
        );
        cache.insert(r("R1"), dir(&[("c", Dirent::FileVal(serde_json::json!(42)))]));
        let mut h = make_handle(cache, "R0", "a", 0);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupValue::File(serde_json::json!(42))), h.value());
    }

    /// S4 — link end with READLINK.
    #[test]
    fn test_link_end_readlink() {
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(
            r("R0"),
            dir(&[
                ("a", Dirent::LinkVal("b.c".into())),
                ("b", Dirent::DirRef(r("R1"))),
            ]),
        );
        cache.insert(r("R1"), dir(&[("c", Dirent::FileVal(serde_json::json!(42)))]));
        let mut h = make_handle(cache, "R0", "a", READLINK);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupValue::Link("b.c".into())), h.value());
    }

    /// S5 — cycle.
    #[test]
    fn test_cycle() {
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(r("R0"), dir(&[("x", Dirent::LinkVal("x".into()))]));
        let mut h = make_handle(cache, "R0", "x", 0);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupError::Loop("x".into())), h.error());
    }

    /// S6 — directory asked as file, then as READDIR.
    #[test]
    fn test_dir_as_file_then_readdir() {
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(r("R0"), dir(&[("d", Dirent::DirRef(r("R1")))]));
        cache.insert(r("R1"), NodeBody::Dir(DirectoryVal::new()));

        let mut h = make_handle(cache.clone(), "R0", "d", 0);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupError::IsDir("d".into())), h.error());

        let mut h = make_handle(cache, "R0", "d", READDIR);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupValue::Directory(DirectoryVal::new())), h.value());
    }

    /// Root shorthand law (spec.md §8.2).
    #[test]
    fn test_root_shorthand_treeobj() {
        let cache = Arc::new(InMemoryCache::new());
        let mut h = make_handle(cache, "R0", ".", TREEOBJ);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupValue::Dirent(Dirent::DirRef(r("R0")))), h.value());
    }

    #[test]
    fn test_root_shorthand_default_is_eisdir() {
        let cache = Arc::new(InMemoryCache::new());
        let mut h = make_handle(cache, "R0", ".", 0);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupError::IsDir(".".into())), h.error());
    }

    #[test]
    fn test_root_shorthand_readdir_stalls_then_completes() {
        let cache = Arc::new(InMemoryCache::new());
        let mut h = make_handle(cache.clone(), "R0", ".", READDIR);
        assert!(matches!(h.drive(), DriveOutcome::Stalled { .. }));
        cache.insert(r("R0"), dir(&[("a", Dirent::FileVal(serde_json::json!(1)))]));
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert!(matches!(h.value(), Some(LookupValue::Directory(_))));
    }

    #[test]
    fn test_absent_path_is_not_an_error() {
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(r("R0"), NodeBody::Dir(DirectoryVal::new()));
        let mut h = make_handle(cache, "R0", "missing", 0);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(None, h.error());
        assert_eq!(None, h.value());
    }

    #[test]
    fn test_readlink_readdir_combo_on_file_is_einval() {
        // spec.md §4.5.1: READLINK takes priority over READDIR on any
        // non-link terminal, matching the original source exactly.
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(r("R0"), dir(&[("f", Dirent::FileVal(serde_json::json!(1)))]));
        let mut h = make_handle(cache, "R0", "f", READLINK | READDIR);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupError::InvalidArgument), h.error());
    }

    #[test]
    fn test_drive_after_finished_is_idempotent() {
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(r("R0"), dir(&[("a", Dirent::FileVal(serde_json::json!(1)))]));
        let mut h = make_handle(cache, "R0", "a", 0);
        assert_eq!(DriveOutcome::Complete, h.drive());
        let v1 = h.value().cloned();
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(v1, h.value().cloned());
        assert_eq!(None, h.missing_ref());
    }

    #[test]
    fn test_create_rejects_empty_path() {
        let cache: Arc<dyn KvsCache> = Arc::new(InMemoryCache::new());
        assert_eq!(
            Err(LookupError::InvalidArgument),
            LookupHandle::create(cache, 0, r("R0"), None, "".into(), 0)
        );
    }

    #[test]
    fn test_dirval_mid_walk_resolved_symmetrically() {
        // Open Question 2 (spec.md §9): resolved to treat inline
        // directories the same as a loaded DIRREF at any depth.
        let cache = Arc::new(InMemoryCache::new());
        let mut inline = DirectoryVal::new();
        inline.insert("b".to_owned(), Dirent::FileVal(serde_json::json!("inline")));
        cache.insert(r("R0"), dir(&[("a", Dirent::DirVal(inline))]));
        let mut h = make_handle(cache, "R0", "a.b", 0);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupValue::File(serde_json::json!("inline"))), h.value());
    }

    #[test]
    fn test_cycle_bound_of_exactly_ten_resolves() {
        // A chain of exactly SYMLINK_CYCLE_LIMIT distinct links resolves
        // rather than looping (spec.md §8.2 "of length <= 10 resolves").
        let cache = Arc::new(InMemoryCache::new());
        let mut entries = vec![];
        for i in 0..10 {
            entries.push((format!("l{i}"), Dirent::LinkVal(format!("l{}", i + 1).into())));
        }
        entries.push(("l10".to_owned(), Dirent::FileVal(serde_json::json!("end"))));
        let d: DirectoryVal = entries.into_iter().collect();
        cache.insert(r("R0"), NodeBody::Dir(d));
        let mut h = make_handle(cache, "R0", "l0", 0);
        assert_eq!(DriveOutcome::Complete, h.drive());
        assert_eq!(Some(&LookupValue::File(serde_json::json!("end"))), h.value());
    }

    #[test]
    fn test_errnum_code_before_first_drive_is_einval() {
        // spec.md §4.6: "invalid handle returns EINVAL", and
        // `lookup_get_errnum` falls through to EINVAL for any state other
        // than CHECK_ROOT/WALK/VALUE/FINISHED — not EAGAIN.
        let cache = Arc::new(InMemoryCache::new());
        let h = make_handle(cache, "R0", "a", 0);
        assert_eq!(LookupError::InvalidArgument.code(), h.errnum_code());
    }
}
