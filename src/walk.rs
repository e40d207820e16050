/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::VecDeque;

use crate::{content_ref::ContentRef, dirent::Dirent, pathname::Name, pathname::PathName};

/// Symlink recursion depth bound (spec.md §3.4). A depth bound, not a
/// distinct-target check: ten nested follows trip it regardless of whether
/// any target repeats (spec.md §4.5.3 edge cases).
pub const SYMLINK_CYCLE_LIMIT: u8 = 10;

/// One entry of the walk stack (spec.md §3.4). Grounded on
/// `diffuzzer/src/abstract_fs/fs.rs`'s `resolve_node_rec`, which threads
/// equivalent state (remaining segments, current node, recursion depth)
/// through a call stack; here it is reified as an owned value so the walk
/// can suspend and resume across cache fetches instead of recursing.
#[derive(Debug, Clone)]
pub struct WalkFrame {
    pub depth: u8,
    pub components: VecDeque<Name>,
    pub dirent: Dirent,
}

impl WalkFrame {
    pub fn new(path: &PathName, depth: u8, dirent: Dirent) -> Self {
        WalkFrame {
            depth,
            components: path.components().into_iter().collect(),
            dirent,
        }
    }

    pub fn is_last(&self) -> bool {
        self.components.len() <= 1
    }
}

/// Ordered stack of walk frames supporting recursive descent into symlink
/// targets (spec.md §4.4). Push/pop/top; `pop` of the last frame is
/// disallowed while the walk is in progress.
#[derive(Debug, Default)]
pub struct WalkStack {
    frames: Vec<WalkFrame>,
}

impl WalkStack {
    pub fn new(root_frame: WalkFrame) -> Self {
        WalkStack {
            frames: vec![root_frame],
        }
    }

    pub fn top(&self) -> &WalkFrame {
        self.frames.last().expect("walk stack is never empty")
    }

    pub fn top_mut(&mut self) -> &mut WalkFrame {
        self.frames.last_mut().expect("walk stack is never empty")
    }

    pub fn push(&mut self, frame: WalkFrame) {
        self.frames.push(frame);
    }

    /// Pop the top frame. Panics if it is the only frame — callers must
    /// check `len() > 1` (equivalently `top().depth > 0`) first, matching
    /// the invariant "≥ 1 frame while state is not FINISHED" (spec.md §4.4).
    pub fn pop(&mut self) -> WalkFrame {
        assert!(self.frames.len() > 1, "cannot pop the root walk frame");
        self.frames.pop().expect("checked non-empty above")
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_dirent() -> Dirent {
        Dirent::DirRef(ContentRef::new("R0").unwrap())
    }

    #[test]
    fn test_frame_components_split() {
        let f = WalkFrame::new(&"a.b.c".into(), 0, root_dirent());
        assert_eq!(vec!["a", "b", "c"], f.components.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_is_last() {
        let f = WalkFrame::new(&"a".into(), 0, root_dirent());
        assert!(f.is_last());
        let f = WalkFrame::new(&"a.b".into(), 0, root_dirent());
        assert!(!f.is_last());
    }

    #[test]
    fn test_push_pop() {
        let mut stack = WalkStack::new(WalkFrame::new(&"a.b".into(), 0, root_dirent()));
        assert_eq!(1, stack.len());
        stack.push(WalkFrame::new(&"b.c".into(), 1, root_dirent()));
        assert_eq!(2, stack.len());
        stack.pop();
        assert_eq!(1, stack.len());
    }

    #[test]
    #[should_panic(expected = "cannot pop the root walk frame")]
    fn test_pop_root_panics() {
        let mut stack = WalkStack::new(WalkFrame::new(&"a".into(), 0, root_dirent()));
        stack.pop();
    }
}
