/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::{content_ref::ContentRef, dirent::DirectoryVal};

/// A decoded node behind a [`ContentRef`] (spec.md §6.1/§6.2): either a
/// directory or a file's value. Distinct from [`crate::dirent::Dirent`],
/// which describes an *edge* to a node rather than the node's own body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeBody {
    Dir(DirectoryVal),
    File(serde_json::Value),
}

/// Outcome of a cache lookup (spec.md §4.3).
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(NodeBody),
    Miss,
}

/// Read-only lookup of a node by content reference at an epoch (spec.md
/// §4.3/§6.1). The core only ever calls `lookup` — storage, eviction, and
/// network backfill are out of scope (spec.md §1) and live on whatever
/// implements this trait.
///
/// Grounded on `diffuzzer/src/command.rs`'s `CommandInterface` trait, which
/// is likewise the single narrow seam the core code calls through to reach
/// an external collaborator (there: a QEMU guest; here: the content cache).
pub trait KvsCache: Send + Sync {
    fn lookup(&self, r: &ContentRef, epoch: u64) -> CacheLookup;
}

/// An in-memory test double standing in for the real network-backed cache.
/// Not part of the lookup engine's public contract — used by this crate's
/// own tests and available to downstream integration tests that want to
/// drive a [`crate::lookup::LookupHandle`] without a real store.
#[derive(Default)]
pub struct InMemoryCache {
    nodes: RwLock<HashMap<ContentRef, NodeBody>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache preloaded from a full snapshot, e.g. one read from a
    /// JSON fixture by the demo CLI binary.
    pub fn from_snapshot(nodes: HashMap<ContentRef, NodeBody>) -> Self {
        InMemoryCache {
            nodes: RwLock::new(nodes),
        }
    }

    /// Populate (or refill) the cache with a node, simulating the "caller
    /// arranges to populate the cache and then re-drives the walk" loop
    /// described in spec.md §1.
    pub fn insert(&self, r: ContentRef, node: NodeBody) {
        self.nodes.write().unwrap().insert(r, node);
    }
}

impl KvsCache for InMemoryCache {
    fn lookup(&self, r: &ContentRef, _epoch: u64) -> CacheLookup {
        match self.nodes.read().unwrap().get(r) {
            Some(node) => CacheLookup::Hit(node.clone()),
            None => CacheLookup::Miss,
        }
    }
}
