/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::{Deserialize, Serialize};

use crate::walk::SYMLINK_CYCLE_LIMIT;

/// Configuration for the demo CLI binary (spec.md's ambient stack; the
/// lookup engine itself has no configuration of its own beyond what's
/// passed to [`crate::lookup::LookupHandle::create`]).
#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    pub lookup: LookupConfig,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct LookupConfig {
    /// Recorded for operators; the engine's actual bound is the compiled-in
    /// [`SYMLINK_CYCLE_LIMIT`] and is not runtime-configurable.
    #[serde(default = "default_symlink_cycle_limit")]
    pub symlink_cycle_limit: u8,
    /// Epoch to pass when none is given on the command line.
    #[serde(default)]
    pub default_epoch: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            symlink_cycle_limit: SYMLINK_CYCLE_LIMIT,
            default_epoch: 0,
        }
    }
}

fn default_symlink_cycle_limit() -> u8 {
    SYMLINK_CYCLE_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lookup: LookupConfig::default(),
        }
    }
}
