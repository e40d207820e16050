/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file in TOML format
    #[arg(long, default_value_t = String::from("./config.toml"))]
    pub config_path: String,

    #[clap(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
#[clap(rename_all = "kebab_case")]
pub enum Mode {
    /// Run a lookup against a JSON snapshot of a dirent tree
    Get {
        /// Path to a JSON file holding a map of content ref -> dirent tree
        /// node, as produced by `dump-fixture`
        #[arg(long)]
        snapshot_path: String,
        /// Root reference to resolve `path` against
        #[arg(long)]
        root_ref: String,
        /// Dotted path to look up, or "." for the root itself
        #[arg(long, default_value_t = String::from("."))]
        path: String,
        /// Return a directory listing instead of erroring on a directory
        /// terminal
        #[arg(long, default_value_t = false)]
        readdir: bool,
        /// Return an unfollowed symlink's target instead of following it
        #[arg(long, default_value_t = false)]
        readlink: bool,
        /// Return the raw dirent instead of its resolved value
        #[arg(long, default_value_t = false)]
        treeobj: bool,
        /// Epoch to pass to the cache; defaults to the configuration file's
        /// `lookup.default_epoch`
        #[arg(long)]
        epoch: Option<u64>,
    },
}
