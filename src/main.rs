/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use anyhow::{Context, Ok};
use clap::Parser;
use log::{error, info};

use args::{Args, Mode};
use kvs_lookup::{
    cache::{InMemoryCache, NodeBody},
    config::Config,
    content_ref::ContentRef,
    lookup::{DriveOutcome, LookupHandle, LookupValue, READDIR, READLINK, TREEOBJ},
};

mod args;

fn main() {
    let status = run();
    if let Err(ref err) = status {
        error!("{:?}", err);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    log4rs::init_file("log4rs.yml", Default::default()).with_context(|| "failed to init logger")?;
    info!("init logger");

    info!("read configuration");
    let config_text = fs::read_to_string(&args.config_path)
        .with_context(|| "failed to read configuration file")?;
    let config: Config =
        toml::from_str(&config_text).with_context(|| "failed to parse configuration")?;

    match args.mode {
        Mode::Get {
            snapshot_path,
            root_ref,
            path,
            readdir,
            readlink,
            treeobj,
            epoch,
        } => {
            info!("load snapshot '{}'", snapshot_path);
            let snapshot_text = fs::read_to_string(&snapshot_path)
                .with_context(|| "failed to read snapshot file")?;
            let nodes: HashMap<ContentRef, NodeBody> = serde_json::from_str(&snapshot_text)
                .with_context(|| "failed to parse snapshot file")?;
            let cache: Arc<dyn kvs_lookup::cache::KvsCache> =
                Arc::new(InMemoryCache::from_snapshot(nodes));

            let mut flags = 0u8;
            if readdir {
                flags |= READDIR;
            }
            if readlink {
                flags |= READLINK;
            }
            if treeobj {
                flags |= TREEOBJ;
            }

            let root_ref = ContentRef::new(root_ref).with_context(|| "invalid root ref")?;
            let epoch = epoch.unwrap_or(config.lookup.default_epoch);
            let mut handle = LookupHandle::create(
                cache,
                epoch,
                root_ref.clone(),
                None,
                path.clone().into(),
                flags,
            )
            .with_context(|| "failed to create lookup handle")?;

            info!("lookup '{}' against root '{}'", path, root_ref);
            loop {
                match handle.drive() {
                    DriveOutcome::Complete => break,
                    DriveOutcome::Stalled { missing_ref } => {
                        anyhow::bail!(
                            "lookup stalled on '{}': not present in snapshot",
                            missing_ref
                        );
                    }
                }
            }

            if let Some(err) = handle.error() {
                anyhow::bail!("lookup failed: {}", err);
            }
            match handle.value() {
                Some(LookupValue::File(v)) => println!("{}", v),
                Some(LookupValue::Directory(d)) => {
                    println!("{}", serde_json::to_string_pretty(d)?)
                }
                Some(LookupValue::Dirent(d)) => println!("{}", serde_json::to_string_pretty(d)?),
                Some(LookupValue::Link(target)) => println!("{}", target),
                None => println!("(absent)"),
            }
        }
    }
    Ok(())
}
