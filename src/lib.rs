/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A resumable, content-addressed hierarchical lookup engine. Walks a
//! dotted namespace path one component at a time against a tree of
//! [`dirent::Dirent`] nodes, suspending at each cache miss instead of
//! blocking, so a caller can backfill the missing node and resume.

pub mod cache;
pub mod config;
pub mod content_ref;
pub mod dirent;
pub mod error;
pub mod lookup;
pub mod pathname;
pub mod walk;
