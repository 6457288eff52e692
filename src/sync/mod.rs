// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry to cluster synchronization: desired objects, diffing, writes and the poll loop.

pub mod diff;
pub mod manager;
pub mod objects;
pub mod synchronizer;

pub use manager::{ClusterSyncManager, LoopState, PollSummary};
pub use synchronizer::{ClusterSynchronizer, WriteOutcome};
