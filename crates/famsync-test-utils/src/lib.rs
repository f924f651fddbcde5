// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for famsync integration tests.
//!
//! Provides in-memory collaborators so the synchronization engine can be
//! exercised deterministically, without a network or a database.
//!
//! # Components
//!
//! - [`MemoryStore`] - Document store, reference relation and file ingester in one
//! - [`ScriptedRemote`] - Session provider and family remote replaying scripted pages
//! - [`fixtures`] - Raw record builders

pub mod fixtures;
pub mod memory_store;
pub mod scripted_remote;

pub use memory_store::MemoryStore;
pub use scripted_remote::{RemoteCall, RemoteEndpoint, ScriptedRemote};
