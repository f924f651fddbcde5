// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for documents, reference edges, and registered files.

pub mod documents;
pub mod files;
pub mod references;
