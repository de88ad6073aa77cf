// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Batch-scoped entity caches.

pub mod batch_context;
pub mod entity_cache;

pub use batch_context::BatchContext;
pub use entity_cache::{EntityCache, PREFETCH_CHUNK_SIZE};
