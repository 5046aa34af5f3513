// policy-stream-core/src/runtime/buffer.rs
// ============================================================================
// Module: Policy Stream Trace Buffers
// Description: Per-asset trace buffer and the single-slot output latch.
// Purpose: Store asynchronously delivered traces and output for rendering.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Output and traces arrive from the pipeline worker thread while callers
//! ingest and render from their own threads. [`TraceBuffer`] serializes the
//! condition log and the per-asset verbose lines behind one mutex;
//! [`OutputLatch`] keeps the most recent terminal output behind a second,
//! separate mutex so trace bursts never contend with output updates.
//!
//! Both types are cloneable handles over shared state: the runtime policy
//! keeps one clone and the pipeline subscribers keep another.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::core::AssetId;
use crate::core::ConditionRecord;
use crate::core::TraceClassification;
use crate::core::VerboseRecord;

// ============================================================================
// SECTION: Trace Buffer
// ============================================================================

/// Buffered trace state: the global condition log plus per-asset raw lines.
#[derive(Debug, Default)]
struct TraceBufferState {
    /// Condition firings in global delivery order.
    history: Vec<ConditionRecord>,
    /// Raw trace lines per asset, in per-asset delivery order.
    verbose: BTreeMap<AssetId, Vec<String>>,
}

/// Per-asset ordered trace store shared between subscribers and renderers.
///
/// Appends preserve delivery order and never deduplicate; deduplication
/// happens on [`TraceBuffer::take_verbose`] so the compact view sees every
/// condition firing while the detailed view sees every distinct line.
#[derive(Debug, Default, Clone)]
pub struct TraceBuffer {
    /// Shared state behind the trace mutex.
    state: Arc<Mutex<TraceBufferState>>,
}

impl TraceBuffer {
    /// Creates an empty trace buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the buffer, recovering the state if a writer panicked.
    ///
    /// Every write is a single push, so recovered state is never torn.
    fn lock(&self) -> MutexGuard<'_, TraceBufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends one condition firing to the history log.
    pub fn append_condition(&self, record: ConditionRecord) {
        self.lock().history.push(record);
    }

    /// Appends one raw trace line to its asset's bucket.
    pub fn append_verbose(&self, record: VerboseRecord) {
        self.lock().verbose.entry(record.asset).or_default().push(record.raw);
    }

    /// Appends both records of one classified line under a single lock.
    pub fn append(&self, classification: TraceClassification) {
        let mut state = self.lock();
        if let Some(record) = classification.condition {
            state.history.push(record);
        }
        if let Some(record) = classification.verbose {
            state.verbose.entry(record.asset).or_default().push(record.raw);
        }
    }

    /// Takes the condition history, leaving it empty.
    #[must_use]
    pub fn drain_history(&self) -> Vec<ConditionRecord> {
        std::mem::take(&mut self.lock().history)
    }

    /// Takes the distinct raw lines buffered for an asset, emptying its
    /// bucket. Lines come back in lexicographic order.
    #[must_use]
    pub fn take_verbose(&self, asset: &AssetId) -> BTreeSet<String> {
        match self.lock().verbose.get_mut(asset) {
            Some(bucket) => bucket.drain(..).collect(),
            None => BTreeSet::new(),
        }
    }
}

// ============================================================================
// SECTION: Output Latch
// ============================================================================

/// Single-slot, last-writer-wins holder of the latest terminal output.
#[derive(Debug, Default, Clone)]
pub struct OutputLatch {
    /// Output slot behind its own mutex, distinct from the trace mutex.
    slot: Arc<Mutex<String>>,
}

impl OutputLatch {
    /// Creates an empty latch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the slot with a new output string.
    pub fn store(&self, output: String) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = output;
    }

    /// Returns a copy of the current output string.
    #[must_use]
    pub fn snapshot(&self) -> String {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
