// policy-stream-core/src/runtime/render.rs
// ============================================================================
// Module: Policy Stream Trace Rendering
// Description: Mode-driven rendering of drained traces into pretty JSON.
// Purpose: Produce the trace half of a runtime policy's debug artifact.
// Dependencies: crate::{core, runtime::buffer}, serde_json
// ============================================================================

//! ## Overview
//! Rendering walks the drained condition history in delivery order and
//! builds one JSON object keyed by asset. The compact mode maps each asset
//! to its condition payload; the detailed mode maps each asset to the
//! concatenation of its distinct raw lines, consuming the asset's verbose
//! bucket as it goes. Later history entries for the same asset overwrite
//! earlier ones, so a detailed render of an asset whose bucket was already
//! consumed yields the empty string.
//!
//! Each asset name becomes a single top-level member. This is the RFC 6901
//! reading of the pointer `/<asset>` with `~` and `/` escaped (`~0`, `~1`):
//! an asset named `decoder/d/0` renders as the flat key `"decoder/d/0"`,
//! never as nested objects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::ConditionRecord;
use crate::core::DebugMode;
use crate::runtime::buffer::TraceBuffer;

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Renders the drained condition history into a pretty-printed JSON object.
///
/// In [`DebugMode::OutputAndTracesWithDetails`] the renderer consumes the
/// verbose bucket of every asset it touches via
/// [`TraceBuffer::take_verbose`]; the other modes leave the buckets intact.
#[must_use]
pub fn render_traces(mode: DebugMode, history: &[ConditionRecord], buffer: &TraceBuffer) -> String {
    let mut trace = Map::new();
    match mode {
        DebugMode::OutputOnly => {}
        DebugMode::OutputAndTraces => {
            for record in history {
                trace.insert(
                    record.asset.as_str().to_string(),
                    Value::String(record.payload.clone()),
                );
            }
        }
        DebugMode::OutputAndTracesWithDetails => {
            for record in history {
                let mut combined = String::new();
                for line in buffer.take_verbose(&record.asset) {
                    combined.push_str(&line);
                }
                trace.insert(record.asset.as_str().to_string(), Value::String(combined));
            }
        }
    }
    serde_json::to_string_pretty(&Value::Object(trace)).unwrap_or_else(|_| "{}".to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
