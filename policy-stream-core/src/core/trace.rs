// policy-stream-core/src/core/trace.rs
// ============================================================================
// Module: Policy Stream Trace Classification
// Description: Debug modes, trace records, and the trace line classifier.
// Purpose: Parse free-form operator trace lines into per-asset records.
// Dependencies: regex, serde
// ============================================================================

//! ## Overview
//! Pipeline operators emit free-form trace strings. Two anchored shapes are
//! recognized:
//!
//! - condition: `[<asset>] [condition]:<payload>`
//! - verbose:   `[<asset>] <payload>`
//!
//! The condition shape is a specialization of the verbose shape, and the two
//! matches are applied independently: a condition-shaped line yields a
//! condition record (the payload after `[condition]:`) *and* a verbose
//! record (the raw line). The compact debug view reports condition payloads;
//! the detailed view reports distinct raw lines, so the asymmetry is load
//! bearing. Lines matching neither shape are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AssetId;

// ============================================================================
// SECTION: Debug Mode
// ============================================================================

/// Caller-chosen verbosity selector for rendering a policy's output.
///
/// The numeric wire codes are stable for embedding APIs: `0` output only,
/// `1` output and condition traces, `2` output and detailed traces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugMode {
    /// Render the latched output with an empty trace object.
    #[default]
    OutputOnly,
    /// Render the output plus the condition payload per asset.
    OutputAndTraces,
    /// Render the output plus every distinct raw trace line per asset.
    OutputAndTracesWithDetails,
}

impl DebugMode {
    /// Returns the wire-stable numeric code for this mode.
    #[must_use]
    pub const fn wire_code(self) -> u8 {
        match self {
            Self::OutputOnly => 0,
            Self::OutputAndTraces => 1,
            Self::OutputAndTracesWithDetails => 2,
        }
    }

    /// Resolves a wire code into a debug mode.
    #[must_use]
    pub const fn from_wire(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::OutputOnly),
            1 => Some(Self::OutputAndTraces),
            2 => Some(Self::OutputAndTracesWithDetails),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Trace Records
// ============================================================================

/// Condition firing recorded for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    /// Asset that emitted the trace.
    pub asset: AssetId,
    /// Payload after the `[condition]:` marker.
    pub payload: String,
}

/// Raw trace line recorded for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerboseRecord {
    /// Asset that emitted the trace.
    pub asset: AssetId,
    /// The trace line verbatim, embedded newlines preserved.
    pub raw: String,
}

/// Classification of one trace line: zero, one, or two records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceClassification {
    /// Condition record when the line carries a `[condition]:` marker.
    pub condition: Option<ConditionRecord>,
    /// Verbose record when the line names an asset.
    pub verbose: Option<VerboseRecord>,
}

impl TraceClassification {
    /// Returns whether the line matched neither shape.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.condition.is_none() && self.verbose.is_none()
    }
}

// ============================================================================
// SECTION: Classifier
// ============================================================================

static CONDITION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\[([^\]]+)\] \[condition\]:(.+)$")
        .expect("condition trace pattern should compile")
});

static VERBOSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\[([^\]]+)\] (.+)$").expect("verbose trace pattern should compile")
});

/// Classifies one trace line into its condition and verbose records.
///
/// The asset is the longest run of non-`]` characters after the leading
/// `[`. Payloads may span embedded newlines; the verbose record stores the
/// whole line verbatim, not the captured remainder.
#[must_use]
pub fn classify_trace(line: &str) -> TraceClassification {
    let condition = CONDITION_PATTERN.captures(line).map(|captures| ConditionRecord {
        asset: AssetId::new(&captures[1]),
        payload: captures[2].to_string(),
    });
    let verbose = VERBOSE_PATTERN.captures(line).map(|captures| VerboseRecord {
        asset: AssetId::new(&captures[1]),
        raw: line.to_string(),
    });
    TraceClassification { condition, verbose }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
