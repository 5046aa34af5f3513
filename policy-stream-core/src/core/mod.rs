// policy-stream-core/src/core/mod.rs
// ============================================================================
// Module: Policy Stream Data Model
// Description: Identifiers, event documents, and trace classification types.
// Purpose: Define the value types shared by interfaces and the runtime.
// Dependencies: serde, serde_json, regex
// ============================================================================

//! ## Overview
//! The data model is deliberately small: opaque string identifiers for
//! policies and assets, an event document wrapper, and the trace record
//! types produced by the classifier. All runtime behavior lives in
//! [`crate::runtime`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod event;
pub mod identifiers;
pub mod trace;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use event::Event;
pub use event::EventError;
pub use event::EventResult;
pub use identifiers::AssetId;
pub use identifiers::PolicyId;
pub use trace::ConditionRecord;
pub use trace::DebugMode;
pub use trace::TraceClassification;
pub use trace::VerboseRecord;
pub use trace::classify_trace;
