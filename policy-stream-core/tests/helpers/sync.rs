// policy-stream-core/tests/helpers/sync.rs
// ============================================================================
// Module: Pipeline Synchronization
// Description: Bounded polling against the asynchronous pipeline worker.
// Purpose: Let tests observe output and traces without wall-clock sleeps.
// Dependencies: policy-stream-core
// ============================================================================

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use policy_stream_core::Event;
use policy_stream_core::RuntimePolicy;
use serde_json::json;

/// Default deadline for pipeline quiescence.
pub const QUIESCE_DEADLINE: Duration = Duration::from_secs(5);

/// Returns a no-op marker event recognized by the scripted pipeline.
pub fn sync_event() -> Event {
    Event::new(json!({"sync": true}))
}

/// Polls the predicate until it holds or the deadline elapses.
pub fn wait_until(deadline: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if predicate() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    predicate()
}

/// Ingests a sync marker and waits until the worker has applied `total`
/// events, markers included.
///
/// The worker is serial: once the marker's apply is counted, every earlier
/// event has finished its trace emission *and* its output fan-out, so a
/// single `render` afterwards observes a complete picture.
pub fn quiesce(policy: &RuntimePolicy, processed: &AtomicUsize, total: usize) {
    policy.ingest(sync_event()).expect("sync marker ingest");
    assert!(
        wait_until(QUIESCE_DEADLINE, || processed.load(Ordering::SeqCst) >= total),
        "pipeline worker did not quiesce within {QUIESCE_DEADLINE:?}"
    );
}
