use std::sync::atomic::{AtomicU64, Ordering};

use crate::address::MemoryOperationInfo;
use crate::cpu::CpuId;

/// One logged instruction, tagged with the globally monotonic row id it was allocated at. The
/// Trace Merger uses `row_id` (not timestamps, which several coprocessors share with their host
/// CPU) to interleave each CPU's independent ring buffer back into a single chronological log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow {
    pub row_id: u64,
    pub cpu: CpuId,
    pub operation: MemoryOperationInfo,
    pub disassembly: String,
    pub comment: Option<String>,
}

/// Allocates the process-wide monotonic row ids every per-CPU trace logger stamps its rows with.
/// A single shared counter (rather than one per CPU) is what lets `TraceMerger::execution_trace`
/// interleave every lane by tracking one expected next `row_id` instead of a real sort.
#[derive(Debug, Default)]
pub struct RowIdAllocator(AtomicU64);

impl RowIdAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// A per-CPU ring buffer of recently executed instructions. Implementations decide their own
/// capacity and eviction policy; the coordinator only ever appends, reads a snapshot, or clears.
pub trait TraceLogger: Send {
    fn log(&mut self, row: TraceRow);

    /// A snapshot of currently buffered rows, newest first. Taken under whatever internal
    /// synchronization the implementation uses; the coordinator treats this as a point-in-time
    /// copy, not a live view. `TraceMerger` walks each lane's snapshot from index 0 outward and
    /// relies on that index being the most recently logged row.
    fn snapshot(&self) -> Vec<TraceRow>;

    fn clear(&mut self);

    fn enabled(&self) -> bool {
        true
    }
    fn set_enabled(&mut self, enabled: bool);
}
