use crate::address::MemoryOperationInfo;
use crate::cpu::CpuId;
use crate::step::BreakSource;

/// Delivered once on entering a break; paired with a [`DebugNotification::DebuggerResumed`] on
/// exit. See `SleepUntilResume`'s "genuine user-facing break" rule for exactly when this fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakEvent {
    pub source_cpu: CpuId,
    pub source: BreakSource,
    pub operation: Option<MemoryOperationInfo>,
    pub breakpoint_id: Option<u32>,
}

/// Everything the coordinator ever pushes out to external subscribers. Delivery is fire-and-forget
/// (see [`crate::notification`] docs): the coordinator never blocks on, retries, or waits for a
/// subscriber to consume these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugNotification {
    CodeBreak(BreakEvent),
    DebuggerResumed,
    EventViewerRefresh(CpuId),
}
