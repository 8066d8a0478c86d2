use crate::address::MemoryOperationInfo;

/// Mid-instruction progress for a CPU, queried by the UI while execution is running to show
/// "what's happening right now" without waiting for a break. `last_memory_operation` always
/// holds the most recent access (defaulting to an `Idle` placeholder before the first one),
/// rather than being optional, so `OnIdleCycle` can overwrite just its `op_type` field in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstructionProgress {
    pub last_memory_operation: MemoryOperationInfo,
    pub current_cycle: u64,
}

/// The console's own state collaborator (PPU-external, console-wide state such as DMA
/// controllers or cartridge mappers) behind a byte-buffer view, mirrored from
/// [`crate::adapter::CpuDebugAdapter::read_state`]. Out of scope beyond presence: console
/// internals belong to the (out-of-scope) console implementation, not the coordinator.
pub trait ConsoleStateProvider: Send {
    fn state_size(&self) -> usize;
    fn read_state(&self, out: &mut [u8]);
}

/// A [`ConsoleStateProvider`] that reports no state at all. Used when a caller has no console-wide
/// state to expose, e.g. in tests or for a console composition that doesn't model one.
#[derive(Debug, Default)]
pub struct NullConsoleStateProvider;

impl ConsoleStateProvider for NullConsoleStateProvider {
    fn state_size(&self) -> usize {
        0
    }

    fn read_state(&self, _out: &mut [u8]) {}
}
