/// What debugging capabilities a given CPU's adapter supports. Returned by
/// `CpuDebugAdapter::supported_features` and surfaced to the UI/scripting host via
/// `GetDebuggerFeatures`, which returns `DebuggerFeatures::default()` (all `false`) for an absent
/// adapter slot rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebuggerFeatures {
    pub cpu_cycle_stepping: bool,
    pub data_breakpoints: bool,
    pub execution_breakpoints: bool,
    pub ppu_tools: bool,
    pub callstack: bool,
    pub tail_calls: bool,
    pub change_program_counter: bool,
}
