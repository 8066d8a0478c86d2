use debugger_proc_macros::EnumDisplay;

/// The granularity of a step request issued by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay)]
pub enum StepType {
    /// Step one instruction.
    Step,
    /// Run until the current subroutine returns.
    StepOut,
    /// Step one instruction, treating calls as a single step.
    StepOver,
    /// Step a fixed number of CPU cycles rather than instructions.
    CpuCycleStep,
    /// Step a fixed number of PPU dots/cycles.
    PpuStep,
    /// Run until the next scanline boundary.
    PpuScanline,
    /// Run until the next frame boundary.
    PpuFrame,
}

/// Why a break occurred or is about to occur. `Unspecified` marks a break that was caused purely
/// by an external `BreakRequest`/park with no concrete triggering condition -- see
/// [`crate::step`] docs on silent breaks and `SleepUntilResume`'s notification-suppression rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay)]
pub enum BreakSource {
    Unspecified,
    Breakpoint,
    Step,
    StepOut,
    StepOver,
    CpuCycleStep,
    PpuStep,
    GbDisableLcdOutsideVblank,
    GbInvalidVramAccess,
    GbInvalidOamAccess,
}

impl From<StepType> for BreakSource {
    fn from(step_type: StepType) -> Self {
        match step_type {
            StepType::Step => Self::Step,
            StepType::StepOut => Self::StepOut,
            StepType::StepOver => Self::StepOver,
            StepType::CpuCycleStep => Self::CpuCycleStep,
            StepType::PpuStep | StepType::PpuScanline | StepType::PpuFrame => Self::PpuStep,
        }
    }
}

/// Per-adapter step intent, read by the coordinator on every instruction/memory-op boundary to
/// decide whether to park. Adapters own the mutable half of this (decrementing `remaining` and
/// setting `break_needed` once it reaches zero); the coordinator only ever reads it, except for
/// `Run`/`Step` which reset it wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepRequest {
    pub remaining: i32,
    pub step_type: Option<StepType>,
    pub break_needed: bool,
    pub source: BreakSource,
}

impl Default for BreakSource {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl StepRequest {
    /// The "running free" state: no pending step, nothing to break for.
    #[must_use]
    pub const fn running() -> Self {
        Self { remaining: 0, step_type: None, break_needed: false, source: BreakSource::Unspecified }
    }

    /// Begin a new step request for `count` units of `step_type`.
    #[must_use]
    pub const fn new(count: i32, step_type: StepType) -> Self {
        Self { remaining: count, step_type: Some(step_type), break_needed: false, source: BreakSource::Unspecified }
    }

    /// Called by an adapter after it consumes one unit (instruction/cycle/whatever the step type
    /// counts). Once `remaining` reaches zero, marks `break_needed` with the step's `BreakSource`.
    pub fn tick(&mut self) {
        let Some(step_type) = self.step_type else { return };
        if self.remaining <= 0 {
            return;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.break_needed = true;
            self.source = step_type.into();
        }
    }
}
