use debugger_proc_macros::EnumDisplay;

use crate::address::{AddressInfo, MemoryOperationInfo};
use crate::event::EventType;
use crate::features::DebuggerFeatures;
use crate::state::InstructionProgress;
use crate::step::{StepRequest, StepType};
use crate::trace::TraceLogger;

/// A single user-configured breakpoint. Matching logic (address ranges, conditions) lives in
/// the owning `BreakpointManager`; this is just the data the UI round-trips through
/// `SetBreakpoints`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub id: u32,
    pub cpu: crate::cpu::CpuId,
    pub address: AddressInfo,
    pub address_end: Option<u32>,
    pub enabled: bool,
    pub mark_event: bool,
    pub condition: Option<String>,
}

/// How a code/data log entry should be treated when stripping a ROM for release, per-region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay)]
pub enum CdlStripOption {
    StripNone,
    StripUsed,
    StripUnused,
}

/// A CPU's breakpoint store and matcher. Owned by the adapter rather than the coordinator: each
/// CPU family has its own idea of what an address/condition match means (e.g. SNES bank-relative
/// vs. NES flat addressing), so the coordinator only ever asks "does this operation hit anything"
/// rather than walking the list itself.
pub trait BreakpointManager: Send {
    fn set_breakpoints(&mut self, breakpoints: Vec<Breakpoint>);
    fn breakpoints(&self) -> &[Breakpoint];

    /// Checked by `ProcessBreakConditions` on every matching-type memory operation. Returns the
    /// id of the first breakpoint that matches, if any.
    fn check(&self, operation: MemoryOperationInfo) -> Option<u32>;

    /// Checked ahead of a predicted next-instruction fetch so a breakpoint can stop execution
    /// before the dummy/prefetch cycle that precedes it is allowed to have side effects.
    fn check_predictive(&self, address: AddressInfo) -> Option<u32> {
        let _ = address;
        None
    }
}

/// Fanned-out console/CPU lifecycle events. Most adapters only care about a handful of these;
/// the default no-ops keep implementers from having to acknowledge events they don't act on.
pub trait EventManager: Send {
    fn on_event(&mut self, event_type: EventType) {
        let _ = event_type;
    }

    /// Clears any recorded event markers, e.g. after `ClearExecutionTrace`.
    fn clear(&mut self) {}
}

/// Opaque PPU-specific tooling (tile/sprite viewers and similar). The coordinator only needs to
/// know an adapter has one, not what it does with it -- UI-facing PPU tooling is out of scope
/// here, so this trait currently has no methods of its own.
pub trait PpuTools: Send {}

/// Opaque call-stack tracking. Out of scope beyond presence/absence: `DebuggerFeatures::callstack`
/// is what the UI actually branches on.
pub trait CallstackManager: Send {}

/// Opaque inline assembler. Out of scope beyond presence/absence.
pub trait Assembler: Send {}

/// Tracks per-address read/write counts for the (out-of-scope) memory-dump/heat-map tooling.
/// Owned once by the coordinator rather than per-adapter -- unlike breakpoints or trace logs,
/// access counts aren't meaningfully scoped to a single CPU's address space. The coordinator only
/// ever resets it, on `Reset` and `StateLoaded` (see [`crate::event`] docs); everything else about
/// how counts are recorded and rendered is out of scope here.
pub trait MemoryAccessCounter: Send {
    fn reset_counts(&mut self);
}

/// A [`MemoryAccessCounter`] that drops every count on the floor. Used when a caller doesn't need
/// the coordinator to track access counts at all.
#[derive(Debug, Default)]
pub struct NullMemoryAccessCounter;

impl MemoryAccessCounter for NullMemoryAccessCounter {
    fn reset_counts(&mut self) {}
}

/// The capability interface every CPU-family adapter implements. One dense array slot per
/// [`crate::cpu::CpuId`] holds a `Box<dyn CpuDebugAdapter>`; the coordinator dispatches to it by
/// array index rather than through a second layer of virtual calls, so these methods are the
/// entire surface the hot emulation-thread path goes through.
///
/// Default method bodies are used for hooks that only apply to a subset of CPU families (idle
/// cycles, PPU access) so adapters that don't host a PPU or don't have idle-cycle granularity
/// don't have to implement them -- the coordinator never calls them for such adapters anyway
/// (see the `CpuId::has_idle_cycles`/`hosts_ppu` gates), but a safe default keeps the trait
/// object usable even if that invariant is ever violated by a bug elsewhere.
pub trait CpuDebugAdapter: Send {
    fn id(&self) -> crate::cpu::CpuId;

    /// Called once, immediately after construction, before `ProcessConfigChange`. Adapters that
    /// need no first-time setup beyond what their constructor already did can leave this as a
    /// no-op.
    fn init(&mut self) {}
    fn reset(&mut self);
    fn process_config_change(&mut self) {}

    // --- Hot path: called once per bus cycle from the emulation thread. ---

    fn process_instruction(&mut self, operation: MemoryOperationInfo);
    fn process_read(&mut self, operation: MemoryOperationInfo);
    fn process_write(&mut self, operation: MemoryOperationInfo);
    fn process_idle_cycle(&mut self) {}
    fn process_interrupt(&mut self, is_nmi: bool) {
        let _ = is_nmi;
    }
    fn process_ppu_read(&mut self, operation: MemoryOperationInfo) {
        let _ = operation;
    }
    fn process_ppu_write(&mut self, operation: MemoryOperationInfo) {
        let _ = operation;
    }
    fn process_ppu_cycle(&mut self) {}

    /// Renders whatever has been produced of the current frame so far, called just before
    /// parking on a genuine break when `DebugConfig::draw_partial_frame_on_break` is set, so the
    /// UI's screen view isn't left showing a stale complete frame from before the break. Only
    /// meaningful for PPU-hosting adapters; others leave it a no-op.
    fn draw_partial_frame(&mut self) {}

    // --- State accessors: byte-buffer view, mirroring `jgenesis_common::debug::DebugMemoryView`
    //     rather than a typed struct, since the coordinator never interprets the bytes itself. ---

    fn state_size(&self) -> usize;
    fn read_state(&self, out: &mut [u8]);
    fn write_state(&mut self, data: &[u8]);

    fn ppu_state_size(&self) -> usize {
        0
    }
    fn read_ppu_state(&self, out: &mut [u8]) {
        let _ = out;
    }
    fn write_ppu_state(&mut self, data: &[u8]) {
        let _ = data;
    }

    // --- Program counter. ---

    fn program_counter(&self) -> u32;
    fn set_program_counter(&mut self, pc: u32);

    /// Whether `SetProgramCounter` is currently allowed. The coordinator sets this `true` only
    /// for the duration of `ProcessInstruction` (so a script/UI callback dispatched from inside
    /// it may redirect flow) and `false` everywhere else; see `InstrumentationFanout::on_instruction`.
    fn allow_change_program_counter(&self) -> bool;
    fn set_allow_change_program_counter(&mut self, allow: bool);

    // --- Breakpoint suppression, e.g. while single-stepping through a breakpoint's own
    //     condition evaluation. ---

    fn ignore_breakpoints(&self) -> bool;
    fn set_ignore_breakpoints(&mut self, ignore: bool);

    // --- Progress/cycle accessors. ---

    fn instruction_progress(&self) -> InstructionProgress;
    fn set_last_memory_operation_type(&mut self, op_type: crate::address::MemoryOperationType);
    fn cpu_cycle_count(&self) -> u64;

    // --- Step state, read by the coordinator's break checks and written by `Step`. ---

    fn step_request(&self) -> StepRequest;
    fn set_step_request(&mut self, count: i32, step_type: StepType);

    fn supported_features(&self) -> DebuggerFeatures {
        DebuggerFeatures::default()
    }

    // --- Sub-tool accessors. `None` for adapters that don't carry the given tool. ---

    fn breakpoint_manager_mut(&mut self) -> Option<&mut dyn BreakpointManager> {
        None
    }
    fn breakpoint_manager(&self) -> Option<&dyn BreakpointManager> {
        None
    }
    fn event_manager_mut(&mut self) -> Option<&mut dyn EventManager> {
        None
    }
    fn trace_logger(&self) -> Option<&dyn TraceLogger> {
        None
    }
    fn trace_logger_mut(&mut self) -> Option<&mut dyn TraceLogger> {
        None
    }
    fn ppu_tools(&self) -> Option<&dyn PpuTools> {
        None
    }
    fn callstack_manager(&self) -> Option<&dyn CallstackManager> {
        None
    }
    fn assembler_mut(&mut self) -> Option<&mut dyn Assembler> {
        None
    }

    /// Persists the current cartridge image to disk, e.g. after a patch was applied through the
    /// assembler. `as_ips` writes an IPS patch against the original image instead of a full copy;
    /// `strip_option` controls how CDL-unexecuted/unaccessed regions are stripped before writing.
    /// Most adapters are coprocessors or non-main CPUs and never own a ROM; the default declines.
    fn save_rom_to_disk(
        &self,
        path: &std::path::Path,
        as_ips: bool,
        strip_option: CdlStripOption,
    ) -> std::io::Result<()> {
        let _ = (path, as_ips, strip_option);
        Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "adapter has no ROM to save"))
    }
}
