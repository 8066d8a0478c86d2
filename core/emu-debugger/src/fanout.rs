use debugger_common::address::{MemoryOperationInfo, MemoryOperationType};
use debugger_common::cpu::CpuId;
use debugger_common::notification::DebugNotification;

use crate::break_controller::BreakController;
use crate::config::DebugConfig;
use crate::dispatch::DispatchTable;

/// Something the hot path can forward memory operations to when a script is loaded. Kept as a
/// trait rather than a concrete script-engine type since script internals are out of scope here;
/// a coordinator with no script loaded uses [`NoScript`] and pays only a branch.
pub trait ScriptSink {
    fn on_memory_operation(&mut self, cpu: CpuId, operation: MemoryOperationInfo);
    fn on_event(&mut self, cpu: CpuId, event: debugger_common::event::EventType);
}

/// No-op sink used when no script is attached. Keeps the fan-out call sites from having to
/// special-case `Option<&mut dyn ScriptSink>` everywhere.
pub struct NoScript;
impl ScriptSink for NoScript {
    fn on_memory_operation(&mut self, _cpu: CpuId, _operation: MemoryOperationInfo) {}
    fn on_event(&mut self, _cpu: CpuId, _event: debugger_common::event::EventType) {}
}

/// The hot-path entry points the emulation thread calls once per executed instruction, bus
/// access, idle cycle, interrupt, and PPU cycle. Every method here does the minimum necessary to
/// dispatch to the right adapter and feed the break controller; no heap allocation and no locking
/// on the common path (the break controller's atomics are the only cross-thread touch).
pub struct InstrumentationFanout<'a> {
    pub dispatch: &'a mut DispatchTable,
    pub breaks: &'a BreakController,
    pub config: &'a DebugConfig,
}

impl InstrumentationFanout<'_> {
    pub fn on_instruction(
        &mut self,
        cpu: CpuId,
        operation: MemoryOperationInfo,
        notify: &mut dyn FnMut(DebugNotification),
    ) {
        let Some(slot) = self.dispatch.get_mut(cpu) else { return };
        slot.adapter.set_ignore_breakpoints(false);
        slot.adapter.set_allow_change_program_counter(true);
        slot.adapter.process_instruction(operation);
        slot.adapter.set_allow_change_program_counter(false);
        let step = slot.adapter.step_request();
        self.breaks.process_break_conditions(self.config, cpu, step, operation, slot.adapter.as_mut(), notify);
    }

    pub fn on_read(&mut self, cpu: CpuId, operation: MemoryOperationInfo, script: &mut dyn ScriptSink) {
        let Some(slot) = self.dispatch.get_mut(cpu) else { return };
        slot.adapter.process_read(operation);
        script.on_memory_operation(cpu, operation);
    }

    pub fn on_write(&mut self, cpu: CpuId, operation: MemoryOperationInfo, script: &mut dyn ScriptSink) {
        let Some(slot) = self.dispatch.get_mut(cpu) else { return };
        slot.adapter.process_write(operation);
        script.on_memory_operation(cpu, operation);
    }

    /// Valid only for `CpuId::has_idle_cycles()` CPUs (Snes, Sa1). Calling it for any other
    /// CpuId is a programmer error -- fail fast in test builds, silently skip in release, the
    /// same closed-enum category-mistake policy every other unknown-CpuId hot-path call follows.
    pub fn on_idle_cycle(&mut self, cpu: CpuId) {
        debug_assert!(cpu.has_idle_cycles(), "OnIdleCycle called for {cpu}, which has no idle cycles");
        if !cpu.has_idle_cycles() {
            return;
        }
        let Some(slot) = self.dispatch.get_mut(cpu) else { return };
        slot.adapter.set_last_memory_operation_type(MemoryOperationType::Idle);
        slot.adapter.process_idle_cycle();
    }

    /// The Event Router raise for the resulting `Nmi`/`Irq` is the caller's responsibility (it
    /// needs the whole dispatch table, not just this CPU's slot); this only runs the adapter's
    /// own hook.
    pub fn on_interrupt(&mut self, cpu: CpuId, for_nmi: bool) {
        let Some(slot) = self.dispatch.get_mut(cpu) else { return };
        slot.adapter.process_interrupt(for_nmi);
    }

    /// Valid only for `CpuId::hosts_ppu()` CPUs (Snes, Gameboy, Nes, Pce).
    pub fn on_ppu_read(&mut self, cpu: CpuId, operation: MemoryOperationInfo) {
        debug_assert!(cpu.hosts_ppu(), "OnPpuRead called for {cpu}, which has no PPU");
        if !cpu.hosts_ppu() {
            return;
        }
        if let Some(slot) = self.dispatch.get_mut(cpu) {
            slot.adapter.process_ppu_read(operation);
        }
    }

    pub fn on_ppu_write(&mut self, cpu: CpuId, operation: MemoryOperationInfo) {
        debug_assert!(cpu.hosts_ppu(), "OnPpuWrite called for {cpu}, which has no PPU");
        if !cpu.hosts_ppu() {
            return;
        }
        if let Some(slot) = self.dispatch.get_mut(cpu) {
            slot.adapter.process_ppu_write(operation);
        }
    }

    pub fn on_ppu_cycle(&mut self, cpu: CpuId) {
        debug_assert!(cpu.hosts_ppu(), "OnPpuCycle called for {cpu}, which has no PPU");
        if !cpu.hosts_ppu() {
            return;
        }
        if let Some(slot) = self.dispatch.get_mut(cpu) {
            slot.adapter.process_ppu_cycle();
        }
    }
}
