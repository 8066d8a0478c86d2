use std::path::Path;

use debugger_common::adapter::{Breakpoint, CdlStripOption, MemoryAccessCounter, NullMemoryAccessCounter};
use debugger_common::address::{AddressInfo, AddressTranslator, IdentityAddressTranslator};
use debugger_common::cpu::{ConsoleId, CpuId};
use debugger_common::error::DebuggerError;
use debugger_common::eval::{EvalResult, ExpressionEvaluator};
use debugger_common::event::EventType;
use debugger_common::features::DebuggerFeatures;
use debugger_common::log::BoundedLogBuffer;
use debugger_common::notification::DebugNotification;
use debugger_common::state::{ConsoleStateProvider, InstructionProgress, NullConsoleStateProvider};
use debugger_common::step::{BreakSource, StepType};
use debugger_common::trace::TraceRow;

use crate::break_controller::{BreakController, DebugBreakHelper};
use crate::config::DebugConfig;
use crate::dispatch::{AdapterSlot, DispatchTable};
use crate::eval::Accessors;
use crate::event_router::EventRouter;
use crate::fanout::{InstrumentationFanout, NoScript, ScriptSink};
use crate::trace::TraceMerger;

/// The central fan-in/fan-out hub, one long-lived instance per loaded console. Owns the dispatch
/// table, the break controller, the log buffer, and the running config; everything else
/// (adapters, evaluators, script engine) is supplied at construction time by the caller, which
/// knows how to build a console-specific set of them. The memory-mapping, console-state, and
/// access-counter collaborators default to no-ops and can be installed with the `set_*` methods
/// once the caller has something console-specific to offer.
pub struct Coordinator {
    dispatch: DispatchTable,
    breaks: BreakController,
    log: BoundedLogBuffer,
    config: DebugConfig,
    console: ConsoleId,
    address_translator: Box<dyn AddressTranslator>,
    console_state: Box<dyn ConsoleStateProvider>,
    memory_access_counter: Box<dyn MemoryAccessCounter>,
    notify: Box<dyn FnMut(DebugNotification) + Send>,
}

impl Coordinator {
    /// Builds a coordinator for `console` from a caller-supplied `(CpuId, AdapterSlot)` list.
    /// `notify` is called (possibly from the emulation thread, inside a break) for every
    /// [`DebugNotification`]; it must not block.
    ///
    /// Every adapter is initialized (`init` then `process_config_change`) before the coordinator
    /// is handed back. If `config.break_on_entry` is set, the console's main CPU is stepped once
    /// immediately so the caller observes a break before the emulation thread runs its first
    /// instruction.
    pub fn new(
        console: ConsoleId,
        slots: impl IntoIterator<Item = (CpuId, AdapterSlot)>,
        config: DebugConfig,
        notify: impl FnMut(DebugNotification) + Send + 'static,
    ) -> Self {
        let mut dispatch = DispatchTable::new();
        for (id, mut slot) in slots {
            slot.adapter.init();
            slot.adapter.process_config_change();
            dispatch.insert(id, slot);
        }

        let mut coordinator = Self {
            dispatch,
            breaks: BreakController::new(),
            log: BoundedLogBuffer::new(),
            config,
            console,
            address_translator: Box::new(IdentityAddressTranslator),
            console_state: Box::new(NullConsoleStateProvider),
            memory_access_counter: Box::new(NullMemoryAccessCounter),
            notify: Box::new(notify),
        };

        if coordinator.config.break_on_entry {
            let main = coordinator.console.main_cpu();
            coordinator.step(main, 1, StepType::Step);
        }

        coordinator
    }

    /// Installs the console's memory-mapping collaborator. Until called, addresses pass through
    /// [`Self::get_absolute_address`]/[`Self::get_relative_address`] unchanged.
    pub fn set_address_translator(&mut self, translator: Box<dyn AddressTranslator>) {
        self.address_translator = translator;
    }

    /// Installs the console's state collaborator. Until called, [`Self::get_console_state`]
    /// reports zero-length state.
    pub fn set_console_state_provider(&mut self, provider: Box<dyn ConsoleStateProvider>) {
        self.console_state = provider;
    }

    /// Installs the access-counter collaborator reset on `Reset`/`StateLoaded`. Until called,
    /// resets are no-ops.
    pub fn set_memory_access_counter(&mut self, counter: Box<dyn MemoryAccessCounter>) {
        self.memory_access_counter = counter;
    }

    /// Signals the park loop to release the emulation thread repeatedly until it observes the
    /// clear -- mirrors the destructor's `while(executionStopped) Run()` loop. Must be called
    /// before dropping a coordinator whose emulation thread might still be parked; see the open
    /// question in the design notes about abnormal E termination (if E has already exited, this
    /// returns immediately since `executionStopped` reads false).
    pub fn shutdown(&mut self) {
        while self.breaks.is_execution_stopped() {
            self.run();
            std::thread::yield_now();
        }
    }

    // --- Control surface (callable from any controller thread). ---

    pub fn request_break_acquire(&self) {
        self.breaks.request_break_acquire();
    }

    pub fn request_break_release(&self) {
        self.breaks.request_break_release();
    }

    pub fn suspend_acquire(&self) {
        self.breaks.suspend_acquire();
    }

    pub fn suspend_release(&self) {
        self.breaks.suspend_release();
    }

    pub fn reset_suspend_counter(&self) {
        self.breaks.reset_suspend_counter();
    }

    pub fn run(&mut self) {
        self.breaks.run_all(self.dispatch.iter_mut().map(|(_, slot)| slot.adapter.as_mut()));
    }

    pub fn step(&mut self, cpu: CpuId, count: i32, step_type: StepType) {
        self.breaks.step_one(cpu, count, step_type, self.dispatch.iter_mut().map(|(id, slot)| (id, slot.adapter.as_mut())));
    }

    pub fn break_immediately(&mut self, cpu: CpuId, reason: BreakSource) {
        let Some(slot) = self.dispatch.get_mut(cpu) else { return };
        self.breaks.break_immediately(&self.config, cpu, reason, slot.adapter.as_mut(), self.notify.as_mut());
    }

    /// Re-runs every adapter's `process_config_change` hook under a scoped suspend, for settings
    /// changes that land while the console is already running.
    pub fn process_config_change(&mut self) {
        let _guard = DebugBreakHelper::new(&self.breaks);
        for (_, slot) in self.dispatch.iter_mut() {
            slot.adapter.process_config_change();
        }
    }

    /// Predictive breakpoint check ahead of a prefetch/dummy cycle; see
    /// [`crate::break_controller::BreakController::process_predictive_breakpoint`].
    pub fn process_predictive_breakpoint(&mut self, cpu: CpuId, address: AddressInfo) {
        let Some(slot) = self.dispatch.get_mut(cpu) else { return };
        self.breaks.process_predictive_breakpoint(&self.config, cpu, address, slot.adapter.as_mut(), self.notify.as_mut());
    }

    // --- Query surface. ---

    pub fn is_paused(&self) -> bool {
        self.breaks.is_paused()
    }

    pub fn is_execution_stopped(&self) -> bool {
        self.breaks.is_execution_stopped()
    }

    pub fn has_break_request(&self) -> bool {
        self.breaks.has_break_request()
    }

    pub fn has_cpu_type(&self, cpu: CpuId) -> bool {
        self.dispatch.has(cpu)
    }

    pub fn debugger_features(&self, cpu: CpuId) -> DebuggerFeatures {
        self.dispatch.get(cpu).map_or_else(DebuggerFeatures::default, |slot| slot.adapter.supported_features())
    }

    pub fn instruction_progress(&self, cpu: CpuId) -> Option<InstructionProgress> {
        self.dispatch.get(cpu).map(|slot| slot.adapter.instruction_progress())
    }

    // --- Hot-path entry points, called only from the emulation thread. ---

    pub fn on_instruction(&mut self, cpu: CpuId, operation: debugger_common::address::MemoryOperationInfo) {
        let mut fanout = InstrumentationFanout { dispatch: &mut self.dispatch, breaks: &self.breaks, config: &self.config };
        fanout.on_instruction(cpu, operation, self.notify.as_mut());
    }

    pub fn on_read(&mut self, cpu: CpuId, operation: debugger_common::address::MemoryOperationInfo, script: &mut dyn ScriptSink) {
        let mut fanout = InstrumentationFanout { dispatch: &mut self.dispatch, breaks: &self.breaks, config: &self.config };
        fanout.on_read(cpu, operation, script);
    }

    pub fn on_write(&mut self, cpu: CpuId, operation: debugger_common::address::MemoryOperationInfo, script: &mut dyn ScriptSink) {
        let mut fanout = InstrumentationFanout { dispatch: &mut self.dispatch, breaks: &self.breaks, config: &self.config };
        fanout.on_write(cpu, operation, script);
    }

    pub fn on_idle_cycle(&mut self, cpu: CpuId) {
        let mut fanout = InstrumentationFanout { dispatch: &mut self.dispatch, breaks: &self.breaks, config: &self.config };
        fanout.on_idle_cycle(cpu);
    }

    pub fn on_ppu_read(&mut self, cpu: CpuId, operation: debugger_common::address::MemoryOperationInfo) {
        let mut fanout = InstrumentationFanout { dispatch: &mut self.dispatch, breaks: &self.breaks, config: &self.config };
        fanout.on_ppu_read(cpu, operation);
    }

    pub fn on_ppu_write(&mut self, cpu: CpuId, operation: debugger_common::address::MemoryOperationInfo) {
        let mut fanout = InstrumentationFanout { dispatch: &mut self.dispatch, breaks: &self.breaks, config: &self.config };
        fanout.on_ppu_write(cpu, operation);
    }

    pub fn on_ppu_cycle(&mut self, cpu: CpuId) {
        let mut fanout = InstrumentationFanout { dispatch: &mut self.dispatch, breaks: &self.breaks, config: &self.config };
        fanout.on_ppu_cycle(cpu);
    }

    /// Runs the adapter's interrupt hook, then raises the matching `Nmi`/`Irq` event through the
    /// Event Router so script/UI subscribers see it the same way they would any other event.
    pub fn on_interrupt(&mut self, cpu: CpuId, for_nmi: bool) {
        {
            let mut fanout = InstrumentationFanout { dispatch: &mut self.dispatch, breaks: &self.breaks, config: &self.config };
            fanout.on_interrupt(cpu, for_nmi);
        }
        let event_type = if for_nmi { EventType::Nmi } else { EventType::Irq };
        self.on_event(event_type, cpu, &mut NoScript);
    }

    pub fn on_event(&mut self, event_type: EventType, source: CpuId, script: &mut dyn ScriptSink) {
        let mut router = EventRouter {
            dispatch: &mut self.dispatch,
            console: self.console,
            memory_access_counter: self.memory_access_counter.as_mut(),
        };
        router.on_event(event_type, source, script, self.notify.as_mut());
    }

    // --- State/expression accessors. ---

    pub fn evaluate_expression(
        &mut self,
        expression: &str,
        cpu: CpuId,
        use_cache: bool,
        fresh: impl FnOnce() -> Box<dyn ExpressionEvaluator>,
    ) -> EvalResult {
        let mut accessors = Accessors { dispatch: &mut self.dispatch, breaks: &self.breaks };
        accessors.evaluate_expression(expression, cpu, use_cache, fresh)
    }

    /// Tokenizes `expression` for the UI's autocomplete/highlighting, using `cpu`'s bound
    /// evaluator. An absent CpuId tokenizes to an empty list rather than erroring.
    pub fn token_list(&self, cpu: CpuId, expression: &str) -> Vec<String> {
        self.dispatch.get(cpu).map_or_else(Vec::new, |slot| slot.evaluator.tokenize(expression))
    }

    pub fn cpu_state(&self, cpu: CpuId, out: &mut [u8]) {
        if let Some(slot) = self.dispatch.get(cpu) {
            slot.adapter.read_state(out);
        }
    }

    pub fn set_cpu_state(&mut self, cpu: CpuId, data: &[u8]) {
        let mut accessors = Accessors { dispatch: &mut self.dispatch, breaks: &self.breaks };
        accessors.set_cpu_state(cpu, data);
    }

    /// Size in bytes of `cpu`'s PPU state, funneled through the SNES-family owner the same way
    /// [`Self::ppu_state`]/[`Self::set_ppu_state`] are.
    pub fn ppu_state_size(&self, cpu: CpuId) -> usize {
        self.dispatch.get(Accessors::ppu_owner_id(cpu)).map_or(0, |slot| slot.adapter.ppu_state_size())
    }

    pub fn ppu_state(&self, cpu: CpuId, out: &mut [u8]) {
        if let Some(slot) = self.dispatch.get(Accessors::ppu_owner_id(cpu)) {
            slot.adapter.read_ppu_state(out);
        }
    }

    pub fn set_ppu_state(&mut self, cpu: CpuId, data: &[u8]) {
        let mut accessors = Accessors { dispatch: &mut self.dispatch, breaks: &self.breaks };
        accessors.set_ppu_state(cpu, data);
    }

    pub fn set_program_counter(&mut self, cpu: CpuId, address: u32) {
        let mut accessors = Accessors { dispatch: &mut self.dispatch, breaks: &self.breaks };
        accessors.set_program_counter(cpu, address);
    }

    pub fn program_counter(&self, cpu: CpuId) -> Option<u32> {
        self.dispatch.get(cpu).map(|slot| slot.adapter.program_counter())
    }

    /// Translates a CPU-relative address into the coordinator's canonical absolute form.
    pub fn get_absolute_address(&self, relative: AddressInfo) -> AddressInfo {
        self.address_translator.to_absolute(relative)
    }

    /// Translates a canonical absolute address into `cpu`'s relative bus address.
    pub fn get_relative_address(&self, absolute: AddressInfo, cpu: CpuId) -> AddressInfo {
        self.address_translator.to_relative(absolute, cpu)
    }

    /// Size in bytes of the console-wide state exposed by [`Self::get_console_state`].
    pub fn console_state_size(&self) -> usize {
        self.console_state.state_size()
    }

    /// Copies the console's own (PPU-external, CPU-external) state into `out`.
    pub fn get_console_state(&self, out: &mut [u8]) {
        self.console_state.read_state(out);
    }

    // --- Breakpoints. ---

    /// Replaces `cpu`'s breakpoint list under a scoped suspend.
    pub fn set_breakpoints(&mut self, cpu: CpuId, breakpoints: Vec<Breakpoint>) {
        let _guard = DebugBreakHelper::new(&self.breaks);
        if let Some(slot) = self.dispatch.get_mut(cpu) {
            if let Some(manager) = slot.adapter.breakpoint_manager_mut() {
                manager.set_breakpoints(breakpoints);
            }
        }
    }

    // --- Trace. ---

    pub fn clear_execution_trace(&mut self) {
        let _guard = DebugBreakHelper::new(&self.breaks);
        for (_, slot) in self.dispatch.iter_mut() {
            if let Some(logger) = slot.adapter.trace_logger_mut() {
                logger.clear();
            }
        }
    }

    pub fn execution_trace(&self, start_offset: usize, max_line_count: usize) -> Vec<TraceRow> {
        let merger = TraceMerger { dispatch: &self.dispatch, breaks: &self.breaks };
        merger.execution_trace(start_offset, max_line_count)
    }

    // --- Logging. ---

    pub fn log(&self, message: impl Into<String>) {
        self.log.push(message);
    }

    pub fn get_log(&self) -> String {
        self.log.snapshot().join("\n")
    }

    // --- Persistence. ---

    /// Delegates to the console-main adapter. On an SGB console (a Game Boy embedded in an SNES
    /// cartridge slot) the embedded GB adapter handles it instead, since that's the CPU that
    /// actually owns the ROM image in that composition. `as_ips` writes an IPS patch against the
    /// original image instead of a full copy; `strip_option` controls CDL-based stripping.
    pub fn save_rom_to_disk(&self, path: &Path, as_ips: bool, strip_option: CdlStripOption) -> Result<(), DebuggerError> {
        let main = self.console.main_cpu();
        let target = if self.console == ConsoleId::Snes && !self.dispatch.has(main) && self.dispatch.has(CpuId::Gameboy) {
            CpuId::Gameboy
        } else {
            main
        };
        self.dispatch
            .get(target)
            .ok_or(DebuggerError::CpuNotPresent(target))?
            .adapter
            .save_rom_to_disk(path, as_ips, strip_option)
            .map_err(DebuggerError::SaveRom)
    }
}
