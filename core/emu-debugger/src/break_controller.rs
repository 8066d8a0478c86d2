use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::thread;
use std::time::Duration;

use debugger_common::address::{AddressInfo, MemoryOperationInfo};
use debugger_common::adapter::CpuDebugAdapter;
use debugger_common::notification::{BreakEvent, DebugNotification};
use debugger_common::step::{BreakSource, StepRequest};

use crate::config::DebugConfig;

const BREAK_REQUEST_POLL: Duration = Duration::from_millis(1);
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Two-party suspension state shared between the emulation thread (E, the sole thread that ever
/// parks) and any number of controller threads (C). Every field here is touched from both sides,
/// so every field is atomic; the acquire/release pairing around `waitForBreakResume` is what
/// guarantees E observes a controller's `Run`/`Step` write before it re-checks the park condition.
pub struct BreakController {
    break_request_count: AtomicI32,
    suspend_request_count: AtomicI32,
    wait_for_break_resume: AtomicBool,
    execution_stopped: AtomicBool,
}

impl Default for BreakController {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            break_request_count: AtomicI32::new(0),
            suspend_request_count: AtomicI32::new(0),
            wait_for_break_resume: AtomicBool::new(false),
            execution_stopped: AtomicBool::new(false),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.wait_for_break_resume.load(Ordering::Acquire)
    }

    pub fn is_execution_stopped(&self) -> bool {
        self.execution_stopped.load(Ordering::Acquire)
    }

    pub fn has_break_request(&self) -> bool {
        self.break_request_count.load(Ordering::Acquire) > 0
    }

    fn is_suspended(&self) -> bool {
        self.suspend_request_count.load(Ordering::Acquire) > 0
    }

    /// C: bracket a "please be broken during this region" request. Balanced `acquire`/`release`
    /// calls from the same controller are the caller's responsibility; an unbalanced `release`
    /// would under-count and is a caller bug, not something this type can detect.
    pub fn request_break_acquire(&self) {
        self.break_request_count.fetch_add(1, Ordering::AcqRel);
    }

    pub fn request_break_release(&self) {
        self.break_request_count.fetch_sub(1, Ordering::AcqRel);
    }

    /// C: acquire a scoped suspend. While any suspend is held, E never parks and any in-progress
    /// park exits on its next polling tick.
    pub fn suspend_acquire(&self) {
        self.suspend_request_count.fetch_add(1, Ordering::AcqRel);
    }

    /// C: release a previously acquired suspend. A release against a zero counter is logged and
    /// clamped at zero rather than allowed to go negative.
    pub fn suspend_release(&self) {
        let prev = self.suspend_request_count.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |count| Some((count - 1).max(0)),
        );
        if let Ok(0) = prev {
            log::debug!("suspend_release called with suspend_request_count already at zero");
        }
    }

    pub fn reset_suspend_counter(&self) {
        self.suspend_request_count.store(0, Ordering::Release);
    }

    /// C: clears the park flag so E's poll loop exits. Used by `Run`/`Step` after they've updated
    /// adapter step state.
    fn clear_wait_for_resume(&self) {
        self.wait_for_break_resume.store(false, Ordering::Release);
    }

    /// E: the park loop. Returns the [`BreakEvent`] delivered on entry, if any (a silent,
    /// purely-request-driven pause delivers none). Mirrors `SleepUntilResume`'s five-step
    /// contract exactly, including the 1 ms/10 ms poll-rate split.
    pub fn sleep_until_resume(
        &self,
        config: &DebugConfig,
        source_cpu: debugger_common::cpu::CpuId,
        source: BreakSource,
        operation: Option<MemoryOperationInfo>,
        breakpoint_id: Option<u32>,
        notify: &mut dyn FnMut(DebugNotification),
        source_adapter: &mut dyn CpuDebugAdapter,
    ) {
        if self.is_suspended() {
            return;
        }

        self.execution_stopped.store(true, Ordering::Release);

        let genuine_break = source != BreakSource::Unspecified || !self.has_break_request();
        let mut notified = false;
        if genuine_break {
            if config.single_breakpoint_per_instruction {
                source_adapter.set_ignore_breakpoints(true);
            }
            if config.draw_partial_frame_on_break {
                source_adapter.draw_partial_frame();
            }
            self.wait_for_break_resume.store(true, Ordering::Release);
            notify(DebugNotification::CodeBreak(BreakEvent {
                source_cpu,
                source,
                operation,
                breakpoint_id,
            }));
            notified = true;
        }

        loop {
            let parked = self.wait_for_break_resume.load(Ordering::Acquire) && !self.is_suspended();
            if !(parked || self.has_break_request()) {
                break;
            }
            if self.has_break_request() {
                thread::sleep(BREAK_REQUEST_POLL);
            } else {
                thread::sleep(IDLE_POLL);
            }
        }

        if notified {
            notify(DebugNotification::DebuggerResumed);
        }
        self.execution_stopped.store(false, Ordering::Release);
    }

    /// E: checked on every executed memory operation. Parks via [`Self::sleep_until_resume`] if
    /// a break condition fires.
    ///
    /// Takes `adapter` alone rather than a separate `&dyn BreakpointManager` borrowed from it:
    /// the breakpoint check and the subsequent mutable use of `adapter` (inside
    /// `sleep_until_resume`) would otherwise overlap the adapter's own borrow for the life of
    /// this call. Reborrowing immutably just long enough to get `bp_id` keeps the two uses
    /// sequential instead.
    pub fn process_break_conditions(
        &self,
        config: &DebugConfig,
        source_cpu: debugger_common::cpu::CpuId,
        step: StepRequest,
        operation: MemoryOperationInfo,
        adapter: &mut dyn CpuDebugAdapter,
        notify: &mut dyn FnMut(DebugNotification),
    ) {
        let bp_id = adapter.breakpoint_manager().and_then(|mgr| mgr.check(operation));

        let step_break = step.break_needed
            && (!adapter.ignore_breakpoints() || matches!(step.step_type, Some(debugger_common::step::StepType::CpuCycleStep)));

        if self.has_break_request() || self.is_paused() || step_break {
            self.sleep_until_resume(config, source_cpu, step.source, Some(operation), None, notify, adapter);
        } else if let Some(id) = bp_id {
            if !adapter.ignore_breakpoints() {
                self.sleep_until_resume(
                    config,
                    source_cpu,
                    BreakSource::Breakpoint,
                    Some(operation),
                    Some(id),
                    notify,
                    adapter,
                );
            }
        }
    }

    /// E: predictive check ahead of a prefetch/dummy cycle. Only the breakpoint branch applies;
    /// entirely skipped while the adapter is ignoring breakpoints for this instruction.
    pub fn process_predictive_breakpoint(
        &self,
        config: &DebugConfig,
        source_cpu: debugger_common::cpu::CpuId,
        address: AddressInfo,
        adapter: &mut dyn CpuDebugAdapter,
        notify: &mut dyn FnMut(DebugNotification),
    ) {
        if adapter.ignore_breakpoints() {
            return;
        }
        let Some(id) = adapter.breakpoint_manager().and_then(|mgr| mgr.check_predictive(address)) else {
            return;
        };
        self.sleep_until_resume(config, source_cpu, BreakSource::Breakpoint, None, Some(id), notify, adapter);
    }

    /// E: called by an adapter for a console-specific condition (invalid VRAM/OAM access outside
    /// vblank, and similar). A no-op unless `config` says this reason should actually break.
    pub fn break_immediately(
        &self,
        config: &DebugConfig,
        source_cpu: debugger_common::cpu::CpuId,
        reason: BreakSource,
        adapter: &mut dyn CpuDebugAdapter,
        notify: &mut dyn FnMut(DebugNotification),
    ) {
        let enabled = config.gb_break_reasons.get(&reason.to_string()).copied().unwrap_or(false);
        if !enabled {
            return;
        }
        self.sleep_until_resume(config, source_cpu, reason, None, None, notify, adapter);
    }

    /// C: run every adapter freely and unpark E.
    pub fn run_all<'a>(&self, adapters: impl Iterator<Item = &'a mut dyn CpuDebugAdapter>) {
        for adapter in adapters {
            adapter.run_step_clear();
        }
        self.clear_wait_for_resume();
    }

    /// C: scoped-suspend step of a single CPU. Every other active adapter is set to run freely so
    /// the rest of the console doesn't also halt at the next boundary.
    pub fn step_one<'a>(
        &self,
        target: debugger_common::cpu::CpuId,
        count: i32,
        step_type: debugger_common::step::StepType,
        adapters: impl Iterator<Item = (debugger_common::cpu::CpuId, &'a mut dyn CpuDebugAdapter)>,
    ) {
        let _guard = DebugBreakHelper::new(self);
        for (id, adapter) in adapters {
            if id == target {
                adapter.set_step_request(count, step_type);
            } else {
                adapter.run_step_clear();
            }
        }
        self.clear_wait_for_resume();
    }
}

/// Convenience extension so [`BreakController`] doesn't need to know `Run`'s exact adapter-level
/// effect (clearing step state) inline; kept on the adapter trait boundary via this thin shim
/// rather than duplicating `set_step_request(0, ...)` call sites.
trait RunStepClear {
    fn run_step_clear(&mut self);
}

impl<T: CpuDebugAdapter + ?Sized> RunStepClear for T {
    fn run_step_clear(&mut self) {
        self.set_step_request(0, debugger_common::step::StepType::Step);
    }
}

/// RAII scoped suspend: acquire on construction, release on drop (including on an unwind), so a
/// panic mid-operation can never leave the suspend counter permanently incremented. Backs
/// `Step`, `SetCpuState`, `SetPpuState`, `SetBreakpoints`, `ClearExecutionTrace`, and
/// `GetExecutionTrace`.
pub struct DebugBreakHelper<'a> {
    controller: &'a BreakController,
}

impl<'a> DebugBreakHelper<'a> {
    pub fn new(controller: &'a BreakController) -> Self {
        controller.suspend_acquire();
        Self { controller }
    }
}

impl Drop for DebugBreakHelper<'_> {
    fn drop(&mut self) {
        self.controller.suspend_release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::test_support::MockAdapter;
    use debugger_common::address::{MemoryOperationInfo, MemoryOperationType, MemoryType};
    use debugger_common::adapter::{Breakpoint, BreakpointManager};
    use debugger_common::cpu::CpuId;
    use test_log::test;

    fn snes_op() -> MemoryOperationInfo {
        MemoryOperationInfo::new(0, 0, MemoryOperationType::ExecOpCode, MemoryType("rom"))
    }

    /// Waits for a real controller thread to observe the park, then unparks it the way a
    /// `Run`/`Suspend` caller would -- exercising the actual cross-thread handshake instead of a
    /// notify callback simulating it synchronously on the same thread.
    fn spawn_unparker(controller: Arc<BreakController>, act: impl FnOnce(&BreakController) + Send + 'static) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            while !controller.is_execution_stopped() {
                std::thread::yield_now();
            }
            act(&controller);
        })
    }

    /// A single always-matching breakpoint, to exercise the breakpoint-hit side of
    /// `process_break_conditions` without a real `BreakpointManager` implementation.
    struct AlwaysMatchBreakpointManager;
    impl BreakpointManager for AlwaysMatchBreakpointManager {
        fn set_breakpoints(&mut self, _breakpoints: Vec<Breakpoint>) {}
        fn breakpoints(&self) -> &[Breakpoint] {
            &[]
        }
        fn check(&self, _operation: MemoryOperationInfo) -> Option<u32> {
            Some(1)
        }
    }

    struct BreakpointAdapter {
        inner: MockAdapter,
        manager: AlwaysMatchBreakpointManager,
    }

    impl std::ops::Deref for BreakpointAdapter {
        type Target = MockAdapter;
        fn deref(&self) -> &MockAdapter {
            &self.inner
        }
    }
    impl std::ops::DerefMut for BreakpointAdapter {
        fn deref_mut(&mut self) -> &mut MockAdapter {
            &mut self.inner
        }
    }

    impl CpuDebugAdapter for BreakpointAdapter {
        fn id(&self) -> CpuId {
            self.inner.id()
        }
        fn reset(&mut self) {
            self.inner.reset();
        }
        fn process_instruction(&mut self, operation: MemoryOperationInfo) {
            self.inner.process_instruction(operation);
        }
        fn process_read(&mut self, operation: MemoryOperationInfo) {
            self.inner.process_read(operation);
        }
        fn process_write(&mut self, operation: MemoryOperationInfo) {
            self.inner.process_write(operation);
        }
        fn state_size(&self) -> usize {
            self.inner.state_size()
        }
        fn read_state(&self, out: &mut [u8]) {
            self.inner.read_state(out);
        }
        fn write_state(&mut self, data: &[u8]) {
            self.inner.write_state(data);
        }
        fn program_counter(&self) -> u32 {
            self.inner.program_counter()
        }
        fn set_program_counter(&mut self, pc: u32) {
            self.inner.set_program_counter(pc);
        }
        fn allow_change_program_counter(&self) -> bool {
            self.inner.allow_change_program_counter()
        }
        fn set_allow_change_program_counter(&mut self, allow: bool) {
            self.inner.set_allow_change_program_counter(allow);
        }
        fn ignore_breakpoints(&self) -> bool {
            self.inner.ignore_breakpoints()
        }
        fn set_ignore_breakpoints(&mut self, ignore: bool) {
            self.inner.set_ignore_breakpoints(ignore);
        }
        fn instruction_progress(&self) -> debugger_common::state::InstructionProgress {
            self.inner.instruction_progress()
        }
        fn set_last_memory_operation_type(&mut self, op_type: MemoryOperationType) {
            self.inner.set_last_memory_operation_type(op_type);
        }
        fn cpu_cycle_count(&self) -> u64 {
            self.inner.cpu_cycle_count()
        }
        fn step_request(&self) -> StepRequest {
            self.inner.step_request()
        }
        fn set_step_request(&mut self, count: i32, step_type: debugger_common::step::StepType) {
            self.inner.set_step_request(count, step_type);
        }
        fn breakpoint_manager(&self) -> Option<&dyn BreakpointManager> {
            Some(&self.manager)
        }
    }

    // Single-step-from-running: a step
    // request armed on the emulation thread parks it at the instruction boundary; a separate
    // controller thread observes the park and unparks it with `Run`, exactly as two real threads
    // would.
    #[test]
    fn step_then_external_run_unparks_across_real_threads() {
        let controller = Arc::new(BreakController::new());
        let mut adapter = MockAdapter::new(CpuId::Snes);
        adapter.set_step_request(1, debugger_common::step::StepType::Step);
        let op = snes_op();
        adapter.process_instruction(op);
        let step = adapter.step_request();
        assert!(step.break_needed);

        let handle = spawn_unparker(Arc::clone(&controller), |c| c.run_all(std::iter::empty()));

        let notifications = Arc::new(Mutex::new(Vec::new()));
        let notifications_for_main = Arc::clone(&notifications);
        controller.process_break_conditions(
            &DebugConfig::default(),
            CpuId::Snes,
            step,
            op,
            &mut adapter,
            &mut |n| notifications_for_main.lock().unwrap().push(n),
        );

        handle.join().unwrap();
        assert!(!controller.is_paused());
        let notes = notifications.lock().unwrap();
        assert!(matches!(notes[0], DebugNotification::CodeBreak(_)));
        assert!(matches!(notes[1], DebugNotification::DebuggerResumed));
    }

    // Asynchronous break: a controller's
    // break request parks the emulation thread with no concrete break source; no `CodeBreak`
    // notification is ever delivered for it.
    #[test]
    fn break_request_parks_without_a_visible_notification() {
        let controller = Arc::new(BreakController::new());
        let mut adapter = MockAdapter::new(CpuId::Snes);
        let op = snes_op();

        controller.request_break_acquire();
        let handle = spawn_unparker(Arc::clone(&controller), |c| c.request_break_release());

        let notifications = Arc::new(Mutex::new(Vec::new()));
        let notifications_for_main = Arc::clone(&notifications);
        controller.process_break_conditions(
            &DebugConfig::default(),
            CpuId::Snes,
            adapter.step_request(),
            op,
            &mut adapter,
            &mut |n| notifications_for_main.lock().unwrap().push(n),
        );

        handle.join().unwrap();
        assert!(notifications.lock().unwrap().is_empty());
    }

    // Scoped suspend during a breakpoint: a controller
    // taking a scoped suspend while parked at a genuine break must unpark it immediately rather
    // than wait behind the break.
    #[test]
    fn scoped_suspend_unparks_a_genuine_break() {
        let controller = Arc::new(BreakController::new());
        let mut adapter = MockAdapter::new(CpuId::Snes);
        adapter.set_step_request(1, debugger_common::step::StepType::Step);
        let op = snes_op();
        adapter.process_instruction(op);
        let step = adapter.step_request();

        let handle = spawn_unparker(Arc::clone(&controller), |c| c.suspend_acquire());

        let notifications = Arc::new(Mutex::new(Vec::new()));
        let notifications_for_main = Arc::clone(&notifications);
        controller.process_break_conditions(
            &DebugConfig::default(),
            CpuId::Snes,
            step,
            op,
            &mut adapter,
            &mut |n| notifications_for_main.lock().unwrap().push(n),
        );

        handle.join().unwrap();
        let notes = notifications.lock().unwrap();
        assert!(matches!(notes[0], DebugNotification::CodeBreak(_)));
        assert!(matches!(notes[1], DebugNotification::DebuggerResumed));
    }

    // One break per instruction: two breakpoint matches
    // on the same instruction boundary must only ever surface one `CodeBreak`: the first park
    // sets `ignore_breakpoints`, which suppresses the second check entirely.
    #[test]
    fn single_breakpoint_per_instruction_suppresses_a_second_hit() {
        let controller = Arc::new(BreakController::new());
        let mut adapter = BreakpointAdapter { inner: MockAdapter::new(CpuId::Snes), manager: AlwaysMatchBreakpointManager };
        let op = snes_op();
        let config = DebugConfig { single_breakpoint_per_instruction: true, ..DebugConfig::default() };

        let handle = spawn_unparker(Arc::clone(&controller), |c| c.run_all(std::iter::empty()));

        let notifications = Arc::new(Mutex::new(Vec::new()));
        let notifications_for_main = Arc::clone(&notifications);
        controller.process_break_conditions(
            &config,
            CpuId::Snes,
            adapter.step_request(),
            op,
            &mut adapter,
            &mut |n| notifications_for_main.lock().unwrap().push(n),
        );
        handle.join().unwrap();

        // Second hit on the same instruction: `ignore_breakpoints` is now set, so this returns
        // immediately without parking at all.
        controller.process_break_conditions(
            &config,
            CpuId::Snes,
            adapter.step_request(),
            op,
            &mut adapter,
            &mut |n| notifications.lock().unwrap().push(n),
        );

        let notes = notifications.lock().unwrap();
        assert_eq!(notes.iter().filter(|n| matches!(n, DebugNotification::CodeBreak(_))).count(), 1);
    }

    #[test]
    fn suspend_release_clamps_at_zero() {
        let controller = BreakController::new();
        controller.suspend_release();
        controller.suspend_release();
        assert!(!controller.is_suspended_for_test());
    }

    #[test]
    fn silent_break_suppresses_notification() {
        let controller = BreakController::new();
        controller.request_break_acquire();
        let mut adapter = MockAdapter::new(CpuId::Snes);
        let mut notifications = Vec::new();
        controller.sleep_until_resume(
            &DebugConfig::default(),
            CpuId::Snes,
            BreakSource::Unspecified,
            None,
            None,
            &mut |n| notifications.push(n),
            &mut adapter,
        );
        assert!(notifications.is_empty());
    }

    #[test]
    fn genuine_break_pairs_notifications() {
        let controller = BreakController::new();
        let mut adapter = MockAdapter::new(CpuId::Snes);
        let mut notifications = Vec::new();
        // The park loop has no other thread to unpark it here, so the notify callback itself
        // simulates a controller's `Run()` clearing the park flag the instant the break fires.
        controller.sleep_until_resume(
            &DebugConfig::default(),
            CpuId::Snes,
            BreakSource::Step,
            None,
            None,
            &mut |n| {
                if matches!(n, DebugNotification::CodeBreak(_)) {
                    controller.clear_wait_for_resume();
                }
                notifications.push(n);
            },
            &mut adapter,
        );
        assert!(matches!(notifications[0], DebugNotification::CodeBreak(_)));
        assert!(matches!(notifications[1], DebugNotification::DebuggerResumed));
    }

    // A genuine break draws a partial frame iff the config asks for it.
    #[test]
    fn genuine_break_draws_partial_frame_only_when_configured() {
        let controller = BreakController::new();
        let mut adapter = MockAdapter::new(CpuId::Snes);
        let config = DebugConfig { draw_partial_frame_on_break: true, ..DebugConfig::default() };
        controller.sleep_until_resume(
            &config,
            CpuId::Snes,
            BreakSource::Step,
            None,
            None,
            &mut |n| {
                if matches!(n, DebugNotification::CodeBreak(_)) {
                    controller.clear_wait_for_resume();
                }
            },
            &mut adapter,
        );
        assert_eq!(adapter.draw_partial_frame_count, 1);

        let controller = BreakController::new();
        let mut adapter = MockAdapter::new(CpuId::Snes);
        let config = DebugConfig { draw_partial_frame_on_break: false, ..DebugConfig::default() };
        controller.sleep_until_resume(
            &config,
            CpuId::Snes,
            BreakSource::Step,
            None,
            None,
            &mut |n| {
                if matches!(n, DebugNotification::CodeBreak(_)) {
                    controller.clear_wait_for_resume();
                }
            },
            &mut adapter,
        );
        assert_eq!(adapter.draw_partial_frame_count, 0);
    }

    impl BreakController {
        fn is_suspended_for_test(&self) -> bool {
            self.is_suspended()
        }
    }
}
