//! Minimal in-memory adapter used only by this crate's own unit and integration tests. Exercises
//! the [`CpuDebugAdapter`] contract without depending on any real CPU core.
#![cfg(test)]

use debugger_common::adapter::CpuDebugAdapter;
use debugger_common::address::{MemoryOperationInfo, MemoryOperationType};
use debugger_common::cpu::CpuId;
use debugger_common::state::InstructionProgress;
use debugger_common::step::{StepRequest, StepType};

pub struct MockAdapter {
    id: CpuId,
    ignore_breakpoints: bool,
    allow_change_pc: bool,
    program_counter: u32,
    step: StepRequest,
    progress: InstructionProgress,
    cpu_cycle_count: u64,
    state: Vec<u8>,
    ppu_state: Vec<u8>,
    pub draw_partial_frame_count: u32,
}

impl MockAdapter {
    #[must_use]
    pub fn new(id: CpuId) -> Self {
        Self {
            id,
            ignore_breakpoints: false,
            allow_change_pc: false,
            program_counter: 0,
            step: StepRequest::running(),
            progress: InstructionProgress::default(),
            cpu_cycle_count: 0,
            state: vec![0; 16],
            ppu_state: vec![0; 4],
            draw_partial_frame_count: 0,
        }
    }

}

impl CpuDebugAdapter for MockAdapter {
    fn id(&self) -> CpuId {
        self.id
    }

    fn reset(&mut self) {
        self.program_counter = 0;
        self.cpu_cycle_count = 0;
    }

    fn process_instruction(&mut self, operation: MemoryOperationInfo) {
        self.progress.last_memory_operation = operation;
        self.cpu_cycle_count += 1;
        self.step.tick();
    }

    fn process_read(&mut self, operation: MemoryOperationInfo) {
        self.progress.last_memory_operation = operation;
    }

    fn process_write(&mut self, operation: MemoryOperationInfo) {
        self.progress.last_memory_operation = operation;
    }

    fn process_idle_cycle(&mut self) {
        self.cpu_cycle_count += 1;
    }

    fn draw_partial_frame(&mut self) {
        self.draw_partial_frame_count += 1;
    }

    fn state_size(&self) -> usize {
        self.state.len()
    }

    fn read_state(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.state[..out.len()]);
    }

    fn write_state(&mut self, data: &[u8]) {
        self.state[..data.len()].copy_from_slice(data);
    }

    fn ppu_state_size(&self) -> usize {
        self.ppu_state.len()
    }

    fn read_ppu_state(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.ppu_state[..out.len()]);
    }

    fn write_ppu_state(&mut self, data: &[u8]) {
        self.ppu_state[..data.len()].copy_from_slice(data);
    }

    fn program_counter(&self) -> u32 {
        self.program_counter
    }

    fn set_program_counter(&mut self, pc: u32) {
        self.program_counter = pc;
    }

    fn allow_change_program_counter(&self) -> bool {
        self.allow_change_pc
    }

    fn set_allow_change_program_counter(&mut self, allow: bool) {
        self.allow_change_pc = allow;
    }

    fn ignore_breakpoints(&self) -> bool {
        self.ignore_breakpoints
    }

    fn set_ignore_breakpoints(&mut self, ignore: bool) {
        self.ignore_breakpoints = ignore;
    }

    fn instruction_progress(&self) -> InstructionProgress {
        self.progress
    }

    fn set_last_memory_operation_type(&mut self, op_type: MemoryOperationType) {
        self.progress.last_memory_operation.op_type = op_type;
    }

    fn cpu_cycle_count(&self) -> u64 {
        self.cpu_cycle_count
    }

    fn step_request(&self) -> StepRequest {
        self.step
    }

    fn set_step_request(&mut self, count: i32, step_type: StepType) {
        self.step = if count == 0 { StepRequest::running() } else { StepRequest::new(count, step_type) };
    }
}
