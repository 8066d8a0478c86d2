use debugger_common::cpu::CpuId;
use debugger_common::eval::{EvalResult, EvalResultType, ExpressionEvaluator};

use crate::break_controller::DebugBreakHelper;
use crate::dispatch::DispatchTable;

/// State and expression accessors. Functions here only touch the dispatch table and the
/// break controller; the actual register layout and expression grammar belong to the adapters
/// and their evaluators.
pub struct Accessors<'a> {
    pub dispatch: &'a mut DispatchTable,
    pub breaks: &'a crate::break_controller::BreakController,
}

impl Accessors<'_> {
    /// Evaluates `expression` against `cpu`'s state. With `use_cache`, reuses the adapter-bound
    /// evaluator stored in its slot (which may memoize sub-expressions); otherwise, `fresh`
    /// builds a throwaway one. An absent CpuId evaluates to `Invalid` rather than erroring.
    pub fn evaluate_expression(
        &mut self,
        expression: &str,
        cpu: CpuId,
        use_cache: bool,
        fresh: impl FnOnce() -> Box<dyn ExpressionEvaluator>,
    ) -> EvalResult {
        let Some(slot) = self.dispatch.get_mut(cpu) else {
            return EvalResult { value: 0, result_type: EvalResultType::Invalid };
        };
        if use_cache {
            slot.evaluator.evaluate(expression, slot.adapter.as_ref(), false)
        } else {
            fresh().evaluate(expression, slot.adapter.as_ref(), false)
        }
    }

    /// Copies `cpu`'s register state into `out`. `out` must be at least `state_size()` long;
    /// excess bytes are left untouched, mirroring a byte-buffer "view" rather than a typed
    /// struct copy.
    pub fn get_cpu_state(&self, cpu: CpuId, out: &mut [u8]) {
        if let Some(slot) = self.dispatch.get(cpu) {
            slot.adapter.read_state(out);
        }
    }

    /// Writes `data` into `cpu`'s register state under a scoped suspend, so the emulation thread
    /// never observes a partially written state.
    pub fn set_cpu_state(&mut self, cpu: CpuId, data: &[u8]) {
        let _guard = DebugBreakHelper::new(self.breaks);
        if let Some(slot) = self.dispatch.get_mut(cpu) {
            slot.adapter.write_state(data);
        }
    }

    pub fn ppu_state_size(&self, cpu: CpuId) -> usize {
        self.ppu_owner(cpu).map_or(0, |slot| slot.adapter.ppu_state_size())
    }

    pub fn get_ppu_state(&self, cpu: CpuId, out: &mut [u8]) {
        if let Some(slot) = self.ppu_owner(cpu) {
            slot.adapter.read_ppu_state(out);
        }
    }

    pub fn set_ppu_state(&mut self, cpu: CpuId, data: &[u8]) {
        let _guard = DebugBreakHelper::new(self.breaks);
        let owner = Self::ppu_owner_id(cpu);
        if let Some(slot) = self.dispatch.get_mut(owner) {
            slot.adapter.write_ppu_state(data);
        }
    }

    /// `SetProgramCounter` is rejected unless the adapter says it's currently between an
    /// `OnInstruction` entry and exit for this CPU.
    pub fn set_program_counter(&mut self, cpu: CpuId, address: u32) {
        if let Some(slot) = self.dispatch.get_mut(cpu) {
            if slot.adapter.allow_change_program_counter() {
                slot.adapter.set_program_counter(address);
            }
        }
    }

    pub fn program_counter(&self, cpu: CpuId) -> Option<u32> {
        self.dispatch.get(cpu).map(|slot| slot.adapter.program_counter())
    }

    /// For the SNES family (Snes, Spc, NecDsp, Sa1, Gsu, Cx4), PPU state funnels through the
    /// SNES adapter itself -- those coprocessors don't host a PPU of their own.
    pub(crate) fn ppu_owner_id(cpu: CpuId) -> CpuId {
        match cpu {
            CpuId::Spc | CpuId::NecDsp | CpuId::Sa1 | CpuId::Gsu | CpuId::Cx4 => CpuId::Snes,
            other => other,
        }
    }

    fn ppu_owner(&self, cpu: CpuId) -> Option<&crate::dispatch::AdapterSlot> {
        self.dispatch.get(Self::ppu_owner_id(cpu))
    }
}

#[cfg(test)]
pub struct NullEvaluator;

#[cfg(test)]
impl ExpressionEvaluator for NullEvaluator {
    fn tokenize(&self, _expression: &str) -> Vec<String> {
        Vec::new()
    }

    fn evaluate(
        &mut self,
        _expression: &str,
        _adapter: &dyn debugger_common::adapter::CpuDebugAdapter,
        _in_condition_context: bool,
    ) -> EvalResult {
        EvalResult::invalid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::break_controller::BreakController;
    use crate::dispatch::AdapterSlot;
    use crate::test_support::MockAdapter;

    fn table_with(cpu: CpuId) -> DispatchTable {
        let mut table = DispatchTable::new();
        table.insert(cpu, AdapterSlot::new(Box::new(MockAdapter::new(cpu)), Box::new(NullEvaluator)));
        table
    }

    #[test]
    fn evaluate_on_absent_cpu_is_invalid() {
        let mut table = DispatchTable::new();
        let breaks = BreakController::new();
        let mut accessors = Accessors { dispatch: &mut table, breaks: &breaks };
        let result = accessors.evaluate_expression("1+1", CpuId::Snes, true, || Box::new(NullEvaluator));
        assert_eq!(result.result_type, EvalResultType::Invalid);
    }

    #[test]
    fn coprocessor_ppu_state_funnels_through_snes() {
        let mut table = table_with(CpuId::Snes);
        let breaks = BreakController::new();
        let mut accessors = Accessors { dispatch: &mut table, breaks: &breaks };
        let mut out = [0u8; 4];
        accessors.get_ppu_state(CpuId::Sa1, &mut out);
        assert_eq!(out, [0, 0, 0, 0]);
    }

    #[test]
    fn pc_write_rejected_outside_instruction_boundary() {
        let mut table = table_with(CpuId::Snes);
        let breaks = BreakController::new();
        let mut accessors = Accessors { dispatch: &mut table, breaks: &breaks };
        accessors.set_program_counter(CpuId::Snes, 0x8000);
        assert_eq!(accessors.program_counter(CpuId::Snes), Some(0));
    }
}
