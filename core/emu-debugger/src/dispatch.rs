use debugger_common::adapter::CpuDebugAdapter;
use debugger_common::cpu::{CPU_ID_COUNT, CpuId};
use debugger_common::eval::ExpressionEvaluator;

/// One populated entry in the dispatch table: exclusive ownership of a CPU's adapter plus its
/// pre-bound expression evaluator. Boxed rather than stored inline because the concrete adapter
/// type differs per `CpuId` and the table needs a uniform slot size.
pub struct AdapterSlot {
    pub adapter: Box<dyn CpuDebugAdapter>,
    pub evaluator: Box<dyn ExpressionEvaluator>,
}

impl AdapterSlot {
    #[must_use]
    pub fn new(adapter: Box<dyn CpuDebugAdapter>, evaluator: Box<dyn ExpressionEvaluator>) -> Self {
        Self { adapter, evaluator }
    }
}

/// Dense `CpuId -> slot` table. A fixed-size array rather than a `HashMap` so an absent slot is
/// a cheap null check and a present one is direct indexing, both allocation-free; this is what
/// lets the hot instrumentation entry points skip CpuIds the current console doesn't host without
/// paying for a hash lookup first.
#[derive(Default)]
pub struct DispatchTable {
    slots: [Option<AdapterSlot>; CPU_ID_COUNT],
}

impl DispatchTable {
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Default::default() }
    }

    pub fn insert(&mut self, id: CpuId, slot: AdapterSlot) {
        self.slots[id.index()] = Some(slot);
    }

    #[must_use]
    pub fn get(&self, id: CpuId) -> Option<&AdapterSlot> {
        self.slots[id.index()].as_ref()
    }

    #[must_use]
    pub fn get_mut(&mut self, id: CpuId) -> Option<&mut AdapterSlot> {
        self.slots[id.index()].as_mut()
    }

    #[must_use]
    pub fn has(&self, id: CpuId) -> bool {
        self.slots[id.index()].is_some()
    }

    /// Iterates only the populated slots, in `CpuId` declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (CpuId, &AdapterSlot)> {
        CpuId::ALL.iter().filter_map(|&id| self.get(id).map(|slot| (id, slot)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CpuId, &mut AdapterSlot)> {
        self.slots
            .iter_mut()
            .zip(CpuId::ALL.iter())
            .filter_map(|(slot, &id)| slot.as_mut().map(|slot| (id, slot)))
    }
}
