use debugger_proc_macros::{EnumAll, EnumDisplay};

/// Which memory space an address belongs to (cartridge ROM, work RAM, a coprocessor's own RAM,
/// PPU VRAM, ...). Kept deliberately open-ended here: the set of regions is console-specific and
/// owned by the (out-of-scope) memory-mapping layer, not by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryType(pub &'static str);

/// A console-absolute address: a region tag plus an offset within that region. This is the
/// canonical address the coordinator and its tools operate on, distinct from whatever
/// CPU-relative address space a given `CpuId` uses on its bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressInfo {
    pub memory_type: MemoryType,
    pub address: u32,
}

/// The kind of bus transaction a [`MemoryOperationInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay, EnumAll)]
pub enum MemoryOperationType {
    Read,
    Write,
    ExecOpCode,
    ExecOperand,
    DmaRead,
    DmaWrite,
    DummyRead,
    DummyWrite,
    Idle,
}

impl MemoryOperationType {
    /// Whether this operation type represents code actually being fetched and run, as opposed
    /// to a dummy/DMA/idle bus cycle. Used by predictive-breakpoint checks.
    #[must_use]
    pub const fn is_exec(self) -> bool {
        matches!(self, Self::ExecOpCode | Self::ExecOperand)
    }
}

/// A single bus access as reported to the coordinator by a CPU core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryOperationInfo {
    pub address: u32,
    pub value: u8,
    pub op_type: MemoryOperationType,
    pub memory_type: MemoryType,
}

impl MemoryOperationInfo {
    #[must_use]
    pub const fn new(
        address: u32,
        value: u8,
        op_type: MemoryOperationType,
        memory_type: MemoryType,
    ) -> Self {
        Self { address, value, op_type, memory_type }
    }
}

impl Default for MemoryType {
    fn default() -> Self {
        Self("none")
    }
}

impl Default for MemoryOperationInfo {
    fn default() -> Self {
        Self { address: 0, value: 0, op_type: MemoryOperationType::Idle, memory_type: MemoryType::default() }
    }
}

/// The console's memory-mapping collaborator: translates between a CPU's relative bus address
/// and the coordinator's canonical absolute [`AddressInfo`]. How a console maps its address
/// spaces is out of scope here -- the coordinator only ever forwards to this.
pub trait AddressTranslator: Send {
    fn to_absolute(&self, relative: AddressInfo) -> AddressInfo;
    fn to_relative(&self, absolute: AddressInfo, cpu: crate::cpu::CpuId) -> AddressInfo;
}

/// An [`AddressTranslator`] that passes addresses through unchanged. Used when a caller has no
/// console-specific mapping to install, e.g. in tests.
#[derive(Debug, Default)]
pub struct IdentityAddressTranslator;

impl AddressTranslator for IdentityAddressTranslator {
    fn to_absolute(&self, relative: AddressInfo) -> AddressInfo {
        relative
    }

    fn to_relative(&self, absolute: AddressInfo, _cpu: crate::cpu::CpuId) -> AddressInfo {
        absolute
    }
}
