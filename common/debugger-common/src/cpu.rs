use debugger_proc_macros::{EnumAll, EnumDisplay, EnumFromStr};

/// Every CPU core the coordinator knows how to drive a debug adapter for.
///
/// This is a closed, dense enumeration: each variant maps to a fixed array index via
/// [`CpuId::index`], which the dispatch table and break-controller slots use for O(1),
/// allocation-free lookups. Adding a tenth CPU family means updating this enum, [`CpuId::ALL`]
/// (generated by `EnumAll`), and every exhaustive `match` over it -- the compiler will flag every
/// site that needs updating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay, EnumFromStr, EnumAll)]
pub enum CpuId {
    Snes,
    Spc,
    NecDsp,
    Sa1,
    Gsu,
    Cx4,
    Gameboy,
    Nes,
    Pce,
}

/// Number of [`CpuId`] variants; also the fixed size of every dense per-CPU table.
pub const CPU_ID_COUNT: usize = CpuId::ALL.len();

impl CpuId {
    /// Dense array index for this CPU, in `0..CPU_ID_COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this CPU has a PPU/graphics unit attached, i.e. whether `OnPpuRead` /
    /// `OnPpuWrite` / `OnPpuCycle` are ever valid for it.
    #[must_use]
    pub const fn hosts_ppu(self) -> bool {
        matches!(self, Self::Snes | Self::Gameboy | Self::Nes | Self::Pce)
    }

    /// Whether this CPU has observable idle bus cycles, i.e. whether `OnIdleCycle` is ever
    /// valid for it.
    #[must_use]
    pub const fn has_idle_cycles(self) -> bool {
        matches!(self, Self::Snes | Self::Sa1)
    }
}

/// Host machine being emulated. Determines which [`CpuId`]s are active and which of them is
/// the "main" CPU for frame-level event routing (see [`ConsoleId::main_cpu`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay, EnumFromStr, EnumAll)]
pub enum ConsoleId {
    Snes,
    Nes,
    Gameboy,
    Pce,
}

impl ConsoleId {
    /// The CPUs present for this console, main CPU first.
    #[must_use]
    pub const fn active_cpus(self) -> &'static [CpuId] {
        match self {
            // Coprocessors present depend on the cartridge; list every CPU the coordinator might
            // need a slot for. Absent coprocessors simply never get an adapter installed.
            Self::Snes => {
                &[CpuId::Snes, CpuId::Spc, CpuId::Sa1, CpuId::Gsu, CpuId::NecDsp, CpuId::Cx4]
            }
            Self::Nes => &[CpuId::Nes],
            // SGB embeds a Game Boy CPU inside an SNES console; that composition is handled by
            // the caller constructing two coordinators' worth of slots, not by this table.
            Self::Gameboy => &[CpuId::Gameboy],
            Self::Pce => &[CpuId::Pce],
        }
    }

    /// First CPU in [`Self::active_cpus`]; receives frame-level event routing.
    #[must_use]
    pub const fn main_cpu(self) -> CpuId {
        self.active_cpus()[0]
    }
}
