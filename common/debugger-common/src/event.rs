use debugger_proc_macros::EnumDisplay;

/// Console-lifecycle events raised by the emulation thread and fanned out by the Event Router
/// (to the script engine, and to a handful of hard-coded housekeeping reactions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay)]
pub enum EventType {
    StartFrame,
    EndFrame,
    /// Game Boy variant of `StartFrame`. Kept as a separate event (rather than folded into
    /// `StartFrame`) because on an SGB console the generic frame events belong to the SNES main
    /// CPU while this one belongs to the embedded GB CPU; see [`crate::event`] docs.
    GbStartFrame,
    GbEndFrame,
    Reset,
    StateLoaded,
    Nmi,
    Irq,
}
