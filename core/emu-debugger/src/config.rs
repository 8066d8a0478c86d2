use debugger_proc_macros::ConfigDisplay;

/// Coordinator-level settings that affect break behavior but never which CpuIds exist or what
/// they support. Console-specific adapter config (e.g. which GB quirks raise a break) lives on
/// the adapters themselves.
#[derive(Debug, Clone, ConfigDisplay)]
pub struct DebugConfig {
    /// When multiple breakpoints match the same instruction, deliver only the first `CodeBreak`
    /// and set `ignore_breakpoints` on the source adapter until the next instruction boundary.
    pub single_breakpoint_per_instruction: bool,

    /// Break immediately on construction, before the emulation thread runs its first instruction.
    pub break_on_entry: bool,

    /// Ask the source adapter to draw a partial frame before parking, so the UI's screen view
    /// isn't left showing a half-rendered frame from before the break.
    pub draw_partial_frame_on_break: bool,

    /// Per-`BreakSource::Gb*` reasons, whether `BreakImmediately` actually parks. Keyed by the
    /// reason's `BreakSource` display name; absent entries default to `false` (no break).
    #[cfg_display(skip)]
    pub gb_break_reasons: std::collections::HashMap<String, bool>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            single_breakpoint_per_instruction: true,
            break_on_entry: false,
            draw_partial_frame_on_break: true,
            gb_break_reasons: std::collections::HashMap::new(),
        }
    }
}
