//! The central debugger coordinator: the fan-in/fan-out hub every CPU core and PPU calls into on
//! each executed instruction, memory access, idle cycle, interrupt, and video cycle. Dispatches
//! to per-CPU debug adapters (see [`debugger_common::adapter::CpuDebugAdapter`]), evaluates
//! breakpoints, parks the emulation thread at breaks, merges per-CPU trace logs into one
//! chronological timeline, and arbitrates run/step/suspend transitions between the emulation
//! thread and external controllers.
//!
//! Adapter implementations, the expression grammar, script-engine internals, and disassembly
//! rendering are out of scope here and live alongside each console backend; this crate only
//! consumes the [`debugger_common`] capability interfaces.

pub mod break_controller;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod eval;
pub mod event_router;
pub mod fanout;
pub mod script;
pub mod trace;

#[cfg(test)]
mod test_support;

pub use break_controller::{BreakController, DebugBreakHelper};
pub use config::DebugConfig;
pub use coordinator::Coordinator;
pub use dispatch::{AdapterSlot, DispatchTable};
