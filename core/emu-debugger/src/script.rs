use std::panic::{AssertUnwindSafe, catch_unwind};

use debugger_common::cpu::CpuId;
use debugger_common::event::EventType;
use debugger_common::address::MemoryOperationInfo;

use crate::fanout::ScriptSink;

/// Internals of a loaded script engine, out of scope here; implementers plug in whatever runs
/// user scripts (Lua, JS, ...). Called from the hot path on every memory op when a script is
/// loaded, so implementations must not block.
pub trait ScriptEngine: Send {
    fn on_memory_operation(&mut self, cpu: CpuId, operation: MemoryOperationInfo);
    fn on_event(&mut self, cpu: CpuId, event: EventType);
}

/// Wraps a loaded [`ScriptEngine`] so a panic raised inside a script callback (the idiomatic
/// Rust stand-in for the host language's "script engine raises an exception" case) is caught and
/// logged instead of unwinding into the emulation thread's hot path and tearing the whole process
/// down. The script engine is expected to handle its own internal errors; this is a last resort.
pub struct GuardedScriptEngine<E> {
    engine: E,
}

impl<E: ScriptEngine> GuardedScriptEngine<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: ScriptEngine> ScriptSink for GuardedScriptEngine<E> {
    fn on_memory_operation(&mut self, cpu: CpuId, operation: MemoryOperationInfo) {
        let engine = AssertUnwindSafe(&mut self.engine);
        if catch_unwind(move || engine.0.on_memory_operation(cpu, operation)).is_err() {
            log::error!("script engine panicked while handling a memory operation on {cpu}");
        }
    }

    fn on_event(&mut self, cpu: CpuId, event: EventType) {
        let engine = AssertUnwindSafe(&mut self.engine);
        if catch_unwind(move || engine.0.on_event(cpu, event)).is_err() {
            log::error!("script engine panicked while handling event {event} on {cpu}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PanicsOnWrite;
    impl ScriptEngine for PanicsOnWrite {
        fn on_memory_operation(&mut self, _cpu: CpuId, operation: MemoryOperationInfo) {
            if operation.value == 0xFF {
                panic!("boom");
            }
        }
        fn on_event(&mut self, _cpu: CpuId, _event: EventType) {}
    }

    #[test]
    fn panic_in_script_does_not_propagate() {
        let mut guarded = GuardedScriptEngine::new(PanicsOnWrite);
        let op = debugger_common::address::MemoryOperationInfo::new(
            0,
            0xFF,
            debugger_common::address::MemoryOperationType::Write,
            debugger_common::address::MemoryType("wram"),
        );
        // Should not unwind out of this test.
        guarded.on_memory_operation(CpuId::Snes, op);
    }
}
