use debugger_common::adapter::MemoryAccessCounter;
use debugger_common::cpu::{ConsoleId, CpuId};
use debugger_common::event::EventType;
use debugger_common::notification::DebugNotification;

use crate::dispatch::DispatchTable;
use crate::fanout::ScriptSink;

/// Fans console-lifecycle events out to every adapter's event manager, the script engine, and a
/// handful of hard-coded housekeeping reactions (UI refresh, frame-event clearing). Single entry
/// point, called only from the emulation thread.
pub struct EventRouter<'a> {
    pub dispatch: &'a mut DispatchTable,
    pub console: ConsoleId,
    pub memory_access_counter: &'a mut dyn MemoryAccessCounter,
}

impl EventRouter<'_> {
    /// `source` is the CPU that raised the event (relevant for `Nmi`/`Irq`, which can come from
    /// any active CPU); the frame/reset/state-loaded events below route by the console's main
    /// CPU regardless of `source` since they're console-wide, not per-CPU.
    pub fn on_event(
        &mut self,
        event_type: EventType,
        source: CpuId,
        script: &mut dyn ScriptSink,
        notify: &mut dyn FnMut(DebugNotification),
    ) {
        let main_cpu = self.console.main_cpu();
        script.on_event(source, event_type);

        match event_type {
            EventType::StartFrame => {
                notify(DebugNotification::EventViewerRefresh(main_cpu));
                self.clear_event_manager(main_cpu);
            }
            // On an SGB console (a Game Boy embedded in an SNES cartridge slot) the generic frame
            // events belong to the SNES main CPU while these belong to the embedded GB CPU. Only
            // `GbStartFrame` refreshes the GB event viewer and clears its frame events; the
            // *translated* generic StartFrame/EndFrame forwarded to the script engine is gated on
            // the console actually being a Game Boy, since a script running against a plain SGB
            // host expects its StartFrame/EndFrame to mean the SNES frame, not the embedded GB's.
            // `GbEndFrame` does nothing beyond that gated script forward.
            EventType::GbStartFrame | EventType::GbEndFrame => {
                if matches!(self.console, ConsoleId::Gameboy) {
                    let generic = if event_type == EventType::GbStartFrame {
                        EventType::StartFrame
                    } else {
                        EventType::EndFrame
                    };
                    script.on_event(CpuId::Gameboy, generic);
                }
                if event_type == EventType::GbStartFrame {
                    notify(DebugNotification::EventViewerRefresh(CpuId::Gameboy));
                    self.clear_event_manager(CpuId::Gameboy);
                }
            }
            EventType::Reset => {
                for (_, slot) in self.dispatch.iter_mut() {
                    slot.adapter.reset();
                }
                self.memory_access_counter.reset_counts();
            }
            EventType::StateLoaded => {
                self.memory_access_counter.reset_counts();
            }
            EventType::EndFrame | EventType::Nmi | EventType::Irq => {}
        }
    }

    fn clear_event_manager(&mut self, cpu: CpuId) {
        if let Some(slot) = self.dispatch.get_mut(cpu) {
            if let Some(events) = slot.adapter.event_manager_mut() {
                events.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::NoScript;
    use crate::test_support::MockAdapter;

    #[test]
    fn start_frame_refreshes_main_cpu_viewer() {
        let mut table = DispatchTable::new();
        table.insert(
            CpuId::Snes,
            crate::dispatch::AdapterSlot::new(Box::new(MockAdapter::new(CpuId::Snes)), Box::new(crate::eval::NullEvaluator)),
        );
        let mut counter = debugger_common::adapter::NullMemoryAccessCounter;
        let mut router = EventRouter { dispatch: &mut table, console: ConsoleId::Snes, memory_access_counter: &mut counter };
        let mut notifications = Vec::new();
        router.on_event(EventType::StartFrame, CpuId::Snes, &mut NoScript, &mut |n| notifications.push(n));
        assert!(matches!(notifications[0], DebugNotification::EventViewerRefresh(CpuId::Snes)));
    }

    #[test]
    fn reset_clears_memory_counters_not_event_managers() {
        struct CountingCounter(u32);
        impl MemoryAccessCounter for CountingCounter {
            fn reset_counts(&mut self) {
                self.0 += 1;
            }
        }

        let mut table = DispatchTable::new();
        table.insert(
            CpuId::Snes,
            crate::dispatch::AdapterSlot::new(Box::new(MockAdapter::new(CpuId::Snes)), Box::new(crate::eval::NullEvaluator)),
        );
        let mut counter = CountingCounter(0);
        let mut router = EventRouter { dispatch: &mut table, console: ConsoleId::Snes, memory_access_counter: &mut counter };
        let mut notifications = Vec::new();
        router.on_event(EventType::Reset, CpuId::Snes, &mut NoScript, &mut |n| notifications.push(n));
        assert_eq!(counter.0, 1);
    }

    // `GbEndFrame` forwards the translated `EndFrame` to the script engine (on a plain Game Boy
    // console) but must not refresh the GB event viewer or clear its frame events -- only
    // `GbStartFrame` does that.
    #[test]
    fn gb_end_frame_emits_no_notification() {
        let mut table = DispatchTable::new();
        table.insert(
            CpuId::Gameboy,
            crate::dispatch::AdapterSlot::new(Box::new(MockAdapter::new(CpuId::Gameboy)), Box::new(crate::eval::NullEvaluator)),
        );
        let mut counter = debugger_common::adapter::NullMemoryAccessCounter;
        let mut router = EventRouter { dispatch: &mut table, console: ConsoleId::Gameboy, memory_access_counter: &mut counter };
        let mut notifications = Vec::new();
        router.on_event(EventType::GbEndFrame, CpuId::Gameboy, &mut NoScript, &mut |n| notifications.push(n));
        assert!(notifications.is_empty());
    }
}
