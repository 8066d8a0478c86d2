use debugger_common::cpu::CpuId;
use debugger_common::trace::TraceRow;

use crate::break_controller::DebugBreakHelper;
use crate::dispatch::DispatchTable;

/// Merges every active CPU's independent trace-log ring buffer into one globally chronological
/// timeline, using each row's row id (assigned at insertion time from a single shared counter)
/// rather than wall-clock time. Performed under a scoped suspend so no logger mutates mid-merge.
pub struct TraceMerger<'a> {
    pub dispatch: &'a DispatchTable,
    pub breaks: &'a crate::break_controller::BreakController,
}

impl TraceMerger<'_> {
    /// Returns up to `max_line_count` rows, newest-first, skipping the first `start_offset`
    /// matches. A disabled logger's rows are never emitted, but its lane's offset still advances
    /// in step with the others so a later-enabled logger's ordering isn't thrown off.
    ///
    /// Tracks the next row id the merge expects to see (`next_expected - 1`) and stops the
    /// instant no lane's current row matches it, rather than always taking whichever lane's head
    /// happens to be largest -- lanes are independent ring buffers with their own capacity, so an
    /// older row surviving in one lane after a newer lane has run dry is a broken trail, not the
    /// next row in sequence.
    pub fn execution_trace(&self, start_offset: usize, max_line_count: usize) -> Vec<TraceRow> {
        let _guard = DebugBreakHelper::new(self.breaks);

        let lanes: Vec<(CpuId, Vec<TraceRow>)> = self
            .dispatch
            .iter()
            .filter_map(|(id, slot)| slot.adapter.trace_logger().map(|logger| (id, logger.snapshot())))
            .collect();

        // Each lane's rows are newest-first already (a FIFO ring buffer's natural snapshot
        // order); walk them with one cursor per lane.
        let enabled: std::collections::HashMap<CpuId, bool> = self
            .dispatch
            .iter()
            .filter_map(|(id, slot)| slot.adapter.trace_logger().map(|logger| (id, logger.enabled())))
            .collect();

        let mut cursors = vec![0usize; lanes.len()];
        let mut skipped = 0usize;
        let mut out = Vec::new();

        // nextExpected := globalNextRowId, i.e. one past the most recent row id seen across any
        // lane's head -- the allocator itself is owned by whoever builds the per-CPU loggers, out
        // of scope here, so the most recent row any lane actually holds stands in for it.
        let mut next_expected = lanes
            .iter()
            .filter_map(|(_, rows)| rows.first().map(|row| row.row_id))
            .max()
            .map_or(0, |max_row_id| max_row_id + 1);

        loop {
            if out.len() >= max_line_count || next_expected == 0 {
                break;
            }
            let wanted = next_expected - 1;

            let found = lanes.iter().enumerate().find_map(|(lane_idx, (_, rows))| {
                rows.get(cursors[lane_idx]).filter(|row| row.row_id == wanted).map(|_| lane_idx)
            });

            let Some(lane_idx) = found else { break };
            let (cpu, rows) = &lanes[lane_idx];
            let row = rows[cursors[lane_idx]].clone();
            cursors[lane_idx] += 1;
            next_expected -= 1;

            if skipped < start_offset {
                skipped += 1;
                continue;
            }

            if *enabled.get(cpu).unwrap_or(&true) {
                out.push(row);
            }
        }

        out
    }
}
