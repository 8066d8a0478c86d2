use thiserror::Error;

use crate::cpu::CpuId;

/// Errors surfaced back across the coordinator's public API. Internal invariant violations (an
/// adapter slot missing when `CpuId::active_cpus` says it should be present) are logged and
/// treated as no-ops rather than returned here -- see the coordinator's `fanout` module -- since
/// the emulation thread has nowhere to propagate a `Result` to.
#[derive(Debug, Error)]
pub enum DebuggerError {
    #[error("no adapter registered for {0}")]
    CpuNotPresent(CpuId),

    #[error("{cpu} does not support this operation")]
    Unsupported { cpu: CpuId },

    #[error("failed to save ROM to disk: {0}")]
    SaveRom(#[source] std::io::Error),

    #[error("expression evaluation failed: {0}")]
    InvalidExpression(String),
}
