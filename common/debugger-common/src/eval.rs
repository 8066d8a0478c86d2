use debugger_proc_macros::EnumDisplay;

use crate::adapter::CpuDebugAdapter;

/// The shape of value an evaluated expression produced, so a caller can decide whether to render
/// it as a number, a boolean condition result, or nothing (a statement with side effects only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumDisplay)]
pub enum EvalResultType {
    Numeric,
    Boolean,
    OutOfScope,
    Invalid,
}

/// The outcome of evaluating one expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalResult {
    pub value: i64,
    pub result_type: EvalResultType,
}

impl EvalResult {
    #[must_use]
    pub const fn numeric(value: i64) -> Self {
        Self { value, result_type: EvalResultType::Numeric }
    }

    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self { value: value as i64, result_type: EvalResultType::Boolean }
    }

    #[must_use]
    pub const fn invalid() -> Self {
        Self { value: 0, result_type: EvalResultType::Invalid }
    }

    #[must_use]
    pub const fn is_truthy(self) -> bool {
        self.value != 0
    }
}

/// Parses and evaluates watch/condition expressions against a CPU's live state. Takes the
/// adapter as an explicit argument on every call rather than holding a reference to one: an
/// evaluator instance can be reused across CPUs (e.g. for breakpoint conditions evaluated while
/// stepping a different CPU than the one that created them) and this keeps it from becoming
/// self-referential.
pub trait ExpressionEvaluator: Send {
    /// Tokenizes `expression` for the UI's autocomplete/highlighting, independent of evaluation.
    fn tokenize(&self, expression: &str) -> Vec<String>;

    /// Evaluates `expression` against `adapter`'s current state. `in_condition_context` relaxes
    /// grammar that's only legal inside a breakpoint condition (bare comparisons treated as
    /// boolean rather than requiring an explicit `==`).
    fn evaluate(
        &mut self,
        expression: &str,
        adapter: &dyn CpuDebugAdapter,
        in_condition_context: bool,
    ) -> EvalResult;
}
