/// Fatal pipeline errors. A breaking-change outcome is not represented here:
/// it is a complete `fail` decision with enumerated reasons, not an abort.
#[derive(thiserror::Error, Debug)]
pub enum GateError {
    #[error("upstream identity mismatch: {0}")]
    MismatchedUpstream(String),
    #[error("symbol extraction failed for '{path}': {reason}")]
    SymbolExtraction { path: String, reason: String },
    #[error("conflicting fingerprints for {0} across artifacts")]
    SymbolSetConflict(String),
    #[error("no baseline found for release tag: {0}")]
    MissingBaseline(String),
    #[error("baseline already exists for release tag: {0}")]
    DuplicateBaseline(String),
    #[error("concurrent baseline update detected for release tag: {0}")]
    ConcurrentUpdate(String),
}

impl GateError {
    /// Stable code carried in the `--json` error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            GateError::MismatchedUpstream(_) => "MISMATCHED_UPSTREAM",
            GateError::SymbolExtraction { .. } => "EXTRACTION_FAILED",
            GateError::SymbolSetConflict(_) => "SYMBOL_SET_CONFLICT",
            GateError::MissingBaseline(_) => "MISSING_BASELINE",
            GateError::DuplicateBaseline(_) => "DUPLICATE_BASELINE",
            GateError::ConcurrentUpdate(_) => "CONCURRENT_UPDATE",
        }
    }
}
