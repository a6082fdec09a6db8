use miette::Diagnostic;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(code(estate::invalid_argument))]
    InvalidArgument(String),

    #[error("Asset '{asset}' is already assigned to player '{owner}' in area '{group}'")]
    #[diagnostic(code(estate::ownership_conflict))]
    OwnershipConflict {
        asset: String,
        owner: String,
        group: String,
    },

    #[error("Asset '{asset}' does not exist under area '{area}'")]
    #[diagnostic(code(estate::unknown_asset))]
    UnknownAsset { area: String, asset: String },

    #[error("Store '{store}' is busy (lock not acquired within {waited:?})")]
    #[diagnostic(code(estate::busy), help("another operation holds the lock; retry shortly"))]
    Busy { store: String, waited: Duration },

    #[error("Store '{store}' exists but could not be parsed: {source}")]
    #[diagnostic(
        code(estate::corrupt_store),
        help("the file was left untouched; repair or remove it before retrying")
    )]
    CorruptStore {
        store: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Ownership store was saved but ledger '{store}' was not: {source}")]
    #[diagnostic(
        code(estate::partial_commit),
        help("the two stores disagree; reconcile the ledger manually")
    )]
    PartialCommit {
        store: String,
        #[source]
        source: Box<EngineError>,
    },

    #[error("No account ledger is configured")]
    #[diagnostic(code(estate::ledger_not_configured))]
    LedgerNotConfigured,

    #[error("IO error: {0}")]
    #[diagnostic(code(estate::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(estate::serialization))]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    #[diagnostic(code(estate::csv))]
    Csv(#[from] csv::Error),
}

impl EngineError {
    /// True for expected business rejections, as opposed to system faults.
    ///
    /// Rejections leave every store untouched and can be retried with
    /// corrected input; front ends report them as outcomes, not crashes.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::OwnershipConflict { .. } | Self::UnknownAsset { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
