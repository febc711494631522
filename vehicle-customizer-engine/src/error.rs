use thiserror::Error;

/// Recoverable failures of the customization engine. None of these may bring
/// down the render loop; they are logged and surfaced through the RPC layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudioError {
    #[error("vehicle asset '{path}' failed to load: {reason}")]
    AssetLoadFailure { path: String, reason: String },

    #[error("option '{option_id}' of type '{option_type}' cannot be assigned to the {slot} slot")]
    InvalidSlotAssignment {
        option_id: String,
        option_type: String,
        slot: String,
    },

    #[error("saved option '{option_id}' is not present in the current catalog")]
    UnresolvableOptionReference { option_id: String },

    #[error("frame capture failed: {reason}")]
    CaptureFailure { reason: String },
}
