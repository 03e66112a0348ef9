pub type FrameitResult<T> = Result<T, FrameitError>;

/// Error taxonomy shared by every FrameIt operation.
///
/// Each variant is terminal for the user action that produced it; nothing in the crate retries.
#[derive(thiserror::Error, Debug)]
pub enum FrameitError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("storage quota exceeded: {0}")]
    Quota(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("delivery error: {0}")]
    Delivery(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameitError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn quota(msg: impl Into<String>) -> Self {
        Self::Quota(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Short message suitable for a single user-facing alert.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Decode(_) => "Failed to load the frame images. Please try again.",
            Self::Encode(_) => "Failed to create image.",
            Self::Quota(_) => "Storage is full. Delete a saved frame and try again.",
            Self::Delivery(_) => "Failed to download frame. Please try again.",
            Self::Validation(_) => "Some of the frame settings are invalid.",
            Self::Storage(_) | Self::Serde(_) => "Failed to save frame.",
            Self::Other(_) => "Something went wrong. Please try again.",
        }
    }
}
