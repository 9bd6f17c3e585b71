/// Why a graffiti submission did not produce an embed token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("sign in to post a drawing")]
    AuthRequired,

    #[error("the canvas is empty")]
    EmptyCanvas,

    #[error("upload credential unavailable: {0}")]
    Credential(String),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("drawing could not be encoded: {0}")]
    Encoding(String),

    #[error("embed tag {0:?} is empty or contains one of `,<>`")]
    InvalidEmbedTag(String),
}

impl SubmitError {
    /// Text suitable for a notice shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::AuthRequired => "Please sign in before posting a drawing.",
            SubmitError::EmptyCanvas => "Draw something first.",
            SubmitError::Credential(_) => {
                "Could not get permission to upload the drawing. Please draw it again and retry."
            }
            SubmitError::Upload(_) => {
                "Uploading the drawing failed. Please draw it again and retry."
            }
            SubmitError::Encoding(_) => "The drawing could not be saved as an image.",
            SubmitError::InvalidEmbedTag(_) => "The drawing widget is misconfigured.",
        }
    }

    /// Whether the pad was wiped as part of failing with this error.
    pub fn clears_canvas(&self) -> bool {
        matches!(
            self,
            SubmitError::Credential(_) | SubmitError::Upload(_) | SubmitError::Encoding(_)
        )
    }
}
