pub type EmosaicResult<T> = Result<T, EmosaicError>;

#[derive(thiserror::Error, Debug)]
pub enum EmosaicError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("video error: {0}")]
    Video(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EmosaicError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn video(msg: impl Into<String>) -> Self {
        Self::Video(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
