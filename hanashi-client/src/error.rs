use crate::api::Error as ApiError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected locally or by the comment API; the message is user-displayable
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed processing image: {0}")]
    Image(#[from] image::ImageError),

    /// Network failures and undecodable responses
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl Error {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}
