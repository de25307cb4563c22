use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to open {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element #{id} not found: {reason}")]
    ElementNotFound { id: String, reason: String },

    #[error("Failed to interact with #{id}: {reason}")]
    Interaction { id: String, reason: String },

    #[error("Failed to close browser: {0}")]
    Close(String),
}

pub type Result<T> = std::result::Result<T, PortalError>;
