use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScrollSpyError {
    #[error(
        "Container {0} is not mounted.\n\nCall mount() for the container before adding spy handlers."
    )]
    NotMounted(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to render replay output: {0}")]
    Render(String),
}

impl From<std::io::Error> for ScrollSpyError {
    fn from(err: std::io::Error) -> Self {
        ScrollSpyError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ScrollSpyError {
    fn from(err: serde_json::Error) -> Self {
        ScrollSpyError::Render(err.to_string())
    }
}
