use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid duration '{0}': expected a number followed by s, m, h, or d")]
    InvalidDuration(String),

    #[error("directive kind '{0}' requires a target user")]
    MissingTarget(&'static str),

    #[error("community {0} is not enrolled for moderation sync")]
    NotEnrolled(crate::types::CommunityId),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
