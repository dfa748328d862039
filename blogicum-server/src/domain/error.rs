use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Hidden posts use the same variant as missing ones.
    #[error("Post not found")]
    PostNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Location not found")]
    LocationNotFound,

    #[error("Category slug already taken: {0}")]
    SlugTaken(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn to_status_code(&self) -> u16 {
        match self {
            Self::UserNotFound
            | Self::PostNotFound
            | Self::CommentNotFound
            | Self::CategoryNotFound
            | Self::LocationNotFound => 404,
            Self::UserAlreadyExists | Self::SlugTaken(_) => 409,
            Self::InvalidCredentials | Self::Unauthorized(_) => 401,
            Self::ValidationError(_) => 400,
            Self::DatabaseError(_) | Self::InternalError(_) => 500,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_and_missing_entities_share_status() {
        assert_eq!(DomainError::PostNotFound.to_status_code(), 404);
        assert_eq!(DomainError::CategoryNotFound.to_status_code(), 404);
        assert_eq!(DomainError::CommentNotFound.to_status_code(), 404);
        assert_eq!(DomainError::ValidationError("x".into()).to_status_code(), 400);
    }

    #[test]
    fn conflicts_map_to_409() {
        assert_eq!(DomainError::UserAlreadyExists.to_status_code(), 409);
        assert_eq!(
            DomainError::SlugTaken("travel".into()).to_status_code(),
            409
        );
    }
}
