use super::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_EMAIL_LENGTH: usize = 254;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_username(&self.username)?;

        if self.password.is_empty() {
            return Err(DomainError::ValidationError(
                "Password is required".to_string(),
            ));
        }
        if !self.email.contains('@') || self.email.len() > MAX_EMAIL_LENGTH {
            return Err(DomainError::ValidationError(
                "Email address is invalid".to_string(),
            ));
        }
        Ok(())
    }
}

/// Letters, digits and `@ . + - _`, at most 150 characters. Usernames end up in
/// profile URLs, so nothing here may split a path segment.
pub fn validate_username(username: &str) -> Result<(), DomainError> {
    let valid = !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LENGTH
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(DomainError::ValidationError(format!(
            "Invalid username: {:?}",
            username
        )))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginUserRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Public face of an author on the profile page.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            date_joined: user.created_at,
        }
    }
}

/// Authenticated identity behind a request, taken from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: i64,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_charset() {
        assert!(validate_username("ann.lee+blog@home-1_2").is_ok());
        assert!(validate_username("Анна").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ann/lee").is_err());
        assert!(validate_username("ann lee").is_err());
        assert!(validate_username("ann?lee").is_err());
    }

    #[test]
    fn username_fits_the_column() {
        assert!(validate_username(&"u".repeat(MAX_USERNAME_LENGTH)).is_ok());
        assert!(validate_username(&"u".repeat(MAX_USERNAME_LENGTH + 1)).is_err());
    }
}
