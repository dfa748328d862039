use crate::data::user_repository::UserRepository;
use crate::domain::user::{LoginUserRequest, RegisterUserRequest, UserResponse};
use crate::domain::DomainError;
use crate::infrastructure::jwt::JwtService;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repo,
            jwt_service,
        }
    }

    pub async fn register(
        &self,
        req: RegisterUserRequest,
    ) -> Result<(String, UserResponse), DomainError> {
        tracing::debug!("Registering username={}, email={}", req.username, req.email);

        req.validate()?;

        if self.user_repo.find_by_username(&req.username).await.is_ok() {
            tracing::warn!("Registration failed: username already exists");
            return Err(DomainError::UserAlreadyExists);
        }
        if self.user_repo.find_by_email(&req.email).await.is_ok() {
            tracing::warn!("Registration failed: email already exists");
            return Err(DomainError::UserAlreadyExists);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                DomainError::InternalError(format!("Password hashing failed: {}", e))
            })?
            .to_string();

        let user = self.user_repo.create(req, password_hash).await?;
        let token = self
            .jwt_service
            .generate_token(user.id, user.username.clone())?;

        tracing::info!(
            "User registered successfully: id={}, username={}",
            user.id,
            user.username
        );
        Ok((token, UserResponse::from(user)))
    }

    pub async fn login(
        &self,
        req: LoginUserRequest,
    ) -> Result<(String, UserResponse), DomainError> {
        tracing::debug!("Login attempt for username={}", req.username);

        // An unknown username looks the same as a wrong password.
        let user = match self.user_repo.find_by_username(&req.username).await {
            Ok(u) => u,
            Err(DomainError::UserNotFound) => {
                tracing::warn!("User not found: {}", req.username);
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
            tracing::error!("Invalid password hash format: {}", e);
            DomainError::InternalError(format!("Invalid password hash: {}", e))
        })?;

        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Invalid password for user {}", user.username);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .jwt_service
            .generate_token(user.id, user.username.clone())?;

        tracing::info!(
            "User logged in successfully: id={}, username={}",
            user.id,
            user.username
        );
        Ok((token, UserResponse::from(user)))
    }

    /// Deletes the account; the storage layer cascades to posts and comments.
    pub async fn remove_user(&self, username: &str) -> Result<(), DomainError> {
        let user = self.user_repo.find_by_username(username).await?;
        self.user_repo.delete(user.id).await?;

        tracing::info!("User removed: id={}, username={}", user.id, user.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryStore;

    fn service() -> AuthService {
        let store = Arc::new(InMemoryStore::new());
        let jwt = Arc::new(JwtService::new("auth-service-test-secret-0123456789", 1).unwrap());
        AuthService::new(store, jwt)
    }

    fn registration(username: &str, email: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[actix_rt::test]
    async fn register_then_login() {
        let auth = service();
        let (token, user) = auth
            .register(registration("leo", "leo@example.com"))
            .await
            .unwrap();
        assert!(!token.is_empty());
        assert_eq!(user.username, "leo");

        let (_, logged_in) = auth
            .login(LoginUserRequest {
                username: "leo".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[actix_rt::test]
    async fn duplicate_username_is_a_conflict() {
        let auth = service();
        auth.register(registration("leo", "leo@example.com"))
            .await
            .unwrap();

        let err = auth
            .register(registration("leo", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserAlreadyExists));
    }

    #[actix_rt::test]
    async fn wrong_password_and_unknown_user_look_alike() {
        let auth = service();
        auth.register(registration("leo", "leo@example.com"))
            .await
            .unwrap();

        let wrong = auth
            .login(LoginUserRequest {
                username: "leo".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();
        let unknown = auth
            .login(LoginUserRequest {
                username: "ghost".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong, DomainError::InvalidCredentials));
        assert!(matches!(unknown, DomainError::InvalidCredentials));
    }

    #[actix_rt::test]
    async fn malformed_registration_is_rejected() {
        let auth = service();
        let err = auth
            .register(registration("leo", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[actix_rt::test]
    async fn username_with_a_slash_is_rejected() {
        let auth = service();
        let err = auth
            .register(registration("ann/lee", "ann@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let lookup = auth
            .login(LoginUserRequest {
                username: "ann/lee".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(lookup, DomainError::InvalidCredentials));
    }
}
