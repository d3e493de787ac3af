use argon2::password_hash::{rand_core::OsRng, Error as PasswordHashError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::info;

use crate::errors::AppError;
use crate::models::{FieldErrors, LoginRequest, NewUser, NewUserDto, RegisterRequest, Role};
use crate::services::token_service::TokenService;
use crate::store::{StoreError, UserRepository};

const DEFAULT_ROLES: [Role; 1] = [Role::User];

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(candidate: &str, stored_hash: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .map_err(|err| match err {
            PasswordHashError::Password => AppError::Unauthorized,
            other => AppError::Internal(format!("Password verification failed: {}", other)),
        })
}

pub async fn register(
    users: &dyn UserRepository,
    tokens: &TokenService,
    input: RegisterRequest,
) -> Result<NewUserDto, AppError> {
    input.validate()?;

    let password_hash = hash_password(&input.password)?;
    let new_user = NewUser::new(
        input.user_name.trim().to_string(),
        input.email.trim().to_string(),
        password_hash,
    );

    let user = users
        .insert_user(new_user, &DEFAULT_ROLES)
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(constraint) => {
                let mut errors = FieldErrors::default();
                if constraint.contains("email") {
                    errors.push("email", format!("Email '{}' is already taken", input.email.trim()));
                } else {
                    errors.push(
                        "userName",
                        format!("Username '{}' is already taken", input.user_name.trim()),
                    );
                }
                AppError::Validation(errors)
            }
            other => AppError::Db(other),
        })?;

    info!("Registered user {} ({})", user.user_name, user.id);
    let token = tokens.create_token(&user, &DEFAULT_ROLES)?;

    Ok(NewUserDto {
        user_name: user.user_name,
        email: user.email,
        token,
    })
}

pub async fn login(
    users: &dyn UserRepository,
    tokens: &TokenService,
    input: LoginRequest,
) -> Result<NewUserDto, AppError> {
    input.validate()?;

    let user = users
        .fetch_user_by_name(&input.user_name)
        .await?
        .ok_or(AppError::Unauthorized)?;

    verify_password(&input.password, &user.password_hash)?;

    let roles = users.fetch_user_roles(user.id).await?;
    let token = tokens.create_token(&user, &roles)?;

    Ok(NewUserDto {
        user_name: user.user_name,
        email: user.email,
        token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn alice() -> RegisterRequest {
        RegisterRequest {
            user_name: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "Secret123!".to_string(),
        }
    }

    fn login_as(user_name: &str, password: &str) -> LoginRequest {
        LoginRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let tokens = TokenService::new("test-secret", 1);

        let registered = register(&store, &tokens, alice()).await.unwrap();
        assert!(!registered.token.is_empty());
        assert_eq!(registered.user_name, "alice");

        let claims = tokens.validate_token(&registered.token).unwrap();
        assert_eq!(claims.roles, vec![Role::User]);

        let logged_in = login(&store, &tokens, login_as("alice", "Secret123!"))
            .await
            .unwrap();
        assert!(!logged_in.token.is_empty());
        assert_eq!(logged_in.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_wrong_password_or_unknown_user_is_unauthorized() {
        let store = MemoryStore::new();
        let tokens = TokenService::new("test-secret", 1);
        register(&store, &tokens, alice()).await.unwrap();

        assert!(matches!(
            login(&store, &tokens, login_as("alice", "Wrong123!")).await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            login(&store, &tokens, login_as("mallory", "Secret123!")).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_a_field_error() {
        let store = MemoryStore::new();
        let tokens = TokenService::new("test-secret", 1);
        register(&store, &tokens, alice()).await.unwrap();

        let mut same_name = alice();
        same_name.email = "other@x.com".to_string();
        match register(&store, &tokens, same_name).await {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors.0[0].field, "userName");
                assert!(errors.0[0].message.contains("Username 'alice'"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let mut same_email = alice();
        same_email.user_name = "alice2".to_string();
        match register(&store, &tokens, same_email).await {
            Err(AppError::Validation(errors)) => assert_eq!(errors.0[0].field, "email"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_password_hash_is_salted() {
        let first = hash_password("Secret123!").unwrap();
        let second = hash_password("Secret123!").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("Secret123!", &first).is_ok());
        assert!(matches!(
            verify_password("secret123!", &second),
            Err(AppError::Unauthorized)
        ));
    }
}
