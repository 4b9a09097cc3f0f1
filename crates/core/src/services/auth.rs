//! Signup and token issuance.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;
use yamdb_common::{
    AppError, AppResult, Config,
    constants::{CONFIRMATION_CODE_LENGTH, EMAIL_MAX_LENGTH, RESERVED_USERNAME, USERNAME_MAX_LENGTH},
};
use yamdb_db::{entities::user, repositories::UserRepository};

use crate::services::MailService;

/// Allowed username characters.
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[\w.@+-]+$").expect("valid username pattern")
});

/// Alphabet for confirmation codes.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupInput {
    /// Requested username.
    #[validate(length(min = 1, max = 150), regex(path = *USERNAME_RE))]
    pub username: String,

    /// Address the confirmation code is sent to.
    #[validate(email, length(max = 254))]
    pub email: String,
}

/// Registration response, echoing the accepted identity.
#[derive(Debug, Serialize)]
pub struct SignupOutput {
    /// Accepted username.
    pub username: String,
    /// Accepted email.
    pub email: String,
}

/// Token request.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenInput {
    /// Username the code was issued for.
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    /// Code received by mail.
    #[validate(length(min = 1))]
    pub confirmation_code: String,
}

/// Token response.
#[derive(Debug, Serialize)]
pub struct TokenOutput {
    /// Signed access token.
    pub token: String,
}

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    /// Username at issuance time.
    pub username: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Authentication service: signup, token issuance, token verification.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    mail: MailService,
    jwt_secret: String,
    token_ttl_minutes: i64,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub fn new(user_repo: UserRepository, mail: MailService, config: &Config) -> Self {
        Self {
            user_repo,
            mail,
            jwt_secret: config.auth.jwt_secret.clone(),
            token_ttl_minutes: config.auth.token_ttl_minutes,
        }
    }

    /// Register a user (or re-request a code for an existing identity)
    /// and dispatch a confirmation code.
    ///
    /// The same (username, email) pair may sign up repeatedly and gets a
    /// fresh code each time. A username or email already bound to a
    /// different identity is rejected.
    pub async fn signup(&self, input: SignupInput) -> AppResult<SignupOutput> {
        input.validate()?;
        validate_username(&input.username)?;

        let by_username = self.user_repo.find_by_username(&input.username).await?;
        let by_email = self.user_repo.find_by_email(&input.email).await?;

        match (&by_username, &by_email) {
            (Some(u), _) if u.email != input.email => {
                return Err(AppError::Validation(
                    "username is already registered with a different email".to_string(),
                ));
            }
            (_, Some(u)) if u.username != input.username => {
                return Err(AppError::Validation(
                    "email is already registered with a different username".to_string(),
                ));
            }
            _ => {}
        }

        let code = generate_confirmation_code();
        self.user_repo
            .upsert_confirmation_code(&input.username, &input.email, &code)
            .await?;

        self.mail
            .send_confirmation_code(&input.email, &input.username, &code)
            .await?;

        info!(username = %input.username, "signup confirmation code issued");

        Ok(SignupOutput {
            username: input.username,
            email: input.email,
        })
    }

    /// Exchange a confirmation code for an access token.
    pub async fn issue_token(&self, input: TokenInput) -> AppResult<TokenOutput> {
        input.validate()?;

        let user = self.user_repo.get_by_username(&input.username).await?;

        let stored = user.confirmation_code.as_deref();
        if stored != Some(input.confirmation_code.as_str()) {
            return Err(AppError::Validation(
                "invalid confirmation code".to_string(),
            ));
        }

        let token = self.encode_token(&user)?;

        info!(username = %user.username, "access token issued");

        Ok(TokenOutput { token })
    }

    /// Sign a time-limited token for a user.
    pub fn encode_token(&self, user: &user::Model) -> AppResult<String> {
        let exp = Utc::now().timestamp() + self.token_ttl_minutes * 60;
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Verify a token's signature and expiry.
    pub fn decode_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.decode_token(token)?;
        self.user_repo.get_by_id(claims.sub).await
    }
}

/// Reject reserved usernames.
pub fn validate_username(username: &str) -> AppResult<()> {
    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(AppError::Validation(format!(
            "username \"{RESERVED_USERNAME}\" is reserved"
        )));
    }
    if username.len() > USERNAME_MAX_LENGTH as usize {
        return Err(AppError::Validation("username is too long".to_string()));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(AppError::Validation(
            "username contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Reject overlong or malformed email addresses.
pub fn validate_email(email: &str) -> AppResult<()> {
    if email.len() > EMAIL_MAX_LENGTH as usize || !validator::ValidateEmail::validate_email(&email) {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    Ok(())
}

/// Generate an uppercase-alphanumeric confirmation code.
#[must_use]
pub fn generate_confirmation_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CONFIRMATION_CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use yamdb_common::{AuthConfig, DatabaseConfig, ServerConfig};
    use yamdb_db::entities::user::Role;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "postgres://unused".to_string(),
                max_connections: 1,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                token_ttl_minutes: 60,
            },
            mail: None,
        }
    }

    fn make_user(id: i64, username: &str, code: Option<&str>) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: None,
            last_name: None,
            bio: None,
            role: Role::User,
            is_superuser: false,
            confirmation_code: code.map(ToString::to_string),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> AuthService {
        let config = test_config();
        let repo = UserRepository::new(Arc::new(db));
        let mail = MailService::new(&config).unwrap();
        AuthService::new(repo, mail, &config)
    }

    #[test]
    fn test_confirmation_code_shape() {
        let code = generate_confirmation_code();
        assert_eq!(code.len(), CONFIRMATION_CODE_LENGTH);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_reserved_username_rejected() {
        assert!(matches!(
            validate_username("me"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_username("ME"),
            Err(AppError::Validation(_))
        ));
        assert!(validate_username("me2").is_ok());
    }

    #[test]
    fn test_username_pattern() {
        assert!(validate_username("good.user@x+y-z_1").is_ok());
        assert!(matches!(
            validate_username("bad user"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_username("bad!"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_rejects_email_bound_to_other_username() {
        let other = make_user(1, "taken", None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // lookup by username: no match
            .append_query_results([Vec::<user::Model>::new()])
            // lookup by email: bound to another username
            .append_query_results([[other]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .signup(SignupInput {
                username: "newcomer".to_string(),
                email: "taken@example.com".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_signup_rejects_username_bound_to_other_email() {
        let taken = make_user(1, "taken", None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // lookup by username: bound to another email
            .append_query_results([[taken]])
            // lookup by email: no match
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let service = service_with(db);
        let result = service
            .signup(SignupInput {
                username: "taken".to_string(),
                email: "new@example.com".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_signup_same_pair_reissues_code() {
        let existing = make_user(1, "reader", Some("OLD111"));
        let mut refreshed = existing.clone();
        refreshed.confirmation_code = Some("NEW222".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // lookup by username and by email resolve to the same identity
            .append_query_results([[existing.clone()]])
            .append_query_results([[existing.clone()]])
            // upsert finds the pair and refreshes its code
            .append_query_results([[existing]])
            .append_query_results([[refreshed]])
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let service = service_with(db);
        let result = service
            .signup(SignupInput {
                username: "reader".to_string(),
                email: "reader@example.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.username, "reader");
        assert_eq!(result.email, "reader@example.com");
    }

    #[tokio::test]
    async fn test_issue_token_unknown_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let service = service_with(db);
        let result = service
            .issue_token(TokenInput {
                username: "ghost".to_string(),
                confirmation_code: "A1B2C3".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_issue_token_wrong_code_is_validation_error() {
        let user = make_user(1, "reader", Some("A1B2C3"));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();

        let service = service_with(db);
        let result = service
            .issue_token(TokenInput {
                username: "reader".to_string(),
                confirmation_code: "WRONG0".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);
        let user = make_user(42, "reader", None);

        let token = service.encode_token(&user).unwrap();
        let claims = service.decode_token(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "reader");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_decode_token_garbage_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        assert!(matches!(
            service.decode_token("not-a-token"),
            Err(AppError::Unauthorized)
        ));
    }
}
