use rand::Rng;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};
use shared_utils::jwt::issue_token;

use crate::models::{
    AuthError, AuthRequest, AuthResponse, ForgotPasswordRequest, RegisterRequest, User, UserType,
};
use crate::services::{mailer, password};
use crate::services::mailer::Mailer;

const DEFAULT_ADMIN_CPF: &str = "90769281001";
const DEFAULT_ADMIN_EMAIL: &str = "admin@hospital.com";
const DEFAULT_ADMIN_PASSWORD: &str = "TADS";

pub struct AccountService {
    supabase: SupabaseClient,
    mailer: Mailer,
    jwt_secret: String,
    jwt_expiration_hours: i64,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            mailer: Mailer::new(config),
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiration_hours: config.jwt_expiration_hours,
        }
    }

    /// Register a new user. The account password is generated server-side
    /// and delivered by mail; the response carries only the e-mail address.
    pub async fn register(&self, request: RegisterRequest) -> Result<String, AuthError> {
        request.validate()?;
        debug!("Registering user with e-mail {}", request.email);

        if !self.find_users(&format!("email=eq.{}", urlencoding::encode(&request.email)))
            .await?
            .is_empty()
        {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        if !self.find_users(&format!("cpf=eq.{}", request.cpf)).await?.is_empty() {
            return Err(AuthError::CpfAlreadyRegistered);
        }

        let generated_password = generate_password();
        let hashed_password = password::encode(&generated_password);

        let user_data = json!({
            "cpf": request.cpf,
            "email": request.email,
            "password": hashed_password,
            "user_type": request.user_type,
        });

        let created: Vec<User> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/users",
                None,
                Some(user_data),
                Some(return_representation()),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let user = created
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::DatabaseError("Failed to create user".to_string()))?;

        self.mailer
            .send(
                &user.email,
                "Access password",
                &mailer::password_message(&generated_password),
            )
            .await;

        info!("User registered with id {}", user.id);
        Ok(user.email)
    }

    /// Authenticate by e-mail or CPF and issue a signed token.
    pub async fn authenticate(&self, request: AuthRequest) -> Result<AuthResponse, AuthError> {
        request.validate()?;
        debug!("Authenticating {}", request.identifier);

        let mut users = self
            .find_users(&format!("email=eq.{}", urlencoding::encode(&request.identifier)))
            .await?;
        if users.is_empty() {
            users = self
                .find_users(&format!("cpf=eq.{}", urlencoding::encode(&request.identifier)))
                .await?;
        }

        let user = users.into_iter().next().ok_or(AuthError::UserNotFound)?;

        if !password::matches(&request.password, &user.password) {
            return Err(AuthError::InvalidPassword);
        }

        let token = issue_token(
            &user.id.to_string(),
            &user.email,
            &user.cpf,
            &user.user_type.to_string(),
            &self.jwt_secret,
            self.jwt_expiration_hours,
        )
        .map_err(AuthError::TokenError)?;

        Ok(AuthResponse { token })
    }

    /// Rotate the password of an existing account and mail the new one.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<String, AuthError> {
        debug!("Password reset requested for {}", request.email);

        let user = self
            .find_users(&format!("email=eq.{}", urlencoding::encode(&request.email)))
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::EmailNotFound)?;

        let new_password = generate_password();
        let hashed_password = password::encode(&new_password);

        let path = format!("/rest/v1/users?id=eq.{}", user.id);
        let _updated: Vec<User> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                None,
                Some(json!({ "password": hashed_password })),
                Some(return_representation()),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        self.mailer
            .send(
                &user.email,
                "Access password",
                &mailer::password_message(&new_password),
            )
            .await;

        Ok(user.email)
    }

    /// Seed the default admin account when it is missing.
    pub async fn ensure_default_admin(&self) -> Result<(), AuthError> {
        if !self
            .find_users(&format!("cpf=eq.{}", DEFAULT_ADMIN_CPF))
            .await?
            .is_empty()
        {
            return Ok(());
        }

        let user_data = json!({
            "cpf": DEFAULT_ADMIN_CPF,
            "email": DEFAULT_ADMIN_EMAIL,
            "password": password::encode(DEFAULT_ADMIN_PASSWORD),
            "user_type": UserType::Admin,
        });

        let _created: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/users",
                None,
                Some(user_data),
                Some(return_representation()),
            )
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        info!("Default admin account inserted");
        Ok(())
    }

    async fn find_users(&self, filter: &str) -> Result<Vec<User>, AuthError> {
        let path = format!("/rest/v1/users?{}", filter);
        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| {
                warn!("User lookup failed: {}", e);
                AuthError::DatabaseError(e.to_string())
            })
    }
}

fn generate_password() -> String {
    format!("{:04}", rand::thread_rng().gen_range(0..10000))
}
