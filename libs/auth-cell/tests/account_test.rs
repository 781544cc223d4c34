use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::models::{AuthError, AuthRequest, ForgotPasswordRequest, RegisterRequest, UserType};
use auth_cell::services::{password, AccountService};
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::TestConfig;

fn user_row(id: Uuid, cpf: &str, email: &str, encoded_password: &str) -> serde_json::Value {
    json!({
        "id": id,
        "cpf": cpf,
        "email": email,
        "password": encoded_password,
        "user_type": "PATIENT"
    })
}

#[tokio::test]
async fn register_creates_user_and_returns_email() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            user_row(Uuid::new_v4(), "12345678901", "new@example.com", "salt:hash")
        ])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    let email = service
        .register(RegisterRequest {
            cpf: "12345678901".to_string(),
            email: "new@example.com".to_string(),
            user_type: UserType::Patient,
        })
        .await
        .unwrap();

    assert_eq!(email, "new@example.com");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.taken@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(Uuid::new_v4(), "99999999999", "taken@example.com", "salt:hash")
        ])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    let result = service
        .register(RegisterRequest {
            cpf: "12345678901".to_string(),
            email: "taken@example.com".to_string(),
            user_type: UserType::Patient,
        })
        .await;

    assert_matches!(result, Err(AuthError::EmailAlreadyRegistered));
}

#[tokio::test]
async fn register_rejects_duplicate_cpf() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.new@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("cpf", "eq.12345678901"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(Uuid::new_v4(), "12345678901", "other@example.com", "salt:hash")
        ])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    let result = service
        .register(RegisterRequest {
            cpf: "12345678901".to_string(),
            email: "new@example.com".to_string(),
            user_type: UserType::Patient,
        })
        .await;

    assert_matches!(result, Err(AuthError::CpfAlreadyRegistered));
}

#[tokio::test]
async fn register_rejects_invalid_cpf_before_any_lookup() {
    let config = TestConfig::with_base_url("http://127.0.0.1:1");

    let service = AccountService::new(&config);
    let result = service
        .register(RegisterRequest {
            cpf: "123".to_string(),
            email: "a@b.com".to_string(),
            user_type: UserType::Patient,
        })
        .await;

    assert_matches!(result, Err(AuthError::ValidationError(_)));
}

#[tokio::test]
async fn login_with_email_issues_valid_token() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    let user_id = Uuid::new_v4();
    let encoded = password::encode("0042");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.login@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(user_id, "12345678901", "login@example.com", &encoded)
        ])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    let auth = service
        .authenticate(AuthRequest {
            identifier: "login@example.com".to_string(),
            password: "0042".to_string(),
        })
        .await
        .unwrap();

    let user = validate_token(&auth.token, &config.jwt_secret).unwrap();
    assert_eq!(user.id, user_id.to_string());
    assert_eq!(user.cpf.as_deref(), Some("12345678901"));
    assert_eq!(user.role.as_deref(), Some("PATIENT"));
}

#[tokio::test]
async fn login_falls_back_to_cpf_lookup() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    let encoded = password::encode("0042");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.12345678901"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("cpf", "eq.12345678901"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(Uuid::new_v4(), "12345678901", "cpf@example.com", &encoded)
        ])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    let result = service
        .authenticate(AuthRequest {
            identifier: "12345678901".to_string(),
            password: "0042".to_string(),
        })
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    let encoded = password::encode("0042");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(Uuid::new_v4(), "12345678901", "login@example.com", &encoded)
        ])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    let result = service
        .authenticate(AuthRequest {
            identifier: "login@example.com".to_string(),
            password: "9999".to_string(),
        })
        .await;

    assert_matches!(result, Err(AuthError::InvalidPassword));
}

#[tokio::test]
async fn login_for_unknown_user_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    let result = service
        .authenticate(AuthRequest {
            identifier: "ghost@example.com".to_string(),
            password: "0000".to_string(),
        })
        .await;

    assert_matches!(result, Err(AuthError::UserNotFound));
}

#[tokio::test]
async fn forgot_password_rotates_credential() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.reset@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(user_id, "12345678901", "reset@example.com", "salt:old")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(user_id, "12345678901", "reset@example.com", "salt:new")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    let email = service
        .forgot_password(ForgotPasswordRequest {
            email: "reset@example.com".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(email, "reset@example.com");
}

#[tokio::test]
async fn forgot_password_for_unknown_email_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    let result = service
        .forgot_password(ForgotPasswordRequest {
            email: "ghost@example.com".to_string(),
        })
        .await;

    assert_matches!(result, Err(AuthError::EmailNotFound));
}

#[tokio::test]
async fn ensure_default_admin_skips_existing_account() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("cpf", "eq.90769281001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(Uuid::new_v4(), "90769281001", "admin@hospital.com", "salt:hash")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&config);
    service.ensure_default_admin().await.unwrap();
}
