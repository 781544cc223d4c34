use std::sync::Arc;
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_expiration_hours: 24,
            mail_api_url: String::new(),
            mail_api_token: String::new(),
            mail_from: "no-reply@hospital.local".to_string(),
            viacep_base_url: "http://localhost:54322".to_string(),
        }
    }

    /// Config pointing every outbound integration at a mock server.
    pub fn with_base_url(base_url: &str) -> AppConfig {
        let mut config = Self::default().to_app_config();
        config.supabase_url = base_url.to_string();
        config.viacep_base_url = base_url.to_string();
        config
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub cpf: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            cpf: "12345678901".to_string(),
            role: "PATIENT".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            cpf: "12345678901".to_string(),
            role: role.to_string(),
        }
    }

    pub fn employee(email: &str) -> Self {
        Self::new(email, "EMPLOYEE")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "PATIENT")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "ADMIN")
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            cpf: Some(self.cpf.clone()),
            role: Some(self.role.clone()),
        }
    }

    pub fn token(&self, secret: &str) -> String {
        issue_token(&self.id, &self.email, &self.cpf, &self.role, secret, 24)
            .expect("test token")
    }

    pub fn expired_token(&self, secret: &str) -> String {
        issue_token(&self.id, &self.email, &self.cpf, &self.role, secret, -1)
            .expect("test token")
    }
}

/// Canned PostgREST rows for wiremock-backed tests.
pub struct MockRows;

impl MockRows {
    pub fn user(id: &str, cpf: &str, email: &str, password: &str) -> serde_json::Value {
        json!({
            "id": id,
            "cpf": cpf,
            "email": email,
            "password": password,
            "user_type": "PATIENT"
        })
    }

    pub fn slot(code: &str, total: i32, available: i32) -> serde_json::Value {
        json!({
            "code": code,
            "scheduled_at": "2026-09-01T10:00:00Z",
            "specialty": "CARDIOLOGY",
            "doctor": "Dr. House",
            "price": 250.0,
            "total_seats": total,
            "available_seats": available,
            "status": "open"
        })
    }

    pub fn patient(id: &str, points: i32) -> serde_json::Value {
        json!({
            "id": id,
            "cpf": "12345678901",
            "email": "patient@example.com",
            "name": "Test Patient",
            "phone": "41999990000",
            "postal_code": "80000000",
            "street": "Rua das Flores",
            "number": "100",
            "complement": null,
            "district": "Centro",
            "city": "Curitiba",
            "state": "PR",
            "points": points
        })
    }

    pub fn viacep(cep: &str) -> serde_json::Value {
        json!({
            "cep": cep,
            "logradouro": "Rua das Flores",
            "bairro": "Centro",
            "localidade": "Curitiba",
            "uf": "PR"
        })
    }

    pub fn viacep_error() -> serde_json::Value {
        json!({ "erro": true })
    }
}
