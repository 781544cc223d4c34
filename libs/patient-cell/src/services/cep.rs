use reqwest::Client;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{Address, PatientError, ViaCepResponse};

/// ViaCEP postal-code lookup, used to fill a patient's street address from
/// the CEP they typed.
pub struct CepService {
    client: Client,
    base_url: String,
}

impl CepService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.viacep_base_url.clone(),
        }
    }

    pub async fn lookup(&self, cep: &str) -> Result<Address, PatientError> {
        let url = format!("{}/ws/{}/json/", self.base_url, urlencoding::encode(cep));
        debug!("Looking up postal code {}", cep);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PatientError::CepLookupFailed(e.to_string()))?;

        if !response.status().is_success() {
            warn!("ViaCEP returned {} for {}", response.status(), cep);
            return Err(PatientError::CepLookupFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| PatientError::CepLookupFailed(e.to_string()))?;

        // ViaCEP reports an unknown CEP as `{"erro": true}` with HTTP 200.
        let valid = body.cep.is_some() && !body.erro.unwrap_or(false);
        if !valid {
            return Err(PatientError::CepInvalid);
        }

        Ok(Address {
            street: body.logradouro.unwrap_or_default(),
            district: body.bairro.unwrap_or_default(),
            city: body.localidade.unwrap_or_default(),
            state: body.uf.unwrap_or_default(),
        })
    }
}
