use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{InvitationIssuer, InvitationServiceConfig, IssuanceError};

const CREATE_INVITATION_PATH: &str = "/functions/v1/create-invitation";

/// Issuer backed by the hosted `create-invitation` edge function.
pub struct SupabaseInvitationIssuer {
    client: reqwest::Client,
    config: InvitationServiceConfig,
}

#[derive(Deserialize)]
struct InvitationResponse {
    token: String,
}

#[derive(Deserialize)]
struct InvitationErrorBody {
    error: String,
}

impl SupabaseInvitationIssuer {
    pub fn new(client: reqwest::Client, config: InvitationServiceConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.config.base_url, CREATE_INVITATION_PATH)
    }
}

#[async_trait]
impl InvitationIssuer for SupabaseInvitationIssuer {
    async fn issue(&self, apartment_id: Uuid, company_id: Uuid) -> Result<String, IssuanceError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.anon_key)
            .json(&json!({
                "apartmentId": apartment_id,
                "companyId": company_id,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            // The service reports verification and persistence failures as
            // `{error}`; that message is surfaced verbatim.
            let message = match response.json::<InvitationErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => "Failed to create invitation".to_string(),
            };
            return Err(IssuanceError::Rejected(message));
        }

        let body: InvitationResponse = response.json().await?;
        Ok(body.token)
    }
}
