//! Invitation token issuance.
//!
//! One invitation token is a single-use credential bound to exactly one
//! apartment and one company. Tokens are created by the remote issuance
//! service and consumed later by the tenant registration flow, which is not
//! part of this server. Repeated calls for the same apartment issue
//! additional, distinct tokens.

mod issuer;


pub use issuer::SupabaseInvitationIssuer;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a single token issuance. The caller does not distinguish
/// subtypes beyond the message; a failed apartment is skipped, the batch
/// continues.
#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("invitation service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
}

/// Source of invitation tokens, one per call.
#[async_trait]
pub trait InvitationIssuer: Send + Sync {
    /// Request a fresh single-use token for `apartment_id`. The issuing
    /// service re-verifies that the apartment belongs to `company_id` and
    /// rejects the call if it does not; that verdict is authoritative.
    async fn issue(&self, apartment_id: Uuid, company_id: Uuid) -> Result<String, IssuanceError>;
}

/// Connection settings for the hosted invitation service.
#[derive(Debug, Clone)]
pub struct InvitationServiceConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl InvitationServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("SUPABASE_URL")
            .map_err(|_| anyhow::anyhow!("SUPABASE_URL must be set"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| anyhow::anyhow!("SUPABASE_ANON_KEY must be set"))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }
}
