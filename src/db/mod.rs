//! Database module - AppState and read access to the property data.
//!
//! The export pipeline only reads from the store: the building selection
//! list and the apartment enumeration per building. All writes (invitation
//! token records) happen in the remote issuance service.

mod apartment;

pub use apartment::{ApartmentSource, PgApartmentSource, StoreError};

use std::env;
use std::sync::Arc;

use sqlx::PgPool;

use crate::export::ExportPipeline;
use crate::invitation::{InvitationServiceConfig, SupabaseInvitationIssuer};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub http_client: reqwest::Client,
    pub pipeline: ExportPipeline,
    pub exports_total: prometheus::IntCounter,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let invitation_config = InvitationServiceConfig::from_env()?;
        Self::new_with_config(invitation_config).await
    }

    pub async fn new_with_config(
        invitation_config: InvitationServiceConfig,
    ) -> anyhow::Result<Self> {
        let database_url = env::var("SUPABASE_DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("SUPABASE_DATABASE_URL must be set"))?;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .idle_timeout(std::time::Duration::from_secs(900))
            .connect(&database_url)
            .await?;

        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(std::time::Duration::from_secs(900))
            .user_agent("bewohner-app-server/0.3")
            .build()
            .expect("Failed to create reqwest client");

        let issuer = Arc::new(SupabaseInvitationIssuer::new(
            http_client.clone(),
            invitation_config,
        ));
        let apartments = Arc::new(PgApartmentSource::new(pool.clone()));
        let pipeline = ExportPipeline::new(apartments, issuer);

        let exports_total = prometheus::IntCounter::new(
            "registration_code_exports_total",
            "Number of building export runs started",
        )
        .expect("Failed to create exports counter");

        Ok(AppState {
            pool,
            http_client,
            pipeline,
            exports_total,
        })
    }
}
