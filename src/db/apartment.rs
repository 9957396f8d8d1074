//! Apartment and building reads against Postgres.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::AppState;
use crate::models::{Apartment, Building, BuildingSummary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// Enumeration of the apartments the pipeline exports.
#[async_trait]
pub trait ApartmentSource: Send + Sync {
    /// All apartments of one building, ordered by apartment name.
    async fn apartments_in_building(&self, building_id: Uuid)
        -> Result<Vec<Apartment>, StoreError>;
}

#[derive(sqlx::FromRow)]
struct ApartmentRow {
    id: Uuid,
    name: String,
    building_id: Uuid,
    building_name: String,
    street: String,
    zip_code: Option<i32>,
    company_id: Uuid,
}

impl From<ApartmentRow> for Apartment {
    fn from(row: ApartmentRow) -> Self {
        Apartment {
            id: row.id,
            name: row.name,
            building: Building {
                id: row.building_id,
                name: row.building_name,
                street: row.street,
                zip_code: row.zip_code,
                company_id: row.company_id,
            },
        }
    }
}

const APARTMENT_COLUMNS: &str = r#"
    SELECT a.id, a.name,
           o.id AS building_id, o.name AS building_name,
           o.street, o.zip_code, o.company_id
    FROM apartments a
    JOIN objects o ON o.id = a.object_id
"#;

/// Postgres-backed apartment enumeration.
pub struct PgApartmentSource {
    pool: PgPool,
}

impl PgApartmentSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApartmentSource for PgApartmentSource {
    async fn apartments_in_building(
        &self,
        building_id: Uuid,
    ) -> Result<Vec<Apartment>, StoreError> {
        let rows: Vec<ApartmentRow> =
            sqlx::query_as(&format!("{APARTMENT_COLUMNS} WHERE a.object_id = $1 ORDER BY a.name"))
                .bind(building_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Apartment::from).collect())
    }
}

impl AppState {
    /// Building selection list for one company.
    pub async fn list_buildings(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<BuildingSummary>, StoreError> {
        #[derive(sqlx::FromRow)]
        struct BuildingRow {
            id: Uuid,
            name: String,
        }

        let rows: Vec<BuildingRow> =
            sqlx::query_as("SELECT id, name FROM objects WHERE company_id = $1 ORDER BY name")
                .bind(company_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|row| BuildingSummary {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    /// Single apartment lookup for the interactive one-letter download.
    pub async fn apartment_by_id(
        &self,
        apartment_id: Uuid,
    ) -> Result<Option<Apartment>, StoreError> {
        let row: Option<ApartmentRow> =
            sqlx::query_as(&format!("{APARTMENT_COLUMNS} WHERE a.id = $1"))
                .bind(apartment_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Apartment::from))
    }
}
