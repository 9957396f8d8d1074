use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Selection of buildings to export, one pipeline run per building.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExportRequest {
    pub building_ids: Vec<Uuid>,
}

/// Query parameters of the building selection list.
#[derive(Debug, Deserialize, IntoParams)]
pub struct BuildingsQuery {
    pub company_id: Uuid,
}

/// Result of one building's pipeline run: the archive plus the number of
/// apartments skipped because token issuance failed for them.
#[derive(Debug)]
pub struct BuildingArchive {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub skipped: usize,
}
