use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A property ("Objekt") containing one or more apartments.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Building {
    #[schema(example = "f1e2d3c4-b5a6-7890-1234-567890abcdef")]
    pub id: Uuid,
    #[schema(example = "Elmstreet 5")]
    pub name: String,
    #[schema(example = "Elmstreet 5")]
    pub street: String,
    #[schema(example = 1010)]
    pub zip_code: Option<i32>,
    pub company_id: Uuid,
}

/// A leasable unit belonging to a building. Read-only input to the export
/// pipeline; never mutated by it.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Apartment {
    #[schema(example = "a1b2c3d4-e5f6-7890-1234-567890abcdef")]
    pub id: Uuid,
    #[schema(example = "Top 4")]
    pub name: String,
    pub building: Building,
}

/// Entry of the building selection list.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct BuildingSummary {
    pub id: Uuid,
    #[schema(example = "Elmstreet 5")]
    pub name: String,
}

/// Phase of a running batch export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportPhase {
    Tokens,
    Pdfs,
    Zip,
}

/// Transient progress tuple emitted while a batch runs. Overwritten on each
/// step; not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProgressUpdate {
    pub current: usize,
    pub total: usize,
    pub phase: ExportPhase,
}

impl ProgressUpdate {
    pub fn new(current: usize, total: usize, phase: ExportPhase) -> Self {
        Self {
            current,
            total,
            phase,
        }
    }
}
