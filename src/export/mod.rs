//! Batch export of registration codes.
//!
//! Drives the three-phase pipeline for each selected building: sequential
//! token issuance, chunked PDF rendering, ZIP packaging. Per-apartment
//! failures are logged and skipped; a building with no issued token at all
//! aborts that building's run. Once started, a run cannot be cancelled and
//! already-issued tokens are never rolled back.

pub mod handlers;
mod models;

#[cfg(test)]
mod tests;

pub use models::{BuildingArchive, BuildingsQuery, ExportRequest};

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use uuid::Uuid;

use crate::archive::{self, PackagingError};
use crate::db::{ApartmentSource, StoreError};
use crate::invitation::InvitationIssuer;
use crate::models::{Apartment, ExportPhase, ProgressUpdate};
use crate::pdf::{self, RenderedArtifact};

/// How many letters are rendered at the same time. Rendering happens in
/// fixed chunks of this size; a chunk completes before the next one starts.
pub const RENDER_CONCURRENCY: usize = 3;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no apartments found for building {0}")]
    NoApartments(Uuid),
    #[error("no invitation tokens could be issued")]
    NoTokensIssued,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Packaging(#[from] PackagingError),
}

/// The batch orchestrator. Cheap to clone; both collaborators sit behind
/// trait objects so tests can substitute them.
#[derive(Clone)]
pub struct ExportPipeline {
    apartments: Arc<dyn ApartmentSource>,
    issuer: Arc<dyn InvitationIssuer>,
}

impl ExportPipeline {
    pub fn new(apartments: Arc<dyn ApartmentSource>, issuer: Arc<dyn InvitationIssuer>) -> Self {
        Self { apartments, issuer }
    }

    pub fn issuer(&self) -> &Arc<dyn InvitationIssuer> {
        &self.issuer
    }

    /// Run the whole three-phase pipeline once per requested building,
    /// sequentially. Every building produces its own archive and its own
    /// progress sequence; nothing is merged across buildings.
    pub async fn run<F>(
        &self,
        request: &ExportRequest,
        mut on_progress: F,
    ) -> Result<Vec<BuildingArchive>, ExportError>
    where
        F: FnMut(ProgressUpdate),
    {
        let mut archives = Vec::with_capacity(request.building_ids.len());
        for &building_id in &request.building_ids {
            archives.push(self.export_building(building_id, &mut on_progress).await?);
        }
        Ok(archives)
    }

    /// One building's run: tokens, then pdfs, then zip.
    pub async fn export_building<F>(
        &self,
        building_id: Uuid,
        on_progress: &mut F,
    ) -> Result<BuildingArchive, ExportError>
    where
        F: FnMut(ProgressUpdate),
    {
        let apartments = self.apartments.apartments_in_building(building_id).await?;
        if apartments.is_empty() {
            return Err(ExportError::NoApartments(building_id));
        }
        let building_name = apartments[0].building.name.clone();
        let total = apartments.len();
        log::info!("Starting registration-code export for building {building_name} ({total} apartments)");

        // Phase 1: strictly sequential issuance. A failed apartment is
        // skipped; progress advances either way.
        let mut issued: Vec<(String, Apartment)> = Vec::with_capacity(total);
        let mut skipped = 0usize;
        for (index, apartment) in apartments.into_iter().enumerate() {
            match self
                .issuer
                .issue(apartment.id, apartment.building.company_id)
                .await
            {
                Ok(token) => issued.push((token, apartment)),
                Err(e) => {
                    skipped += 1;
                    log::error!(
                        "Token issuance failed for apartment {}: {e}; skipping",
                        apartment.name
                    );
                }
            }
            on_progress(ProgressUpdate::new(index + 1, total, ExportPhase::Tokens));
        }

        if issued.is_empty() {
            return Err(ExportError::NoTokensIssued);
        }

        // Phase 2: chunked rendering. Results land at their original index,
        // so artifact order matches enumeration order regardless of which
        // render finishes first.
        let tokened = issued.len();
        let mut artifacts: Vec<Option<RenderedArtifact>> = Vec::new();
        artifacts.resize_with(tokened, || None);

        for (chunk_index, chunk) in issued.chunks(RENDER_CONCURRENCY).enumerate() {
            let start = chunk_index * RENDER_CONCURRENCY;
            let handles: Vec<_> = chunk
                .iter()
                .cloned()
                .map(|(token, apartment)| {
                    tokio::task::spawn_blocking(move || {
                        let name = apartment.name.clone();
                        (name, pdf::render_artifact(&token, &apartment))
                    })
                })
                .collect();

            for (offset, joined) in join_all(handles).await.into_iter().enumerate() {
                match joined {
                    Ok((_, Ok(artifact))) => artifacts[start + offset] = Some(artifact),
                    Ok((name, Err(e))) => {
                        log::error!("Rendering failed for apartment {name}: {e}; skipping");
                    }
                    Err(e) => log::error!("Render task failed: {e}"),
                }
            }

            on_progress(ProgressUpdate::new(
                start + chunk.len(),
                tokened,
                ExportPhase::Pdfs,
            ));
        }

        // Phase 3: pack whatever rendered.
        let files: Vec<RenderedArtifact> = artifacts.into_iter().flatten().collect();
        let bytes = archive::pack(&files, |percent| {
            on_progress(ProgressUpdate::new(percent, 100, ExportPhase::Zip));
        })?;

        log::info!(
            "Export for building {building_name} finished: {} letters, {skipped} apartments skipped",
            files.len()
        );

        Ok(BuildingArchive {
            filename: archive::archive_filename(&building_name),
            bytes,
            skipped,
        })
    }
}
