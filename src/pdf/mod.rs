//! Registration document rendering.
//!
//! Produces the printable per-apartment letter carrying the invitation code,
//! returned as PDF bytes in memory; nothing touches the disk.

pub mod qr;
mod registration;


use thiserror::Error;

use crate::models::Apartment;

/// Errors from document assembly. QR generation failure is only an error in
/// the single-document flow; batch rendering degrades to a page without the
/// QR image instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("QR code generation failed: {0}")]
    Qr(String),
    #[error("PDF assembly failed: {0}")]
    Pdf(String),
}

/// One rendered letter, ready for the archive.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Filename the letter takes inside the archive.
pub fn artifact_filename(apartment: &Apartment) -> String {
    sanitize_filename::sanitize(format!(
        "Registrierung_{}_{}.pdf",
        apartment.building.name, apartment.name
    ))
}

/// Render the letter for one apartment in batch mode: if the QR code cannot
/// be generated the letter is still produced without it.
pub fn render_artifact(token: &str, apartment: &Apartment) -> Result<RenderedArtifact, RenderError> {
    let bitmap = match qr::render(token) {
        Ok(bitmap) => Some(bitmap),
        Err(e) => {
            log::warn!(
                "QR generation failed for apartment {}: {e}; rendering code text only",
                apartment.name
            );
            None
        }
    };
    let bytes = registration::render_page(token, apartment, bitmap.as_ref())?;
    Ok(RenderedArtifact {
        filename: artifact_filename(apartment),
        bytes,
    })
}

/// Render the letter for the interactive single-apartment download. Unlike
/// batch mode, a QR failure here is surfaced to the caller.
pub fn render_artifact_strict(
    token: &str,
    apartment: &Apartment,
) -> Result<RenderedArtifact, RenderError> {
    let bitmap = qr::render(token).map_err(|e| RenderError::Qr(e.to_string()))?;
    let bytes = registration::render_page(token, apartment, Some(&bitmap))?;
    Ok(RenderedArtifact {
        filename: artifact_filename(apartment),
        bytes,
    })
}
