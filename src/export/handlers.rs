use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use super::{BuildingArchive, BuildingsQuery, ExportError, ExportRequest};
use crate::archive;
use crate::db::AppState;
use crate::models::BuildingSummary;
use crate::pdf::{self, RenderedArtifact};
use crate::ErrorResponse;

fn attachment(filename: &str, content_type: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(bytes)
}

fn export_error_response(error: ExportError) -> HttpResponse {
    match error {
        ExportError::NoApartments(building_id) => HttpResponse::NotFound().json(
            ErrorResponse::not_found(&format!("Keine Wohnungen gefunden ({building_id})")),
        ),
        ExportError::NoTokensIssued => HttpResponse::BadGateway().json(ErrorResponse::new(
            "BadGateway",
            "Keine Tokens konnten generiert werden",
        )),
        ExportError::Store(e) => {
            log::error!("Export failed reading the store: {e}");
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Fehler beim Laden der Wohnungen"))
        }
        ExportError::Packaging(e) => {
            log::error!("Export failed while packaging: {e}");
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Fehler beim Erstellen der ZIP-Datei"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/buildings",
    tag = "Registration Codes",
    params(BuildingsQuery),
    responses(
        (status = 200, description = "Buildings of the company", body = Vec<BuildingSummary>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_buildings(
    state: web::Data<AppState>,
    query: web::Query<BuildingsQuery>,
) -> impl Responder {
    match state.list_buildings(query.company_id).await {
        Ok(buildings) => HttpResponse::Ok().json(buildings),
        Err(e) => {
            log::error!("Failed to list buildings: {e}");
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Fehler beim Laden der Objekte"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/registration-codes/export",
    tag = "Registration Codes",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "ZIP archive with one registration letter per apartment"),
        (status = 400, description = "Empty building selection", body = ErrorResponse),
        (status = 404, description = "Building has no apartments", body = ErrorResponse),
        (status = 502, description = "No token could be issued", body = ErrorResponse)
    )
)]
pub async fn export_registration_codes(
    state: web::Data<AppState>,
    body: web::Json<ExportRequest>,
) -> impl Responder {
    let request = body.into_inner();
    if request.building_ids.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "Bitte wählen Sie mindestens ein Objekt aus",
        ));
    }

    state.exports_total.inc();

    let result = state
        .pipeline
        .run(&request, |progress| {
            log::debug!(
                "export progress: {}/{} in phase {:?}",
                progress.current,
                progress.total,
                progress.phase
            );
        })
        .await;

    match result {
        Ok(mut archives) if archives.len() == 1 => {
            let BuildingArchive {
                filename, bytes, ..
            } = archives.remove(0);
            attachment(&filename, "application/zip", bytes)
        }
        // One archive per building; a single HTTP response cannot trigger
        // several downloads, so several buildings ship as one outer bundle.
        Ok(archives) => {
            let bundle: Vec<RenderedArtifact> = archives
                .into_iter()
                .map(|archive| RenderedArtifact {
                    filename: archive.filename,
                    bytes: archive.bytes,
                })
                .collect();
            match archive::pack(&bundle, |_| {}) {
                Ok(bytes) => attachment("Registrierungscodes.zip", "application/zip", bytes),
                Err(e) => export_error_response(ExportError::Packaging(e)),
            }
        }
        Err(e) => export_error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/registration-codes/apartments/{apartment_id}",
    tag = "Registration Codes",
    params(
        ("apartment_id" = Uuid, Path, description = "Apartment to issue a code for")
    ),
    responses(
        (status = 200, description = "Registration letter for one apartment"),
        (status = 404, description = "Apartment not found", body = ErrorResponse),
        (status = 502, description = "Token issuance failed", body = ErrorResponse)
    )
)]
pub async fn download_apartment_code(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let apartment_id = path.into_inner();

    let apartment = match state.apartment_by_id(apartment_id).await {
        Ok(Some(apartment)) => apartment,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(ErrorResponse::not_found("Wohnung nicht gefunden"))
        }
        Err(e) => {
            log::error!("Apartment lookup failed: {e}");
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Fehler beim Laden der Wohnung"));
        }
    };

    let token = match state
        .pipeline
        .issuer()
        .issue(apartment.id, apartment.building.company_id)
        .await
    {
        Ok(token) => token,
        Err(e) => {
            log::error!("Token issuance failed for apartment {}: {e}", apartment.name);
            return HttpResponse::BadGateway()
                .json(ErrorResponse::new("BadGateway", &e.to_string()));
        }
    };

    // Interactive flow: a QR failure is an error here, unlike in the batch.
    match pdf::render_artifact_strict(&token, &apartment) {
        Ok(artifact) => attachment(&artifact.filename, "application/pdf", artifact.bytes),
        Err(e) => {
            log::error!("Rendering failed for apartment {}: {e}", apartment.name);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Fehler beim Erstellen des PDFs"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/buildings").route(web::get().to(list_buildings)))
        .service(
            web::resource("/registration-codes/export")
                .route(web::post().to(export_registration_codes)),
        )
        .service(
            web::resource("/registration-codes/apartments/{apartment_id}")
                .route(web::post().to(download_apartment_code)),
        );
}
