use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::{ExportError, ExportPipeline, ExportRequest};
use crate::db::{ApartmentSource, StoreError};
use crate::invitation::{InvitationIssuer, IssuanceError};
use crate::models::{Apartment, Building, ExportPhase, ProgressUpdate};

struct StubSource {
    apartments: Vec<Apartment>,
}

#[async_trait]
impl ApartmentSource for StubSource {
    async fn apartments_in_building(&self, _: Uuid) -> Result<Vec<Apartment>, StoreError> {
        Ok(self.apartments.clone())
    }
}

struct StubIssuer {
    fail_for: HashSet<Uuid>,
    serial: AtomicUsize,
}

impl StubIssuer {
    fn reliable() -> Self {
        Self {
            fail_for: HashSet::new(),
            serial: AtomicUsize::new(0),
        }
    }

    fn failing_for(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            fail_for: ids.into_iter().collect(),
            serial: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl InvitationIssuer for StubIssuer {
    async fn issue(&self, apartment_id: Uuid, _: Uuid) -> Result<String, IssuanceError> {
        if self.fail_for.contains(&apartment_id) {
            return Err(IssuanceError::Rejected(
                "Invalid apartment or company relationship".to_string(),
            ));
        }
        let serial = self.serial.fetch_add(1, Ordering::SeqCst);
        Ok(format!("tok-{serial:04}"))
    }
}

fn building(name: &str) -> Building {
    Building {
        id: Uuid::new_v4(),
        name: name.to_string(),
        street: format!("{name} Straße"),
        zip_code: Some(1010),
        company_id: Uuid::new_v4(),
    }
}

fn apartments_for(building: &Building, count: usize) -> Vec<Apartment> {
    (1..=count)
        .map(|n| Apartment {
            id: Uuid::new_v4(),
            name: format!("Top {n}"),
            building: building.clone(),
        })
        .collect()
}

fn pipeline(apartments: Vec<Apartment>, issuer: StubIssuer) -> ExportPipeline {
    ExportPipeline::new(Arc::new(StubSource { apartments }), Arc::new(issuer))
}

fn entry_names(archive_bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

fn phase_events(events: &[ProgressUpdate], phase: ExportPhase) -> Vec<ProgressUpdate> {
    events
        .iter()
        .copied()
        .filter(|event| event.phase == phase)
        .collect()
}

#[tokio::test]
async fn full_building_exports_one_letter_per_apartment() {
    let building = building("Elmstreet 5");
    let apartments = apartments_for(&building, 7);
    let pipeline = pipeline(apartments, StubIssuer::reliable());

    let mut events = Vec::new();
    let archive = pipeline
        .export_building(building.id, &mut |event| events.push(event))
        .await
        .unwrap();

    assert_eq!(archive.filename, "Registrierungscodes_Elmstreet 5.zip");
    assert_eq!(archive.skipped, 0);

    let names = entry_names(&archive.bytes);
    assert_eq!(names.len(), 7);
    for n in 1..=7 {
        assert!(names.contains(&format!("Registrierung_Elmstreet 5_Top {n}.pdf")));
    }

    let token_events = phase_events(&events, ExportPhase::Tokens);
    assert_eq!(token_events.len(), 7);
    assert_eq!(
        token_events.iter().map(|e| e.current).collect::<Vec<_>>(),
        (1..=7).collect::<Vec<_>>()
    );
    assert!(token_events.iter().all(|e| e.total == 7));
}

#[tokio::test]
async fn failed_issuance_skips_apartment_but_not_progress() {
    let building = building("Elmstreet 5");
    let apartments = apartments_for(&building, 7);
    let failing = apartments[3].id;
    let pipeline = pipeline(apartments, StubIssuer::failing_for([failing]));

    let mut events = Vec::new();
    let archive = pipeline
        .export_building(building.id, &mut |event| events.push(event))
        .await
        .unwrap();

    assert_eq!(archive.skipped, 1);
    let names = entry_names(&archive.bytes);
    assert_eq!(names.len(), 6);
    assert!(!names.contains(&"Registrierung_Elmstreet 5_Top 4.pdf".to_string()));

    // Progress still covers every apartment, success or failure.
    let token_events = phase_events(&events, ExportPhase::Tokens);
    assert_eq!(token_events.len(), 7);
    assert_eq!(token_events.last().unwrap().current, 7);
    assert_eq!(token_events.last().unwrap().total, 7);
}

#[tokio::test]
async fn all_issuances_failing_aborts_the_building() {
    let building = building("Elmstreet 5");
    let apartments = apartments_for(&building, 3);
    let all_ids: Vec<Uuid> = apartments.iter().map(|a| a.id).collect();
    let pipeline = pipeline(apartments, StubIssuer::failing_for(all_ids));

    let err = pipeline
        .export_building(building.id, &mut |_| {})
        .await
        .expect_err("export should fail without any token");

    assert!(matches!(err, ExportError::NoTokensIssued));
}

#[tokio::test]
async fn empty_building_is_fatal() {
    let building = building("Leerstand 1");
    let pipeline = pipeline(Vec::new(), StubIssuer::reliable());

    let err = pipeline
        .export_building(building.id, &mut |_| {})
        .await
        .expect_err("export should fail without apartments");

    assert!(matches!(err, ExportError::NoApartments(_)));
}

#[tokio::test]
async fn rendering_progress_advances_per_chunk() {
    let building = building("Haus Nord");
    let apartments = apartments_for(&building, 10);
    let pipeline = pipeline(apartments, StubIssuer::reliable());

    let mut events = Vec::new();
    pipeline
        .export_building(building.id, &mut |event| events.push(event))
        .await
        .unwrap();

    // Concurrency limit 3 over 10 letters: chunks of 3, 3, 3, 1.
    let pdf_events = phase_events(&events, ExportPhase::Pdfs);
    assert_eq!(
        pdf_events.iter().map(|e| e.current).collect::<Vec<_>>(),
        vec![3, 6, 9, 10]
    );
    assert!(pdf_events.iter().all(|e| e.total == 10));
}

#[tokio::test]
async fn archive_order_matches_apartment_order() {
    let building = building("Haus Nord");
    let apartments = apartments_for(&building, 5);
    let expected: Vec<String> = apartments
        .iter()
        .map(|a| format!("Registrierung_Haus Nord_{}.pdf", a.name))
        .collect();
    let pipeline = pipeline(apartments, StubIssuer::reliable());

    let archive = pipeline
        .export_building(building.id, &mut |_| {})
        .await
        .unwrap();

    assert_eq!(entry_names(&archive.bytes), expected);
}

#[tokio::test]
async fn zip_progress_is_fractional_and_completes() {
    let building = building("Elmstreet 5");
    let apartments = apartments_for(&building, 4);
    let pipeline = pipeline(apartments, StubIssuer::reliable());

    let mut events = Vec::new();
    pipeline
        .export_building(building.id, &mut |event| events.push(event))
        .await
        .unwrap();

    let zip_events = phase_events(&events, ExportPhase::Zip);
    assert!(zip_events.len() >= 2);
    assert_eq!(zip_events.first().unwrap().current, 0);
    assert_eq!(zip_events.last().unwrap().current, 100);
    assert!(zip_events.iter().all(|e| e.total == 100));
    assert!(zip_events.windows(2).all(|w| w[0].current <= w[1].current));
}

#[tokio::test]
async fn multiple_buildings_produce_separate_archives() {
    // One source per building is not expressible with the single stub, so
    // both buildings share the apartment list; what matters here is that
    // each requested building yields its own archive.
    let building = building("Elmstreet 5");
    let apartments = apartments_for(&building, 2);
    let pipeline = pipeline(apartments, StubIssuer::reliable());

    let request = ExportRequest {
        building_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
    };
    let archives = pipeline.run(&request, |_| {}).await.unwrap();

    assert_eq!(archives.len(), 2);
    for archive in &archives {
        assert_eq!(archive.filename, "Registrierungscodes_Elmstreet 5.zip");
        assert_eq!(entry_names(&archive.bytes).len(), 2);
    }
}
