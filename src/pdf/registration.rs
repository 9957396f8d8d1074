//! Fixed-layout registration letter.
//!
//! One A4 portrait page per apartment: invitation text, registration
//! instructions, the apartment address block, and the invitation code both as
//! text inside a bordered box and as a QR code next to it. All positions are
//! fixed constants so every letter in a batch looks identical and the layout
//! is reproducible in tests.

use printpdf::image_crate::{DynamicImage, GrayImage};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, Mm, PdfDocument, Point, Polygon, Rgb,
};

use super::qr::QrBitmap;
use super::RenderError;
use crate::models::Apartment;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_PITCH_MM: f32 = 6.0;

const TOKEN_BOX_Y_MM: f32 = 202.0;
const TOKEN_BOX_WIDTH_MM: f32 = 100.0;
const TOKEN_BOX_HEIGHT_MM: f32 = 40.0;
/// Gap between the token box and the QR code.
const QR_SPACING_MM: f32 = 10.0;
/// The QR code is exactly as tall as the token box.
const QR_SIZE_MM: f32 = TOKEN_BOX_HEIGHT_MM;

const TITLE: &str = "Sehr geehrte Eigentümer:Innen, sehr geehrte Bewohner!";

const BODY: [&str; 17] = [
    "Wie bereits im Zuge der letzten Eigentümerversammlung angekündigt, dürfen wir Sie nun",
    "herzlich einladen, mit Ihrem individuellen Zugang die neue Bewohner-App zu nutzen.",
    "An 365 Tagen rund um die Uhr geöffnet - wir bieten Ihnen diesen exklusiven Service",
    "mit unserer neuen digitalen APP-Lösung an.",
    "",
    "Diese App bietet für Sie wesentliche Vorteile in der Übersicht und der Kommunikation mit",
    "der Hausverwaltung. Wichtige Informationen erhalten Sie tagesaktuell, Schadenmeldungen",
    "können Sie über die App jederzeit an uns melden und zusätzlich können Sie unterwegs auf",
    "die wichtigsten Kontakte im Notfall zugreifen.",
    "",
    "Haben Sie die Wohnung vermietet, oder besitzen mehrere Wohnungen, bietet die App auch",
    "den Vorteil, dass Sie Ihre Wohnungen in Ihrem persönlichen Portal koppeln können, der",
    "jeweilige Mieter wird nur für die gewünschte Wohnung freigeschaltet.",
    "",
    "Wir halten ausdrücklich fest, dass für dieses Tool der Eigentümergemeinschaft keinerlei",
    "Kosten anfallen. Die Kosten, sowohl für die Entwicklung als auch für den laufenden",
    "Betrieb, werden durch die Hausverwaltung finanziert.",
];

const INSTRUCTIONS_HEADING: &str = "Anleitung zur Registrierung:";

const INSTRUCTIONS: [&str; 6] = [
    "1. Laden Sie die App aus dem App-Store herunter",
    "2. Registrieren Sie sich mit Ihren Daten",
    "3. Geben Sie den Einladungscode ein",
    "4. Bitte akzeptieren Sie bei der Registrierung die Datenschutzverordnung und erlauben",
    "   Sie Push-Nachrichten, damit Sie keine individuellen und wichtigen Informationen",
    "   verpassen!",
];

const FOOTER: [&str; 4] = [
    "Sollten Sie weitere Unterstützungen oder Informationen benötigen - wir helfen Ihnen",
    "gerne!",
    "",
    "Ihr Hausverwaltungsteam",
];

/// printpdf measures from the bottom-left corner; the layout constants are
/// distances from the top edge.
fn from_top(y_mm: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - y_mm)
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Render the letter for one apartment. `qr` is `None` when QR generation
/// failed; the page is then produced with the code text only.
pub fn render_page(
    token: &str,
    apartment: &Apartment,
    qr: Option<&QrBitmap>,
) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        "Registrierung",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Seite 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let helvetica = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let courier = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    let mut y = 20.0;
    layer.use_text(TITLE, 16.0, Mm(MARGIN_MM), from_top(y), &helvetica);
    y += 10.0;

    for line in BODY {
        if !line.is_empty() {
            layer.use_text(line, 11.0, Mm(MARGIN_MM), from_top(y), &helvetica);
        }
        y += LINE_PITCH_MM;
    }

    y += 2.0;
    layer.use_text(
        INSTRUCTIONS_HEADING,
        12.0,
        Mm(MARGIN_MM),
        from_top(y),
        &helvetica,
    );
    y += 8.0;

    for line in INSTRUCTIONS {
        layer.use_text(line, 11.0, Mm(MARGIN_MM), from_top(y), &helvetica);
        y += LINE_PITCH_MM;
    }

    y += 4.0;
    let building = &apartment.building;
    let address = match building.zip_code {
        Some(zip) => format!("Adresse: {}, {}", building.street, zip),
        None => format!("Adresse: {}", building.street),
    };
    for line in [
        format!("Objekt: {}", building.name),
        format!("Wohnung: {}", apartment.name),
        address,
    ] {
        layer.use_text(line, 11.0, Mm(MARGIN_MM), from_top(y), &helvetica);
        y += LINE_PITCH_MM;
    }

    draw_token_box(&layer, token, &courier, &helvetica);
    if let Some(bitmap) = qr {
        embed_qr(&layer, bitmap)?;
    }

    let footer_y = TOKEN_BOX_Y_MM + TOKEN_BOX_HEIGHT_MM + 15.0;
    for (index, line) in FOOTER.iter().enumerate() {
        if !line.is_empty() {
            layer.use_text(
                *line,
                11.0,
                Mm(MARGIN_MM),
                from_top(footer_y + index as f32 * LINE_PITCH_MM),
                &helvetica,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn draw_token_box(
    layer: &printpdf::PdfLayerReference,
    token: &str,
    courier: &printpdf::IndirectFontRef,
    helvetica: &printpdf::IndirectFontRef,
) {
    let top = TOKEN_BOX_Y_MM;
    let bottom = TOKEN_BOX_Y_MM + TOKEN_BOX_HEIGHT_MM;
    let left = MARGIN_MM;
    let right = MARGIN_MM + TOKEN_BOX_WIDTH_MM;

    layer.set_outline_color(rgb(229, 231, 235));
    layer.set_fill_color(rgb(249, 250, 251));
    layer.set_outline_thickness(0.5);
    layer.add_polygon(Polygon {
        rings: vec![vec![
            (Point::new(Mm(left), from_top(top)), false),
            (Point::new(Mm(right), from_top(top)), false),
            (Point::new(Mm(right), from_top(bottom)), false),
            (Point::new(Mm(left), from_top(bottom)), false),
        ]],
        mode: PaintMode::FillStroke,
        winding_order: WindingOrder::NonZero,
    });

    // Label and token vertically centered as a pair inside the box.
    let text_block_height = 3.5 + 3.5 + 5.0;
    let padding = (TOKEN_BOX_HEIGHT_MM - text_block_height) / 2.0;
    let label_y = top + padding + 3.5;
    let token_y = label_y + 5.0 + 3.5;
    let text_x = left + 4.0;

    layer.set_fill_color(rgb(107, 114, 128));
    layer.use_text(
        "Einladungscode:",
        12.0,
        Mm(text_x),
        from_top(label_y),
        helvetica,
    );

    layer.set_fill_color(rgb(17, 24, 39));
    layer.use_text(token, 12.0, Mm(text_x), from_top(token_y), courier);

    layer.set_fill_color(rgb(0, 0, 0));
}

fn embed_qr(layer: &printpdf::PdfLayerReference, bitmap: &QrBitmap) -> Result<(), RenderError> {
    let gray = GrayImage::from_raw(bitmap.width, bitmap.width, bitmap.pixels.clone())
        .ok_or_else(|| RenderError::Pdf("QR bitmap has inconsistent dimensions".to_string()))?;
    let image = Image::from_dynamic_image(&DynamicImage::ImageLuma8(gray));

    // Pixel density that makes the bitmap come out at exactly QR_SIZE_MM.
    let dpi = bitmap.width as f32 * 25.4 / QR_SIZE_MM;
    let x = MARGIN_MM + TOKEN_BOX_WIDTH_MM + QR_SPACING_MM;
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(from_top(TOKEN_BOX_Y_MM + QR_SIZE_MM)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    Ok(())
}
