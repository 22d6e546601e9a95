//! Reader for PaddleOCR result dumps.
//!
//! Two layouts are in circulation: the classic list of
//! `[polygon, [text, score]]` entries (usually wrapped in a per-page list,
//! with `null` for pages without text), and the newer predict result object
//! `{dt_polys, rec_texts, rec_scores}`, alone or in a list. Only the first
//! page is read.

use serde::Deserialize;
use tracing::debug;

use crate::recognizer::OcrError;
use crate::types::{BoundingBox, Point, TextBox};

type Polygon = Vec<[f32; 2]>;

#[derive(Debug, Deserialize)]
struct Entry(Polygon, (String, f32));

#[derive(Debug, Deserialize)]
struct PredictResult {
    dt_polys: Vec<Polygon>,
    rec_texts: Vec<String>,
    rec_scores: Vec<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PaddleOutput {
    Predict(PredictResult),
    PredictPages(Vec<PredictResult>),
    Entries(Vec<Entry>),
    Pages(Vec<Option<Vec<Entry>>>),
}

pub fn parse_paddle_json(json: &str) -> Result<Vec<TextBox>, OcrError> {
    let output: PaddleOutput = serde_json::from_str(json)?;
    let raw: Vec<(Polygon, String, f32)> = match output {
        PaddleOutput::Predict(p) => from_predict(p),
        PaddleOutput::PredictPages(pages) => pages.into_iter().next().map(from_predict).unwrap_or_default(),
        PaddleOutput::Entries(entries) => from_entries(entries),
        PaddleOutput::Pages(pages) => pages
            .into_iter()
            .next()
            .flatten()
            .map(from_entries)
            .unwrap_or_default(),
    };

    Ok(raw
        .into_iter()
        .filter_map(|(polygon, text, score)| match to_bbox(&polygon) {
            Some(bbox) => Some(TextBox::new(text, score, bbox)),
            None => {
                debug!(text = %text, "box without polygon points skipped");
                None
            }
        })
        .collect())
}

fn from_predict(p: PredictResult) -> Vec<(Polygon, String, f32)> {
    if p.dt_polys.len() != p.rec_texts.len() || p.rec_texts.len() != p.rec_scores.len() {
        debug!(
            polys = p.dt_polys.len(),
            texts = p.rec_texts.len(),
            scores = p.rec_scores.len(),
            "predict result arrays differ in length; extra entries ignored"
        );
    }
    p.dt_polys
        .into_iter()
        .zip(p.rec_texts)
        .zip(p.rec_scores)
        .map(|((poly, text), score)| (poly, text, score))
        .collect()
}

fn from_entries(entries: Vec<Entry>) -> Vec<(Polygon, String, f32)> {
    entries
        .into_iter()
        .map(|Entry(poly, (text, score))| (poly, text, score))
        .collect()
}

/// Quadrilaterals are kept as-is; other polygons shrink to their
/// axis-aligned bounding rectangle.
fn to_bbox(polygon: &[[f32; 2]]) -> Option<BoundingBox> {
    if let [a, b, c, d] = polygon {
        return Some(BoundingBox::new([
            Point::new(a[0], a[1]),
            Point::new(b[0], b[1]),
            Point::new(c[0], c[1]),
            Point::new(d[0], d[1]),
        ]));
    }
    if polygon.is_empty() {
        return None;
    }
    let xs = polygon.iter().map(|p| p[0]);
    let ys = polygon.iter().map(|p| p[1]);
    Some(BoundingBox::from_coords(
        xs.clone().fold(f32::INFINITY, f32::min),
        ys.clone().fold(f32::INFINITY, f32::min),
        xs.fold(f32::NEG_INFINITY, f32::max),
        ys.fold(f32::NEG_INFINITY, f32::max),
    ))
}
