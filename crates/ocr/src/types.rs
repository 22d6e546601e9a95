use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The quadrilateral a recognizer reports around one text fragment.
/// Point order is not assumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub points: [Point; 4],
}

impl BoundingBox {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Axis-aligned box from its top-left corner and size.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_coords(x, y, x + width, y + height)
    }

    pub fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            points: [
                Point::new(x1, y1),
                Point::new(x2, y1),
                Point::new(x2, y2),
                Point::new(x1, y2),
            ],
        }
    }

    pub fn x_min(&self) -> f32 {
        self.points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }

    pub fn x_max(&self) -> f32 {
        self.points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn y_min(&self) -> f32 {
        self.points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min)
    }

    pub fn y_max(&self) -> f32 {
        self.points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn height(&self) -> f32 {
        self.y_max() - self.y_min()
    }

    pub fn center(&self) -> Point {
        let sum_x: f32 = self.points.iter().map(|p| p.x).sum();
        let sum_y: f32 = self.points.iter().map(|p| p.y).sum();
        Point::new(sum_x / 4.0, sum_y / 4.0)
    }
}

/// One recognized text fragment, as delivered by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub text: String,
    /// Recognizer confidence (0.0–1.0).
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl TextBox {
    pub fn new(text: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self { text: text.into(), confidence, bbox }
    }
}

/// A reconstructed row of text: boxes sharing a vertical band, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Top-to-bottom position within the document, starting at 0.
    pub index: usize,
    pub boxes: Vec<TextBox>,
    /// Box texts joined with single spaces.
    pub text: String,
}

impl Line {
    /// Average box height, a proxy for font size.
    pub fn height(&self) -> f32 {
        if self.boxes.is_empty() {
            return 0.0;
        }
        self.boxes.iter().map(|b| b.bbox.height()).sum::<f32>() / self.boxes.len() as f32
    }

    pub fn center_y(&self) -> f32 {
        if self.boxes.is_empty() {
            return 0.0;
        }
        self.boxes.iter().map(|b| b.bbox.center().y).sum::<f32>() / self.boxes.len() as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Date,
    Vendor,
    Total,
    Currency,
    Location,
}

/// Which candidate wins when two share the best score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Lowest line index; headers are more reliable than body text.
    TopMost,
    /// Highest line index; totals sit below the itemized lines.
    BottomMost,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Date,
        FieldKind::Vendor,
        FieldKind::Total,
        FieldKind::Currency,
        FieldKind::Location,
    ];

    pub fn tie_break(self) -> TieBreak {
        match self {
            FieldKind::Total => TieBreak::BottomMost,
            FieldKind::Date | FieldKind::Vendor | FieldKind::Currency | FieldKind::Location => {
                TieBreak::TopMost
            }
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Date => write!(f, "date"),
            FieldKind::Vendor => write!(f, "vendor"),
            FieldKind::Total => write!(f, "total"),
            FieldKind::Currency => write!(f, "currency"),
            FieldKind::Location => write!(f, "location"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Date(NaiveDate),
    Amount(Decimal),
    Text(String),
    /// ISO 4217 code.
    Currency(String),
}

/// A parsed, scored guess for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCandidate {
    pub kind: FieldKind,
    pub raw_text: String,
    pub value: FieldValue,
    pub line_index: usize,
    /// 0.0–1.0.
    pub score: f32,
}

impl FieldCandidate {
    pub fn new(
        kind: FieldKind,
        raw_text: impl Into<String>,
        value: FieldValue,
        line_index: usize,
        score: f32,
    ) -> Self {
        Self {
            kind,
            raw_text: raw_text.into(),
            value,
            line_index,
            score: crate::score::clamp(score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_geometry() {
        let b = BoundingBox::from_rect(10.0, 100.0, 50.0, 20.0);
        assert_eq!(b.x_min(), 10.0);
        assert_eq!(b.x_max(), 60.0);
        assert_eq!(b.y_min(), 100.0);
        assert_eq!(b.height(), 20.0);
        assert_eq!(b.center(), Point::new(35.0, 110.0));
    }

    #[test]
    fn skewed_quad_height_uses_extremes() {
        let b = BoundingBox::new([
            Point::new(0.0, 2.0),
            Point::new(40.0, 0.0),
            Point::new(40.0, 10.0),
            Point::new(0.0, 12.0),
        ]);
        assert_eq!(b.height(), 12.0);
        assert_eq!(b.center().y, 6.0);
    }

    #[test]
    fn tie_break_differs_for_total() {
        assert_eq!(FieldKind::Total.tie_break(), TieBreak::BottomMost);
        assert_eq!(FieldKind::Vendor.tie_break(), TieBreak::TopMost);
        assert_eq!(FieldKind::Date.tie_break(), TieBreak::TopMost);
    }

    #[test]
    fn candidate_score_is_clamped() {
        let c = FieldCandidate::new(FieldKind::Vendor, "X", FieldValue::Text("X".into()), 0, 1.4);
        assert_eq!(c.score, 1.0);
    }

    #[test]
    fn field_kind_display() {
        assert_eq!(FieldKind::Currency.to_string(), "currency");
    }
}
