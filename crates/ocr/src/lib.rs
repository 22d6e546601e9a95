pub mod assemble;
pub mod cluster;
pub mod detect;
pub mod disambiguate;
pub mod extract;
pub mod locale;
pub mod matcher;
pub mod normalize;
pub mod paddle;
pub mod pipeline;
pub mod recognizer;
pub mod score;
pub mod types;

pub use detect::{CandidateSet, Detector};
pub use disambiguate::Selections;
pub use extract::Extractor;
pub use paddle::parse_paddle_json;
pub use pipeline::{document_id, ReceiptPipeline};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use types::{BoundingBox, FieldCandidate, FieldKind, FieldValue, Line, Point, TextBox};
