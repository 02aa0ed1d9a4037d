//! OCR (Optical Character Recognition) Module
//!
//! Text recognition is delegated to an external engine behind the
//! [`TextRecognizer`] trait, so the region pipeline never depends on a
//! particular backend.
//!
//! # Architecture
//!
//! - `TextRecognizer` is the narrow seam: one image and one
//!   [`RecognitionConfig`] in, recognized lines out
//! - `OcrProvider` selects a backend from `OcrConfig::model`:
//!   - `local/tesseract-cli` runs the `tesseract` executable per region
//!   - `local/tesseract` drives Tesseract in-process via leptess
//! - `preprocessing` decodes, gamma-adjusts and crops images
//!
//! # Configuration
//!
//! Backend behavior is controlled via `OcrConfig` (see `config.rs`):
//! - `model`: backend selection
//! - `languages`: Tesseract language codes, e.g. `eng+deu`
//! - `accuracy`, `language_correction`, `revision`: recognition profile
//! - `timeout_secs`: per-region recognition timeout

mod preprocessing;
mod provider;
mod recognizer;
mod tesseract_cli;

pub use preprocessing::{apply_gamma, crop_region, encode_png, load_image, preprocess_file, to_bitmap};
pub use provider::OcrProvider;
pub use recognizer::{Accuracy, RecognitionConfig, RecognizedLine, TextRecognizer};
pub use tesseract_cli::{parse_tsv, TesseractCli};
