use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use image::RgbaImage;

use crate::args::ScanArgs;
use crate::config::OcrConfig;
use crate::error::Result;
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    Accurate,
    Fast,
}

impl FromStr for Accuracy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accurate" => Ok(Accuracy::Accurate),
            "fast" => Ok(Accuracy::Fast),
            other => Err(format!("unknown accuracy profile '{other}', expected 'accurate' or 'fast'")),
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accuracy::Accurate => write!(f, "accurate"),
            Accuracy::Fast => write!(f, "fast"),
        }
    }
}

/// Recognition profile shared by every region of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    pub accuracy: Accuracy,
    pub language_correction: bool,
    pub revision: u32,
    /// Fraction of the region height; 0 means unset.
    pub min_text_height: f32,
    pub vocabulary: Vocabulary,
}

impl RecognitionConfig {
    pub fn new(ocr: &OcrConfig, args: &ScanArgs, vocabulary: Vocabulary) -> Self {
        Self {
            accuracy: if args.fast {
                Accuracy::Fast
            } else {
                ocr.accuracy
            },
            language_correction: ocr.language_correction,
            revision: ocr.revision,
            min_text_height: args.min_text_height,
            vocabulary,
        }
    }

    /// Minimum text height in pixels for an image `image_height` pixels tall.
    pub fn min_text_height_px(&self, image_height: u32) -> Option<u32> {
        if self.min_text_height > 0.0 {
            let px = (self.min_text_height * image_height as f32).round() as u32;
            Some(px.max(1))
        } else {
            None
        }
    }

    /// Tesseract page segmentation mode: full layout analysis when accurate,
    /// a single uniform block when fast.
    pub fn page_segmentation_mode(&self) -> &'static str {
        match self.accuracy {
            Accuracy::Accurate => "3",
            Accuracy::Fast => "6",
        }
    }
}

/// Top-ranked candidate for one detected line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedLine {
    pub text: String,
    /// 0.0 to 1.0
    pub confidence: f32,
}

impl RecognizedLine {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// A text recognition backend. Each call is independent of the others.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &str;

    /// Lines in the engine's reading order.
    async fn recognize(
        &self,
        image: &RgbaImage,
        config: &RecognitionConfig,
    ) -> Result<Vec<RecognizedLine>>;
}
