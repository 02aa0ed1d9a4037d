#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use myocr::error::{OcrError, Result};
use myocr::ocr::{RecognitionConfig, RecognizedLine, TextRecognizer};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Write a mid-gray PNG of the given size into `dir` and return its path.
pub fn write_test_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([64, 64, 64, 255]))
        .save(&path)
        .unwrap_or_else(|e| panic!("Failed to write fixture '{name}': {e}"));
    path
}

pub fn fixture_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create fixture directory")
}

/// What the stub engine answers for one call.
pub enum Reply {
    Lines(Vec<&'static str>),
    Fail(&'static str),
}

/// Scripted recognizer that records every call it receives.
pub struct StubRecognizer {
    replies: Mutex<Vec<Reply>>,
    pub calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub width: u32,
    pub height: u32,
    /// Red channel of the crop's top-left pixel, to observe preprocessing.
    pub first_red: u8,
    pub config: RecognitionConfig,
}

impl StubRecognizer {
    pub fn new(mut replies: Vec<Reply>) -> Self {
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextRecognizer for StubRecognizer {
    fn name(&self) -> &str {
        "stub"
    }

    async fn recognize(
        &self,
        image: &RgbaImage,
        config: &RecognitionConfig,
    ) -> Result<Vec<RecognizedLine>> {
        self.calls.lock().unwrap().push(Call {
            width: image.width(),
            height: image.height(),
            first_red: image.get_pixel(0, 0)[0],
            config: config.clone(),
        });

        match self.replies.lock().unwrap().pop() {
            Some(Reply::Lines(lines)) => Ok(lines
                .into_iter()
                .map(|text| RecognizedLine::new(text, 0.95))
                .collect()),
            Some(Reply::Fail(reason)) => Err(OcrError::Engine(reason.to_string())),
            None => Ok(Vec::new()),
        }
    }
}
