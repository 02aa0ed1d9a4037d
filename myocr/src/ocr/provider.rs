use std::time::Duration;

use async_trait::async_trait;
use image::RgbaImage;
use leptess::{LepTess, Variable};
use tracing::{debug, info, warn};

use crate::config::{parse_provider_model, OcrConfig};
use crate::error::{OcrError, Result};

use super::preprocessing::encode_png;
use super::recognizer::{RecognitionConfig, RecognizedLine, TextRecognizer};
use super::tesseract_cli::TesseractCli;

enum OcrBackend {
    /// Each call builds its own `LepTess`, so a call abandoned by the timeout
    /// cannot hold up the regions after it.
    Library { languages: String },
    Command { runner: TesseractCli },
    Unavailable { reason: String },
}

/// Recognition backend selected by `OcrConfig::model`.
///
/// A backend that fails to initialize leaves the provider unavailable; every
/// recognition then fails with [`OcrError::EngineUnavailable`].
pub struct OcrProvider {
    backend: OcrBackend,
    config: OcrConfig,
}

fn create_tesseract(languages: &str) -> std::result::Result<LepTess, String> {
    LepTess::new(None, languages).map_err(|e| e.to_string())
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Self {
        let (_, model) = parse_provider_model(&config.model);

        let backend = match model.to_lowercase().as_str() {
            "tesseract" => match create_tesseract(&config.languages) {
                Ok(_) => {
                    info!(languages = %config.languages, "Tesseract library backend initialized");
                    OcrBackend::Library {
                        languages: config.languages.clone(),
                    }
                }
                Err(e) => {
                    let reason = format!("Tesseract not available: {e}");
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            },
            "tesseract-cli" => {
                let runner = TesseractCli::new(&config.tesseract_path, &config.languages);
                match runner.probe() {
                    Ok(version) => {
                        info!(%version, languages = %config.languages, "Tesseract command backend initialized");
                        OcrBackend::Command { runner }
                    }
                    Err(e) => {
                        let reason = format!("Tesseract executable not available: {e}");
                        warn!("{}", reason);
                        OcrBackend::Unavailable { reason }
                    }
                }
            }
            other => {
                let reason = format!("unknown OCR model '{other}'");
                warn!("{}", reason);
                OcrBackend::Unavailable { reason }
            }
        };

        Self {
            backend,
            config: config.clone(),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: OcrBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: OcrConfig::default(),
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.backend {
            OcrBackend::Unavailable { reason } => Some(reason),
            _ => None,
        }
    }

    async fn recognize_internal(
        &self,
        image: &RgbaImage,
        config: &RecognitionConfig,
    ) -> Result<Vec<RecognizedLine>> {
        match &self.backend {
            OcrBackend::Library { languages } => {
                debug!(
                    words = config.vocabulary.len(),
                    min_text_height = config.min_text_height,
                    "Library backend ignores custom words and minimum text height"
                );
                let bytes = encode_png(image)?;
                let psm = config.page_segmentation_mode();
                let languages = languages.clone();

                tokio::task::spawn_blocking(move || -> Result<Vec<RecognizedLine>> {
                    let mut lt = create_tesseract(&languages).map_err(OcrError::EngineUnavailable)?;
                    lt.set_variable(Variable::TesseditPagesegMode, psm)
                        .map_err(|e| OcrError::Engine(format!("Failed to set page mode: {e}")))?;
                    lt.set_image_from_mem(&bytes)
                        .map_err(|e| OcrError::Engine(format!("Failed to set image: {e}")))?;
                    let text = lt
                        .get_utf8_text()
                        .map_err(|e| OcrError::Engine(format!("Failed to extract text: {e}")))?;
                    let confidence = lt.mean_text_conf() as f32 / 100.0;
                    Ok(lines_from_text(&text, confidence))
                })
                .await
                .map_err(|e| OcrError::Engine(format!("OCR task panicked: {e}")))?
            }
            OcrBackend::Command { runner } => runner.recognize(image, config).await,
            OcrBackend::Unavailable { reason } => Err(OcrError::EngineUnavailable(reason.clone())),
        }
    }
}

#[async_trait]
impl TextRecognizer for OcrProvider {
    fn name(&self) -> &str {
        match &self.backend {
            OcrBackend::Library { .. } => "tesseract",
            OcrBackend::Command { runner } => runner.name(),
            OcrBackend::Unavailable { .. } => "unavailable",
        }
    }

    async fn recognize(
        &self,
        image: &RgbaImage,
        config: &RecognitionConfig,
    ) -> Result<Vec<RecognizedLine>> {
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);

        match tokio::time::timeout(timeout_duration, self.recognize_internal(image, config)).await {
            Ok(inner_result) => inner_result,
            Err(_) => Err(OcrError::Engine(format!(
                "OCR operation timed out after {} seconds",
                self.config.timeout_secs
            ))),
        }
    }
}

/// Plain text output has no per-line scores, so every line shares the page confidence.
fn lines_from_text(text: &str, confidence: f32) -> Vec<RecognizedLine> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| RecognizedLine::new(line, confidence))
        .collect()
}
