use std::env;

use crate::error::{OcrError, Result};
use crate::ocr::Accuracy;

/// Height of the platform chrome band excluded from the bottom of every region.
pub const DEFAULT_NAVBAR_HEIGHT: f64 = 48.0;

pub const DEFAULT_GAMMA_POWER: f32 = 0.5;

/// Tesseract OCR engine mode 1 (LSTM only).
pub const DEFAULT_REVISION: u32 = 1;

pub(crate) fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scan: ScanConfig,
    pub ocr: OcrConfig,
}

/// Geometry and preprocessing constants shared by every region of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub navbar_height: f64,
    pub gamma_power: f32,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub model: String,
    pub languages: String,
    pub accuracy: Accuracy,
    pub language_correction: bool,
    pub revision: u32,
    pub timeout_secs: u64,
    pub tesseract_path: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            navbar_height: DEFAULT_NAVBAR_HEIGHT,
            gamma_power: DEFAULT_GAMMA_POWER,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: "local/tesseract-cli".to_string(),
            languages: "eng".to_string(),
            accuracy: Accuracy::Accurate,
            language_correction: true,
            revision: DEFAULT_REVISION,
            timeout_secs: 60,
            tesseract_path: "tesseract".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig {
                navbar_height: parse_env_or("MYOCR_NAVBAR_HEIGHT", DEFAULT_NAVBAR_HEIGHT),
                gamma_power: parse_env_or("MYOCR_GAMMA_POWER", DEFAULT_GAMMA_POWER),
            },
            ocr: OcrConfig {
                model: env::var("OCR_MODEL").unwrap_or_else(|_| "local/tesseract-cli".to_string()),
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                accuracy: parse_env_or("OCR_ACCURACY", Accuracy::Accurate),
                language_correction: parse_env_or("OCR_LANGUAGE_CORRECTION", true),
                revision: parse_env_or("OCR_REVISION", DEFAULT_REVISION),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
                tesseract_path: env::var("TESSERACT_PATH")
                    .unwrap_or_else(|_| "tesseract".to_string()),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Rejects values that would make every scan meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.scan.navbar_height.is_nan() || self.scan.navbar_height < 0.0 {
            return Err(OcrError::Config(format!(
                "navbar height must be non-negative, got {}",
                self.scan.navbar_height
            )));
        }
        if !self.scan.gamma_power.is_finite() || self.scan.gamma_power <= 0.0 {
            return Err(OcrError::Config(format!(
                "gamma power must be a positive number, got {}",
                self.scan.gamma_power
            )));
        }
        if self.ocr.timeout_secs == 0 {
            return Err(OcrError::Config("OCR timeout must be at least 1 second".to_string()));
        }
        Ok(())
    }
}

/// Split a model name like `local/tesseract-cli` into (provider, model).
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    match model.split_once('/') {
        Some((prefix, rest)) => (prefix, rest),
        None => ("local", model),
    }
}
