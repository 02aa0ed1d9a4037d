use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

use super::recognizer::{RecognitionConfig, RecognizedLine, TextRecognizer};
use crate::error::{OcrError, Result};
use crate::vocabulary::Vocabulary;

/// Runs the `tesseract` executable once per image and reads its TSV output.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    executable: PathBuf,
    languages: String,
}

impl TesseractCli {
    pub fn new(executable: impl Into<PathBuf>, languages: &str) -> Self {
        Self {
            executable: executable.into(),
            languages: languages.to_string(),
        }
    }

    /// Returns the first line of `tesseract --version`.
    pub fn probe(&self) -> std::result::Result<String, String> {
        let output = std::process::Command::new(&self.executable)
            .arg("--version")
            .output()
            .map_err(|e| format!("cannot run {}: {e}", self.executable.display()))?;

        if !output.status.success() {
            return Err(format!(
                "{} --version exited with {}",
                self.executable.display(),
                output.status
            ));
        }

        // Older releases print the version banner on stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn command_args(
        &self,
        input: &Path,
        user_words: Option<&Path>,
        config: &RecognitionConfig,
        image_height: u32,
    ) -> Vec<String> {
        let mut args = vec![
            input.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.languages.clone(),
            "--oem".to_string(),
            config.revision.to_string(),
            "--psm".to_string(),
            config.page_segmentation_mode().to_string(),
        ];

        if let Some(words) = user_words {
            args.push("--user-words".to_string());
            args.push(words.display().to_string());
        }

        if !config.language_correction {
            args.extend(["-c", "load_system_dawg=0", "-c", "load_freq_dawg=0"].map(String::from));
        }

        if let Some(px) = config.min_text_height_px(image_height) {
            args.push("-c".to_string());
            args.push(format!("textord_min_xheight={px}"));
        }

        // Config file selecting TSV output; must come last.
        args.push("tsv".to_string());
        args
    }
}

fn write_user_words(vocabulary: &Vocabulary) -> Result<Option<NamedTempFile>> {
    if vocabulary.is_empty() {
        return Ok(None);
    }

    let mut file = NamedTempFile::with_suffix(".user-words")?;
    for word in vocabulary.words() {
        writeln!(file, "{word}")?;
    }
    file.flush()?;
    Ok(Some(file))
}

#[async_trait]
impl TextRecognizer for TesseractCli {
    fn name(&self) -> &str {
        "tesseract-cli"
    }

    async fn recognize(
        &self,
        image: &RgbaImage,
        config: &RecognitionConfig,
    ) -> Result<Vec<RecognizedLine>> {
        let input = NamedTempFile::with_suffix(".png")?;
        image.save_with_format(input.path(), ImageFormat::Png)?;

        let user_words = write_user_words(&config.vocabulary)?;
        let args = self.command_args(
            input.path(),
            user_words.as_ref().map(|f| f.path()),
            config,
            image.height(),
        );
        debug!(executable = %self.executable.display(), ?args, "Running tesseract");

        let output = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                OcrError::Engine(format!("failed to run {}: {e}", self.executable.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Groups TSV word rows into lines keyed by (page, block, paragraph, line).
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Only word rows (level 5) with a
/// non-negative confidence and non-empty text contribute.
pub fn parse_tsv(tsv: &str) -> Vec<RecognizedLine> {
    struct Pending {
        key: [i32; 4],
        words: Vec<String>,
        conf_sum: f32,
    }

    let mut lines: Vec<RecognizedLine> = Vec::new();
    let mut current: Option<Pending> = None;

    let finish = |pending: Pending, lines: &mut Vec<RecognizedLine>| {
        let confidence = pending.conf_sum / pending.words.len() as f32 / 100.0;
        lines.push(RecognizedLine::new(pending.words.join(" "), confidence));
    };

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = fields[0].parse().unwrap_or(-1);
        let conf: f32 = fields[10].trim().parse().unwrap_or(-1.0);
        let text = fields[11].trim();
        if level != 5 || conf < 0.0 || text.is_empty() {
            continue;
        }

        let key = [1, 2, 3, 4].map(|i| fields[i].parse().unwrap_or(-1));

        match current.as_mut() {
            Some(pending) if pending.key == key => {
                pending.words.push(text.to_string());
                pending.conf_sum += conf;
            }
            _ => {
                if let Some(done) = current.take() {
                    finish(done, &mut lines);
                }
                current = Some(Pending {
                    key,
                    words: vec![text.to_string()],
                    conf_sum: conf,
                });
            }
        }
    }

    if let Some(done) = current.take() {
        finish(done, &mut lines);
    }

    lines
}
