//! Multi-region recognition and output assembly.

use std::io::Write;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, warn};

use crate::args::ScanArgs;
use crate::config::Config;
use crate::error::{OcrError, Result};
use crate::ocr::{crop_region, preprocess_file, RecognitionConfig, RecognizedLine, TextRecognizer};
use crate::region::{resolve_regions, PixelRect, Rect, RegionSpec};
use crate::vocabulary::Vocabulary;

/// Recognize each region of `image` in order, one string per region.
///
/// A rectangle outside the image aborts the whole scan. An engine failure
/// only empties the text of the region it happened in.
pub async fn recognize_regions<R>(
    engine: &R,
    image: &RgbaImage,
    regions: &[Rect],
    config: &RecognitionConfig,
) -> Result<Vec<String>>
where
    R: TextRecognizer + ?Sized,
{
    let mut texts = Vec::with_capacity(regions.len());

    for (idx, rect) in regions.iter().enumerate() {
        let pixels = PixelRect::within(rect, image.width(), image.height())?;
        let crop = crop_region(image, &pixels);

        let text = match engine.recognize(&crop, config).await {
            Ok(lines) => {
                debug!(region = idx + 1, lines = lines.len(), engine = engine.name(), "Region recognized");
                join_lines(&lines)
            }
            Err(e) => {
                warn!(region = idx + 1, error = %e, "Recognition failed, region left empty");
                String::new()
            }
        };
        texts.push(text);
    }

    Ok(texts)
}

fn join_lines(lines: &[RecognizedLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join region texts and terminate with a newline.
///
/// More than one region always uses a space; otherwise the separator chosen
/// while parsing applies.
pub fn assemble_output(texts: &[String], parsed_separator: &str) -> String {
    let separator = if texts.len() > 1 { " " } else { parsed_separator };
    let mut output = texts.join(separator);
    output.push('\n');
    output
}

/// Runs one scan end to end and writes the recognized text to `out`.
pub async fn run_scan<R, W>(args: &ScanArgs, config: &Config, engine: &R, out: &mut W) -> Result<()>
where
    R: TextRecognizer + ?Sized,
    W: Write,
{
    let path = args
        .image
        .as_deref()
        .ok_or_else(|| OcrError::Usage("no image path given".to_string()))?;

    let vocabulary = match &args.words {
        Some(words) => {
            let vocabulary = Vocabulary::load(words);
            if args.debug {
                writeln!(out, "{vocabulary}")?;
            }
            vocabulary
        }
        None => Vocabulary::default(),
    };

    let image = preprocess_file(path, &config.scan)?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Image preprocessed");

    if let Some(dump) = &args.dump {
        image.save_with_format(dump, ImageFormat::Png)?;
        debug!(path = %dump.display(), "Preprocessed image written");
    }

    let bounds = Rect::from_extent(image.width(), image.height());
    let spec = RegionSpec::from_args(args, config.scan.navbar_height);
    let regions = resolve_regions(&bounds, &spec)?;
    if args.debug {
        for rect in &regions {
            writeln!(out, "={rect}")?;
        }
    }

    let recognition = RecognitionConfig::new(&config.ocr, args, vocabulary);
    let texts = recognize_regions(engine, &image, &regions, &recognition).await?;

    out.write_all(assemble_output(&texts, args.separator()).as_bytes())?;
    out.flush()?;
    Ok(())
}
