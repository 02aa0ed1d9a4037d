//! Folding of the `-flag:value` command line into an immutable [`ScanArgs`].
//!
//! Flags are matched by prefix and may appear in any order. The value of a
//! flag is everything after its first `:`. Any argument that is not a known
//! flag names the image to scan. Repeated flags are last-wins.

use std::path::PathBuf;

use crate::error::{OcrError, Result};
use crate::region::EdgeInset;

pub const USAGE: &str = "image [-min:<minimum-text-height>] [-cropx:x] [-cropy:y] [-footer:f] \
[-insets:<edge-inset-list>] [-words:<path>] [-fast] [-dump:<path>] [-d] [-version]";

pub fn usage(program: &str) -> String {
    format!("usage: {program} {USAGE}")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanArgs {
    pub image: Option<PathBuf>,
    /// Relative to the scanned region's height; 0 leaves the engine default.
    pub min_text_height: f32,
    pub crop_x: f64,
    pub crop_y: f64,
    pub footer: f64,
    pub insets: Option<Vec<EdgeInset>>,
    pub words: Option<PathBuf>,
    pub dump: Option<PathBuf>,
    pub fast: bool,
    pub debug: bool,
    pub show_version: bool,
}

impl ScanArgs {
    /// Region separator chosen while parsing. `-insets` always selects a space.
    pub fn separator(&self) -> &'static str {
        if self.insets.is_some() {
            " "
        } else {
            "\n"
        }
    }

    pub fn has_simple_crop(&self) -> bool {
        self.crop_x > 0.0 || self.crop_y > 0.0 || self.footer > 0.0
    }
}

pub fn parse_args<I, S>(args: I) -> Result<ScanArgs>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .try_fold(ScanArgs::default(), |acc, arg| apply_arg(acc, arg.as_ref()))
}

fn apply_arg(mut acc: ScanArgs, arg: &str) -> Result<ScanArgs> {
    match arg {
        "-d" => acc.debug = true,
        "-fast" => acc.fast = true,
        "-version" => acc.show_version = true,
        _ if arg.starts_with("-insets") => acc.insets = Some(parse_insets(flag_value(arg))?),
        _ if arg.starts_with("-cropy") => acc.crop_y = parse_distance("-cropy", flag_value(arg))?,
        _ if arg.starts_with("-cropx") => acc.crop_x = parse_distance("-cropx", flag_value(arg))?,
        _ if arg.starts_with("-footer") => {
            acc.footer = parse_distance("-footer", flag_value(arg))?
        }
        _ if arg.starts_with("-min") => acc.min_text_height = parse_min_height(flag_value(arg))?,
        _ if arg.starts_with("-words") => acc.words = Some(PathBuf::from(flag_value(arg))),
        _ if arg.starts_with("-dump") => acc.dump = Some(PathBuf::from(flag_value(arg))),
        _ => acc.image = Some(PathBuf::from(arg)),
    }
    Ok(acc)
}

fn flag_value(arg: &str) -> &str {
    arg.split_once(':').map(|(_, value)| value).unwrap_or("")
}

/// Parse `top,left,bottom,right[:top,left,bottom,right...]` into one inset per region.
pub fn parse_insets(spec: &str) -> Result<Vec<EdgeInset>> {
    spec.split(':').map(parse_inset_token).collect()
}

fn parse_inset_token(token: &str) -> Result<EdgeInset> {
    let fields = token
        .split(',')
        .map(|field| parse_distance("-insets", field))
        .collect::<Result<Vec<f64>>>()?;

    match fields.as_slice() {
        &[top, left, bottom, right] => Ok(EdgeInset {
            top,
            left,
            bottom,
            right,
        }),
        _ => Err(OcrError::Format(format!(
            "-insets region '{token}' must have exactly four fields top,left,bottom,right, found {}",
            fields.len()
        ))),
    }
}

fn parse_distance(flag: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| OcrError::Format(format!("{flag}: '{raw}' is not a number")))?;

    if !value.is_finite() || value < 0.0 {
        return Err(OcrError::Format(format!(
            "{flag}: '{raw}' must be a non-negative pixel distance"
        )));
    }
    Ok(value)
}

fn parse_min_height(raw: &str) -> Result<f32> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| OcrError::Format(format!("-min: '{raw}' is not a number")))?;

    if !(0.0..=1.0).contains(&value) {
        return Err(OcrError::Format(format!(
            "-min: '{raw}' must be between 0 and 1 (fraction of the image height)"
        )));
    }
    Ok(value)
}
