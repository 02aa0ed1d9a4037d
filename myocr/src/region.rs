use std::fmt;

use crate::args::ScanArgs;
use crate::error::{OcrError, Result};

/// Distances in pixels measured inward from each edge of the image.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeInset {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

/// Ordered insets to scan. Region texts are emitted in this order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSpec {
    insets: Vec<EdgeInset>,
}

impl RegionSpec {
    /// Builds the effective insets for a run.
    ///
    /// The navbar band is added to the bottom of every region. `-insets`
    /// regions come first, followed by the single `-cropx/-cropy/-footer`
    /// region when any of those is set. Without either, one region skipping
    /// the navbar band at the top and at the bottom is scanned.
    pub fn from_args(args: &ScanArgs, navbar_height: f64) -> Self {
        let mut insets: Vec<EdgeInset> = args
            .insets
            .iter()
            .flatten()
            .map(|inset| EdgeInset {
                bottom: inset.bottom + navbar_height,
                ..*inset
            })
            .collect();

        if args.has_simple_crop() {
            insets.push(EdgeInset {
                top: args.crop_y,
                left: args.crop_x,
                bottom: navbar_height + args.footer,
                right: 0.0,
            });
        } else if insets.is_empty() {
            insets.push(EdgeInset {
                top: navbar_height,
                left: 0.0,
                bottom: navbar_height,
                right: 0.0,
            });
        }

        Self { insets }
    }

    pub fn insets(&self) -> &[EdgeInset] {
        &self.insets
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Bounding rectangle of a decoded image; its origin is always (0, 0).
    pub fn from_extent(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }

    pub fn inset_by(&self, inset: &EdgeInset) -> Rect {
        Rect {
            x: self.x + inset.left,
            y: self.y + inset.top,
            width: self.width - (inset.left + inset.right),
            height: self.height - (inset.top + inset.bottom),
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x: {}, y: {}, width: {}, height: {})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// One rectangle per inset, in region order.
pub fn resolve_regions(bounds: &Rect, spec: &RegionSpec) -> Result<Vec<Rect>> {
    spec.insets()
        .iter()
        .enumerate()
        .map(|(idx, inset)| {
            let rect = bounds.inset_by(inset);
            if rect.width <= 0.0 || rect.height <= 0.0 {
                return Err(OcrError::Crop(format!(
                    "region {} resolves to an empty rectangle {rect}",
                    idx + 1
                )));
            }
            Ok(rect)
        })
        .collect()
}

/// Integral pixel rectangle fully contained in an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Expands `rect` outward to whole pixels and checks it against the image extent.
    pub fn within(rect: &Rect, image_width: u32, image_height: u32) -> Result<Self> {
        let x0 = rect.x.floor();
        let y0 = rect.y.floor();
        let x1 = (rect.x + rect.width).ceil();
        let y1 = (rect.y + rect.height).ceil();

        let inside = x0 >= 0.0
            && y0 >= 0.0
            && x1 <= image_width as f64
            && y1 <= image_height as f64
            && x1 > x0
            && y1 > y0;

        if !inside {
            return Err(OcrError::Crop(format!(
                "rectangle {rect} lies outside the {image_width}x{image_height} image"
            )));
        }

        Ok(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}
