//! Corner decals ("tattoos") stamped onto bezel images

use crate::GeneratorError;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use mamegen_config::options::{TATTOO, TATTOO_CORNER, TATTOO_FILE};
use mamegen_config::{MamePaths, SystemConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Decal width relative to the bezel width (240 px on a 1920 px bezel)
const DECAL_WIDTH_RATIO: f64 = 240.0 / 1920.0;

/// Vertical gap between the decal and the bezel edge
const VERTICAL_MARGIN: i64 = 20;

/// Bezel corner the decal is placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Corner {
    #[default]
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Corner {
    /// Parse a compass corner (`NE`, `se`, ...); anything else is north-west
    pub fn from_option(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "NE" => Corner::NorthEast,
            "SE" => Corner::SouthEast,
            "SW" => Corner::SouthWest,
            _ => Corner::NorthWest,
        }
    }

    /// Top-left position of a `decal` sized decal on a `canvas` sized bezel
    fn origin(&self, canvas: (u32, u32), decal: (u32, u32)) -> (i64, i64) {
        let (w, h) = (i64::from(canvas.0), i64::from(canvas.1));
        let (dw, dh) = (i64::from(decal.0), i64::from(decal.1));

        match self {
            Corner::NorthWest => (0, VERTICAL_MARGIN),
            Corner::NorthEast => (w - dw, VERTICAL_MARGIN),
            Corner::SouthEast => (w - dw, h - dh - VERTICAL_MARGIN),
            Corner::SouthWest => (0, h - dh - VERTICAL_MARGIN),
        }
    }
}

/// Decal image for the configured tattoo, or `None` when tattoos are off
pub fn decal_path(paths: &MamePaths, config: &SystemConfig) -> Option<PathBuf> {
    let kind = config.declared(TATTOO)?;

    let path = match kind {
        "system" => {
            let system = paths.system_overlay(&config.name);
            if system.exists() {
                system
            } else {
                paths.generic_overlay()
            }
        }
        "custom" => match config.declared(TATTOO_FILE).map(PathBuf::from) {
            Some(custom) if custom.exists() => custom,
            _ => paths.generic_overlay(),
        },
        _ => paths.generic_overlay(),
    };

    Some(path)
}

pub fn load_decal(path: &Path) -> Result<RgbaImage, GeneratorError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| GeneratorError::DecalLoad(format!("{}: {}", path.display(), e)))
}

/// Stamp `decal` onto `bezel` and flatten the result onto an opaque black
/// canvas the size of the bezel.
///
/// The decal is scaled to a fixed share of the bezel width, keeping its
/// aspect ratio, and blended using its own alpha as the mask.
pub fn composite(bezel: &RgbaImage, decal: &RgbaImage, corner: Corner) -> RgbaImage {
    let (width, height) = bezel.dimensions();
    let mut stamped = bezel.clone();

    let decal_width = (DECAL_WIDTH_RATIO * f64::from(width)) as u32;
    let decal_height = if decal.width() == 0 {
        0
    } else {
        (f64::from(decal.height()) * (f64::from(decal_width) / f64::from(decal.width()))) as u32
    };

    if decal_width > 0 && decal_height > 0 {
        let scaled = imageops::resize(decal, decal_width, decal_height, FilterType::Lanczos3);
        let (x0, y0) = corner.origin((width, height), (decal_width, decal_height));
        blend_masked(&mut stamped, &scaled, x0, y0);
    }

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    imageops::replace(&mut canvas, &stamped, 0, 0);
    canvas
}

/// Paste `top` at (`x0`, `y0`), mixing every channel by `top`'s alpha
fn blend_masked(bottom: &mut RgbaImage, top: &RgbaImage, x0: i64, y0: i64) {
    let (bw, bh) = (i64::from(bottom.width()), i64::from(bottom.height()));

    for (tx, ty, src) in top.enumerate_pixels() {
        let x = x0 + i64::from(tx);
        let y = y0 + i64::from(ty);
        if x < 0 || y < 0 || x >= bw || y >= bh {
            continue;
        }

        let mask = u32::from(src[3]);
        let dst = bottom.get_pixel_mut(x as u32, y as u32);
        for c in 0..4 {
            let mixed = (u32::from(src[c]) * mask + u32::from(dst[c]) * (255 - mask) + 127) / 255;
            dst[c] = mixed as u8;
        }
    }
}

/// Replace `image_name` in the scratch directory with a tattooed copy.
///
/// A decal that cannot be loaded is logged and skipped.
pub fn apply_tattoo(
    paths: &MamePaths,
    config: &SystemConfig,
    scratch_dir: &Path,
    image_name: &str,
) -> Result<(), GeneratorError> {
    let Some(decal_file) = decal_path(paths, config) else {
        return Ok(());
    };

    let decal = match load_decal(&decal_file) {
        Ok(decal) => decal,
        Err(e) => {
            tracing::error!("Skipping bezel tattoo: {}", e);
            return Ok(());
        }
    };

    let target = scratch_dir.join(image_name);
    let bezel = image::open(&target)?.to_rgba8();
    let corner = Corner::from_option(config.text(TATTOO_CORNER).value());
    let tattooed = composite(&bezel, &decal, corner);

    // The target is a link to the shared bezel image; never write through it
    fs::remove_file(&target)?;
    tattooed.save_with_format(&target, ImageFormat::Png)?;

    tracing::debug!(
        "Applied tattoo {} to {} ({:?})",
        decal_file.display(),
        target.display(),
        corner
    );
    Ok(())
}
