//! Bezel artwork for the emulator's layout engine
//!
//! Every launch rebuilds a scratch artwork entry named after the machine
//! (or the ROM for arcade games). It ends up as one of:
//!
//! - a link to a prepackaged artwork archive,
//! - links to a prepackaged layout file and its image,
//! - a synthesized `default.lay` framing the screen inside the bezel image.
//!
//! The last two may have a corner tattoo stamped on the image.

use crate::geometry::MachineProbe;
use crate::{GeneratorError, tattoo};
use mamegen_config::{MamePaths, SystemConfig};
use std::fs;
use std::io::{ErrorKind, Write};
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

const LAYOUT_FILE: &str = "default.lay";
const SYNTHESIZED_IMAGE: &str = "default.png";

/// Bezel files found for a game by the bezel lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BezelSpec {
    /// Bezel image
    pub image: PathBuf,
    /// Prepackaged layout file referencing `image`
    pub layout: Option<PathBuf>,
    /// Prepackaged artwork archive, used as is
    pub archive: Option<PathBuf>,
    /// Side file with the screen bounds inside the image
    pub info: Option<PathBuf>,
}

/// Finds the bezel files for a game in a bezel set
pub trait BezelLookup {
    fn lookup(
        &self,
        rom: &Path,
        bezel_set: &str,
        system: &str,
    ) -> Result<Option<BezelSpec>, GeneratorError>;
}

/// Screen placement inside a bezel image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezelBounds {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub image_width: i64,
    pub image_height: i64,
    pub opacity: f64,
}

impl BezelBounds {
    /// Screen centered in the image, full height, 4:3 (3:4 when vertical)
    pub fn centered(image_width: u32, image_height: u32, vertical: bool) -> Self {
        let (image_width, image_height) = (i64::from(image_width), i64::from(image_height));
        let aspect = if vertical { 3.0 / 4.0 } else { 4.0 / 3.0 };
        let width = (image_height as f64 * aspect) as i64;

        Self {
            x: (image_width - width) / 2,
            y: 0,
            width,
            height: image_height,
            image_width,
            image_height,
            opacity: 1.0,
        }
    }

    /// Layout document binding the screen and the full bezel image
    pub fn layout_descriptor(&self) -> String {
        format!(
            concat!(
                "<mamelayout version=\"2\">\n",
                "<element name=\"bezel\"><image file=\"{image}\" /></element>\n",
                "<view name=\"bezel\">\n",
                "<screen index=\"0\"><bounds x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" /></screen>\n",
                "<element ref=\"bezel\"><bounds x=\"0\" y=\"0\" width=\"{iw}\" height=\"{ih}\" alpha=\"{alpha:?}\" /></element>\n",
                "</view>\n",
                "</mamelayout>\n",
            ),
            image = SYNTHESIZED_IMAGE,
            x = self.x,
            y = self.y,
            w = self.width,
            h = self.height,
            iw = self.image_width,
            ih = self.image_height,
            alpha = self.opacity,
        )
    }
}

/// Values read from a bezel info file
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct BezelInfo {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub top: i64,
    pub left: i64,
    pub bottom: i64,
    pub right: i64,
    pub opacity: Option<f64>,
}

impl BezelInfo {
    /// Bounds for an image of the given real size
    fn bounds(&self, image_width: u32, image_height: u32) -> Result<BezelBounds, String> {
        let image_width = self.width.unwrap_or(i64::from(image_width));
        let image_height = self.height.unwrap_or(i64::from(image_height));

        let width = image_width
            .checked_sub(self.left)
            .and_then(|w| w.checked_sub(self.right))
            .ok_or("left/right margins overflow the screen width")?;
        let height = image_height
            .checked_sub(self.top)
            .and_then(|h| h.checked_sub(self.bottom))
            .ok_or("top/bottom margins overflow the screen height")?;

        Ok(BezelBounds {
            x: self.left,
            y: self.top,
            width,
            height,
            image_width,
            image_height,
            opacity: self.opacity.unwrap_or(1.0),
        })
    }
}

/// Parse a bezel info file: loosely JSON-shaped `"key": value,` lines.
/// Lines of seven characters or fewer (braces, blanks) are ignored, as are
/// unknown keys.
pub(crate) fn parse_info_file(contents: &str) -> Result<BezelInfo, String> {
    let mut info = BezelInfo::default();

    for line in contents.split_inclusive('\n') {
        if line.chars().count() <= 7 {
            continue;
        }

        let cleaned = line.replace('"', "");
        let cleaned = cleaned
            .trim_end_matches([',', '\n'])
            .trim_start();
        let mut parts = cleaned.split(':');
        let key = parts.next().unwrap_or("").to_lowercase();
        let value = parts.next().unwrap_or("").trim();

        let int = || {
            value
                .parse::<i64>()
                .map_err(|_| format!("invalid {} value {:?}", key, value))
        };

        match key.as_str() {
            "width" => info.width = Some(int()?),
            "height" => info.height = Some(int()?),
            "top" => info.top = int()?,
            "left" => info.left = int()?,
            "bottom" => info.bottom = int()?,
            "right" => info.right = int()?,
            "opacity" => {
                info.opacity = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("invalid opacity value {:?}", value))?,
                )
            }
            _ => {}
        }
    }

    Ok(info)
}

/// What the composer left in the artwork directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    /// Nothing, after clearing the previous entry
    Purged,
    /// Link to a prepackaged archive
    Archive(PathBuf),
    /// Links to a prepackaged layout and image
    Layout,
    /// Generated layout around the bezel image
    Synthesized,
}

/// Builds the per-launch bezel artwork entry
pub struct BezelComposer<'a> {
    paths: &'a MamePaths,
    lookup: &'a dyn BezelLookup,
    probe: &'a dyn MachineProbe,
}

impl<'a> BezelComposer<'a> {
    pub fn new(
        paths: &'a MamePaths,
        lookup: &'a dyn BezelLookup,
        probe: &'a dyn MachineProbe,
    ) -> Self {
        Self {
            paths,
            lookup,
            probe,
        }
    }

    /// Scratch directory for a launch: the machine name, or the ROM stem
    /// when there is no machine
    pub fn scratch_dir(&self, rom: &Path, machine: &str) -> PathBuf {
        self.paths.artwork_dir.join(scratch_name(rom, machine))
    }

    fn archive_link(&self, rom: &Path, machine: &str) -> PathBuf {
        self.paths
            .artwork_dir
            .join(format!("{}.zip", scratch_name(rom, machine)))
    }

    /// Rebuild the artwork entry for a launch. `None` only clears it.
    pub fn write(
        &self,
        bezel_set: Option<&str>,
        config: &SystemConfig,
        rom: &Path,
        machine: &str,
    ) -> Result<OverlayOutcome, GeneratorError> {
        let scratch = self.scratch_dir(rom, machine);
        let archive_link = self.archive_link(rom, machine);
        purge(&scratch)?;
        purge(&archive_link)?;

        let Some(bezel_set) = bezel_set else {
            tracing::debug!("No bezel, cleared {}", scratch.display());
            return Ok(OverlayOutcome::Purged);
        };

        let spec = match self.lookup.lookup(rom, bezel_set, &config.name) {
            Ok(Some(spec)) => spec,
            Ok(None) => {
                tracing::info!("No bezel in set {} for {}", bezel_set, rom.display());
                return Ok(OverlayOutcome::Purged);
            }
            Err(e) => {
                tracing::warn!("Bezel lookup failed, continuing without bezel: {}", e);
                return Ok(OverlayOutcome::Purged);
            }
        };

        if let Some(archive) = spec.archive.as_ref()
            && archive.exists()
        {
            fs::create_dir_all(&self.paths.artwork_dir)?;
            symlink(archive, &archive_link)?;
            tracing::info!("Using bezel archive {}", archive.display());
            return Ok(OverlayOutcome::Archive(archive.clone()));
        }

        fs::create_dir_all(&scratch)?;

        let (image_name, outcome) = match spec.layout.as_ref().filter(|l| l.exists()) {
            Some(layout) => {
                let image_name = spec
                    .image
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| {
                        GeneratorError::BezelLookup(format!(
                            "bezel image {} has no file name",
                            spec.image.display()
                        ))
                    })?;

                symlink(layout, scratch.join(LAYOUT_FILE))?;
                symlink(&spec.image, scratch.join(&image_name))?;
                tracing::info!("Using bezel layout {}", layout.display());
                (image_name, OverlayOutcome::Layout)
            }
            None => {
                symlink(&spec.image, scratch.join(SYNTHESIZED_IMAGE))?;
                let bounds = self.bounds(&spec, rom, machine)?;
                write_file(&scratch.join(LAYOUT_FILE), &bounds.layout_descriptor())?;
                tracing::info!(
                    "Synthesized bezel layout for {}: screen {}x{} at {},{}",
                    scratch.display(),
                    bounds.width,
                    bounds.height,
                    bounds.x,
                    bounds.y
                );
                (SYNTHESIZED_IMAGE.to_string(), OverlayOutcome::Synthesized)
            }
        };

        tattoo::apply_tattoo(self.paths, config, &scratch, &image_name)?;
        Ok(outcome)
    }

    fn bounds(
        &self,
        spec: &BezelSpec,
        rom: &Path,
        machine: &str,
    ) -> Result<BezelBounds, GeneratorError> {
        let (image_width, image_height) = image::image_dimensions(&spec.image)?;

        if let Some(info_path) = spec.info.as_ref().filter(|p| p.exists()) {
            let contents = fs::read_to_string(info_path)?;
            return parse_info_file(&contents)
                .and_then(|info| info.bounds(image_width, image_height))
                .map_err(|e| {
                    GeneratorError::BezelLookup(format!("{}: {}", info_path.display(), e))
                });
        }

        let target = scratch_name(rom, machine);
        let vertical = match self.probe.probe(&target) {
            Ok(geometry) => geometry.is_vertical(),
            Err(e) => {
                tracing::warn!("Assuming a horizontal screen for {}: {}", target, e);
                false
            }
        };

        Ok(BezelBounds::centered(image_width, image_height, vertical))
    }
}

fn scratch_name(rom: &Path, machine: &str) -> String {
    if machine.is_empty() {
        rom.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        machine.to_string()
    }
}

/// Remove a file, link or directory tree if present
fn purge(path: &Path) -> Result<(), GeneratorError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path)?,
        Ok(_) => fs::remove_file(path)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), GeneratorError> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeometryInfo;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    struct NoProbe;

    impl MachineProbe for NoProbe {
        fn probe(&self, _machine: &str) -> Result<GeometryInfo, GeneratorError> {
            Err(GeneratorError::Probe("not available".to_string()))
        }
    }

    struct FixedLookup(Option<BezelSpec>);

    impl BezelLookup for FixedLookup {
        fn lookup(
            &self,
            _rom: &Path,
            _bezel_set: &str,
            _system: &str,
        ) -> Result<Option<BezelSpec>, GeneratorError> {
            Ok(self.0.clone())
        }
    }

    struct FailingLookup;

    impl BezelLookup for FailingLookup {
        fn lookup(
            &self,
            _rom: &Path,
            _bezel_set: &str,
            _system: &str,
        ) -> Result<Option<BezelSpec>, GeneratorError> {
            Err(GeneratorError::BezelLookup("no decorations".to_string()))
        }
    }

    fn bezel_image(dir: &Path, width: u32, height: u32) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join("bezel.png");
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_layout_descriptor_text() {
        let bounds = BezelBounds::centered(1920, 1080, false);
        assert_eq!(
            bounds.layout_descriptor(),
            "<mamelayout version=\"2\">\n\
             <element name=\"bezel\"><image file=\"default.png\" /></element>\n\
             <view name=\"bezel\">\n\
             <screen index=\"0\"><bounds x=\"240\" y=\"0\" width=\"1440\" height=\"1080\" /></screen>\n\
             <element ref=\"bezel\"><bounds x=\"0\" y=\"0\" width=\"1920\" height=\"1080\" alpha=\"1.0\" /></element>\n\
             </view>\n\
             </mamelayout>\n"
        );
    }

    #[test]
    fn test_vertical_bounds() {
        let bounds = BezelBounds::centered(1920, 1080, true);
        assert_eq!(bounds.width, 810);
        assert_eq!(bounds.x, 555);
    }

    #[test]
    fn test_parse_info_file() {
        let info = parse_info_file(
            "{\n  \"width\":1920,\n  \"height\":1080,\n  \"top\":0,\n  \"left\":320,\n  \"bottom\":0,\n  \"right\":320,\n  \"opacity\":0.7\n}\n",
        )
        .unwrap();

        let bounds = info.bounds(1, 1).unwrap();
        assert_eq!((bounds.x, bounds.y), (320, 0));
        assert_eq!((bounds.width, bounds.height), (1280, 1080));
        assert_eq!(bounds.opacity, 0.7);
        assert!(bounds.layout_descriptor().contains("alpha=\"0.7\""));
    }

    #[test]
    fn test_info_file_without_size_uses_image() {
        let info = parse_info_file("\"left\":100,\n\"right\":100,\n").unwrap();
        let bounds = info.bounds(800, 600).unwrap();
        assert_eq!((bounds.width, bounds.height), (600, 600));
        assert_eq!(bounds.opacity, 1.0);
    }

    #[test]
    fn test_bad_info_value() {
        assert!(parse_info_file("\"width\":wide,\n").is_err());
    }

    #[test]
    fn test_overflowing_margins_are_an_error() {
        let info = parse_info_file("\"left\":-9223372036854775807,\n\"right\":100,\n").unwrap();
        assert!(info.bounds(1920, 1080).is_err());

        let info = BezelInfo {
            top: i64::MIN,
            ..BezelInfo::default()
        };
        assert!(info.bounds(1920, 1080).is_err());
    }

    #[test]
    fn test_none_purges_scratch() {
        let temp = TempDir::new().unwrap();
        let paths = MamePaths::rooted_at(temp.path());
        let composer = BezelComposer::new(&paths, &FailingLookup, &NoProbe);
        let scratch = composer.scratch_dir(Path::new("/roms/mame/sf2.zip"), "");
        fs::create_dir_all(&scratch).unwrap();
        fs::write(scratch.join("default.lay"), "old").unwrap();

        let outcome = composer
            .write(None, &SystemConfig::new("mame"), Path::new("/roms/mame/sf2.zip"), "")
            .unwrap();

        assert_eq!(outcome, OverlayOutcome::Purged);
        assert!(!scratch.exists());
    }

    #[test]
    fn test_lookup_failure_is_silent() {
        let temp = TempDir::new().unwrap();
        let paths = MamePaths::rooted_at(temp.path());
        let composer = BezelComposer::new(&paths, &FailingLookup, &NoProbe);

        let outcome = composer
            .write(Some("thebezelproject"), &SystemConfig::new("mame"), Path::new("sf2.zip"), "")
            .unwrap();
        assert_eq!(outcome, OverlayOutcome::Purged);
    }

    #[test]
    fn test_archive_is_linked() {
        let temp = TempDir::new().unwrap();
        let paths = MamePaths::rooted_at(temp.path());
        let image = bezel_image(&temp.path().join("decorations"), 16, 9);
        let archive = temp.path().join("decorations/sf2.zip");
        fs::write(&archive, b"PK").unwrap();

        let lookup = FixedLookup(Some(BezelSpec {
            image,
            layout: None,
            archive: Some(archive.clone()),
            info: None,
        }));
        let composer = BezelComposer::new(&paths, &lookup, &NoProbe);
        let outcome = composer
            .write(Some("default"), &SystemConfig::new("mame"), Path::new("/roms/sf2.zip"), "")
            .unwrap();

        assert_eq!(outcome, OverlayOutcome::Archive(archive.clone()));
        assert_eq!(fs::read_link(paths.artwork_dir.join("sf2.zip")).unwrap(), archive);
        assert!(!paths.artwork_dir.join("sf2").exists());
    }

    #[test]
    fn test_prepackaged_layout_is_linked() {
        let temp = TempDir::new().unwrap();
        let paths = MamePaths::rooted_at(temp.path());
        let image = bezel_image(&temp.path().join("decorations"), 16, 9);
        let layout = temp.path().join("decorations/sf2.lay");
        fs::write(&layout, "<mamelayout version=\"2\"/>").unwrap();

        let lookup = FixedLookup(Some(BezelSpec {
            image: image.clone(),
            layout: Some(layout.clone()),
            archive: None,
            info: None,
        }));
        let composer = BezelComposer::new(&paths, &lookup, &NoProbe);
        let outcome = composer
            .write(Some("default"), &SystemConfig::new("mame"), Path::new("/roms/sf2.zip"), "")
            .unwrap();

        let scratch = paths.artwork_dir.join("sf2");
        assert_eq!(outcome, OverlayOutcome::Layout);
        assert_eq!(fs::read_link(scratch.join("default.lay")).unwrap(), layout);
        assert_eq!(fs::read_link(scratch.join("bezel.png")).unwrap(), image);
    }

    #[test]
    fn test_probe_failure_assumes_horizontal() {
        let temp = TempDir::new().unwrap();
        let paths = MamePaths::rooted_at(temp.path());
        let image = bezel_image(&temp.path().join("decorations"), 160, 90);

        let lookup = FixedLookup(Some(BezelSpec {
            image,
            layout: None,
            archive: None,
            info: None,
        }));
        let composer = BezelComposer::new(&paths, &lookup, &NoProbe);
        let outcome = composer
            .write(Some("default"), &SystemConfig::new("mame"), Path::new("/roms/galaga.zip"), "")
            .unwrap();

        assert_eq!(outcome, OverlayOutcome::Synthesized);
        let layout = fs::read_to_string(paths.artwork_dir.join("galaga/default.lay")).unwrap();
        assert!(layout.contains("<bounds x=\"20\" y=\"0\" width=\"120\" height=\"90\" />"));
    }
}
