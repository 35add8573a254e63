//! Stand-alone implementations of the generator's collaborators

use mamegen_emulator::{
    BezelLookup, BezelSpec, GeneratorError, PadConfigRequest, PadConfigWriter,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Looks bezels up in a decorations tree:
///
/// ```text
/// <root>/<set>/games/<system>/<rom>.png   per-system game bezel
/// <root>/<set>/games/<rom>.png            game bezel
/// <root>/<set>/systems/<system>.png       system bezel
/// ```
///
/// Each image may have `.lay`, `.zip` and `.info` siblings with the same stem.
pub struct DecorationsLookup {
    root: PathBuf,
}

impl DecorationsLookup {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, rom: &str, bezel_set: &str, system: &str) -> [PathBuf; 3] {
        let set = self.root.join(bezel_set);
        [
            set.join("games").join(system).join(rom),
            set.join("games").join(rom),
            set.join("systems").join(system),
        ]
    }
}

fn sibling(stem: &Path, extension: &str) -> Option<PathBuf> {
    // Not `with_extension`: ROM names may contain dots
    let mut name = stem.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    let path = PathBuf::from(name);
    path.exists().then_some(path)
}

impl BezelLookup for DecorationsLookup {
    fn lookup(
        &self,
        rom: &Path,
        bezel_set: &str,
        system: &str,
    ) -> Result<Option<BezelSpec>, GeneratorError> {
        if !self.root.join(bezel_set).is_dir() {
            return Err(GeneratorError::BezelLookup(format!(
                "bezel set {} not found in {}",
                bezel_set,
                self.root.display()
            )));
        }

        let rom_stem = rom
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let found = self
            .candidates(&rom_stem, bezel_set, system)
            .into_iter()
            .find_map(|stem| {
                let image = sibling(&stem, "png")?;
                Some(BezelSpec {
                    image,
                    layout: sibling(&stem, "lay"),
                    archive: sibling(&stem, "zip"),
                    info: sibling(&stem, "info"),
                })
            });

        Ok(found)
    }
}

/// Reports the pad configuration request instead of writing mapping files
pub struct LoggingPadWriter;

impl PadConfigWriter for LoggingPadWriter {
    fn write_pads(&self, request: &PadConfigRequest<'_>) -> Result<(), GeneratorError> {
        info!(
            "Pad config: {} controller(s), layout {}, dpad mode {}, machine {:?}, dir {}{}",
            request.controllers.len(),
            request.button_layout,
            request.dpad_mode,
            request.machine,
            request.config_dir.display(),
            if request.custom_config { " (custom)" } else { "" }
        );
        for pad in request.controllers {
            info!("  P{}: {} [{}] {}", pad.player, pad.name, pad.guid, pad.device);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_game_bezel_preferred_over_system() {
        let temp = TempDir::new().unwrap();
        let set = temp.path().join("thebezelproject");
        fs::create_dir_all(set.join("games/mame")).unwrap();
        fs::create_dir_all(set.join("systems")).unwrap();
        fs::write(set.join("games/mame/sf2.png"), b"png").unwrap();
        fs::write(set.join("games/mame/sf2.info"), b"{}").unwrap();
        fs::write(set.join("systems/mame.png"), b"png").unwrap();

        let lookup = DecorationsLookup::new(temp.path());
        let spec = lookup
            .lookup(Path::new("/roms/mame/sf2.zip"), "thebezelproject", "mame")
            .unwrap()
            .unwrap();

        assert_eq!(spec.image, set.join("games/mame/sf2.png"));
        assert_eq!(spec.info, Some(set.join("games/mame/sf2.info")));
        assert_eq!(spec.layout, None);

        let spec = lookup
            .lookup(Path::new("/roms/mame/pacman.zip"), "thebezelproject", "mame")
            .unwrap()
            .unwrap();
        assert_eq!(spec.image, set.join("systems/mame.png"));
    }

    #[test]
    fn test_missing_set_is_an_error() {
        let temp = TempDir::new().unwrap();
        let lookup = DecorationsLookup::new(temp.path());
        assert!(lookup.lookup(Path::new("sf2.zip"), "nothing", "mame").is_err());
    }

    #[test]
    fn test_no_image_is_none() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("empty")).unwrap();
        let lookup = DecorationsLookup::new(temp.path());
        assert!(lookup.lookup(Path::new("sf2.zip"), "empty", "mame").unwrap().is_none());
    }
}
