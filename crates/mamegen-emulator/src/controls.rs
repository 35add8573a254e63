//! Controller button layouts
//!
//! Picks the button layout the pad-config writer should map for a game.
//! Fighting games get a layout matching the player's physical controller,
//! other curated families get a fixed layout, everything else gets the
//! default.

use mamegen_config::MamePaths;
use mamegen_config::SystemConfig;
use mamegen_config::options::ALT_LAYOUT;
use std::collections::HashSet;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

/// Button layout identifier understood by the pad-config writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonLayout {
    Default,
    NeoMini,
    NeoCd,
    Twinstick,
    Qbert,
    SfSnes,
    SfStick,
    Megadrive,
    MkSnes,
    MkMegadrive,
    MkStick,
    KiSnes,
    Fightstick,
}

impl ButtonLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonLayout::Default => "default",
            ButtonLayout::NeoMini => "neomini",
            ButtonLayout::NeoCd => "neocd",
            ButtonLayout::Twinstick => "twinstick",
            ButtonLayout::Qbert => "qbert",
            ButtonLayout::SfSnes => "sfsnes",
            ButtonLayout::SfStick => "sfstick",
            ButtonLayout::Megadrive => "megadrive",
            ButtonLayout::MkSnes => "mksnes",
            ButtonLayout::MkMegadrive => "mkmegadrive",
            ButtonLayout::MkStick => "mkstick",
            ButtonLayout::KiSnes => "kisnes",
            ButtonLayout::Fightstick => "fightstick",
        }
    }

    /// Layouts a user may request directly, bypassing classification
    pub fn pinned(name: &str) -> Option<Self> {
        match name {
            "default" => Some(ButtonLayout::Default),
            "neomini" => Some(ButtonLayout::NeoMini),
            "neocd" => Some(ButtonLayout::NeoCd),
            "twinstick" => Some(ButtonLayout::Twinstick),
            "qbert" => Some(ButtonLayout::Qbert),
            _ => None,
        }
    }
}

impl fmt::Display for ButtonLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical controller the player asked the layout to match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerType {
    Auto,
    Snes,
    Megadrive,
    Fightstick,
    Other,
}

impl ControllerType {
    fn parse(value: &str) -> Self {
        match value {
            "auto" => ControllerType::Auto,
            "snes" => ControllerType::Snes,
            "megadrive" => ControllerType::Megadrive,
            "fightstick" => ControllerType::Fightstick,
            _ => ControllerType::Other,
        }
    }
}

/// Curated game families, in match precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameFamily {
    Capcom,
    MortalKombat,
    KillerInstinct,
    NeoGeo,
    Twinstick,
    RotatedStick,
}

impl GameFamily {
    const PRECEDENCE: [GameFamily; 6] = [
        GameFamily::Capcom,
        GameFamily::MortalKombat,
        GameFamily::KillerInstinct,
        GameFamily::NeoGeo,
        GameFamily::Twinstick,
        GameFamily::RotatedStick,
    ];

    fn list_file(&self) -> &'static str {
        match self {
            GameFamily::Capcom => "mameCapcom.txt",
            GameFamily::MortalKombat => "mameMKombat.txt",
            GameFamily::KillerInstinct => "mameKInstinct.txt",
            GameFamily::NeoGeo => "mameNeogeo.txt",
            GameFamily::Twinstick => "mameTwinstick.txt",
            GameFamily::RotatedStick => "mameRotatedstick.txt",
        }
    }

    /// Layout for a game of this family. `None` when the controller type
    /// has no mapping for the family.
    fn layout(&self, controller: ControllerType) -> Option<ButtonLayout> {
        use ControllerType::*;

        match (self, controller) {
            (GameFamily::Capcom, Auto | Snes) => Some(ButtonLayout::SfSnes),
            (GameFamily::Capcom, Megadrive) => Some(ButtonLayout::Megadrive),
            (GameFamily::Capcom, Fightstick) => Some(ButtonLayout::SfStick),
            (GameFamily::MortalKombat, Auto | Snes) => Some(ButtonLayout::MkSnes),
            (GameFamily::MortalKombat, Megadrive) => Some(ButtonLayout::MkMegadrive),
            (GameFamily::MortalKombat, Fightstick) => Some(ButtonLayout::MkStick),
            (GameFamily::KillerInstinct, Auto | Snes) => Some(ButtonLayout::KiSnes),
            (GameFamily::KillerInstinct, Megadrive) => Some(ButtonLayout::Megadrive),
            (GameFamily::KillerInstinct, Fightstick) => Some(ButtonLayout::SfStick),
            (GameFamily::Capcom | GameFamily::MortalKombat | GameFamily::KillerInstinct, Other) => {
                None
            }
            (GameFamily::NeoGeo, _) => Some(ButtonLayout::NeoMini),
            (GameFamily::Twinstick, _) => Some(ButtonLayout::Twinstick),
            (GameFamily::RotatedStick, _) => Some(ButtonLayout::Qbert),
        }
    }
}

fn load_list(path: &Path) -> HashSet<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents.split_whitespace().map(str::to_string).collect(),
        Err(e) => {
            if e.kind() == ErrorKind::NotFound {
                tracing::warn!("Game list {} is missing", path.display());
            } else {
                tracing::warn!("Could not read game list {}: {}", path.display(), e);
            }
            HashSet::new()
        }
    }
}

/// Classifies ROMs against the curated game lists
pub struct ControlSchemeResolver<'a> {
    paths: &'a MamePaths,
}

impl<'a> ControlSchemeResolver<'a> {
    pub fn new(paths: &'a MamePaths) -> Self {
        Self { paths }
    }

    /// Layout for a ROM file name (extension optional)
    pub fn resolve(&self, config: &SystemConfig, rom_basename: &str) -> ButtonLayout {
        let requested = config.text(ALT_LAYOUT).value();

        if let Some(layout) = ButtonLayout::pinned(requested) {
            return layout;
        }

        let controller = ControllerType::parse(requested);
        let rom = Path::new(rom_basename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(rom_basename);

        // Lists are read on every call so edits take effect on the next launch
        let family = GameFamily::PRECEDENCE
            .into_iter()
            .find(|family| load_list(&self.paths.game_list(family.list_file())).contains(rom));

        let layout = match family {
            Some(family) => family.layout(controller).unwrap_or(ButtonLayout::Default),
            None if controller == ControllerType::Fightstick => ButtonLayout::Fightstick,
            None => ButtonLayout::Default,
        };

        tracing::debug!("Button layout for {}: {} (family {:?})", rom, layout, family);
        layout
    }
}
