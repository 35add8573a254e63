//! Deployment paths
//!
//! Where the emulator is installed, where its data tables live, and which
//! scratch directories the generator is allowed to rebuild on every launch.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User-data directories that must exist before the emulator starts,
/// relative to the userdata root.
const USER_DIRECTORIES: &[&str] = &[
    "system/configs/mame",
    "saves/mame",
    "saves/mame/nvram",
    "saves/mame/cfg",
    "saves/mame/input",
    "saves/mame/state",
    "saves/mame/diff",
    "saves/mame/comments",
    "bios/mame",
    "bios/mame/artwork",
    "cheats/mame",
    "saves/mame/plugins",
    "system/configs/mame/ctrlr",
    "system/configs/mame/ini",
    "bios/mame/artwork/crosshairs",
];

/// Filesystem layout used to build the emulator command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MamePaths {
    /// Root of the user data partition
    #[serde(default = "default_userdata")]
    pub userdata: PathBuf,

    /// Emulator install directory (binaries, bgfx, plugins, hash files)
    #[serde(default = "default_emulator_dir")]
    pub emulator_dir: PathBuf,

    /// System table, game lists and auto-load tables
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Scratch directory for software-list symlinks
    #[serde(default = "default_software_dir")]
    pub software_dir: PathBuf,

    /// Scratch directory for generated bezel artwork
    #[serde(default = "default_artwork_dir")]
    pub artwork_dir: PathBuf,

    /// Controller overlay ("tattoo") images
    #[serde(default = "default_overlays_dir")]
    pub overlays_dir: PathBuf,
}

fn default_userdata() -> PathBuf {
    PathBuf::from("/userdata")
}

fn default_emulator_dir() -> PathBuf {
    PathBuf::from("/usr/bin/mame")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/usr/share/mamegen/data/mame")
}

fn default_software_dir() -> PathBuf {
    PathBuf::from("/var/run/mame_software")
}

fn default_artwork_dir() -> PathBuf {
    PathBuf::from("/var/run/mame_artwork")
}

fn default_overlays_dir() -> PathBuf {
    PathBuf::from("/usr/share/mamegen/controller-overlays")
}

impl Default for MamePaths {
    fn default() -> Self {
        Self {
            userdata: default_userdata(),
            emulator_dir: default_emulator_dir(),
            data_dir: default_data_dir(),
            software_dir: default_software_dir(),
            artwork_dir: default_artwork_dir(),
            overlays_dir: default_overlays_dir(),
        }
    }
}

impl MamePaths {
    /// Create a layout rooted at a single directory (useful for sandboxes)
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            userdata: root.join("userdata"),
            emulator_dir: root.join("usr/bin/mame"),
            data_dir: root.join("usr/share/mamegen/data/mame"),
            software_dir: root.join("run/mame_software"),
            artwork_dir: root.join("run/mame_artwork"),
            overlays_dir: root.join("usr/share/mamegen/controller-overlays"),
        }
    }

    /// Path below the userdata root
    pub fn userdata_path(&self, relative: &str) -> PathBuf {
        self.userdata.join(relative)
    }

    /// Every user-data directory the emulator expects to exist
    pub fn user_directories(&self) -> Vec<PathBuf> {
        USER_DIRECTORIES
            .iter()
            .map(|dir| self.userdata_path(dir))
            .collect()
    }

    /// Arcade emulator binary
    pub fn mame_binary(&self) -> PathBuf {
        self.emulator_dir.join("mame")
    }

    /// Console/computer emulator binary
    pub fn mess_binary(&self) -> PathBuf {
        self.emulator_dir.join("mess")
    }

    /// Audio playback binary
    pub fn vgmplay_binary(&self) -> PathBuf {
        self.emulator_dir.join("vgmplay")
    }

    /// Base directory for per-machine emulator configs
    pub fn mame_config_dir(&self) -> PathBuf {
        self.userdata_path("system/configs/mame")
    }

    /// Value of `XDG_CONFIG_HOME` for the emulator process
    pub fn config_home(&self) -> PathBuf {
        self.userdata_path("system/configs")
    }

    /// Value of `XDG_CACHE_HOME` for the emulator process
    pub fn cache_home(&self) -> PathBuf {
        self.userdata_path("saves")
    }

    /// Semicolon-delimited table of console/computer systems
    pub fn system_table(&self) -> PathBuf {
        self.data_dir.join("messSystems.csv")
    }

    /// Curated game list file
    pub fn game_list(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Per-ROM auto-boot override table for a software list
    pub fn autoload_table(&self, soft_list: &str) -> PathBuf {
        self.data_dir.join(format!("{}_autoload.csv", soft_list))
    }

    /// Hash database shipped with the emulator for a software list
    pub fn hash_file(&self, soft_list: &str) -> PathBuf {
        self.emulator_dir.join("hash").join(format!("{}.xml", soft_list))
    }

    /// Hash directory inside the software-list scratch directory
    pub fn software_hash_dir(&self) -> PathBuf {
        self.software_dir.join("hash")
    }

    /// Controller overlay image for a system
    pub fn system_overlay(&self, system: &str) -> PathBuf {
        self.overlays_dir.join(format!("{}.png", system))
    }

    /// Fallback controller overlay image
    pub fn generic_overlay(&self) -> PathBuf {
        self.overlays_dir.join("generic.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binaries() {
        let paths = MamePaths::default();
        assert_eq!(paths.mame_binary(), PathBuf::from("/usr/bin/mame/mame"));
        assert_eq!(paths.mess_binary(), PathBuf::from("/usr/bin/mame/mess"));
        assert_eq!(paths.vgmplay_binary(), PathBuf::from("/usr/bin/mame/vgmplay"));
    }

    #[test]
    fn test_data_tables() {
        let paths = MamePaths::default();
        assert!(paths.system_table().ends_with("messSystems.csv"));
        assert!(paths.autoload_table("msx1_cass").ends_with("msx1_cass_autoload.csv"));
        assert_eq!(
            paths.hash_file("bbc_flop"),
            PathBuf::from("/usr/bin/mame/hash/bbc_flop.xml")
        );
    }

    #[test]
    fn test_user_directories_are_rooted() {
        let root = Path::new("/sandbox");
        let paths = MamePaths::rooted_at(root);
        let dirs = paths.user_directories();

        assert_eq!(dirs.len(), USER_DIRECTORIES.len());
        assert!(dirs.iter().all(|d| d.starts_with("/sandbox/userdata")));
        assert!(dirs.contains(&PathBuf::from("/sandbox/userdata/saves/mame/nvram")));
    }

    #[test]
    fn test_environment_homes() {
        let paths = MamePaths::default();
        assert_eq!(paths.config_home(), PathBuf::from("/userdata/system/configs"));
        assert_eq!(paths.cache_home(), PathBuf::from("/userdata/saves"));
    }
}
