//! Software-list staging
//!
//! The emulator finds software-list titles through a scratch directory that
//! holds a link to the list's hash database and a link named after the list
//! pointing at the user's ROM directory. The scratch directory is rebuilt on
//! every launch; concurrent launches against the same scratch directory are
//! not supported.

use crate::GeneratorError;
use crate::command::rom_directory;
use mamegen_config::MamePaths;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

/// Software lists whose titles live one directory per title, so the link
/// must point at the parent of the ROM's directory.
pub(crate) const PARENT_DIRECTORY_LISTS: &[&str] = &["mac_hdd", "bbc_hdd", "cdi", "archimedes_hdd"];

/// Links to create for one software-list launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareStaging {
    /// Software list name (e.g. `bbc_flop`)
    pub soft_list: String,

    /// Directory the list link points at
    pub link_target: PathBuf,
}

impl SoftwareStaging {
    /// Plan the staging for a ROM
    pub fn for_rom(soft_list: &str, rom: &Path) -> Self {
        let rom_dir = rom_directory(rom);

        let link_target = if PARENT_DIRECTORY_LISTS.contains(&soft_list) {
            rom_dir
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(rom_dir)
        } else {
            rom_dir
        };

        Self {
            soft_list: soft_list.to_string(),
            link_target: link_target.to_path_buf(),
        }
    }

    /// Clear stale links and create the hash and ROM directory links
    pub fn stage(&self, paths: &MamePaths) -> Result<(), GeneratorError> {
        let soft_dir = &paths.software_dir;
        fs::create_dir_all(soft_dir)?;

        for entry in fs::read_dir(soft_dir)? {
            let path = entry?.path();
            let meta = fs::symlink_metadata(&path)?;
            if meta.file_type().is_symlink() {
                fs::remove_file(&path)?;
            } else if meta.is_dir() {
                fs::remove_dir_all(&path)?;
            }
        }

        let hash_dir = paths.software_hash_dir();
        fs::create_dir_all(&hash_dir)?;

        let hash_link = hash_dir.join(format!("{}.xml", self.soft_list));
        symlink(paths.hash_file(&self.soft_list), &hash_link)?;

        let list_link = soft_dir.join(&self.soft_list);
        symlink(&self.link_target, &list_link)?;

        tracing::debug!(
            "Staged software list {} -> {}",
            self.soft_list,
            self.link_target.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plain_list_links_rom_directory() {
        let staging = SoftwareStaging::for_rom("bbc_flop", Path::new("/roms/bbc/elite.ssd"));
        assert_eq!(staging.link_target, PathBuf::from("/roms/bbc"));
    }

    #[test]
    fn test_parent_directory_list() {
        let staging =
            SoftwareStaging::for_rom("mac_hdd", Path::new("/roms/macintosh/myst/myst.chd"));
        assert_eq!(staging.link_target, PathBuf::from("/roms/macintosh"));
    }

    #[test]
    fn test_stage_replaces_stale_links() {
        let temp = TempDir::new().unwrap();
        let paths = MamePaths::rooted_at(temp.path());
        let roms = temp.path().join("roms/bbc");
        fs::create_dir_all(&roms).unwrap();

        // Leftovers from a previous launch
        fs::create_dir_all(paths.software_dir.join("stale_dir")).unwrap();
        fs::create_dir_all(paths.software_hash_dir()).unwrap();
        symlink(&roms, paths.software_dir.join("old_list")).unwrap();
        fs::write(paths.software_hash_dir().join("old_list.xml"), "x").unwrap();

        let staging = SoftwareStaging::for_rom("bbc_cass", &roms.join("game.uef"));
        staging.stage(&paths).unwrap();

        assert!(!paths.software_dir.join("stale_dir").exists());
        assert!(fs::symlink_metadata(paths.software_dir.join("old_list")).is_err());
        assert!(!paths.software_hash_dir().join("old_list.xml").exists());

        let link = fs::read_link(paths.software_dir.join("bbc_cass")).unwrap();
        assert_eq!(link, roms);
        let hash = fs::read_link(paths.software_hash_dir().join("bbc_cass.xml")).unwrap();
        assert_eq!(hash, paths.hash_file("bbc_cass"));
    }
}
