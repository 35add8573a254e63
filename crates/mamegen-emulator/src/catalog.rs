//! System catalog
//!
//! Maps logical system names to the emulated machine, its default media
//! type and an optional auto-run command. Systems that are not in the table
//! are run as native arcade machines.

use crate::{GeneratorError, table};
use mamegen_config::MamePaths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Logical system played back through the audio player binary
const AUDIO_PLAYBACK_SYSTEM: &str = "vgmplay";

/// One row of the system table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEntry {
    /// Logical system name (e.g. `bbc`)
    pub name: String,

    /// Emulated machine, empty for systems without one (LCD and TV games)
    pub machine: String,

    /// Default media type switch, without the leading dash (e.g. `flop1`)
    pub media_type: String,

    /// Keystrokes typed after boot, empty if none
    pub auto_run: String,
}

/// Emulator binary family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulatorVariant {
    Arcade,
    Mess,
    AudioPlayback,
}

impl EmulatorVariant {
    /// Binary to launch for this variant
    pub fn binary(&self, paths: &MamePaths) -> PathBuf {
        match self {
            EmulatorVariant::Arcade => paths.mame_binary(),
            EmulatorVariant::Mess => paths.mess_binary(),
            EmulatorVariant::AudioPlayback => paths.vgmplay_binary(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EmulatorVariant::Arcade => "arcade",
            EmulatorVariant::Mess => "mess",
            EmulatorVariant::AudioPlayback => "audio playback",
        }
    }
}

/// How a system is emulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    Arcade,
    Mess(&'a SystemEntry),
    AudioPlayback(&'a SystemEntry),
}

impl<'a> Classification<'a> {
    pub fn variant(&self) -> EmulatorVariant {
        match self {
            Classification::Arcade => EmulatorVariant::Arcade,
            Classification::Mess(_) => EmulatorVariant::Mess,
            Classification::AudioPlayback(_) => EmulatorVariant::AudioPlayback,
        }
    }

    /// Catalog entry, absent for arcade systems
    pub fn entry(&self) -> Option<&'a SystemEntry> {
        match self {
            Classification::Arcade => None,
            Classification::Mess(entry) | Classification::AudioPlayback(entry) => Some(entry),
        }
    }

    /// Emulated machine name, empty for arcade systems
    pub fn machine(&self) -> &'a str {
        self.entry().map(|e| e.machine.as_str()).unwrap_or("")
    }

    pub fn is_arcade(&self) -> bool {
        matches!(self, Classification::Arcade)
    }
}

/// Immutable table of console/computer systems
#[derive(Debug, Clone, Default)]
pub struct SystemCatalog {
    entries: HashMap<String, SystemEntry>,
}

impl SystemCatalog {
    /// Load the table from disk. A missing or malformed table is fatal.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GeneratorError::ConfigLoad(format!("{}: {}", path.display(), e))
        })?;

        let catalog = Self::parse(&contents)
            .map_err(|e| GeneratorError::ConfigLoad(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(
            "Loaded {} systems from {}",
            catalog.entries.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse table contents
    pub fn parse(contents: &str) -> Result<Self, String> {
        let mut entries = HashMap::new();

        for (line, row) in table::rows(contents) {
            let [name, machine, media_type, auto_run] = <[String; 4]>::try_from(row)
                .map_err(|row| format!("line {} has {} columns, expected 4", line, row.len()))?;

            if name.is_empty() {
                return Err(format!("line {} has an empty system name", line));
            }

            // First row wins for duplicated names
            entries.entry(name.clone()).or_insert(SystemEntry {
                name,
                machine,
                media_type,
                auto_run,
            });
        }

        Ok(Self { entries })
    }

    /// Exact-name lookup
    pub fn classify(&self, name: &str) -> Option<&SystemEntry> {
        self.entries.get(name)
    }

    /// Decide how a system is emulated
    pub fn classification(&self, name: &str) -> Classification<'_> {
        match self.classify(name) {
            None => Classification::Arcade,
            Some(entry) if entry.name == AUDIO_PLAYBACK_SYSTEM => {
                Classification::AudioPlayback(entry)
            }
            Some(entry) => Classification::Mess(entry),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
