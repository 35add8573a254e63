//! Emulator launch configuration for mamegen
//!
//! Turns a (system, ROM, options) selection into a complete emulator command
//! line, picks the controller button layout for the game, and prepares the
//! bezel artwork the emulator's layout engine reads at startup.
//!
//! The emulator process itself is never started here; callers receive a
//! [`CommandDescriptor`] and decide what to do with it.

mod bezel;
mod catalog;
mod command;
mod controls;
mod generator;
mod geometry;
mod machines;
mod pads;
mod softlist;
mod table;
mod tattoo;

pub use bezel::{BezelBounds, BezelComposer, BezelLookup, BezelSpec, OverlayOutcome};
pub use catalog::{Classification, EmulatorVariant, SystemCatalog, SystemEntry};
pub use command::{CommandDescriptor, MediaPlan, VideoEngine};
pub use controls::{ButtonLayout, ControlSchemeResolver};
pub use generator::MameGenerator;
pub use geometry::{GeometryInfo, ListXmlProbe, MachineProbe};
pub use pads::{PadConfigRequest, PadConfigWriter, PlayerController};
pub use softlist::SoftwareStaging;
pub use tattoo::Corner;

/// Command construction steps, exposed for callers that need a single step
pub mod flags {
    pub use crate::command::{
        active_soft_list, config_directory, directory_flags, media_arguments,
        needs_parent_directory, optional_flags, resource_flags, rom_path_flags, switchres_flags,
        video_flags,
    };
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Failed to load system table: {0}")]
    ConfigLoad(String),

    #[error("Machine geometry probe failed: {0}")]
    Probe(String),

    #[error("Failed to load decal: {0}")]
    DecalLoad(String),

    #[error("Bezel lookup failed: {0}")]
    BezelLookup(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output resolution the frontend is running at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}
