//! Controller configuration hand-off
//!
//! Writing the emulator's controller mapping files is done by an external
//! writer; the generator only decides what it is asked to write.

use crate::{ButtonLayout, GeneratorError};
use serde::Serialize;
use std::path::Path;

/// A controller assigned to a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerController {
    /// Player number, starting at 1
    pub player: u8,
    pub name: String,
    /// SDL joystick GUID
    pub guid: String,
    /// Device node (e.g. `/dev/input/event3`)
    pub device: String,
}

/// Everything the pad writer needs for one launch
#[derive(Debug, Clone, Copy)]
pub struct PadConfigRequest<'a> {
    /// Emulator config directory for this launch
    pub config_dir: &'a Path,
    pub controllers: &'a [PlayerController],
    /// Emulated machine, empty for arcade systems
    pub machine: &'a str,
    /// D-pad mode option, passed through untouched
    pub dpad_mode: &'a str,
    pub button_layout: ButtonLayout,
    /// Whether the config directory is the user's custom one
    pub custom_config: bool,
}

/// Writes controller mapping files for the emulator
pub trait PadConfigWriter {
    fn write_pads(&self, request: &PadConfigRequest<'_>) -> Result<(), GeneratorError>;
}
