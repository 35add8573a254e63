//! Command line construction
//!
//! Each step of the command line is a function of the deployment paths and
//! the launch options, returning the flags it contributes. The generator
//! concatenates them in a fixed order.

use crate::machines::{self, MachineContext};
use crate::softlist::{PARENT_DIRECTORY_LISTS, SoftwareStaging};
use crate::Classification;
use mamegen_config::options::{
    ALT_MODEL, ARTWORK_CROP, BGFX_BACKEND, BGFX_SHADERS, CUSTOM_CFG, ENABLE_UI, HISCORE_PLUGIN,
    PER_GAME_CFG, ROTATION, SOFT_LIST, SWITCHRES, VIDEO,
};
use mamegen_config::{MamePaths, SystemConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Program, arguments and environment for the emulator process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl CommandDescriptor {
    /// Position of a flag in the argument list
    pub fn position(&self, flag: &str) -> Option<usize> {
        self.args.iter().position(|a| a == flag)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.position(flag).is_some()
    }

    /// Argument following a flag
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        let index = self.position(flag)?;
        self.args.get(index + 1).map(String::as_str)
    }

    /// Render as a single POSIX shell line
    pub fn to_shell_line(&self) -> String {
        let mut words: Vec<String> = self
            .env
            .iter()
            .map(|(key, value)| format!("{}={}", key, shell_quote(value)))
            .collect();

        words.push(shell_quote(&self.program.to_string_lossy()));
        words.extend(self.args.iter().map(|a| shell_quote(a)));
        words.join(" ")
    }
}

fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@".contains(c));

    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

/// Directory argument, always with a trailing slash
fn dir_arg(path: &Path) -> String {
    let mut arg = path.to_string_lossy().into_owned();
    if !arg.ends_with('/') {
        arg.push('/');
    }
    arg
}

fn pair(flag: &str, value: impl Into<String>) -> [String; 2] {
    [flag.to_string(), value.into()]
}

/// Directory holding the ROM; `.` for bare file names
pub(crate) fn rom_directory(rom: &Path) -> &Path {
    rom.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

/// Software list in effect; arcade systems never use one
pub fn active_soft_list<'a>(
    config: &'a SystemConfig,
    classification: Classification<'_>,
) -> Option<&'a str> {
    if classification.is_arcade() {
        None
    } else {
        config.declared(SOFT_LIST)
    }
}

/// Whether a software list links the parent of the ROM directory
pub fn needs_parent_directory(soft_list: &str) -> bool {
    PARENT_DIRECTORY_LISTS.contains(&soft_list)
}

/// `-skip_gameinfo` and the ROM search path
pub fn rom_path_flags(
    paths: &MamePaths,
    classification: Classification<'_>,
    soft_list: Option<&str>,
    rom_dir: &Path,
) -> Vec<String> {
    let rom_dir = rom_dir.to_string_lossy();

    let rom_path = if classification.is_arcade() {
        rom_dir.into_owned()
    } else {
        let mut search = format!(
            "{};{};{}",
            rom_dir,
            dir_arg(&paths.userdata_path("bios")),
            dir_arg(&paths.userdata_path("roms/mame"))
        );
        if soft_list.is_some_and(needs_parent_directory) {
            search.push(';');
            search.push_str(&dir_arg(&paths.software_dir));
        }
        search
    };

    let mut flags = vec!["-skip_gameinfo".to_string()];
    flags.extend(pair("-rompath", rom_path));
    flags
}

/// Emulator resources, artwork, cheats and NVRAM locations
pub fn resource_flags(paths: &MamePaths) -> Vec<String> {
    let emu = &paths.emulator_dir;
    let mut flags = Vec::new();

    flags.extend(pair("-bgfx_path", dir_arg(&emu.join("bgfx"))));
    flags.extend(pair("-fontpath", dir_arg(emu)));
    flags.extend(pair("-languagepath", dir_arg(&emu.join("language"))));
    flags.extend(pair(
        "-pluginspath",
        format!(
            "{};{}",
            dir_arg(&emu.join("plugins")),
            paths.userdata_path("saves/mame/plugins").to_string_lossy()
        ),
    ));
    flags.extend(pair("-samplepath", dir_arg(&paths.userdata_path("bios/mame/samples"))));
    // Generated bezels first, then shipped artwork, user artwork and decorations
    flags.extend(pair(
        "-artpath",
        [
            dir_arg(&paths.artwork_dir),
            dir_arg(&emu.join("artwork")),
            dir_arg(&paths.userdata_path("bios/mame/artwork")),
            dir_arg(&paths.userdata_path("decorations")),
        ]
        .join(";"),
    ));
    flags.push("-cheat".to_string());
    flags.extend(pair("-cheatpath", dir_arg(&paths.userdata_path("cheats/mame"))));
    flags.extend(pair(
        "-nvram_directory",
        dir_arg(&paths.userdata_path("saves/mame/nvram")),
    ));

    flags
}

/// Emulator config directory for this launch.
///
/// `<base>` for arcade systems, `<base>/<machine>` for emulated machines,
/// then `<rom file name>` when per-game configs are enabled for a machine,
/// then `custom` when custom configs are enabled.
pub fn config_directory(
    paths: &MamePaths,
    config: &SystemConfig,
    classification: Classification<'_>,
    rom_file_name: &str,
) -> PathBuf {
    let mut dir = paths.mame_config_dir();
    let machine = classification.machine();

    if !machine.is_empty() {
        dir.push(machine);
        if config.enabled(PER_GAME_CFG) {
            dir.push(rom_file_name);
        }
    }

    if config.enabled(CUSTOM_CFG) {
        dir.push("custom");
    }

    dir
}

/// Save, input, snapshot and software-list directories
pub fn directory_flags(
    paths: &MamePaths,
    config_dir: &Path,
    soft_list: Option<&str>,
) -> Vec<String> {
    let mut flags = Vec::new();

    flags.extend(pair("-cfg_directory", dir_arg(config_dir)));
    flags.extend(pair("-input_directory", dir_arg(&paths.userdata_path("saves/mame/input"))));
    flags.extend(pair("-state_directory", dir_arg(&paths.userdata_path("saves/mame/state"))));
    flags.extend(pair("-snapshot_directory", dir_arg(&paths.userdata_path("screenshots"))));
    flags.extend(pair("-diff_directory", dir_arg(&paths.userdata_path("saves/mame/diff"))));
    flags.extend(pair(
        "-comment_directory",
        dir_arg(&paths.userdata_path("saves/mame/comments")),
    ));
    flags.extend(pair("-homepath", dir_arg(&paths.userdata_path("saves/mame/plugins"))));
    flags.extend(pair("-ctrlrpath", dir_arg(&paths.userdata_path("system/configs/mame/ctrlr"))));
    flags.extend(pair("-inipath", dir_arg(&paths.userdata_path("system/configs/mame/ini"))));
    flags.extend(pair(
        "-crosshairpath",
        dir_arg(&paths.userdata_path("bios/mame/artwork/crosshairs")),
    ));

    if soft_list.is_some() {
        flags.extend(pair("-swpath", dir_arg(&paths.software_dir)));
        flags.extend(pair("-hashpath", dir_arg(&paths.software_hash_dir())));
    }

    flags
}

/// Video output engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoEngine {
    Bgfx {
        backend: String,
        screen_chains: String,
    },
    Accel,
    OpenGl,
}

impl VideoEngine {
    pub fn from_config(config: &SystemConfig) -> Self {
        match config.text(VIDEO).value() {
            "bgfx" => VideoEngine::Bgfx {
                backend: config.text(BGFX_BACKEND).value().to_string(),
                screen_chains: config.text(BGFX_SHADERS).value().to_string(),
            },
            "accel" => VideoEngine::Accel,
            _ => VideoEngine::OpenGl,
        }
    }

    pub fn flags(&self) -> Vec<String> {
        match self {
            VideoEngine::Bgfx {
                backend,
                screen_chains,
            } => {
                let mut flags = pair("-video", "bgfx").to_vec();
                flags.extend(pair("-bgfx_backend", backend.as_str()));
                flags.extend(pair("-bgfx_screen_chains", screen_chains.as_str()));
                flags
            }
            VideoEngine::Accel => pair("-video", "accel").to_vec(),
            VideoEngine::OpenGl => pair("-video", "opengl").to_vec(),
        }
    }
}

pub fn video_flags(config: &SystemConfig) -> Vec<String> {
    VideoEngine::from_config(config).flags()
}

/// Resolution switching: all of it or none of it
pub fn switchres_flags(config: &SystemConfig) -> Vec<String> {
    let flags: &[&str] = if config.enabled(SWITCHRES) {
        &["-modeline_generation", "-changeres", "-modesetting", "-readconfig"]
    } else {
        &["-nomodeline_generation", "-nochangeres", "-noswitchres"]
    };
    flags.iter().map(|f| f.to_string()).collect()
}

/// Rotation, artwork cropping and UI input capture
pub fn optional_flags(config: &SystemConfig) -> Vec<String> {
    let mut flags = Vec::new();

    match config.declared(ROTATION) {
        Some("autoror") => flags.push("-autoror".to_string()),
        Some("autorol") => flags.push("-autorol".to_string()),
        _ => {}
    }

    if config.enabled(ARTWORK_CROP) {
        flags.push("-artwork_crop".to_string());
    }

    // Computers send every key to the emulated machine unless the UI is active
    if config.enabled(ENABLE_UI) {
        flags.push("-ui_active".to_string());
    }

    flags
}

/// Game arguments plus any software-list links they depend on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaPlan {
    pub args: Vec<String>,
    pub staging: Option<SoftwareStaging>,
}

/// The game itself: ROM name for arcade, machine plus media for computers
pub fn media_arguments(
    paths: &MamePaths,
    config: &SystemConfig,
    classification: Classification<'_>,
    soft_list: Option<&str>,
    rom: &Path,
) -> MediaPlan {
    let rom_file_name = rom
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let rom_stem = rom
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let entry = match classification.entry() {
        None => {
            let mut args = vec![rom_file_name];
            if config.enabled(HISCORE_PLUGIN) {
                args.extend(["-plugins", "-plugin", "hiscore"].map(String::from));
            }
            return MediaPlan {
                args,
                staging: None,
            };
        }
        Some(entry) if entry.machine.is_empty() => {
            return MediaPlan {
                args: vec![rom_file_name],
                staging: None,
            };
        }
        Some(entry) => entry,
    };

    let ctx = MachineContext {
        paths,
        config,
        entry,
        soft_list,
        rom_stem: &rom_stem,
    };

    let machine = config.declared(ALT_MODEL).unwrap_or(entry.machine.as_str());
    let mut args = vec![machine.to_string()];

    let staging = match soft_list {
        None => {
            args.extend(machines::media_flags(&ctx));
            args.push(rom.to_string_lossy().into_owned());
            None
        }
        Some(list) => {
            args.push(rom_stem.clone());
            Some(SoftwareStaging::for_rom(list, rom))
        }
    };

    args.extend(machines::auxiliary_flags(&ctx));

    MediaPlan { args, staging }
}
