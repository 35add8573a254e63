//! Per-machine command line hooks
//!
//! Machines with special needs register a hook in one of three tables:
//! media selection (which device the game is mounted on), expansion slots,
//! and auto-boot keystrokes. Systems without a registered hook get the
//! generic behavior.

use crate::{SystemEntry, table};
use mamegen_config::MamePaths;
use mamegen_config::SystemConfig;
use mamegen_config::options::{ALT_ROM_TYPE, BOOT_DISK, TI99_32K_RAM, TI99_SPEECH};
use std::io::ErrorKind;

type Hook = fn(&MachineContext<'_>) -> Vec<String>;

const MEDIA_HOOKS: &[(&str, Hook)] = &[("macintosh", macintosh_media)];

const SLOT_HOOKS: &[(&str, Hook)] = &[("ti99", ti99_slots)];

const AUTOBOOT_HOOKS: &[(&str, Hook)] = &[("bbc", bbc_autoboot), ("fm7", fm7_autoboot)];

/// Boot disks shipped as floppy images; everything else is a hard disk
const MAC_FLOPPY_BOOT_DISKS: &[&str] = &["macos30", "macos608", "macos701", "macos75"];

const BBC_TAPE_BOOT: &str = "*tape\nchain\"\"\n";
const BBC_DISK_BOOT: &str = "*cat\n*exec !boot\n";
const FM7_TAPE_BOOT: &str = "LOADM”“,,R\n";

/// Everything a hook may look at
#[derive(Debug, Clone, Copy)]
pub struct MachineContext<'a> {
    pub paths: &'a MamePaths,
    pub config: &'a SystemConfig,
    pub entry: &'a SystemEntry,
    /// Active software list, if any
    pub soft_list: Option<&'a str>,
    /// ROM file name without extension
    pub rom_stem: &'a str,
}

impl MachineContext<'_> {
    fn soft_list_suffix(&self, suffix: &str) -> bool {
        self.soft_list.is_some_and(|list| list.ends_with(suffix))
    }
}

fn find_hook(hooks: &[(&str, Hook)], system: &str) -> Option<Hook> {
    hooks
        .iter()
        .find(|(name, _)| *name == system)
        .map(|(_, hook)| *hook)
}

/// Device switches placed before the ROM path when no software list is used
pub fn media_flags(ctx: &MachineContext<'_>) -> Vec<String> {
    match find_hook(MEDIA_HOOKS, &ctx.config.name) {
        Some(hook) => hook(ctx),
        None => generic_media(ctx),
    }
}

/// Expansion slot and auto-boot switches placed after the media arguments
pub fn auxiliary_flags(ctx: &MachineContext<'_>) -> Vec<String> {
    let mut flags = Vec::new();

    if let Some(hook) = find_hook(SLOT_HOOKS, &ctx.config.name) {
        flags.extend(hook(ctx));
    }

    match find_hook(AUTOBOOT_HOOKS, &ctx.config.name) {
        Some(hook) => flags.extend(hook(ctx)),
        None => flags.extend(default_autoboot(ctx)),
    }

    flags
}

fn media_switch(media: &str) -> String {
    format!("-{}", media)
}

fn autoboot(delay: u32, command: impl Into<String>) -> Vec<String> {
    vec![
        "-autoboot_delay".to_string(),
        delay.to_string(),
        "-autoboot_command".to_string(),
        command.into(),
    ]
}

fn generic_media(ctx: &MachineContext<'_>) -> Vec<String> {
    let media = ctx
        .config
        .declared(ALT_ROM_TYPE)
        .unwrap_or(ctx.entry.media_type.as_str());
    vec![media_switch(media)]
}

fn macintosh_media(ctx: &MachineContext<'_>) -> Vec<String> {
    let Some(boot_disk) = ctx.config.declared(BOOT_DISK) else {
        return generic_media(ctx);
    };

    let floppy_boot = MAC_FLOPPY_BOOT_DISKS.contains(&boot_disk);
    let mut flags = if floppy_boot {
        vec![
            "-flop1".to_string(),
            ctx.paths
                .userdata_path(&format!("bios/{}.img", boot_disk))
                .to_string_lossy()
                .into_owned(),
        ]
    } else {
        vec![
            "-hard".to_string(),
            ctx.paths
                .userdata_path(&format!("bios/{}.chd", boot_disk))
                .to_string_lossy()
                .into_owned(),
        ]
    };

    // The boot floppy occupies the first drive, so the game moves to the second
    let alt_rom_type = ctx.config.declared(ALT_ROM_TYPE);
    if floppy_boot && alt_rom_type.is_none_or(|t| t == "flop1") {
        flags.push(media_switch("flop2"));
    } else {
        flags.extend(generic_media(ctx));
    }

    flags
}

fn ti99_slots(ctx: &MachineContext<'_>) -> Vec<String> {
    let mut flags = vec!["-ioport".to_string(), "peb".to_string()];

    if ctx.config.enabled(TI99_32K_RAM) {
        flags.extend(["-ioport:peb:slot2".to_string(), "32kmem".to_string()]);
    }
    if ctx.config.enabled(TI99_SPEECH) {
        flags.extend(["-ioport:peb:slot3".to_string(), "speech".to_string()]);
    }

    flags
}

fn bbc_autoboot(ctx: &MachineContext<'_>) -> Vec<String> {
    let alt_rom_type = ctx.config.declared(ALT_ROM_TYPE);

    if alt_rom_type.is_none() && ctx.soft_list.is_none() {
        return autoboot(3, BBC_DISK_BOOT);
    }

    if alt_rom_type == Some("cass") || ctx.soft_list_suffix("cass") {
        autoboot(2, BBC_TAPE_BOOT)
    } else if alt_rom_type.is_some_and(|t| t.starts_with("flop")) || ctx.soft_list_suffix("flop") {
        autoboot(3, BBC_DISK_BOOT)
    } else {
        Vec::new()
    }
}

fn fm7_autoboot(ctx: &MachineContext<'_>) -> Vec<String> {
    let alt_rom_type = ctx.config.declared(ALT_ROM_TYPE);

    if alt_rom_type == Some("cass") || ctx.soft_list_suffix("cass") {
        autoboot(5, FM7_TAPE_BOOT)
    } else {
        Vec::new()
    }
}

/// Catalog auto-run command, overridden per ROM by the software list's
/// auto-load table (last matching row wins)
fn default_autoboot(ctx: &MachineContext<'_>) -> Vec<String> {
    let mut command = ctx.entry.auto_run.clone();
    let table_path = ctx.paths.autoload_table(ctx.soft_list.unwrap_or(""));

    match std::fs::read_to_string(&table_path) {
        Ok(contents) => {
            let rom = ctx.rom_stem.to_lowercase();
            for (_, row) in table::rows(&contents) {
                if let [name, run, ..] = row.as_slice()
                    && name.to_lowercase() == rom
                {
                    command = format!("{}\\n", run);
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!("Could not read {}: {}", table_path.display(), e);
        }
    }

    if command.is_empty() {
        Vec::new()
    } else {
        autoboot(3, command)
    }
}
