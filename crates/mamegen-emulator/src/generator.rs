//! Launch configuration generator

use crate::bezel::{BezelComposer, BezelLookup};
use crate::catalog::SystemCatalog;
use crate::command::{self, CommandDescriptor};
use crate::controls::ControlSchemeResolver;
use crate::geometry::{ListXmlProbe, MachineProbe};
use crate::pads::{PadConfigRequest, PadConfigWriter, PlayerController};
use crate::{GeneratorError, Resolution};
use mamegen_config::options::{ALT_DPAD, BEZEL, CUSTOM_CFG, FORCE_NO_BEZEL};
use mamegen_config::{GeneratorSettings, MamePaths, SystemConfig};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Builds emulator command lines and prepares the files they depend on
pub struct MameGenerator {
    paths: MamePaths,
    catalog: SystemCatalog,
    pads: Box<dyn PadConfigWriter>,
    bezels: Box<dyn BezelLookup>,
    probe: Box<dyn MachineProbe>,
}

impl MameGenerator {
    /// Create a generator from an already loaded catalog
    pub fn new(
        paths: MamePaths,
        catalog: SystemCatalog,
        pads: Box<dyn PadConfigWriter>,
        bezels: Box<dyn BezelLookup>,
    ) -> Self {
        let probe = Box::new(ListXmlProbe::from_paths(&paths));
        Self {
            paths,
            catalog,
            pads,
            bezels,
            probe,
        }
    }

    /// Create a generator for a deployment, loading its system table
    pub fn from_settings(
        settings: &GeneratorSettings,
        pads: Box<dyn PadConfigWriter>,
        bezels: Box<dyn BezelLookup>,
    ) -> Result<Self, GeneratorError> {
        let paths = settings.paths.clone();
        let catalog = SystemCatalog::load(&paths.system_table())?;
        Ok(Self::new(paths, catalog, pads, bezels))
    }

    /// Replace the geometry probe
    pub fn with_probe(mut self, probe: Box<dyn MachineProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn paths(&self) -> &MamePaths {
        &self.paths
    }

    pub fn catalog(&self) -> &SystemCatalog {
        &self.catalog
    }

    /// Build the command for a launch.
    ///
    /// Creates the user directories, stages software-list links, writes the
    /// controller config and the bezel artwork. Bezel problems never fail the
    /// launch on the first attempt.
    pub fn generate(
        &self,
        config: &SystemConfig,
        rom: &Path,
        controllers: &[PlayerController],
        resolution: Resolution,
    ) -> Result<CommandDescriptor, GeneratorError> {
        let paths = &self.paths;
        let classification = self.catalog.classification(&config.name);
        let variant = classification.variant();

        tracing::info!(
            "Generating {} launch for {} on {} ({}x{})",
            variant.name(),
            rom.display(),
            config.name,
            resolution.width,
            resolution.height
        );

        for dir in paths.user_directories() {
            fs::create_dir_all(&dir)?;
        }

        let rom_file_name = rom
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let soft_list = command::active_soft_list(config, classification);
        let rom_dir = command::rom_directory(rom);

        let mut args = command::rom_path_flags(paths, classification, soft_list, rom_dir);
        args.extend(command::resource_flags(paths));

        let config_dir =
            command::config_directory(paths, config, classification, &rom_file_name);
        fs::create_dir_all(&config_dir)?;
        tracing::info!("Config directory: {}", config_dir.display());

        args.extend(command::directory_flags(paths, &config_dir, soft_list));
        args.extend(command::video_flags(config));
        args.extend(command::switchres_flags(config));
        args.extend(command::optional_flags(config));

        let media = command::media_arguments(paths, config, classification, soft_list, rom);
        if let Some(staging) = &media.staging {
            staging.stage(paths)?;
        }
        args.extend(media.args);

        let machine = classification.machine();
        let button_layout = ControlSchemeResolver::new(paths).resolve(config, &rom_file_name);
        tracing::info!("Button layout: {}", button_layout);

        self.pads.write_pads(&PadConfigRequest {
            config_dir: &config_dir,
            controllers,
            machine,
            dpad_mode: config.text(ALT_DPAD).value(),
            button_layout,
            custom_config: config.enabled(CUSTOM_CFG),
        })?;

        self.write_bezel(config, rom, machine)?;

        let mut env = BTreeMap::new();
        env.insert(
            "PWD".to_string(),
            format!("{}/", paths.emulator_dir.to_string_lossy().trim_end_matches('/')),
        );
        env.insert(
            "XDG_CONFIG_HOME".to_string(),
            paths.config_home().to_string_lossy().into_owned(),
        );
        env.insert(
            "XDG_CACHE_HOME".to_string(),
            paths.cache_home().to_string_lossy().into_owned(),
        );

        Ok(CommandDescriptor {
            program: variant.binary(paths),
            args,
            env,
        })
    }

    fn write_bezel(
        &self,
        config: &SystemConfig,
        rom: &Path,
        machine: &str,
    ) -> Result<(), GeneratorError> {
        let bezel_set = if config.enabled(FORCE_NO_BEZEL) {
            None
        } else {
            config.declared(BEZEL)
        };

        let composer = BezelComposer::new(&self.paths, self.bezels.as_ref(), self.probe.as_ref());

        match composer.write(bezel_set, config, rom, machine) {
            Ok(outcome) => {
                tracing::info!("Bezel: {:?}", outcome);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Bezel setup failed, retrying without bezel: {}", e);
                composer.write(None, config, rom, machine).map(|_| ())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BezelSpec;
    use crate::GeometryInfo;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Default, Clone)]
    struct RecordingPads(Rc<RefCell<Vec<(String, String, String, bool)>>>);

    impl PadConfigWriter for RecordingPads {
        fn write_pads(&self, request: &PadConfigRequest<'_>) -> Result<(), GeneratorError> {
            self.0.borrow_mut().push((
                request.machine.to_string(),
                request.dpad_mode.to_string(),
                request.button_layout.to_string(),
                request.custom_config,
            ));
            Ok(())
        }
    }

    struct NoBezels;

    impl BezelLookup for NoBezels {
        fn lookup(
            &self,
            _rom: &Path,
            _bezel_set: &str,
            _system: &str,
        ) -> Result<Option<BezelSpec>, GeneratorError> {
            Ok(None)
        }
    }

    struct FlatProbe;

    impl MachineProbe for FlatProbe {
        fn probe(&self, _machine: &str) -> Result<GeometryInfo, GeneratorError> {
            Ok(GeometryInfo::default())
        }
    }

    fn generator(temp: &TempDir, pads: RecordingPads) -> MameGenerator {
        let paths = MamePaths::rooted_at(temp.path());
        let catalog = SystemCatalog::parse("ti99;ti99_4a;cart;\nbbc;bbcb;flop1;\nvgmplay;;vgm;\n")
            .unwrap();
        MameGenerator::new(paths, catalog, Box::new(pads), Box::new(NoBezels))
            .with_probe(Box::new(FlatProbe))
    }

    #[test]
    fn test_arcade_launch() {
        let temp = TempDir::new().unwrap();
        let pads = RecordingPads::default();
        let generator = generator(&temp, pads.clone());

        let cmd = generator
            .generate(
                &SystemConfig::new("mame"),
                Path::new("/roms/mame/sf2.zip"),
                &[],
                Resolution::default(),
            )
            .unwrap();

        assert_eq!(cmd.program, generator.paths().mame_binary());
        assert_eq!(cmd.args[0], "-skip_gameinfo");
        assert_eq!(cmd.value_of("-rompath"), Some("/roms/mame"));
        assert!(cmd.args.ends_with(&[
            "sf2.zip".to_string(),
            "-plugins".to_string(),
            "-plugin".to_string(),
            "hiscore".to_string()
        ]));
        assert!(!cmd.has_flag("-swpath"));

        let recorded = pads.0.borrow();
        assert_eq!(recorded[0], ("".to_string(), "0".to_string(), "default".to_string(), false));
    }

    #[test]
    fn test_user_directories_created() {
        let temp = TempDir::new().unwrap();
        let generator = generator(&temp, RecordingPads::default());

        generator
            .generate(
                &SystemConfig::new("bbc").with_option("customcfg", "1"),
                Path::new("/roms/bbc/elite.ssd"),
                &[],
                Resolution::default(),
            )
            .unwrap();

        for dir in generator.paths().user_directories() {
            assert!(dir.is_dir(), "{} missing", dir.display());
        }
        assert!(generator.paths().mame_config_dir().join("bbcb/custom").is_dir());
    }

    #[test]
    fn test_argument_order() {
        let temp = TempDir::new().unwrap();
        let generator = generator(&temp, RecordingPads::default());

        let cmd = generator
            .generate(
                &SystemConfig::new("ti99"),
                Path::new("/roms/ti99/parsec.rpk"),
                &[],
                Resolution::default(),
            )
            .unwrap();

        let order = [
            "-rompath",
            "-artpath",
            "-nvram_directory",
            "-cfg_directory",
            "-crosshairpath",
            "-video",
            "-nomodeline_generation",
            "-ui_active",
            "ti99_4a",
            "-cart",
            "-ioport",
        ];
        let positions: Vec<usize> = order.iter().map(|f| cmd.position(f).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", cmd.args);
    }

    #[test]
    fn test_environment() {
        let temp = TempDir::new().unwrap();
        let generator = generator(&temp, RecordingPads::default());

        let cmd = generator
            .generate(
                &SystemConfig::new("vgmplay"),
                Path::new("/roms/vgmplay/song.vgz"),
                &[],
                Resolution::default(),
            )
            .unwrap();

        let paths = generator.paths();
        assert_eq!(cmd.program, paths.vgmplay_binary());
        assert_eq!(
            cmd.env.get("PWD").map(String::as_str),
            Some(format!("{}/", paths.emulator_dir.display()).as_str())
        );
        assert_eq!(
            cmd.env.get("XDG_CONFIG_HOME"),
            Some(&paths.config_home().to_string_lossy().into_owned())
        );
        assert_eq!(
            cmd.env.get("XDG_CACHE_HOME"),
            Some(&paths.cache_home().to_string_lossy().into_owned())
        );
    }

    #[test]
    fn test_missing_system_table_is_fatal() {
        let temp = TempDir::new().unwrap();
        let settings = GeneratorSettings {
            paths: MamePaths::rooted_at(temp.path()),
        };

        let result = MameGenerator::from_settings(
            &settings,
            Box::new(RecordingPads::default()),
            Box::new(NoBezels),
        );
        assert!(matches!(result, Err(GeneratorError::ConfigLoad(_))));
    }
}
