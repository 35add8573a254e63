//! Machine screen geometry
//!
//! Asks the emulator to describe a machine (`-listxml`) and reads the first
//! display element of the answer.

use crate::GeneratorError;
use mamegen_config::MamePaths;
use std::path::PathBuf;
use std::process::Command;

/// Native screen size and orientation of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryInfo {
    /// Width in pixels, 0 for vector displays
    pub width: u32,
    /// Height in pixels, 0 for vector displays
    pub height: u32,
    /// Rotation in degrees (0, 90, 180 or 270)
    pub rotation: u32,
}

impl GeometryInfo {
    /// Whether the screen is mounted portrait
    pub fn is_vertical(&self) -> bool {
        matches!(self.rotation, 90 | 270)
    }
}

/// Source of machine geometry
pub trait MachineProbe {
    fn probe(&self, machine: &str) -> Result<GeometryInfo, GeneratorError>;
}

/// Probe backed by the emulator's `-listxml` mode
#[derive(Debug, Clone)]
pub struct ListXmlProbe {
    binary: PathBuf,
}

impl ListXmlProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Use the installed arcade binary, or `mame` from `PATH` when the
    /// configured one is missing
    pub fn from_paths(paths: &MamePaths) -> Self {
        let binary = paths.mame_binary();
        if binary.exists() {
            return Self::new(binary);
        }

        match which::which("mame") {
            Ok(found) => {
                tracing::debug!("Using {} for geometry probes", found.display());
                Self::new(found)
            }
            Err(_) => Self::new(binary),
        }
    }
}

impl MachineProbe for ListXmlProbe {
    fn probe(&self, machine: &str) -> Result<GeometryInfo, GeneratorError> {
        tracing::debug!("Probing geometry of {}", machine);

        // Blocks until the emulator exits
        let output = Command::new(&self.binary)
            .args(["-listxml", machine])
            .output()
            .map_err(|e| {
                GeneratorError::Probe(format!("{} -listxml {}: {}", self.binary.display(), machine, e))
            })?;

        if !output.status.success() {
            return Err(GeneratorError::Probe(format!(
                "{} -listxml {} exited with {}",
                self.binary.display(),
                machine,
                output.status
            )));
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        parse_display(&xml)
            .ok_or_else(|| GeneratorError::Probe("display element not found".to_string()))
    }
}

/// Geometry from the first `<display>` element of a machine listing
pub fn parse_display(xml: &str) -> Option<GeometryInfo> {
    let start = xml.find("<display ")?;
    let rest = &xml[start..];
    let tag = &rest[..rest.find('>')?];

    let number = |name: &str| {
        attribute(tag, name)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0)
    };

    Some(GeometryInfo {
        width: number("width"),
        height: number("height"),
        rotation: number("rotate"),
    })
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<?xml version="1.0"?>
<mame build="0.261">
	<machine name="galaga" sourcefile="namco/galaga.cpp">
		<description>Galaga (Namco rev. B)</description>
		<chip type="cpu" tag="maincpu" name="Z80" clock="3072000"/>
		<display tag="screen" type="raster" rotate="90" width="288" height="224" refresh="60.606061" />
		<display tag="screen2" type="raster" rotate="0" width="640" height="480" refresh="60" />
	</machine>
</mame>
"#;

    #[test]
    fn test_parse_first_display() {
        let info = parse_display(LISTING).unwrap();
        assert_eq!(
            info,
            GeometryInfo {
                width: 288,
                height: 224,
                rotation: 90
            }
        );
        assert!(info.is_vertical());
    }

    #[test]
    fn test_vector_display_has_no_size() {
        let xml = r#"<display tag="screen" type="vector" rotate="0" flipx="yes" refresh="40" />"#;
        let info = parse_display(xml).unwrap();
        assert_eq!((info.width, info.height), (0, 0));
        assert!(!info.is_vertical());
    }

    #[test]
    fn test_no_display_element() {
        assert!(parse_display("<mame><machine name=\"x\"></machine></mame>").is_none());
    }

    #[test]
    fn test_missing_binary_is_probe_error() {
        let probe = ListXmlProbe::new("/nonexistent/mame");
        assert!(matches!(probe.probe("galaga"), Err(GeneratorError::Probe(_))));
    }

    #[test]
    fn test_failing_binary_is_probe_error() {
        let probe = ListXmlProbe::new("false");
        assert!(matches!(probe.probe("galaga"), Err(GeneratorError::Probe(_))));
    }
}
