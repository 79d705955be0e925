use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigurationError, menu_item::RowRendering, strings::Strings};

const CONFIGURATION_FILE: &str = "menu.toml";

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct MenuConfiguration {
    #[serde(default)]
    pub tunnels_directory: Option<PathBuf>,
    #[serde(default)]
    pub max_title_graphemes: Option<usize>,
    #[serde(default)]
    pub strings: HashMap<String, String>,
}

impl MenuConfiguration {
    pub fn configuration_directory() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tunnel-menu")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::configuration_directory().join(CONFIGURATION_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(configuration) => {
                    log::info!("[configuration] loaded from {}", path.display());
                    configuration
                }
                Err(error) => {
                    log::warn!("[configuration] failed to parse {}: {error}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!(
                    "[configuration] no configuration at {}, using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn tunnels_directory(&self) -> PathBuf {
        self.tunnels_directory
            .clone()
            .unwrap_or_else(|| Self::configuration_directory().join("tunnels"))
    }

    pub fn strings(&self) -> Strings {
        Strings::with_overrides(&self.strings)
    }

    pub fn row_rendering(&self) -> RowRendering {
        RowRendering {
            max_title_graphemes: self.max_title_graphemes,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct TunnelFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl TunnelFile {
    pub fn from_path(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut tunnel: TunnelFile =
            toml::from_str(&content).map_err(|source| ConfigurationError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        if tunnel.name.trim().is_empty() {
            tunnel.name = file_stem(path);
        }
        Ok(tunnel)
    }

    pub fn into_entry(self) -> (String, Vec<String>) {
        (self.name, self.addresses)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unknown")
        .to_string()
}

pub fn scan_tunnels(directory: &Path) -> Vec<TunnelFile> {
    let mut result = Vec::new();

    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(error) => {
            log::warn!("[tunnels] failed to read {}: {error}", directory.display());
            return result;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|extension| extension.to_str()) != Some("toml") {
            continue;
        }
        if is_configuration_file(&path) {
            continue;
        }
        match TunnelFile::from_path(&path) {
            Ok(tunnel) => {
                log::debug!("[tunnels] loaded: {} ({})", tunnel.name, path.display());
                result.push(tunnel);
            }
            Err(error) => log::warn!("[tunnels] {error}"),
        }
    }

    result.sort_by_key(|tunnel| tunnel.name.to_lowercase());
    log::info!("[tunnels] found {} tunnel files", result.len());
    result
}

/// Copies a tunnel file into `directory`, named after the tunnel. An
/// identical existing file is reused; a different one gets a numeric suffix.
pub fn import_tunnel_file(source: &Path, directory: &Path) -> Result<PathBuf, ConfigurationError> {
    let tunnel = TunnelFile::from_path(source)?;
    let content = std::fs::read_to_string(source).map_err(|source_error| {
        ConfigurationError::Read {
            path: source.display().to_string(),
            source: source_error,
        }
    })?;

    std::fs::create_dir_all(directory).map_err(|source| ConfigurationError::Write {
        path: directory.display().to_string(),
        source,
    })?;

    let name = import_name(&tunnel.name, source);
    let mut destination = directory.join(format!("{name}.toml"));
    let mut counter = 1u32;
    while destination.exists() || is_configuration_file(&destination) {
        let existing = std::fs::read_to_string(&destination).unwrap_or_default();
        if existing == content && !is_configuration_file(&destination) {
            log::info!(
                "[tunnels] identical file already exists: {}",
                destination.display()
            );
            return Ok(destination);
        }
        destination = directory.join(format!("{name}_{counter}.toml"));
        counter += 1;
    }

    std::fs::write(&destination, &content).map_err(|source| ConfigurationError::Write {
        path: destination.display().to_string(),
        source,
    })?;

    log::info!(
        "[tunnels] imported {} -> {}",
        source.display(),
        destination.display()
    );
    Ok(destination)
}

/// Last path component of a tunnel name, so a name like `../x` cannot place
/// the file outside the tunnels directory.
fn import_name(name: &str, source: &Path) -> String {
    Path::new(name)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| file_stem(source))
}

fn is_configuration_file(path: &Path) -> bool {
    path.file_name().and_then(|name| name.to_str()) == Some(CONFIGURATION_FILE)
}
