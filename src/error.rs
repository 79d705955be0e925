use thiserror::Error;

use crate::tunnel::TunnelKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("tunnel index {index} is out of range (tunnels: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{0} is no longer in the tunnel list")]
    StaleTunnel(TunnelKey),

    #[error("row {index} belongs to {found}, but the event refers to {expected}")]
    EventMismatch {
        index: usize,
        expected: TunnelKey,
        found: TunnelKey,
    },

    #[error("no tunnel named {0:?}")]
    UnknownTunnel(String),

    #[error("a tunnel named {0:?} already exists")]
    DuplicateName(String),

    #[error("menu position {0} is not a selectable item")]
    NotSelectable(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    #[error("tunnel {0:?} is not inactive")]
    NotInactive(String),

    #[error("{0} is no longer in the tunnel list")]
    StaleTunnel(TunnelKey),
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
#[error("script line {line}: {source}")]
pub struct ScriptError {
    pub line: usize,
    pub source: serde_json::Error,
}
