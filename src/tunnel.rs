use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TunnelKey(pub(crate) u64);

impl fmt::Display for TunnelKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "tunnel#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TunnelStatus {
    Waiting,
    Inactive,
    Activating,
    Active,
    Deactivating,
    Reasserting,
    Restarting,
}

impl TunnelStatus {
    pub const ALL: [TunnelStatus; 7] = [
        Self::Waiting,
        Self::Inactive,
        Self::Activating,
        Self::Active,
        Self::Deactivating,
        Self::Reasserting,
        Self::Restarting,
    ];

    /// Whether a tunnel row in this state is drawn with a checkmark.
    pub fn shows_checkmark(self) -> bool {
        !matches!(self, Self::Inactive | Self::Deactivating)
    }

    /// Everything except `inactive` and `waiting` holds the tunnel's network
    /// extension up, which blocks activating any other tunnel.
    pub fn is_operational(self) -> bool {
        !matches!(self, Self::Inactive | Self::Waiting)
    }

    pub fn localization_key(self) -> &'static str {
        match self {
            Self::Waiting => "status.waiting",
            Self::Inactive => "status.inactive",
            Self::Activating => "status.activating",
            Self::Active => "status.active",
            Self::Deactivating => "status.deactivating",
            Self::Reasserting => "status.reasserting",
            Self::Restarting => "status.restarting",
        }
    }
}

impl fmt::Display for TunnelStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Waiting => "waiting",
            Self::Inactive => "inactive",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Deactivating => "deactivating",
            Self::Reasserting => "reasserting",
            Self::Restarting => "restarting",
        };
        formatter.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tunnel {
    key: TunnelKey,
    name: String,
    status: TunnelStatus,
    addresses: Vec<String>,
}

impl Tunnel {
    pub(crate) fn new(key: TunnelKey, name: String, addresses: Vec<String>) -> Self {
        Self {
            key,
            name,
            status: TunnelStatus::Inactive,
            addresses,
        }
    }

    pub fn key(&self) -> TunnelKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> TunnelStatus {
        self.status
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_addresses(&mut self, addresses: Vec<String>) {
        self.addresses = addresses;
    }

    pub(crate) fn set_status(&mut self, status: TunnelStatus) {
        self.status = status;
    }
}
