//! Tunnel session state store.
//!
//! Three independent slots are kept in a key-value medium so the session
//! owner can resume or reconcile the tunnel after the process is killed:
//! the connection info, the tunnel status and the UDP-support flag.

use tracing::debug;

use crate::error::TunnelStoreError;
use crate::info::{ConnectionInfo, TunnelConfig};
use crate::kv::KeyValueStore;
use crate::status::TunnelStatus;

/// Slot holding the serialized connection info.
pub const CONNECTION_INFO_KEY: &str = "connectionInfo";
/// Slot holding the tunnel status name.
pub const TUNNEL_STATUS_KEY: &str = "tunnelStatus";
/// Slot holding the UDP-support flag.
pub const UDP_SUPPORTED_KEY: &str = "udpSupported";

/// All three slots read at once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TunnelSnapshot {
    pub connection_info: Option<ConnectionInfo>,
    pub status: TunnelStatus,
    pub udp_supported: bool,
}

impl TunnelSnapshot {
    /// True when a tunnel was up at the time the process went away and
    /// there is enough recorded to bring it back.
    pub fn should_resume(&self) -> bool {
        self.connection_info.is_some() && self.status.is_active()
    }
}

/// Durable tunnel state over a key-value medium.
pub struct TunnelStore<K> {
    kv: K,
}

impl<K: KeyValueStore> TunnelStore<K> {
    pub fn new(kv: K) -> Self {
        debug!("Tunnel store opened");
        Self { kv }
    }

    /// Borrow the underlying medium.
    pub fn backend(&self) -> &K {
        &self.kv
    }

    /// Consume the store and return the medium.
    pub fn into_backend(self) -> K {
        self.kv
    }

    /// Persist the connection info, replacing any previous record.
    pub fn save(&self, info: &ConnectionInfo) -> Result<(), TunnelStoreError> {
        let json = info.to_json()?;
        self.kv.set(CONNECTION_INFO_KEY, &json)?;
        debug!(key = CONNECTION_INFO_KEY, fields = info.len(), "Saved connection info");
        Ok(())
    }

    /// Load the last saved connection info.
    ///
    /// Every call decodes a fresh value from the medium. Returns `None` if
    /// nothing was saved or the slot was cleared.
    pub fn load(&self) -> Result<Option<ConnectionInfo>, TunnelStoreError> {
        let Some(json) = self.kv.get(CONNECTION_INFO_KEY)? else {
            debug!(key = CONNECTION_INFO_KEY, "No connection info stored");
            return Ok(None);
        };

        let info: ConnectionInfo =
            serde_json::from_str(&json).map_err(|e| TunnelStoreError::CorruptSlot {
                key: CONNECTION_INFO_KEY,
                detail: format!(
                    "{} bytes, {:?} error at line {} column {}",
                    json.len(),
                    e.classify(),
                    e.line(),
                    e.column()
                ),
            })?;
        Ok(Some(info))
    }

    /// Persist a typed tunnel config as the connection info.
    pub fn save_config(&self, config: &TunnelConfig) -> Result<(), TunnelStoreError> {
        self.save(&config.to_info())
    }

    /// Load the connection info and read it as a tunnel config.
    pub fn load_config(&self) -> Result<Option<TunnelConfig>, TunnelStoreError> {
        self.load()?
            .map(|info| TunnelConfig::from_info(&info))
            .transpose()
    }

    pub fn set_tunnel_status(&self, status: TunnelStatus) -> Result<(), TunnelStoreError> {
        self.kv.set(TUNNEL_STATUS_KEY, status.as_str())?;
        debug!(key = TUNNEL_STATUS_KEY, %status, "Saved tunnel status");
        Ok(())
    }

    /// Last recorded status, or `Disconnected` if none was ever set.
    pub fn tunnel_status(&self) -> Result<TunnelStatus, TunnelStoreError> {
        match self.kv.get(TUNNEL_STATUS_KEY)? {
            None => Ok(TunnelStatus::default()),
            Some(name) => {
                TunnelStatus::from_name(&name).ok_or_else(|| TunnelStoreError::CorruptSlot {
                    key: TUNNEL_STATUS_KEY,
                    detail: format!("unknown status {name:?}"),
                })
            }
        }
    }

    pub fn set_udp_supported(&self, supported: bool) -> Result<(), TunnelStoreError> {
        let value = if supported { "true" } else { "false" };
        self.kv.set(UDP_SUPPORTED_KEY, value)?;
        debug!(key = UDP_SUPPORTED_KEY, supported, "Saved UDP support flag");
        Ok(())
    }

    /// Last recorded UDP-support flag, or `false` if none was ever set.
    pub fn is_udp_supported(&self) -> Result<bool, TunnelStoreError> {
        match self.kv.get(UDP_SUPPORTED_KEY)?.as_deref() {
            None => Ok(false),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(TunnelStoreError::CorruptSlot {
                key: UDP_SUPPORTED_KEY,
                detail: format!("expected true or false, got {other:?}"),
            }),
        }
    }

    /// Remove the connection info.
    ///
    /// Tunnel status and the UDP-support flag are left as they are.
    pub fn clear(&self) -> Result<(), TunnelStoreError> {
        self.kv.delete(CONNECTION_INFO_KEY)?;
        debug!(key = CONNECTION_INFO_KEY, "Cleared connection info");
        Ok(())
    }

    /// Read all three slots.
    pub fn snapshot(&self) -> Result<TunnelSnapshot, TunnelStoreError> {
        Ok(TunnelSnapshot {
            connection_info: self.load()?,
            status: self.tunnel_status()?,
            udp_supported: self.is_udp_supported()?,
        })
    }
}
