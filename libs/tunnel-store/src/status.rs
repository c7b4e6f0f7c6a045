//! Tunnel status as recorded by the session owner.

use std::fmt;

/// Last known state of the VPN tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TunnelStatus {
    /// No tunnel is up. Reported when nothing was ever recorded.
    #[default]
    Disconnected,
    /// Tunnel is being established.
    Connecting,
    /// Tunnel is up.
    Connected,
    /// Tunnel dropped and is being re-established.
    Reconnecting,
    /// Tunnel is being torn down.
    Disconnecting,
}

impl TunnelStatus {
    /// All statuses, in declaration order.
    pub const ALL: [TunnelStatus; 5] = [
        Self::Disconnected,
        Self::Connecting,
        Self::Connected,
        Self::Reconnecting,
        Self::Disconnecting,
    ];

    /// Stable persisted name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Reconnecting => "RECONNECTING",
            Self::Disconnecting => "DISCONNECTING",
        }
    }

    /// Parse a persisted name. Names are matched exactly.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "DISCONNECTED" => Some(Self::Disconnected),
            "CONNECTING" => Some(Self::Connecting),
            "CONNECTED" => Some(Self::Connected),
            "RECONNECTING" => Some(Self::Reconnecting),
            "DISCONNECTING" => Some(Self::Disconnecting),
            _ => None,
        }
    }

    /// Whether a tunnel in this state was meant to be carrying traffic.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connected | Self::Reconnecting)
    }
}

impl fmt::Display for TunnelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_name_roundtrip() {
        for status in TunnelStatus::ALL {
            let parsed = TunnelStatus::from_name(status.as_str()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_default_is_disconnected() {
        assert_eq!(TunnelStatus::default(), TunnelStatus::Disconnected);
    }

    #[test]
    fn test_status_names_are_exact() {
        assert_eq!(TunnelStatus::from_name("connected"), None);
        assert_eq!(TunnelStatus::from_name(" CONNECTED"), None);
        assert_eq!(TunnelStatus::from_name(""), None);
    }
}
