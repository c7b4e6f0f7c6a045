//! Connection info records and the typed tunnel config view over them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TunnelStoreError;

/// Opaque description of the active or last-known tunnel.
///
/// The store never interprets the fields. An empty record is a valid value
/// and is distinct from "nothing stored".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionInfo {
    fields: Map<String, Value>,
}

impl ConnectionInfo {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the previous value if there was one.
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Builder-style `insert`.
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Encode to compact JSON. Keys come out sorted, so equal records
    /// always produce equal text.
    pub fn to_json(&self) -> Result<String, TunnelStoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON text. Anything other than an object is rejected.
    pub fn from_json(json: &str) -> Result<Self, TunnelStoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<Map<String, Value>> for ConnectionInfo {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for ConnectionInfo {
    type Error = TunnelStoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(TunnelStoreError::InvalidConfig(format!(
                "connection info must be a JSON object, got {other}"
            ))),
        }
    }
}

/// Proxy session parameters a tunnel is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelConfig {
    /// Tunnel instance identifier.
    pub id: String,
    pub host: String,
    pub port: u16,
    pub password: String,
    /// Cipher name.
    pub method: String,
    /// Optional salt prefix sent before the first packet.
    pub prefix: Option<String>,
}

impl TunnelConfig {
    /// Read a config out of a connection info record.
    ///
    /// `host`, `password` and `method` must be non-empty strings and `port`
    /// must be in 1..=65535. A missing `id` reads as an empty string.
    pub fn from_info(info: &ConnectionInfo) -> Result<Self, TunnelStoreError> {
        let port = match info.get("port").and_then(Value::as_u64) {
            Some(p @ 1..=65535) => p as u16,
            Some(p) => {
                return Err(TunnelStoreError::InvalidConfig(format!(
                    "port {p} out of range"
                )))
            }
            None => {
                return Err(TunnelStoreError::InvalidConfig(
                    "missing or non-numeric port".to_string(),
                ))
            }
        };

        let prefix = match info.get("prefix") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(TunnelStoreError::InvalidConfig(
                    "prefix must be a string".to_string(),
                ))
            }
        };

        Ok(Self {
            id: optional_str(info, "id")?.unwrap_or_default(),
            host: required_str(info, "host")?,
            port,
            password: required_str(info, "password")?,
            method: required_str(info, "method")?,
            prefix,
        })
    }

    /// Encode as a connection info record.
    pub fn to_info(&self) -> ConnectionInfo {
        let mut info = ConnectionInfo::new()
            .with("id", self.id.as_str())
            .with("host", self.host.as_str())
            .with("port", self.port)
            .with("password", self.password.as_str())
            .with("method", self.method.as_str());
        if let Some(prefix) = &self.prefix {
            info.insert("prefix", prefix.as_str());
        }
        info
    }
}

impl From<&TunnelConfig> for ConnectionInfo {
    fn from(config: &TunnelConfig) -> Self {
        config.to_info()
    }
}

impl TryFrom<&ConnectionInfo> for TunnelConfig {
    type Error = TunnelStoreError;

    fn try_from(info: &ConnectionInfo) -> Result<Self, Self::Error> {
        Self::from_info(info)
    }
}

fn optional_str(info: &ConnectionInfo, key: &str) -> Result<Option<String>, TunnelStoreError> {
    match info.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(TunnelStoreError::InvalidConfig(format!(
            "{key} must be a string"
        ))),
    }
}

fn required_str(info: &ConnectionInfo, key: &str) -> Result<String, TunnelStoreError> {
    match optional_str(info, key)? {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(TunnelStoreError::InvalidConfig(format!("missing {key}"))),
    }
}
