//! Durable VPN tunnel session state.
//!
//! The tunnel store keeps three independent slots so a VPN session owner
//! can resume or reconcile its tunnel after the hosting process is killed
//! and restarted:
//!
//! - connection info: an opaque JSON object describing the tunnel
//! - tunnel status: the last recorded [`TunnelStatus`]
//! - UDP support: whether the negotiated tunnel can carry UDP
//!
//! ```no_run
//! use tunnel_store::{ConnectionInfo, SqliteKv, TunnelStatus, TunnelStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = TunnelStore::new(SqliteKv::open("/var/lib/vpn/tunnel-store.db")?);
//! store.save(&ConnectionInfo::new().with("host", "203.0.113.7"))?;
//! store.set_tunnel_status(TunnelStatus::Connected)?;
//!
//! // After a restart
//! if store.snapshot()?.should_resume() {
//!     // bring the tunnel back up
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `kv`: key-value media (SQLite, JSON file, memory)
//! - `store`: the slot layer on top of a medium
//! - `config`: environment-driven backend selection

pub mod config;
pub mod error;
pub mod info;
pub mod kv;
pub mod logging;
pub mod status;
pub mod store;

pub use config::{Backend, StoreConfig};
pub use error::{StorageError, TunnelStoreError};
pub use info::{ConnectionInfo, TunnelConfig};
pub use kv::{FileKv, KeyValueStore, MemoryKv, SqliteKv};
pub use status::TunnelStatus;
pub use store::{
    TunnelSnapshot, TunnelStore, CONNECTION_INFO_KEY, TUNNEL_STATUS_KEY, UDP_SUPPORTED_KEY,
};
