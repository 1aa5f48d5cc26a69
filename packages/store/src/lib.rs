pub mod config;
pub mod session;

mod memory;
pub use memory::MemorySessionStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod browser;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use browser::BrowserSessionStore;

pub use config::{ClientConfig, ConfigError};
pub use session::{SessionStore, StoredIdentity, DELEGATION_KEY, IDENTITY_KEY};
