//! # AE Bridge Core
//!
//! Client side of a remote-object bridge to Adobe After Effects:
//! - an HTTP transport to the ExtendScript panel endpoint
//! - a session that registers host objects and hands back descriptors
//! - typed proxies for the After Effects object model
//!
//! ```no_run
//! use aebridge_core::{BridgeConfig, ItemLike, Session};
//!
//! # fn main() -> aebridge_core::Result<()> {
//! let session = Session::connect(BridgeConfig::default())?;
//! let app = session.application()?;
//! if let Some(project) = app.open(Some("/projects/shot_010.aep"), Some(false))? {
//!     for comp in project.compositions()? {
//!         println!("{}", comp.name()?);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod codec;
pub mod collection;
pub mod config;
pub mod dispatch;
pub mod enums;
pub mod error;
pub mod objects;
pub mod proxy;
pub mod session;
pub mod transport;

pub use codec::{hex_to_rgb, ObjectDescriptor, RemoteId, Value};
pub use collection::{CollectionIter, RemoteCollection};
pub use config::BridgeConfig;
pub use dispatch::AnyObject;
pub use error::{BridgeError, Result};
pub use objects::*;
pub use proxy::{Handle, Remote, RemoteObject};
pub use session::Session;
pub use transport::{HttpTransport, Transport};

/// Bridge version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for bridge components
pub fn init_tracing() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "aebridge_core=info".parse() {
        filter = filter.add_directive(directive);
    }
    // A subscriber installed by the embedding application wins
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
