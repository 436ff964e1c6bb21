//! Protocol database: the handle/protocol registry a firmware driver talks to.
//!
//! This is the narrow waist below every driver in the workspace. Everything a
//! driver publishes or consumes is a typed interface identified by a GUID and
//! attached to an opaque [`Handle`]:
//! - [`Protocol`]: a marker type naming one interface (GUID + trait object type)
//! - [`ProtocolDatabase`]: install, fetch, and install-notification operations
//! - [`Registration`]: the cursor a driver holds to enumerate new installs
//!
//! Notify functions run at a [`Tpl`] and are serialized: a notify function is
//! never re-entered, and work it triggers is queued until it returns.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use efi_protocol_db::{Guid, InMemoryProtocolDatabase, Protocol, ProtocolDatabase};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> &'static str;
//! }
//!
//! struct GreeterProtocol;
//!
//! impl Protocol for GreeterProtocol {
//!     const GUID: Guid = Guid::from_u128(0x5f1c_7b1e_0d4a_4c55_9e61_2a3b_4c5d_6e7f);
//!     const NAME: &'static str = "Greeter";
//!     type Interface = dyn Greeter;
//! }
//!
//! struct Hello;
//!
//! impl Greeter for Hello {
//!     fn greet(&self) -> &'static str {
//!         "hello"
//!     }
//! }
//!
//! let db = InMemoryProtocolDatabase::new();
//! let handle = db.install_protocol::<GreeterProtocol>(None, Arc::new(Hello)).unwrap();
//! let greeter = db.handle_protocol::<GreeterProtocol>(handle).unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```

mod error;
mod guid;
mod in_memory;
mod traits;

pub use error::{Error, Result};
pub use guid::{Guid, Handle};
pub use in_memory::InMemoryProtocolDatabase;
pub use traits::{NotifyFn, Protocol, ProtocolDatabase, Registration, Tpl};
