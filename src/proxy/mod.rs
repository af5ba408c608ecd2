//! Proxy Module
//!
//! Origin communication, the per-connection state machine and the accept
//! loop that ties them to the shared cache.

pub mod handler;
pub mod origin;
pub mod server;

pub use handler::{ConnectionHandler, Outcome};
pub use origin::{Origin, TcpOrigin};
pub use server::ProxyServer;
