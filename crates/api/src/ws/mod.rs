//! Status notification sockets.
//!
//! Browsers connect to `/api/v1/ws` and receive every event for the topics
//! they are subscribed to (all known topics by default). The heartbeat
//! pings clients and drops the ones that stopped answering.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
