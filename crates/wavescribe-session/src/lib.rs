pub mod driver;
pub mod protocol;
pub mod transport;

pub use driver::{SessionDriver, SessionState};
pub use protocol::{ServerReply, EOF_MARKER};
pub use transport::{Transport, WsTransport};
