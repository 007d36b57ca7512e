pub mod jsonrpc;
pub mod router;
pub mod session;
pub mod tools;

pub use jsonrpc::{JsonRpcMessage, JsonRpcResponse};
pub use router::{dispatch_request, handle_notification};
pub use session::SessionManager;
