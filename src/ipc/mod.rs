mod error;
mod handlers;
mod helpers;
mod router;
mod types;

pub use error::unparseable;
pub use router::handle_request;
pub use types::{AppState, Request};
