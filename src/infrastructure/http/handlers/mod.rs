//! HTTP Handlers

mod book;
mod chapter;
mod export;
mod ping;
mod session;
mod snapshot;
mod websocket;

pub use book::*;
pub use chapter::*;
pub use export::*;
pub use ping::*;
pub use session::*;
pub use snapshot::*;
pub use websocket::*;
