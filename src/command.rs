//! Inbound command surface: `{"command": ..., "data": ...}` requests in,
//! `{"command": ..., "response": ...}` out.

mod dispatch;
mod request;

pub use dispatch::{Response, handle_request};
pub use request::Command;

#[cfg(test)]
mod tests;
