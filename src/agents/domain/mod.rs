//! Domain types for the travel concierge
//!
//! Core abstractions shared by the router, the worker agents, and the
//! session/memory services.

mod message;
mod trip;

pub use message::*;
pub use trip::*;
