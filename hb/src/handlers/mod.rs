//! Request handlers
//!
//! A handler turns the body of an incoming REQUEST into the body of its
//! RESPONSE. Handlers are registered per command name in a
//! [`HandlerRegistry`]; the host side of the bridge ships a few built-ins.

pub mod builtin;
mod registry;
mod traits;

pub use registry::HandlerRegistry;
pub use traits::{CommandHandler, FnHandler, RequestHandler, Typed, handler_fn};
