//! Built-in host handlers

mod echo;
mod ping;
mod status_bar;

pub use echo::EchoHandler;
pub use ping::PingHandler;
pub use status_bar::StatusBarHandler;

use crate::commands::{Echo, Ping, UpdateStatusBar};
use crate::mediator::Mediator;

/// Commands answered by [`register_all`], with a short description
pub const BUILTIN_COMMANDS: &[(&str, &str)] = &[
    ("ECHO", "Return the request body unchanged"),
    ("PING", "Report the host bridge version"),
    ("UPDATE_STATUS_BAR", "Log progress reported by the UI"),
];

/// Register every built-in handler on `mediator`
pub fn register_all(mediator: &Mediator) {
    mediator
        .add_command::<Echo>(EchoHandler)
        .add_command::<Ping>(PingHandler::default())
        .add_command::<UpdateStatusBar>(StatusBarHandler);
}
