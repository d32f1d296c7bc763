pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the handlers the binary needs to build the router.
pub use rest::{get_theme_handler, put_theme_handler};
pub use ws_handler::ws_handler;
