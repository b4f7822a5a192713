//! Application state shared across routes

pub mod state;

pub use state::{AppState, SessionRegistry};
