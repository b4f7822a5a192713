//! Warpath 97 - authoritative multiplayer space game server
//!
//! Clients connect over WebSockets and exchange JSON event frames with a
//! single 60 Hz world task that owns every entity: players, bots, planets
//! and projectiles. The HTTP surface is limited to a health endpoint and
//! the WebSocket upgrade.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod util;
pub mod ws;
