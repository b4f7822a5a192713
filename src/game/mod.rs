//! Game simulation modules

pub mod bots;
pub mod combat;
pub mod entities;
pub mod intents;
pub mod planets;
pub mod snapshot;
pub mod world;

pub use world::{GameWorld, WorldHandle};

use crate::ws::protocol::{ClientMsg, ServerMsg, SessionId};

/// World dimensions in world units.
pub const WORLD_WIDTH: f32 = 9600.0;
pub const WORLD_HEIGHT: f32 = 9600.0;

/// Default spawn point, at the world center.
pub const SPAWN_X: f32 = 4800.0;
pub const SPAWN_Y: f32 = 4800.0;

/// Entities this close to their destination have arrived.
pub const ARRIVE_DISTANCE: f32 = 5.0;

/// Euclidean distance between two world points.
pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (bx - ax).hypot(by - ay)
}

/// A client message (or the end of the connection) forwarded to the world
/// task by a session's reader.
#[derive(Debug, Clone)]
pub struct PlayerCommand {
    pub session_id: SessionId,
    pub msg: SessionMsg,
}

/// What a session can feed into the simulation.
#[derive(Debug, Clone)]
pub enum SessionMsg {
    Client(ClientMsg),
    /// The socket closed or errored; treat like a leave.
    Disconnected,
}

/// A routed outbound message. Every connection's writer subscribes to one
/// broadcast stream and applies the routing itself.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Deliver to every connected session.
    Broadcast(ServerMsg),
    /// Deliver to exactly one session.
    To(SessionId, ServerMsg),
    /// Deliver to everyone except one session.
    Except(SessionId, ServerMsg),
    /// Tell one session's writer to close the connection.
    Disconnect(SessionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(distance(10.0, 10.0, 10.0, 10.0), 0.0);
    }
}
