//! Player intent validation and application. Every client message lands
//! here; anything invalid is rejected with a targeted event or dropped
//! without touching world state.

use tracing::{debug, info, warn};

use crate::game::combat::CombatSystem;
use crate::game::combat::WeaponSpec;
use crate::game::entities::{CargoHold, Player};
use crate::game::planets::EXTRACTION_RANGE;
use crate::game::snapshot;
use crate::game::world::WorldState;
use crate::game::{distance, SPAWN_X, SPAWN_Y, WORLD_HEIGHT, WORLD_WIDTH};
use crate::util::time::unix_millis;
use crate::ws::protocol::{
    ActorId, ClientMsg, PlayerDto, PlayerUpdate, Point, ProjectileDto, ServerMsg, SessionId,
    WeaponKind,
};

/// Longest accepted display name, in characters.
pub const MAX_NAME_LENGTH: usize = 24;
/// Chat messages are cut at this many characters.
pub const MAX_CHAT_LENGTH: usize = 100;
/// Credits paid per cargo unit sold at the base.
pub const CARGO_UNIT_SALE_PRICE: u32 = 10;

/// Applies client intents to the world.
pub struct IntentHandler;

impl IntentHandler {
    /// Validates and applies one client message. Any message from a live
    /// session counts as activity for the liveness sweep.
    pub fn handle(state: &mut WorldState, session: SessionId, msg: ClientMsg) {
        if let Some(player) = state.store.player_mut(session) {
            player.refresh_activity();
        }

        match msg {
            ClientMsg::Init {
                name,
                x,
                y,
                rotation,
            } => Self::init(state, session, name, x, y, rotation),
            ClientMsg::Move {
                target,
                rotation,
                speed,
            } => Self::apply_move(state, session, target, rotation, speed),
            ClientMsg::Shoot { rotation, kind } => Self::shoot(state, session, kind, rotation),
            ClientMsg::BuyWeapon { kind } => Self::buy_weapon(state, session, &kind),
            ClientMsg::ExtractResources { planet_id, amount } => {
                Self::extract_resources(state, session, planet_id, amount)
            }
            ClientMsg::UnloadCargo { .. } => Self::unload_cargo(state, session),
            ClientMsg::PurchaseCargoSlot { slot_id, .. } => {
                Self::purchase_cargo_slot(state, session, &slot_id)
            }
            ClientMsg::Chat { message } => Self::chat(state, session, message),
            ClientMsg::Restart => Self::restart(state, session),
            // Nothing to do beyond the activity refresh above.
            ClientMsg::Heartbeat => {}
        }
    }

    /// The session's socket closed or was evicted; removes the player and
    /// tells everyone who is left.
    pub fn handle_disconnect(state: &mut WorldState, session: SessionId) {
        Self::remove_player(state, session, true);
    }

    fn init(
        state: &mut WorldState,
        session: SessionId,
        name: String,
        x: Option<f32>,
        y: Option<f32>,
        rotation: Option<f32>,
    ) {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
            warn!(session = %session, "rejected invalid player name");
            state.outbox.to(
                session,
                ServerMsg::Error {
                    message: "Invalid player name".to_string(),
                },
            );
            return;
        }

        // An active player already using this name loses the seat: their
        // session is closed and their departure announced before the new
        // player exists.
        if let Some(existing) = state.store.player_by_name(name) {
            if existing.id != session {
                let old_id = existing.id;
                info!(session = %old_id, name, "kicking session, display name taken over");
                state.outbox.disconnect(old_id);
                Self::remove_player(state, old_id, false);
            }
        }

        let x = x
            .filter(|v| v.is_finite())
            .unwrap_or(SPAWN_X)
            .clamp(0.0, WORLD_WIDTH);
        let y = y
            .filter(|v| v.is_finite())
            .unwrap_or(SPAWN_Y)
            .clamp(0.0, WORLD_HEIGHT);
        let rotation = rotation.filter(|v| v.is_finite()).unwrap_or(0.0);

        let player = Player::new(session, name.to_string(), x, y, rotation);
        let dto = PlayerDto::from(&player);
        state.store.insert_player(player);
        info!(session = %session, name, x, y, "player joined");

        state
            .outbox
            .except(session, ServerMsg::PlayerJoined(dto));
        if let Some(current) = state.store.player(session) {
            let full = snapshot::build_game_state(&state.store, &state.planets, current);
            state
                .outbox
                .to(session, ServerMsg::GameState(Box::new(full)));
        }
    }

    fn apply_move(
        state: &mut WorldState,
        session: SessionId,
        target: Option<Point>,
        rotation: f32,
        speed: f32,
    ) {
        if !rotation.is_finite() || !speed.is_finite() {
            debug!(session = %session, "dropped non-finite move");
            return;
        }
        if let Some(t) = target {
            if !t.x.is_finite() || !t.y.is_finite() {
                debug!(session = %session, "dropped non-finite move target");
                return;
            }
        }

        let Some(player) = state.store.player_mut(session) else {
            return;
        };
        if player.destroyed {
            return;
        }

        player.rotation = rotation;
        player.speed = speed.clamp(0.0, player.max_speed);
        player.target = target.map(|t| {
            Point::new(
                t.x.clamp(0.0, WORLD_WIDTH),
                t.y.clamp(0.0, WORLD_HEIGHT),
            )
        });

        let update = PlayerUpdate::movement(
            session,
            player.x,
            player.y,
            player.rotation,
            player.speed,
            player.target,
        );
        state.outbox.broadcast(ServerMsg::PlayerUpdated(update));
    }

    fn shoot(state: &mut WorldState, session: SessionId, kind: WeaponKind, rotation: f32) {
        if !rotation.is_finite() {
            return;
        }
        let now = unix_millis();
        let Some(player) = state.store.player(session) else {
            return;
        };
        if player.destroyed || !player.weapons.owns(kind) {
            return;
        }

        let remaining = CombatSystem::cooldown_remaining(player.last_shot.get(kind), kind, now);
        if remaining > 0 {
            state.outbox.to(
                session,
                ServerMsg::WeaponCooldown {
                    kind,
                    remaining_time: remaining,
                },
            );
            return;
        }

        let (x, y) = (player.x, player.y);
        // Missiles lock onto whatever is closest at launch.
        let target = if kind == WeaponKind::Missile {
            CombatSystem::nearest_target(&state.store, x, y, ActorId::Player(session))
        } else {
            None
        };

        let Some(player) = state.store.player_mut(session) else {
            return;
        };
        player.last_shot.set(kind, now);
        let shot = CombatSystem::player_projectile(player, kind, rotation, target);
        let dto = ProjectileDto::from(&shot);
        state.store.add_projectile(shot);
        state.outbox.broadcast(ServerMsg::ProjectileCreated(dto));
        debug!(session = %session, weapon = kind.as_str(), "projectile fired");
    }

    fn buy_weapon(state: &mut WorldState, session: SessionId, kind: &str) {
        let Some(kind) = WeaponKind::from_name(kind) else {
            state.outbox.to(
                session,
                ServerMsg::PurchaseFailed {
                    message: "Unknown weapon type".to_string(),
                },
            );
            return;
        };
        let Some(player) = state.store.player_mut(session) else {
            state.outbox.to(
                session,
                ServerMsg::PurchaseFailed {
                    message: "Player not found".to_string(),
                },
            );
            return;
        };
        if player.weapons.owns(kind) {
            state.outbox.to(
                session,
                ServerMsg::PurchaseFailed {
                    message: "Weapon already owned".to_string(),
                },
            );
            return;
        }
        let price = WeaponSpec::for_kind(kind).price;
        if player.credits < price {
            state.outbox.to(
                session,
                ServerMsg::PurchaseFailed {
                    message: "Not enough credits".to_string(),
                },
            );
            return;
        }

        player.credits -= price;
        player.weapons.grant(kind);
        player.last_shot.set(kind, 0);
        let credits = player.credits;
        let weapons = player.weapons.into();
        debug!(session = %session, weapon = kind.as_str(), credits, "weapon purchased");
        state.outbox.to(
            session,
            ServerMsg::WeaponPurchased {
                kind,
                credits,
                weapons,
            },
        );
    }

    fn extract_resources(
        state: &mut WorldState,
        session: SessionId,
        planet_id: String,
        amount: u32,
    ) {
        let Some(player) = state.store.player(session) else {
            return;
        };
        let (x, y, free) = (player.x, player.y, player.cargo.free_space());
        let Some(planet) = state.planets.get(&planet_id) else {
            return;
        };
        if distance(x, y, planet.x, planet.y) > EXTRACTION_RANGE {
            return;
        }
        if amount == 0 || free == 0 || planet.resources < 1.0 {
            return;
        }

        let taken = state.planets.extract(&planet_id, amount.min(free));
        if taken == 0 {
            return;
        }
        let Some(player) = state.store.player_mut(session) else {
            return;
        };
        player.cargo.store(taken);
        let cargo_slots = (&player.cargo).into();
        let planet_resources = state
            .planets
            .get(&planet_id)
            .map_or(0.0, |p| p.resources);
        debug!(session = %session, planet = %planet_id, taken, "resources extracted");
        state.outbox.to(
            session,
            ServerMsg::ResourcesExtracted {
                planet_id,
                planet_resources,
                cargo_slots,
            },
        );
    }

    fn unload_cargo(state: &mut WorldState, session: SessionId) {
        let Some(player) = state.store.player_mut(session) else {
            return;
        };
        let units = player.cargo.drain();
        let earned = units * CARGO_UNIT_SALE_PRICE;
        player.credits = player.credits.saturating_add(earned);
        debug!(session = %session, units, earned, "cargo unloaded");

        let update = PlayerUpdate::cargo(session, player.credits, (&player.cargo).into());
        state.outbox.broadcast(ServerMsg::PlayerUpdated(update));
    }

    fn purchase_cargo_slot(state: &mut WorldState, session: SessionId, slot_id: &str) {
        let Some(index) = CargoHold::slot_index(slot_id) else {
            state.outbox.to(
                session,
                ServerMsg::PurchaseFailed {
                    message: "Unknown cargo slot".to_string(),
                },
            );
            return;
        };
        let Some(player) = state.store.player_mut(session) else {
            state.outbox.to(
                session,
                ServerMsg::PurchaseFailed {
                    message: "Player not found".to_string(),
                },
            );
            return;
        };
        if player.cargo.slot(index).is_some_and(|slot| slot.unlocked) {
            state.outbox.to(
                session,
                ServerMsg::PurchaseFailed {
                    message: "Slot already unlocked".to_string(),
                },
            );
            return;
        }
        let price = CargoHold::slot_price(index);
        if player.credits < price {
            state.outbox.to(
                session,
                ServerMsg::PurchaseFailed {
                    message: "Not enough credits".to_string(),
                },
            );
            return;
        }

        player.credits -= price;
        player.cargo.unlock(index);
        let update = PlayerUpdate::cargo(session, player.credits, (&player.cargo).into());
        debug!(session = %session, slot = slot_id, price, "cargo slot unlocked");
        state.outbox.broadcast(ServerMsg::PlayerUpdated(update));
    }

    fn chat(state: &mut WorldState, session: SessionId, message: String) {
        let Some(player) = state.store.player(session) else {
            return;
        };
        if player.destroyed {
            return;
        }
        let message: String = message.chars().take(MAX_CHAT_LENGTH).collect();
        state.outbox.broadcast(ServerMsg::ChatMessage {
            player_id: session,
            message,
        });
    }

    fn restart(state: &mut WorldState, session: SessionId) {
        let Some(name) = state.store.player(session).map(|p| p.name.clone()) else {
            return;
        };

        // Wholesale replacement: back to the spawn point with starting
        // credits, no weapons and a bare hold.
        let player = Player::new(session, name, SPAWN_X, SPAWN_Y, 0.0);
        let dto = PlayerDto::from(&player);
        state.store.insert_player(player);
        info!(session = %session, "player restarted");

        state.outbox.broadcast(ServerMsg::PlayerRestarted(dto));
        if let Some(current) = state.store.player(session) {
            let full = snapshot::build_game_state(&state.store, &state.planets, current);
            state
                .outbox
                .to(session, ServerMsg::GameState(Box::new(full)));
        }
    }

    fn remove_player(state: &mut WorldState, session: SessionId, was_disconnect: bool) {
        let Some(player) = state.store.remove_player(session) else {
            return;
        };
        info!(session = %session, name = %player.name, was_disconnect, "player left");
        state.outbox.broadcast(ServerMsg::PlayerLeft {
            id: session,
            name: player.name,
            was_disconnect,
        });
        state
            .outbox
            .broadcast(ServerMsg::PlayersSync(snapshot::roster(&state.store)));
    }
}
