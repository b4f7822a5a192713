//! World state and the authoritative tick loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::info;

use crate::util::time::{tick_delta, unix_millis, TICK_DURATION_MICROS};
use crate::ws::protocol::{BotDto, PlayerUpdate, ProjectileDto, ServerMsg, SessionId};

use super::bots::BotSystem;
use super::combat::{CombatEvent, CombatSystem};
use super::entities::{EntityStore, MAX_SHIELD};
use super::intents::IntentHandler;
use super::planets::Planets;
use super::{
    distance, Outbound, PlayerCommand, SessionMsg, ARRIVE_DISTANCE, WORLD_HEIGHT, WORLD_WIDTH,
};

/// Shield points restored per tick for every live player.
const SHIELD_REGEN_PER_TICK: f32 = 0.1;

/// Sessions silent for longer than this are treated as gone.
const IDLE_TIMEOUT_MS: u64 = 15_000;

const COMMAND_QUEUE_DEPTH: usize = 256;
/// Outbound fans out one message per event rather than one snapshot per tick,
/// so it gets a deeper buffer than the command queue.
const OUTBOUND_QUEUE_DEPTH: usize = 1024;

/// Messages queued while a tick runs, flushed to the broadcast channel after.
#[derive(Debug, Default)]
pub struct Outbox {
    queued: Vec<Outbound>,
}

impl Outbox {
    pub fn broadcast(&mut self, msg: ServerMsg) {
        self.queued.push(Outbound::Broadcast(msg));
    }

    pub fn to(&mut self, session: SessionId, msg: ServerMsg) {
        self.queued.push(Outbound::To(session, msg));
    }

    pub fn except(&mut self, session: SessionId, msg: ServerMsg) {
        self.queued.push(Outbound::Except(session, msg));
    }

    /// Orders the session's writer to close the connection.
    pub fn disconnect(&mut self, session: SessionId) {
        self.queued.push(Outbound::Disconnect(session));
    }

    pub fn drain(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.queued)
    }
}

/// Everything the simulation mutates, owned by the world task.
pub struct WorldState {
    pub store: EntityStore,
    pub planets: Planets,
    pub outbox: Outbox,
    pub tick: u64,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            store: EntityStore::default(),
            planets: Planets::starmap(),
            outbox: Outbox::default(),
            tick: 0,
        }
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the running world
#[derive(Clone)]
pub struct WorldHandle {
    pub command_tx: mpsc::Sender<PlayerCommand>,
    pub outbound_tx: broadcast::Sender<Outbound>,
    player_count: Arc<AtomicUsize>,
    bot_count: Arc<AtomicUsize>,
}

impl WorldHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.outbound_tx.subscribe()
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn bot_count(&self) -> usize {
        self.bot_count.load(Ordering::Relaxed)
    }
}

/// The authoritative game world
pub struct GameWorld {
    state: WorldState,
    rng: ChaCha8Rng,
    seed: u64,
    command_rx: mpsc::Receiver<PlayerCommand>,
    outbound_tx: broadcast::Sender<Outbound>,
    player_count: Arc<AtomicUsize>,
    bot_count: Arc<AtomicUsize>,
}

impl GameWorld {
    /// Create the world with its bot fleet already in place.
    pub fn new(seed: u64) -> (Self, WorldHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (outbound_tx, _) = broadcast::channel(OUTBOUND_QUEUE_DEPTH);
        let player_count = Arc::new(AtomicUsize::new(0));
        let bot_count = Arc::new(AtomicUsize::new(0));

        let handle = WorldHandle {
            command_tx,
            outbound_tx: outbound_tx.clone(),
            player_count: player_count.clone(),
            bot_count: bot_count.clone(),
        };

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = WorldState::new();
        state.store.bots = BotSystem::spawn_fleet(&mut rng);
        bot_count.store(state.store.bots.len(), Ordering::Relaxed);

        let world = Self {
            state,
            rng,
            seed,
            command_rx,
            outbound_tx,
            player_count,
            bot_count,
        };

        (world, handle)
    }

    /// Run the authoritative tick loop
    pub async fn run(mut self) {
        info!(
            seed = self.seed,
            bots = self.state.store.bots.len(),
            "world task running"
        );

        let mut ticker = interval(Duration::from_micros(TICK_DURATION_MICROS));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if !self.drain_commands() {
                info!("command channel closed, stopping world task");
                break;
            }

            self.run_tick();
            self.flush_outbox();
        }
    }

    /// Apply every queued client command. Returns false once all command
    /// senders are gone.
    fn drain_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(command) => match command.msg {
                    SessionMsg::Client(msg) => {
                        IntentHandler::handle(&mut self.state, command.session_id, msg)
                    }
                    SessionMsg::Disconnected => {
                        IntentHandler::handle_disconnect(&mut self.state, command.session_id)
                    }
                },
                Err(mpsc::error::TryRecvError::Empty) => return true,
                Err(mpsc::error::TryRecvError::Disconnected) => return false,
            }
        }
    }

    /// Run a single simulation tick
    fn run_tick(&mut self) {
        self.state.tick += 1;
        let now = unix_millis();

        self.resolve_combat();
        self.advance_players();
        self.regenerate_shields();
        self.state.planets.regenerate_all(tick_delta());
        self.update_bots(now);
        self.sweep_idle_sessions(now);

        self.player_count
            .store(self.state.store.players.len(), Ordering::Relaxed);
        self.bot_count
            .store(self.state.store.bots.len(), Ordering::Relaxed);
    }

    /// Advance projectiles and route the fallout.
    fn resolve_combat(&mut self) {
        for event in CombatSystem::resolve_projectiles(&mut self.state.store) {
            match event {
                CombatEvent::PlayerDamaged { id, shield, damage } => {
                    self.state.outbox.to(
                        id,
                        ServerMsg::PlayerDamaged {
                            shield,
                            damage: Some(damage),
                        },
                    );
                }
                CombatEvent::PlayerKilled {
                    killer,
                    killer_is_bot,
                    victim,
                } => {
                    self.state.outbox.broadcast(ServerMsg::PlayerKilled {
                        killer,
                        victim,
                        is_bot: killer_is_bot,
                    });
                }
                CombatEvent::BotKilled { killer, bot_id } => {
                    self.state
                        .outbox
                        .broadcast(ServerMsg::BotKilled { killer, bot_id });
                }
                CombatEvent::Explosion {
                    x,
                    y,
                    radius,
                    damage,
                } => {
                    self.state.outbox.broadcast(ServerMsg::Explosion {
                        x,
                        y,
                        radius,
                        damage,
                    });
                }
            }
        }
    }

    /// Step every live player toward its movement target.
    fn advance_players(&mut self) {
        for player in &mut self.state.store.players {
            if player.destroyed {
                continue;
            }
            let Some(target) = player.target else {
                continue;
            };

            if distance(player.x, player.y, target.x, target.y) > ARRIVE_DISTANCE {
                player.rotation = (target.y - player.y).atan2(target.x - player.x);
                player.x = (player.x + player.rotation.cos() * player.speed)
                    .clamp(0.0, WORLD_WIDTH);
                player.y = (player.y + player.rotation.sin() * player.speed)
                    .clamp(0.0, WORLD_HEIGHT);

                self.state
                    .outbox
                    .broadcast(ServerMsg::PlayerUpdated(PlayerUpdate::position(
                        player.id,
                        player.x,
                        player.y,
                        player.rotation,
                    )));
            } else {
                player.target = None;
            }
        }
    }

    fn regenerate_shields(&mut self) {
        for player in &mut self.state.store.players {
            if player.destroyed || player.shield >= MAX_SHIELD {
                continue;
            }
            player.shield = (player.shield + SHIELD_REGEN_PER_TICK).min(MAX_SHIELD);

            // No damage field: the client reads this as a regen update.
            self.state.outbox.to(
                player.id,
                ServerMsg::PlayerDamaged {
                    shield: player.shield,
                    damage: None,
                },
            );
        }
    }

    /// Run bot AI, publish their shots and the per-tick position sync.
    fn update_bots(&mut self, now: u64) {
        let shots = BotSystem::update(&mut self.state.store, &mut self.rng, now);
        for shot in shots {
            let dto = ProjectileDto::from(&shot);
            self.state.store.add_projectile(shot);
            self.state
                .outbox
                .broadcast(ServerMsg::ProjectileCreated(dto));
        }

        let bots = self.state.store.bots.iter().map(BotDto::from).collect();
        self.state.outbox.broadcast(ServerMsg::BotsUpdated(bots));
    }

    /// Evict sessions that have not sent anything for too long.
    fn sweep_idle_sessions(&mut self, now: u64) {
        let idle: Vec<SessionId> = self
            .state
            .store
            .players
            .iter()
            .filter(|p| now.saturating_sub(p.last_active) > IDLE_TIMEOUT_MS)
            .map(|p| p.id)
            .collect();

        for session in idle {
            info!(session = %session, "evicting idle session");
            IntentHandler::handle_disconnect(&mut self.state, session);
            self.state.outbox.disconnect(session);
        }
    }

    fn flush_outbox(&mut self) {
        for message in self.state.outbox.drain() {
            // Send fails only when no session is subscribed.
            let _ = self.outbound_tx.send(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::bots::BOT_COUNT;
    use crate::game::combat::WeaponSpec;
    use crate::game::entities::Projectile;
    use crate::game::{SPAWN_X, SPAWN_Y};
    use crate::ws::protocol::{ActorId, ClientMsg, Point, WeaponKind};
    use uuid::Uuid;

    /// A seeded world with the bot fleet removed so ticks are fully
    /// deterministic.
    fn quiet_world() -> (GameWorld, WorldHandle) {
        let (mut world, handle) = GameWorld::new(7);
        world.state.store.bots.clear();
        (world, handle)
    }

    fn join(world: &mut GameWorld, name: &str) -> SessionId {
        let session = Uuid::new_v4();
        IntentHandler::handle(
            &mut world.state,
            session,
            ClientMsg::Init {
                name: name.to_string(),
                x: None,
                y: None,
                rotation: None,
            },
        );
        world.state.outbox.drain();
        session
    }

    #[test]
    fn identical_seeds_spawn_identical_fleets() {
        let (world_a, _ha) = GameWorld::new(42);
        let (world_b, _hb) = GameWorld::new(42);

        let fleet_a: Vec<(u32, f32, f32)> = world_a
            .state
            .store
            .bots
            .iter()
            .map(|bot| (bot.id, bot.x, bot.y))
            .collect();
        let fleet_b: Vec<(u32, f32, f32)> = world_b
            .state
            .store
            .bots
            .iter()
            .map(|bot| (bot.id, bot.x, bot.y))
            .collect();

        assert_eq!(fleet_a.len(), BOT_COUNT);
        assert_eq!(fleet_a, fleet_b);
    }

    #[test]
    fn moving_player_steps_toward_target() {
        let (mut world, _handle) = quiet_world();
        let session = join(&mut world, "Ada");
        {
            let player = world.state.store.player_mut(session).unwrap();
            player.speed = 5.0;
            player.target = Some(Point::new(SPAWN_X + 100.0, SPAWN_Y));
        }

        world.run_tick();

        let player = world.state.store.player(session).unwrap();
        assert!((player.x - (SPAWN_X + 5.0)).abs() < 1e-3);
        assert_eq!(player.rotation, 0.0);
        assert!(player.target.is_some());

        let moved_x = player.x;
        let queued = world.state.outbox.drain();
        assert!(queued.iter().any(|out| matches!(
            out,
            Outbound::Broadcast(ServerMsg::PlayerUpdated(update)) if update.x == Some(moved_x)
        )));
    }

    #[test]
    fn arrival_clears_target_without_movement_broadcast() {
        let (mut world, _handle) = quiet_world();
        let session = join(&mut world, "Ada");
        {
            let player = world.state.store.player_mut(session).unwrap();
            player.speed = 5.0;
            player.target = Some(Point::new(SPAWN_X + 2.0, SPAWN_Y));
        }

        world.run_tick();

        let player = world.state.store.player(session).unwrap();
        assert!(player.target.is_none());
        assert!((player.x - SPAWN_X).abs() < f32::EPSILON);

        let queued = world.state.outbox.drain();
        assert!(!queued
            .iter()
            .any(|out| matches!(out, Outbound::Broadcast(ServerMsg::PlayerUpdated(_)))));
    }

    #[test]
    fn destroyed_players_sit_out_the_tick() {
        let (mut world, _handle) = quiet_world();
        let session = join(&mut world, "Ada");
        {
            let player = world.state.store.player_mut(session).unwrap();
            player.destroyed = true;
            player.shield = 0.0;
            player.speed = 5.0;
            player.target = Some(Point::new(SPAWN_X + 100.0, SPAWN_Y));
        }

        world.run_tick();

        let player = world.state.store.player(session).unwrap();
        assert!((player.x - SPAWN_X).abs() < f32::EPSILON);
        assert_eq!(player.shield, 0.0);
    }

    #[test]
    fn shields_regenerate_toward_full() {
        let (mut world, _handle) = quiet_world();
        let session = join(&mut world, "Ada");
        world.state.store.player_mut(session).unwrap().shield = 50.0;

        world.run_tick();

        let shield = world.state.store.player(session).unwrap().shield;
        assert!((shield - 50.1).abs() < 1e-4);

        let queued = world.state.outbox.drain();
        assert!(queued.iter().any(|out| matches!(
            out,
            Outbound::To(id, ServerMsg::PlayerDamaged { damage: None, .. }) if *id == session
        )));
    }

    #[test]
    fn full_shields_stay_quiet() {
        let (mut world, _handle) = quiet_world();
        join(&mut world, "Ada");

        world.run_tick();

        let queued = world.state.outbox.drain();
        assert!(!queued
            .iter()
            .any(|out| matches!(out, Outbound::To(_, ServerMsg::PlayerDamaged { .. }))));
    }

    #[test]
    fn projectile_hits_route_damage_to_the_victim() {
        let (mut world, _handle) = quiet_world();
        let shooter = join(&mut world, "Ada");
        let victim = join(&mut world, "Grace");
        {
            let player = world.state.store.player_mut(victim).unwrap();
            player.x = SPAWN_X + 200.0;
        }
        let spec = WeaponSpec::for_kind(WeaponKind::Laser);
        world.state.store.add_projectile(Projectile {
            id: Uuid::new_v4(),
            owner: ActorId::Player(shooter),
            x: SPAWN_X + 185.0,
            y: SPAWN_Y,
            rotation: 0.0,
            kind: WeaponKind::Laser,
            speed: spec.speed,
            damage: spec.damage,
            range: spec.range,
            distance_traveled: 0.0,
            target: None,
        });

        world.run_tick();

        assert!(world.state.store.projectiles.is_empty());
        let queued = world.state.outbox.drain();
        assert!(queued.iter().any(|out| matches!(
            out,
            Outbound::To(id, ServerMsg::PlayerDamaged { shield, damage: Some(10) })
                if *id == victim && (*shield - 90.0).abs() < f32::EPSILON
        )));
        assert!(!queued
            .iter()
            .any(|out| matches!(out, Outbound::Broadcast(ServerMsg::PlayerKilled { .. }))));
    }

    #[test]
    fn silent_sessions_are_evicted() {
        let (mut world, _handle) = quiet_world();
        let session = join(&mut world, "Ada");
        world.state.store.player_mut(session).unwrap().last_active =
            unix_millis() - IDLE_TIMEOUT_MS - 1_000;

        world.run_tick();

        assert!(world.state.store.player(session).is_none());
        let queued = world.state.outbox.drain();
        assert!(queued.iter().any(|out| matches!(
            out,
            Outbound::Broadcast(ServerMsg::PlayerLeft {
                was_disconnect: true,
                ..
            })
        )));
        assert!(queued
            .iter()
            .any(|out| matches!(out, Outbound::Disconnect(id) if *id == session)));
    }

    #[test]
    fn ticks_advance_planet_regeneration() {
        let (mut world, _handle) = quiet_world();

        world.run_tick();

        assert_eq!(world.state.tick, 1);
        let alpha = world.state.planets.get("Alpha").unwrap();
        assert!((alpha.resources - 1001.0).abs() < 1e-3);
    }

    #[test]
    fn bot_positions_broadcast_every_tick() {
        let (mut world, _handle) = GameWorld::new(5);

        world.run_tick();

        let queued = world.state.outbox.drain();
        assert!(queued.iter().any(|out| matches!(
            out,
            Outbound::Broadcast(ServerMsg::BotsUpdated(bots)) if bots.len() == BOT_COUNT
        )));
    }

    #[test]
    fn commands_from_the_channel_reach_the_intent_handler() {
        let (mut world, handle) = GameWorld::new(3);
        let session = Uuid::new_v4();

        handle
            .command_tx
            .try_send(PlayerCommand {
                session_id: session,
                msg: SessionMsg::Client(ClientMsg::Init {
                    name: "Ada".to_string(),
                    x: None,
                    y: None,
                    rotation: None,
                }),
            })
            .unwrap();
        assert!(world.drain_commands());
        assert!(world.state.store.player(session).is_some());

        handle
            .command_tx
            .try_send(PlayerCommand {
                session_id: session,
                msg: SessionMsg::Disconnected,
            })
            .unwrap();
        assert!(world.drain_commands());
        assert!(world.state.store.player(session).is_none());
    }

    #[test]
    fn closed_command_channel_stops_the_loop() {
        let (mut world, handle) = GameWorld::new(3);
        drop(handle);
        assert!(!world.drain_commands());
    }

    #[test]
    fn handle_reports_population_counts() {
        let (mut world, handle) = GameWorld::new(11);
        assert_eq!(handle.bot_count(), BOT_COUNT);

        join(&mut world, "Ada");
        world.run_tick();

        assert_eq!(handle.player_count(), 1);
        assert_eq!(handle.bot_count(), BOT_COUNT);
    }
}
