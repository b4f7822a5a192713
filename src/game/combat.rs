//! Combat system - weapon catalog, projectile flight and hit resolution

use std::f32::consts::PI;

use uuid::Uuid;

use crate::game::distance;
use crate::game::entities::{Bot, EntityStore, Player, Projectile};
use crate::ws::protocol::{ActorId, SessionId, WeaponKind};

/// Hit radius for laser point tests.
pub const LASER_HIT_RADIUS: f32 = 30.0;
/// Missiles are bigger, so their point test is wider.
pub const MISSILE_HIT_RADIUS: f32 = 40.0;
/// Bomb blast radius; damage falls off linearly to zero at this distance.
pub const EXPLOSION_RADIUS: f32 = 200.0;
/// Largest heading correction a missile applies per tick, in radians.
pub const MISSILE_TURN_RATE: f32 = 0.1;
/// Player shots spawn this far ahead of the ship's nose.
pub const MUZZLE_OFFSET: f32 = 30.0;

/// Bot laser parameters; weaker and shorter-ranged than the player laser.
pub const BOT_WEAPON_DAMAGE: u32 = 10;
pub const BOT_WEAPON_RANGE: f32 = 200.0;
pub const BOT_WEAPON_COOLDOWN_MS: u64 = 1000;

/// Static stats for one weapon kind.
#[derive(Debug, Clone, Copy)]
pub struct WeaponSpec {
    pub name: &'static str,
    /// Damage per hit
    pub damage: u32,
    /// World units covered per tick
    pub speed: f32,
    /// Total flight distance before expiry
    pub range: f32,
    /// Milliseconds between shots
    pub cooldown_ms: u64,
    /// Purchase price in credits
    pub price: u32,
    pub description: &'static str,
    pub homing: bool,
    /// Per-tick turn limit for homing weapons
    pub turn_speed: Option<f32>,
}

impl WeaponSpec {
    pub fn for_kind(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::Laser => Self {
                name: "Laser",
                damage: 10,
                speed: 10.0,
                range: 600.0,
                cooldown_ms: 250,
                price: 1000,
                description: "Rapid-fire energy beam",
                homing: false,
                turn_speed: None,
            },
            WeaponKind::Bombs => Self {
                name: "Bombs",
                damage: 20,
                speed: 5.0,
                range: 200.0,
                cooldown_ms: 1000,
                price: 2000,
                description: "Slow charge with area damage",
                homing: false,
                turn_speed: None,
            },
            WeaponKind::Missile => Self {
                name: "Missile",
                damage: 30,
                speed: 7.0,
                range: 800.0,
                cooldown_ms: 2000,
                price: 3000,
                description: "Self-guided heavy warhead",
                homing: true,
                turn_speed: Some(MISSILE_TURN_RATE),
            },
        }
    }
}

/// What the resolver reports back to the tick loop.
#[derive(Debug, Clone)]
pub enum CombatEvent {
    /// A player took a hit; that player learns their new shield value.
    PlayerDamaged {
        id: SessionId,
        shield: f32,
        damage: u32,
    },
    /// A player's shield collapsed.
    PlayerKilled {
        killer: String,
        killer_is_bot: bool,
        victim: String,
    },
    /// A bot was shot down.
    BotKilled { killer: String, bot_id: u32 },
    /// A bomb went off and damaged something.
    Explosion {
        x: f32,
        y: f32,
        radius: f32,
        damage: u32,
    },
}

/// Smallest signed angle from `from` to `to`, normalized into [-PI, PI].
pub fn angle_diff(from: f32, to: f32) -> f32 {
    let diff = (to - from).rem_euclid(2.0 * PI);
    if diff > PI {
        diff - 2.0 * PI
    } else {
        diff
    }
}

/// Combat resolution over the entity store.
pub struct CombatSystem;

impl CombatSystem {
    /// Builds a player's shot, spawned ahead of the ship's nose. Missiles
    /// carry the target they were bound to at launch.
    pub fn player_projectile(
        player: &Player,
        kind: WeaponKind,
        rotation: f32,
        target: Option<ActorId>,
    ) -> Projectile {
        let spec = WeaponSpec::for_kind(kind);
        Projectile {
            id: Uuid::new_v4(),
            owner: ActorId::Player(player.id),
            x: player.x + rotation.cos() * MUZZLE_OFFSET,
            y: player.y + rotation.sin() * MUZZLE_OFFSET,
            rotation,
            kind,
            speed: spec.speed,
            damage: spec.damage,
            range: spec.range,
            distance_traveled: 0.0,
            target,
        }
    }

    /// Builds a bot's laser bolt at the bot's own position.
    pub fn bot_projectile(bot: &Bot, rotation: f32) -> Projectile {
        Projectile {
            id: Uuid::new_v4(),
            owner: ActorId::Bot(bot.id),
            x: bot.x,
            y: bot.y,
            rotation,
            kind: WeaponKind::Laser,
            speed: WeaponSpec::for_kind(WeaponKind::Laser).speed,
            damage: BOT_WEAPON_DAMAGE,
            range: BOT_WEAPON_RANGE,
            distance_traveled: 0.0,
            target: None,
        }
    }

    /// Milliseconds left before `kind` may fire again; 0 when ready.
    pub fn cooldown_remaining(last_shot: u64, kind: WeaponKind, now: u64) -> u64 {
        (last_shot + WeaponSpec::for_kind(kind).cooldown_ms).saturating_sub(now)
    }

    /// Nearest live target to (x, y) for missile lock-on. Players are
    /// scanned before bots; ties keep the first found.
    pub fn nearest_target(store: &EntityStore, x: f32, y: f32, exclude: ActorId) -> Option<ActorId> {
        let mut best: Option<(ActorId, f32)> = None;
        for player in &store.players {
            if player.destroyed || ActorId::Player(player.id) == exclude {
                continue;
            }
            let d = distance(player.x, player.y, x, y);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((ActorId::Player(player.id), d));
            }
        }
        for bot in &store.bots {
            if ActorId::Bot(bot.id) == exclude {
                continue;
            }
            let d = distance(bot.x, bot.y, x, y);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((ActorId::Bot(bot.id), d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Index of the nearest non-destroyed player to (x, y), ties to the
    /// first found in insertion order.
    pub fn nearest_player(players: &[Player], x: f32, y: f32) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, player) in players.iter().enumerate() {
            if player.destroyed {
                continue;
            }
            let d = distance(player.x, player.y, x, y);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((index, d));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Advances every projectile one tick and resolves hits, detonations and
    /// expiry, in projectile insertion order. Damage applies immediately, so
    /// an entity destroyed early in the pass cannot be hit again by a later
    /// projectile in the same tick.
    pub fn resolve_projectiles(store: &mut EntityStore) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        let mut index = 0;
        while index < store.projectiles.len() {
            Self::steer_homing(store, index);
            {
                let p = &mut store.projectiles[index];
                p.x += p.rotation.cos() * p.speed;
                p.y += p.rotation.sin() * p.speed;
                p.distance_traveled += p.speed;
            }

            let shot = store.projectiles[index].clone();
            let finished = match shot.kind {
                WeaponKind::Laser => {
                    Self::resolve_point_hit(store, &shot, LASER_HIT_RADIUS, &mut events)
                        || shot.distance_traveled >= shot.range
                }
                WeaponKind::Missile => {
                    Self::resolve_point_hit(store, &shot, MISSILE_HIT_RADIUS, &mut events)
                        || shot.distance_traveled >= shot.range
                }
                WeaponKind::Bombs => {
                    if shot.distance_traveled >= shot.range {
                        Self::detonate(store, &shot, &mut events);
                        true
                    } else {
                        false
                    }
                }
            };

            if finished {
                store.projectiles.remove(index);
            } else {
                index += 1;
            }
        }
        events
    }

    /// Rotates a homing missile toward its target's current position, at
    /// most MISSILE_TURN_RATE per tick. A dead or departed target leaves the
    /// heading unchanged.
    fn steer_homing(store: &mut EntityStore, index: usize) {
        let p = &store.projectiles[index];
        if p.kind != WeaponKind::Missile {
            return;
        }
        let Some(target) = p.target else { return };
        let (x, y, rotation) = (p.x, p.y, p.rotation);

        let target_pos = match target {
            ActorId::Player(id) => store
                .player(id)
                .filter(|player| !player.destroyed)
                .map(|player| (player.x, player.y)),
            ActorId::Bot(id) => store.bot(id).map(|b| (b.x, b.y)),
        };
        let Some((tx, ty)) = target_pos else { return };

        let bearing = (ty - y).atan2(tx - x);
        let diff = angle_diff(rotation, bearing);
        store.projectiles[index].rotation =
            rotation + diff.clamp(-MISSILE_TURN_RATE, MISSILE_TURN_RATE);
    }

    /// Point hit test against players first, then bots, excluding the
    /// projectile's owner. Returns whether something was struck.
    fn resolve_point_hit(
        store: &mut EntityStore,
        shot: &Projectile,
        radius: f32,
        events: &mut Vec<CombatEvent>,
    ) -> bool {
        let hit_player = store.players.iter().position(|player| {
            !player.destroyed
                && ActorId::Player(player.id) != shot.owner
                && distance(player.x, player.y, shot.x, shot.y) < radius
        });
        if let Some(i) = hit_player {
            let destroyed = store.players[i].apply_damage(shot.damage);
            let id = store.players[i].id;
            let shield = store.players[i].shield;
            let victim = store.players[i].name.clone();
            events.push(CombatEvent::PlayerDamaged {
                id,
                shield,
                damage: shot.damage,
            });
            if destroyed {
                let (killer, killer_is_bot) = Self::owner_name(store, shot.owner);
                events.push(CombatEvent::PlayerKilled {
                    killer,
                    killer_is_bot,
                    victim,
                });
            }
            return true;
        }

        let hit_bot = store.bots.iter().position(|bot| {
            ActorId::Bot(bot.id) != shot.owner
                && distance(bot.x, bot.y, shot.x, shot.y) < radius
        });
        if let Some(i) = hit_bot {
            let dead = store.bots[i].apply_damage(shot.damage);
            if dead {
                let bot_id = store.bots[i].id;
                store.remove_bot(bot_id);
                let (killer, _) = Self::owner_name(store, shot.owner);
                events.push(CombatEvent::BotKilled { killer, bot_id });
            }
            return true;
        }
        false
    }

    /// Area damage pass around a detonating bomb. Integer damage falls off
    /// linearly with distance; contributions that floor to zero are skipped.
    /// One explosion event is reported if anything actually took damage.
    fn detonate(store: &mut EntityStore, shot: &Projectile, events: &mut Vec<CombatEvent>) {
        let mut any_damage = false;

        for i in 0..store.players.len() {
            let (id, px, py, destroyed) = {
                let player = &store.players[i];
                (player.id, player.x, player.y, player.destroyed)
            };
            if destroyed || ActorId::Player(id) == shot.owner {
                continue;
            }
            let d = distance(px, py, shot.x, shot.y);
            if d > EXPLOSION_RADIUS {
                continue;
            }
            let scaled = (shot.damage as f32 * (1.0 - d / EXPLOSION_RADIUS)).floor();
            if scaled < 1.0 {
                continue;
            }
            let destroyed_now = store.players[i].apply_damage(scaled as u32);
            let shield = store.players[i].shield;
            let victim = store.players[i].name.clone();
            events.push(CombatEvent::PlayerDamaged {
                id,
                shield,
                damage: scaled as u32,
            });
            any_damage = true;
            if destroyed_now {
                let (killer, killer_is_bot) = Self::owner_name(store, shot.owner);
                events.push(CombatEvent::PlayerKilled {
                    killer,
                    killer_is_bot,
                    victim,
                });
            }
        }

        let mut i = 0;
        while i < store.bots.len() {
            let bot = &store.bots[i];
            if ActorId::Bot(bot.id) == shot.owner {
                i += 1;
                continue;
            }
            let d = distance(bot.x, bot.y, shot.x, shot.y);
            let scaled = (shot.damage as f32 * (1.0 - d / EXPLOSION_RADIUS)).floor();
            if d > EXPLOSION_RADIUS || scaled < 1.0 {
                i += 1;
                continue;
            }
            let dead = store.bots[i].apply_damage(scaled as u32);
            any_damage = true;
            if dead {
                let bot_id = store.bots[i].id;
                store.bots.remove(i);
                let (killer, _) = Self::owner_name(store, shot.owner);
                events.push(CombatEvent::BotKilled { killer, bot_id });
            } else {
                i += 1;
            }
        }

        if any_damage {
            events.push(CombatEvent::Explosion {
                x: shot.x,
                y: shot.y,
                radius: EXPLOSION_RADIUS,
                damage: shot.damage,
            });
        }
    }

    /// Display name of a projectile owner for kill feeds. Bots are "Bot";
    /// an owner who already left is "Unknown".
    fn owner_name(store: &EntityStore, owner: ActorId) -> (String, bool) {
        match owner {
            ActorId::Bot(_) => ("Bot".to_string(), true),
            ActorId::Player(id) => (
                store
                    .player(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                false,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Bot, Player};
    use crate::ws::protocol::BotKind;

    fn player_at(name: &str, x: f32, y: f32) -> Player {
        Player::new(Uuid::new_v4(), name.to_string(), x, y, 0.0)
    }

    fn laser(owner: ActorId, x: f32, y: f32, rotation: f32) -> Projectile {
        let spec = WeaponSpec::for_kind(WeaponKind::Laser);
        Projectile {
            id: Uuid::new_v4(),
            owner,
            x,
            y,
            rotation,
            kind: WeaponKind::Laser,
            speed: spec.speed,
            damage: spec.damage,
            range: spec.range,
            distance_traveled: 0.0,
            target: None,
        }
    }

    #[test]
    fn catalog_matches_tuning() {
        let missile = WeaponSpec::for_kind(WeaponKind::Missile);
        assert_eq!(missile.damage, 30);
        assert_eq!(missile.cooldown_ms, 2000);
        assert_eq!(missile.price, 3000);
        assert!(missile.homing);
        assert_eq!(missile.turn_speed, Some(MISSILE_TURN_RATE));
        assert!(!WeaponSpec::for_kind(WeaponKind::Laser).homing);
    }

    #[test]
    fn single_laser_hit_reports_shield_ninety() {
        let mut store = EntityStore::default();
        let shooter = player_at("Shooter", 100.0, 100.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        store.players.push(player_at("Victim", 135.0, 100.0));

        store
            .projectiles
            .push(laser(ActorId::Player(shooter_id), 100.0, 100.0, 0.0));

        let events = CombatSystem::resolve_projectiles(&mut store);
        assert!(store.projectiles.is_empty());
        assert_eq!(events.len(), 1);
        match &events[0] {
            CombatEvent::PlayerDamaged { shield, damage, .. } => {
                assert_eq!(*shield, 90.0);
                assert_eq!(*damage, 10);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(store.players[1].shield, 90.0);
    }

    #[test]
    fn projectile_never_hits_its_owner() {
        let mut store = EntityStore::default();
        let shooter = player_at("Loner", 500.0, 500.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        store
            .projectiles
            .push(laser(ActorId::Player(shooter_id), 500.0, 500.0, 0.0));

        // Flies its whole range without touching the owner.
        let mut events = Vec::new();
        for _ in 0..60 {
            events.extend(CombatSystem::resolve_projectiles(&mut store));
        }
        assert!(events.is_empty());
        assert!(store.projectiles.is_empty());
        assert_eq!(store.players[0].shield, 100.0);
    }

    #[test]
    fn shield_collapse_is_a_kill() {
        let mut store = EntityStore::default();
        let shooter = player_at("Shooter", 100.0, 100.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        let mut victim = player_at("Victim", 135.0, 100.0);
        victim.shield = 10.0;
        store.players.push(victim);

        store
            .projectiles
            .push(laser(ActorId::Player(shooter_id), 100.0, 100.0, 0.0));

        let events = CombatSystem::resolve_projectiles(&mut store);
        assert_eq!(events.len(), 2);
        match &events[1] {
            CombatEvent::PlayerKilled {
                killer,
                killer_is_bot,
                victim,
            } => {
                assert_eq!(killer, "Shooter");
                assert!(!killer_is_bot);
                assert_eq!(victim, "Victim");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(store.players[1].destroyed);
        assert_eq!(store.players[1].shield, 0.0);
    }

    #[test]
    fn destroyed_players_are_not_hit_again() {
        let mut store = EntityStore::default();
        let shooter = player_at("Shooter", 100.0, 100.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        let mut victim = player_at("Ghost", 135.0, 100.0);
        victim.destroyed = true;
        store.players.push(victim);

        store
            .projectiles
            .push(laser(ActorId::Player(shooter_id), 100.0, 100.0, 0.0));

        let events = CombatSystem::resolve_projectiles(&mut store);
        assert!(events.is_empty());
        // Passed through; still in flight.
        assert_eq!(store.projectiles.len(), 1);
    }

    #[test]
    fn a_removed_bot_cannot_be_hit_by_a_later_projectile() {
        let mut store = EntityStore::default();
        let shooter = player_at("Shooter", 100.0, 100.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        let mut bot = Bot::new(1, BotKind::Peaceful, 135.0, 100.0);
        bot.health = 10.0;
        store.bots.push(bot);

        // Two lasers in the same tick, both on a course to hit.
        store
            .projectiles
            .push(laser(ActorId::Player(shooter_id), 100.0, 100.0, 0.0));
        store
            .projectiles
            .push(laser(ActorId::Player(shooter_id), 100.0, 100.0, 0.0));

        let events = CombatSystem::resolve_projectiles(&mut store);
        let kills = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::BotKilled { .. }))
            .count();
        assert_eq!(kills, 1);
        assert!(store.bots.is_empty());
        // The second laser found nothing and keeps flying.
        assert_eq!(store.projectiles.len(), 1);
    }

    #[test]
    fn laser_hit_on_a_bot_chips_health_quietly() {
        let mut store = EntityStore::default();
        let shooter = player_at("Shooter", 100.0, 100.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        store.bots.push(Bot::new(1, BotKind::Peaceful, 135.0, 100.0));

        store
            .projectiles
            .push(laser(ActorId::Player(shooter_id), 100.0, 100.0, 0.0));

        let events = CombatSystem::resolve_projectiles(&mut store);
        // Surviving bots report nothing; health rides the bots:updated sync.
        assert!(events.is_empty());
        assert_eq!(store.bots[0].health, 90.0);
        assert!(store.projectiles.is_empty());
    }

    #[test]
    fn bot_kills_are_credited_to_the_shooter() {
        let mut store = EntityStore::default();
        let shooter = player_at("Ace", 100.0, 100.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        let mut bot = Bot::new(3, BotKind::Aggressive, 135.0, 100.0);
        bot.health = 5.0;
        store.bots.push(bot);

        store
            .projectiles
            .push(laser(ActorId::Player(shooter_id), 100.0, 100.0, 0.0));

        let events = CombatSystem::resolve_projectiles(&mut store);
        match &events[0] {
            CombatEvent::BotKilled { killer, bot_id } => {
                assert_eq!(killer, "Ace");
                assert_eq!(*bot_id, 3);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn bomb_detonates_with_linear_falloff() {
        let mut store = EntityStore::default();
        let shooter = player_at("Bomber", 0.0, 400.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        // 100 units from the blast center: floor(20 * 0.5) = 10 damage.
        store.players.push(player_at("Near", 200.0, 400.0));
        // Exactly at the blast radius: scales to zero, untouched.
        store.players.push(player_at("Far", 300.0, 400.0));

        let spec = WeaponSpec::for_kind(WeaponKind::Bombs);
        store.projectiles.push(Projectile {
            id: Uuid::new_v4(),
            owner: ActorId::Player(shooter_id),
            x: 95.0,
            y: 400.0,
            rotation: 0.0,
            kind: WeaponKind::Bombs,
            speed: spec.speed,
            damage: spec.damage,
            range: spec.range,
            distance_traveled: spec.range - spec.speed,
            target: None,
        });

        let events = CombatSystem::resolve_projectiles(&mut store);
        assert!(store.projectiles.is_empty());
        assert_eq!(events.len(), 2);
        match &events[0] {
            CombatEvent::PlayerDamaged { shield, damage, .. } => {
                assert_eq!(*damage, 10);
                assert_eq!(*shield, 90.0);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match &events[1] {
            CombatEvent::Explosion { x, y, radius, damage } => {
                assert_eq!(*x, 100.0);
                assert_eq!(*y, 400.0);
                assert_eq!(*radius, EXPLOSION_RADIUS);
                assert_eq!(*damage, 20);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(store.players[2].shield, 100.0);
    }

    #[test]
    fn bomb_epicenter_takes_full_damage() {
        let mut store = EntityStore::default();
        let shooter = player_at("Bomber", 0.0, 400.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        let spec = WeaponSpec::for_kind(WeaponKind::Bombs);
        // Sitting exactly where the bomb will finish its flight.
        store.bots.push(Bot::new(1, BotKind::Peaceful, 100.0, 400.0));

        store.projectiles.push(Projectile {
            id: Uuid::new_v4(),
            owner: ActorId::Player(shooter_id),
            x: 95.0,
            y: 400.0,
            rotation: 0.0,
            kind: WeaponKind::Bombs,
            speed: spec.speed,
            damage: spec.damage,
            range: spec.range,
            distance_traveled: spec.range - spec.speed,
            target: None,
        });

        let events = CombatSystem::resolve_projectiles(&mut store);
        assert_eq!(store.bots[0].health, 80.0);
        assert!(store.projectiles.is_empty());
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::Explosion { .. })));
    }

    #[test]
    fn bomb_with_no_victims_detonates_silently() {
        let mut store = EntityStore::default();
        let shooter = player_at("Bomber", 0.0, 400.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);

        let spec = WeaponSpec::for_kind(WeaponKind::Bombs);
        store.projectiles.push(Projectile {
            id: Uuid::new_v4(),
            owner: ActorId::Player(shooter_id),
            x: 5000.0,
            y: 5000.0,
            rotation: 0.0,
            kind: WeaponKind::Bombs,
            speed: spec.speed,
            damage: spec.damage,
            range: spec.range,
            distance_traveled: spec.range - spec.speed,
            target: None,
        });

        let events = CombatSystem::resolve_projectiles(&mut store);
        assert!(events.is_empty());
        assert!(store.projectiles.is_empty());
    }

    #[test]
    fn missile_hits_within_forty_units() {
        let mut store = EntityStore::default();
        let shooter = player_at("Shooter", 100.0, 100.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        store.players.push(player_at("Victim", 145.0, 100.0));

        let spec = WeaponSpec::for_kind(WeaponKind::Missile);
        store.projectiles.push(Projectile {
            id: Uuid::new_v4(),
            owner: ActorId::Player(shooter_id),
            x: 100.0,
            y: 100.0,
            rotation: 0.0,
            kind: WeaponKind::Missile,
            speed: spec.speed,
            damage: spec.damage,
            range: spec.range,
            distance_traveled: 0.0,
            target: None,
        });

        let events = CombatSystem::resolve_projectiles(&mut store);
        // After one 7-unit step the victim is 38 away, inside the 40 radius.
        assert_eq!(events.len(), 1);
        assert_eq!(store.players[1].shield, 70.0);
        assert!(store.projectiles.is_empty());
    }

    #[test]
    fn missile_turns_toward_target_at_limited_rate() {
        let mut store = EntityStore::default();
        let shooter = player_at("Shooter", 500.0, 500.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);
        // Directly "below" the missile in +y; bearing is PI/2.
        let target = player_at("Target", 500.0, 2000.0);
        let target_id = target.id;
        store.players.push(target);

        let spec = WeaponSpec::for_kind(WeaponKind::Missile);
        store.projectiles.push(Projectile {
            id: Uuid::new_v4(),
            owner: ActorId::Player(shooter_id),
            x: 500.0,
            y: 500.0,
            rotation: 0.0,
            kind: WeaponKind::Missile,
            speed: spec.speed,
            damage: spec.damage,
            range: spec.range,
            distance_traveled: 0.0,
            target: Some(ActorId::Player(target_id)),
        });

        CombatSystem::resolve_projectiles(&mut store);
        let after_one = store.projectiles[0].rotation;
        assert!((after_one - MISSILE_TURN_RATE).abs() < 1e-4);

        CombatSystem::resolve_projectiles(&mut store);
        let after_two = store.projectiles[0].rotation;
        assert!(after_two > after_one);
        assert!(after_two - after_one <= MISSILE_TURN_RATE + 1e-4);
    }

    #[test]
    fn missile_with_dead_target_flies_straight() {
        let mut store = EntityStore::default();
        let shooter = player_at("Shooter", 500.0, 500.0);
        let shooter_id = shooter.id;
        store.players.push(shooter);

        let spec = WeaponSpec::for_kind(WeaponKind::Missile);
        store.projectiles.push(Projectile {
            id: Uuid::new_v4(),
            owner: ActorId::Player(shooter_id),
            x: 500.0,
            y: 500.0,
            rotation: 0.25,
            kind: WeaponKind::Missile,
            speed: spec.speed,
            damage: spec.damage,
            range: spec.range,
            distance_traveled: 0.0,
            // References a bot that no longer exists.
            target: Some(ActorId::Bot(99)),
        });

        CombatSystem::resolve_projectiles(&mut store);
        assert_eq!(store.projectiles[0].rotation, 0.25);
    }

    #[test]
    fn expired_projectiles_vanish_silently() {
        let mut store = EntityStore::default();
        let mut shot = laser(ActorId::Bot(1), 100.0, 100.0, 0.0);
        shot.range = BOT_WEAPON_RANGE;
        shot.distance_traveled = BOT_WEAPON_RANGE - shot.speed;
        store.projectiles.push(shot);

        let events = CombatSystem::resolve_projectiles(&mut store);
        assert!(events.is_empty());
        assert!(store.projectiles.is_empty());
    }

    #[test]
    fn angle_diff_is_normalized() {
        assert!((angle_diff(0.0, PI / 4.0) - PI / 4.0).abs() < 1e-6);
        // Crossing the PI boundary takes the short way around.
        let d = angle_diff(3.0, -3.0);
        assert!(d > 0.0 && d < 0.3);
        let d = angle_diff(-3.0, 3.0);
        assert!(d < 0.0 && d > -0.3);
    }

    #[test]
    fn cooldown_remaining_counts_down_to_zero() {
        let remaining = CombatSystem::cooldown_remaining(1000, WeaponKind::Laser, 1100);
        assert_eq!(remaining, 150);
        assert_eq!(
            CombatSystem::cooldown_remaining(1000, WeaponKind::Laser, 2000),
            0
        );
    }
}
