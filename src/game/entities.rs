//! Authoritative entity state: players, bots and projectiles.
//! Registries are insertion-ordered `Vec`s so per-tick iteration and
//! nearest-entity searches are deterministic. No game rules live here.

use uuid::Uuid;

use crate::util::time::unix_millis;
use crate::ws::protocol::{ActorId, BotKind, Point, SessionId, WeaponKind};

/// Credits a fresh ship starts with.
pub const STARTING_CREDITS: u32 = 1000;
/// Shield ceiling; regeneration stops here.
pub const MAX_SHIELD: f32 = 100.0;
/// Movement speed cap applied to client intents.
pub const DEFAULT_MAX_SPEED: f32 = 5.0;
/// Bot hull strength at spawn.
pub const BOT_MAX_HEALTH: f32 = 100.0;
/// Bot cruise speed.
pub const BOT_SPEED: f32 = 2.0;

pub const CARGO_SLOT_COUNT: usize = 5;
pub const CARGO_SLOT_CAPACITY: u32 = 100;
/// Unlocking slot N costs N times this.
pub const CARGO_SLOT_BASE_PRICE: u32 = 1000;

/// One bay of the cargo hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CargoSlot {
    pub unlocked: bool,
    pub amount: u32,
}

/// Five ordered cargo bays. Only slot 1 starts unlocked; extraction fills
/// unlocked bays in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CargoHold {
    slots: [CargoSlot; CARGO_SLOT_COUNT],
}

impl Default for CargoHold {
    fn default() -> Self {
        let mut slots = [CargoSlot {
            unlocked: false,
            amount: 0,
        }; CARGO_SLOT_COUNT];
        slots[0].unlocked = true;
        Self { slots }
    }
}

impl CargoHold {
    pub fn slots(&self) -> &[CargoSlot; CARGO_SLOT_COUNT] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<CargoSlot> {
        self.slots.get(index).copied()
    }

    /// Units that still fit into unlocked bays.
    pub fn free_space(&self) -> u32 {
        self.slots
            .iter()
            .filter(|slot| slot.unlocked)
            .map(|slot| CARGO_SLOT_CAPACITY - slot.amount)
            .sum()
    }

    pub fn total_amount(&self) -> u32 {
        self.slots.iter().map(|slot| slot.amount).sum()
    }

    /// Distributes `amount` units across unlocked bays in slot order and
    /// returns how many actually fit.
    pub fn store(&mut self, amount: u32) -> u32 {
        let mut remaining = amount;
        for slot in self.slots.iter_mut() {
            if !slot.unlocked || remaining == 0 {
                continue;
            }
            let taken = remaining.min(CARGO_SLOT_CAPACITY - slot.amount);
            slot.amount += taken;
            remaining -= taken;
        }
        amount - remaining
    }

    /// Empties every bay and returns the number of units removed.
    pub fn drain(&mut self) -> u32 {
        let mut total = 0;
        for slot in self.slots.iter_mut() {
            total += slot.amount;
            slot.amount = 0;
        }
        total
    }

    /// Unlocks the bay at `index`. Fails when out of range or already open.
    pub fn unlock(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if !slot.unlocked => {
                slot.unlocked = true;
                true
            }
            _ => false,
        }
    }

    /// Maps a wire slot id ("slot1".."slot5") to a bay index.
    pub fn slot_index(slot_id: &str) -> Option<usize> {
        let n: usize = slot_id.strip_prefix("slot")?.parse().ok()?;
        (1..=CARGO_SLOT_COUNT).contains(&n).then(|| n - 1)
    }

    /// Credits required to unlock the bay at `index`.
    pub fn slot_price(index: usize) -> u32 {
        CARGO_SLOT_BASE_PRICE * (index as u32 + 1)
    }
}

/// Which weapons a player has bought.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnedWeapons {
    pub laser: bool,
    pub bombs: bool,
    pub missile: bool,
}

impl OwnedWeapons {
    pub fn owns(&self, kind: WeaponKind) -> bool {
        match kind {
            WeaponKind::Laser => self.laser,
            WeaponKind::Bombs => self.bombs,
            WeaponKind::Missile => self.missile,
        }
    }

    pub fn grant(&mut self, kind: WeaponKind) {
        match kind {
            WeaponKind::Laser => self.laser = true,
            WeaponKind::Bombs => self.bombs = true,
            WeaponKind::Missile => self.missile = true,
        }
    }
}

/// Per-weapon timestamps (unix ms) of the last accepted shot.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastShotTimes {
    laser: u64,
    bombs: u64,
    missile: u64,
}

impl LastShotTimes {
    pub fn get(&self, kind: WeaponKind) -> u64 {
        match kind {
            WeaponKind::Laser => self.laser,
            WeaponKind::Bombs => self.bombs,
            WeaponKind::Missile => self.missile,
        }
    }

    pub fn set(&mut self, kind: WeaponKind, at: u64) {
        match kind {
            WeaponKind::Laser => self.laser = at,
            WeaponKind::Bombs => self.bombs = at,
            WeaponKind::Missile => self.missile = at,
        }
    }
}

/// A connected player's ship.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: SessionId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub speed: f32,
    pub max_speed: f32,
    pub shield: f32,
    pub destroyed: bool,
    pub target: Option<Point>,
    pub credits: u32,
    pub weapons: OwnedWeapons,
    pub cargo: CargoHold,
    pub last_shot: LastShotTimes,
    /// Unix ms of the last message from this session, for liveness eviction.
    pub last_active: u64,
}

impl Player {
    pub fn new(id: SessionId, name: String, x: f32, y: f32, rotation: f32) -> Self {
        Self {
            id,
            name,
            x,
            y,
            rotation,
            speed: 0.0,
            max_speed: DEFAULT_MAX_SPEED,
            shield: MAX_SHIELD,
            destroyed: false,
            target: None,
            credits: STARTING_CREDITS,
            weapons: OwnedWeapons::default(),
            cargo: CargoHold::default(),
            last_shot: LastShotTimes::default(),
            last_active: unix_millis(),
        }
    }

    pub fn refresh_activity(&mut self) {
        self.last_active = unix_millis();
    }

    /// Applies hit damage. Shield is floored at 0; reaching it destroys the
    /// ship. Returns whether the ship is now destroyed.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        self.shield = (self.shield - amount as f32).max(0.0);
        if self.shield <= 0.0 {
            self.destroyed = true;
        }
        self.destroyed
    }
}

/// An NPC ship.
#[derive(Debug, Clone)]
pub struct Bot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub speed: f32,
    pub kind: BotKind,
    pub health: f32,
    pub target: Option<Point>,
    pub color: &'static str,
    /// Unix ms of the last shot. Only aggressive bots fire.
    pub last_shot: u64,
}

impl Bot {
    pub fn new(id: u32, kind: BotKind, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            rotation: 0.0,
            speed: BOT_SPEED,
            kind,
            health: BOT_MAX_HEALTH,
            target: None,
            color: match kind {
                BotKind::Aggressive => "#ff0000",
                BotKind::Peaceful => "#00ff00",
            },
            last_shot: 0,
        }
    }

    /// Applies hit damage. Returns whether the hull is gone.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        self.health = (self.health - amount as f32).max(0.0);
        self.health <= 0.0
    }
}

/// A projectile in flight.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: Uuid,
    pub owner: ActorId,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub kind: WeaponKind,
    pub speed: f32,
    pub damage: u32,
    pub range: f32,
    pub distance_traveled: f32,
    /// Homing target, bound at launch for missiles.
    pub target: Option<ActorId>,
}

/// All live entities, in insertion order.
#[derive(Debug, Default)]
pub struct EntityStore {
    pub players: Vec<Player>,
    pub bots: Vec<Bot>,
    pub projectiles: Vec<Projectile>,
}

impl EntityStore {
    pub fn player(&self, id: SessionId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: SessionId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Adds a player, or replaces an existing entry for the same session in
    /// place so iteration order is preserved. Returns the replaced player.
    pub fn insert_player(&mut self, player: Player) -> Option<Player> {
        match self.players.iter().position(|p| p.id == player.id) {
            Some(index) => Some(std::mem::replace(&mut self.players[index], player)),
            None => {
                self.players.push(player);
                None
            }
        }
    }

    /// Removes a player, shifting later entries down to keep order stable.
    pub fn remove_player(&mut self, id: SessionId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }

    pub fn bot(&self, id: u32) -> Option<&Bot> {
        self.bots.iter().find(|b| b.id == id)
    }

    pub fn remove_bot(&mut self, id: u32) -> Option<Bot> {
        let index = self.bots.iter().position(|b| b.id == id)?;
        Some(self.bots.remove(index))
    }

    pub fn add_projectile(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }
}
