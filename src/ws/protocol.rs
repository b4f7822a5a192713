//! WebSocket protocol message definitions
//! These are the wire types for client-server communication. Event names and
//! payload casing follow the browser client's contract: every frame is a JSON
//! object `{"event": "...", "data": {...}}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one connected session. The session id doubles as the
/// player id for the lifetime of the connection.
pub type SessionId = Uuid;

/// 2D world coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The three purchasable weapon kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Laser,
    Bombs,
    Missile,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Laser, WeaponKind::Bombs, WeaponKind::Missile];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Laser => "laser",
            WeaponKind::Bombs => "bombs",
            WeaponKind::Missile => "missile",
        }
    }

    /// Parses the wire name of a weapon. Returns `None` for unknown kinds so
    /// the intent handler can answer with a purchase failure instead of
    /// dropping the whole message.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "laser" => Some(WeaponKind::Laser),
            "bombs" => Some(WeaponKind::Bombs),
            "missile" => Some(WeaponKind::Missile),
            _ => None,
        }
    }
}

/// Bot behavior archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotKind {
    Peaceful,
    Aggressive,
}

/// Planet classes, cosmetic except for the player base flag on the colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanetKind {
    Colony,
    Terrestrial,
    Ice,
    Volcanic,
    Desert,
}

/// Identifier for a combat participant. Players carry their session uuid,
/// bots the small integer id assigned at spawn. Serialized untagged, so the
/// wire sees a plain string or number as clients expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActorId {
    Player(SessionId),
    Bot(u32),
}

impl ActorId {
    pub fn is_bot(&self) -> bool {
        matches!(self, ActorId::Bot(_))
    }
}

/// Homing target reference as sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRefDto {
    pub id: ActorId,
    pub is_bot: bool,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientMsg {
    /// Join the game. Missing spawn fields fall back to the default spawn.
    #[serde(rename = "player:init")]
    Init {
        name: String,
        #[serde(default)]
        x: Option<f32>,
        #[serde(default)]
        y: Option<f32>,
        #[serde(default)]
        rotation: Option<f32>,
    },

    /// Movement intent: where to head, facing and speed.
    #[serde(rename = "player:move")]
    Move {
        target: Option<Point>,
        rotation: f32,
        speed: f32,
    },

    /// Fire the named weapon in the given direction.
    #[serde(rename = "player:shoot")]
    Shoot {
        rotation: f32,
        #[serde(rename = "type")]
        kind: WeaponKind,
    },

    /// Buy a weapon. The kind stays a raw string so unknown kinds can be
    /// answered with a purchase failure.
    #[serde(rename = "weapon:buy")]
    BuyWeapon {
        #[serde(rename = "type")]
        kind: String,
    },

    /// Mine resources from a planet in range.
    #[serde(rename = "resources:extract")]
    ExtractResources { planet_id: String, amount: u32 },

    /// Sell all carried cargo at the base. The client-computed credit total
    /// is accepted for wire compatibility but never trusted.
    #[serde(rename = "player:cargo_unloaded")]
    UnloadCargo {
        #[serde(default)]
        credits: Option<u32>,
    },

    /// Unlock a cargo slot. Same story for the credits field.
    #[serde(rename = "player:cargo_slot_purchased")]
    PurchaseCargoSlot {
        slot_id: String,
        #[serde(default)]
        credits: Option<u32>,
    },

    /// Chat message, relayed to everyone after truncation.
    #[serde(rename = "player:message")]
    Chat { message: String },

    /// Respawn after destruction.
    #[serde(rename = "player:restart")]
    Restart,

    /// Liveness beacon. Sessions that stop sending these are evicted.
    #[serde(rename = "player:heartbeat")]
    Heartbeat,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ServerMsg {
    /// Full snapshot sent once to a player that just joined.
    #[serde(rename = "game:state")]
    GameState(Box<GameStateMsg>),

    #[serde(rename = "player:joined")]
    PlayerJoined(PlayerDto),

    #[serde(rename = "player:left")]
    PlayerLeft {
        id: SessionId,
        name: String,
        was_disconnect: bool,
    },

    /// Authoritative roster, broadcast after membership changes.
    #[serde(rename = "players:sync")]
    PlayersSync(Vec<PlayerDto>),

    /// Partial per-player delta. Absent fields are unchanged.
    #[serde(rename = "player:updated")]
    PlayerUpdated(PlayerUpdate),

    /// Shield change for the receiving player. `damage` is present on hits
    /// and absent on regeneration ticks.
    #[serde(rename = "player:damaged")]
    PlayerDamaged {
        shield: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        damage: Option<u32>,
    },

    #[serde(rename = "player:killed")]
    PlayerKilled {
        killer: String,
        victim: String,
        is_bot: bool,
    },

    #[serde(rename = "bot:killed")]
    BotKilled { killer: String, bot_id: u32 },

    #[serde(rename = "projectile:created")]
    ProjectileCreated(ProjectileDto),

    /// Position sync for the whole bot population, broadcast every tick.
    #[serde(rename = "bots:updated")]
    BotsUpdated(Vec<BotDto>),

    /// Bomb detonation, for client effects. The damage is already applied
    /// when this is sent.
    #[serde(rename = "explosion")]
    Explosion {
        x: f32,
        y: f32,
        radius: f32,
        damage: u32,
    },

    #[serde(rename = "weapon:purchased")]
    WeaponPurchased {
        #[serde(rename = "type")]
        kind: WeaponKind,
        credits: u32,
        weapons: WeaponsDto,
    },

    /// Shot rejected because the weapon is still cooling down.
    #[serde(rename = "weapon:cooldown")]
    WeaponCooldown {
        #[serde(rename = "type")]
        kind: WeaponKind,
        remaining_time: u64,
    },

    #[serde(rename = "purchase:failed")]
    PurchaseFailed { message: String },

    #[serde(rename = "resources:extracted")]
    ResourcesExtracted {
        planet_id: String,
        planet_resources: f32,
        cargo_slots: CargoSlotsDto,
    },

    /// Fresh state for a player that respawned.
    #[serde(rename = "player:restarted")]
    PlayerRestarted(PlayerDto),

    /// Chat relay.
    #[serde(rename = "player:message")]
    ChatMessage { player_id: SessionId, message: String },

    /// Targeted validation failure.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Everything a joining client needs to render the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateMsg {
    pub current_player: PlayerDto,
    pub players: Vec<PlayerDto>,
    pub planets: Vec<PlanetDto>,
    pub projectiles: Vec<ProjectileDto>,
    pub bots: Vec<BotDto>,
    pub config: GameConfigDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
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
    pub resources: ResourcesDto,
    pub weapons: WeaponsDto,
    pub cargo_slots: CargoSlotsDto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourcesDto {
    pub credits: u32,
}

/// Weapon ownership flags.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WeaponsDto {
    pub laser: bool,
    pub bombs: bool,
    pub missile: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CargoSlotDto {
    pub unlocked: bool,
    pub amount: u32,
}

/// The five-slot cargo hold, keyed the way the client expects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CargoSlotsDto {
    pub slot1: CargoSlotDto,
    pub slot2: CargoSlotDto,
    pub slot3: CargoSlotDto,
    pub slot4: CargoSlotDto,
    pub slot5: CargoSlotDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotDto {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub speed: f32,
    #[serde(rename = "type")]
    pub kind: BotKind,
    pub health: f32,
    pub target: Option<Point>,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetDto {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PlanetKind,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: String,
    pub resources: f32,
    pub regeneration: f32,
    pub is_player_base: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileDto {
    pub id: Uuid,
    pub owner_id: ActorId,
    pub is_bot: bool,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    #[serde(rename = "type")]
    pub kind: WeaponKind,
    pub speed: f32,
    pub damage: u32,
    pub range: f32,
    pub distance_traveled: f32,
    pub target: Option<TargetRefDto>,
}

/// Static weapon parameters shared with the client on join.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSpecDto {
    pub name: String,
    pub damage: u32,
    pub speed: f32,
    pub range: f32,
    pub cooldown: u64,
    pub price: u32,
    pub description: String,
    pub homing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_speed: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponCatalogDto {
    pub laser: WeaponSpecDto,
    pub bombs: WeaponSpecDto,
    pub missile: WeaponSpecDto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CargoSlotPricesDto {
    pub slot2: u32,
    pub slot3: u32,
    pub slot4: u32,
    pub slot5: u32,
}

/// Game tunables the client mirrors for prediction and UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfigDto {
    pub world_width: f32,
    pub world_height: f32,
    pub weapons: WeaponCatalogDto,
    pub cargo_slots: CargoSlotsDto,
    pub cargo_slot_prices: CargoSlotPricesDto,
}

/// Sparse player delta. Only populated fields are serialized, so one frame
/// can carry a position step, a cargo change or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// `Some(None)` clears the target, `None` leaves it untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Option<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_slots: Option<CargoSlotsDto>,
}

impl PlayerUpdate {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            x: None,
            y: None,
            rotation: None,
            speed: None,
            target: None,
            credits: None,
            cargo_slots: None,
        }
    }

    /// Delta for a simulation movement step.
    pub fn position(id: SessionId, x: f32, y: f32, rotation: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            rotation: Some(rotation),
            ..Self::new(id)
        }
    }

    /// Delta echoing an accepted movement intent.
    pub fn movement(
        id: SessionId,
        x: f32,
        y: f32,
        rotation: f32,
        speed: f32,
        target: Option<Point>,
    ) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            rotation: Some(rotation),
            speed: Some(speed),
            target: Some(target),
            ..Self::new(id)
        }
    }

    /// Delta for a cargo or credit change.
    pub fn cargo(id: SessionId, credits: u32, cargo_slots: CargoSlotsDto) -> Self {
        Self {
            credits: Some(credits),
            cargo_slots: Some(cargo_slots),
            ..Self::new(id)
        }
    }
}
