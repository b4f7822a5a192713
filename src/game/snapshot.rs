//! Wire snapshots: entity-to-DTO conversion and the full game state message
//! a joining or respawning player receives.

use crate::game::combat::WeaponSpec;
use crate::game::entities::{Bot, CargoHold, CargoSlot, EntityStore, OwnedWeapons, Player, Projectile};
use crate::game::planets::{Planet, Planets};
use crate::game::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::ws::protocol::{
    BotDto, CargoSlotDto, CargoSlotPricesDto, CargoSlotsDto, GameConfigDto, GameStateMsg,
    PlanetDto, PlayerDto, ProjectileDto, ResourcesDto, TargetRefDto, WeaponCatalogDto,
    WeaponKind, WeaponSpecDto, WeaponsDto,
};

impl From<CargoSlot> for CargoSlotDto {
    fn from(slot: CargoSlot) -> Self {
        Self {
            unlocked: slot.unlocked,
            amount: slot.amount,
        }
    }
}

impl From<&CargoHold> for CargoSlotsDto {
    fn from(hold: &CargoHold) -> Self {
        let slots = hold.slots();
        Self {
            slot1: slots[0].into(),
            slot2: slots[1].into(),
            slot3: slots[2].into(),
            slot4: slots[3].into(),
            slot5: slots[4].into(),
        }
    }
}

impl From<OwnedWeapons> for WeaponsDto {
    fn from(weapons: OwnedWeapons) -> Self {
        Self {
            laser: weapons.laser,
            bombs: weapons.bombs,
            missile: weapons.missile,
        }
    }
}

impl From<&Player> for PlayerDto {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            x: player.x,
            y: player.y,
            rotation: player.rotation,
            speed: player.speed,
            max_speed: player.max_speed,
            shield: player.shield.max(0.0),
            destroyed: player.destroyed,
            target: player.target,
            resources: ResourcesDto {
                credits: player.credits,
            },
            weapons: player.weapons.into(),
            cargo_slots: (&player.cargo).into(),
        }
    }
}

impl From<&Bot> for BotDto {
    fn from(bot: &Bot) -> Self {
        Self {
            id: bot.id,
            x: bot.x,
            y: bot.y,
            rotation: bot.rotation,
            speed: bot.speed,
            kind: bot.kind,
            health: bot.health.max(0.0),
            target: bot.target,
            color: bot.color.to_string(),
        }
    }
}

impl From<&Planet> for PlanetDto {
    fn from(planet: &Planet) -> Self {
        Self {
            name: planet.name.to_string(),
            kind: planet.kind,
            x: planet.x,
            y: planet.y,
            radius: planet.radius,
            color: planet.color.to_string(),
            resources: planet.resources,
            regeneration: planet.regeneration,
            is_player_base: planet.is_base,
        }
    }
}

impl From<&Projectile> for ProjectileDto {
    fn from(shot: &Projectile) -> Self {
        Self {
            id: shot.id,
            owner_id: shot.owner,
            is_bot: shot.owner.is_bot(),
            x: shot.x,
            y: shot.y,
            rotation: shot.rotation,
            kind: shot.kind,
            speed: shot.speed,
            damage: shot.damage,
            range: shot.range,
            distance_traveled: shot.distance_traveled,
            target: shot.target.map(|id| TargetRefDto {
                id,
                is_bot: id.is_bot(),
            }),
        }
    }
}

/// Static tunables advertised to clients inside `game:state`.
pub fn game_config() -> GameConfigDto {
    fn spec_dto(kind: WeaponKind) -> WeaponSpecDto {
        let spec = WeaponSpec::for_kind(kind);
        WeaponSpecDto {
            name: spec.name.to_string(),
            damage: spec.damage,
            speed: spec.speed,
            range: spec.range,
            cooldown: spec.cooldown_ms,
            price: spec.price,
            description: spec.description.to_string(),
            homing: spec.homing,
            turn_speed: spec.turn_speed,
        }
    }

    GameConfigDto {
        world_width: WORLD_WIDTH,
        world_height: WORLD_HEIGHT,
        weapons: WeaponCatalogDto {
            laser: spec_dto(WeaponKind::Laser),
            bombs: spec_dto(WeaponKind::Bombs),
            missile: spec_dto(WeaponKind::Missile),
        },
        cargo_slots: (&CargoHold::default()).into(),
        cargo_slot_prices: CargoSlotPricesDto {
            slot2: CargoHold::slot_price(1),
            slot3: CargoHold::slot_price(2),
            slot4: CargoHold::slot_price(3),
            slot5: CargoHold::slot_price(4),
        },
    }
}

/// Assembles the full world snapshot for one player.
pub fn build_game_state(store: &EntityStore, planets: &Planets, current: &Player) -> GameStateMsg {
    GameStateMsg {
        current_player: current.into(),
        players: roster(store),
        planets: planets.iter().map(PlanetDto::from).collect(),
        projectiles: store.projectiles.iter().map(ProjectileDto::from).collect(),
        bots: store.bots.iter().map(BotDto::from).collect(),
        config: game_config(),
    }
}

/// The authoritative player roster, in join order.
pub fn roster(store: &EntityStore) -> Vec<PlayerDto> {
    store.players.iter().map(PlayerDto::from).collect()
}
