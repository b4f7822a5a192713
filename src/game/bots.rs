//! Bot AI - wandering NPCs with an aggressive variant that hunts players.

use rand::Rng;

use crate::game::combat::{CombatSystem, BOT_WEAPON_COOLDOWN_MS, BOT_WEAPON_RANGE};
use crate::game::entities::{Bot, EntityStore, Projectile};
use crate::game::{distance, ARRIVE_DISTANCE, WORLD_HEIGHT, WORLD_WIDTH};
use crate::ws::protocol::{BotKind, Point};

/// Bots spawned at server start. Attrition is permanent.
pub const BOT_COUNT: usize = 10;
/// Per-tick chance that an idle bot picks a new wander destination.
pub const BOT_WANDER_CHANCE: f64 = 0.02;

/// Bot behavior over the entity store.
pub struct BotSystem;

impl BotSystem {
    /// Rolls the starting fleet: random positions, kind chosen uniformly,
    /// ids assigned in spawn order.
    pub fn spawn_fleet(rng: &mut impl Rng) -> Vec<Bot> {
        (0..BOT_COUNT)
            .map(|i| {
                let kind = if rng.gen_bool(0.5) {
                    BotKind::Aggressive
                } else {
                    BotKind::Peaceful
                };
                let x = rng.gen_range(0.0..WORLD_WIDTH);
                let y = rng.gen_range(0.0..WORLD_HEIGHT);
                Bot::new(i as u32 + 1, kind, x, y)
            })
            .collect()
    }

    /// Runs one tick of bot behavior in insertion order: wander target
    /// selection, movement along the current heading, then aggression.
    /// Returns the projectiles fired this tick; the caller stores and
    /// announces them.
    pub fn update(store: &mut EntityStore, rng: &mut impl Rng, now: u64) -> Vec<Projectile> {
        let mut fired = Vec::new();

        for i in 0..store.bots.len() {
            if store.bots[i].target.is_none() && rng.gen_bool(BOT_WANDER_CHANCE) {
                let tx = rng.gen_range(0.0..WORLD_WIDTH);
                let ty = rng.gen_range(0.0..WORLD_HEIGHT);
                let bot = &mut store.bots[i];
                bot.rotation = (ty - bot.y).atan2(tx - bot.x);
                bot.target = Some(Point::new(tx, ty));
            }

            {
                let bot = &mut store.bots[i];
                if let Some(target) = bot.target {
                    if distance(bot.x, bot.y, target.x, target.y) > ARRIVE_DISTANCE {
                        bot.x += bot.rotation.cos() * bot.speed;
                        bot.y += bot.rotation.sin() * bot.speed;
                    } else {
                        bot.target = None;
                    }
                }
            }

            if store.bots[i].kind == BotKind::Aggressive {
                let (bx, by) = (store.bots[i].x, store.bots[i].y);
                if let Some(pi) = CombatSystem::nearest_player(&store.players, bx, by) {
                    let (px, py) = (store.players[pi].x, store.players[pi].y);
                    if distance(bx, by, px, py) < BOT_WEAPON_RANGE {
                        let bot = &mut store.bots[i];
                        bot.target = Some(Point::new(px, py));
                        bot.rotation = (py - by).atan2(px - bx);
                        if now.saturating_sub(bot.last_shot) >= BOT_WEAPON_COOLDOWN_MS {
                            bot.last_shot = now;
                            fired.push(CombatSystem::bot_projectile(bot, bot.rotation));
                        }
                    }
                }
            }
        }

        fired
    }
}
