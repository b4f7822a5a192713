//! Planet catalog, resource regeneration and extraction arithmetic.

use crate::ws::protocol::PlanetKind;

/// Hard ceiling on any planet's resource pool.
pub const MAX_PLANET_RESOURCES: f32 = 3000.0;
/// Farthest a ship can sit from a planet center and still mine it.
pub const EXTRACTION_RANGE: f32 = 330.0;

#[derive(Debug, Clone)]
pub struct Planet {
    pub name: &'static str,
    pub kind: PlanetKind,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: &'static str,
    /// Current pool, always within [0, MAX_PLANET_RESOURCES].
    pub resources: f32,
    /// Units restored per second.
    pub regeneration: f32,
    /// The home base neither regenerates nor yields resources.
    pub is_base: bool,
}

impl Planet {
    /// Restores resources for one tick of `dt` seconds.
    pub fn regenerate(&mut self, dt: f32) {
        if self.is_base {
            return;
        }
        self.resources = (self.resources + self.regeneration * dt).min(MAX_PLANET_RESOURCES);
    }

    /// Removes up to `amount` whole units and returns how many came out.
    /// Fractional remainder stays on the planet.
    pub fn extract(&mut self, amount: u32) -> u32 {
        if self.is_base {
            return 0;
        }
        let available = self.resources.floor() as u32;
        let taken = amount.min(available);
        self.resources -= taken as f32;
        taken
    }
}

/// The fixed world map, iterated in catalog order.
#[derive(Debug)]
pub struct Planets {
    planets: Vec<Planet>,
}

impl Planets {
    /// Builds the catalog every server start uses.
    pub fn starmap() -> Self {
        let planets = vec![
            Planet {
                name: "Home",
                kind: PlanetKind::Colony,
                x: 2500.0,
                y: 2500.0,
                radius: 45.0,
                color: "#FFD700",
                resources: 0.0,
                regeneration: 0.0,
                is_base: true,
            },
            Planet {
                name: "Alpha",
                kind: PlanetKind::Terrestrial,
                x: 1500.0,
                y: 1500.0,
                radius: 50.0,
                color: "#4CAF50",
                resources: 1000.0,
                regeneration: 60.0,
                is_base: false,
            },
            Planet {
                name: "Beta",
                kind: PlanetKind::Ice,
                x: 3500.0,
                y: 2500.0,
                radius: 55.0,
                color: "#2196F3",
                resources: 2000.0,
                regeneration: 120.0,
                is_base: false,
            },
            Planet {
                name: "Gamma",
                kind: PlanetKind::Volcanic,
                x: 4500.0,
                y: 3500.0,
                radius: 60.0,
                color: "#FF5722",
                resources: 3000.0,
                regeneration: 180.0,
                is_base: false,
            },
            Planet {
                name: "Delta",
                kind: PlanetKind::Desert,
                x: 5500.0,
                y: 4500.0,
                radius: 65.0,
                color: "#FFC107",
                resources: 2500.0,
                regeneration: 120.0,
                is_base: false,
            },
        ];
        Self { planets }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Planet> {
        self.planets.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Planet> {
        self.planets.iter_mut().find(|p| p.name == name)
    }

    /// Extracts from the named planet; a missing name takes nothing.
    pub fn extract(&mut self, name: &str, amount: u32) -> u32 {
        match self.get_mut(name) {
            Some(planet) => planet.extract(amount),
            None => 0,
        }
    }

    pub fn regenerate_all(&mut self, dt: f32) {
        for planet in self.planets.iter_mut() {
            planet.regenerate(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::time::tick_delta;

    #[test]
    fn starmap_matches_catalog_order() {
        let planets = Planets::starmap();
        let names: Vec<_> = planets.iter().map(|p| p.name).collect();
        assert_eq!(names, ["Home", "Alpha", "Beta", "Gamma", "Delta"]);
        assert!(planets.get("Home").unwrap().is_base);
        assert!(!planets.get("Alpha").unwrap().is_base);
        assert!(planets.get("Vulcan").is_none());
    }

    #[test]
    fn regeneration_scales_with_tick_delta() {
        let mut planets = Planets::starmap();
        let before = planets.get("Alpha").unwrap().resources;
        planets.regenerate_all(tick_delta());
        let after = planets.get("Alpha").unwrap().resources;
        // 60 units/sec at 60 ticks/sec is one unit per tick.
        assert!((after - before - 1.0).abs() < 1e-3);
    }

    #[test]
    fn regeneration_caps_at_maximum() {
        let mut planets = Planets::starmap();
        planets.regenerate_all(tick_delta());
        assert_eq!(planets.get("Gamma").unwrap().resources, MAX_PLANET_RESOURCES);
    }

    #[test]
    fn base_planet_never_regenerates_or_yields() {
        let mut planets = Planets::starmap();
        planets.regenerate_all(1000.0);
        assert_eq!(planets.get("Home").unwrap().resources, 0.0);
        assert_eq!(planets.extract("Home", 50), 0);
    }

    #[test]
    fn extract_takes_at_most_whole_available_units() {
        let mut planets = Planets::starmap();
        assert_eq!(planets.extract("Alpha", 300), 300);
        assert_eq!(planets.get("Alpha").unwrap().resources, 700.0);

        let alpha = planets.get_mut("Alpha").unwrap();
        alpha.resources = 2.7;
        assert_eq!(alpha.extract(5), 2);
        assert!((alpha.resources - 0.7).abs() < 1e-3);
    }

    #[test]
    fn extract_from_unknown_planet_is_zero() {
        let mut planets = Planets::starmap();
        assert_eq!(planets.extract("Vulcan", 10), 0);
    }
}
