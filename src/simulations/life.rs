use crate::engine::unit::{mean, round_half_up, Simulation};
use crate::net::Snapshot;
use crate::render::{DrawBatch, DrawOp, SurfaceSize};
use crate::simulations::LION_ASSET;
use serde::Deserialize;

const SPRITE: f64 = 24.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Animal {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub energy: f64,
}

/// Animals, drawn centred on their position.
pub struct Life;

impl Simulation for Life {
    type Entity = Animal;

    fn draw(&self, animals: &[Animal], _size: SurfaceSize, batch: &mut DrawBatch) {
        for a in animals {
            batch.push(DrawOp::image(LION_ASSET, a.x - SPRITE / 2.0, a.y - SPRITE / 2.0, SPRITE, SPRITE));
        }
    }

    fn stats(&self, animals: &[Animal], snapshot: &Snapshot) -> String {
        let avg = round_half_up(mean(animals, |a| a.energy));
        format!(
            "Animals: {} | Nodes: {} | Energy: {}",
            animals.len(),
            snapshot.count,
            avg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn centred_sprites_and_energy() {
        let animals = Life
            .parse_entities(vec![
                json!({"x": 50, "y": 60, "vx": 1.5, "vy": -1, "energy": 70.2}),
                json!({"x": 10, "y": 10, "energy": 80}),
            ])
            .unwrap();

        let mut batch = DrawBatch::frame();
        Life.draw(&animals, SurfaceSize::new(400, 300), &mut batch);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.ops()[1], DrawOp::image(LION_ASSET, 38.0, 48.0, 24.0, 24.0));

        let snapshot = Snapshot { count: 2, ..Default::default() };
        assert_eq!(Life.stats(&animals, &snapshot), "Animals: 2 | Nodes: 2 | Energy: 75");
        assert_eq!(Life.stats(&[], &snapshot), "Animals: 0 | Nodes: 2 | Energy: 0");
    }

    #[test]
    fn negative_half_energy_rounds_up() {
        let animals = Life
            .parse_entities(vec![
                json!({"x": 0, "y": 0, "energy": -2}),
                json!({"x": 0, "y": 0, "energy": -3}),
            ])
            .unwrap();
        let snapshot = Snapshot { count: 1, ..Default::default() };
        assert_eq!(Life.stats(&animals, &snapshot), "Animals: 2 | Nodes: 1 | Energy: -2");
    }
}
