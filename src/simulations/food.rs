use crate::engine::unit::{mean, round_half_up, Simulation};
use crate::net::Snapshot;
use crate::render::{DrawBatch, DrawOp, SurfaceSize};
use crate::simulations::FOOD_ASSET;
use serde::Deserialize;

const MIN_SPRITE: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resource {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub regen: f64,
}

impl Resource {
    /// Sprite edge length, proportional to the amount left.
    pub fn sprite_size(&self) -> f64 {
        (self.amount * 0.2).max(MIN_SPRITE)
    }
}

/// Food resources, drawn centred and scaled by amount.
pub struct Food;

impl Simulation for Food {
    type Entity = Resource;

    fn draw(&self, resources: &[Resource], _size: SurfaceSize, batch: &mut DrawBatch) {
        for r in resources {
            let size = r.sprite_size();
            batch.push(DrawOp::image(FOOD_ASSET, r.x - size / 2.0, r.y - size / 2.0, size, size));
        }
    }

    fn stats(&self, resources: &[Resource], snapshot: &Snapshot) -> String {
        let avg = round_half_up(mean(resources, |r| r.amount));
        format!(
            "Resources: {} | Nodes: {} | Average: {}",
            resources.len(),
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
    fn sprite_never_smaller_than_minimum() {
        let resources = Food
            .parse_entities(vec![
                json!({"x": 100, "y": 100, "amount": 50, "regen": 0.5}),
                json!({"x": 100, "y": 100, "amount": 150}),
            ])
            .unwrap();
        assert_eq!(resources[0].sprite_size(), 15.0);
        assert_eq!(resources[1].sprite_size(), 30.0);

        let mut batch = DrawBatch::frame();
        Food.draw(&resources, SurfaceSize::new(400, 300), &mut batch);
        assert_eq!(batch.ops()[1], DrawOp::image(FOOD_ASSET, 92.5, 92.5, 15.0, 15.0));
        assert_eq!(batch.ops()[2], DrawOp::image(FOOD_ASSET, 85.0, 85.0, 30.0, 30.0));

        let snapshot = Snapshot { count: 1, ..Default::default() };
        assert_eq!(Food.stats(&resources, &snapshot), "Resources: 2 | Nodes: 1 | Average: 100");
    }
}
