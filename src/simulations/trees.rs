use crate::engine::unit::{mean, round_half_up, Simulation};
use crate::net::Snapshot;
use crate::render::{DrawBatch, DrawOp, SurfaceSize};
use crate::simulations::TREE_ASSET;
use serde::Deserialize;

const DEFAULT_HEIGHT: f64 = 30.0;
const SPRITE: f64 = 30.0;

/// A tree as reported by a node. A missing or zero height falls back to 30.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tree {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    height: Option<f64>,
}

impl Tree {
    pub fn height(&self) -> f64 {
        non_zero_or(self.height, DEFAULT_HEIGHT)
    }
}

fn non_zero_or(v: Option<f64>, default: f64) -> f64 {
    match v {
        Some(v) if v != 0.0 && !v.is_nan() => v,
        _ => default,
    }
}

/// Trees are drawn with their base at `(x, y)`.
pub struct Trees;

impl Simulation for Trees {
    type Entity = Tree;

    fn draw(&self, trees: &[Tree], _size: SurfaceSize, batch: &mut DrawBatch) {
        for t in trees {
            batch.push(DrawOp::image(TREE_ASSET, t.x - SPRITE / 2.0, t.y - SPRITE, SPRITE, SPRITE));
        }
    }

    fn stats(&self, trees: &[Tree], snapshot: &Snapshot) -> String {
        let avg = round_half_up(mean(trees, Tree::height));
        format!(
            "Trees: {} | Nodes: {} | Avg height: {}",
            trees.len(),
            snapshot.count,
            avg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(data: serde_json::Value) -> Vec<Tree> {
        let serde_json::Value::Array(items) = data else { unreachable!() };
        Trees.parse_entities(items).unwrap()
    }

    #[test]
    fn defaults_apply_to_missing_and_zero() {
        let trees = parse(json!([
            {"x": 1, "y": 2},
            {"x": 1, "y": 2, "height": 0, "growth": null},
            {"x": 1, "y": 2, "height": 55.5, "growth": 0.3}
        ]));
        assert_eq!(trees[0].height(), 30.0);
        assert_eq!(trees[1].height(), 30.0);
        assert_eq!(trees[2].height(), 55.5);
    }

    #[test]
    fn sprite_sits_on_the_base() {
        let trees = parse(json!([{"x": 100, "y": 50, "height": 40, "growth": 0.3}]));
        let mut batch = DrawBatch::frame();
        Trees.draw(&trees, SurfaceSize::new(400, 300), &mut batch);

        assert_eq!(batch.ops()[1], DrawOp::image(TREE_ASSET, 85.0, 20.0, 30.0, 30.0));
    }

    #[test]
    fn stats_round_the_average() {
        let trees = parse(json!([{"x": 0, "y": 0, "height": 20}, {"x": 0, "y": 0, "height": 41}]));
        let snapshot = Snapshot { count: 3, ..Default::default() };
        assert_eq!(Trees.stats(&trees, &snapshot), "Trees: 2 | Nodes: 3 | Avg height: 31");
        assert_eq!(Trees.stats(&[], &snapshot), "Trees: 0 | Nodes: 3 | Avg height: 0");
    }
}
