use crate::engine::unit::{mean, Simulation};
use crate::net::Snapshot;
use crate::render::{DrawBatch, DrawOp, SurfaceSize};
use crate::simulations::CLOUD_ASSET;
use serde::Deserialize;

const DEFAULT_TEMPERATURE: f64 = 20.0;
const DEFAULT_HUMIDITY: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cloud {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
}

impl Cloud {
    /// Temperature in °C, 20 when the node did not report one.
    pub fn temperature(&self) -> f64 {
        self.temperature.filter(|t| *t != 0.0).unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Relative humidity in `0.0 ..= 1.0`, 0.5 when the node did not report one.
    pub fn humidity(&self) -> f64 {
        self.humidity.filter(|h| *h != 0.0).unwrap_or(DEFAULT_HUMIDITY)
    }
}

/// Clouds and the weather they carry.
///
/// Temperature and humidity are means over the last non-empty snapshot; an
/// empty snapshot keeps the previous values. `init` restores 20 °C / 50 %.
#[derive(Debug, Clone, PartialEq)]
pub struct Climate {
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for Climate {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            humidity: DEFAULT_HUMIDITY,
        }
    }
}

impl Simulation for Climate {
    type Entity = Cloud;

    fn reset(&mut self) {
        *self = Climate::default();
    }

    fn aggregate(&mut self, clouds: &[Cloud]) {
        if clouds.is_empty() {
            return;
        }
        self.temperature = mean(clouds, Cloud::temperature);
        self.humidity = mean(clouds, Cloud::humidity);
    }

    fn draw(&self, clouds: &[Cloud], _size: SurfaceSize, batch: &mut DrawBatch) {
        for c in clouds {
            batch.push(DrawOp::image(CLOUD_ASSET, c.x - c.size / 2.0, c.y - c.size / 2.0, c.size, c.size));
        }
    }

    fn stats(&self, _clouds: &[Cloud], snapshot: &Snapshot) -> String {
        format!(
            "Temp: {:.1}°C | Humidity: {:.0}% | Nodes: {}",
            self.temperature,
            self.humidity * 100.0,
            snapshot.count
        )
    }
}
