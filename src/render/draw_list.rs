//! Draw instructions and draw batches.
//!
//! A [`DrawOp`] is the portable form of one drawing instruction: a command
//! name plus an ordered list of number/string arguments. It serializes as
//! `{"cmd": "image", "args": ["/static/img/arbol.png", 85, 20, 30, 30]}`, so a
//! batch can cross any channel or process boundary unchanged.
//!
//! A [`DrawBatch`] is one full frame. Batches built with [`DrawBatch::frame`]
//! always start with a `clear`.
//!
//! # Example
//!
//! ```rust
//! use ecosim::render::{DrawBatch, DrawCommand, DrawOp};
//!
//! let mut batch = DrawBatch::frame();
//! batch.push(DrawOp::rect(0.0, 0.0, 400.0, 20.0, "#87ceeb"));
//! batch.push(DrawOp::circle(200.0, 150.0, 12.0, "orange"));
//!
//! assert_eq!(batch.len(), 3);
//! assert!(matches!(batch.ops()[0].decode(), Ok(DrawCommand::Clear)));
//! ```

use serde::{Deserialize, Serialize};

/// RGBA color used for drawing commands.
///
/// Channels are represented as `f32` in the range `0.0 ..= 1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel (opacity)
    pub a: f32,
}

impl Color {
    /// Creates a new color from `f32` channel values in the range `0.0 ..= 1.0`.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    /// Creates a new color from `u8` channel values in the range `0 ..= 255`.
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Returns the color as straight RGBA8.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [c(self.r), c(self.g), c(self.b), c(self.a)]
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` or a common CSS color name.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }

        let (r, g, b, a) = match s.to_ascii_lowercase().as_str() {
            "black" => (0, 0, 0, 255),
            "white" => (255, 255, 255, 255),
            "red" => (255, 0, 0, 255),
            "green" => (0, 128, 0, 255),
            "blue" => (0, 0, 255, 255),
            "yellow" => (255, 255, 0, 255),
            "orange" => (255, 165, 0, 255),
            "brown" => (165, 42, 42, 255),
            "gray" | "grey" => (128, 128, 128, 255),
            "skyblue" => (135, 206, 235, 255),
            "forestgreen" => (34, 139, 34, 255),
            "transparent" => (0, 0, 0, 0),
            _ => return None,
        };
        Some(Color::from_u8(r, g, b, a))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);

    match hex.len() {
        3 => Some(Color::from_u8(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
        6 => Some(Color::from_u8(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Color::from_u8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// A single instruction argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpArg {
    Number(f64),
    Text(String),
}

impl From<f64> for OpArg {
    fn from(v: f64) -> Self {
        OpArg::Number(v)
    }
}

impl From<&str> for OpArg {
    fn from(v: &str) -> Self {
        OpArg::Text(v.to_string())
    }
}

impl From<String> for OpArg {
    fn from(v: String) -> Self {
        OpArg::Text(v)
    }
}

/// Portable drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOp {
    pub cmd: String,
    #[serde(default)]
    pub args: Vec<OpArg>,
}

/// Typed view of a [`DrawOp`], borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand<'a> {
    /// Wipe the whole surface.
    Clear,
    /// Draw the cached image at `path` scaled to `w × h` with its top-left at `(x, y)`.
    Image { path: &'a str, x: f64, y: f64, w: f64, h: f64 },
    /// Filled disc centred at `(x, y)`.
    Circle { x: f64, y: f64, r: f64, color: &'a str },
    /// Filled axis-aligned rectangle.
    Rect { x: f64, y: f64, w: f64, h: f64, color: &'a str },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown draw command {0:?}")]
    UnknownCommand(String),
    #[error("argument {index} of {cmd:?} is missing or has the wrong type")]
    BadArgument { cmd: String, index: usize },
}

impl DrawOp {
    pub fn new(cmd: impl Into<String>, args: Vec<OpArg>) -> Self {
        Self { cmd: cmd.into(), args }
    }

    pub fn clear() -> Self {
        Self::new("clear", Vec::new())
    }

    pub fn image(path: &str, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new("image", vec![path.into(), x.into(), y.into(), w.into(), h.into()])
    }

    pub fn circle(x: f64, y: f64, r: f64, color: &str) -> Self {
        Self::new("circle", vec![x.into(), y.into(), r.into(), color.into()])
    }

    pub fn rect(x: f64, y: f64, w: f64, h: f64, color: &str) -> Self {
        Self::new("rect", vec![x.into(), y.into(), w.into(), h.into(), color.into()])
    }

    /// Decodes the instruction. Unknown commands are reported as
    /// [`DecodeError::UnknownCommand`] so callers can skip them.
    pub fn decode(&self) -> Result<DrawCommand<'_>, DecodeError> {
        match self.cmd.as_str() {
            "clear" => Ok(DrawCommand::Clear),
            "image" => Ok(DrawCommand::Image {
                path: self.text(0)?,
                x: self.number(1)?,
                y: self.number(2)?,
                w: self.number(3)?,
                h: self.number(4)?,
            }),
            "circle" => Ok(DrawCommand::Circle {
                x: self.number(0)?,
                y: self.number(1)?,
                r: self.number(2)?,
                color: self.text(3)?,
            }),
            "rect" => Ok(DrawCommand::Rect {
                x: self.number(0)?,
                y: self.number(1)?,
                w: self.number(2)?,
                h: self.number(3)?,
                color: self.text(4)?,
            }),
            other => Err(DecodeError::UnknownCommand(other.to_string())),
        }
    }

    fn number(&self, index: usize) -> Result<f64, DecodeError> {
        match self.args.get(index) {
            Some(OpArg::Number(n)) if n.is_finite() => Ok(*n),
            _ => Err(self.bad_argument(index)),
        }
    }

    fn text(&self, index: usize) -> Result<&str, DecodeError> {
        match self.args.get(index) {
            Some(OpArg::Text(s)) => Ok(s),
            _ => Err(self.bad_argument(index)),
        }
    }

    fn bad_argument(&self, index: usize) -> DecodeError {
        DecodeError::BadArgument {
            cmd: self.cmd.clone(),
            index,
        }
    }
}

/// One frame worth of draw instructions, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawBatch {
    ops: Vec<DrawOp>,
}

impl DrawBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Creates a batch that starts with `clear`, as every frame must.
    pub fn frame() -> Self {
        Self { ops: vec![DrawOp::clear()] }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawOp> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl From<Vec<DrawOp>> for DrawBatch {
    fn from(ops: Vec<DrawOp>) -> Self {
        Self { ops }
    }
}

impl<'a> IntoIterator for &'a DrawBatch {
    type Item = &'a DrawOp;
    type IntoIter = std::slice::Iter<'a, DrawOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
