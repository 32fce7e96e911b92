use crate::assets::AssetError;
use std::io::{Cursor, Write};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Decoded image in straight (non-premultiplied) RGBA8.
#[derive(Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Image {
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(AssetError::Decode(format!(
                "pixel buffer holds {} bytes, {}x{} needs {}",
                pixels.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self { width, height, pixels })
    }

    /// RGBA of the pixel at `(x, y)`. Caller guarantees the coordinates are in range.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Encodes the image as PNG into `out`.
    pub fn write_png<W: Write>(&self, out: W) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(out, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.pixels.len())
            .finish()
    }
}

/// Decodes a PNG file into RGBA8. Any other format is rejected.
pub fn decode_png(bytes: &[u8]) -> Result<Image, AssetError> {
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(AssetError::Unsupported);
    }

    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().map_err(|e| AssetError::Decode(e.to_string()))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| AssetError::Decode(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let pixels = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 0xff])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 0xff]).collect(),
        png::ColorType::Indexed => {
            return Err(AssetError::Decode("palette was not expanded".to_string()));
        }
    };

    Image::from_raw(info.width, info.height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn rgb_gets_opaque_alpha() {
        let bytes = encode(2, 1, png::ColorType::Rgb, &[255, 0, 0, 0, 0, 255]);
        let img = decode_png(&bytes).unwrap();
        assert_eq!((img.width, img.height), (2, 1));
        assert_eq!(img.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(img.pixel(1, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn grayscale_alpha_expands() {
        let bytes = encode(1, 1, png::ColorType::GrayscaleAlpha, &[100, 50]);
        let img = decode_png(&bytes).unwrap();
        assert_eq!(img.pixel(0, 0), [100, 100, 100, 50]);
    }

    #[test]
    fn jpeg_is_unsupported() {
        let jpeg_header = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert!(matches!(decode_png(&jpeg_header), Err(AssetError::Unsupported)));
    }

    #[test]
    fn truncated_png_fails() {
        let bytes = encode(4, 4, png::ColorType::Rgba, &[7u8; 64]);
        assert!(matches!(decode_png(&bytes[..20]), Err(AssetError::Decode(_))));
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(Image::from_raw(2, 2, vec![0; 16]).is_ok());
        assert!(Image::from_raw(2, 2, vec![0; 15]).is_err());
    }
}
