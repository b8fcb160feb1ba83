use crate::adapters::pixel_format::rgba_to_rgb;
use crate::controllers::ports::surface::Surface;
use crate::presenters::rgba_surface::RgbaSurface;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes the surface as a binary PPM, dropping alpha.
pub fn write_ppm(surface: &RgbaSurface, filepath: impl AsRef<Path>) -> io::Result<()> {
    let file = std::fs::File::create(filepath)?;
    let mut writer = BufWriter::new(file);

    encode_ppm(surface, &mut writer)?;

    writer.flush()
}

pub fn encode_ppm(surface: &RgbaSurface, writer: &mut impl Write) -> io::Result<()> {
    // P6 means binary RGB, then width, height and max_colour
    writeln!(writer, "P6")?;
    writeln!(writer, "{} {}", surface.width(), surface.height())?;
    writeln!(writer, "255")?;
    writer.write_all(&rgba_to_rgb(surface.pixels()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_header_and_rgb_body() {
        let mut surface = RgbaSurface::new(2, 1);
        surface
            .write_block(1, 0, 1, 1, &[10, 20, 30, 255])
            .unwrap();
        let mut out = Vec::new();

        encode_ppm(&surface, &mut out).unwrap();

        let mut expected = b"P6\n2 1\n255\n".to_vec();
        expected.extend_from_slice(&[0, 0, 0, 10, 20, 30]);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_write_ppm_creates_file() {
        let path = std::env::temp_dir().join(format!("tile_fractal_{}.ppm", std::process::id()));

        write_ppm(&RgbaSurface::new(3, 3), &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written.len(), b"P6\n3 3\n255\n".len() + 27);
    }
}
