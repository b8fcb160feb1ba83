use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("block {width}x{height} at ({x}, {y}) exceeds {surface_width}x{surface_height} surface")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        surface_width: u32,
        surface_height: u32,
    },
    #[error("block {width}x{height} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A resizable RGBA raster the compositor draws into.
pub trait Surface {
    fn resize(&mut self, width: u32, height: u32);

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Copies a row-major `width × height` RGBA block so its top-left pixel
    /// lands at `(x, y)`.
    fn write_block(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<(), SurfaceError>;
}

/// Checks a block against a surface before it is written.
pub fn check_block(
    surface_width: u32,
    surface_height: u32,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<(), SurfaceError> {
    let expected = width as usize * height as usize * 4;

    if rgba.len() != expected {
        return Err(SurfaceError::SizeMismatch {
            width,
            height,
            expected,
            actual: rgba.len(),
        });
    }

    if x as u64 + width as u64 > surface_width as u64 || y as u64 + height as u64 > surface_height as u64 {
        return Err(SurfaceError::OutOfBounds {
            x,
            y,
            width,
            height,
            surface_width,
            surface_height,
        });
    }

    Ok(())
}
