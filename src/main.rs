use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tile_fractal::{MandelbrotTileRenderer, PaletteKind, RenderConfig, RenderSession, RgbaSurface};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render the Mandelbrot set tile by tile on a worker pool")]
struct Cli {
    /// TOML file with render settings; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Edge length of square tiles in pixels.
    #[arg(long)]
    tile_edge: Option<u32>,
    /// Split into this many full-width bands instead of square tiles.
    #[arg(long)]
    bands: Option<u32>,
    /// Dispatch tiles nearest the centre first.
    #[arg(long)]
    center_out: bool,
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long)]
    max_iterations: Option<u32>,
    #[arg(long, allow_hyphen_values = true)]
    center_re: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    center_im: Option<f64>,
    /// Complex-plane distance covered by one pixel.
    #[arg(long)]
    scale: Option<f64>,
    #[arg(long, value_enum)]
    palette: Option<PaletteKind>,
    /// Resize to WxH while the first frame is still rendering.
    #[arg(long, value_parser = parse_size)]
    resize_to: Option<(u32, u32)>,
    #[arg(long, short = 'o', default_value = "output/mandelbrot.ppm")]
    output: PathBuf,
    /// Give up if the frame is not finished after this many seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

impl Cli {
    fn render_config(&self) -> Result<RenderConfig, tile_fractal::ConfigError> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)?,
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(tile_edge) = self.tile_edge {
            config.tile_edge = tile_edge;
        }
        if self.bands.is_some() {
            config.bands = self.bands;
        }
        if self.center_out {
            config.center_out = true;
        }
        if self.workers.is_some() {
            config.workers = self.workers;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(center_re) = self.center_re {
            config.center_re = center_re;
        }
        if let Some(center_im) = self.center_im {
            config.center_im = center_im;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(palette) = self.palette {
            config.palette = palette;
        }

        Ok(config)
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;

    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid size {s:?}: {err}"))
    };

    Ok((parse(width)?, parse(height)?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.render_config()?;
    let session_config = config.session_config()?;

    let mut session = RenderSession::new(
        session_config,
        RgbaSurface::default(),
        Arc::new(MandelbrotTileRenderer),
    )?;

    session.resize(config.width, config.height)?;

    if let Some((width, height)) = cli.resize_to {
        // Let part of the first frame land before it is superseded.
        session.pump_timeout(Duration::from_millis(20))?;
        session.resize(width, height)?;
    }

    let timeout = Duration::from_secs(cli.timeout_secs);
    if !session.wait_until_complete(timeout)? {
        warn!("frame not finished after {}s", cli.timeout_secs);
        return Err(format!("render timed out after {}s", cli.timeout_secs).into());
    }

    let progress = session.progress();
    info!(
        "finished {} with {} tiles, {} degraded",
        progress.generation, progress.total, progress.degraded
    );

    if let Some(parent) = cli.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tile_fractal::write_ppm(session.compositor().surface(), &cli.output)?;
    info!("wrote {}", cli.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("640x480"), Ok((640, 480)));
        assert_eq!(parse_size("10X2"), Ok((10, 2)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("ax2").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "tile_fractal",
            "--width",
            "320",
            "--bands",
            "4",
            "--center-re",
            "-0.5",
            "--palette",
            "fire",
            "--resize-to",
            "100x50",
        ])
        .unwrap();

        let config = cli.render_config().unwrap();

        assert_eq!(config.width, 320);
        assert_eq!(config.height, 600);
        assert_eq!(config.bands, Some(4));
        assert_eq!(config.center_re, -0.5);
        assert_eq!(config.palette, PaletteKind::Fire);
        assert_eq!(cli.resize_to, Some((100, 50)));
    }
}
