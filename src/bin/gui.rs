use tile_fractal::RenderConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };

    tile_fractal::run_gui(&config)
}
