use atmocor::config::Config;
use atmocor::lut::AtmosphericLut;
use atmocor::readers::read_scene;
use atmocor::retrieval::SceneProcessor;
use atmocor::solar::{scale_solar_irradiance, toa_scale_factor};
use atmocor::utils::log_scene_statistics;
use atmocor::writers::write_scene_result;

use log::info;

const DEFAULT_CONFIG: &str = "./data/config/scene.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    info!("Starting atmospheric correction with {}", config_path);

    let config = Config::from_file(&config_path)?;
    let lut = AtmosphericLut::from_file(config.lut_path())?;

    let scene = read_scene(config.inputs())?;
    info!(
        "Scene {}x{} acquired {} (day {})",
        scene.width,
        scene.height,
        config.acquisition_date(),
        config.day_of_year()
    );

    let processor = SceneProcessor::new(
        &lut,
        config.processing_options(),
        scale_solar_irradiance(config.solar_flux()),
        toa_scale_factor(config.day_of_year()),
    )?;
    let result = processor.process(&scene)?;

    log_scene_statistics(&result);
    write_scene_result(config.output_directory(), &result)?;

    Ok(())
}
