mod common;

use std::fs;

use approx::assert_abs_diff_eq;
use atmocor::config::Config;
use atmocor::lut::{AtmosphericLut, LutError, LutPoint};
use atmocor::readers::{DataReader, GeoTiffReader, read_scene};
use atmocor::retrieval::{AC_NODATA, SceneProcessor};
use atmocor::solar::{scale_solar_irradiance, toa_scale_factor};
use atmocor::writers::write_scene_result;
use tempfile::tempdir;

#[test]
fn lut_file_loads_and_interpolates() {
    let dir = tempdir().unwrap();
    let path = common::write_lut(dir.path());
    let lut = AtmosphericLut::from_file(&path).unwrap();

    assert_eq!(lut.vis_grid().len(), 7);
    assert_abs_diff_eq!(lut.hsf_domain().max, 2.499, epsilon = 1e-6);

    let point = LutPoint {
        vza: 18.0,
        sza: 50.0,
        raa: 90.0,
        hsf: 0.7,
        vis: 23.0,
        cwv: 2.0,
    };
    let f = lut.interpolate(&point);
    for band in [0, 7, 14] {
        for param in [0, 1, 4] {
            let expected = common::lut_value(23.0, 0.7, 2.0, param, band);
            assert_abs_diff_eq!(f[band][param], f64::from(expected), epsilon = 1e-6);
        }
    }
}

#[test]
fn missing_lut_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("NO_SUCH_LUT");
    let err = AtmosphericLut::from_file(&path).unwrap_err();
    assert!(matches!(err, LutError::Open { .. }));
    assert!(err.to_string().contains("NO_SUCH_LUT"));
}

#[test]
fn truncated_lut_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("TRUNCATED_LUT");
    let bytes = common::encode_lut();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
    assert!(matches!(
        AtmosphericLut::from_file(&path),
        Err(LutError::Corrupt { .. })
    ));
}

#[test]
fn scene_runs_from_configuration_to_rasters() {
    let dir = tempdir().unwrap();
    let lut_path = common::write_lut(dir.path());
    let inputs = common::write_scene(dir.path(), 8, 6, 100.0);
    let out = dir.path().join("out");

    let config_path = dir.path().join("config.json");
    let json = format!(
        r#"{{
            "lut_path": {:?},
            "acquisition_date": "2010-03-14",
            "cell_size": 4,
            "output_443nm_band": true,
            "output_rho_toa": true,
            "output_directory": {:?},
            "inputs": {}
        }}"#,
        lut_path.to_string_lossy(),
        out.to_string_lossy(),
        inputs
    );
    fs::write(&config_path, json).unwrap();

    let config = Config::from_file(&config_path).unwrap();
    let lut = AtmosphericLut::from_file(config.lut_path()).unwrap();
    let scene = read_scene(config.inputs()).unwrap();
    assert_eq!((scene.width, scene.height), (8, 6));

    let processor = SceneProcessor::new(
        &lut,
        config.processing_options(),
        scale_solar_irradiance(config.solar_flux()),
        toa_scale_factor(config.day_of_year()),
    )
    .unwrap();
    let result = processor.process(&scene).unwrap();
    assert_eq!(result.reflectance.len(), 13);
    assert!(result.visibility.iter().all(|&v| v >= 10.0));
    assert!(result.water_vapour.iter().all(|&w| w != AC_NODATA as f32));

    let written = write_scene_result(config.output_directory(), &result).unwrap();
    assert_eq!(written.len(), 3 + 13 + 13);

    let visibility = GeoTiffReader {
        path: out.join("cell_visibility.tif"),
    }
    .read_data()
    .unwrap();
    assert_eq!((visibility.width, visibility.height), (8, 6));
    assert_eq!(visibility.buffer, result.visibility);
    assert!(out.join("refl_2.tif").exists());
    assert!(out.join("rho_toa_13.tif").exists());
    assert!(!out.join("refl_11.tif").exists());
}
