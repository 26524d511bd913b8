use std::{convert::TryInto, path::Path};

use anyhow::Context;

use crate::{
    camera::{self, Camera},
    core::loader::InputParams,
    renderer::RenderConfig,
};

/// Contents of a configuration file: render options at the top level plus an
/// optional `camera` section.
pub struct LoadedConfig {
    pub render: RenderConfig,
    pub camera: Option<Camera>,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<LoadedConfig> {
    let path = path.as_ref();
    let json_file = std::fs::File::open(path)
        .with_context(|| format!("can't open config file '{}'", path.display()))?;
    let json_reader = std::io::BufReader::new(json_file);
    let json_value: serde_json::Value = serde_json::from_reader(json_reader)
        .with_context(|| format!("can't parse config file '{}'", path.display()))?;
    parse_config(json_value)
}

pub fn parse_config(mut json_value: serde_json::Value) -> anyhow::Result<LoadedConfig> {
    let root = json_value
        .as_object_mut()
        .context("config - root should be an object")?;

    let camera = match root.remove("camera") {
        Some(camera_value) => {
            let mut camera_params: InputParams = (&camera_value).try_into()?;
            Some(camera::create_camera_from_params(&mut camera_params)?)
        }
        None => None,
    };

    let mut render_params: InputParams = (&json_value).try_into()?;
    let render = RenderConfig::load(&mut render_params)?;

    Ok(LoadedConfig { render, camera })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::IntegratorMode;

    #[test]
    fn parses_render_and_camera_sections() {
        let json = serde_json::json!({
            "spp": 64,
            "integrator": "normals",
            "camera": {
                "type": "perspective",
                "eye": [0.0, 1.0, 4.0],
                "forward": [0.0, 0.0, -1.0],
                "fov": 40.0
            }
        });
        let config = parse_config(json).unwrap();
        assert_eq!(config.render.spp, 64);
        assert_eq!(config.render.integrator, IntegratorMode::Normals);
        assert!(config.camera.is_some());
    }

    #[test]
    fn reports_bad_sections() {
        assert!(parse_config(serde_json::json!([1, 2])).is_err());
        assert!(parse_config(serde_json::json!({ "camera": { "type": "fisheye" } })).is_err());
        assert!(parse_config(serde_json::json!({ "camera": { "eye": [0, 0] } })).is_err());
        assert!(parse_config(serde_json::json!({ "spp": "lots" })).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config("/nonexistent/config.json").err().unwrap();
        assert!(err.to_string().contains("config.json"));
    }
}
