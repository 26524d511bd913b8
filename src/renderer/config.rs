use std::{convert::TryFrom, str::FromStr};

use crate::{
    core::{error::BuildError, loader::InputParams},
    pixel_sampler::{create_pixel_sampler, PixelSampler, SamplerKind},
    primitive::MAX_KD_DEPTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorMode {
    Path,
    Normals,
    AmbientOcclusion,
}

impl FromStr for IntegratorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "normals" => Ok(Self::Normals),
            "ao" => Ok(Self::AmbientOcclusion),
            _ => anyhow::bail!("unknown integrator '{}'", s),
        }
    }
}

/// Every option the renderer recognises.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub kd_max_depth: u32,
    pub kd_min_leaf_size: usize,
    /// Number of path segments traced per camera ray, 0 leaves termination to russian
    /// roulette alone.
    pub max_path_length: u32,
    pub roulette_start_depth: u32,
    pub spp: u32,
    pub sampler: SamplerKind,
    pub jitter_offset: f32,
    pub jitter_scale: f32,
    pub integrator: IntegratorMode,
    pub ao_distance: f32,
    pub next_event_estimation: bool,
    /// 0 means one worker per logical CPU.
    pub threads: usize,
    pub tile_size: u32,
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            kd_max_depth: 24,
            kd_min_leaf_size: 5,
            max_path_length: 0,
            roulette_start_depth: 16,
            spp: 16,
            sampler: SamplerKind::Stratified,
            jitter_offset: 0.0,
            jitter_scale: 1.0,
            integrator: IntegratorMode::Path,
            ao_distance: f32::INFINITY,
            next_event_estimation: false,
            threads: 0,
            tile_size: 16,
            seed: None,
        }
    }
}

fn get_u32_or(params: &mut InputParams, key: &str, fallback: u32) -> anyhow::Result<u32> {
    let value = params.get_int_or(key, fallback as i64)?;
    u32::try_from(value)
        .map_err(|_| anyhow::anyhow!("{} - '{}' should be non-negative", params.name(), key))
}

impl RenderConfig {
    /// Missing keys keep their defaults; unknown keys are reported as warnings.
    pub fn load(params: &mut InputParams) -> anyhow::Result<Self> {
        params.set_name("render".into());
        let default = Self::default();

        let sampler = if params.contains_key("sampler") {
            params.get_str("sampler")?.parse()?
        } else {
            default.sampler
        };
        let integrator = if params.contains_key("integrator") {
            params.get_str("integrator")?.parse()?
        } else {
            default.integrator
        };
        let seed = if params.contains_key("seed") {
            Some(params.get_u64("seed")?)
        } else {
            None
        };

        let config = Self {
            kd_max_depth: get_u32_or(params, "kd_max_depth", default.kd_max_depth)?,
            kd_min_leaf_size: get_u32_or(params, "kd_min_leaf_size", default.kd_min_leaf_size as u32)?
                as usize,
            max_path_length: get_u32_or(params, "max_path_length", default.max_path_length)?,
            roulette_start_depth: get_u32_or(
                params,
                "roulette_start_depth",
                default.roulette_start_depth,
            )?,
            spp: get_u32_or(params, "spp", default.spp)?,
            sampler,
            jitter_offset: params.get_float_or("jitter_offset", default.jitter_offset)?,
            jitter_scale: params.get_float_or("jitter_scale", default.jitter_scale)?,
            integrator,
            ao_distance: params.get_float_or("ao_distance", default.ao_distance)?,
            next_event_estimation: params
                .get_bool_or("next_event_estimation", default.next_event_estimation)?,
            threads: get_u32_or(params, "threads", default.threads as u32)? as usize,
            tile_size: get_u32_or(params, "tile_size", default.tile_size)?,
            seed,
        };
        params.check_unused_keys();

        if config.tile_size == 0 {
            anyhow::bail!("{} - 'tile_size' should be positive", params.name());
        }
        if !(config.ao_distance > 0.0) {
            anyhow::bail!("{} - 'ao_distance' should be positive", params.name());
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks the options that would otherwise only fail deep inside a build.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.kd_max_depth > MAX_KD_DEPTH {
            return Err(BuildError::MaxDepthTooLarge {
                depth: self.kd_max_depth,
                limit: MAX_KD_DEPTH,
            });
        }
        self.pixel_sampler().map(|_| ())
    }

    pub fn pixel_sampler(&self) -> Result<PixelSampler, BuildError> {
        create_pixel_sampler(self.sampler, self.spp, self.jitter_offset, self.jitter_scale)
    }

    pub fn thread_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(json: &str) -> anyhow::Result<RenderConfig> {
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        let mut params = InputParams::try_from(&value)?;
        RenderConfig::load(&mut params)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = load("{}").unwrap();
        assert_eq!(config.kd_max_depth, 24);
        assert_eq!(config.kd_min_leaf_size, 5);
        assert_eq!(config.max_path_length, 0);
        assert_eq!(config.roulette_start_depth, 16);
        assert_eq!(config.spp, 16);
        assert_eq!(config.sampler, SamplerKind::Stratified);
        assert_eq!(config.integrator, IntegratorMode::Path);
        assert!(config.ao_distance.is_infinite());
        assert!(!config.next_event_estimation);
        assert_eq!(config.seed, None);
        assert!(config.thread_count() > 0);
    }

    #[test]
    fn reads_every_key() {
        let config = load(
            r#"{ "kd_max_depth": 30, "kd_min_leaf_size": 2, "max_path_length": 5,
                 "roulette_start_depth": 3, "spp": 9, "sampler": "hammersley",
                 "jitter_offset": 0.25, "jitter_scale": 0.5, "integrator": "ao",
                 "ao_distance": 2, "next_event_estimation": true, "threads": 3,
                 "tile_size": 8, "seed": 42 }"#,
        )
        .unwrap();
        assert_eq!(config.kd_max_depth, 30);
        assert_eq!(config.kd_min_leaf_size, 2);
        assert_eq!(config.max_path_length, 5);
        assert_eq!(config.roulette_start_depth, 3);
        assert_eq!(config.spp, 9);
        assert_eq!(config.sampler, SamplerKind::Hammersley);
        assert_eq!(config.jitter_offset, 0.25);
        assert_eq!(config.jitter_scale, 0.5);
        assert_eq!(config.integrator, IntegratorMode::AmbientOcclusion);
        assert_eq!(config.ao_distance, 2.0);
        assert!(config.next_event_estimation);
        assert_eq!(config.thread_count(), 3);
        assert_eq!(config.tile_size, 8);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(load(r#"{ "spp": 0 }"#).is_err());
        assert!(load(r#"{ "spp": -4 }"#).is_err());
        assert!(load(r#"{ "kd_max_depth": 200 }"#).is_err());
        assert!(load(r#"{ "integrator": "whitted" }"#).is_err());
        assert!(load(r#"{ "jitter_offset": 0.5, "jitter_scale": 0.75 }"#).is_err());
        assert!(load(r#"{ "tile_size": 0 }"#).is_err());
        assert!(load(r#"{ "seed": -3 }"#).is_err());
    }

    #[test]
    fn seeds_use_the_full_unsigned_range() {
        let config = load(r#"{ "seed": 12345678901234 }"#).unwrap();
        assert_eq!(config.seed, Some(12_345_678_901_234));
        let config = load(r#"{ "seed": 18446744073709551615 }"#).unwrap();
        assert_eq!(config.seed, Some(u64::MAX));
    }

    #[test]
    fn validate_reports_build_errors() {
        let config = RenderConfig {
            kd_max_depth: MAX_KD_DEPTH + 1,
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BuildError::MaxDepthTooLarge { .. })
        ));
        let config = RenderConfig {
            spp: 0,
            ..RenderConfig::default()
        };
        assert_eq!(config.validate(), Err(BuildError::ZeroSamples));
    }
}
