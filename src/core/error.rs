use thiserror::Error;

/// Invalid scene or configuration, reported once before any ray is traced.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("triangle list is empty")]
    NoTriangles,
    #[error("all {0} triangles are degenerate")]
    AllTrianglesDegenerate(usize),
    #[error("kd-tree max depth {depth} exceeds the traversal stack limit of {limit}")]
    MaxDepthTooLarge { depth: u32, limit: u32 },
    #[error("samples per pixel must be positive")]
    ZeroSamples,
    #[error("triangle {triangle} references material {material}, but only {count} materials exist")]
    InvalidMaterial {
        triangle: usize,
        material: usize,
        count: usize,
    },
    #[error("emitter {emitter} covers triangles {start}..{end}, but only {count} triangles exist")]
    EmitterRangeOutOfBounds {
        emitter: usize,
        start: usize,
        end: usize,
        count: usize,
    },
    #[error("emitter {emitter} uses material {material}, but only {count} materials exist")]
    InvalidEmitterMaterial {
        emitter: usize,
        material: usize,
        count: usize,
    },
    #[error("emitter {emitter} uses material {expected}, but its triangle {triangle} uses material {found}")]
    EmitterMaterialMismatch {
        emitter: usize,
        triangle: usize,
        expected: usize,
        found: usize,
    },
    #[error("emitter {0} has no emitting area")]
    EmptyEmitter(usize),
    #[error("environment map is empty")]
    EmptyEnvironmentMap,
    #[error("stratified jitter offset {offset} + scale {scale} must stay within [0, 1]")]
    InvalidJitter { offset: f32, scale: f32 },
}
