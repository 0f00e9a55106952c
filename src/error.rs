use thiserror::Error;

/// Errors raised while composing a scene.
///
/// IO and GPU failures travel as `anyhow::Error`; these are the cases callers
/// are expected to match on.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("node '{0}' is not a mesh and cannot be outlined")]
    NotAMesh(String),
    #[error("placement for '{0}' has no position")]
    MissingPosition(String),
    #[error("unknown ease '{0}'")]
    UnknownEase(String),
    #[error("unsupported asset type for '{0}'")]
    UnsupportedAsset(String),
    #[error("asset '{0}' contains no scene nodes")]
    EmptyAsset(String),
}
