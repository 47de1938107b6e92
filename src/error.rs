use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::scene::{GroupKey, SceneId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset `{name}` cannot be built at {w}x{h}")]
    InvalidSize { name: &'static str, w: i64, h: i64 },
}

/// Everything that can stop a run. None of these are retried.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("scene {0} finished without declaring the scene to go to")]
    MissingNextScene(SceneId),
    #[error("no scene is registered as {0}")]
    UnknownScene(SceneId),
    #[error("scene {scene} needs group `{group}` but it was not handed over")]
    MissingGroup { scene: SceneId, group: GroupKey },
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}
