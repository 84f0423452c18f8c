use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config file {}", .path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid snake color in config")]
    Color(#[from] ColorError),
}

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("could not read preferences from {}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("corrupt preferences file {}", .path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("could not encode preferences")]
    Serialize(#[from] toml::ser::Error),

    #[error("could not write preferences to {}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("color {0:?} is not of the form #rrggbb")]
    Format(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("playback rejected: {0}")]
    Rejected(&'static str),
}
