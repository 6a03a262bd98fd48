use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::Serialize;
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `TUNEMIRROR_CONVERTER__FFMPEG_PATH`.
pub const ENV_PREFIX: &str = "TUNEMIRROR_";

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "tunemirror.toml";

/// Load configuration: TOML file, then environment, then `overrides`.
///
/// `overrides` is usually the parsed command line; fields it leaves out
/// (skipped `None`s) fall through to the lower layers.
pub fn load_config<T: Serialize>(
    path: Option<&Path>,
    overrides: &T,
) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(overrides))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
