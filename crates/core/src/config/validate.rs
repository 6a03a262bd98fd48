use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Input directory exists and is a directory
/// - A codec is given, or implied by compatibility mode
/// - Worker count and timeout are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !config.input_dir.exists() {
        return Err(ConfigError::ValidationError(format!(
            "input directory does not exist: {}",
            config.input_dir.display()
        )));
    }
    if !config.input_dir.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "input path is not a directory: {}",
            config.input_dir.display()
        )));
    }

    config.resolved_codec()?;

    if config.processor.max_workers == Some(0) {
        return Err(ConfigError::ValidationError(
            "processor.max_workers cannot be 0".to_string(),
        ));
    }

    if config.converter.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "converter.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
