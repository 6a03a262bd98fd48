pub mod config;
pub mod converter;
pub mod processor;
pub mod profile;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DEFAULT_CONFIG_FILE,
    ENV_PREFIX,
};
pub use converter::{Converter, ConverterConfig, ConverterError, FfmpegConverter};
pub use processor::{Dispatcher, JobOutcome, ProcessorConfig, ProcessorError, RunPlan, RunSummary};
pub use profile::{Codec, EncodeProfile, ProfileOptions, ProfileResolver};
