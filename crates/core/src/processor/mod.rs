//! Processor module: turns a run plan into finished jobs.
//!
//! The [`Dispatcher`] walks the input tree, builds one job per audio file and
//! runs them on a bounded pool. Each job either reports its command (dry run),
//! skips an existing output, or probes, resolves a profile and converts.
//! Failures stay inside their own job and land in the [`RunSummary`].
//!
//! # Example
//!
//! ```ignore
//! use tunemirror_core::converter::{ConverterConfig, FfmpegConverter};
//! use tunemirror_core::processor::{Dispatcher, ProcessorConfig};
//!
//! let converter = FfmpegConverter::new(ConverterConfig::default());
//! let dispatcher = Dispatcher::new(ProcessorConfig::default(), converter);
//!
//! let summary = dispatcher.run(&config.run_plan()?).await?;
//! println!("{}", summary);
//! ```

mod config;
mod discovery;
mod dispatcher;
mod error;
mod executor;
mod types;

pub use config::ProcessorConfig;
pub use discovery::{discover_audio_files, is_audio_file, nested_output_root, output_path};
pub use dispatcher::Dispatcher;
pub use error::{JobError, ProcessorError};
pub use executor::ConversionExecutor;
pub use types::{JobOutcome, JobReport, RunPlan, RunSummary};
