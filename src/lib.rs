pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{Aggressiveness, ClassifierKind, Config};
pub use error::{Result, VadsplitError};
pub use pipeline::{
    plan_chunks, plan_chunks_with, print_summary, split_media, split_media_with_cancel,
    PipelineOptions,
    PipelineResult, PipelineStats,
};
