//! Collection filtering: configuration, tag filtering, the multi-stage pipeline and
//! its progressive (batched) runner.

pub mod config;
pub mod pipeline;
pub mod progressive;
pub mod tags;

pub use config::{CategoryFilter, FilterConfig, FilterMode, TypeFilter};
pub use pipeline::FilterPipeline;
pub use progressive::{ProgressiveFilterRunner, RunTicket, filter_progressive};
pub use tags::{TagFilterEngine, matches_tags};
