#![forbid(unsafe_code)]

pub mod adoptapet;
pub mod artifact;
pub mod cli;
pub mod enrich;
pub mod formats;
pub mod logging;
pub mod normalize;
pub mod retry;
pub mod summary;
pub mod update;
