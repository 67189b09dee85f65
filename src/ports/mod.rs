//! Port traits: the collaborators the pipeline reads from and writes to.

pub mod config_port;
pub mod output_port;
pub mod record_source;
