//! CLI subcommand implementations for the realty-content binary.

pub mod categories_cmd;
pub mod fetch_cmd;
pub mod mortgage_cmd;
pub mod output;
pub mod post_cmd;
pub mod probe_cmd;
pub mod schema_cmd;
