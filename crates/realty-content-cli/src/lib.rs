//! Command-line front end for realty-content.

pub mod cli;
pub mod logging;
