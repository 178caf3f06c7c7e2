//! CLI subcommand modules.

pub(crate) mod criteria;
pub(crate) mod profile;
pub(crate) mod screen;
