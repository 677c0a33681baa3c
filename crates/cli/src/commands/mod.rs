//! One module per subcommand.

pub mod bpt;
pub mod cuts;
pub mod info;
pub mod qfz;
pub mod render;
pub mod watershed;
