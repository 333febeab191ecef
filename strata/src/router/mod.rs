pub mod directory;
pub mod fetch;
pub mod macros;
pub mod merge;
pub mod snapshot;
pub mod validate;

pub mod util;
