pub mod dump;
pub mod tables;
pub mod unpack;
pub mod util;

pub use dump::*;
pub use tables::*;
pub use unpack::*;
pub use util::*;
