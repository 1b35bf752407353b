pub mod convert;
pub mod diff;
pub mod record;
pub mod util;

pub use convert::*;
pub use diff::*;
pub use record::*;
pub use util::*;
