mod curve;
mod error;
mod reduce;
mod refine;
mod report;
mod table;

pub use curve::*;
pub use error::*;
pub use reduce::*;
pub use refine::*;
pub use report::*;
pub use table::*;
