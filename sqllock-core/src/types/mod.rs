mod options;
mod primitives;
mod record;

pub use options::*;
pub use primitives::*;
pub use record::*;
