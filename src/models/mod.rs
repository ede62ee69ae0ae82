pub mod mosaic;
pub mod schedule;
pub mod target;
pub mod time;
pub mod visibility;

pub use mosaic::*;
pub use schedule::*;
pub use target::*;
pub use time::*;
pub use visibility::*;
