pub mod error;
pub mod report;
pub mod wld;

// Convenient re-exports (so call sites can do `builderport_core::WldDocument`, etc.)
pub use error::{WldError, WldResult};
pub use report::{Issue, Report};
pub use wld::WldDocument;
pub use wld::model::{Direction, Exit, ExtraBlock, Room};
