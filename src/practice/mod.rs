pub mod tasks;
pub mod timer;
pub mod ticker;
pub mod composition;
pub mod submission;
pub mod summary;

pub use tasks::*;
pub use timer::*;
pub use ticker::*;
pub use composition::*;
pub use submission::*;
pub use summary::*;
