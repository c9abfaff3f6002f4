pub mod scheduler;
pub mod session;
pub mod status;
pub mod svg;
pub mod viewport;

pub use scheduler::{GenerationScheduler, Phase, DEBOUNCE_MS};
pub use session::{GenerateOutcome, GenerateRequest, MountedGraph, ViewerSession};
pub use status::{Status, StatusKind};
pub use viewport::{PointerButton, PointerTarget, ViewportTransform};
