pub mod format;
pub mod options;
pub mod response;
pub mod source;
pub mod types;

pub use format::SourceFormat;
pub use options::{Colormap, FormatChoice, GraphOptions};
pub use response::GenerateResponse;
pub use source::InputSource;
pub use types::{Point, Size};
