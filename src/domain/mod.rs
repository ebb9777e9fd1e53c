pub mod error;
pub mod link;
pub mod model;

pub use error::{AppError, LinkError, Operation};
pub use link::SourceLink;
pub use model::{DownloadAck, DownloadRecord, Format, ResolvedFile};
