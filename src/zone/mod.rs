//! Line-oriented editing of zone text. Nothing here touches the filesystem.
pub mod list;
pub mod locate;
pub mod record;
pub mod serial;

pub use list::list;
pub use locate::{find_existing, insertion_point, remove_matching, splice};
pub use record::{DEFAULT_TTL, RecordType, format_record};
pub use serial::{SerialBump, SerialOutcome, bump};
