pub mod config;
pub mod cursor;
pub mod error;
pub mod harvester;
pub mod lock;
pub mod normalize;
pub mod query;
pub mod sink;
pub mod traits;

pub use cursor::{is_cursor_shape, Cursor, CursorStore, CursorWriteMode};
pub use error::{HarvestError, Result};
pub use harvester::{Harvester, RunStats};
pub use normalize::{extract_next_cursor, extract_records, TweetRecord};
pub use query::SearchQuery;
pub use sink::{RecordSink, RecordWriteMode};
pub use traits::SearchBackend;
