//! Core of the project countdown.
//!
//! - [`status`] derives days left and the urgency band of a deadline.
//! - [`pipeline`] filters, sorts and partitions a collection for display.
//! - [`ProjectStore`] owns the collection and validates every mutation.
//! - [`EditSession`] tracks the edit form.
//! - [`SyncClient`] loads and saves the whole collection.

pub use error::{EngineError, PersistenceError};
pub use pipeline::{DisplayView, ProjectRow, SortMode, ViewQuery};
pub use project::{DATE_FORMAT, Project, ProjectDraft, ProjectUpdate, parse_deadline};
pub use session::{DraftField, EditSession};
pub use status::StatusBand;
pub use store::{DEFAULT_MAX_PROJECTS, PendingSave, ProjectStore, ProjectStoreBuilder, Snapshot};
pub use sync::{MemorySync, SyncClient};

pub mod blob;
mod error;
pub mod pipeline;
mod project;
mod session;
pub mod status;
mod store;
mod sync;

type ResultEngine<T> = Result<T, EngineError>;
