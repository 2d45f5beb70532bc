//! Navigation core for searchstate.
//!
//! Wires the reactive store, the validated-search cache and the middleware
//! pipeline into a batched navigation mechanism:
//!
//! - [`adapter`]: the host boundary ([`SearchStateAdapter`], [`Location`],
//!   [`MemoryAdapter`])
//! - [`scheduler`]: the once-per-frame callback contract
//!   ([`FrameScheduler`], [`ManualScheduler`])
//! - [`queue`]: the per-scope [`NavigationQueue`]
//! - [`scope`]: [`SearchScope`], owner of one store/cache/queue triple
//! - [`handle`]: [`SearchHandle`], the validator-bound application API
//! - [`flush`]: the reduction and commit procedure
//! - [`storage`]: sticky-param persistence and recovery
//!
//! ## Data flow
//!
//! ```text
//! adapter location change ─> scope.location_changed ─> store (diff, notify)
//! handle.navigate ─> queue ─> scheduler frame ─> flush:
//!     reduce ─> clean ─> encode ─> compare ─> middleware ─> adapter commit
//! ```

pub mod adapter;
pub mod flush;
pub mod handle;
pub mod queue;
pub mod scheduler;
pub mod scope;
pub mod storage;

pub use adapter::{Commit, CommitKind, Location, MemoryAdapter, SearchStateAdapter};
pub use flush::FlushOutcome;
pub use handle::{NavigateRequest, SearchHandle, SearchHandleBuilder, SearchUpdate};
pub use queue::{NavigationQueue, OnBeforeNavigate};
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use scope::{SearchScope, SearchScopeBuilder};
pub use storage::{MemoryStorage, ParamStorage, SyncParam, persist_search_params, store_key};
