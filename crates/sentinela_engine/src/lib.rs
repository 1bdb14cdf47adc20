//! Sentinela engine: content sources, runtime loops and effect execution.
mod alert;
mod coordinator;
mod decode;
mod fetch;
mod highlight;
mod page;
mod persist;
mod source;
mod types;
mod watcher;

pub use alert::{
    AlertError, AlertNotification, AlertSink, AlertSound, DesktopAlertSink, MemoryAlertSink,
};
pub use coordinator::{CoordinatorClient, CoordinatorHandle, NullStateStore, StateStore};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use fetch::{FetchSettings, FetchedPage, PageFetcher, ReqwestPageFetcher};
pub use highlight::{
    strip_text_markers, wrap_first_occurrence, Banner, HighlightLayer, ELEMENT_MARK_CLASS,
    ELEMENT_MARK_STYLE, TEXT_MARK_CLASS,
};
pub use page::PageParser;
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use source::{ContentSource, FileSource, FixedContent, FixedSource, HttpSource};
pub use types::{FailureKind, FetchError, SourceError, WatcherConfig};
pub use watcher::{WatcherHandle, WatcherProbe};
