use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::{fs, thread};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use watch_logging::watch_warn;

use crate::decode::decode_page;
use crate::fetch::{FetchSettings, PageFetcher, ReqwestPageFetcher};
use crate::types::SourceError;

/// A page the watcher can snapshot, plus a best-effort change subscription.
///
/// Sources that cannot observe changes keep the default no-op `watch`; the
/// watcher's periodic tick still drives rescans.
pub trait ContentSource: Send {
    fn url(&self) -> &str;

    /// Reads the current page markup. Errors are per-cycle, never fatal.
    fn fetch(&mut self) -> Result<String, SourceError>;

    fn watch(&mut self, notify: mpsc::Sender<()>) -> Result<(), SourceError> {
        let _ = notify;
        Ok(())
    }
}

/// Local HTML file, e.g. one a browser session keeps saving. Change
/// notifications come from the filesystem watcher.
pub struct FileSource {
    path: PathBuf,
    url: String,
    // Kept alive for the lifetime of the subscription.
    watcher: Option<RecommendedWatcher>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let url = format!("file://{}", path.display());
        Self {
            path,
            url,
            watcher: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for FileSource {
    fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&mut self) -> Result<String, SourceError> {
        let bytes = fs::read(&self.path)?;
        Ok(decode_page(&bytes, None)?.html)
    }

    fn watch(&mut self, notify_tx: mpsc::Sender<()>) -> Result<(), SourceError> {
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
            match event {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = notify_tx.send(());
                }
                Ok(_) => {}
                Err(err) => watch_warn!("file watch error: {err}"),
            }
        })
        .map_err(|err| SourceError::Watch(err.to_string()))?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|err| SourceError::Watch(err.to_string()))?;
        self.watcher = Some(watcher);
        Ok(())
    }
}

/// Remote page polled over HTTP. No change subscription; the periodic tick
/// is the only rescan driver.
pub struct HttpSource {
    url: String,
    runtime: tokio::runtime::Runtime,
    fetcher: ReqwestPageFetcher,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, settings: FetchSettings) -> Result<Self, SourceError> {
        let url = url.into();
        url::Url::parse(&url).map_err(|err| SourceError::Watch(err.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            url,
            runtime,
            fetcher: ReqwestPageFetcher::new(settings),
        })
    }
}

impl ContentSource for HttpSource {
    fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&mut self) -> Result<String, SourceError> {
        let fetched = self.runtime.block_on(self.fetcher.fetch(&self.url))?;
        Ok(decode_page(&fetched.bytes, fetched.content_type.as_deref())?.html)
    }
}

/// In-memory source for tests and demos: `FixedContent::set` swaps the
/// markup and raises a change notification.
pub struct FixedSource {
    url: String,
    content: Arc<Mutex<FixedInner>>,
}

#[derive(Default)]
struct FixedInner {
    html: String,
    notify: Option<mpsc::Sender<()>>,
}

/// Writer half of a [`FixedSource`].
#[derive(Clone)]
pub struct FixedContent {
    content: Arc<Mutex<FixedInner>>,
}

impl FixedSource {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> (Self, FixedContent) {
        let content = Arc::new(Mutex::new(FixedInner {
            html: html.into(),
            notify: None,
        }));
        (
            Self {
                url: url.into(),
                content: content.clone(),
            },
            FixedContent { content },
        )
    }
}

impl ContentSource for FixedSource {
    fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&mut self) -> Result<String, SourceError> {
        let inner = self.content.lock().expect("lock fixed content");
        Ok(inner.html.clone())
    }

    fn watch(&mut self, notify_tx: mpsc::Sender<()>) -> Result<(), SourceError> {
        let mut inner = self.content.lock().expect("lock fixed content");
        inner.notify = Some(notify_tx);
        Ok(())
    }
}

impl FixedContent {
    /// Replaces the page markup and notifies the subscriber, if any.
    pub fn set(&self, html: impl Into<String>) {
        let notify = {
            let mut inner = self.content.lock().expect("lock fixed content");
            inner.html = html.into();
            inner.notify.clone()
        };
        if let Some(tx) = notify {
            let _ = tx.send(());
        }
    }
}

/// Bridges a source's unit change notifications into `target`, mapping each
/// one through `make_event` on a dedicated thread.
pub(crate) fn bridge_changes<E, F>(change_rx: mpsc::Receiver<()>, target: mpsc::Sender<E>, make_event: F)
where
    E: Send + 'static,
    F: Fn() -> E + Send + 'static,
{
    thread::spawn(move || {
        while change_rx.recv().is_ok() {
            if target.send(make_event()).is_err() {
                break;
            }
        }
    });
}
