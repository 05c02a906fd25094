use parking_lot::Mutex;
use pressline_config::{RunConfig, SiteConfig};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bundler::BundlerHandle;
use crate::dev::{DevEvent, SharedState};
use crate::error::Result;
use crate::watch::{FileChange, FileWatcher, WatchRouter};

/// Suppresses the reload after the very first generator build.
///
/// Browsers cannot be connected before the first build finished, so that
/// reload would go nowhere. The gate opens exactly once.
#[derive(Debug)]
pub struct ReloadGate {
    first_run: AtomicBool,
}

impl Default for ReloadGate {
    fn default() -> Self {
        Self {
            first_run: AtomicBool::new(true),
        }
    }
}

impl ReloadGate {
    /// `false` for the first call, `true` afterwards.
    pub fn should_reload(&self) -> bool {
        !self.first_run.swap(false, Ordering::AcqRel)
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run.load(Ordering::Acquire)
    }
}

/// Everything the `serve` task leaves running for the watch loop.
pub struct DevSession {
    pub server: JoinHandle<Result<()>>,
    pub watcher: FileWatcher,
    pub changes: mpsc::Receiver<FileChange>,
    pub router: WatchRouter,
}

/// State shared by every task of one command.
pub struct TaskContext {
    run: RunConfig,
    root: PathBuf,
    site: SiteConfig,
    gate: ReloadGate,
    live: Option<SharedState>,
    bundler: Mutex<Option<BundlerHandle>>,
    session: Mutex<Option<DevSession>>,
}

impl TaskContext {
    pub fn new(run: RunConfig, root: impl Into<PathBuf>, site: SiteConfig) -> Self {
        Self {
            run,
            root: root.into(),
            site,
            gate: ReloadGate::default(),
            live: None,
            bundler: Mutex::new(None),
            session: Mutex::new(None),
        }
    }

    /// Attach the dev server state that receives browser notifications.
    pub fn with_live(mut self, state: SharedState) -> Self {
        self.live = Some(state);
        self
    }

    pub fn run(&self) -> RunConfig {
        self.run
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn gate(&self) -> &ReloadGate {
        &self.gate
    }

    pub fn live(&self) -> Option<&SharedState> {
        self.live.as_ref()
    }

    /// Absolute path of the generated site.
    pub fn site_dir(&self) -> PathBuf {
        self.root.join(&self.site.generator.site_dir)
    }

    /// Push an event to connected browsers. Without a dev server this only
    /// logs at debug level.
    pub fn notify(&self, event: DevEvent) {
        match &self.live {
            Some(state) => state.broadcast(&event),
            None => tracing::debug!("No dev server for {event:?}"),
        }
    }

    /// Keep a resident bundler until [`TaskContext::shutdown`].
    pub fn keep_bundler(&self, handle: BundlerHandle) {
        let previous = self.bundler.lock().replace(handle);
        if previous.is_some() {
            tracing::warn!("Replacing a running bundler; the old process is killed on drop");
        }
    }

    pub fn install_session(&self, session: DevSession) {
        *self.session.lock() = Some(session);
    }

    pub fn take_session(&self) -> Option<DevSession> {
        self.session.lock().take()
    }

    /// Stop background processes owned by the context.
    pub async fn shutdown(&self) {
        let bundler = self.bundler.lock().take();
        if let Some(bundler) = bundler {
            tracing::debug!("Stopping bundler");
            bundler.shutdown().await;
        }
    }
}
