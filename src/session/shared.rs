//! Thread-safe session handle and background folder scans.
//!
//! Each folder load takes a generation token. When a scan finishes it only
//! installs its result if no newer load started in the meantime, so a slow
//! scan of a folder the user already left can never overwrite the current
//! one.
//!
//! Observers subscribed on the gallery run while the session write lock is
//! held and must not lock the session themselves.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};

use rayon::prelude::*;

use super::Session;
use crate::caption::CaptionStore;
use crate::model::ImageId;
use crate::project::{ScanError, discover_images};

/// Generation number of a folder load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanToken(u64);

/// How a folder load ended.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The scan result was installed
    Applied {
        /// Number of images loaded
        images: usize,
    },
    /// A newer load started before this one finished; nothing was changed
    Stale,
    /// The folder could not be listed
    Failed(ScanError),
    /// The scan thread panicked
    Aborted,
}

/// A folder scan running on a background thread.
#[derive(Debug)]
pub struct FolderScan {
    token: ScanToken,
    folder: PathBuf,
    handle: JoinHandle<ScanOutcome>,
}

impl FolderScan {
    /// Token of this scan.
    pub fn token(&self) -> ScanToken {
        self.token
    }

    /// Folder being scanned.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Wait for the scan to finish.
    pub fn join(self) -> ScanOutcome {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                log::error!("Folder scan of {:?} panicked", self.folder);
                ScanOutcome::Aborted
            }
        }
    }
}

/// A [`Session`] shared between the UI thread and scan threads.
#[derive(Debug, Clone)]
pub struct SharedSession {
    session: Arc<RwLock<Session>>,
    generation: Arc<AtomicU64>,
}

impl SharedSession {
    /// Wrap a session.
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Lock the session for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the session for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new folder load, invalidating every earlier token.
    pub fn begin_scan(&self) -> ScanToken {
        ScanToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `token` belongs to the most recent folder load.
    pub fn is_current(&self, token: ScanToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Load a folder on the calling thread.
    pub fn open_folder(&self, folder: &Path) -> ScanOutcome {
        let token = self.begin_scan();
        self.run_scan(token, folder, &|_: usize, _: usize| {})
    }

    /// Load a folder on a background thread.
    ///
    /// `progress` is called with `(done, total)` as captions are read, from
    /// rayon worker threads.
    pub fn open_folder_in_background<P>(
        &self,
        folder: impl Into<PathBuf>,
        progress: P,
    ) -> std::io::Result<FolderScan>
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        let folder = folder.into();
        let token = self.begin_scan();
        let shared = self.clone();
        let thread_folder = folder.clone();

        let handle = thread::Builder::new()
            .name("folder-scan".to_string())
            .spawn(move || {
                log::debug!("Folder scan {:?} started for {:?}", token, thread_folder);
                shared.run_scan(token, &thread_folder, &progress)
            })?;

        Ok(FolderScan {
            token,
            folder,
            handle,
        })
    }

    /// Install a finished scan, unless a newer load has started.
    pub fn apply_scan(
        &self,
        token: ScanToken,
        folder: &Path,
        entries: Vec<(ImageId, Vec<String>)>,
    ) -> ScanOutcome {
        let mut session = self.write();
        if !self.is_current(token) {
            log::debug!("Discarding stale scan of {:?}", folder);
            return ScanOutcome::Stale;
        }
        let images = session.install_folder(folder, entries);
        ScanOutcome::Applied { images }
    }

    fn run_scan<P>(&self, token: ScanToken, folder: &Path, progress: &P) -> ScanOutcome
    where
        P: Fn(usize, usize) + Sync,
    {
        let images = match discover_images(folder) {
            Ok(images) => images,
            Err(e) => {
                log::warn!("{}", e);
                return ScanOutcome::Failed(e);
            }
        };
        if !self.is_current(token) {
            return ScanOutcome::Stale;
        }

        let captions = self.read().store().captions().clone();
        let entries = read_captions(captions.as_ref(), images, progress);
        self.apply_scan(token, folder, entries)
    }
}

/// Read the captions of `images` in parallel, keeping the input order.
///
/// Images whose caption exists but cannot be read are left out with a
/// warning, so a later write cannot clobber the unread file.
pub(super) fn read_captions<P>(
    captions: &dyn CaptionStore,
    images: Vec<ImageId>,
    progress: &P,
) -> Vec<(ImageId, Vec<String>)>
where
    P: Fn(usize, usize) + Sync,
{
    let total = images.len();
    let done = AtomicUsize::new(0);

    images
        .into_par_iter()
        .filter_map(|image| {
            let result = captions.read(&image);
            progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
            match result {
                Ok(tags) => Some((image, tags)),
                Err(e) => {
                    log::warn!("Skipping {}: caption unreadable: {}", image, e);
                    None
                }
            }
        })
        .collect()
}
