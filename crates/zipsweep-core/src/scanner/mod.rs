/// Scanner module: orchestrates filtered filesystem scanning.
///
/// A scan is two `jwalk` passes (count, then filter) over a validated root.
/// It can run synchronously via [`scan`], or on a background thread via
/// [`Scanner::start`], which streams [`ScanMessage`]s over a bounded
/// crossbeam channel and supports cooperative cancellation.
///
/// A [`Scanner`] owns a busy flag: while one of its scans is in flight a
/// second [`Scanner::start`] is rejected with [`ScanError::AlreadyRunning`],
/// regardless of what the front end does with its buttons.
pub mod progress;
pub mod root;
pub mod walk;

pub use progress::{NoProgress, ProgressSink, ScanMessage, ScanProgress, MAX_TICK_PERCENT};
pub use root::{is_volume_root, normalize_root, validate_root};
pub use walk::{scan, ScanResult};

use crate::error::ScanError;
use crate::model::FilterCriteria;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Maximum number of progress messages that may queue up in the channel.
///
/// The scanner emits one tick per examined file; if the observer falls behind
/// the scanner stalls briefly rather than consuming unbounded heap.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Starts background scans, one at a time.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    busy: Arc<AtomicBool>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while a scan started by this scanner (or a clone of it) runs.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Validate `root` and start scanning it on a background thread.
    ///
    /// Validation errors and the busy check are reported here, synchronously;
    /// everything after (including "no files found") arrives as the terminal
    /// message on the handle's channel.
    pub fn start(
        &self,
        root: impl AsRef<Path>,
        criteria: FilterCriteria,
    ) -> Result<ScanHandle, ScanError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ScanError::AlreadyRunning);
        }
        let guard = BusyGuard(Some(self.busy.clone()));

        let root = validate_root(root.as_ref())?;

        let (progress_tx, progress_rx) =
            crossbeam_channel::bounded::<ScanMessage>(PROGRESS_CHANNEL_CAPACITY);
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let cancel_clone = cancel_flag.clone();
        let thread_root = root.clone();

        let thread = thread::Builder::new()
            .name("zipsweep-scanner".into())
            .spawn(move || {
                let mut guard = guard;
                let mut sink = progress_tx.clone();
                let start = Instant::now();

                let terminal =
                    match walk::run_passes(&thread_root, &criteria, &mut sink, &cancel_clone) {
                        Ok(summary) => ScanMessage::Complete {
                            candidates: summary.candidates,
                            examined: summary.examined,
                            duration: start.elapsed(),
                        },
                        Err(ScanError::Cancelled) => {
                            info!("Scan of {} cancelled", thread_root.display());
                            ScanMessage::Cancelled
                        }
                        Err(err) => {
                            warn!("Scan of {} failed: {err}", thread_root.display());
                            ScanMessage::Failed(err)
                        }
                    };

                // Free the scanner before announcing the end, so an observer
                // reacting to the terminal message may start the next scan.
                guard.release();
                let _ = progress_tx.send(terminal);
            })
            .map_err(|e| ScanError::io(&root, e))?;

        Ok(ScanHandle {
            root,
            progress_rx,
            cancel_flag,
            thread: Some(thread),
        })
    }
}

/// Clears the busy flag when dropped, including on panic.
struct BusyGuard(Option<Arc<AtomicBool>>);

impl BusyGuard {
    fn release(&mut self) {
        if let Some(flag) = self.0.take() {
            flag.store(false, Ordering::Release);
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Handle to a running or completed scan. Allows cancellation and
/// receiving progress updates.
pub struct ScanHandle {
    root: PathBuf,
    /// Receiver for progress updates from the scan thread.
    pub progress_rx: Receiver<ScanMessage>,
    cancel_flag: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// The normalised root being scanned; archive entry names are relative to it.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// Block until the terminal message arrives, passing every tick to
    /// `on_tick` on the way.
    pub fn wait_with(mut self, mut on_tick: impl FnMut(&ScanMessage)) -> ScanResult {
        let result = loop {
            match self.progress_rx.recv() {
                Ok(ScanMessage::Complete { candidates, .. }) => break Ok(candidates),
                Ok(ScanMessage::Failed(err)) => break Err(err),
                Ok(ScanMessage::Cancelled) => break Err(ScanError::Cancelled),
                Ok(msg) => on_tick(&msg),
                // The thread always sends a terminal message unless it panicked.
                Err(_) => break Err(ScanError::Cancelled),
            }
        };
        self.join();
        result
    }

    /// Block until the scan finishes, discarding ticks.
    pub fn wait(self) -> ScanResult {
        self.wait_with(|_| {})
    }

    /// Like [`ScanHandle::wait`], but cancels the scan if it has not finished
    /// within `timeout`.
    pub fn wait_timeout(self, timeout: Duration) -> ScanResult {
        let deadline = Instant::now() + timeout;
        loop {
            match self.progress_rx.recv_deadline(deadline) {
                Ok(msg) if msg.is_terminal() => {
                    let mut handle = self;
                    handle.join();
                    return match msg {
                        ScanMessage::Complete { candidates, .. } => Ok(candidates),
                        ScanMessage::Failed(err) => Err(err),
                        _ => Err(ScanError::Cancelled),
                    };
                }
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    self.cancel();
                    return self.wait();
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let mut handle = self;
                    handle.join();
                    return Err(ScanError::Cancelled);
                }
            }
        }
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Scanner thread panicked");
            }
        }
    }
}
