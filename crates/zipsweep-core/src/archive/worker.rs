/// Run an archive build on a worker thread so an event loop never blocks on it.
use super::{build, ArchiveRequest, ArchiveResult};
use crate::error::ArchiveError;
use crossbeam_channel::Receiver;
use std::thread;
use tracing::warn;

/// Handle to a background archive build. The channel receives exactly one
/// message.
pub struct ArchiveHandle {
    pub result_rx: Receiver<Result<ArchiveResult, ArchiveError>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ArchiveHandle {
    /// Block until the build finishes.
    pub fn wait(mut self) -> Option<Result<ArchiveResult, ArchiveError>> {
        let result = self.result_rx.recv().ok();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Archive thread panicked");
            }
        }
        result
    }
}

/// Start [`build`] on a background thread.
pub fn spawn_build(request: ArchiveRequest) -> Result<ArchiveHandle, ArchiveError> {
    let (result_tx, result_rx) = crossbeam_channel::bounded(1);
    let destination = request.destination.clone();

    let thread = thread::Builder::new()
        .name("zipsweep-archiver".into())
        .spawn(move || {
            let _ = result_tx.send(build(request));
        })
        .map_err(|e| ArchiveError::io(destination, e))?;

    Ok(ArchiveHandle {
        result_rx,
        thread: Some(thread),
    })
}
