/// Scan progress reporting: lightweight messages sent from the scan
/// thread to whichever thread observes it.
use crate::error::ScanError;
use crate::model::FileCandidate;
use crossbeam_channel::Sender;
use std::path::PathBuf;
use std::time::Duration;

/// Highest percentage a tick may report. 100 % is only implied by the
/// terminal [`ScanMessage::Complete`].
pub const MAX_TICK_PERCENT: u8 = 99;

/// One incremental report: `examined` regular files out of `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    pub examined: u64,
    pub total: u64,
    pub current_path: Option<PathBuf>,
}

impl ScanProgress {
    /// `floor(examined / total * 100)`, capped at [`MAX_TICK_PERCENT`].
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = self.examined.saturating_mul(100) / self.total;
        pct.min(u64::from(MAX_TICK_PERCENT)) as u8
    }
}

/// Messages delivered over a background scan's channel, in production order.
///
/// A scan emits exactly one terminal message (`Complete`, `Failed`, or
/// `Cancelled`) and nothing after it.
#[derive(Debug)]
pub enum ScanMessage {
    /// The counting pass finished; `total` regular files will be examined.
    Started { total: u64 },
    /// Periodic update, one per examined regular file.
    Tick(ScanProgress),
    /// Scanning completed successfully (the 100 % signal).
    Complete {
        candidates: Vec<FileCandidate>,
        examined: u64,
        duration: Duration,
    },
    /// The scan aborted; no partial candidate list is delivered.
    Failed(ScanError),
    /// Scan was cancelled by the caller.
    Cancelled,
}

impl ScanMessage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete { .. } | Self::Failed(_) | Self::Cancelled
        )
    }
}

/// Receives progress from a running scan.
///
/// Returning `false` asks the scanner to stop; it then finishes with
/// [`ScanError::Cancelled`].
pub trait ProgressSink {
    fn started(&mut self, _total: u64) -> bool {
        true
    }

    fn tick(&mut self, progress: ScanProgress) -> bool;
}

/// Discards every tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn tick(&mut self, _progress: ScanProgress) -> bool {
        true
    }
}

/// Collects ticks in memory; handy for tests and headless callers.
impl ProgressSink for Vec<ScanProgress> {
    fn tick(&mut self, progress: ScanProgress) -> bool {
        self.push(progress);
        true
    }
}

/// Forwards to a channel. A disconnected receiver stops the scan, since
/// nobody is left to consume its result.
impl ProgressSink for Sender<ScanMessage> {
    fn started(&mut self, total: u64) -> bool {
        self.send(ScanMessage::Started { total }).is_ok()
    }

    fn tick(&mut self, progress: ScanProgress) -> bool {
        self.send(ScanMessage::Tick(progress)).is_ok()
    }
}
