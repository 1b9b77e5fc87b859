//! Frame acquisition: a dedicated reader thread that scans, decodes, and
//! normalizes frames, publishing each through a bounded single-slot channel.
//!
//! The slot holds at most one frame. When the consumer lags, the worker
//! drops the stale frame and publishes the new one, so the consumer always
//! sees the newest complete frame and never a backlog. Telemetry lines the
//! device prints between frames land in a latest-value snapshot next to the
//! slot.

use std::io::Read;
use std::sync::{Arc, RwLock};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use tracing::{debug, warn};

use crate::models::DisplayFrame;
use crate::protocol::{DecodeError, StreamEvent, decoder};

use super::normalize::normalize;

/// The device's own detection results, as printed between frames.
/// Latest value wins; `None` until the device first reports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Telemetry {
    /// x position of the lane center the device last reported
    pub center: Option<u32>,
    /// x position of the solid outside line the device last reported
    pub outside_line: Option<u32>,
}

/// Consumer end of the acquisition handoff.
///
/// Dropping the receiver disconnects the channel; the worker notices on its
/// next publish and exits. No other shutdown signal exists or is needed.
pub struct FrameReceiver {
    receiver: Receiver<DisplayFrame>,
    telemetry: Arc<RwLock<Telemetry>>,
}

impl FrameReceiver {
    /// Block until the next frame, or `None` once the worker has exited and
    /// the slot is drained.
    pub fn recv(&self) -> Option<DisplayFrame> {
        self.receiver.recv().ok()
    }

    /// Take the newest available frame without blocking, skipping any frame
    /// published since the last call. `None` when nothing new arrived.
    pub fn latest(&self) -> Option<DisplayFrame> {
        let mut latest = None;
        while let Ok(frame) = self.receiver.try_recv() {
            latest = Some(frame);
        }
        latest
    }

    /// Snapshot of the telemetry received so far. Updates published before a
    /// frame are visible by the time that frame is received.
    pub fn telemetry(&self) -> Telemetry {
        *self.telemetry.read().unwrap()
    }
}

/// Start the reader worker over a byte source and return the consumer end.
///
/// The worker runs until the source ends or the receiver is dropped. Decode
/// errors are logged and the scan resumes at the next marker; only
/// end-of-source stops the worker.
pub fn spawn_frame_reader<R>(source: R) -> FrameReceiver
where
    R: Read + Send + 'static,
{
    let (sender, receiver) = bounded(1);
    let slot = receiver.clone();
    let telemetry = Arc::new(RwLock::new(Telemetry::default()));
    let shared = Arc::clone(&telemetry);
    thread::spawn(move || reader_loop(source, sender, slot, shared));
    FrameReceiver {
        receiver,
        telemetry,
    }
}

fn reader_loop<R: Read>(
    mut source: R,
    sender: Sender<DisplayFrame>,
    slot: Receiver<DisplayFrame>,
    telemetry: Arc<RwLock<Telemetry>>,
) {
    loop {
        match decoder::read_event(&mut source) {
            Ok(StreamEvent::Frame(raw)) => {
                let frame = normalize(&raw);
                if !publish(&sender, &slot, frame) {
                    debug!("receiver dropped, reader exiting");
                    return;
                }
            }
            Ok(StreamEvent::Center(x)) => {
                debug!(x, "device center line");
                telemetry.write().unwrap().center = Some(x);
            }
            Ok(StreamEvent::OutsideLine(x)) => {
                debug!(x, "device solid line");
                telemetry.write().unwrap().outside_line = Some(x);
            }
            Err(DecodeError::TruncatedStream) => {
                debug!("source ended, reader exiting");
                return;
            }
            Err(err) => {
                warn!(%err, "dropping message, rescanning for a marker");
            }
        }
    }
}

/// Publish newest-wins: when the slot is full, drain the stale frame first.
/// Returns false once the receiver is gone.
fn publish(sender: &Sender<DisplayFrame>, slot: &Receiver<DisplayFrame>, frame: DisplayFrame) -> bool {
    match sender.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(frame)) => {
            // Single producer: after draining one, the retry can only fail
            // by disconnection.
            let _ = slot.try_recv();
            !matches!(sender.try_send(frame), Err(TrySendError::Disconnected(_)))
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}
