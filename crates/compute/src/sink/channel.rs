use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use stealscope_core::{Result, TaskEvent};

use super::EventSink;

/// Decouples scheduler threads from a slow observer.
///
/// Callers push into an unbounded channel and return at once; a single
/// dispatcher thread forwards events downstream in arrival order and stamps
/// `seq`. If the dispatcher is gone, events are dropped with one warning.
pub struct ChannelSink {
    tx: RwLock<Option<Sender<TaskEvent>>>,
    dispatcher: Mutex<Option<JoinHandle<u64>>>,
    warned: AtomicBool,
}

impl ChannelSink {
    pub fn new(downstream: Arc<dyn EventSink>) -> Result<Self> {
        let (tx, rx) = unbounded::<TaskEvent>();
        let dispatcher = thread::Builder::new()
            .name("stealscope-events".to_string())
            .spawn(move || {
                let mut seq = 0u64;
                for mut event in rx.iter() {
                    seq += 1;
                    event.seq = seq;
                    downstream.on_event(event);
                }
                seq
            })?;
        Ok(Self {
            tx: RwLock::new(Some(tx)),
            dispatcher: Mutex::new(Some(dispatcher)),
            warned: AtomicBool::new(false),
        })
    }

    /// Stop accepting events, deliver what is queued and join the dispatcher.
    /// Returns the number of events delivered. Idempotent.
    pub fn close(&self) -> u64 {
        self.tx.write().take();
        let handle = self.dispatcher.lock().take();
        match handle.map(|h| h.join()) {
            Some(Ok(delivered)) => {
                debug!(delivered, "event dispatcher drained");
                delivered
            }
            Some(Err(_)) => {
                warn!("event dispatcher panicked; remaining events were lost");
                0
            }
            None => 0,
        }
    }

    fn warn_once(&self, reason: &str) {
        if !self.warned.swap(true, Ordering::Relaxed) {
            warn!("event sink unavailable ({}); dropping events", reason);
        }
    }
}

impl EventSink for ChannelSink {
    fn on_event(&self, event: TaskEvent) {
        let guard = self.tx.read();
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(event).is_err() {
                    self.warn_once("dispatcher stopped");
                }
            }
            None => self.warn_once("sink closed"),
        }
    }
}

impl Drop for ChannelSink {
    fn drop(&mut self) {
        self.close();
    }
}
