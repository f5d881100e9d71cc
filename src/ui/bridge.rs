// EventLoopBridge - Coordinates between tokio async runtime and Slint event loop
//
// Sort tasks run on tokio workers while Slint owns the window on the main
// thread. The bridge provides:
// - Safe UI updates from any thread via upgrade_in_event_loop
// - Spawning async tasks from Slint callbacks
// - Frame coalescing so a fast run never queues more than one pending redraw

use crate::metrics::Metrics;
use slint::ComponentHandle;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

type UiUpdate<T> = Box<dyn FnOnce(&T) + Send>;

/// At most one frame in flight.
///
/// A redraw request acquires the gate; the frame releases it right before it
/// reads state, so changes made while a frame is pending are picked up by
/// that frame and changes made after the read schedule a new one.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    pending: Arc<AtomicBool>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the caller should queue a frame
    pub fn try_acquire(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    pub fn release(&self) {
        self.pending.store(false, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Coordinates between tokio async runtime and Slint event loop
///
/// # Example
/// ```ignore
/// let runtime = tokio::runtime::Runtime::new()?;
/// let ui = MainWindow::new()?;
/// let bridge = EventLoopBridge::new(&ui, runtime.handle().clone(), metrics);
///
/// bridge.clone_handle().request_frame(|ui| {
///     ui.set_status_message("Done".into());
/// });
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    /// Handle to the tokio runtime for spawning async tasks
    tokio_handle: tokio::runtime::Handle,

    /// Bounded so a stalled UI cannot grow the queue without limit
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,

    frame_gate: FrameGate,

    metrics: Arc<Metrics>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create a new EventLoopBridge
    ///
    /// This sets up a background handler thread that forwards queued updates
    /// to the Slint event loop.
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle, metrics: Arc<Metrics>) -> Self {
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<UiUpdate<T>>(100);

        let ui_weak = ui.as_weak();
        std::thread::Builder::new()
            .name("ui-bridge".to_string())
            .spawn(move || {
                tracing::debug!("EventLoopBridge handler thread started");

                while let Some(update_fn) = ui_update_rx.blocking_recv() {
                    let result = ui_weak.upgrade_in_event_loop(move |ui| {
                        update_fn(&ui);
                    });

                    if let Err(e) = result {
                        // The event loop has stopped
                        tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                        break;
                    }
                }

                tracing::debug!("EventLoopBridge handler thread terminated");
            })
            .map_err(|e| tracing::error!("Failed to spawn UI bridge thread: {}", e))
            .ok();

        Self {
            tokio_handle,
            ui_update_tx,
            frame_gate: FrameGate::new(),
            metrics,
        }
    }

    /// Clone the bridge for use in multiple callbacks
    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        EventLoopBridgeHandle {
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
            frame_gate: self.frame_gate.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Lightweight handle that can be cloned and passed to callbacks
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    tokio_handle: tokio::runtime::Handle,
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
    frame_gate: FrameGate,
    metrics: Arc<Metrics>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
            frame_gate: self.frame_gate.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// Schedule a redraw unless one is already pending.
    ///
    /// `render` must read the state it draws when it runs, not when it is
    /// created; a coalesced request relies on the pending frame to show its
    /// change.
    pub fn request_frame<F>(&self, render: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        if !self.frame_gate.try_acquire() {
            self.metrics.record_frame_coalesced();
            return;
        }

        self.metrics.record_frame_requested();
        let gate = self.frame_gate.clone();
        let queued = self.send(Box::new(move |ui: &T| {
            gate.release();
            render(ui);
        }));

        if !queued {
            self.frame_gate.release();
        }
    }

    /// Spawn an async task on the tokio runtime
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }

    fn send(&self, update: UiUpdate<T>) -> bool {
        match self.ui_update_tx.try_send(update) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("UI update channel full - skipping update to prevent backpressure");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Failed to send UI update - handler thread has stopped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    // The bridge itself needs a windowing system; only the gate is tested here

    #[test]
    fn test_frame_gate_single_pending_frame() {
        let gate = FrameGate::new();

        assert!(gate.try_acquire());
        assert!(gate.is_pending());
        assert!(!gate.try_acquire());
        assert!(!gate.try_acquire());

        gate.release();
        assert!(!gate.is_pending());
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_frame_gate_shared_between_clones() {
        let gate = FrameGate::new();
        let other = gate.clone();

        assert!(gate.try_acquire());
        assert!(!other.try_acquire());
        other.release();
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_frame_gate_concurrent_requests() {
        let gate = FrameGate::new();
        let acquired = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                let acquired = Arc::clone(&acquired);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if gate.try_acquire() {
                            acquired.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Nobody released, so exactly one request queued a frame
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
    }
}
