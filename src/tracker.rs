//! Composite progress tracking over in-flight operations.

use log::trace;

use crate::host::{OperationId, SceneHost};

/// Aggregates every tracked operation into one progress stream.
///
/// The tracker is purely reactive: it owns no timer and spawns nothing. The
/// loader hands it operations as they start and ticks it once per frame; the
/// tracker polls each handle, publishes the arithmetic mean of their progress
/// to the `progress` listeners, and fires the `completed` listeners exactly
/// once when every tracked handle is terminal.
///
/// Operations gated on activation stall at 0.9 and never report done, so
/// completion is withheld for as long as the gate is closed.
pub(crate) struct ProgressTracker {
    ops: Vec<OperationId>,
    progress_listeners: Vec<Box<dyn FnMut(f32)>>,
    completed_listeners: Vec<Box<dyn FnMut()>>,
}

impl ProgressTracker {
    pub(crate) fn new() -> Self {
        Self {
            ops: Vec::new(),
            progress_listeners: Vec::new(),
            completed_listeners: Vec::new(),
        }
    }

    pub(crate) fn on_progress(&mut self, listener: impl FnMut(f32) + 'static) {
        self.progress_listeners.push(Box::new(listener));
    }

    pub(crate) fn on_completed(&mut self, listener: impl FnMut() + 'static) {
        self.completed_listeners.push(Box::new(listener));
    }

    pub(crate) fn track(&mut self, op: OperationId) {
        self.ops.push(op);
    }

    pub(crate) fn has_work(&self) -> bool {
        !self.ops.is_empty()
    }

    /// Poll every tracked operation and publish the composite value.
    pub(crate) fn tick(&mut self, host: &impl SceneHost) {
        if self.ops.is_empty() {
            return;
        }

        let mut sum = 0.0;
        let mut all_done = true;
        for op in &self.ops {
            let status = host.poll(*op);
            sum += status.progress;
            all_done &= status.done;
        }
        let composite = sum / self.ops.len() as f32;
        trace!("composite progress {:.3} over {} operation(s)", composite, self.ops.len());
        self.emit_progress(composite);

        if all_done {
            self.ops.clear();
            self.emit_completed();
        }
    }

    /// Completion path for requests that had nothing to do: publish full
    /// progress and completion immediately so completion chains never stall.
    pub(crate) fn complete_empty(&mut self) {
        self.emit_progress(1.0);
        self.emit_completed();
    }

    fn emit_progress(&mut self, value: f32) {
        for listener in &mut self.progress_listeners {
            listener(value);
        }
    }

    fn emit_completed(&mut self) {
        for listener in &mut self.completed_listeners {
            listener();
        }
    }
}
