//! Bounded, non-blocking command queue for an optional construction
//! viewer.
//!
//! Mirrors the producer side of `cas/viewer.py`'s `Viewer`: every
//! construction (`Point::new`, `Line::new`, `Circle::new`, an explicit
//! clear) can emit a [`ViewerCommand`] tagged with a monotonic
//! generation counter, pushed into a bounded [`crossbeam_channel`] so a
//! slow or absent consumer never blocks the kernel. When the channel is
//! full, [`DropPolicy`] decides whether the newest or oldest pending
//! command is discarded.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};

/// What to do when the bounded queue is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropPolicy {
    /// Discard the oldest queued command to make room for the new one.
    DropOldest,
    /// Discard the new command, keeping everything already queued.
    DropNew,
}

/// One command sent to the viewer. `generation` lets a consumer discard
/// commands from a scene that has since been cleared and rebuilt.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerCommand {
    Point { generation: u64, x: f64, y: f64 },
    Line { generation: u64, x1: f64, y1: f64, x2: f64, y2: f64 },
    Circle { generation: u64, cx: f64, cy: f64, r: f64 },
    Clear { generation: u64 },
    /// Terminates the sink; sent by [`disable_graphics`] so a consumer
    /// gets a graceful, generation-tagged shutdown signal rather than
    /// just observing the channel disconnect.
    Close { generation: u64 },
}

impl ViewerCommand {
    pub fn generation(&self) -> u64 {
        match self {
            ViewerCommand::Point { generation, .. }
            | ViewerCommand::Line { generation, .. }
            | ViewerCommand::Circle { generation, .. }
            | ViewerCommand::Clear { generation }
            | ViewerCommand::Close { generation } => *generation,
        }
    }
}

/// The producer half held by kernel code. Cheap to clone (an `Arc`
/// around the generation counter plus a cloneable channel sender).
#[derive(Clone)]
pub struct ViewerHandle {
    sender: Sender<ViewerCommand>,
    generation: Arc<AtomicU64>,
    drop_policy: DropPolicy,
}

/// Owns the receiving end; construct alongside a [`ViewerHandle`] with
/// [`viewer_channel`].
pub struct ViewerSink {
    pub receiver: Receiver<ViewerCommand>,
}

/// Build a bounded viewer command channel with `capacity` slots.
pub fn viewer_channel(capacity: usize, drop_policy: DropPolicy) -> (ViewerHandle, ViewerSink) {
    let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1));
    (
        ViewerHandle {
            sender,
            generation: Arc::new(AtomicU64::new(0)),
            drop_policy,
        },
        ViewerSink { receiver },
    )
}

impl ViewerHandle {
    /// Current generation counter.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Advance the generation counter and push a clear command, so the
    /// consumer can discard any commands still in flight from the
    /// previous scene.
    pub fn clear(&self) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.push(ViewerCommand::Clear { generation });
    }

    pub fn add_point(&self, x: f64, y: f64) {
        let generation = self.generation();
        self.push(ViewerCommand::Point { generation, x, y });
    }

    pub fn add_line(&self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let generation = self.generation();
        self.push(ViewerCommand::Line {
            generation,
            x1,
            y1,
            x2,
            y2,
        });
    }

    pub fn add_circle(&self, cx: f64, cy: f64, r: f64) {
        let generation = self.generation();
        self.push(ViewerCommand::Circle {
            generation,
            cx,
            cy,
            r: r.abs(),
        });
    }

    /// Push a `close` command, telling the sink to terminate.
    pub fn close(&self) {
        let generation = self.generation();
        self.push(ViewerCommand::Close { generation });
    }

    fn push(&self, cmd: ViewerCommand) {
        match self.sender.try_send(cmd) {
            Ok(()) => {}
            Err(TrySendError::Full(cmd)) => match self.drop_policy {
                DropPolicy::DropOldest => {
                    // Best-effort: a consumer might drain this slot between
                    // our recv and send, which just means we keep both.
                    let _ = self.sender.try_recv();
                    let _ = self.sender.try_send(cmd);
                }
                DropPolicy::DropNew => {
                    log::debug!("viewer queue full, dropping command");
                }
            },
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("viewer queue has no consumer, dropping command");
            }
        }
    }
}

thread_local! {
    /// The viewer every `Point`/`Line`/`Circle` construction reports to,
    /// if any. `cas/viewer.py`'s `enable_graphics` flag plus its
    /// module-level `viewer` singleton play exactly this role there;
    /// this is the same idea translated into Rust's thread-local idiom
    /// rather than process-global mutable state, consistent with the
    /// single-threaded contract this crate promises (see `DESIGN.md`).
    static ACTIVE_VIEWER: RefCell<Option<ViewerHandle>> = const { RefCell::new(None) };
}

/// Install the viewer every subsequent `Point`/`Line`/`Circle`
/// construction on this thread reports to, or clear it with `None`.
pub fn set_active_viewer(handle: Option<ViewerHandle>) {
    ACTIVE_VIEWER.with(|v| *v.borrow_mut() = handle);
}

/// `true` if a viewer is currently installed on this thread.
pub fn has_active_viewer() -> bool {
    ACTIVE_VIEWER.with(|v| v.borrow().is_some())
}

/// Build a fresh bounded viewer channel and install it as the active
/// sink for this thread, returning its receiving end. Mirrors
/// `enable_graphics = True` plus `viewer.start()` in the Python
/// reference, minus the pyglet process this crate never owns (see
/// spec.md §6 and `DESIGN.md`).
pub fn enable_graphics(capacity: usize, drop_policy: DropPolicy) -> ViewerSink {
    let (handle, sink) = viewer_channel(capacity, drop_policy);
    set_active_viewer(Some(handle));
    sink
}

/// Remove the active viewer, if any, first sending it a `close` command
/// so a consumer sees a graceful, generation-tagged shutdown rather than
/// just the channel disconnecting.
pub fn disable_graphics() {
    ACTIVE_VIEWER.with(|v| {
        if let Some(h) = v.borrow().as_ref() {
            h.close();
        }
    });
    set_active_viewer(None);
}

pub(crate) fn emit_point(x: f64, y: f64) {
    ACTIVE_VIEWER.with(|v| {
        if let Some(h) = v.borrow().as_ref() {
            h.add_point(x, y);
        }
    });
}

pub(crate) fn emit_line(x1: f64, y1: f64, x2: f64, y2: f64) {
    ACTIVE_VIEWER.with(|v| {
        if let Some(h) = v.borrow().as_ref() {
            h.add_line(x1, y1, x2, y2);
        }
    });
}

pub(crate) fn emit_circle(cx: f64, cy: f64, r: f64) {
    ACTIVE_VIEWER.with(|v| {
        if let Some(h) = v.borrow().as_ref() {
            h.add_circle(cx, cy, r);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_oldest_keeps_queue_bounded() {
        let (handle, sink) = viewer_channel(2, DropPolicy::DropOldest);
        handle.add_point(0.0, 0.0);
        handle.add_point(1.0, 1.0);
        handle.add_point(2.0, 2.0);
        let first = sink.receiver.try_recv().unwrap();
        assert!(matches!(first, ViewerCommand::Point { x, .. } if x == 1.0));
    }

    #[test]
    fn drop_new_keeps_oldest() {
        let (handle, sink) = viewer_channel(1, DropPolicy::DropNew);
        handle.add_point(0.0, 0.0);
        handle.add_point(1.0, 1.0);
        let first = sink.receiver.try_recv().unwrap();
        assert!(matches!(first, ViewerCommand::Point { x, .. } if x == 0.0));
        assert!(sink.receiver.try_recv().is_err());
    }

    #[test]
    fn clear_advances_generation() {
        let (handle, _sink) = viewer_channel(4, DropPolicy::DropOldest);
        assert_eq!(handle.generation(), 0);
        handle.clear();
        assert_eq!(handle.generation(), 1);
    }

    #[test]
    fn active_viewer_receives_emitted_primitives() {
        let (handle, sink) = viewer_channel(8, DropPolicy::DropOldest);
        set_active_viewer(Some(handle));
        assert!(has_active_viewer());
        emit_point(1.0, 2.0);
        emit_line(0.0, 0.0, 1.0, 1.0);
        emit_circle(0.0, 0.0, 3.0);
        set_active_viewer(None);
        assert!(!has_active_viewer());

        assert!(matches!(sink.receiver.try_recv().unwrap(), ViewerCommand::Point { .. }));
        assert!(matches!(sink.receiver.try_recv().unwrap(), ViewerCommand::Line { .. }));
        assert!(matches!(sink.receiver.try_recv().unwrap(), ViewerCommand::Circle { .. }));
    }

    #[test]
    fn disable_graphics_sends_close_before_dropping_the_viewer() {
        let (handle, sink) = viewer_channel(4, DropPolicy::DropOldest);
        set_active_viewer(Some(handle));
        disable_graphics();
        assert!(!has_active_viewer());
        assert!(matches!(sink.receiver.try_recv().unwrap(), ViewerCommand::Close { .. }));
    }
}
