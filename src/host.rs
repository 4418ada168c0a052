//! What the render loop needs from its environment: a surface to draw on,
//! a frame scheduler and input events.

use std::collections::VecDeque;

use tracing::trace;

use crate::surface::{DrawSurface, SurfaceSize};

/// Handle for a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

/// Handle for a registered input listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerLeave,
    Resize,
    Scroll,
}

/// Input delivered by the host, in logical surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMove { x: f64, y: f64 },
    PointerLeave,
    Resize(SurfaceSize),
    Scroll { offset: f64 },
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::PointerMove { .. } => EventKind::PointerMove,
            HostEvent::PointerLeave => EventKind::PointerLeave,
            HostEvent::Resize(_) => EventKind::Resize,
            HostEvent::Scroll { .. } => EventKind::Scroll,
        }
    }
}

pub type Listener = Box<dyn FnMut(&HostEvent)>;

pub trait Host {
    /// `None` when no drawing surface is attached.
    fn surface_size(&self) -> Option<SurfaceSize>;

    fn surface(&mut self) -> Option<&mut dyn DrawSurface>;

    /// Schedules one frame callback.
    fn request_frame(&mut self) -> FrameId;

    /// Drops a scheduled frame. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);

    fn listen(&mut self, kind: EventKind, listener: Listener) -> ListenerId;

    /// Removes a listener. Unknown ids are ignored.
    fn unlisten(&mut self, id: ListenerId);
}

/// In-process host: frames are queued FIFO and handed out by
/// [`LocalHost::next_frame`], events are pushed in with
/// [`LocalHost::dispatch`].
pub struct LocalHost<S> {
    surface: Option<S>,
    frames: VecDeque<FrameId>,
    listeners: Vec<(ListenerId, EventKind, Listener)>,
    next_frame_id: u64,
    next_listener_id: u64,
}

impl<S: DrawSurface> LocalHost<S> {
    pub fn new(surface: S) -> Self {
        Self::with_surface(Some(surface))
    }

    /// A host with nothing to draw on.
    pub fn detached() -> Self {
        Self::with_surface(None)
    }

    fn with_surface(surface: Option<S>) -> Self {
        Self {
            surface,
            frames: VecDeque::new(),
            listeners: Vec::new(),
            next_frame_id: 0,
            next_listener_id: 0,
        }
    }

    pub fn surface_ref(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Calls every listener registered for the event's kind.
    pub fn dispatch(&mut self, event: HostEvent) {
        let kind = event.kind();
        for (_, listening, listener) in self.listeners.iter_mut() {
            if *listening == kind {
                listener(&event);
            }
        }
    }

    /// Resizes the attached surface and announces the new size.
    pub fn resize(&mut self, size: SurfaceSize) {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(size);
        }
        self.dispatch(HostEvent::Resize(size));
    }

    /// Pops the oldest scheduled frame.
    pub fn next_frame(&mut self) -> Option<FrameId> {
        self.frames.pop_front()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<S: DrawSurface> Host for LocalHost<S> {
    fn surface_size(&self) -> Option<SurfaceSize> {
        self.surface.as_ref().map(DrawSurface::size)
    }

    fn surface(&mut self) -> Option<&mut dyn DrawSurface> {
        self.surface.as_mut().map(|s| s as &mut dyn DrawSurface)
    }

    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_frame_id);
        self.next_frame_id += 1;
        self.frames.push_back(id);
        trace!(frame = id.0, "frame requested");
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.frames.retain(|&queued| queued != id);
    }

    fn listen(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, kind, listener));
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.retain(|(registered, _, _)| *registered != id);
    }
}
