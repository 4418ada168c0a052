//! Render-loop lifecycle: wiring a [`Scene`] to a [`Host`].

use std::rc::Rc;

use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::host::{EventKind, FrameId, Host, HostEvent, ListenerId};
use crate::scene::Scene;
use crate::state::{Pointer, SharedInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("host has no drawing surface")]
    NoContext,
    #[error("render loop is already running")]
    AlreadyRunning,
    #[error("render loop was stopped and cannot be restarted")]
    Stopped,
}

const LISTENED: [EventKind; 4] = [
    EventKind::PointerMove,
    EventKind::PointerLeave,
    EventKind::Resize,
    EventKind::Scroll,
];

fn record(input: &SharedInput, event: &HostEvent) {
    match *event {
        HostEvent::PointerMove { x, y } => input.set_pointer(Pointer::at(x, y)),
        HostEvent::PointerLeave => input.pointer_left(),
        HostEvent::Resize(size) => input.request_resize(size),
        HostEvent::Scroll { offset } => input.set_scroll(offset),
    }
}

/// Drives one scene on one host.
///
/// Exactly one frame is pending while running. Frames delivered with any
/// other id, or after [`Engine::stop`], are ignored.
pub struct Engine<S> {
    scene: S,
    rng: StdRng,
    input: Rc<SharedInput>,
    state: LoopState,
    pending: Option<FrameId>,
    listeners: Vec<ListenerId>,
    frames: u64,
}

impl<S: Scene> Engine<S> {
    pub fn new(scene: S, rng: StdRng) -> Self {
        Self {
            scene,
            rng,
            input: Rc::new(SharedInput::default()),
            state: LoopState::Uninitialized,
            pending: None,
            listeners: Vec::new(),
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn input(&self) -> &SharedInput {
        &self.input
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    /// Frames rendered since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Lays the scene out, subscribes to input and schedules the first frame.
    ///
    /// With no surface on the host nothing happens and `NoContext` is
    /// returned.
    pub fn start(&mut self, host: &mut dyn Host) -> Result<(), LifecycleError> {
        match self.state {
            LoopState::Running => return Err(LifecycleError::AlreadyRunning),
            LoopState::Stopped => return Err(LifecycleError::Stopped),
            LoopState::Uninitialized => {}
        }
        let Some(size) = host.surface_size() else {
            debug!(scene = self.scene.name(), "no surface, not starting");
            return Err(LifecycleError::NoContext);
        };

        self.scene.layout(size, &mut self.rng);
        for kind in LISTENED {
            let input = Rc::clone(&self.input);
            let id = host.listen(kind, Box::new(move |event: &HostEvent| record(&input, event)));
            self.listeners.push(id);
        }
        self.pending = Some(host.request_frame());
        self.state = LoopState::Running;
        debug!(
            scene = self.scene.name(),
            entities = self.scene.entity_count(),
            width = size.width,
            height = size.height,
            "render loop started"
        );
        Ok(())
    }

    /// Runs one frame if `frame` is the one this engine is waiting for.
    ///
    /// Returns whether anything was simulated.
    pub fn tick(&mut self, host: &mut dyn Host, frame: FrameId) -> bool {
        if self.state != LoopState::Running || self.pending != Some(frame) {
            trace!(?frame, "ignoring stale frame");
            return false;
        }
        self.pending = None;

        if let Some(size) = self.input.take_resize() {
            self.scene.layout(size, &mut self.rng);
            debug!(
                scene = self.scene.name(),
                entities = self.scene.entity_count(),
                width = size.width,
                height = size.height,
                "relaid out after resize"
            );
        }

        let input = self.input.snapshot();
        self.scene.update(&input);
        if let Some(surface) = host.surface() {
            surface.clear();
            self.scene.render(surface);
        }

        self.frames += 1;
        self.pending = Some(host.request_frame());
        trace!(frame = self.frames, "frame rendered");
        true
    }

    /// Cancels the pending frame and drops every listener. Safe to call
    /// more than once.
    pub fn stop(&mut self, host: &mut dyn Host) {
        if self.state == LoopState::Stopped {
            return;
        }
        if let Some(frame) = self.pending.take() {
            host.cancel_frame(frame);
        }
        for id in self.listeners.drain(..) {
            host.unlisten(id);
        }
        self.state = LoopState::Stopped;
        debug!(scene = self.scene.name(), frames = self.frames, "render loop stopped");
    }
}
