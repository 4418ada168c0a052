//! Ambient background animations: a particle field, a pulsing dot grid, a
//! handset with floating app icons and a wireframe cube, all rendered by a
//! small software rasteriser and driven by a host-agnostic render loop.

pub mod circuit;
pub mod config;
pub mod cube;
pub mod engine;
pub mod field;
pub mod graphics;
pub mod host;
pub mod math;
pub mod particles;
pub mod phone;
pub mod physics;
pub mod scene;
pub mod sprite;
pub mod state;
pub mod surface;
pub mod terminal;

pub use circuit::CircuitGrid;
pub use config::{CircuitConfig, CubeConfig, ParticleConfig, PhoneConfig, SceneKind};
pub use cube::CubeViewer;
pub use engine::{Engine, LifecycleError, LoopState};
pub use graphics::PixelCanvas;
pub use host::{EventKind, FrameId, Host, HostEvent, ListenerId, LocalHost};
pub use particles::ParticleField;
pub use phone::PhoneScene;
pub use scene::Scene;
pub use sprite::{LoadError, NoSprites, Sprite, SpriteLoader, ThreadedLoader};
pub use surface::{DrawSurface, Recorder, Rgba, SurfaceSize};
