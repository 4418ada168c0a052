//! Decoded RGBA images and the asynchronous loader that produces them.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a sprite from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} decoded to an empty image")]
    Empty { path: PathBuf },
}

/// Straight-alpha RGBA8 image stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Sprite {
    /// Returns `None` when the buffer length does not match the dimensions or
    /// either dimension is zero.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Option<Self> {
        Self::from_rgba(width, height, vec![rgba; width as usize * height as usize])
    }

    /// Reads and decodes an image file (PNG, JPEG or WebP).
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let reader = image::ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let decoded = reader.decode().map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| p.0).collect();
        Self::from_rgba(width, height, pixels).ok_or_else(|| LoadError::Empty {
            path: path.to_path_buf(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`, clamped to the image edges.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.pixels[y * self.width as usize + x]
    }
}

/// Asynchronous sprite source.
///
/// `request` starts a load for `slot`; completed loads are collected by
/// `poll`, which the render loop calls once per tick. Failed loads are never
/// reported and never retried.
pub trait SpriteLoader {
    fn request(&mut self, slot: usize, source: &Path);

    fn poll(&mut self) -> Vec<(usize, Sprite)>;
}

type Loaded = (usize, Result<Sprite, LoadError>);

/// Decodes each requested file on its own worker thread.
pub struct ThreadedLoader {
    tx: Sender<Loaded>,
    rx: Receiver<Loaded>,
}

impl ThreadedLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for ThreadedLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteLoader for ThreadedLoader {
    fn request(&mut self, slot: usize, source: &Path) {
        let tx = self.tx.clone();
        let path = source.to_path_buf();
        let spawned = thread::Builder::new()
            .name(format!("sprite-{slot}"))
            .spawn(move || {
                // The receiver is gone once the scene is dropped.
                let _ = tx.send((slot, Sprite::open(&path)));
            });
        if let Err(err) = spawned {
            debug!(slot, %err, "could not spawn sprite loader thread");
        }
    }

    fn poll(&mut self) -> Vec<(usize, Sprite)> {
        self.rx
            .try_iter()
            .filter_map(|(slot, result)| match result {
                Ok(sprite) => Some((slot, sprite)),
                Err(err) => {
                    debug!(slot, %err, "sprite unavailable, keeping placeholder");
                    None
                }
            })
            .collect()
    }
}

/// Loader that never produces anything; icons stay placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSprites;

impl SpriteLoader for NoSprites {
    fn request(&mut self, _slot: usize, _source: &Path) {}

    fn poll(&mut self) -> Vec<(usize, Sprite)> {
        Vec::new()
    }
}
