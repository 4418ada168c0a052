use rand::RngCore;
use tracing::{debug, trace};

use crate::config::PhoneConfig;
use crate::field::{icon_ring, FloatingIcon};
use crate::math::{ease, Perspective};
use crate::scene::Scene;
use crate::sprite::SpriteLoader;
use crate::state::{InputSnapshot, Rotation};
use crate::surface::{rounded_rect, skew, DrawSurface, Rgba, SurfaceSize};

const BEZEL: Rgba = Rgba::rgb(0x1A, 0x1A, 0x1A);
const SCREEN: Rgba = Rgba::rgb(0x10, 0x10, 0x10);
const NOTCH: Rgba = Rgba::rgb(0x0A, 0x0A, 0x0A);
const TILE: Rgba = Rgba::new(26, 26, 26, 0.9);

/// Vertical offset of the handset centre below the surface centre.
const PHONE_DROP: f64 = 20.0;

/// Handset mock with app icons floating around it in shallow 3D.
///
/// The scene tilts toward the pointer, icons are pushed away from it, and
/// icons are painted back to front after a perspective projection.
pub struct PhoneScene {
    config: PhoneConfig,
    perspective: Perspective,
    loader: Box<dyn SpriteLoader>,
    /// Slots whose sprite was already asked for; a load is never repeated.
    requested: Vec<bool>,
    icons: Vec<FloatingIcon>,
    size: SurfaceSize,
    time: f64,
    tilt: Rotation,
}

impl PhoneScene {
    pub fn new(config: PhoneConfig, loader: Box<dyn SpriteLoader>) -> Self {
        let perspective = Perspective::new(config.fov);
        let requested = vec![false; config.catalog.len()];
        Self {
            config,
            perspective,
            loader,
            requested,
            icons: Vec::new(),
            size: SurfaceSize::new(0.0, 0.0),
            time: 0.0,
            tilt: Rotation::default(),
        }
    }

    /// Icons in paint order, farthest first.
    pub fn icons(&self) -> &[FloatingIcon] {
        &self.icons
    }

    pub fn icons_mut(&mut self) -> &mut Vec<FloatingIcon> {
        &mut self.icons
    }

    pub fn tilt(&self) -> Rotation {
        self.tilt
    }

    fn layout_scale(&self) -> f64 {
        if self.size.width >= self.config.large_width {
            self.config.large_scale
        } else {
            1.0
        }
    }

    fn phone_center(&self) -> [f64; 2] {
        let [cx, cy] = self.size.center();
        [cx, cy + PHONE_DROP]
    }

    fn receive_sprites(&mut self) {
        for (slot, sprite) in self.loader.poll() {
            if let Some(icon) = self.icons.iter_mut().find(|icon| icon.slot == slot) {
                trace!(slot, "sprite ready");
                icon.sprite = Some(sprite);
            }
        }
    }

    fn draw_phone(&self, surface: &mut dyn DrawSurface) {
        let k = self.layout_scale();
        let width = 120.0 * k;
        let height = 252.0 * k;
        let corner = 20.0 * k;
        let bezel = 8.0 * k;
        let skew_x = self.tilt.y * 0.3;
        let skew_y = -self.tilt.x * 0.2;
        let offset = self.phone_center();

        let shape = |origin: [f64; 2], extent: [f64; 2], radius: f64| {
            let mut outline = rounded_rect(origin, extent, radius);
            skew(&mut outline, skew_x, skew_y, offset);
            outline
        };

        let body = shape([-width / 2.0, -height / 2.0], [width, height], corner);
        surface.fill_polygon(&body, BEZEL);
        surface.stroke_polygon(&body, 2.0, Rgba::AMBER);

        let screen = shape(
            [-width / 2.0 + bezel, -height / 2.0 + bezel * 2.0],
            [width - bezel * 2.0, height - bezel * 3.0],
            corner - 4.0,
        );
        surface.fill_polygon(&screen, SCREEN);
        surface.stroke_polygon(&screen, 1.0, Rgba::AMBER.with_alpha(0.3));

        let notch_width = 50.0 * k;
        let notch_height = 10.0 * k;
        let notch = shape(
            [-notch_width / 2.0, -height / 2.0 + bezel],
            [notch_width, notch_height],
            notch_height / 2.0,
        );
        surface.fill_polygon(&notch, NOTCH);

        let bar_width = 70.0 * k;
        let bar_height = 4.0 * k;
        let home_bar = shape(
            [-bar_width / 2.0, height / 2.0 - bezel * 2.0 - bar_height - 2.0],
            [bar_width, bar_height],
            bar_height / 2.0,
        );
        surface.fill_polygon(&home_bar, Rgba::AMBER.with_alpha(0.5));
    }

    fn draw_icon(&self, surface: &mut dyn DrawSurface, icon: &FloatingIcon) {
        let center = self.size.center();
        let Some(projected) = self.perspective.project(&icon.body.position, center) else {
            return;
        };
        let side = icon.size * projected.scale;
        let origin = [projected.x - side / 2.0, projected.y - side / 2.0];

        let glow = rounded_rect([origin[0] - 3.0, origin[1] - 3.0], [side + 6.0, side + 6.0], 15.0);
        surface.fill_polygon(&glow, icon.color.with_alpha(0.25));

        let tile = rounded_rect(origin, [side, side], 12.0);
        surface.fill_polygon(&tile, TILE);
        surface.stroke_polygon(&tile, 2.0, icon.color);

        if let Some(sprite) = &icon.sprite {
            let padding = 4.0;
            let inner = side - padding * 2.0;
            if inner > 0.0 {
                surface.draw_sprite(
                    sprite,
                    [origin[0] + padding, origin[1] + padding],
                    [inner, inner],
                );
            }
        }
    }
}

impl Scene for PhoneScene {
    fn name(&self) -> &'static str {
        "phone"
    }

    fn layout(&mut self, size: SurfaceSize, rng: &mut dyn RngCore) {
        self.size = size;
        let previous = std::mem::take(&mut self.icons);
        self.icons = icon_ring(size, &self.config, rng);

        for icon in &mut self.icons {
            let loaded = previous
                .iter()
                .find(|old| old.slot == icon.slot)
                .and_then(|old| old.sprite.clone());
            if let Some(sprite) = loaded {
                icon.sprite = Some(sprite);
                continue;
            }
            let Some(source) = &self.config.catalog[icon.slot].source else {
                continue;
            };
            if !std::mem::replace(&mut self.requested[icon.slot], true) {
                self.loader.request(icon.slot, source);
            }
        }
        debug!(
            count = self.icons.len(),
            width = size.width,
            height = size.height,
            "icon ring laid out"
        );
    }

    fn update(&mut self, input: &InputSnapshot) {
        self.receive_sprites();
        self.time += self.config.time_step;

        let target = if input.pointer.active {
            input.pointer.normalized(self.size)
        } else {
            [0.0, 0.0]
        };
        self.tilt.x = ease(self.tilt.x, target[1], self.config.tilt_ease);
        self.tilt.y = ease(self.tilt.y, target[0], self.config.tilt_ease);

        let pointer = input.pointer.active.then(|| input.pointer.position());
        let motion = self.config.motion;
        let (time, tilt) = (self.time, self.tilt);
        for icon in &mut self.icons {
            let t = time * icon.speed;
            let anchor = icon.body.anchor;
            let target = [
                anchor[0] + (t + icon.phase).sin() * 15.0 + tilt.y * 50.0,
                anchor[1] + (t * 0.8 + icon.phase).cos() * 10.0 - tilt.x * 30.0,
                anchor[2] + (t * 0.5 + icon.phase).sin() * 30.0,
            ];
            motion.step(&mut icon.body, target, pointer);
            icon.body.position[2] = self
                .perspective
                .clamp_depth(icon.body.position[2], self.config.depth_limit);
        }

        self.icons
            .sort_by(|a, b| b.body.position[2].total_cmp(&a.body.position[2]));
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        if self.size.is_empty() {
            return;
        }
        self.draw_phone(surface);

        for icon in &self.icons {
            self.draw_icon(surface, icon);
        }

        let hub = self.phone_center();
        let link = Rgba::AMBER.with_alpha(0.15);
        for icon in &self.icons {
            if let Some(p) = self.perspective.project(&icon.body.position, self.size.center()) {
                surface.stroke_line(hub, [p.x, p.y], 1.0, link);
            }
        }
    }

    fn entity_count(&self) -> usize {
        self.icons.len()
    }
}
