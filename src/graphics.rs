use crate::sprite::Sprite;
use crate::surface::{DrawSurface, Rgba, SurfaceSize};

/// Lines at most this many device pixels wide are drawn with Bresenham.
const HAIRLINE_WIDTH: f64 = 1.5;

/// Software RGBA rasteriser.
///
/// Pixels are straight-alpha RGBA8, row-major, four bytes per pixel. Drawing
/// composites source-over; a cleared canvas is fully transparent.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    size: SurfaceSize,
    width: usize,
    height: usize,
    pixel_data: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(size: SurfaceSize) -> Self {
        let (width, height) = size.device_pixels();
        Self {
            size,
            width,
            height,
            pixel_data: vec![0u8; width * height * 4],
        }
    }

    /// Width in device pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in device pixels
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_data(&self) -> &[u8] {
        &self.pixel_data
    }

    /// RGBA at a device pixel; transparent outside the canvas.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let offset = (y * self.width + x) * 4;
        [
            self.pixel_data[offset],
            self.pixel_data[offset + 1],
            self.pixel_data[offset + 2],
            self.pixel_data[offset + 3],
        ]
    }

    fn to_device(&self, p: [f64; 2]) -> [f64; 2] {
        [p[0] * self.size.pixel_ratio, p[1] * self.size.pixel_ratio]
    }

    /// Composites `color` over the pixel at `(x, y)`.
    fn blend_pixel(&mut self, x: isize, y: isize, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return;
        }
        let src_a = color.a.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let offset = (y as usize * self.width + x as usize) * 4;
        let dst_a = self.pixel_data[offset + 3] as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let mix = |src: u8, dst: u8| -> u8 {
            let value = (src as f64 * src_a + dst as f64 * dst_a * (1.0 - src_a)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };
        self.pixel_data[offset] = mix(color.r, self.pixel_data[offset]);
        self.pixel_data[offset + 1] = mix(color.g, self.pixel_data[offset + 1]);
        self.pixel_data[offset + 2] = mix(color.b, self.pixel_data[offset + 2]);
        self.pixel_data[offset + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Draws a one-pixel line between two device points using Bresenham's algorithm
    fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let max = [self.width as f64 - 1.0, self.height as f64 - 1.0];
        let Some((from, to)) = clip_segment([x0, y0], [x1, y1], max) else {
            return;
        };
        let (mut x0, mut y0, x1, y1) = (
            from[0].round() as isize,
            from[1].round() as isize,
            to[0].round() as isize,
            to[1].round() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy; // error value e_xy

        loop {
            self.blend_pixel(x0, y0, color);

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Even-odd scanline fill of a polygon given in device pixels.
    fn fill_device_polygon(&mut self, points: &[[f64; 2]], color: Rgba) {
        let min_y = points.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);
        let first_row = min_y.floor().max(0.0) as usize;
        let last_row = max_y.ceil().min(self.height as f64) as usize;

        let mut crossings = Vec::new();
        for row in first_row..last_row {
            let scan_y = row as f64 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a[1] <= scan_y) != (b[1] <= scan_y) {
                    let t = (scan_y - a[1]) / (b[1] - a[1]);
                    crossings.push(a[0] + t * (b[0] - a[0]));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let start = (pair[0] - 0.5).ceil().max(0.0) as isize;
                let end = (pair[1] - 0.5).ceil().min(self.width as f64) as isize;
                for x in start..end {
                    self.blend_pixel(x, row as isize, color);
                }
            }
        }
    }
}

/// Liang-Barsky clip of a segment to `[0, max[0]] x [0, max[1]]`.
fn clip_segment(from: [f64; 2], to: [f64; 2], max: [f64; 2]) -> Option<([f64; 2], [f64; 2])> {
    let delta = [to[0] - from[0], to[1] - from[1]];
    let (mut enter, mut exit) = (0.0_f64, 1.0_f64);
    for axis in 0..2 {
        for (p, q) in [(-delta[axis], from[axis]), (delta[axis], max[axis] - from[axis])] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                enter = enter.max(t);
            } else {
                exit = exit.min(t);
            }
        }
    }
    if !(enter <= exit) {
        return None;
    }
    let at = |t: f64| [from[0] + t * delta[0], from[1] + t * delta[1]];
    let (start, end) = (at(enter), at(exit));
    all_finite(&[start, end]).then_some((start, end))
}

fn all_finite(points: &[[f64; 2]]) -> bool {
    points.iter().all(|p| p[0].is_finite() && p[1].is_finite())
}

impl DrawSurface for PixelCanvas {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        *self = Self::new(size);
    }

    fn clear(&mut self) {
        self.pixel_data.fill(0);
    }

    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgba) {
        if !color.is_visible() || !all_finite(&[center]) || radius.is_nan() || radius <= 0.0 {
            return;
        }
        let [cx, cy] = self.to_device(center);
        let r = radius * self.size.pixel_ratio;
        if r < 0.5 {
            // Sub-pixel dots still light their pixel.
            self.blend_pixel(cx.floor() as isize, cy.floor() as isize, color);
            return;
        }
        let min_x = (cx - r).floor() as isize;
        let max_x = (cx + r).ceil() as isize;
        let min_y = (cy - r).floor() as isize;
        let max_y = (cy + r).ceil() as isize;
        for y in min_y.max(0)..max_y.min(self.height as isize) {
            for x in min_x.max(0)..max_x.min(self.width as isize) {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], width: f64, color: Rgba) {
        if !color.is_visible() || !all_finite(&[from, to]) {
            return;
        }
        let [x0, y0] = self.to_device(from);
        let [x1, y1] = self.to_device(to);
        let device_width = width * self.size.pixel_ratio;
        let length = (x1 - x0).hypot(y1 - y0);
        if device_width <= HAIRLINE_WIDTH || length == 0.0 {
            self.draw_line(x0, y0, x1, y1, color);
            return;
        }
        // Thick lines become a quad so translucent strokes are not overdrawn.
        let nx = -(y1 - y0) / length * device_width / 2.0;
        let ny = (x1 - x0) / length * device_width / 2.0;
        let quad = [
            [x0 + nx, y0 + ny],
            [x1 + nx, y1 + ny],
            [x1 - nx, y1 - ny],
            [x0 - nx, y0 - ny],
        ];
        self.fill_device_polygon(&quad, color);
    }

    fn fill_polygon(&mut self, points: &[[f64; 2]], color: Rgba) {
        if points.len() < 3 || !color.is_visible() || !all_finite(points) {
            return;
        }
        let device: Vec<[f64; 2]> = points.iter().map(|&p| self.to_device(p)).collect();
        self.fill_device_polygon(&device, color);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, origin: [f64; 2], extent: [f64; 2]) {
        if !all_finite(&[origin, extent]) || extent[0] <= 0.0 || extent[1] <= 0.0 {
            return;
        }
        let [ox, oy] = self.to_device(origin);
        let [ew, eh] = self.to_device(extent);
        let start_x = ox.floor().max(0.0) as usize;
        let start_y = oy.floor().max(0.0) as usize;
        let end_x = (ox + ew).ceil().min(self.width as f64).max(0.0) as usize;
        let end_y = (oy + eh).ceil().min(self.height as f64).max(0.0) as usize;
        for y in start_y..end_y {
            let v = (y as f64 + 0.5 - oy) / eh;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            for x in start_x..end_x {
                let u = (x as f64 + 0.5 - ox) / ew;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let [r, g, b, a] = sprite.pixel(
                    (u * sprite.width() as f64) as u32,
                    (v * sprite.height() as f64) as u32,
                );
                self.blend_pixel(x as isize, y as isize, Rgba::new(r, g, b, a as f64 / 255.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(w: f64, h: f64) -> PixelCanvas {
        PixelCanvas::new(SurfaceSize::new(w, h))
    }

    #[test]
    fn opaque_line_sets_endpoints() {
        let mut c = canvas(10.0, 10.0);
        c.stroke_line([1.0, 1.0], [8.0, 5.0], 1.0, Rgba::rgb(255, 0, 0));
        assert_eq!(c.pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(c.pixel(8, 5), [255, 0, 0, 255]);
        assert_eq!(c.pixel(8, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn half_alpha_blends_over_transparent() {
        let mut c = canvas(4.0, 4.0);
        c.fill_circle([2.0, 2.0], 2.0, Rgba::new(200, 100, 0, 0.5));
        let p = c.pixel(2, 2);
        assert_eq!(&p[..3], &[200, 100, 0]);
        assert_eq!(p[3], 128);
    }

    #[test]
    fn off_canvas_drawing_is_ignored() {
        let mut c = canvas(4.0, 4.0);
        c.fill_circle([-50.0, -50.0], 3.0, Rgba::AMBER);
        c.stroke_line([-10.0, 2.0], [20.0, 2.0], 1.0, Rgba::AMBER);
        c.fill_polygon(&[[f64::NAN, 0.0], [1.0, 1.0], [2.0, 0.0]], Rgba::AMBER);
        assert_eq!(c.pixel(0, 2)[3], 255);
        assert_eq!(c.pixel(0, 0), [0; 4]);
    }

    #[test]
    fn far_endpoints_are_clipped_to_the_canvas() {
        let mut c = canvas(4.0, 4.0);
        c.stroke_line([-1e12, 1.0], [1e12, 1.0], 1.0, Rgba::AMBER);
        c.stroke_line([2.0, -1e15], [2.0, 1e15], 1.0, Rgba::AMBER);
        assert!((0..4).all(|x| c.pixel(x, 1)[3] == 255));
        assert!((0..4).all(|y| c.pixel(2, y)[3] == 255));
        assert_eq!(c.pixel(0, 3), [0; 4]);
    }

    #[test]
    fn segments_missing_the_canvas_draw_nothing() {
        assert!(clip_segment([-5.0, 12.0], [12.0, -5.0], [3.0, 3.0]).is_none());
        assert!(clip_segment([4.0, 0.0], [9.0, 3.0], [3.0, 3.0]).is_none());
        let (from, to) = clip_segment([-2.0, 1.0], [5.0, 1.0], [3.0, 3.0]).unwrap();
        assert!(from[0].abs() < 1e-9 && (to[0] - 3.0).abs() < 1e-9);
        assert_eq!((from[1], to[1]), (1.0, 1.0));
    }

    #[test]
    fn polygon_fill_covers_interior_only() {
        let mut c = canvas(10.0, 10.0);
        c.fill_polygon(&[[2.0, 2.0], [8.0, 2.0], [8.0, 8.0], [2.0, 8.0]], Rgba::rgb(0, 0, 255));
        assert_eq!(c.pixel(5, 5), [0, 0, 255, 255]);
        assert_eq!(c.pixel(1, 5), [0; 4]);
        assert_eq!(c.pixel(8, 5), [0; 4]);
    }

    #[test]
    fn pixel_ratio_scales_coordinates() {
        let mut c = PixelCanvas::new(SurfaceSize::with_pixel_ratio(100.0, 100.0, 0.1));
        assert_eq!((c.width(), c.height()), (10, 10));
        c.fill_circle([55.0, 55.0], 1.0, Rgba::rgb(1, 2, 3));
        assert_eq!(c.pixel(5, 5), [1, 2, 3, 255]);
    }

    #[test]
    fn sprite_blit_scales_nearest() {
        let sprite = Sprite::from_rgba(2, 1, vec![[255, 0, 0, 255], [0, 255, 0, 255]]).unwrap();
        let mut c = canvas(8.0, 4.0);
        c.draw_sprite(&sprite, [0.0, 0.0], [8.0, 4.0]);
        assert_eq!(c.pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(c.pixel(6, 3), [0, 255, 0, 255]);
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut c = canvas(3.0, 3.0);
        c.fill_circle([1.5, 1.5], 5.0, Rgba::AMBER);
        c.clear();
        assert!(c.pixel_data().iter().all(|&b| b == 0));
    }
}
