use crate::Extent;
use crate::geom::Point;
use crate::geom::Size;
use crate::quadtree::QuadNode;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

const BRAILLE_EMPTY_CHAR: char = '\u{2800}';

/// A monochrome terminal canvas. Every terminal cell is a braille character holding 2x4 pixels.
pub struct Camera {
    /// The pixel buffer
    cb: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the pixel buffer
    w: usize,

    /// Height of the pixel buffer
    h: usize,
}

impl Camera {
    /// Create a camera of `w` by `h` pixels.
    pub fn new(w: usize, h: usize) -> Self {
        // For each braille character, we need 3 bytes. For each newline, we need one byte.
        //
        // `bw = ceil(w / 2)` and `bh = ceil(h / 4)` are the width and height of the framebuffer in
        // braille characters, so it holds `3 * (bw * bh) + bh` bytes.
        let (bw, bh) = (w.div_ceil(2), h.div_ceil(4));

        Self {
            cb: vec![false; w * h],
            fb: String::with_capacity(3 * (bw * bh) + bh),
            cp: vec![BRAILLE_EMPTY; bw * bh],
            w,
            h,
        }
    }

    /// Create a camera covering `cols` by `rows` terminal cells.
    pub fn from_terminal(cols: u16, rows: u16) -> Self {
        Self::new(2 * cols as usize, 4 * rows as usize)
    }

    /// Reset the pixel buffer
    pub fn reset(&mut self) {
        self.cb.fill(false);
    }

    /// Turns on every pixel of the rectangle `[x0, x1) x [y0, y1)`, clipped to the camera.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        let (x1, y1) = (x1.min(self.w), y1.min(self.h));

        for y in y0..y1 {
            for x in x0..x1 {
                let i = self.xy_from(x, y);
                self.cb[i] = true;
            }
        }
    }

    /// Turns on the border pixels of the rectangle `[x0, x1) x [y0, y1)`, clipped to the camera.
    pub fn outline_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        if x1 <= x0 || y1 <= y0 {
            return;
        }

        self.fill_rect(x0, y0, x1, y0 + 1);
        self.fill_rect(x0, y1 - 1, x1, y1);
        self.fill_rect(x0, y0, x0 + 1, y1);
        self.fill_rect(x1 - 1, y0, x1, y1);
    }

    /// Draw every leaf of the tree rooted at `root`, scaled down (or up) to fit the camera while
    /// keeping the aspect ratio. Leaves that are on get filled, and with `wire` every leaf also
    /// gets an outline.
    pub fn draw_tree(&mut self, root: &QuadNode, wire: bool) {
        let Size { width, height } = root.size();
        let scale = Self::fit(self.w, self.h, width, height);

        // maps field coordinates to pixel coordinates
        let to_px = |v: i64| (v as f64 * scale).floor() as usize;

        root.visit_leaves(|Point { x, y }, Size { width, height }, value| {
            let (x0, y0) = (to_px(x as i64), to_px(y as i64));
            let (x1, y1) = (
                to_px(x as i64 + width as i64).max(x0 + 1),
                to_px(y as i64 + height as i64).max(y0 + 1),
            );

            if value {
                self.fill_rect(x0, y0, x1, y1);
            }

            if wire {
                self.outline_rect(x0, y0, x1, y1);
            }
        });
    }

    /// Pixels per field cell such that a `width` by `height` field fits in `w` by `h` pixels.
    fn fit(w: usize, h: usize, width: Extent, height: Extent) -> f64 {
        let sx = w as f64 / width.max(1) as f64;
        let sy = h as f64 / height.max(1) as f64;

        sx.min(sy)
    }

    /// Turn the pixel buffer into braille characters, one line per row of terminal cells.
    pub fn render(&mut self) -> &str {
        let bw = self.w.div_ceil(2);

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &px) in self.cb.iter().enumerate() {
            let (x, y) = self.xy_to(n);
            let hex = Self::get_hex_value(x, y);

            if px {
                self.cp[(y / 4) * bw + (x / 2)] += hex;
            }
        }

        // update framebuffer
        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i.is_multiple_of(bw) {
                self.fb.push('\n');
            }

            let ch = char::from_u32(c).unwrap_or(BRAILLE_EMPTY_CHAR);
            self.fb.push(ch);
        }
        self.fb.push('\n');

        &self.fb
    }

    fn xy_to(&self, n: usize) -> (usize, usize) {
        (n % self.w, n / self.w)
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}
