//! Pixel buffers and grid painting.
//!
//! A buffer is sized to the raster's native resolution (times the data
//! type's render scale). How large it is drawn on screen is a separate
//! concern carried by [`DisplaySize`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use sahel_common::{DataType, RasterGrid};

use crate::classify::{ClassificationScale, Rgba, ValueRange, NO_DATA};
use crate::error::{RenderError, RenderResult};

/// Minimum painted pixels before rows are painted in parallel.
const PARALLEL_THRESHOLD: usize = 65_536;

/// Buffer dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeSize {
    pub width: usize,
    pub height: usize,
}

/// On-screen dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

/// A buffer's native size together with the size it is displayed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub native: NativeSize,
    pub display: DisplaySize,
}

impl CanvasSize {
    /// Native pixels per display pixel on each axis.
    pub fn display_scale(&self) -> (f32, f32) {
        let ratio = |native: usize, display: f32| {
            if display > 0.0 {
                native as f32 / display
            } else {
                1.0
            }
        };
        (
            ratio(self.native.width, self.display.width),
            ratio(self.native.height, self.display.height),
        )
    }
}

/// RGBA8 pixel buffer, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    /// Buffer sized for `grid` at the data type's render scale.
    pub fn for_grid(grid: &RasterGrid, data_type: DataType) -> Self {
        let scale = data_type.render_scale();
        Self::new(grid.width() * scale, grid.height() * scale)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> NativeSize {
        NativeSize {
            width: self.width,
            height: self.height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some(Rgba::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    /// Whether the buffer has the given native size.
    pub fn matches(&self, size: NativeSize) -> bool {
        self.size() == size
    }

    /// Encode the buffer as PNG.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        crate::png::create_png_auto(&self.data, self.width, self.height)
    }
}

/// Paint a grid into the top-left region of `buffer`.
///
/// Each cell covers a `k × k` block where `k = buffer.width / grid.width`
/// (limited by the height as well). Without smoothing the block is a hard
/// fill; with smoothing, colors are blended bilinearly between neighboring
/// cell centers. The grid values are never modified and the buffer is
/// never resized.
pub fn paint(
    buffer: &mut PixelBuffer,
    grid: &RasterGrid,
    data_type: DataType,
    range: Option<ValueRange>,
    smoothing: bool,
) -> RenderResult<()> {
    let k = (buffer.width / grid.width()).min(buffer.height / grid.height());
    if k == 0 {
        return Err(RenderError::BufferTooSmall {
            buffer_width: buffer.width,
            buffer_height: buffer.height,
            grid_width: grid.width(),
            grid_height: grid.height(),
        });
    }

    let scale = ClassificationScale::for_data_type(data_type, range);
    let colors: Vec<Rgba> = grid.values().iter().map(|&v| scale.color(v)).collect();

    let region_width = grid.width() * k;
    let region_height = grid.height() * k;
    let row_bytes = buffer.width * 4;
    let painter = CellPainter {
        colors: &colors,
        grid_width: grid.width(),
        grid_height: grid.height(),
        k,
        smoothing: smoothing && k > 1,
    };

    trace!(
        data_type = %data_type,
        k,
        smoothing = painter.smoothing,
        "Painting {}x{} region",
        region_width,
        region_height
    );

    if region_width * region_height >= PARALLEL_THRESHOLD {
        buffer
            .data
            .par_chunks_mut(row_bytes)
            .take(region_height)
            .enumerate()
            .for_each(|(py, row)| painter.paint_row(py, &mut row[..region_width * 4]));
    } else {
        for (py, row) in buffer.data.chunks_mut(row_bytes).take(region_height).enumerate() {
            painter.paint_row(py, &mut row[..region_width * 4]);
        }
    }

    Ok(())
}

struct CellPainter<'a> {
    colors: &'a [Rgba],
    grid_width: usize,
    grid_height: usize,
    k: usize,
    smoothing: bool,
}

impl CellPainter<'_> {
    fn paint_row(&self, py: usize, row: &mut [u8]) {
        for (px, pixel) in row.chunks_exact_mut(4).enumerate() {
            let color = if self.smoothing {
                self.smoothed(px, py)
            } else {
                self.cell(px / self.k, py / self.k)
            };
            pixel.copy_from_slice(&color.to_array());
        }
    }

    fn cell(&self, col: usize, row: usize) -> Rgba {
        self.colors[row * self.grid_width + col]
    }

    /// Bilinear blend of the four cell colors around the pixel center.
    /// Pixels touching a no-data cell keep their own cell's color.
    fn smoothed(&self, px: usize, py: usize) -> Rgba {
        let (x0, x1, fx) = self.axis(px, self.grid_width);
        let (y0, y1, fy) = self.axis(py, self.grid_height);

        let c00 = self.cell(x0, y0);
        let c10 = self.cell(x1, y0);
        let c01 = self.cell(x0, y1);
        let c11 = self.cell(x1, y1);

        if [c00, c10, c01, c11].contains(&NO_DATA) {
            return self.cell(px / self.k, py / self.k);
        }

        let top = lerp(c00, c10, fx);
        let bottom = lerp(c01, c11, fx);
        let mix = |a: f32, b: f32| (a + (b - a) * fy).round().clamp(0.0, 255.0) as u8;
        Rgba::new(
            mix(top[0], bottom[0]),
            mix(top[1], bottom[1]),
            mix(top[2], bottom[2]),
            mix(top[3], bottom[3]),
        )
    }

    /// Neighboring cell indices and blend weight along one axis.
    fn axis(&self, p: usize, cells: usize) -> (usize, usize, f32) {
        let pos = ((p as f32 + 0.5) / self.k as f32 - 0.5).clamp(0.0, (cells - 1) as f32);
        let i0 = pos.floor() as usize;
        let i1 = (i0 + 1).min(cells - 1);
        (i0, i1, pos - i0 as f32)
    }
}

fn lerp(a: Rgba, b: Rgba, t: f32) -> [f32; 4] {
    let mix = |x: u8, y: u8| x as f32 + (y as f32 - x as f32) * t;
    [mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a)]
}
