// THEORY:
// The `frame` module composes one complete raster frame for a single
// (replication, time) coordinate against a study record. It is the meeting
// point of the whole derivation stack: marker coordinates come from the
// geometry resolver, the belief surface from the interpolator, the tip
// overlay from the region estimator.
//
// Key architectural principles:
// 1.  **Pure frame construction**: `build` is a function from a frame pointer
//     to a finished RGBA image. It allocates a fresh canvas every call; the
//     animation driver's "clear the canvas each tick" contract falls out of
//     that for free. Sinks do I/O, the builder never does.
// 2.  **One builder, two layouts**: the single-panel and side-by-side
//     compositions share every piece of derivation logic and differ only in
//     how the shared panel painters are arranged. The layout is a parameter,
//     not a second code path.
// 3.  **Fixed visual calibration**: both layouts draw the domain
//     [-0.1, 1.1] x [-0.1, 1.1] with a faint unit grid and no tick labels;
//     the coordinate frame exists only to keep frames comparable.

use image::RgbaImage;

use crate::core_modules::colormap::viridis_banded;
use crate::core_modules::frame_index::FramePointer;
use crate::core_modules::geometry::GeometryResolver;
use crate::core_modules::raster::{
    text_width, Canvas, Color, BLACK, GRID_GRAY, PANEL_GRAY, RED, WHITE,
};
use crate::core_modules::record::{StudyRecord, TimePoint};
use crate::core_modules::surface::{RenderedSurface, SurfaceInterpolator};
use crate::core_modules::tip_region::{TipRegion, TipRegionEstimator};
use crate::error::ReplayResult;
use crate::pipeline::RenderConfig;

/// Visual composition of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One panel overlaying the belief surface and the tactical picture.
    Single,
    /// Tactical picture on the left, belief surface on the right.
    SideBySide,
}

/// Height of the title band above the panels, in pixels.
pub const TITLE_BAND_PX: i64 = 24;
/// Gutter between the two panels of the side-by-side layout.
pub const PANEL_GAP_PX: i64 = 8;

const DOMAIN_MIN: f64 = -0.1;
const DOMAIN_SPAN: f64 = 1.2;
const TEXT_SCALE: i64 = 2;
const EVADER_HALF_PX: i64 = 6;
const PURSUER_HALF_PX: i64 = 5;

/// A square viewport mapping the fixed rendering domain to pixels.
#[derive(Debug, Clone, Copy)]
pub struct Panel {
    x0: i64,
    y0: i64,
    size: i64,
}

impl Panel {
    /// The lone panel of the single layout.
    pub fn single(panel_size: u32) -> Self {
        Self {
            x0: 0,
            y0: TITLE_BAND_PX,
            size: panel_size as i64,
        }
    }

    /// The two panels of the side-by-side layout, left then right.
    pub fn side_by_side(panel_size: u32) -> (Self, Self) {
        let size = panel_size as i64;
        let left = Self {
            x0: 0,
            y0: TITLE_BAND_PX,
            size,
        };
        let right = Self {
            x0: size + PANEL_GAP_PX,
            y0: TITLE_BAND_PX,
            size,
        };
        (left, right)
    }

    /// Map a domain coordinate (y up) to a pixel coordinate (y down).
    pub fn to_px(&self, x: f64, y: f64) -> (i64, i64) {
        let scale = self.size as f64 / DOMAIN_SPAN;
        let px = self.x0 + ((x - DOMAIN_MIN) * scale).round() as i64;
        let py = self.y0 + ((DOMAIN_MIN + DOMAIN_SPAN - y) * scale).round() as i64;
        (px, py)
    }

    /// Map a domain rectangle (origin at its min corner) to pixel bounds.
    fn rect_to_px(&self, origin: (f64, f64), width: f64, height: f64) -> (i64, i64, i64, i64) {
        let (left, bottom) = self.to_px(origin.0, origin.1);
        let (right, top) = self.to_px(origin.0 + width, origin.1 + height);
        (left, top, right, bottom)
    }
}

/// Everything derived from one snapshot before any pixel is painted.
struct FrameData {
    evader: (f64, f64),
    pursuers: Vec<(f64, f64)>,
    tip: TipRegion,
    surface: RenderedSurface,
}

/// Builds raster frames from a study record.
pub struct FrameBuilder<'a> {
    record: &'a StudyRecord,
    resolver: GeometryResolver<'a>,
    interpolator: SurfaceInterpolator,
    tip_estimator: TipRegionEstimator,
    layout: Layout,
    panel_size: u32,
    contour_bands: usize,
}

impl<'a> FrameBuilder<'a> {
    pub fn new(record: &'a StudyRecord, config: &RenderConfig) -> Self {
        Self {
            record,
            resolver: GeometryResolver::new(&record.network),
            interpolator: SurfaceInterpolator::new(config.grid_resolution),
            tip_estimator: TipRegionEstimator::new(config.tip_padding),
            layout: config.layout,
            panel_size: config.panel_size,
            contour_bands: config.contour_bands,
        }
    }

    /// Pixel dimensions of every frame this builder produces.
    pub fn frame_dimensions(&self) -> (u32, u32) {
        let size = self.panel_size as i64;
        let (width, height) = match self.layout {
            Layout::Single => (size, TITLE_BAND_PX + size),
            Layout::SideBySide => (2 * size + PANEL_GAP_PX, TITLE_BAND_PX + size),
        };
        (width as u32, height as u32)
    }

    /// Render the frame for one (replication, time) coordinate.
    pub fn build(&self, pointer: FramePointer) -> ReplayResult<RgbaImage> {
        let snapshot = self.record.snapshot(pointer.replication, pointer.time)?;
        let data = self.derive(snapshot)?;

        let (width, height) = self.frame_dimensions();
        let mut canvas = Canvas::new(width, height, BLACK);
        self.paint_title(&mut canvas, pointer);

        match self.layout {
            Layout::Single => {
                let panel = Panel::single(self.panel_size);
                self.paint_surface(&mut canvas, panel, &data.surface);
                paint_unit_grid(&mut canvas, panel);
                paint_tip(&mut canvas, panel, data.tip);
                paint_markers(&mut canvas, panel, &data);
            }
            Layout::SideBySide => {
                let (tactical, belief) = Panel::side_by_side(self.panel_size);
                // Tactical panel: markers over a dark backdrop, no surface.
                let (x0, y0, x1, y1) = tactical.rect_to_px((0.0, 0.0), 1.0, 1.0);
                canvas.fill_rect(x0, y0, x1, y1, PANEL_GRAY);
                paint_unit_grid(&mut canvas, tactical);
                paint_tip(&mut canvas, tactical, data.tip);
                paint_markers(&mut canvas, tactical, &data);
                // Belief panel: the surface alone.
                self.paint_surface(&mut canvas, belief, &data.surface);
                paint_unit_grid(&mut canvas, belief);
            }
        }

        Ok(canvas.into_image())
    }

    fn derive(&self, snapshot: &TimePoint) -> ReplayResult<FrameData> {
        let evader = self.resolver.resolve(snapshot.evader.loc)?;
        let pursuers = snapshot
            .pursuers
            .iter()
            .map(|unit| self.resolver.resolve(unit.loc))
            .collect::<ReplayResult<Vec<_>>>()?;
        let tip = self
            .tip_estimator
            .estimate(&snapshot.informant, &self.resolver)?;
        let surface = self
            .interpolator
            .interpolate(&self.resolver, &snapshot.posterior)?;
        Ok(FrameData {
            evader,
            pursuers,
            tip,
            surface,
        })
    }

    fn paint_title(&self, canvas: &mut Canvas, pointer: FramePointer) {
        let title = format!("REP: {:04} TIME: {:04}", pointer.replication, pointer.time);
        let x = (canvas.width() as i64 - text_width(&title, TEXT_SCALE)) / 2;
        canvas.draw_text(x.max(0), 7, &title, TEXT_SCALE, WHITE);
    }

    /// Paint the interpolated surface as banded cells, normalized per frame.
    /// A flat surface collapses to the middle band; undefined cells stay
    /// background.
    fn paint_surface(&self, canvas: &mut Canvas, panel: Panel, surface: &RenderedSurface) {
        let Some((lo, hi)) = surface.min_max() else {
            return;
        };
        let n = surface.resolution();
        let coords = surface.coords();
        let half_step = if n > 1 { 0.5 / (n - 1) as f64 } else { 0.5 };
        for iy in 0..n {
            for ix in 0..n {
                let Some(value) = surface.value(ix, iy) else {
                    continue;
                };
                let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };
                let [r, g, b] = viridis_banded(t, self.contour_bands);
                let (x0, y0, x1, y1) = panel.rect_to_px(
                    (coords[ix] - half_step, coords[iy] - half_step),
                    2.0 * half_step,
                    2.0 * half_step,
                );
                canvas.fill_rect(x0, y0, x1, y1, [r, g, b, 255]);
            }
        }
    }
}

/// Faint calibration grid over the unit interval, ten divisions per axis.
fn paint_unit_grid(canvas: &mut Canvas, panel: Panel) {
    let (left, top) = panel.to_px(0.0, 1.0);
    let (right, bottom) = panel.to_px(1.0, 0.0);
    for i in 0..10 {
        let t = i as f64 / 9.0;
        let (x, _) = panel.to_px(t, 0.0);
        canvas.vertical_line(x, top, bottom + 1, GRID_GRAY);
        let (_, y) = panel.to_px(0.0, t);
        canvas.horizontal_line(left, right + 1, y, GRID_GRAY);
    }
}

/// Semi-transparent highlighted rectangle over the tip region, if present.
fn paint_tip(canvas: &mut Canvas, panel: Panel, tip: TipRegion) {
    if let TipRegion::Present {
        origin,
        width,
        height,
    } = tip
    {
        let (x0, y0, x1, y1) = panel.rect_to_px(origin, width, height);
        canvas.blend_rect(x0, y0, x1, y1, RED, 0.5);
        canvas.outline_rect(x0, y0, x1, y1, BLACK);
    }
}

/// Evader diamond and pursuer squares, markers last so they stay on top.
fn paint_markers(canvas: &mut Canvas, panel: Panel, data: &FrameData) {
    let (ex, ey) = panel.to_px(data.evader.0, data.evader.1);
    canvas.draw_diamond(ex, ey, EVADER_HALF_PX, RED);
    for &(x, y) in &data.pursuers {
        let (px, py) = panel.to_px(x, y);
        canvas.draw_square(px, py, PURSUER_HALF_PX, WHITE);
    }
}

/// Color of the evader marker, exposed for end-to-end frame checks.
pub const EVADER_COLOR: Color = RED;
