// THEORY:
// The `pipeline` module is the top-level API of the replay engine. It wires
// the frame builder to an enumeration of frames (the index) through a small
// state machine (the driver), and hands finished frames to a sink. The
// driver knows nothing about destinations; sinks know nothing about how
// frames are made. The three output modes of the system are one-line
// compositions of those two halves.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::core_modules::frame::FrameBuilder;
use crate::core_modules::frame_index::FrameIndex;
use crate::core_modules::record::StudyRecord;
use crate::error::{ReplayError, ReplayResult};

// Re-export key data structures for the public API.
pub use crate::core_modules::frame::Layout;
pub use crate::core_modules::record::{Outcome, Replication, TimePoint};
pub use crate::core_modules::frame_index::FramePointer;

/// Configuration for the replay renderer, allowing for tunable output.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Grid points per axis of the interpolated belief surface.
    pub grid_resolution: usize,
    /// Number of discrete color bands the surface is quantized into.
    pub contour_bands: usize,
    /// Symmetric padding applied to the tip bounding rectangle, in domain
    /// units. Keeps a one-node tip visibly non-degenerate.
    pub tip_padding: f64,
    /// Edge length of one square panel, in pixels.
    pub panel_size: u32,
    /// Wall-clock pacing between frames: the live display's hold time and
    /// the encoded delay of saved animations.
    pub frame_interval: Duration,
    /// Visual composition of each frame.
    pub layout: Layout,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            grid_resolution: 50,
            contour_bands: 10,
            tip_padding: 0.02,
            panel_size: 480,
            frame_interval: Duration::from_secs(1),
            layout: Layout::Single,
        }
    }
}

/// The two states of an animation driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Done,
}

/// Result of one driver tick.
pub enum Tick {
    /// A freshly rendered frame for the step just advanced past.
    Frame(RgbaImage),
    /// The index is exhausted (or the canvas was closed); no frame was
    /// built and none ever will be again.
    Done,
}

/// Stateful loop advancing through a frame index one tick at a time.
///
/// Construction validates the record's schema, so every violation surfaces
/// before the first frame is rendered. A builder failure mid-run propagates
/// and aborts the animation; there is no per-frame recovery.
pub struct AnimationDriver<'a> {
    builder: FrameBuilder<'a>,
    index: FrameIndex,
    step: usize,
    state: DriverState,
}

impl<'a> std::fmt::Debug for AnimationDriver<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationDriver")
            .field("index", &self.index)
            .field("step", &self.step)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a> AnimationDriver<'a> {
    pub fn new(
        record: &'a StudyRecord,
        index: FrameIndex,
        config: &RenderConfig,
    ) -> ReplayResult<Self> {
        record.validate()?;
        Ok(Self {
            builder: FrameBuilder::new(record, config),
            index,
            step: 0,
            state: DriverState::Running,
        })
    }

    /// Advance one step: render the current frame and move past it, or
    /// transition to DONE when the index is exhausted. DONE is terminal;
    /// further ticks are no-ops.
    pub fn tick(&mut self) -> ReplayResult<Tick> {
        if self.state == DriverState::Done {
            return Ok(Tick::Done);
        }
        match self.index.get(self.step) {
            Some(pointer) => {
                let frame = self.builder.build(pointer)?;
                self.step += 1;
                Ok(Tick::Frame(frame))
            }
            None => {
                self.state = DriverState::Done;
                Ok(Tick::Done)
            }
        }
    }

    /// Forced terminal transition, e.g. when the host window is closed
    /// before the index is exhausted. Not an error.
    pub fn close(&mut self) {
        self.state = DriverState::Done;
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Steps rendered so far.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    /// Total steps the index holds.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Destination for rendered frames.
pub trait FrameSink {
    /// Accept the next frame, in index order.
    fn consume(&mut self, frame: &RgbaImage) -> ReplayResult<()>;
    /// Flush and seal the destination. No frames may follow.
    fn finish(&mut self) -> ReplayResult<()>;
}

/// Writes frames into one animated GIF at a fixed frame delay.
pub struct GifSink {
    encoder: Option<GifEncoder<File>>,
    delay: Delay,
    frames_written: usize,
}

impl GifSink {
    pub fn create(path: &Path, frame_interval: Duration) -> ReplayResult<Self> {
        let file = File::create(path)?;
        let mut encoder = GifEncoder::new(file);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|err| ReplayError::Encode(err.to_string()))?;
        Ok(Self {
            encoder: Some(encoder),
            delay: Delay::from_saturating_duration(frame_interval),
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

impl FrameSink for GifSink {
    fn consume(&mut self, frame: &RgbaImage) -> ReplayResult<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| ReplayError::Encode("gif sink already finished".into()))?;
        encoder
            .encode_frame(Frame::from_parts(frame.clone(), 0, 0, self.delay))
            .map_err(|err| ReplayError::Encode(err.to_string()))?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> ReplayResult<()> {
        // Dropping the encoder writes the GIF trailer.
        self.encoder.take();
        Ok(())
    }
}

/// Drive an animation to completion against a sink. Returns the number of
/// frames delivered.
pub fn run_to_sink(driver: &mut AnimationDriver<'_>, sink: &mut dyn FrameSink) -> ReplayResult<usize> {
    let mut frames = 0;
    loop {
        match driver.tick()? {
            Tick::Frame(frame) => {
                sink.consume(&frame)?;
                frames += 1;
            }
            Tick::Done => break,
        }
    }
    sink.finish()?;
    Ok(frames)
}

/// Render every replication into one aggregate animation file.
pub fn save_aggregate(
    record: &StudyRecord,
    config: &RenderConfig,
    path: &Path,
) -> ReplayResult<usize> {
    let index = FrameIndex::all_replications(record);
    let mut driver = AnimationDriver::new(record, index, config)?;
    let mut sink = GifSink::create(path, config.frame_interval)?;
    let frames = run_to_sink(&mut driver, &mut sink)?;
    println!("replay: wrote {} ({frames} frames)", path.display());
    Ok(frames)
}

/// Render each replication into its own animation file, derived from the
/// base path by a zero-padded replication counter. Returns the paths
/// written, in replication order.
pub fn save_per_replication(
    record: &StudyRecord,
    config: &RenderConfig,
    base: &Path,
) -> ReplayResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(record.replications.len());
    for replication in 0..record.replications.len() {
        let path = replication_path(base, replication);
        let index = FrameIndex::single_replication(record, replication)?;
        let mut driver = AnimationDriver::new(record, index, config)?;
        let mut sink = GifSink::create(&path, config.frame_interval)?;
        let frames = run_to_sink(&mut driver, &mut sink)?;
        println!("replay: wrote {} ({frames} frames)", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Derive the per-replication output path: `{stem}_{rep:03}{ext}`.
pub fn replication_path(base: &Path, replication: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("animation");
    let name = match base.extension().and_then(|s| s.to_str()) {
        Some(ext) => format!("{stem}_{replication:03}.{ext}"),
        None => format!("{stem}_{replication:03}"),
    };
    base.with_file_name(name)
}
