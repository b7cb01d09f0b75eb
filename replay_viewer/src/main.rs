// Entry point for the replay viewer: loads a recorded pursuit-evasion study
// and either plays it back in a window or exports animation files.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use pursuit_replay::core_modules::record::{Outcome, StudyRecord};
use pursuit_replay::pipeline::{save_aggregate, save_per_replication, Layout, RenderConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory with simulation results (expects sims.bin)
    #[arg(long)]
    data_dir: PathBuf,

    /// Save the animation instead of displaying it live
    #[arg(long)]
    save: bool,

    /// With --save, write each replication to its own file
    #[arg(long)]
    separate: bool,

    /// Render the tactical picture and belief surface side by side
    #[arg(long)]
    sidebyside: bool,

    /// Output path for saved animations (defaults to {data-dir}/animation.gif)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // --- 1. Load & validate the study record ---
    let record_path = args.data_dir.join("sims.bin");
    let bytes = fs::read(&record_path)
        .with_context(|| format!("reading {}", record_path.display()))?;
    let record = StudyRecord::decode(&bytes)
        .with_context(|| format!("decoding {}", record_path.display()))?;
    print_summary(&record);

    // --- 2. Assemble the render configuration ---
    let config = RenderConfig {
        layout: if args.sidebyside {
            Layout::SideBySide
        } else {
            Layout::Single
        },
        ..RenderConfig::default()
    };

    // --- 3. Dispatch the selected output mode ---
    if args.save {
        let output = args
            .output
            .unwrap_or_else(|| args.data_dir.join("animation.gif"));
        if args.separate {
            save_per_replication(&record, &config, &output)?;
        } else {
            save_aggregate(&record, &config, &output)?;
        }
    } else {
        display::run_live(&record, &config)?;
    }

    Ok(())
}

fn print_summary(record: &StudyRecord) {
    let mut caught = 0usize;
    let mut goal = 0usize;
    let mut time = 0usize;
    for rep in &record.replications {
        match rep.outcome {
            Outcome::Caught => caught += 1,
            Outcome::Goal => goal += 1,
            Outcome::Time => time += 1,
        }
    }
    println!(
        "replay: {} nodes, {} replications, {} snapshots (caught {caught}, goal {goal}, timed out {time})",
        record.network.len(),
        record.replications.len(),
        record.total_snapshots(),
    );
}

#[cfg(feature = "display")]
mod display {
    use image::RgbaImage;
    use opencv::{
        core::{self, Mat},
        highgui,
        prelude::*,
    };

    use pursuit_replay::core_modules::frame_index::FrameIndex;
    use pursuit_replay::core_modules::record::StudyRecord;
    use pursuit_replay::pipeline::{AnimationDriver, RenderConfig, Tick};

    const WINDOW: &str = "pursuit replay";

    /// Play the full study in a window, one frame per configured interval.
    /// Closing the window (or pressing ESC) ends the animation early; that
    /// is a normal terminal transition, not an error.
    pub fn run_live(record: &StudyRecord, config: &RenderConfig) -> anyhow::Result<()> {
        let index = FrameIndex::all_replications(record);
        let mut driver = AnimationDriver::new(record, index, config)?;
        let hold_ms = config.frame_interval.as_millis().max(1) as i32;

        highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE)?;
        loop {
            match driver.tick()? {
                Tick::Frame(frame) => {
                    let mat = frame_to_mat(&frame)?;
                    highgui::imshow(WINDOW, &mat)?;
                    let key = highgui::wait_key(hold_ms)?;
                    let visible =
                        highgui::get_window_property(WINDOW, highgui::WND_PROP_VISIBLE)?;
                    if key == 27 || visible < 1.0 {
                        driver.close();
                    }
                }
                Tick::Done => break,
            }
        }
        highgui::destroy_all_windows()?;
        Ok(())
    }

    fn frame_to_mat(frame: &RgbaImage) -> opencv::Result<Mat> {
        let mut bgr = Mat::new_rows_cols_with_default(
            frame.height() as i32,
            frame.width() as i32,
            core::CV_8UC3,
            core::Scalar::all(0.0),
        )?;
        for (x, y, pixel) in frame.enumerate_pixels() {
            let out = bgr.at_2d_mut::<core::Vec3b>(y as i32, x as i32)?;
            out[0] = pixel[2];
            out[1] = pixel[1];
            out[2] = pixel[0];
        }
        Ok(bgr)
    }
}

#[cfg(not(feature = "display"))]
mod display {
    use pursuit_replay::core_modules::record::StudyRecord;
    use pursuit_replay::pipeline::RenderConfig;

    pub fn run_live(_record: &StudyRecord, _config: &RenderConfig) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(
            "display feature not enabled for replay_viewer; \
             rebuild with --features display, or export files with --save"
        ))
    }
}
