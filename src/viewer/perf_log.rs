//! Per-frame timing written as CSV the `frametime` tool can summarize

use std::path::Path;
use std::time::Duration;

use crate::error::{IoResultExt, ToolResult};

const HEADER: [&str; 2] = ["Frame", "FrameTime"];

#[derive(Debug, Default)]
pub struct PerformanceLog {
    frame_times_ms: Vec<f64>,
}

impl PerformanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame_time: Duration) {
        self.frame_times_ms.push(frame_time.as_secs_f64() * 1000.0);
    }

    pub fn len(&self) -> usize {
        self.frame_times_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_times_ms.is_empty()
    }

    pub fn write_csv(&self, path: &Path) -> ToolResult<()> {
        let file = std::fs::File::create(path).with_path(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(HEADER)?;
        for (frame, frame_time) in self.frame_times_ms.iter().enumerate() {
            writer.write_record([frame.to_string(), frame_time.to_string()])?;
        }
        writer.flush().with_path(path)?;
        log::info!(
            "[viewer::perf_log] Wrote {} frame times to {}",
            self.len(),
            path.display()
        );
        Ok(())
    }
}
