//! Whole-flight extraction loop
//!
//! Drives the per-frame dispatcher over a frame source, carrying the one
//! piece of state that survives between frames: the zero-time latch. Each
//! frame is stamped with its video time (`frame_number / fps`) so the
//! cleaned series has a time base even when the broadcast clock was
//! unreadable.

use super::decoders::Decoders;
use super::dispatcher::{ExtractError, FrameExtractor};
use super::frame::Frame;
use crate::roi::RoiManager;
use crate::telemetry::FrameSample;

/// Supplies decoded frames in ascending index order
pub trait FrameSource {
    /// Frame rate of the video
    fn fps(&self) -> f64;

    /// The next frame and its index, `None` at end of stream
    fn next_frame(&mut self) -> std::io::Result<Option<(u64, Frame)>>;
}

/// Runs extraction over a whole flight and accumulates the samples
pub struct FlightRecorder {
    manager: RoiManager,
    extractor: FrameExtractor,
    zero_time_latched: bool,
    samples: Vec<FrameSample>,
}

impl FlightRecorder {
    /// Build a recorder for one flight
    pub fn new(manager: RoiManager, decoders: Decoders) -> Self {
        FlightRecorder {
            manager,
            extractor: FrameExtractor::new(decoders),
            zero_time_latched: false,
            samples: Vec::new(),
        }
    }

    /// Whether lift-off has been observed on a previous frame
    pub fn zero_time_latched(&self) -> bool {
        self.zero_time_latched
    }

    /// Samples recorded so far, in the order frames were fed in
    pub fn samples(&self) -> &[FrameSample] {
        &self.samples
    }

    /// Extract one frame and append its sample.
    ///
    /// Latches the zero-time flag when the clock reads exactly 0:0:0, so
    /// every later frame short-circuits clock OCR.
    pub fn record_frame(
        &mut self,
        frame: &Frame,
        frame_idx: u64,
        fps: f64,
    ) -> Result<(), ExtractError> {
        let telemetry = self.extractor.extract(
            frame,
            frame_idx,
            fps,
            &self.manager,
            self.zero_time_latched,
        )?;

        if let Some(clock) = &telemetry.time {
            if clock.is_zero() && !self.zero_time_latched {
                tracing::info!("mission clock reached zero at frame {frame_idx}, latching");
                self.zero_time_latched = true;
            }
        }

        self.samples.push(FrameSample {
            frame_number: frame_idx,
            real_time_seconds: frame_idx as f64 / fps,
            telemetry,
        });
        Ok(())
    }

    /// Drain a frame source to end of stream
    pub fn record_all<S: FrameSource>(&mut self, source: &mut S) -> Result<(), ExtractError> {
        let fps = source.fps();
        while let Some((frame_idx, frame)) = source.next_frame()? {
            self.record_frame(&frame, frame_idx, fps)?;
        }
        Ok(())
    }

    /// Finish the flight and hand over the samples
    pub fn into_samples(self) -> Vec<FrameSample> {
        self.samples
    }
}
