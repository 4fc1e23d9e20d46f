//! Frame Telemetry Extraction
//!
//! Turns video frames into [`FrameTelemetry`](crate::telemetry::FrameTelemetry)
//! records. The dispatcher resolves which regions are active on a frame,
//! crops rectangle regions out of the pixel buffer and routes each region to
//! the decoder matching its role. The decoders themselves (OCR, flame
//! detection, gauge reading) are injected behind traits; this module only
//! orchestrates them.

mod decoders;
mod dispatcher;
mod frame;
mod runner;

pub use decoders::{DecodeError, Decoders, EngineDetector, FuelDetector, TelemetryOcr};
pub use dispatcher::{ExtractError, FrameExtractor};
pub use frame::{slice_region, Frame};
pub use runner::{FlightRecorder, FrameSource};
