//! Conversion of frame-based durations to seconds.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeError {
    #[error("number of frames cannot be negative, received {0}")]
    NegativeFrames(i64),
    #[error("frame rate must be a finite non-negative number, received {0}")]
    InvalidFrameRate(f64),
}

/// Time it takes to display `frames` frames, where `frame_rate` is the
/// display time of a single frame as defined by the graphic.
pub fn frame_to_seconds(frames: i64, frame_rate: f64) -> Result<f64, TimeError> {
    if frames < 0 {
        return Err(TimeError::NegativeFrames(frames));
    }
    if !frame_rate.is_finite() || frame_rate < 0.0 {
        return Err(TimeError::InvalidFrameRate(frame_rate));
    }
    Ok(frames as f64 * frame_rate)
}
