// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Perception engine interface.
//!
//! The landmark model is an external black box reached through the narrow
//! [`PerceptionEngine`] trait: configure it once, register a result handler, submit
//! frames, and release it on teardown. Results may arrive on any thread, so the
//! handler must be `Send`.
//!
//! [`ReplayEngine`] implements the trait over results recorded from a live engine,
//! one JSON object per line.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{OverlayError, Result};
use crate::results::{PerceptionResult, ResultRecord};

/// Callback receiving one result per processed frame.
pub type ResultHandler = Box<dyn FnMut(PerceptionResult) + Send>;

/// Options applied to a perception engine before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Produce a segmentation mask with each result.
    pub enable_segmentation: bool,
    /// Minimum confidence for a new detection.
    pub min_detection_confidence: f32,
    /// Minimum confidence to keep tracking an existing detection.
    pub min_tracking_confidence: f32,
    /// Model complexity tier: 0, 1, or 2.
    pub model_complexity: u8,
    /// Input is a mirrored selfie view.
    pub selfie_mode: bool,
    /// Temporal smoothing of landmarks.
    pub smooth_landmarks: bool,
    /// Temporal smoothing of the segmentation mask.
    pub smooth_segmentation: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            enable_segmentation: false,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            model_complexity: 1,
            selfie_mode: true,
            smooth_landmarks: true,
            smooth_segmentation: true,
        }
    }
}

impl EngineOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable segmentation masks.
    #[must_use]
    pub const fn with_segmentation(mut self, enable: bool) -> Self {
        self.enable_segmentation = enable;
        self
    }

    /// Set the detection and tracking confidence thresholds.
    #[must_use]
    pub const fn with_confidence(mut self, detection: f32, tracking: f32) -> Self {
        self.min_detection_confidence = detection;
        self.min_tracking_confidence = tracking;
        self
    }

    /// Set the model complexity tier.
    #[must_use]
    pub const fn with_model_complexity(mut self, complexity: u8) -> Self {
        self.model_complexity = complexity;
        self
    }

    /// Enable or disable mirrored input.
    #[must_use]
    pub const fn with_selfie_mode(mut self, selfie: bool) -> Self {
        self.selfie_mode = selfie;
        self
    }

    /// Check that thresholds and tiers are in range.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the first invalid option.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OverlayError::ConfigError(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.model_complexity > 2 {
            return Err(OverlayError::ConfigError(format!(
                "model_complexity must be 0, 1, or 2, got {}",
                self.model_complexity
            )));
        }
        Ok(())
    }
}

/// External landmark engine.
pub trait PerceptionEngine {
    /// Apply options. Called once before the first frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the engine is released.
    fn configure(&mut self, options: &EngineOptions) -> Result<()>;

    /// Register the single result handler, replacing any previous one.
    fn on_result(&mut self, handler: ResultHandler);

    /// Submit one frame for processing.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is released or the frame cannot be processed.
    fn submit_frame(&mut self, frame: &DynamicImage) -> Result<()>;

    /// Release the engine. No handler fires afterwards.
    fn release(&mut self);
}

/// Engine that replays recorded results in submission order.
///
/// Each submitted frame is paired with the next recorded result. The frame becomes
/// the result's source image, mirrored when `selfie_mode` is on, and the recorded
/// mask is loaded when segmentation is enabled. Once the recording is exhausted
/// results carry the frame only.
pub struct ReplayEngine {
    records: VecDeque<ResultRecord>,
    base_dir: PathBuf,
    options: EngineOptions,
    handler: Option<ResultHandler>,
    released: bool,
    frames: usize,
}

impl std::fmt::Debug for ReplayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayEngine")
            .field("remaining", &self.records.len())
            .field("base_dir", &self.base_dir)
            .field("options", &self.options)
            .field("has_handler", &self.handler.is_some())
            .field("released", &self.released)
            .field("frames", &self.frames)
            .finish()
    }
}

impl ReplayEngine {
    /// Create an engine over in-memory records. Mask paths resolve against `base_dir`.
    #[must_use]
    pub fn new(records: Vec<ResultRecord>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            records: records.into(),
            base_dir: base_dir.into(),
            options: EngineOptions::default(),
            handler: None,
            released: false,
            frames: 0,
        }
    }

    /// Open a JSON Lines recording. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a valid record.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            OverlayError::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;
        let records = Self::parse_records(&text)
            .map_err(|e| OverlayError::ResultFormatError(format!("{}: {e}", path.display())))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(records, base_dir))
    }

    /// Parse JSON Lines text into records.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first malformed line.
    pub fn parse_records(text: &str) -> std::result::Result<Vec<ResultRecord>, String> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| format!("line {}: {e}", i + 1))
            })
            .collect()
    }

    /// Options applied by the last [`PerceptionEngine::configure`].
    #[must_use]
    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Recorded results not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.records.len()
    }

    /// Frames submitted so far.
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    fn load_mask(&self, relative: &Path) -> Result<image::GrayImage> {
        let path = self.base_dir.join(relative);
        let mask = image::open(&path).map_err(|e| {
            OverlayError::ImageError(format!("Failed to load mask {}: {e}", path.display()))
        })?;
        Ok(mask.to_luma8())
    }
}

impl PerceptionEngine for ReplayEngine {
    fn configure(&mut self, options: &EngineOptions) -> Result<()> {
        if self.released {
            return Err(OverlayError::EngineError("engine has been released".to_string()));
        }
        options.validate()?;
        self.options = options.clone();
        Ok(())
    }

    fn on_result(&mut self, handler: ResultHandler) {
        self.handler = Some(handler);
    }

    fn submit_frame(&mut self, frame: &DynamicImage) -> Result<()> {
        if self.released {
            return Err(OverlayError::EngineError("engine has been released".to_string()));
        }
        self.frames += 1;
        let record = self.records.pop_front().unwrap_or_default();

        let segmentation_mask = match record.segmentation_mask.as_deref() {
            Some(path) if self.options.enable_segmentation => Some(self.load_mask(path)?),
            _ => None,
        };
        let source_image = if self.options.selfie_mode {
            frame.fliph()
        } else {
            frame.clone()
        };

        let result = PerceptionResult {
            source_image: Some(source_image),
            segmentation_mask,
            ..record.into_result()
        };
        if let Some(handler) = self.handler.as_mut() {
            handler(result);
        }
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
        self.handler = None;
        self.records.clear();
    }
}
