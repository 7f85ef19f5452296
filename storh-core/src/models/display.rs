//! Rendering options handed to the display layer.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default number of items kept in a snapshot.
pub const DEFAULT_MAX_ITEMS: usize = 10;

/// Options recognized by the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayConfig {
    /// Show the column header row.
    pub show_header: bool,
    /// Maximum number of items to keep and display.
    pub max_items: usize,
    /// Fade out the tail of the list.
    pub fade: bool,
    /// Fraction of the list after which fading starts, in `[0, 1)`.
    pub fade_point: f64,
    /// Redraw animation duration in milliseconds.
    #[serde(rename = "animationSpeed")]
    pub animation_speed_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_header: true,
            max_items: DEFAULT_MAX_ITEMS,
            fade: false,
            fade_point: 0.25,
            animation_speed_ms: 1000,
        }
    }
}

impl DisplayConfig {
    /// Validates option ranges.
    ///
    /// A negative `fade_point` is accepted and treated as 0 when fading.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.fade_point.is_finite() {
            return Err(CoreError::InvalidConfig(format!(
                "fadePoint must be a finite number, got {}",
                self.fade_point
            )));
        }
        Ok(())
    }

    /// Returns true if fading applies with the current options.
    pub fn fades(&self) -> bool {
        self.fade && self.fade_point < 1.0
    }

    /// Computes the opacity of each of `len` rows, top to bottom.
    ///
    /// Rows before `len * fade_point` are fully opaque; from there the
    /// opacity drops linearly towards zero at the end of the list.
    pub fn row_opacities(&self, len: usize) -> Vec<f64> {
        if !self.fades() {
            return vec![1.0; len];
        }

        #[allow(clippy::cast_precision_loss)]
        let total = len as f64;
        let start = total * self.fade_point.max(0.0);
        let steps = total - start;

        (0..len)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let i = i as f64;
                if i >= start && steps > 0.0 {
                    1.0 - (i - start) / steps
                } else {
                    1.0
                }
            })
            .collect()
    }
}
