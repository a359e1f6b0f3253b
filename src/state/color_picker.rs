//! Color-picker seam.
//!
//! The picker widget itself is external; the link builder only needs to push
//! a color in, read the current hex back and hear about user changes.
//! [`SwatchPicker`] is the headless implementation.

#[cfg(test)]
#[path = "color_picker_test.rs"]
mod color_picker_test;

use crate::util::color::{DEFAULT_CELL_COLOR, normalize_hex_color};

/// Callback invoked with the new `#rrggbb` value.
pub type ColorListener = Box<dyn FnMut(&str)>;

pub trait ColorPicker {
    /// Move the picker to `hex`. Invalid input leaves the current color.
    fn set_color(&mut self, hex: &str);

    /// Current color as `#rrggbb`.
    fn hex_string(&self) -> String;

    /// Subscribe to color changes.
    fn on_change(&mut self, listener: ColorListener);
}

/// In-memory picker holding one normalized color.
pub struct SwatchPicker {
    hex: String,
    listeners: Vec<ColorListener>,
}

impl SwatchPicker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_color(DEFAULT_CELL_COLOR)
    }

    #[must_use]
    pub fn with_color(hex: &str) -> Self {
        Self { hex: normalize_hex_color(hex, DEFAULT_CELL_COLOR), listeners: Vec::new() }
    }
}

impl Default for SwatchPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SwatchPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwatchPicker")
            .field("hex", &self.hex)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ColorPicker for SwatchPicker {
    fn set_color(&mut self, hex: &str) {
        let next = normalize_hex_color(hex, &self.hex);
        if next == self.hex {
            return;
        }
        self.hex = next;
        for listener in &mut self.listeners {
            listener(&self.hex);
        }
    }

    fn hex_string(&self) -> String {
        self.hex.clone()
    }

    fn on_change(&mut self, listener: ColorListener) {
        self.listeners.push(listener);
    }
}
