// SPDX-License-Identifier: GPL-3.0-only

//! Settings form element state
//!
//! Holds the raw values of the controls in the settings panel. Width and
//! height are text inputs and may hold anything the user typed; validation
//! happens when the host asks for the image config.

use super::image_config::{DemosaicFilter, ImageConfig, PixelFormat};
use crate::constants::limits::ROTATIONS;

/// Longest text accepted by the width/height inputs
const MAX_INPUT_LEN: usize = 6;

/// Focusable controls of the settings panel, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Rotation,
    Format,
    Width,
    Height,
    Filter,
    AutoWhiteBalance,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Rotation,
        FormField::Format,
        FormField::Width,
        FormField::Height,
        FormField::Filter,
        FormField::AutoWhiteBalance,
    ];

    /// Label shown next to the control
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Rotation => "Rotation",
            FormField::Format => "Format",
            FormField::Width => "Width",
            FormField::Height => "Height",
            FormField::Filter => "Filter",
            FormField::AutoWhiteBalance => "Auto white balance",
        }
    }

    /// Next field in tab order, wrapping around
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Previous field in tab order, wrapping around
    pub fn previous(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Current values of the settings controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub rotation_selector: i32,
    pub format_selector: PixelFormat,
    pub image_width: String,
    pub image_height: String,
    pub filter_selector: DemosaicFilter,
    pub auto_white_balance: bool,
}

impl FormState {
    /// Form pre-filled with the given values
    pub fn from_defaults(defaults: &ImageConfig) -> Self {
        Self {
            rotation_selector: defaults.rotation,
            format_selector: defaults.format,
            image_width: defaults.width.to_string(),
            image_height: defaults.height.to_string(),
            filter_selector: defaults.filter,
            auto_white_balance: defaults.awb,
        }
    }

    /// Human-readable value of a control
    pub fn display_value(&self, field: FormField) -> String {
        match field {
            FormField::Rotation => format!("{}°", self.rotation_selector),
            FormField::Format => self.format_selector.to_string(),
            FormField::Width => self.image_width.clone(),
            FormField::Height => self.image_height.clone(),
            FormField::Filter => self.filter_selector.to_string(),
            FormField::AutoWhiteBalance => {
                let mark = if self.auto_white_balance { "[x]" } else { "[ ]" };
                mark.to_string()
            }
        }
    }

    /// Step a selector to its next/previous option; other fields are untouched
    pub fn cycle_selector(&mut self, field: FormField, forward: bool) {
        match field {
            FormField::Rotation => {
                self.rotation_selector = cycle(&ROTATIONS, &self.rotation_selector, forward);
            }
            FormField::Format => {
                self.format_selector = cycle(&PixelFormat::ALL, &self.format_selector, forward);
            }
            FormField::Filter => {
                self.filter_selector = cycle(&DemosaicFilter::ALL, &self.filter_selector, forward);
            }
            FormField::AutoWhiteBalance => self.toggle_checkbox(),
            FormField::Width | FormField::Height => {}
        }
    }

    pub fn toggle_checkbox(&mut self) {
        self.auto_white_balance = !self.auto_white_balance;
    }

    /// Type a character into a text input
    pub fn push_char(&mut self, field: FormField, c: char) {
        if !(c.is_ascii_digit() || c == '-') {
            return;
        }
        if let Some(input) = self.text_input_mut(field)
            && input.len() < MAX_INPUT_LEN
        {
            input.push(c);
        }
    }

    /// Delete the last character of a text input
    pub fn pop_char(&mut self, field: FormField) {
        if let Some(input) = self.text_input_mut(field) {
            input.pop();
        }
    }

    fn text_input_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Width => Some(&mut self.image_width),
            FormField::Height => Some(&mut self.image_height),
            _ => None,
        }
    }
}

/// Pick the neighbour of `current` in `options`; unknown values restart at the first option
fn cycle<T: Copy + PartialEq>(options: &[T], current: &T, forward: bool) -> T {
    let len = options.len();
    match options.iter().position(|o| o == current) {
        Some(index) if forward => options[(index + 1) % len],
        Some(index) => options[(index + len - 1) % len],
        None => options[0],
    }
}
