//! Color theme for the listing and panels, persisted as JSON.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use console::Style;
use serde::{Deserialize, Serialize};

use e86_disasm::token::TokenKind;

use crate::error::MonitorResult;

/// An `[r, g, b, a]` color with components in `0.0..=1.0`.
pub type Rgba = [f32; 4];

/// On-disk theme format.
///
/// The key names and value shapes are stable; other tools read the same
/// file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColorTheme {
    pub address_color: Rgba,
    pub bytes_color: Rgba,
    pub breakpoint_hovered_color: u32,
    pub breakpoint_clicked_color: u32,
    /// Token-kind name to color, keyed by [`TokenKind::name`].
    pub token_colors: HashMap<String, Rgba>
}
impl ColorTheme {
    /// Reads a theme from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> MonitorResult<Self> {
        let text = fs::read_to_string(path)?;
        let theme = serde_json::from_str(&text)?;
        Ok(theme)
    }

    /// Writes the theme to `path` as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> MonitorResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Terminal style for a token kind; unknown kinds stay unstyled.
    pub fn token_style(&self, kind: TokenKind) -> Style {
        match self.token_colors.get(kind.name()) {
            Some(&color) => Style::new().color256(ansi_index(color)),
            None => Style::new()
        }
    }

    /// Terminal style for the address column.
    pub fn address_style(&self) -> Style {
        Style::new().color256(ansi_index(self.address_color))
    }

    /// Terminal style for the raw-bytes column.
    pub fn bytes_style(&self) -> Style {
        Style::new().color256(ansi_index(self.bytes_color))
    }
}
impl Default for ColorTheme {
    fn default() -> Self {
        let mut token_colors = HashMap::new();
        token_colors.insert(String::from("Keyword"), [0.86, 0.47, 0.25, 1.0]);
        token_colors.insert(String::from("Register"), [0.38, 0.69, 0.94, 1.0]);
        token_colors.insert(String::from("Number"), [0.71, 0.84, 0.51, 1.0]);
        token_colors.insert(String::from("Identifier"), [0.86, 0.86, 0.86, 1.0]);
        token_colors.insert(String::from("LBracket"), [0.66, 0.66, 0.66, 1.0]);
        token_colors.insert(String::from("RBracket"), [0.66, 0.66, 0.66, 1.0]);
        token_colors.insert(String::from("Comma"), [0.66, 0.66, 0.66, 1.0]);
        token_colors.insert(String::from("Colon"), [0.66, 0.66, 0.66, 1.0]);
        token_colors.insert(String::from("Plus"), [0.66, 0.66, 0.66, 1.0]);
        token_colors.insert(String::from("Minus"), [0.66, 0.66, 0.66, 1.0]);

        ColorTheme {
            address_color: [0.55, 0.58, 0.62, 1.0],
            bytes_color: [0.45, 0.45, 0.45, 1.0],
            breakpoint_hovered_color: 0x60_40_40_FF,
            breakpoint_clicked_color: 0xFF_30_30_FF,
            token_colors
        }
    }
}

/// Maps an RGBA color onto the 6x6x6 cube of the 256-color terminal
/// palette. The alpha channel is ignored.
pub fn ansi_index(color: Rgba) -> u8 {
    let quantize = |component: f32| -> u8 {
        (component.clamp(0.0, 1.0) * 5.0).round() as u8
    };

    16 + 36 * quantize(color[0]) + 6 * quantize(color[1]) + quantize(color[2])
}
