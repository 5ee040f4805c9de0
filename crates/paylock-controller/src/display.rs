//! Virtual character LCD.
//!
//! A 4-line × 20-column text buffer implementing [`DisplayDevice`], used by
//! the simulator and the integration tests in place of the physical panel.
//!
//! # Character Encoding
//!
//! Only printable ASCII (0x20-0x7E) is accepted, matching the character ROM
//! of HD44780-class controllers. Control characters are stripped; any other
//! non-ASCII input is rejected rather than transliterated, so text that would
//! garble on the real panel fails in tests first.
//!
//! # Examples
//!
//! ```
//! use paylock_controller::VirtualLcd;
//! use paylock_hardware::DisplayDevice;
//!
//! let mut lcd = VirtualLcd::new();
//! let screen = lcd.handle();
//!
//! lcd.show(0, "Insert Coin").unwrap();
//! assert_eq!(screen.line(0).unwrap().trim_end(), "Insert Coin");
//! assert_eq!(screen.line(0).unwrap().len(), 20);
//! ```

use std::sync::{Arc, Mutex};

use paylock_core::constants::{LCD_COLUMNS, LCD_LINES};
use paylock_hardware::{DisplayDevice, HardwareError, Result};
use tracing::debug;

/// In-memory LCD.
#[derive(Debug)]
pub struct VirtualLcd {
    columns: usize,
    buffer: Arc<Mutex<Vec<String>>>,
}

impl VirtualLcd {
    /// Create a blank 4×20 display.
    pub fn new() -> Self {
        Self::with_size(LCD_LINES, LCD_COLUMNS)
    }

    /// Create a blank display of the given geometry.
    pub fn with_size(lines: usize, columns: usize) -> Self {
        Self {
            columns,
            buffer: Arc::new(Mutex::new(vec![" ".repeat(columns); lines])),
        }
    }

    /// Read-only view of the screen that stays valid after the display is
    /// moved into the controller.
    pub fn handle(&self) -> LcdHandle {
        LcdHandle {
            buffer: Arc::clone(&self.buffer),
        }
    }

    fn with_buffer<T>(&self, f: impl FnOnce(&mut Vec<String>) -> T) -> Result<T> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| HardwareError::other("lcd buffer lock poisoned"))?;
        Ok(f(&mut buffer))
    }
}

impl Default for VirtualLcd {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayDevice for VirtualLcd {
    fn show(&mut self, line: usize, text: &str) -> Result<()> {
        let sanitized = sanitize_text(text)?;
        let padded = pad_text(&sanitized, self.columns);

        self.with_buffer(|buffer| {
            let lines = buffer.len();
            let slot = buffer.get_mut(line).ok_or_else(|| {
                HardwareError::invalid_data(format!(
                    "line {line} out of range (display has {lines} lines)"
                ))
            })?;
            *slot = padded;
            Ok::<(), HardwareError>(())
        })??;

        debug!(line, text = %sanitized, "lcd");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let columns = self.columns;
        self.with_buffer(|buffer| {
            for slot in buffer.iter_mut() {
                *slot = " ".repeat(columns);
            }
        })
    }
}

/// Shared view of a [`VirtualLcd`].
#[derive(Debug, Clone)]
pub struct LcdHandle {
    buffer: Arc<Mutex<Vec<String>>>,
}

impl LcdHandle {
    /// Content of `line`, padded to the display width.
    pub fn line(&self, line: usize) -> Option<String> {
        self.lines().into_iter().nth(line)
    }

    /// Every line, top first.
    pub fn lines(&self) -> Vec<String> {
        self.buffer
            .lock()
            .map(|buffer| buffer.clone())
            .unwrap_or_default()
    }

    /// The screen framed as it would appear on the panel.
    pub fn render(&self) -> String {
        let lines = self.lines();
        let width = lines.first().map_or(0, String::len);
        let border = format!("+{}+", "-".repeat(width));

        let mut out = String::with_capacity((width + 3) * (lines.len() + 2));
        out.push_str(&border);
        out.push('\n');
        for line in &lines {
            out.push('|');
            out.push_str(line);
            out.push_str("|\n");
        }
        out.push_str(&border);
        out
    }
}

/// Strip control characters and reject anything outside printable ASCII.
fn sanitize_text(text: &str) -> Result<String> {
    let stripped: String = text.chars().filter(|c| !c.is_control()).collect();
    if let Some(bad) = stripped.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(HardwareError::invalid_data(format!(
            "character {bad:?} cannot be shown on the lcd"
        )));
    }
    Ok(stripped)
}

/// Left-align `text` in `width` columns, truncating if needed.
fn pad_text(text: &str, width: usize) -> String {
    let mut line: String = text.chars().take(width).collect();
    let len = line.len();
    line.push_str(&" ".repeat(width - len));
    line
}
