//! 诊断渲染
//!
//! Renders an error message together with the offending source line and a
//! column-aligned caret:
//!
//! ```text
//! error: expected `is`, found identifier `x`
//!  --> demo.sl:3:15
//!    3 | declare count x 3 litres
//!      |               ^
//! ```

use crate::util::span::Position;

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Wrap the severity label in ANSI colour codes
    pub use_colors: bool,
    /// Show line numbers in the gutter
    pub show_line_numbers: bool,
    /// Indicator character (default: "^")
    pub indicator: char,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: false,
            show_line_numbers: true,
            indicator: '^',
        }
    }
}

/// Render `message` pointing at `position` inside `source`.
pub fn render_snippet(
    source_name: &str,
    source: &str,
    position: Position,
    message: &str,
) -> String {
    render_snippet_with(&EmitterConfig::default(), source_name, source, position, message)
}

/// Render with an explicit configuration
pub fn render_snippet_with(
    config: &EmitterConfig,
    source_name: &str,
    source: &str,
    position: Position,
    message: &str,
) -> String {
    let label = if config.use_colors {
        "\x1b[31merror\x1b[0m"
    } else {
        "error"
    };

    let mut output = format!("{}: {}\n", label, message);
    output.push_str(&format!(
        " --> {}:{}:{}\n",
        source_name, position.line, position.column
    ));

    if let Some(line) = source_line(source, position.line) {
        if config.show_line_numbers {
            output.push_str(&format!("{:>4} | ", position.line));
        } else {
            output.push_str("     | ");
        }
        output.push_str(line);
        output.push('\n');

        let spaces = " ".repeat(position.column.saturating_sub(1));
        output.push_str(&format!("     | {}{}\n", spaces, config.indicator));
    }

    output
}

/// Fetch a 1-indexed line, without its terminator
pub fn source_line(
    source: &str,
    line: usize,
) -> Option<&str> {
    if line == 0 {
        return None;
    }
    source.lines().nth(line - 1)
}
