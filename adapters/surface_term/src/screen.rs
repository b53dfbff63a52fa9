//! Terminal setup, teardown, and frame drawing.
//!
//! Raw mode, the alternate screen, and the hidden cursor are held for
//! the lifetime of a [`Screen`] and restored on drop so the terminal
//! comes back even when a frame fails mid-draw. All draw commands are
//! batched with `queue!` and flushed once per frame.

use std::io::{self, Stdout, Write};

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use derdiedas_surface::{GlyphColor, Position, Shape, SurfaceLayout};
use log::warn;

pub(crate) struct Screen {
    out: Stdout,
}

impl Screen {
    pub(crate) fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide).context("entering alternate screen")?;
        Ok(Self { out })
    }

    pub(crate) fn draw(
        &mut self,
        layout: SurfaceLayout,
        entities: &[(Position, Shape, GlyphColor)],
    ) -> Result<()> {
        queue!(self.out, Clear(ClearType::All))?;

        for (position, shape, color) in entities {
            for (line_index, line) in shape.lines().iter().enumerate() {
                let row = position.row() + line_index as u32;
                if row >= layout.rows() {
                    break;
                }
                if let Some((column, text)) = clip_line(line, position.column(), layout.columns())
                {
                    queue!(
                        self.out,
                        MoveTo(column as u16, row as u16),
                        SetForegroundColor(terminal_color(*color)),
                        Print(text)
                    )?;
                }
            }
        }

        queue!(self.out, ResetColor)?;
        self.out.flush().context("flushing frame")?;
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if execute!(self.out, Show, LeaveAlternateScreen).is_err() {
            warn!("failed to leave the alternate screen");
        }
        if terminal::disable_raw_mode().is_err() {
            warn!("failed to disable raw mode");
        }
    }
}

fn terminal_color(color: GlyphColor) -> Color {
    match color {
        GlyphColor::Plain => Color::Reset,
        GlyphColor::Revealed => Color::Green,
        GlyphColor::Missed => Color::Red,
        GlyphColor::Status => Color::White,
    }
}

/// Clips one shape line against the visible columns.
///
/// Returns the on-screen start column and the visible slice of the
/// text, or `None` when nothing of the line is visible. Entities
/// partially off-screen to the left lose their leading characters;
/// the right edge truncates.
pub(crate) fn clip_line(line: &str, column: i32, columns: u32) -> Option<(u32, String)> {
    let skip = if column < 0 { (-column) as usize } else { 0 };
    let start_column = column.max(0) as u32;
    if start_column >= columns {
        return None;
    }

    let budget = (columns - start_column) as usize;
    let text: String = line.chars().skip(skip).take(budget).collect();
    if text.is_empty() {
        return None;
    }
    Some((start_column, text))
}

#[cfg(test)]
mod tests {
    use super::clip_line;

    #[test]
    fn fully_visible_lines_pass_through() {
        assert_eq!(clip_line("___ Hund", 10, 80), Some((10, "___ Hund".to_owned())));
    }

    #[test]
    fn left_offscreen_lines_lose_leading_characters() {
        assert_eq!(clip_line("___ Hund", -4, 80), Some((0, "Hund".to_owned())));
    }

    #[test]
    fn fully_left_offscreen_lines_draw_nothing() {
        assert_eq!(clip_line("___ Hund", -8, 80), None);
    }

    #[test]
    fn right_edge_truncates() {
        assert_eq!(clip_line("___ Hund", 76, 80), Some((76, "___ ".to_owned())));
    }

    #[test]
    fn past_the_right_edge_draws_nothing() {
        assert_eq!(clip_line("___ Hund", 80, 80), None);
    }

    #[test]
    fn clipping_counts_characters_not_bytes() {
        assert_eq!(clip_line("äöü", -1, 80), Some((0, "öü".to_owned())));
    }
}
