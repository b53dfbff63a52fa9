//! Status area shown below the word rows.

use std::time::Duration;

use derdiedas_core::{StatsSnapshot, GAME_TITLE};
use derdiedas_surface::Shape;

/// Point-in-time contents of the status area.
pub(crate) struct Status {
    visible: usize,
    dictionary: usize,
    snapshot: StatsSnapshot,
    elapsed: Duration,
}

impl Status {
    pub(crate) fn gather(
        visible: usize,
        dictionary: usize,
        snapshot: StatsSnapshot,
        elapsed: Duration,
    ) -> Self {
        Self {
            visible,
            dictionary,
            snapshot,
            elapsed,
        }
    }

    /// Renders the four status lines.
    pub(crate) fn render(&self) -> Shape {
        let minutes = self.elapsed.as_secs() / 60;
        let seconds = self.elapsed.as_secs() % 60;
        Shape::from_lines(vec![
            format!("{GAME_TITLE}  ({minutes:02}:{seconds:02})"),
            format!(
                "on screen: {}   dictionary: {}",
                self.visible, self.dictionary
            ),
            format!(
                "spawned: {}   revealed: {}   missed: {}",
                self.snapshot.spawned, self.snapshot.revealed, self.snapshot.missed
            ),
            "press q or esc to quit".to_owned(),
        ])
    }
}
