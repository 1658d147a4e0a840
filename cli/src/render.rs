use std::fmt::{Display, Write};
use tilegrid_core as game;

/// Plain-text board: one row per line, `.` for empty cells, the selected cell in brackets.
pub(crate) fn render_text<K>(snapshot: &game::Snapshot<'_, K>) -> String
where
    K: Copy + PartialEq + Display,
{
    let cells = snapshot.grid.rows();
    let width = cells
        .iter()
        .flatten()
        .filter_map(|cell| cell.kind())
        .map(|kind| kind.to_string().len())
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    let _ = write!(out, "score: {}", snapshot.score);
    if let Some(best) = snapshot.best_score {
        let _ = write!(out, "  best: {}", best);
    }
    let _ = write!(out, "  moves: {}", snapshot.move_count);
    match snapshot.terminal {
        Some(game::Terminal::Win) => out.push_str("  [win]"),
        Some(game::Terminal::Loss) => out.push_str("  [loss]"),
        None => {}
    }
    out.push('\n');

    for (row, line) in cells.iter().enumerate() {
        for (col, cell) in line.iter().enumerate() {
            let text = match cell.kind() {
                Some(kind) => kind.to_string(),
                None => ".".to_string(),
            };
            let coords = (row as game::Coord, col as game::Coord);
            let (open, close) = if snapshot.selected == Some(coords) {
                ('[', ']')
            } else {
                (' ', ' ')
            };
            let _ = write!(out, "{open}{text:>width$}{close}");
        }
        out.push('\n');
    }
    out
}
