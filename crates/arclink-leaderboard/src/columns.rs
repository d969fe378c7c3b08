//! The current board split into display columns.

use std::fmt;

use arclink_protocol::BoardEntry;

use crate::LeaderboardOptions;

/// Shown when the backend has no display name for an entry.
pub const UNKNOWN_NAME: &str = "unknown";

/// Three parallel columns, one row per board entry, in board order.
///
/// All three always have the same length as the board they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    pub rank: Vec<String>,
    pub display_name: Vec<String>,
    pub score: Vec<String>,
}

/// [`Columns`] joined into one newline-separated string per column, ready
/// for three side-by-side text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedColumns {
    pub rank: String,
    pub display_name: String,
    pub score: String,
}

impl Columns {
    pub(crate) fn from_board(board: &[BoardEntry], options: &LeaderboardOptions) -> Self {
        let multiplier = options.score_storage_multiplier;
        let render = &options.value_renderer;
        Self {
            rank: board.iter().map(|e| e.rank.to_string()).collect(),
            display_name: board
                .iter()
                .map(|e| {
                    e.display_name
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
                })
                .collect(),
            score: board
                .iter()
                .map(|e| render(e.score as f64 / multiplier))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rank.is_empty()
    }

    /// Joins the first `max_rows` rows of each column with newlines.
    pub fn render(&self, max_rows: usize) -> RenderedColumns {
        let join = |column: &[String]| {
            column
                .iter()
                .take(max_rows)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n")
        };
        RenderedColumns {
            rank: join(&self.rank[..]),
            display_name: join(&self.display_name[..]),
            score: join(&self.score[..]),
        }
    }
}

/// One `rank - name - score` line per row.
impl fmt::Display for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .rank
            .iter()
            .zip(&self.display_name)
            .zip(&self.score);
        for (i, ((rank, name), score)) in rows.enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{rank} - {name} - {score}")?;
        }
        Ok(())
    }
}
