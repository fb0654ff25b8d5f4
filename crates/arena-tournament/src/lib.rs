//! Tournament card data for the arena dashboard.
//!
//! Tournaments are read-only display data: they are loaded once from a JSON
//! file and handed to the dashboard as-is. There is no lifecycle here, and
//! join/register actions in the UI are not backed by anything.
//!
//! # File format
//!
//! ```json
//! [
//!   {"id": 1, "name": "Neon Clash", "players": 64, "prize": "$5,000",
//!    "status": "live", "timeLeft": "1h 20m"},
//!   {"id": 2, "name": "Pixel Cup", "players": 32, "prize": "$1,000",
//!    "status": "upcoming", "startsAt": "Sat 18:00"},
//!   {"id": 3, "name": "Retro Rumble", "players": 16, "prize": "$500",
//!    "status": "completed", "result": "Winner: Kaito"}
//! ]
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A tournament card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    /// Unique identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Number of registered players.
    pub players: u32,
    /// Prize description (free text, e.g. "$5,000").
    pub prize: String,
    /// Status with its status-specific display field.
    #[serde(flatten)]
    pub status: TournamentStatus,
}

/// Tournament status.
///
/// Each status carries the one display field that makes sense for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TournamentStatus {
    /// In progress.
    Live {
        /// Time remaining, e.g. "1h 20m".
        #[serde(rename = "timeLeft")]
        time_left: String,
    },
    /// Not started yet.
    Upcoming {
        /// Start time, e.g. "Sat 18:00".
        #[serde(rename = "startsAt")]
        starts_at: String,
    },
    /// Finished.
    Completed {
        /// Final result, e.g. "Winner: Kaito".
        result: String,
    },
}

impl TournamentStatus {
    /// Status label as used on the wire and in `?status=` filters.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Live { .. } => "live",
            Self::Upcoming { .. } => "upcoming",
            Self::Completed { .. } => "completed",
        }
    }

    /// The status-dependent display value.
    pub fn display_value(&self) -> &str {
        match self {
            Self::Live { time_left } => time_left,
            Self::Upcoming { starts_at } => starts_at,
            Self::Completed { result } => result,
        }
    }
}

/// Error loading tournament data.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    /// The data file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Data file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The data file is not a valid tournament list.
    #[error("Invalid tournament data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two entries share an identifier.
    #[error("Duplicate tournament id: {0}")]
    DuplicateId(u32),
}

/// Parse a JSON array of tournaments.
///
/// # Errors
///
/// Returns [`TournamentError::Parse`] for malformed JSON or unknown statuses,
/// and [`TournamentError::DuplicateId`] if two entries share an id.
pub fn parse_tournaments(json: &str) -> Result<Vec<Tournament>, TournamentError> {
    let tournaments: Vec<Tournament> = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    for tournament in &tournaments {
        if !seen.insert(tournament.id) {
            return Err(TournamentError::DuplicateId(tournament.id));
        }
    }

    Ok(tournaments)
}

/// Load tournaments from a JSON file.
///
/// # Errors
///
/// Returns [`TournamentError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_tournaments`].
pub fn load_tournaments(path: &Path) -> Result<Vec<Tournament>, TournamentError> {
    let content = std::fs::read_to_string(path).map_err(|source| TournamentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tournaments(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"[
        {"id": 1, "name": "Neon Clash", "players": 64, "prize": "$5,000",
         "status": "live", "timeLeft": "1h 20m"},
        {"id": 2, "name": "Pixel Cup", "players": 32, "prize": "$1,000",
         "status": "upcoming", "startsAt": "Sat 18:00"},
        {"id": 3, "name": "Retro Rumble", "players": 16, "prize": "$500",
         "status": "completed", "result": "Winner: Kaito"}
    ]"#;

    #[test]
    fn test_parse_all_statuses() {
        let tournaments = parse_tournaments(SAMPLE).unwrap();

        assert_eq!(tournaments.len(), 3);
        assert_eq!(
            tournaments[0],
            Tournament {
                id: 1,
                name: "Neon Clash".to_owned(),
                players: 64,
                prize: "$5,000".to_owned(),
                status: TournamentStatus::Live {
                    time_left: "1h 20m".to_owned()
                },
            }
        );
        assert_eq!(tournaments[1].status.label(), "upcoming");
        assert_eq!(tournaments[1].status.display_value(), "Sat 18:00");
        assert_eq!(tournaments[2].status.display_value(), "Winner: Kaito");
    }

    #[test]
    fn test_serialize_flattens_status() {
        let tournament = Tournament {
            id: 7,
            name: "Arena Open".to_owned(),
            players: 128,
            prize: "Trophy".to_owned(),
            status: TournamentStatus::Upcoming {
                starts_at: "Mon 20:00".to_owned(),
            },
        };

        let json = serde_json::to_value(&tournament).unwrap();

        assert_eq!(json["status"], "upcoming");
        assert_eq!(json["startsAt"], "Mon 20:00");
        assert!(json.get("timeLeft").is_none());
    }

    #[test]
    fn test_status_without_its_field_is_rejected() {
        let json = r#"[{"id": 1, "name": "x", "players": 2, "prize": "-", "status": "live"}]"#;
        assert!(matches!(
            parse_tournaments(json),
            Err(TournamentError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = r#"[{"id": 1, "name": "x", "players": 2, "prize": "-",
                        "status": "cancelled", "result": "n/a"}]"#;
        assert!(parse_tournaments(json).is_err());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let json = r#"[
            {"id": 4, "name": "a", "players": 2, "prize": "-", "status": "completed", "result": "r"},
            {"id": 4, "name": "b", "players": 2, "prize": "-", "status": "completed", "result": "r"}
        ]"#;
        let err = parse_tournaments(json).unwrap_err();
        assert!(matches!(err, TournamentError::DuplicateId(4)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_tournaments(Path::new("/nonexistent/tournaments.json")).unwrap_err();
        assert!(matches!(err, TournamentError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/tournaments.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tournaments.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let tournaments = load_tournaments(&path).unwrap();
        assert_eq!(tournaments.len(), 3);
    }
}
