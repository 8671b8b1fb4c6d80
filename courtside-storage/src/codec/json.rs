//! JSON codec: a pretty-printed array of players.

use super::{ensure_exists, ensure_parent, CodecResult, PlayerCodec};
use courtside_core::Player;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PlayerCodec for JsonCodec {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn decode(&self, path: &Path) -> CodecResult<Vec<Player>> {
        ensure_exists(path)?;
        let bytes = std::fs::read(path)?;
        let players: Vec<Player> = serde_json::from_slice(&bytes)?;
        tracing::debug!(path = %path.display(), count = players.len(), "Decoded JSON");
        Ok(players)
    }

    fn encode(&self, path: &Path, players: &[Player]) -> CodecResult<usize> {
        ensure_parent(path)?;
        let bytes = serde_json::to_vec_pretty(players)?;
        std::fs::write(path, bytes)?;
        Ok(players.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use courtside_core::Hand;
    use tempfile::TempDir;

    fn player(id: i64) -> Player {
        Player::new(
            format!("Player {id}"),
            "France",
            180,
            75,
            1_000,
            Hand::Left,
            chrono::NaiveDate::from_ymd_opt(1995, 1, 1).expect("valid date"),
        )
        .with_id(id)
    }

    #[test]
    fn test_encode_pretty_then_decode() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("players.json");
        let players = vec![player(1), player(2)];

        assert_eq!(JsonCodec.encode(&path, &players).expect("encode"), 2);
        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.starts_with("[\n"));
        assert_eq!(JsonCodec.decode(&path).expect("decode"), players);
    }

    #[test]
    fn test_empty_list() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("empty.json");
        assert_eq!(JsonCodec.encode(&path, &[]).expect("encode"), 0);
        assert!(JsonCodec.decode(&path).expect("decode").is_empty());
    }

    #[test]
    fn test_errors() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("missing.json");
        assert!(matches!(JsonCodec.decode(&missing), Err(CodecError::FileNotFound(_))));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").expect("write");
        assert!(matches!(JsonCodec.decode(&broken), Err(CodecError::Json(_))));
    }
}
