//! CSV codec.
//!
//! One header row followed by one player per row:
//! `id,name,country,height,weight,points,hand,birth_date,created_at,updated_at,is_deleted`.
//! Cells are trimmed on read.

use super::{ensure_exists, ensure_parent, CodecResult, PlayerCodec};
use courtside_core::Player;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

impl PlayerCodec for CsvCodec {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn decode(&self, path: &Path) -> CodecResult<Vec<Player>> {
        ensure_exists(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let players = reader
            .deserialize::<Player>()
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(path = %path.display(), count = players.len(), "Decoded CSV");
        Ok(players)
    }

    fn encode(&self, path: &Path, players: &[Player]) -> CodecResult<usize> {
        ensure_parent(path)?;
        let mut writer = csv::Writer::from_path(path)?;
        for player in players {
            writer.serialize(player)?;
        }
        writer.flush()?;
        Ok(players.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use courtside_core::Hand;
    use tempfile::TempDir;

    #[test]
    fn test_decode_hand_written_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("players.csv");
        std::fs::write(
            &path,
            "id,name,country,height,weight,points,hand,birth_date,created_at,updated_at,is_deleted\n\
             1, Roger Federer ,Switzerland,185,85,0,RIGHT,1981-08-08,2024-01-01T00:00:00Z,2024-01-01T00:00:00Z,false\n\
             2,Andy Murray,UK,191,84,100,RIGHT,1987-05-15,2024-01-01T00:00:00Z,2024-01-02T00:00:00Z,true\n",
        )
        .expect("write");

        let players = CsvCodec.decode(&path).expect("decode");
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Roger Federer");
        assert_eq!(players[0].hand, Hand::Right);
        assert!(players[1].is_deleted);
    }

    #[test]
    fn test_encode_writes_header_and_rows() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("out.csv");
        let player = Player::new(
            "Coco Gauff",
            "USA",
            175,
            60,
            6_500,
            Hand::Right,
            chrono::NaiveDate::from_ymd_opt(2004, 3, 13).expect("valid date"),
        )
        .with_id(5);

        assert_eq!(CsvCodec.encode(&path, std::slice::from_ref(&player)).expect("encode"), 1);

        let text = std::fs::read_to_string(&path).expect("read");
        let header = text.lines().next().expect("header");
        assert_eq!(
            header,
            "id,name,country,height,weight,points,hand,birth_date,created_at,updated_at,is_deleted"
        );
        assert_eq!(CsvCodec.decode(&path).expect("decode"), vec![player]);
    }

    #[test]
    fn test_missing_file() {
        let result = CsvCodec.decode(Path::new("/no/such/players.csv"));
        assert!(matches!(result, Err(CodecError::FileNotFound(_))));
    }

    #[test]
    fn test_malformed_row_is_csv_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "id,name,country,height,weight,points,hand,birth_date\n1,A,B,tall,80,0,RIGHT,2000-01-01\n",
        )
        .expect("write");
        assert!(matches!(CsvCodec.decode(&path), Err(CodecError::Csv(_))));
    }
}
