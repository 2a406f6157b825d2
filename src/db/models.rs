//! Database models and the board codec.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::{DbError, schema};
use crate::games::tictactoe::{Board, GameSession, Players, SessionId, Tile};

/// Session row as stored.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::game_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionRecord {
    id: i32,
    board: String,
    winner: i16,
    turn: i16,
    players: i16,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Insertable row for a freshly created session.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::game_sessions)]
pub struct NewSessionRecord {
    id: i32,
    board: String,
    winner: i16,
    turn: i16,
    players: i16,
}

impl NewSessionRecord {
    /// Encodes a session for insertion.
    #[instrument(skip(session), fields(session_id = %session.id()))]
    pub fn from_session(session: &GameSession) -> Result<Self, DbError> {
        Ok(Self::new(
            session.id().get(),
            encode_board(session.board())?,
            tile_code(session.winner()),
            tile_code(session.turn().into()),
            i16::from(session.players().count()),
        ))
    }
}

/// Column updates written by a save.
#[derive(Debug, Clone, AsChangeset, new)]
#[diesel(table_name = schema::game_sessions)]
pub struct SessionChanges {
    board: String,
    winner: i16,
    turn: i16,
    players: i16,
    updated_at: NaiveDateTime,
}

impl SessionChanges {
    /// Encodes a session's mutable columns, stamping `updated_at` with `now`.
    #[instrument(skip(session), fields(session_id = %session.id()))]
    pub fn from_session(session: &GameSession, now: NaiveDateTime) -> Result<Self, DbError> {
        Ok(Self::new(
            encode_board(session.board())?,
            tile_code(session.winner()),
            tile_code(session.turn().into()),
            i16::from(session.players().count()),
            now,
        ))
    }
}

impl TryFrom<SessionRecord> for GameSession {
    type Error = DbError;

    #[instrument(skip(record), fields(session_id = record.id))]
    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let board = decode_board(&record.board)?;
        let turn = Tile::from_code(i64::from(record.turn))?;
        let winner = Tile::from_code(i64::from(record.winner))?;
        let players = Players::from_count(i64::from(record.players))?;
        Ok(GameSession::restore(
            SessionId::from(record.id),
            board,
            turn,
            winner,
            players,
        )?)
    }
}

fn tile_code(tile: Tile) -> i16 {
    i16::from(tile.code())
}

/// Stored board layout: `{"board": [[0,1,2], ...]}`, row-major.
#[derive(Debug, Serialize, Deserialize)]
struct StoredBoard<T> {
    board: [[T; 3]; 3],
}

/// Serializes a board to its stored JSON form.
#[instrument(level = "trace")]
pub fn encode_board(board: &Board) -> Result<String, DbError> {
    let stored = StoredBoard {
        board: board.rows().map(|row| row.map(Tile::code)),
    };
    Ok(serde_json::to_string(&stored)?)
}

/// Parses a stored board, rejecting any tile code outside `0..=2`.
#[instrument(level = "trace")]
pub fn decode_board(json: &str) -> Result<Board, DbError> {
    let stored: StoredBoard<i64> = serde_json::from_str(json)?;
    let mut rows = [[Tile::Blank; 3]; 3];
    for (r, row) in stored.board.iter().enumerate() {
        for (c, &code) in row.iter().enumerate() {
            rows[r][c] = Tile::from_code(code)?;
        }
    }
    Ok(Board::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let board = Board::from_rows([
            [Tile::X, Tile::Blank, Tile::O],
            [Tile::Blank; 3],
            [Tile::Blank, Tile::Blank, Tile::X],
        ]);
        assert_eq!(
            encode_board(&board).expect("encode"),
            r#"{"board":[[1,0,2],[0,0,0],[0,0,1]]}"#
        );
    }

    #[test]
    fn test_decode_reproduces_board() {
        let board = Board::from_rows([
            [Tile::O, Tile::X, Tile::Blank],
            [Tile::X, Tile::Blank, Tile::Blank],
            [Tile::Blank, Tile::Blank, Tile::O],
        ]);
        let json = encode_board(&board).expect("encode");
        assert_eq!(decode_board(&json).expect("decode"), board);
    }

    #[test]
    fn test_decode_rejects_unknown_tile() {
        let err = decode_board(r#"{"board":[[0,0,0],[0,7,0],[0,0,0]]}"#).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_decode_rejects_short_row() {
        let err = decode_board(r#"{"board":[[0,0],[0,0,0],[0,0,0]]}"#).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_decode_rejects_missing_key() {
        let err = decode_board(r#"{"cells":[]}"#).unwrap_err();
        assert!(err.is_malformed());
    }
}
