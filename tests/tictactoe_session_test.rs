//! End-to-end game sessions against a SQLite store.

use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::NamedTempFile;

use durable_tictactoe::{
    Board, Cell, GameStatus, Mark, MoveError, Players, SessionId, SessionManager,
    SessionRepository, StoreConfig, Tile, choose_move,
};

fn setup_manager() -> (NamedTempFile, SessionManager) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let config = StoreConfig::default()
        .with_database_url(db_path)
        .with_retry(1, 0);
    let repo = SessionRepository::bootstrap(&config).expect("Bootstrap failed");
    (db_file, SessionManager::new(repo))
}

/// Plays `moves` alternately from X on a new session and returns its id.
fn play(manager: &SessionManager, players: Players, moves: &[(usize, usize)]) -> SessionId {
    let id = manager.create_session(players).expect("Create failed").id();
    for &(row, col) in moves {
        manager.apply_move(id, row, col).expect("Move failed");
    }
    id
}

#[test]
fn test_vertical_win() {
    let (_db, manager) = setup_manager();
    let id = play(
        &manager,
        Players::Two,
        &[(0, 0), (1, 1), (1, 0), (2, 2), (2, 0)],
    );
    let session = manager.load_session(id).expect("Load failed");
    assert_eq!(session.winner(), Tile::X);
    assert_eq!(session.status(), GameStatus::Won(Mark::X));
}

#[test]
fn test_diagonal_win() {
    let (_db, manager) = setup_manager();
    let id = play(
        &manager,
        Players::Two,
        &[(0, 0), (0, 1), (1, 1), (1, 0), (2, 2)],
    );
    let session = manager.load_session(id).expect("Load failed");
    assert_eq!(session.winner(), Tile::X);
}

#[test]
fn test_o_wins_on_sixth_move() {
    let (_db, manager) = setup_manager();
    let moves = [(0, 0), (0, 2), (1, 1), (1, 2), (1, 0), (2, 2)];
    let id = play(&manager, Players::Two, &moves[..5]);
    assert_eq!(manager.load_session(id).expect("Load failed").winner(), Tile::Blank);

    let session = manager.apply_move(id, 2, 2).expect("Move failed");
    assert_eq!(session.winner(), Tile::O);
    assert_eq!(manager.load_session(id).expect("Load failed"), session);
}

#[test]
fn test_draw() {
    let (_db, manager) = setup_manager();
    let id = play(
        &manager,
        Players::Two,
        &[
            (0, 0),
            (1, 0),
            (2, 0),
            (2, 1),
            (0, 1),
            (0, 2),
            (2, 2),
            (1, 1),
            (1, 2),
        ],
    );
    let session = manager.load_session(id).expect("Load failed");
    assert_eq!(session.winner(), Tile::Blank);
    assert_eq!(session.board().count(Tile::Blank), 0);
    assert_eq!(session.status(), GameStatus::Drawn);

    let err = manager.apply_move(id, 1, 1).unwrap_err();
    assert_eq!(err.as_move(), Some(&MoveError::CellOccupied { row: 1, col: 1 }));
}

#[test]
fn test_won_session_rejects_every_blank_cell() {
    let (_db, manager) = setup_manager();
    let id = play(
        &manager,
        Players::Two,
        &[(0, 0), (1, 1), (1, 0), (2, 2), (2, 0)],
    );
    let before = manager.load_session(id).expect("Load failed");

    for cell in before.board().blank_cells() {
        let err = manager.apply_move(id, cell.row(), cell.col()).unwrap_err();
        assert_eq!(err.as_move(), Some(&MoveError::GameAlreadyWon(Mark::X)));
    }
    assert_eq!(manager.load_session(id).expect("Load failed"), before);
}

#[test]
fn test_occupied_cell_leaves_stored_state_unchanged() {
    let (_db, manager) = setup_manager();
    let id = play(&manager, Players::Two, &[(1, 1), (0, 0)]);
    let before = manager.load_session(id).expect("Load failed");

    let err = manager.apply_move(id, 0, 0).unwrap_err();
    assert_eq!(err.as_move(), Some(&MoveError::CellOccupied { row: 0, col: 0 }));
    assert_eq!(manager.load_session(id).expect("Load failed"), before);
}

#[test]
fn test_off_board_move_is_rejected() {
    let (_db, manager) = setup_manager();
    let id = play(&manager, Players::Two, &[]);
    let err = manager.apply_move(id, 0, 3).unwrap_err();
    assert_eq!(err.as_move(), Some(&MoveError::OutOfBounds { row: 0, col: 3 }));
}

#[test]
fn test_computer_completes_its_line() {
    let (_db, manager) = setup_manager();
    // O holds (1,0) and (1,1); X threatens (0,2), but O wins at (1,2).
    let id = play(
        &manager,
        Players::One,
        &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2)],
    );
    let session = manager.load_session(id).expect("Load failed");
    let cell = manager.choose_computer_move(&session).expect("Choice failed");
    assert_eq!(cell, Cell::new(1, 2).expect("cell"));

    let session = manager.apply_move(id, 1, 2).expect("Move failed");
    assert_eq!(session.status(), GameStatus::Won(Mark::O));
}

#[test]
fn test_single_player_turn_blocks_threat() {
    let (_db, manager) = setup_manager();
    let id = manager.create_session(Players::One).expect("Create failed").id();

    let session = manager.play_turn(id, 0, 0).expect("Turn failed");
    let reply = Cell::ALL
        .into_iter()
        .find(|&c| session.board().get(c) == Tile::O)
        .expect("computer replied");

    // Put X two in a row wherever the reply left room, then expect a block.
    let (threat, gap) = if reply.row() == 0 {
        ((1, 0), (2, 0))
    } else {
        ((0, 1), (0, 2))
    };
    let session = manager.play_turn(id, threat.0, threat.1).expect("Turn failed");
    assert_eq!(session.board().get(Cell::new(gap.0, gap.1).expect("cell")), Tile::O);
    assert_eq!(session.turn(), Mark::X);
}

#[test]
fn test_single_player_win_gets_no_reply() {
    let (_db, manager) = setup_manager();
    let id = play(&manager, Players::One, &[(0, 0), (2, 2), (0, 1), (2, 1)]);

    let session = manager.play_turn(id, 0, 2).expect("Turn failed");
    assert_eq!(session.status(), GameStatus::Won(Mark::X));
    assert_eq!(session.board().count(Tile::O), 2);
    assert_eq!(session.turn(), Mark::O);
}

#[test]
fn test_heuristic_on_full_board() {
    let (_db, manager) = setup_manager();
    let id = play(
        &manager,
        Players::Two,
        &[
            (0, 0),
            (1, 0),
            (2, 0),
            (2, 1),
            (0, 1),
            (0, 2),
            (2, 2),
            (1, 1),
            (1, 2),
        ],
    );
    let session = manager.load_session(id).expect("Load failed");
    assert_eq!(choose_move(&session), Err(MoveError::NoAvailableMoves));
}

#[test]
fn test_sessions_are_independent() {
    let (_db, manager) = setup_manager();
    let a = play(&manager, Players::Two, &[(0, 0)]);
    let b = play(&manager, Players::Two, &[(2, 2), (1, 1)]);
    assert_ne!(a, b);

    assert_eq!(manager.load_session(a).expect("Load failed").board().count(Tile::Blank), 8);
    assert_eq!(manager.load_session(b).expect("Load failed").board().count(Tile::Blank), 7);
    assert_eq!(
        manager.load_session(b).expect("Load failed").board(),
        &Board::from_rows([
            [Tile::Blank; 3],
            [Tile::Blank, Tile::O, Tile::Blank],
            [Tile::Blank, Tile::Blank, Tile::X],
        ])
    );
}

#[test]
fn test_concurrent_moves_on_one_session_serialize() {
    let (_db, manager) = setup_manager();
    let id = play(&manager, Players::Two, &[]);

    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                manager.apply_move(id, 1, 1)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.as_move(), Some(&MoveError::CellOccupied { row: 1, col: 1 }));
    }

    let session = manager.load_session(id).expect("Load failed");
    assert_eq!(session.board().count(Tile::X), 1);
    assert_eq!(session.turn(), Mark::O);
}

#[test]
fn test_concurrent_creates_get_distinct_ids() {
    let (_db, manager) = setup_manager();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || manager.create_session(Players::Two).map(|s| s.id()))
        })
        .collect();

    let mut ids: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked").expect("Create failed").get())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}
