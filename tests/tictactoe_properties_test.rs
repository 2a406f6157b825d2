//! Property tests for the rules and the session state machine.

use proptest::prelude::*;

use durable_tictactoe::{Board, GameSession, Players, SessionId, Tile, rules::check_winner};

fn tile() -> impl Strategy<Value = Tile> {
    prop_oneof![Just(Tile::Blank), Just(Tile::X), Just(Tile::O)]
}

fn any_board() -> impl Strategy<Value = Board> {
    prop::array::uniform3(prop::array::uniform3(tile())).prop_map(Board::from_rows)
}

proptest! {
    #[test]
    fn winner_follows_relabeling(board in any_board()) {
        prop_assert_eq!(check_winner(&board.swapped()), check_winner(&board).swapped());
    }

    #[test]
    fn legal_moves_fill_one_cell_and_flip_turn(cells in prop::collection::vec((0usize..3, 0usize..3), 0..20)) {
        let mut session = GameSession::new(SessionId::from(1), Players::Two);
        for (row, col) in cells {
            let before = session.clone();
            match session.apply_move(row, col) {
                Ok(()) => {
                    prop_assert_eq!(
                        session.board().count(Tile::Blank) + 1,
                        before.board().count(Tile::Blank)
                    );
                    prop_assert_eq!(session.turn(), before.turn().opponent());
                    let x = session.board().count(Tile::X);
                    let o = session.board().count(Tile::O);
                    prop_assert!(x == o || x == o + 1);
                }
                Err(_) => {
                    prop_assert_eq!(&session, &before);
                }
            }
        }
    }

    #[test]
    fn won_sessions_stay_won(cells in prop::collection::vec((0usize..3, 0usize..3), 0..30)) {
        let mut session = GameSession::new(SessionId::from(1), Players::Two);
        let mut winner = Tile::Blank;
        for (row, col) in cells {
            let _ = session.apply_move(row, col);
            if winner != Tile::Blank {
                prop_assert_eq!(session.winner(), winner);
            }
            winner = session.winner();
        }
    }
}
