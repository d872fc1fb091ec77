//! Tests for the tic-tac-toe board engine.

use strictly_lobby::{
    Board, Cell, Evaluation, Mark, MoveError, Position, apply_move, check_move, evaluate, is_full,
    validate_move, winner,
};

#[derive(Default)]
struct Tally {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
}

/// Plays out every legal game from `board`, checking invariants at each node.
fn explore(board: &mut Board, to_move: Mark, tally: &mut Tally) {
    let x = board.count(Mark::X);
    let o = board.count(Mark::O);
    assert!(x == o || x == o + 1, "mark balance broken:\n{}", board);

    let evaluation = evaluate(board);
    if winner(board).is_some() {
        assert!(matches!(evaluation, Evaluation::Win(_)));
    }
    match evaluation {
        Evaluation::Win(Mark::X) => {
            tally.x_wins += 1;
            return;
        }
        Evaluation::Win(Mark::O) => {
            tally.o_wins += 1;
            return;
        }
        Evaluation::Draw => {
            assert!(is_full(board));
            tally.draws += 1;
            return;
        }
        Evaluation::Ongoing => assert!(!is_full(board)),
    }

    let empty: Vec<Position> = board
        .cells()
        .filter(|(_, cell)| *cell == Cell::Empty)
        .map(|(pos, _)| pos)
        .collect();
    for pos in empty {
        assert!(validate_move(board, pos));
        let filled = board.filled();
        apply_move(board, pos, to_move);
        assert_eq!(board.filled(), filled + 1);
        assert!(!validate_move(board, pos));
        explore(board, to_move.opponent(), tally);
        board.set(pos, Cell::Empty);
    }
}

#[test]
fn test_every_game_respects_invariants() {
    let mut tally = Tally::default();
    explore(&mut Board::new(), Mark::X, &mut tally);

    // Known totals for the complete tic-tac-toe game tree.
    assert_eq!(tally.x_wins, 131_184);
    assert_eq!(tally.o_wins, 77_904);
    assert_eq!(tally.draws, 46_080);
}

#[test]
fn test_new_board_renders_move_numbers() {
    let board = Board::new();
    assert_eq!(
        board.to_string(),
        "1 | 2 | 3\n---------\n4 | 5 | 6\n---------\n7 | 8 | 9"
    );
}

#[test]
fn test_marks_replace_numbers_in_rendering() {
    let mut board = Board::new();
    apply_move(&mut board, Position::new(0, 0), Mark::X);
    apply_move(&mut board, Position::new(1, 1), Mark::O);
    assert_eq!(
        board.to_string(),
        "X | 2 | 3\n---------\n4 | O | 6\n---------\n7 | 8 | 9"
    );
}

#[test]
fn test_move_numbers_round_trip() {
    for number in 1..=9 {
        let pos = Position::from_move_number(number).unwrap();
        assert!(pos.in_bounds());
        assert_eq!(pos.move_number(), number);
    }
    assert_eq!(Position::from_move_number(0), None);
    assert_eq!(Position::from_move_number(10), None);
}

#[test]
fn test_check_move_rejects_without_mutation() {
    let mut board = Board::new();
    apply_move(&mut board, Position::new(2, 2), Mark::X);
    let before = board.clone();

    assert_eq!(check_move(&board, "9"), Err(MoveError::Occupied(9)));
    assert_eq!(check_move(&board, "ten"), Err(MoveError::NotANumber("ten".into())));
    assert_eq!(check_move(&board, "42"), Err(MoveError::OutOfRange(42)));
    assert_eq!(board, before);
}
