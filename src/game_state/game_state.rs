//! Core board state representation.
//!
//! `GameState` is the central model for the engine: a 0x88 piece matrix plus
//! side to move, castling rights, en-passant target, move counters, and
//! cached king squares. Search and perft never share a mutable instance
//! across branches; each branch works on its own `clone()`, which is what
//! stands in for undo.

use crate::game_state::attack_tables::{attack_kind, step_delta, AttackKind};
use crate::game_state::chess_types::*;
use crate::moves::bit_move::{
    move_captured_piece_code, move_from, move_kind_code, move_to, PackedMove,
};
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

pub const STARTING_POSITION_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Castling geometry on the 0x88 board.
pub const WHITE_KING_HOME: Square = 0x04;
pub const BLACK_KING_HOME: Square = 0x74;
pub const WHITE_ROOK_SHORT_HOME: Square = 0x07;
pub const WHITE_ROOK_LONG_HOME: Square = 0x00;
pub const BLACK_ROOK_SHORT_HOME: Square = 0x77;
pub const BLACK_ROOK_LONG_HOME: Square = 0x70;

/// The position: piece placement and all per-ply bookkeeping.
#[derive(Debug, Clone)]
pub struct GameState {
    /// 128-slot 0x88 matrix; the 64 padding slots stay `Empty`.
    pub board: [Piece; 128],
    pub side_to_move: Team,
    pub full_move_count: u16,
    /// Ply counter since the start of the game.
    pub half_move_count: u16,
    /// Fifty-move-rule clock; tracked but not enforced by this core.
    pub half_move_clock: u16,
    /// Square a pawn may capture onto by en passant; valid for one ply only.
    pub en_passant_square: Option<Square>,
    pub white_castle_short: bool,
    pub white_castle_long: bool,
    pub black_castle_short: bool,
    pub black_castle_long: bool,
    /// Cached king squares; saves a board scan on every check test.
    pub white_king: Option<Square>,
    pub black_king: Option<Square>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            board: [Piece::Empty; 128],
            side_to_move: Team::White,
            full_move_count: 0,
            half_move_count: 0,
            half_move_clock: 0,
            en_passant_square: None,
            white_castle_short: false,
            white_castle_long: false,
            black_castle_short: false,
            black_castle_long: false,
            white_king: None,
            black_king: None,
        }
    }
}

impl GameState {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn new_game() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, crate::errors::ChessError> {
        parse_fen(fen)
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Piece {
        self.board[square as usize]
    }

    #[inline]
    pub fn king_square(&self, team: Team) -> Option<Square> {
        match team {
            Team::White => self.white_king,
            Team::Black => self.black_king,
        }
    }

    /// True when the side to move's king is attacked.
    pub fn in_check(&self) -> bool {
        let Some(king_sq) = self.king_square(self.side_to_move) else {
            return false;
        };
        self.is_attacked(king_sq, self.side_to_move.opposite())
    }

    /// Flips the side to move without touching the board. Used by null-move
    /// pruning and the shell's turn toggle. Any en-passant right expires.
    pub fn make_null_move(&mut self) {
        self.side_to_move = self.side_to_move.opposite();
        self.en_passant_square = None;
    }

    /// Makes an already-validated move and toggles the side to move.
    ///
    /// No legality checking is performed; callers must only pass moves
    /// produced by the move generator (or re-validated through it).
    pub fn make_move(&mut self, packed: PackedMove) {
        let from = move_from(packed);
        let to = move_to(packed);
        let kind = MoveKind::from_code(move_kind_code(packed)).unwrap_or(MoveKind::Ordinary);
        let moving_piece = self.board[from as usize];
        let is_capture = move_captured_piece_code(packed) != 0 || kind == MoveKind::EnPassant;

        // Any en-passant right lives for exactly one ply.
        self.en_passant_square = None;

        self.board[to as usize] = moving_piece;
        self.board[from as usize] = Piece::Empty;

        match kind {
            MoveKind::Ordinary => {
                if matches!(moving_piece, Piece::WhitePawn | Piece::BlackPawn)
                    && from.abs_diff(to) == 32
                {
                    // The skipped square is the midpoint on a 0x88 board.
                    self.en_passant_square = Some((from + to) / 2);
                }
            }
            MoveKind::EnPassant => {
                // Only one of the two neighbours holds the captured pawn;
                // clearing both saves a branch.
                self.board[(to + 16) as usize] = Piece::Empty;
                self.board[(to - 16) as usize] = Piece::Empty;
            }
            MoveKind::WhiteShortCastle => {
                self.board[0x05] = self.board[WHITE_ROOK_SHORT_HOME as usize];
                self.board[WHITE_ROOK_SHORT_HOME as usize] = Piece::Empty;
            }
            MoveKind::WhiteLongCastle => {
                self.board[0x03] = self.board[WHITE_ROOK_LONG_HOME as usize];
                self.board[WHITE_ROOK_LONG_HOME as usize] = Piece::Empty;
            }
            MoveKind::BlackShortCastle => {
                self.board[0x75] = self.board[BLACK_ROOK_SHORT_HOME as usize];
                self.board[BLACK_ROOK_SHORT_HOME as usize] = Piece::Empty;
            }
            MoveKind::BlackLongCastle => {
                self.board[0x73] = self.board[BLACK_ROOK_LONG_HOME as usize];
                self.board[BLACK_ROOK_LONG_HOME as usize] = Piece::Empty;
            }
            MoveKind::PromotionKnight
            | MoveKind::PromotionBishop
            | MoveKind::PromotionRook
            | MoveKind::PromotionQueen => {
                let team = moving_piece.team().unwrap_or(self.side_to_move);
                if let Some(promoted) = kind.promotion_piece(team) {
                    self.board[to as usize] = promoted;
                }
            }
        }

        // Castling rights die with the king or rook that leaves home.
        match moving_piece {
            Piece::WhiteRook => {
                if from == WHITE_ROOK_LONG_HOME {
                    self.white_castle_long = false;
                }
                if from == WHITE_ROOK_SHORT_HOME {
                    self.white_castle_short = false;
                }
            }
            Piece::BlackRook => {
                if from == BLACK_ROOK_LONG_HOME {
                    self.black_castle_long = false;
                }
                if from == BLACK_ROOK_SHORT_HOME {
                    self.black_castle_short = false;
                }
            }
            Piece::WhiteKing => {
                self.white_castle_short = false;
                self.white_castle_long = false;
                self.white_king = Some(to);
            }
            Piece::BlackKing => {
                self.black_castle_short = false;
                self.black_castle_long = false;
                self.black_king = Some(to);
            }
            _ => {}
        }

        // Any arrival on a rook home square also kills the right, which
        // covers captures of the rook without inspecting the target piece.
        match to {
            WHITE_ROOK_SHORT_HOME => self.white_castle_short = false,
            WHITE_ROOK_LONG_HOME => self.white_castle_long = false,
            BLACK_ROOK_LONG_HOME => self.black_castle_long = false,
            BLACK_ROOK_SHORT_HOME => self.black_castle_short = false,
            _ => {}
        }

        if matches!(moving_piece, Piece::WhitePawn | Piece::BlackPawn) || is_capture {
            self.half_move_clock = 0;
        } else {
            self.half_move_clock += 1;
        }
        if self.side_to_move == Team::Black {
            self.full_move_count += 1;
        }
        self.side_to_move = self.side_to_move.opposite();
        self.half_move_count += 1;
    }

    /// Whether `attacked` can be attacked by any piece of `by`.
    ///
    /// Pawns are probed directly on their two capture offsets; every other
    /// piece goes through the attack-capability table, with a delta walk to
    /// confirm line of sight for sliders. Linear in board occupancy.
    pub fn is_attacked(&self, attacked: Square, by: Team) -> bool {
        match by {
            Team::White => {
                if let Some(sq) = offset_square(attacked, -17) {
                    if self.board[sq as usize] == Piece::WhitePawn {
                        return true;
                    }
                }
                if let Some(sq) = offset_square(attacked, -15) {
                    if self.board[sq as usize] == Piece::WhitePawn {
                        return true;
                    }
                }
            }
            Team::Black => {
                if let Some(sq) = offset_square(attacked, 17) {
                    if self.board[sq as usize] == Piece::BlackPawn {
                        return true;
                    }
                }
                if let Some(sq) = offset_square(attacked, 15) {
                    if self.board[sq as usize] == Piece::BlackPawn {
                        return true;
                    }
                }
            }
        }

        for from in (0u8..128).filter(|sq| on_board(*sq)) {
            let piece = self.board[from as usize];
            if piece.is_empty() || piece.team() != Some(by) {
                continue;
            }
            let capability = attack_kind(from, attacked);
            let reaches = match piece.kind() {
                Some(PieceKind::Knight) => capability == AttackKind::Knight,
                Some(PieceKind::Bishop) => {
                    matches!(
                        capability,
                        AttackKind::KingQueenBishopWhitePawn
                            | AttackKind::KingQueenBishopBlackPawn
                            | AttackKind::QueenBishop
                    ) && self.line_is_clear(from, attacked)
                }
                Some(PieceKind::Rook) => {
                    matches!(
                        capability,
                        AttackKind::QueenRook | AttackKind::KingQueenRook
                    ) && self.line_is_clear(from, attacked)
                }
                Some(PieceKind::Queen) => {
                    capability != AttackKind::None
                        && capability != AttackKind::Knight
                        && self.line_is_clear(from, attacked)
                }
                Some(PieceKind::King) => matches!(
                    capability,
                    AttackKind::KingQueenBishopWhitePawn
                        | AttackKind::KingQueenBishopBlackPawn
                        | AttackKind::KingQueenRook
                ),
                // Pawns were handled by the direct probes above.
                Some(PieceKind::Pawn) | None => false,
            };
            if reaches {
                return true;
            }
        }
        false
    }

    /// Walks the slider delta from `from` toward `to`, confirming no piece
    /// blocks the way. Must only be called for squares the attack table says
    /// share a line; otherwise the walk has no terminator.
    fn line_is_clear(&self, from: Square, to: Square) -> bool {
        let delta = step_delta(from, to) as i16;
        let mut index = from as i16;
        loop {
            index += delta;
            if index == to as i16 {
                return true;
            }
            if self.board[index as usize] != Piece::Empty {
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::legal_moves::{check_move, legal_moves};

    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";

    #[test]
    fn e2e4_produces_the_known_position_and_the_held_copy_survives() {
        let mut game = GameState::new_game();
        let held_copy = game.clone();

        let mv = check_move(&game, 0x14, 0x34).expect("e2e4 should be legal");
        game.make_move(mv);

        assert_eq!(game.get_fen(), AFTER_E4);
        assert_eq!(held_copy.get_fen(), STARTING_POSITION_FEN);

        // Re-deriving the prior position from the held copy must agree.
        let rederived = GameState::from_fen(&held_copy.get_fen()).expect("FEN should parse");
        assert_eq!(rederived.get_fen(), STARTING_POSITION_FEN);
    }

    #[test]
    fn en_passant_capture_removes_the_skipped_pawn() {
        let mut game =
            GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        let mv = check_move(&game, 0x44, 0x53).expect("e5xd6 en passant should be legal");
        game.make_move(mv);

        assert_eq!(game.piece_at(0x53), Piece::WhitePawn);
        assert_eq!(game.piece_at(0x43), Piece::Empty, "captured pawn removed");
        assert_eq!(game.en_passant_square, None);
    }

    #[test]
    fn castling_relocates_the_rook_and_burns_the_rights() {
        let mut game = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .expect("FEN should parse");
        let mv = check_move(&game, 0x04, 0x06).expect("white short castle should be legal");
        game.make_move(mv);

        assert_eq!(game.piece_at(0x06), Piece::WhiteKing);
        assert_eq!(game.piece_at(0x05), Piece::WhiteRook);
        assert_eq!(game.piece_at(0x07), Piece::Empty);
        assert!(!game.white_castle_short);
        assert!(!game.white_castle_long);
        assert!(game.black_castle_short && game.black_castle_long);
        assert_eq!(game.white_king, Some(0x06));
    }

    #[test]
    fn capturing_a_rook_on_its_home_square_kills_that_right() {
        let mut game = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .expect("FEN should parse");
        let mv = check_move(&game, 0x00, 0x70).expect("Ra1xa8 should be legal");
        game.make_move(mv);

        assert!(!game.black_castle_long);
        assert!(game.black_castle_short);
        assert!(!game.white_castle_long, "the rook left a1 as well");
    }

    #[test]
    fn null_move_flips_only_the_side_to_move() {
        let mut game = GameState::new_game();
        let board_before = game.board;
        game.make_null_move();
        assert_eq!(game.side_to_move, Team::Black);
        assert_eq!(game.board, board_before);
        game.make_null_move();
        assert_eq!(game.side_to_move, Team::White);
    }

    #[test]
    fn attack_queries_see_through_sliders_but_not_blockers() {
        let game =
            GameState::from_fen("4k3/8/8/8/8/8/4R3/4K3 w - - 0 1").expect("FEN should parse");
        // The rook on e2 attacks straight up to the black king on e8.
        assert!(game.is_attacked(0x74, Team::White));

        let blocked = GameState::from_fen("4k3/8/8/4n3/8/8/4R3/4K3 w - - 0 1")
            .expect("FEN should parse");
        assert!(!blocked.is_attacked(0x74, Team::White));
        // The knight blocks the file but attacks d3/f3 itself.
        assert!(blocked.is_attacked(0x23, Team::Black));
    }

    #[test]
    fn half_move_clock_resets_on_pawn_moves_and_captures() {
        let mut game = GameState::new_game();
        let knight = check_move(&game, 0x06, 0x25).expect("Ng1f3 should be legal");
        game.make_move(knight);
        assert_eq!(game.half_move_clock, 1);

        let pawn = check_move(&game, 0x64, 0x44).expect("e7e5 should be legal");
        game.make_move(pawn);
        assert_eq!(game.half_move_clock, 0);
    }

    #[test]
    fn start_position_is_not_in_check_and_has_twenty_moves() {
        let game = GameState::new_game();
        assert!(!game.in_check());
        assert_eq!(legal_moves(&game).len(), 20);
    }
}
