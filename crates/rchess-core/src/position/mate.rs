//! 詰み・ステイルメイト判定
//!
//! 指し手リストを作らずに「合法手が1つでもあるか」を調べる。
//!
//! 1. 玉の移動先の安全性を調べる
//! 2. 両王手なら玉以外では受からない
//! 3. 単王手なら王手駒を取る手と合駒だけを対象にする
//! 4. 各候補は、動かす駒（と取られる駒）を占有から外し移動先を加えて、
//!    玉への利きを引き直すことでピンを判定する（アンパッサンも同様）

use crate::bitboard::{
    Bitboard, aligned, between_bb, king_attacks, line_bb, pawn_attacks, pawn_double_push,
    pawn_push,
};
use crate::types::{PieceType, Square};

use super::Position;

impl Position {
    /// `from` から `to` へ動かした後に自玉が安全か
    ///
    /// `ep_capture` はアンパッサンで取られるポーンの升。
    pub(crate) fn move_keeps_king_safe(
        &self,
        from: Square,
        to: Square,
        ep_capture: Option<Square>,
    ) -> bool {
        let us = self.side_to_move();
        let king = self.king_square(us);
        // 王手されていなければ、玉と同一直線上にない駒や直線に沿って動く駒は
        // 新たに利きを通さない
        if from != king
            && ep_capture.is_none()
            && (line_bb(king, from).is_empty() || aligned(king, from, to))
            && !self.in_check()
        {
            return true;
        }
        let ksq = if from == king { to } else { king };
        let mut occupied = (self.occupied() ^ Bitboard::from_square(from)) | Bitboard::from_square(to);
        let mut removed = Bitboard::from_square(to);
        if let Some(cap) = ep_capture {
            let cap_bb = Bitboard::from_square(cap);
            occupied ^= cap_bb;
            removed |= cap_bb;
        }
        (self.attackers_to(ksq, occupied) & self.pieces_by_color(!us) & !removed).is_empty()
    }

    /// 合法手が1つ以上あるか
    pub fn has_legal_move(&self) -> bool {
        let us = self.side_to_move();
        let ours = self.pieces_by_color(us);
        let theirs = self.pieces_by_color(!us);
        let occupied = self.occupied();
        let ksq = self.king_square(us);
        let checkers = self.checkers();

        for to in king_attacks(ksq) & !ours {
            if self.move_keeps_king_safe(ksq, to, None) {
                return true;
            }
        }
        if checkers.more_than_one() {
            return false;
        }

        let target = if checkers.is_empty() {
            !ours
        } else {
            let checker = checkers.lsb();
            between_bb(ksq, checker) | checkers
        };

        let empty = !occupied;
        for from in ours & !self.pieces_by_type(PieceType::King) {
            let pt = self.piece_on(from).piece_type();
            let from_bb = Bitboard::from_square(from);
            let dests = match pt {
                PieceType::Pawn => {
                    (pawn_push(us, from_bb) & empty)
                        | pawn_double_push(us, from_bb, empty)
                        | (pawn_attacks(us, from) & theirs)
                }
                _ => Self::attacks_from(pt, us, from, occupied) & !ours,
            } & target;
            for to in dests {
                if self.move_keeps_king_safe(from, to, None) {
                    return true;
                }
            }

            if pt != PieceType::Pawn {
                continue;
            }
            if let Some(ep) = self.ep_square() {
                if pawn_attacks(us, from).contains(ep) {
                    let cap = ep.offset(-us.forward());
                    let resolves =
                        checkers.is_empty() || target.contains(ep) || checkers.contains(cap);
                    if resolves && self.move_keeps_king_safe(from, ep, Some(cap)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// 詰みか
    #[inline]
    pub fn is_checkmate(&self) -> bool {
        self.in_check() && !self.has_legal_move()
    }

    /// ステイルメイトか
    #[inline]
    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && !self.has_legal_move()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_rank_mate() {
        let pos = Position::from_fen("R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 1 1").unwrap();
        assert!(pos.in_check());
        assert!(pos.is_checkmate());
        assert!(!pos.is_stalemate());
    }

    #[test]
    fn test_block_saves_king() {
        // c5 のビショップが f8 に合駒できる
        let pos = Position::from_fen("R5k1/5ppp/8/2b5/8/8/5PPP/6K1 b - - 1 1").unwrap();
        assert!(pos.in_check());
        assert!(!pos.is_checkmate());
    }

    #[test]
    fn test_classic_stalemate() {
        let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!pos.in_check());
        assert!(pos.is_stalemate());
        assert!(!pos.is_checkmate());
    }

    #[test]
    fn test_pinned_knight_stalemate() {
        // b7 のナイトは h1 のビショップにピンされていて動けない
        let pinned = Position::from_fen("k7/1n6/1K6/8/8/8/7B/7B b - - 0 1").unwrap();
        assert!(pinned.is_stalemate());
        let free = Position::from_fen("k7/1n6/1K6/8/8/8/7B/6B1 b - - 0 1").unwrap();
        assert!(!free.is_stalemate());
    }

    #[test]
    fn test_en_passant_is_only_evasion() {
        // d7-d5 の王手を exd6 e.p. でしか受けられない
        let pos = Position::from_fen("5r2/8/2k5/1n1pP3/4K3/3PPP2/8/8 w - d6 0 2").unwrap();
        assert_eq!(pos.ep_square(), Some("d6".parse().unwrap()));
        assert!(pos.in_check());
        assert!(pos.has_legal_move());
        let no_ep = Position::from_fen("5r2/8/2k5/1n1pP3/4K3/3PPP2/8/8 w - - 0 2").unwrap();
        assert!(no_ep.is_checkmate());
    }

    #[test]
    fn test_pinned_piece_moves_only_along_the_pin() {
        let pos = Position::from_fen("4k3/4r3/8/8/8/8/4R3/1N2K3 w - - 0 1").unwrap();
        let along = pos.parse_move("e2e7").unwrap();
        assert!(pos.is_legal(along));
        assert!(pos.is_legal(pos.parse_move("e2e4").unwrap()));
        assert!(pos.parse_move("e2a2").is_err());
        assert!(pos.is_legal(pos.parse_move("b1c3").unwrap()));
        assert_eq!(crate::movegen::count_legal_moves(&pos), 5 + 3 + 4);
    }
}
