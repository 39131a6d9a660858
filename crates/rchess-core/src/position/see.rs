//! SEE（静的交換評価）
//!
//! 移動先の1升だけを対象に、両者が最も安い駒から順に取り合う手順を模擬し、
//! 「得なら取る、損なら止める」を末尾から畳み込んで最終的な駒得を求める。

use crate::bitboard::{Bitboard, bishop_attacks, rook_attacks};
use crate::types::{Move, PieceType};

use super::Position;

/// 取り合いの最大長
const MAX_EXCHANGES: usize = 32;

impl Position {
    /// 指し手の静的交換評価値（手番側から見た駒得、センチポーン）
    pub fn see(&self, mv: Move) -> i32 {
        if mv.is_castle() || !mv.is_some() {
            return 0;
        }
        let us = self.side_to_move();
        let from = mv.from();
        let to = mv.to();

        let mut occupied = self.occupied() ^ Bitboard::from_square(from);
        let mut captured_value = if mv.is_en_passant() {
            occupied ^= Bitboard::from_square(to.offset(-us.forward()));
            PieceType::Pawn.value()
        } else {
            let target = self.piece_on(to);
            if target.is_some() {
                target.piece_type().value()
            } else {
                0
            }
        };
        let mut attacker_value = mv.piece_type().value();
        if let Some(promo) = mv.promotion() {
            captured_value += promo.value() - PieceType::Pawn.value();
            attacker_value = promo.value();
        }

        // values[k] = k 回目の取りで取られる駒の価値
        let mut values = [0i32; MAX_EXCHANGES];
        values[0] = captured_value;
        let mut n = 1;

        let diagonal = self.pieces_by_type(PieceType::Bishop) | self.pieces_by_type(PieceType::Queen);
        let orthogonal = self.pieces_by_type(PieceType::Rook) | self.pieces_by_type(PieceType::Queen);
        let mut attackers = self.attackers_to(to, occupied) & occupied;
        let mut side = !us;

        while n < MAX_EXCHANGES {
            let side_attackers = attackers & self.pieces_by_color(side);
            if side_attackers.is_empty() {
                break;
            }
            let Some((pt, sq)) = PieceType::ALL.iter().find_map(|&pt| {
                let bb = side_attackers & self.pieces_by_type(pt);
                bb.is_not_empty().then(|| (pt, bb.lsb()))
            }) else {
                break;
            };
            // 相手の利きが残っている升をキングでは取れない
            if pt == PieceType::King && (attackers & self.pieces_by_color(!side)).is_not_empty() {
                break;
            }

            values[n] = attacker_value;
            n += 1;
            attacker_value = pt.value();

            // 取った駒の背後の遠方駒だけを引き直す
            let bb = Bitboard::from_square(sq);
            occupied ^= bb;
            attackers ^= bb;
            if matches!(pt, PieceType::Pawn | PieceType::Bishop | PieceType::Queen) {
                attackers |= bishop_attacks(to, occupied) & diagonal;
            }
            if matches!(pt, PieceType::Rook | PieceType::Queen) {
                attackers |= rook_attacks(to, occupied) & orthogonal;
            }
            attackers &= occupied;
            side = !side;
        }

        let mut score = 0;
        for k in (1..n).rev() {
            score = (values[k] - score).max(0);
        }
        values[0] - score
    }

    /// SEE 値が `threshold` 以上か
    #[inline]
    pub fn see_ge(&self, mv: Move, threshold: i32) -> bool {
        self.see(mv) >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    fn mv(pos: &Position, from: &str, to: &str) -> Move {
        pos.encode_move(from.parse::<Square>().unwrap(), to.parse().unwrap(), None)
    }

    #[test]
    fn test_see_pawn_takes_defended_bishop_with_backup() {
        // d4xe5 で Bを取り、e8 のルークが取り返すと e1 のルークにさらに取られる
        let pos = Position::from_fen("4r1k1/8/8/4b3/3P4/8/8/4R1K1 w - - 0 1").unwrap();
        assert_eq!(pos.see(mv(&pos, "d4", "e5")), 330);
    }

    #[test]
    fn test_see_pawn_takes_defended_bishop() {
        let pos = Position::from_fen("4r1k1/8/8/4b3/3P4/8/8/6K1 w - - 0 1").unwrap();
        assert_eq!(pos.see(mv(&pos, "d4", "e5")), 330 - 100);
    }

    #[test]
    fn test_see_losing_queen_capture() {
        let pos = Position::from_fen("4k3/8/3p4/4p3/8/8/8/4QK2 w - - 0 1").unwrap();
        let qxe5 = mv(&pos, "e1", "e5");
        assert_eq!(pos.see(qxe5), 100 - 900);
        assert!(!pos.see_ge(qxe5, 0));
    }

    #[test]
    fn test_see_undefended_and_quiet() {
        let pos = Position::from_fen("4k3/8/8/4p3/8/8/8/4RK2 w - - 0 1").unwrap();
        assert_eq!(pos.see(mv(&pos, "e1", "e5")), 100);
        // 静かな手で取られる升に行く
        let pos = Position::from_fen("4k3/8/3p4/8/8/8/8/1N3K2 w - - 0 1").unwrap();
        assert_eq!(pos.see(mv(&pos, "b1", "c3")), 0);
        let pos = Position::from_fen("4k3/8/8/3p4/8/8/8/1N3K2 w - - 0 1").unwrap();
        assert_eq!(pos.see(mv(&pos, "b1", "c3")), 0);
        let pos = Position::from_fen("4k3/8/8/8/3p4/8/8/1N3K2 w - - 0 1").unwrap();
        assert_eq!(pos.see(mv(&pos, "b1", "c3")), -320);
    }

    #[test]
    fn test_see_xray_reveals_rear_rook() {
        // 重ねたルーク同士の取り合い。e7 が取り返した後で e8 の利きが通る
        let pos = Position::from_fen("4r1k1/4r3/8/4p3/8/8/4R3/4R1K1 w - - 0 1").unwrap();
        assert_eq!(pos.see(mv(&pos, "e2", "e5")), 100 - 500);
        // 後ろの黒ルークがいなければ白の得
        let pos = Position::from_fen("6k1/4r3/8/4p3/8/8/4R3/4R1K1 w - - 0 1").unwrap();
        assert_eq!(pos.see(mv(&pos, "e2", "e5")), 100);
    }
}
