//! 指し手生成器
//!
//! 疑似合法手（自玉を取られる手を含み得る）を生成する。例外はアンパッサンで、
//! 2つのポーンが同じ段から消えることで生じる横方向のピンを生成時に検査する。
//! 王手がかかっているときは移動先を王手駒と合駒升に絞り、両王手なら玉の手だけを生成する。

use crate::bitboard::{
    Bitboard, between_bb, king_attacks, pawn_attacks, pawn_double_push, pawn_push,
    relative_rank_bb,
};
use crate::position::{Position, castle_king_destination};
use crate::types::{Move, MoveFlags, PieceType, Square};

use super::movelist::MoveList;

/// 生成した指し手の受け取り先
pub trait MoveSink {
    fn push_move(&mut self, mv: Move);
}

/// 生成する指し手の種類
///
/// `Noisy` は駒を取る手とすべての成り（取らない成りを含む）、`Quiet` はそれ以外。
/// 2つを合わせると `All` と一致する。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenType {
    Noisy,
    Quiet,
    All,
}

impl GenType {
    #[inline]
    const fn noisy(self) -> bool {
        !matches!(self, GenType::Quiet)
    }

    #[inline]
    const fn quiet(self) -> bool {
        !matches!(self, GenType::Noisy)
    }
}

/// 昇格先4種をまとめて追加
#[inline]
fn push_promotions<S: MoveSink>(sink: &mut S, from: Square, to: Square, flags: MoveFlags) {
    for promo in PieceType::PROMOTIONS {
        sink.push_move(Move::new_promotion(from, to, promo, flags));
    }
}

/// 移動先 `to` に応じた取りフラグ
#[inline]
fn capture_flag(theirs: Bitboard, to: Square) -> MoveFlags {
    if theirs.contains(to) {
        MoveFlags::CAPTURE
    } else {
        MoveFlags::NONE
    }
}

fn generate_pawn_moves<S: MoveSink>(
    pos: &Position,
    gen_type: GenType,
    evasion: Bitboard,
    checkers: Bitboard,
    sink: &mut S,
) {
    let us = pos.side_to_move();
    let them = !us;
    let up = us.forward();
    let pawns = pos.pieces(us, PieceType::Pawn);
    let theirs = pos.pieces_by_color(them);
    let empty = !pos.occupied();
    let last_rank = relative_rank_bb(us, 7);

    let single = pawn_push(us, pawns) & empty & evasion;

    if gen_type.noisy() {
        for to in single & last_rank {
            push_promotions(sink, to.offset(-up), to, MoveFlags::NONE);
        }
        let targets = theirs & evasion;
        for from in pawns {
            for to in pawn_attacks(us, from) & targets {
                if last_rank.contains(to) {
                    push_promotions(sink, from, to, MoveFlags::CAPTURE);
                } else {
                    sink.push_move(Move::new(from, to, PieceType::Pawn, MoveFlags::CAPTURE));
                }
            }
        }
        if let Some(ep) = pos.ep_square() {
            let captured = ep.offset(-up);
            // 王手中は、取ったポーンが王手駒であるか移動先が合駒になる場合だけ
            if checkers.is_empty() || evasion.contains(ep) || checkers.contains(captured) {
                for from in pawn_attacks(them, ep) & pawns {
                    if pos.move_keeps_king_safe(from, ep, Some(captured)) {
                        sink.push_move(Move::new(
                            from,
                            ep,
                            PieceType::Pawn,
                            MoveFlags::CAPTURE | MoveFlags::EN_PASSANT,
                        ));
                    }
                }
            }
        }
    }

    if gen_type.quiet() {
        for to in single & !last_rank {
            sink.push_move(Move::new(to.offset(-up), to, PieceType::Pawn, MoveFlags::NONE));
        }
        for to in pawn_double_push(us, pawns, empty) & evasion {
            sink.push_move(Move::new(
                to.offset(-2 * up),
                to,
                PieceType::Pawn,
                MoveFlags::DOUBLE_PUSH,
            ));
        }
    }
}

/// 疑似合法手を生成して `sink` に追加する
pub fn generate<S: MoveSink>(pos: &Position, gen_type: GenType, sink: &mut S) {
    let us = pos.side_to_move();
    let theirs = pos.pieces_by_color(!us);
    let occupied = pos.occupied();
    let ksq = pos.king_square(us);
    let checkers = pos.checkers();

    let mut dest = Bitboard::EMPTY;
    if gen_type.noisy() {
        dest |= theirs;
    }
    if gen_type.quiet() {
        dest |= !occupied;
    }

    for to in king_attacks(ksq) & dest {
        sink.push_move(Move::new(ksq, to, PieceType::King, capture_flag(theirs, to)));
    }
    if checkers.more_than_one() {
        return;
    }

    let evasion = if checkers.is_empty() {
        Bitboard::ALL
    } else {
        between_bb(ksq, checkers.lsb()) | checkers
    };

    generate_pawn_moves(pos, gen_type, evasion, checkers, sink);

    let targets = dest & evasion;
    for pt in [PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen] {
        for from in pos.pieces(us, pt) {
            for to in Position::attacks_from(pt, us, from, occupied) & targets {
                sink.push_move(Move::new(from, to, pt, capture_flag(theirs, to)));
            }
        }
    }

    if gen_type.quiet() && checkers.is_empty() {
        for king_side in [true, false] {
            if pos.can_castle(king_side) {
                sink.push_move(Move::new(
                    ksq,
                    castle_king_destination(us, king_side),
                    PieceType::King,
                    MoveFlags::CASTLE,
                ));
            }
        }
    }
}

/// 合法手だけを `list` に生成する
pub fn generate_legal(pos: &Position, list: &mut MoveList) {
    list.clear();
    generate(pos, GenType::All, list);
    list.retain(|mv| pos.is_legal(mv));
}

/// 合法手のリスト
pub fn legal_moves(pos: &Position) -> MoveList {
    let mut list = MoveList::new();
    generate_legal(pos, &mut list);
    list
}

/// 合法手の数
pub fn count_legal_moves(pos: &Position) -> usize {
    legal_moves(pos).len()
}

impl Position {
    /// 疑似合法手が自玉を取られる手でないか
    ///
    /// `generate` が返した手（または `pseudo_legal` を通った手）を前提とする。
    /// キャスリングの通過升は生成時に検査済み。
    pub fn is_legal(&self, mv: Move) -> bool {
        if mv.is_castle() {
            return true;
        }
        let captured = if mv.is_en_passant() {
            Some(mv.to().offset(-self.side_to_move().forward()))
        } else {
            None
        };
        self.move_keeps_king_safe(mv.from(), mv.to(), captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn gen_list(p: &Position, gen_type: GenType) -> MoveList {
        let mut list = MoveList::new();
        generate(p, gen_type, &mut list);
        list
    }

    #[test]
    fn test_startpos_has_twenty_moves() {
        let p = Position::startpos();
        assert_eq!(count_legal_moves(&p), 20);
        assert!(gen_list(&p, GenType::Noisy).is_empty());
    }

    #[test]
    fn test_noisy_and_quiet_partition_all() {
        let p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let all = gen_list(&p, GenType::All);
        let noisy = gen_list(&p, GenType::Noisy);
        let quiet = gen_list(&p, GenType::Quiet);
        assert_eq!(noisy.len() + quiet.len(), all.len());
        for mv in &noisy {
            assert!(mv.is_noisy(), "{mv}");
            assert!(all.contains(*mv));
        }
        for mv in &quiet {
            assert!(mv.is_quiet(), "{mv}");
            assert!(all.contains(*mv));
        }
        assert_eq!(count_legal_moves(&p), 48);
    }

    #[test]
    fn test_castling_both_sides() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let list = legal_moves(&p);
        assert_eq!(list.len(), 26);
        assert_eq!(list.iter().filter(|m| m.is_castle()).count(), 2);
    }

    #[test]
    fn test_castling_through_attacked_square_is_not_generated() {
        // f1 を b5 のビショップが狙っている
        let p = pos("r3k2r/8/8/1b6/8/8/8/R3K2R w KQkq - 0 1");
        let castles: Vec<String> =
            legal_moves(&p).iter().filter(|m| m.is_castle()).map(|m| m.to_string()).collect();
        assert_eq!(castles, vec!["e1c1".to_string()]);
    }

    #[test]
    fn test_promotions_emit_four_kinds() {
        let p = pos("3r3k/2P5/8/8/8/8/8/K7 w - - 0 1");
        let noisy = gen_list(&p, GenType::Noisy);
        // c8 への前進成り4種と d8 への取り成り4種
        assert_eq!(noisy.iter().filter(|m| m.is_promotion()).count(), 8);
        assert!(gen_list(&p, GenType::Quiet).iter().all(|m| !m.is_promotion()));
    }

    #[test]
    fn test_double_check_only_king_moves() {
        // e1 の玉に e8 のルークと b4 のビショップから両王手
        let p = pos("4r2k/8/8/8/1b6/8/8/4K1N1 w - - 0 1");
        assert!(p.checkers().more_than_one());
        let all = gen_list(&p, GenType::All);
        assert!(all.iter().all(|m| m.piece_type() == PieceType::King));
    }

    #[test]
    fn test_single_check_targets_block_or_capture() {
        let p = pos("4r2k/8/8/8/8/8/3N4/4K3 w - - 0 1");
        for mv in &gen_list(&p, GenType::All) {
            if mv.piece_type() != PieceType::King {
                assert!(mv.to().file() == 4, "{mv} neither blocks nor captures");
            }
        }
    }

    #[test]
    fn test_en_passant_horizontal_pin_is_filtered() {
        // b5xc6 e.p. は5段目の a5 玉を h5 のルークにさらす
        let p = pos("8/8/8/KPp4r/8/8/8/7k w - c6 0 2");
        assert_eq!(p.ep_square(), Some("c6".parse().unwrap()));
        assert!(gen_list(&p, GenType::Noisy).iter().all(|m| !m.is_en_passant()));
    }

    #[test]
    fn test_en_passant_generated() {
        let p = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let list = legal_moves(&p);
        let ep: Vec<String> =
            list.iter().filter(|m| m.is_en_passant()).map(|m| m.to_string()).collect();
        assert_eq!(ep, vec!["e5d6".to_string()]);
    }

    #[test]
    fn test_generate_legal_agrees_with_make_unmake() {
        let mut p = pos("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
        let mut pseudo = MoveList::new();
        generate(&p, GenType::All, &mut pseudo);
        let legal = legal_moves(&p);
        for &mv in pseudo.iter() {
            let undo = p.make_move(mv);
            let ok = !p.left_king_in_check();
            p.unmake_move(mv, &undo);
            assert_eq!(ok, legal.contains(mv), "{mv}");
        }
        assert_eq!(legal.len(), 6);
    }
}
