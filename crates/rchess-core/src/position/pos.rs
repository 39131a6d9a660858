//! 局面（Position）本体

use std::fmt;

use crate::bitboard::{
    Bitboard, between_bb, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};
use crate::types::{CastlingRights, Color, Move, MoveFlags, Piece, PieceType, Square};

use super::state::UndoInfo;
use super::zobrist::{zobrist_castling, zobrist_ep, zobrist_psq, zobrist_side};

/// ハッシュスタックの初期容量（探索中に再確保が起きない大きさ）
const KEY_STACK_CAPACITY: usize = 1024;

/// 占有マスクのうち全駒の集合を置くインデックス
const ALL_PIECES: usize = PieceType::NUM;

/// 局面
///
/// 駒種ごと・手番ごとのビットボードと升→駒の配列を常に整合させて保持する。
/// 変更は `make_move` / `unmake_move` / null move 系のみを通じて行う。
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: [Piece; Square::NUM],
    by_type: [Bitboard; PieceType::NUM + 1],
    by_color: [Bitboard; Color::NUM],
    side_to_move: Color,
    castling: CastlingRights,
    ep_square: Option<Square>,
    rule50: u16,
    plies_from_null: u16,
    game_ply: u32,
    keys: Vec<u64>,
}

impl Position {
    // =========================================================================
    // 構築
    // =========================================================================

    /// 駒のない局面（FEN 解析の作業用）
    pub(crate) fn empty() -> Self {
        Position {
            board: [Piece::NONE; Square::NUM],
            by_type: [Bitboard::EMPTY; PieceType::NUM + 1],
            by_color: [Bitboard::EMPTY; Color::NUM],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            ep_square: None,
            rule50: 0,
            plies_from_null: 0,
            game_ply: 0,
            keys: Vec::with_capacity(KEY_STACK_CAPACITY),
        }
    }

    /// 平手初期局面
    pub fn startpos() -> Self {
        match Self::from_fen(super::START_FEN) {
            Ok(pos) => pos,
            Err(e) => unreachable!("start position must parse: {e}"),
        }
    }

    /// 盤面以外の状態を設定し、ハッシュスタックを初期化する（FEN 解析の最終段）
    pub(crate) fn finish_setup(
        &mut self,
        side_to_move: Color,
        castling: CastlingRights,
        ep_square: Option<Square>,
        rule50: u16,
        game_ply: u32,
    ) {
        self.side_to_move = side_to_move;
        self.castling = castling;
        self.ep_square = ep_square;
        self.rule50 = rule50;
        self.plies_from_null = rule50;
        self.game_ply = game_ply;
        self.keys.clear();
        let key = self.compute_key();
        self.keys.push(key);
    }

    // =========================================================================
    // 参照
    // =========================================================================

    /// 手番
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// 升の駒
    #[inline]
    pub fn piece_on(&self, sq: Square) -> Piece {
        self.board[sq.index()]
    }

    /// 全駒
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.by_type[ALL_PIECES]
    }

    /// 手番側の全駒
    #[inline]
    pub fn pieces_by_color(&self, color: Color) -> Bitboard {
        self.by_color[color.index()]
    }

    /// 駒種の全駒（先後両方）
    #[inline]
    pub fn pieces_by_type(&self, pt: PieceType) -> Bitboard {
        self.by_type[pt.index()]
    }

    /// 手番・駒種の駒
    #[inline]
    pub fn pieces(&self, color: Color, pt: PieceType) -> Bitboard {
        self.by_type[pt.index()] & self.by_color[color.index()]
    }

    /// 斜めに動く遠方駒（ビショップ・クイーン）
    #[inline]
    pub fn diagonal_sliders(&self, color: Color) -> Bitboard {
        (self.by_type[PieceType::Bishop.index()] | self.by_type[PieceType::Queen.index()])
            & self.by_color[color.index()]
    }

    /// 縦横に動く遠方駒（ルーク・クイーン）
    #[inline]
    pub fn orthogonal_sliders(&self, color: Color) -> Bitboard {
        (self.by_type[PieceType::Rook.index()] | self.by_type[PieceType::Queen.index()])
            & self.by_color[color.index()]
    }

    /// キングの升
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(color, PieceType::King).lsb()
    }

    /// キャスリング権
    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    /// アンパッサン升
    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// 50手ルールカウンタ（半手）
    #[inline]
    pub fn rule50(&self) -> u16 {
        self.rule50
    }

    /// 開始局面からの手数（半手）
    #[inline]
    pub fn game_ply(&self) -> u32 {
        self.game_ply
    }

    /// FEN の手数（1 始まり）
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        1 + self.game_ply / 2
    }

    /// 現在のハッシュ
    #[inline]
    pub fn key(&self) -> u64 {
        match self.keys.last() {
            Some(&k) => k,
            None => 0,
        }
    }

    /// ハッシュスタックの深さ
    #[inline]
    pub fn key_stack_len(&self) -> usize {
        self.keys.len()
    }

    /// ポーン・キング以外の駒があるか（null move の安全判定用）
    #[inline]
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        (self.by_color[color.index()]
            & !(self.by_type[PieceType::Pawn.index()] | self.by_type[PieceType::King.index()]))
        .is_not_empty()
    }

    // =========================================================================
    // 利き
    // =========================================================================

    /// 升に利いている駒（先後両方）
    #[inline]
    pub fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        (pawn_attacks(Color::Black, sq) & self.pieces(Color::White, PieceType::Pawn))
            | (pawn_attacks(Color::White, sq) & self.pieces(Color::Black, PieceType::Pawn))
            | (knight_attacks(sq) & self.pieces_by_type(PieceType::Knight))
            | (king_attacks(sq) & self.pieces_by_type(PieceType::King))
            | (bishop_attacks(sq, occupied)
                & (self.pieces_by_type(PieceType::Bishop) | self.pieces_by_type(PieceType::Queen)))
            | (rook_attacks(sq, occupied)
                & (self.pieces_by_type(PieceType::Rook) | self.pieces_by_type(PieceType::Queen)))
    }

    /// `by` 側の駒が升に利いているか
    pub fn is_attacked_by(&self, sq: Square, by: Color, occupied: Bitboard) -> bool {
        let them = self.by_color[by.index()];
        (pawn_attacks(!by, sq) & self.pieces(by, PieceType::Pawn)).is_not_empty()
            || (knight_attacks(sq) & self.pieces(by, PieceType::Knight)).is_not_empty()
            || (king_attacks(sq) & self.pieces(by, PieceType::King)).is_not_empty()
            || (bishop_attacks(sq, occupied) & self.diagonal_sliders(by) & them).is_not_empty()
            || (rook_attacks(sq, occupied) & self.orthogonal_sliders(by) & them).is_not_empty()
    }

    /// 手番側のキングに王手している駒
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        let us = self.side_to_move;
        self.attackers_to(self.king_square(us), self.occupied()) & self.by_color[(!us).index()]
    }

    /// 手番側が王手されているか
    #[inline]
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        self.is_attacked_by(self.king_square(us), !us, self.occupied())
    }

    /// 直前に指した側のキングが取られる状態か（指した手が非合法だったか）
    #[inline]
    pub fn left_king_in_check(&self) -> bool {
        let mover = !self.side_to_move;
        self.is_attacked_by(self.king_square(mover), self.side_to_move, self.occupied())
    }

    /// 駒種 `pt` が `sq` から利いている升
    #[inline]
    pub fn attacks_from(pt: PieceType, color: Color, sq: Square, occupied: Bitboard) -> Bitboard {
        match pt {
            PieceType::Pawn => pawn_attacks(color, sq),
            PieceType::Knight => knight_attacks(sq),
            PieceType::Bishop => bishop_attacks(sq, occupied),
            PieceType::Rook => rook_attacks(sq, occupied),
            PieceType::Queen => bishop_attacks(sq, occupied) | rook_attacks(sq, occupied),
            PieceType::King => king_attacks(sq),
        }
    }

    // =========================================================================
    // 駒の配置（内部）
    // =========================================================================

    #[inline]
    pub(crate) fn put_piece(&mut self, pc: Piece, sq: Square) {
        debug_assert!(self.board[sq.index()].is_none(), "put_piece on occupied {sq}");
        let bb = Bitboard::from_square(sq);
        self.board[sq.index()] = pc;
        self.by_type[pc.piece_type().index()] |= bb;
        self.by_type[ALL_PIECES] |= bb;
        self.by_color[pc.color().index()] |= bb;
    }

    #[inline]
    fn remove_piece(&mut self, sq: Square) -> Piece {
        let pc = self.board[sq.index()];
        debug_assert!(pc.is_some(), "remove_piece on empty {sq}");
        let bb = Bitboard::from_square(sq);
        self.board[sq.index()] = Piece::NONE;
        self.by_type[pc.piece_type().index()] ^= bb;
        self.by_type[ALL_PIECES] ^= bb;
        self.by_color[pc.color().index()] ^= bb;
        pc
    }

    #[inline]
    fn move_piece(&mut self, from: Square, to: Square) {
        let pc = self.board[from.index()];
        debug_assert!(pc.is_some(), "move_piece from empty {from}");
        debug_assert!(self.board[to.index()].is_none(), "move_piece onto occupied {to}");
        let bb = Bitboard::from_square(from) | Bitboard::from_square(to);
        self.board[from.index()] = Piece::NONE;
        self.board[to.index()] = pc;
        self.by_type[pc.piece_type().index()] ^= bb;
        self.by_type[ALL_PIECES] ^= bb;
        self.by_color[pc.color().index()] ^= bb;
    }

    // =========================================================================
    // 指し手の実行・巻き戻し
    // =========================================================================

    /// 指し手を実行する（合法性は検査しない）
    ///
    /// 返した `UndoInfo` を `unmake_move` に渡すと完全に元に戻る。
    pub fn make_move(&mut self, mv: Move) -> UndoInfo {
        debug_assert!(mv.is_some(), "make_move({mv:?})");
        let us = self.side_to_move;
        let them = !us;
        let from = mv.from();
        let to = mv.to();
        let pc = Piece::new(us, mv.piece_type());
        debug_assert_eq!(self.board[from.index()], pc, "moved piece mismatch for {mv}");

        let mut undo = UndoInfo {
            captured: Piece::NONE,
            castling: self.castling,
            ep_square: self.ep_square,
            rule50: self.rule50,
            plies_from_null: self.plies_from_null,
            game_ply: self.game_ply,
        };
        let mut key = self.key() ^ zobrist_side();

        if let Some(ep) = self.ep_square.take() {
            key ^= zobrist_ep(ep.file());
        }

        if mv.is_en_passant() {
            let cap_sq = to.offset(-us.forward());
            undo.captured = self.remove_piece(cap_sq);
            key ^= zobrist_psq(undo.captured, cap_sq);
        } else if mv.is_capture() {
            undo.captured = self.remove_piece(to);
            key ^= zobrist_psq(undo.captured, to);
        }

        self.move_piece(from, to);
        key ^= zobrist_psq(pc, from) ^ zobrist_psq(pc, to);

        if let Some(promo) = mv.promotion() {
            let promoted = Piece::new(us, promo);
            self.remove_piece(to);
            self.put_piece(promoted, to);
            key ^= zobrist_psq(pc, to) ^ zobrist_psq(promoted, to);
        }

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(to);
            let rook = Piece::new(us, PieceType::Rook);
            self.move_piece(rook_from, rook_to);
            key ^= zobrist_psq(rook, rook_from) ^ zobrist_psq(rook, rook_to);
        }

        let mut castling = self.castling;
        castling.remove(CastlingRights::lost_by_square(from));
        castling.remove(CastlingRights::lost_by_square(to));
        if castling != self.castling {
            key ^= zobrist_castling(self.castling) ^ zobrist_castling(castling);
            self.castling = castling;
        }

        if mv.is_double_push() {
            let ep = from.offset(us.forward());
            if (pawn_attacks(us, ep) & self.pieces(them, PieceType::Pawn)).is_not_empty() {
                self.ep_square = Some(ep);
                key ^= zobrist_ep(ep.file());
            }
        }

        if mv.piece_type() == PieceType::Pawn || undo.captured.is_some() {
            self.rule50 = 0;
        } else {
            self.rule50 = self.rule50.saturating_add(1);
        }
        self.plies_from_null = self.plies_from_null.saturating_add(1);
        self.side_to_move = them;
        self.game_ply = self.game_ply.saturating_add(1);
        self.keys.push(key);
        undo
    }

    /// `make_move` の逆操作
    pub fn unmake_move(&mut self, mv: Move, undo: &UndoInfo) {
        self.side_to_move = !self.side_to_move;
        let us = self.side_to_move;
        let from = mv.from();
        let to = mv.to();

        if mv.promotion().is_some() {
            self.remove_piece(to);
            self.put_piece(Piece::new(us, PieceType::Pawn), to);
        }
        self.move_piece(to, from);

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(to);
            self.move_piece(rook_to, rook_from);
        }

        if mv.is_en_passant() {
            self.put_piece(undo.captured, to.offset(-us.forward()));
        } else if undo.captured.is_some() {
            self.put_piece(undo.captured, to);
        }

        self.castling = undo.castling;
        self.ep_square = undo.ep_square;
        self.rule50 = undo.rule50;
        self.plies_from_null = undo.plies_from_null;
        self.game_ply = undo.game_ply;
        self.keys.pop();
    }

    /// パス（手番だけを渡す）
    pub fn make_null_move(&mut self) -> UndoInfo {
        let undo = UndoInfo {
            captured: Piece::NONE,
            castling: self.castling,
            ep_square: self.ep_square,
            rule50: self.rule50,
            plies_from_null: self.plies_from_null,
            game_ply: self.game_ply,
        };
        let mut key = self.key() ^ zobrist_side();
        if let Some(ep) = self.ep_square.take() {
            key ^= zobrist_ep(ep.file());
        }
        self.side_to_move = !self.side_to_move;
        self.rule50 = self.rule50.saturating_add(1);
        self.plies_from_null = 0;
        self.game_ply = self.game_ply.saturating_add(1);
        self.keys.push(key);
        undo
    }

    /// `make_null_move` の逆操作
    pub fn unmake_null_move(&mut self, undo: &UndoInfo) {
        self.side_to_move = !self.side_to_move;
        self.ep_square = undo.ep_square;
        self.rule50 = undo.rule50;
        self.plies_from_null = undo.plies_from_null;
        self.game_ply = undo.game_ply;
        self.keys.pop();
    }

    // =========================================================================
    // 千日手・50手
    // =========================================================================

    /// 現局面と同じ局面の出現回数（現局面を含む、3 で打ち切り）
    ///
    /// 同じ手番の局面だけを見るため2手ずつ遡る。取り・ポーンの手・null move より
    /// 前には戻らない。
    pub fn threefold_count(&self) -> u32 {
        let n = self.keys.len();
        let current = self.key();
        let limit = (self.rule50.min(self.plies_from_null) as usize).min(n.saturating_sub(1));
        let mut count = 1;
        let mut back = 2;
        while back <= limit {
            if self.keys[n - 1 - back] == current {
                count += 1;
                if count >= 3 {
                    break;
                }
            }
            back += 2;
        }
        count
    }

    /// 50手ルールによる引き分けか
    #[inline]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.rule50 >= 100
    }

    // =========================================================================
    // 指し手の符号化・検証
    // =========================================================================

    /// 移動元・移動先・成り駒から、この局面での指し手を組み立てる
    ///
    /// フラグは盤面から決まる。移動元が空のときは `Move::NONE`。
    pub fn encode_move(&self, from: Square, to: Square, promo: Option<PieceType>) -> Move {
        let pc = self.board[from.index()];
        if pc.is_none() {
            return Move::NONE;
        }
        let pt = pc.piece_type();
        let target = self.board[to.index()];
        let mut flags = MoveFlags::NONE;
        if target.is_some() {
            flags = flags | MoveFlags::CAPTURE;
        }
        match pt {
            PieceType::King if from.file().abs_diff(to.file()) == 2 => {
                flags = flags | MoveFlags::CASTLE;
            }
            PieceType::Pawn => {
                if from.file() != to.file() && target.is_none() && self.ep_square == Some(to) {
                    flags = flags | MoveFlags::CAPTURE | MoveFlags::EN_PASSANT;
                }
                if from.rank().abs_diff(to.rank()) == 2 {
                    flags = flags | MoveFlags::DOUBLE_PUSH;
                }
            }
            _ => {}
        }
        match promo {
            Some(p) if pt == PieceType::Pawn => Move::new_promotion(from, to, p, flags),
            Some(_) => Move::NONE,
            None => Move::new(from, to, pt, flags),
        }
    }

    /// 指し手が取る駒の種類（アンパッサンはポーン）
    #[inline]
    pub fn captured_piece_type(&self, mv: Move) -> Option<PieceType> {
        if mv.is_en_passant() {
            return Some(PieceType::Pawn);
        }
        let target = self.board[mv.to().index()];
        target.is_some().then(|| target.piece_type())
    }

    /// 指し手がこの局面で疑似合法か（置換表の手の検証用）
    ///
    /// 自玉を取られる手かどうかは見ない。
    pub fn pseudo_legal(&self, mv: Move) -> bool {
        if !mv.is_some() {
            return false;
        }
        let us = self.side_to_move;
        let from = mv.from();
        let to = mv.to();
        if self.board[from.index()] != Piece::new(us, mv.piece_type()) {
            return false;
        }
        if self.by_color[us.index()].contains(to) {
            return false;
        }
        let target = self.board[to.index()];
        if target.is_some() && target.piece_type() == PieceType::King {
            return false;
        }
        if matches!(mv.promotion(), Some(PieceType::Pawn | PieceType::King)) {
            return false;
        }
        if self.encode_move(from, to, mv.promotion()) != mv {
            return false;
        }

        let occupied = self.occupied();
        match mv.piece_type() {
            PieceType::Pawn => {
                let last_rank = to.relative_rank(us) == 7;
                if last_rank != mv.is_promotion() {
                    return false;
                }
                if mv.is_capture() {
                    return pawn_attacks(us, from).contains(to);
                }
                let one = from.offset(us.forward());
                if mv.is_double_push() {
                    from.relative_rank(us) == 1
                        && !occupied.contains(one)
                        && to == one.offset(us.forward())
                        && !occupied.contains(to)
                } else {
                    to == one && !occupied.contains(to)
                }
            }
            PieceType::King if mv.is_castle() => {
                let king_side = to.file() == 6;
                self.can_castle(king_side)
                    && from == self.king_square(us)
                    && to == castle_king_destination(us, king_side)
            }
            pt => Self::attacks_from(pt, us, from, occupied).contains(to),
        }
    }

    /// 手番側がキャスリングできるか（通過升の利き・王手も含めて判定）
    pub fn can_castle(&self, king_side: bool) -> bool {
        let us = self.side_to_move;
        let right = CastlingRights::for_side(us, king_side);
        if !self.castling.contains(right) {
            return false;
        }
        let king_from = self.king_square(us);
        let king_to = castle_king_destination(us, king_side);
        let (rook_from, _) = castle_rook_squares(king_to);
        if self.board[rook_from.index()] != Piece::new(us, PieceType::Rook) {
            return false;
        }
        let occupied = self.occupied();
        if (between_bb(king_from, rook_from) & occupied).is_not_empty() {
            return false;
        }
        let them = !us;
        // キングの通過升（出発升・到着升を含む）が攻撃されていないこと
        let path = between_bb(king_from, king_to)
            | Bitboard::from_square(king_from)
            | Bitboard::from_square(king_to);
        !path.iter().any(|sq| self.is_attacked_by(sq, them, occupied))
    }

    /// 指し手が相手玉に王手をかけるか
    pub fn gives_check(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let them = !us;
        let ksq = self.king_square(them);
        let from = mv.from();
        let to = mv.to();
        let from_bb = Bitboard::from_square(from);

        let mut occupied = (self.occupied() ^ from_bb) | Bitboard::from_square(to);
        if mv.is_en_passant() {
            occupied ^= Bitboard::from_square(to.offset(-us.forward()));
        }

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(to);
            let occ = occupied ^ Bitboard::from_square(rook_from) | Bitboard::from_square(rook_to);
            return rook_attacks(rook_to, occ).contains(ksq);
        }

        let moved = mv.promotion().unwrap_or(mv.piece_type());
        if Self::attacks_from(moved, us, to, occupied).contains(ksq) {
            return true;
        }

        // 開き王手
        let diagonal = self.diagonal_sliders(us) & !from_bb;
        let orthogonal = self.orthogonal_sliders(us) & !from_bb;
        (bishop_attacks(ksq, occupied) & diagonal).is_not_empty()
            || (rook_attacks(ksq, occupied) & orthogonal).is_not_empty()
    }

    // =========================================================================
    // ハッシュ・整合性
    // =========================================================================

    /// ハッシュを一から計算する
    pub fn compute_key(&self) -> u64 {
        let mut key = 0u64;
        for sq in self.occupied() {
            key ^= zobrist_psq(self.board[sq.index()], sq);
        }
        if self.side_to_move == Color::Black {
            key ^= zobrist_side();
        }
        key ^= zobrist_castling(self.castling);
        if let Some(ep) = self.ep_square {
            key ^= zobrist_ep(ep.file());
        }
        key
    }

    /// 内部表現の不整合を返す（整合していれば None）
    pub fn consistency_error(&self) -> Option<String> {
        let all = self.by_type[ALL_PIECES];
        if self.by_color[0] & self.by_color[1] != Bitboard::EMPTY {
            return Some("color masks overlap".to_string());
        }
        if self.by_color[0] | self.by_color[1] != all {
            return Some("color masks do not cover occupancy".to_string());
        }
        let mut union = Bitboard::EMPTY;
        for pt in PieceType::ALL {
            let bb = self.by_type[pt.index()];
            if (union & bb).is_not_empty() {
                return Some(format!("{pt:?} mask overlaps another piece mask"));
            }
            union |= bb;
        }
        if union != all {
            return Some("piece masks do not cover occupancy".to_string());
        }
        for sq in Square::all() {
            let pc = self.board[sq.index()];
            if pc.is_none() {
                if all.contains(sq) {
                    return Some(format!("{sq} occupied in masks but empty in board"));
                }
            } else if !self.pieces(pc.color(), pc.piece_type()).contains(sq) {
                return Some(format!("{sq} holds {} but masks disagree", pc.to_char()));
            }
        }
        for color in Color::ALL {
            if self.pieces(color, PieceType::King).count() != 1 {
                return Some(format!("{color:?} does not have exactly one king"));
            }
        }
        if self.key() != self.compute_key() {
            return Some(format!(
                "incremental key {:#x} differs from recomputed {:#x}",
                self.key(),
                self.compute_key()
            ));
        }
        None
    }

    /// 内部表現が整合していることを確認する（不整合は致命的エラー）
    pub fn assert_consistent(&self) {
        if let Some(err) = self.consistency_error() {
            panic!("inconsistent position {}: {err}", self.to_fen());
        }
    }
}

/// キャスリングでのキングの到着升
#[inline]
pub(crate) const fn castle_king_destination(color: Color, king_side: bool) -> Square {
    match (color, king_side) {
        (Color::White, true) => Square::G1,
        (Color::White, false) => Square::C1,
        (Color::Black, true) => Square::G8,
        (Color::Black, false) => Square::C8,
    }
}

/// キングの到着升から、ルークの移動元・移動先を求める
#[inline]
pub(crate) const fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to.raw() {
        6 => (Square::H1, Square::F1),
        2 => (Square::A1, Square::D1),
        62 => (Square::H8, Square::F8),
        _ => (Square::A8, Square::D8),
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                write!(f, " {}", self.piece_on(Square::new(file, rank)).to_char())?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f, "fen: {}", self.to_fen())?;
        write!(f, "key: {:016x}", self.key())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({}, key={:016x}, stack={})", self.to_fen(), self.key(), self.keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_startpos_basics() {
        let pos = Position::startpos();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.king_square(Color::White), Square::E1);
        assert_eq!(pos.king_square(Color::Black), Square::E8);
        assert_eq!(pos.castling_rights(), CastlingRights::ALL);
        assert!(!pos.in_check());
        assert!(pos.consistency_error().is_none());
    }

    #[test]
    fn test_make_unmake_restores_everything() {
        let mut pos = Position::startpos();
        let before = pos.clone();
        let mv = pos.encode_move(sq("e2"), sq("e4"), None);
        assert!(mv.is_double_push());
        let undo = pos.make_move(mv);
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.piece_on(sq("e4")), Piece::new(Color::White, PieceType::Pawn));
        // 取れる黒ポーンがいないのでアンパッサン升は記録しない
        assert_eq!(pos.ep_square(), None);
        pos.assert_consistent();
        pos.unmake_move(mv, &undo);
        assert_eq!(pos, before);
    }

    #[test]
    fn test_null_move_roundtrip() {
        let mut pos = Position::startpos();
        let before = pos.clone();
        let undo = pos.make_null_move();
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.key(), pos.compute_key());
        pos.unmake_null_move(&undo);
        assert_eq!(pos, before);
    }

    #[test]
    fn test_threefold_count_by_knight_shuffle() {
        let mut pos = Position::startpos();
        let shuffle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];
        assert_eq!(pos.threefold_count(), 1);
        for (from, to) in shuffle {
            let mv = pos.encode_move(sq(from), sq(to), None);
            pos.make_move(mv);
        }
        assert_eq!(pos.threefold_count(), 2);
        for (from, to) in shuffle {
            let mv = pos.encode_move(sq(from), sq(to), None);
            pos.make_move(mv);
        }
        assert_eq!(pos.threefold_count(), 3);
    }

    #[test]
    fn test_gives_check_direct_and_discovered() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/4B3/4R1K1 w - - 0 1").unwrap();
        // ビショップが退くとルークの開き王手
        let discovered = pos.encode_move(sq("e2"), sq("d3"), None);
        assert!(pos.gives_check(discovered));
        let direct = pos.encode_move(sq("e2"), sq("b5"), None);
        assert!(pos.gives_check(direct));
        let quiet = pos.encode_move(sq("g1"), sq("h2"), None);
        assert!(!pos.gives_check(quiet));
    }

    #[test]
    fn test_pseudo_legal_rejects_foreign_moves() {
        let pos = Position::startpos();
        let e2e4 = pos.encode_move(sq("e2"), sq("e4"), None);
        assert!(pos.pseudo_legal(e2e4));
        let blocked = Move::new(sq("a1"), sq("a3"), PieceType::Rook, MoveFlags::NONE);
        assert!(!pos.pseudo_legal(blocked));
        let wrong_side = pos.encode_move(sq("e7"), sq("e5"), None);
        assert!(!pos.pseudo_legal(wrong_side));
        assert!(!pos.pseudo_legal(Move::NONE));
        assert!(!pos.pseudo_legal(Move::NULL));
    }

    #[test]
    fn test_castling_requires_safe_path() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(pos.can_castle(true));
        assert!(pos.can_castle(false));
        // f1 に黒ルークの利き
        let pos = Position::from_fen("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1").unwrap();
        assert!(!pos.can_castle(true));
        assert!(pos.can_castle(false));
    }

    #[test]
    fn test_counters_saturate_at_their_limits() {
        let fen = "4k3/8/8/8/8/8/8/R3K3 b - - 65535 2147483648";
        let mut pos = Position::from_fen(fen).unwrap();
        let before = pos.clone();

        let mv = pos.parse_move("e8d8").unwrap();
        let undo = pos.make_move(mv);
        assert_eq!(pos.rule50(), u16::MAX);
        assert_eq!(pos.game_ply(), u32::MAX);
        pos.unmake_move(mv, &undo);
        assert_eq!(pos, before);

        let undo = pos.make_null_move();
        assert_eq!(pos.rule50(), u16::MAX);
        pos.unmake_null_move(&undo);
        assert_eq!(pos, before);
        assert_eq!(pos.to_fen(), fen);
    }
}
