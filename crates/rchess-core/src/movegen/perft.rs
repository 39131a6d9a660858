//! perft（指し手生成の検証用ノード数計測）
//!
//! 合法性は make → `left_king_in_check` → unmake で判定する。末端の1手前だけは
//! `is_legal` で数えて make を省く。

use crate::position::Position;
use crate::types::Move;

use super::arena::MoveArena;
use super::generator::{GenType, generate};

fn perft_inner(pos: &mut Position, depth: u32, arena: &mut MoveArena) -> u64 {
    if depth == 0 {
        return 1;
    }
    arena.push_frame();
    generate(pos, GenType::All, arena);

    let mut nodes = 0;
    for i in 0..arena.frame_len() {
        let mv = arena.frame()[i].mv;
        if depth == 1 {
            if pos.is_legal(mv) {
                nodes += 1;
            }
            continue;
        }
        let undo = pos.make_move(mv);
        if !pos.left_king_in_check() {
            nodes += perft_inner(pos, depth - 1, arena);
        }
        pos.unmake_move(mv, &undo);
    }
    arena.pop_frame();
    nodes
}

/// `depth` 手先までの合法手順の数
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    let mut arena = MoveArena::new();
    perft_inner(pos, depth, &mut arena)
}

/// ルートの合法手ごとの perft 値
pub fn perft_divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    let mut arena = MoveArena::new();
    let mut root = MoveArena::with_capacity(crate::types::MAX_MOVES);
    root.push_frame();
    generate(pos, GenType::All, &mut root);

    let mut result = Vec::with_capacity(root.frame_len());
    for em in root.frame() {
        let mv = em.mv;
        let undo = pos.make_move(mv);
        if !pos.left_king_in_check() {
            let nodes = perft_inner(pos, depth.saturating_sub(1), &mut arena);
            result.push((mv, nodes));
        }
        pos.unmake_move(mv, &undo);
    }
    result
}
