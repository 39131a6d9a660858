//! 指し手アリーナ
//!
//! 探索の各 ply が生成した指し手を1本のバッファに積む。`push_frame` で現在位置を
//! 記録し、`pop_frame` でそこまで巻き戻す。フレームの対応が崩れた場合や
//! 容量を超えた場合は回復不能なバグとして panic する。

use crate::types::{ExtMove, MAX_MOVES, MAX_PLY, Move};

use super::generator::MoveSink;

/// 探索用の指し手バッファ
pub struct MoveArena {
    buf: Box<[ExtMove]>,
    /// 各フレームの開始位置
    frames: Vec<usize>,
    /// 次に書き込む位置
    top: usize,
}

impl MoveArena {
    /// 探索の最大深さ分を収められるアリーナ
    pub fn new() -> Self {
        Self::with_capacity(MAX_PLY * MAX_MOVES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![ExtMove::default(); capacity].into_boxed_slice(),
            frames: Vec::with_capacity(MAX_PLY + 1),
            top: 0,
        }
    }

    /// 新しいフレームを開始する
    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.top);
    }

    /// 直近のフレームを捨てて、その開始位置まで巻き戻す
    #[inline]
    pub fn pop_frame(&mut self) {
        match self.frames.pop() {
            Some(start) => self.top = start,
            None => panic!("MoveArena::pop_frame without a matching push_frame"),
        }
    }

    /// 現在のフレームに1手追加する
    #[inline]
    pub fn push(&mut self, m: ExtMove) {
        if self.top >= self.buf.len() {
            panic!("MoveArena overflow (capacity {})", self.buf.len());
        }
        self.buf[self.top] = m;
        self.top += 1;
    }

    #[inline]
    fn frame_start(&self) -> usize {
        match self.frames.last() {
            Some(&start) => start,
            None => panic!("MoveArena accessed without an open frame"),
        }
    }

    /// 現在のフレームの指し手
    #[inline]
    pub fn frame(&self) -> &[ExtMove] {
        &self.buf[self.frame_start()..self.top]
    }

    #[inline]
    pub fn frame_mut(&mut self) -> &mut [ExtMove] {
        let start = self.frame_start();
        &mut self.buf[start..self.top]
    }

    /// 現在のフレームの手数
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.top - self.frame_start()
    }

    /// 現在のフレームを先頭 `len` 手に縮める
    #[inline]
    pub fn truncate_frame(&mut self, len: usize) {
        let start = self.frame_start();
        debug_assert!(start + len <= self.top);
        self.top = self.top.min(start + len);
    }

    /// 開いているフレーム数
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// 使用中の要素数
    #[inline]
    pub fn used(&self) -> usize {
        self.top
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// すべてのフレームを破棄する（探索中断後の後始末用）
    pub fn reset(&mut self) {
        self.frames.clear();
        self.top = 0;
    }
}

impl Default for MoveArena {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSink for MoveArena {
    #[inline]
    fn push_move(&mut self, mv: Move) {
        self.push(ExtMove::new(mv, 0));
    }
}
