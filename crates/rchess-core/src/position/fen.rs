//! FEN 形式の解析・出力
//!
//! 解析は左から右へ1文字ずつ行い、失敗したときは区別できるエラーを返す。
//! 失敗時に途中まで組み立てた局面を返すことはない。

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::bitboard::pawn_attacks;
use crate::types::{CastlingRights, Color, Piece, PieceType, Square};

use super::pos::Position;

/// 平手初期局面の FEN
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenField {
    Placement,
    SideToMove,
    Castling,
    EnPassant,
    HalfmoveClock,
    FullmoveNumber,
}

impl fmt::Display for FenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FenField::Placement => "piece placement",
            FenField::SideToMove => "side to move",
            FenField::Castling => "castling rights",
            FenField::EnPassant => "en passant square",
            FenField::HalfmoveClock => "halfmove clock",
            FenField::FullmoveNumber => "fullmove number",
        };
        f.write_str(name)
    }
}

/// FEN 解析エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    /// 認識できない文字
    #[error("unexpected character {ch:?} at offset {offset} in {field}")]
    BadCharacter {
        field: FenField,
        ch: char,
        offset: usize,
    },
    /// 段の升数が 8 でない
    #[error("rank {rank} describes {files} files, expected 8")]
    BadRankWidth { rank: u8, files: usize },
    /// 段の数が 8 でない
    #[error("piece placement describes {0} ranks, expected 8")]
    BadRankCount(usize),
    /// 必須フィールドの途中で入力が終わった
    #[error("input ended while reading {0}")]
    UnexpectedEnd(FenField),
    /// 文字は正しいが値が不正なフィールド
    #[error("invalid {field}: {reason}")]
    BadField { field: FenField, reason: String },
}

struct FenReader<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> FenReader<'a> {
    fn new(text: &'a str) -> Self {
        FenReader {
            chars: text.char_indices().peekable(),
        }
    }

    fn next_in(&mut self, field: FenField) -> Result<(usize, char), FenError> {
        self.chars.next().ok_or(FenError::UnexpectedEnd(field))
    }

    /// フィールド区切りの空白を1つ読む
    fn separator(&mut self, current: FenField, next: FenField) -> Result<(), FenError> {
        match self.chars.next() {
            None => Err(FenError::UnexpectedEnd(next)),
            Some((_, ' ')) => Ok(()),
            Some((offset, ch)) => Err(FenError::BadCharacter {
                field: current,
                ch,
                offset,
            }),
        }
    }

    /// 区切りの空白または入力末尾までの10進数を読む
    fn number(&mut self, field: FenField) -> Result<u32, FenError> {
        let mut value: Option<u32> = None;
        while let Some(&(offset, ch)) = self.chars.peek() {
            if ch == ' ' {
                break;
            }
            let Some(d) = ch.to_digit(10) else {
                return Err(FenError::BadCharacter { field, ch, offset });
            };
            self.chars.next();
            value = Some(
                value
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(d))
                    .ok_or_else(|| FenError::BadField {
                        field,
                        reason: "number too large".to_string(),
                    })?,
            );
        }
        match (value, self.chars.peek()) {
            (Some(v), _) => Ok(v),
            (None, Some(&(offset, ch))) => Err(FenError::BadCharacter { field, ch, offset }),
            (None, None) => Err(FenError::UnexpectedEnd(field)),
        }
    }

    fn placement(&mut self, pos: &mut Position) -> Result<(), FenError> {
        let field = FenField::Placement;
        let mut ranks = 1usize;
        let mut files = 0usize;
        loop {
            let (offset, ch) = self.next_in(field)?;
            match ch {
                ' ' => break,
                '/' => {
                    if files != 8 {
                        return Err(FenError::BadRankWidth {
                            rank: (9 - ranks) as u8,
                            files,
                        });
                    }
                    ranks += 1;
                    if ranks > 8 {
                        return Err(FenError::BadRankCount(ranks));
                    }
                    files = 0;
                }
                '1'..='8' => {
                    files += ch as usize - '0' as usize;
                    if files > 8 {
                        return Err(FenError::BadRankWidth {
                            rank: (9 - ranks) as u8,
                            files,
                        });
                    }
                }
                _ => {
                    let Some(pc) = Piece::from_char(ch) else {
                        return Err(FenError::BadCharacter { field, ch, offset });
                    };
                    if files >= 8 {
                        return Err(FenError::BadRankWidth {
                            rank: (9 - ranks) as u8,
                            files: files + 1,
                        });
                    }
                    pos.put_piece(pc, Square::new(files as u8, (8 - ranks) as u8));
                    files += 1;
                }
            }
        }
        if files != 8 {
            return Err(FenError::BadRankWidth {
                rank: (9 - ranks) as u8,
                files,
            });
        }
        if ranks != 8 {
            return Err(FenError::BadRankCount(ranks));
        }
        Ok(())
    }

    fn side_to_move(&mut self) -> Result<Color, FenError> {
        let field = FenField::SideToMove;
        match self.next_in(field)? {
            (_, 'w') => Ok(Color::White),
            (_, 'b') => Ok(Color::Black),
            (offset, ch) => Err(FenError::BadCharacter { field, ch, offset }),
        }
    }

    fn castling(&mut self) -> Result<CastlingRights, FenError> {
        let field = FenField::Castling;
        let (offset, first) = self.next_in(field)?;
        if first == '-' {
            return Ok(CastlingRights::NONE);
        }
        let mut rights = CastlingRights::NONE;
        let mut next = Some((offset, first));
        while let Some((offset, ch)) = next {
            let right = match ch {
                'K' => CastlingRights::WHITE_KING,
                'Q' => CastlingRights::WHITE_QUEEN,
                'k' => CastlingRights::BLACK_KING,
                'q' => CastlingRights::BLACK_QUEEN,
                _ => return Err(FenError::BadCharacter { field, ch, offset }),
            };
            if rights.contains(right) {
                return Err(FenError::BadField {
                    field,
                    reason: format!("duplicate right '{ch}'"),
                });
            }
            rights.insert(right);
            next = match self.chars.peek() {
                Some(&(_, ' ')) | None => None,
                Some(_) => self.chars.next(),
            };
        }
        Ok(rights)
    }

    fn en_passant(&mut self) -> Result<Option<Square>, FenError> {
        let field = FenField::EnPassant;
        let (offset, file) = self.next_in(field)?;
        if file == '-' {
            return Ok(None);
        }
        if !('a'..='h').contains(&file) {
            return Err(FenError::BadCharacter {
                field,
                ch: file,
                offset,
            });
        }
        let (offset, rank) = self.next_in(field)?;
        if !('1'..='8').contains(&rank) {
            return Err(FenError::BadCharacter {
                field,
                ch: rank,
                offset,
            });
        }
        Ok(Some(Square::new(
            file as u8 - b'a',
            rank as u8 - b'1',
        )))
    }
}

impl Position {
    /// FEN から局面を作る
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let mut reader = FenReader::new(fen);
        let mut pos = Position::empty();

        reader.placement(&mut pos)?;
        let side = reader.side_to_move()?;
        reader.separator(FenField::SideToMove, FenField::Castling)?;
        let castling = reader.castling()?;
        reader.separator(FenField::Castling, FenField::EnPassant)?;
        let ep = reader.en_passant()?;
        reader.separator(FenField::EnPassant, FenField::HalfmoveClock)?;
        let rule50 = reader.number(FenField::HalfmoveClock)?;
        reader.separator(FenField::HalfmoveClock, FenField::FullmoveNumber)?;
        let fullmove = reader.number(FenField::FullmoveNumber)?;
        // 末尾の空白・改行だけは許す
        if let Some((offset, ch)) = reader.chars.find(|(_, c)| !c.is_whitespace()) {
            return Err(FenError::BadCharacter {
                field: FenField::FullmoveNumber,
                ch,
                offset,
            });
        }

        validate_placement(&pos)?;
        let rule50 = u16::try_from(rule50).map_err(|_| FenError::BadField {
            field: FenField::HalfmoveClock,
            reason: format!("{rule50} out of range"),
        })?;
        if fullmove == 0 {
            return Err(FenError::BadField {
                field: FenField::FullmoveNumber,
                reason: "must be positive".to_string(),
            });
        }
        let game_ply = (fullmove - 1)
            .checked_mul(2)
            .and_then(|ply| ply.checked_add((side == Color::Black) as u32))
            .ok_or_else(|| FenError::BadField {
                field: FenField::FullmoveNumber,
                reason: format!("{fullmove} out of range"),
            })?;
        let castling = normalize_castling(&pos, castling);
        let ep = normalize_en_passant(&pos, side, ep)?;

        pos.finish_setup(side, castling, ep, rule50, game_ply);
        if pos.is_attacked_by(pos.king_square(!side), side, pos.occupied()) {
            return Err(FenError::BadField {
                field: FenField::SideToMove,
                reason: "side not to move is in check".to_string(),
            });
        }
        Ok(pos)
    }

    /// FEN 形式で出力する
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let pc = self.piece_on(Square::new(file, rank));
                if pc.is_none() {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    fen.push(char::from(b'0' + empty));
                    empty = 0;
                }
                fen.push(pc.to_char());
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        let ep = match self.ep_square() {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };
        format!(
            "{fen} {} {} {ep} {} {}",
            self.side_to_move().to_char(),
            self.castling_rights(),
            self.rule50(),
            self.fullmove_number()
        )
    }
}

fn validate_placement(pos: &Position) -> Result<(), FenError> {
    for color in Color::ALL {
        let kings = pos.pieces(color, PieceType::King).count();
        if kings != 1 {
            return Err(FenError::BadField {
                field: FenField::Placement,
                reason: format!("{color:?} has {kings} kings"),
            });
        }
    }
    let back_ranks = crate::bitboard::RANK_BB[0] | crate::bitboard::RANK_BB[7];
    if (pos.pieces_by_type(PieceType::Pawn) & back_ranks).is_not_empty() {
        return Err(FenError::BadField {
            field: FenField::Placement,
            reason: "pawn on first or last rank".to_string(),
        });
    }
    Ok(())
}

/// キング・ルークが初期位置にない権利は落とす
fn normalize_castling(pos: &Position, rights: CastlingRights) -> CastlingRights {
    let mut kept = CastlingRights::NONE;
    for right in rights.iter() {
        let (color, king_sq, rook_sq) = match right {
            CastlingRights::WHITE_KING => (Color::White, Square::E1, Square::H1),
            CastlingRights::WHITE_QUEEN => (Color::White, Square::E1, Square::A1),
            CastlingRights::BLACK_KING => (Color::Black, Square::E8, Square::H8),
            _ => (Color::Black, Square::E8, Square::A8),
        };
        if pos.piece_on(king_sq) == Piece::new(color, PieceType::King)
            && pos.piece_on(rook_sq) == Piece::new(color, PieceType::Rook)
        {
            kept.insert(right);
        }
    }
    kept
}

/// アンパッサン升の段を検証し、実際に取れる場合だけ残す
fn normalize_en_passant(
    pos: &Position,
    side: Color,
    ep: Option<Square>,
) -> Result<Option<Square>, FenError> {
    let Some(sq) = ep else {
        return Ok(None);
    };
    if sq.relative_rank(side) != 5 {
        return Err(FenError::BadField {
            field: FenField::EnPassant,
            reason: format!("{sq} is not on the en passant rank"),
        });
    }
    let pushed = sq.offset(-side.forward());
    let pawn_present = pos.piece_on(pushed) == Piece::new(!side, PieceType::Pawn);
    let path_clear = pos.piece_on(sq).is_none() && pos.piece_on(sq.offset(side.forward())).is_none();
    let capturable = (pawn_attacks(!side, sq) & pos.pieces(side, PieceType::Pawn)).is_not_empty();
    Ok((pawn_present && path_clear && capturable).then_some(sq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_roundtrip() {
        let pos = Position::from_fen(START_FEN).unwrap();
        assert_eq!(pos.to_fen(), START_FEN);
    }

    #[test]
    fn test_counters_and_side() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b KQkq - 7 42";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.rule50(), 7);
        assert_eq!(pos.fullmove_number(), 42);
        assert_eq!(pos.game_ply(), 83);
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn test_en_passant_kept_only_when_capturable() {
        let kept = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        assert_eq!(kept.ep_square(), Some("d6".parse().unwrap()));
        let dropped = Position::from_fen("4k3/8/8/3p4/8/8/4P3/4K3 w - d6 0 2").unwrap();
        assert_eq!(dropped.ep_square(), None);
    }

    #[test]
    fn test_bad_character() {
        let err = Position::from_fen("rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap_err();
        assert!(matches!(
            err,
            FenError::BadCharacter {
                field: FenField::Placement,
                ch: 'x',
                ..
            }
        ));
        let err = Position::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1").unwrap_err();
        assert!(matches!(
            err,
            FenError::BadCharacter {
                field: FenField::SideToMove,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_rank_width() {
        let over = Position::from_fen("4k4/8/8/8/8/8/8/4K3 w - - 0 1").unwrap_err();
        assert!(matches!(over, FenError::BadRankWidth { rank: 8, .. }));
        let under = Position::from_fen("4k3/7/8/8/8/8/8/4K3 w - - 0 1").unwrap_err();
        assert!(matches!(under, FenError::BadRankWidth { rank: 7, files: 7 }));
    }

    #[test]
    fn test_bad_rank_count() {
        let few = Position::from_fen("4k3/8/8/8/8/8/4K3 w - - 0 1").unwrap_err();
        assert_eq!(few, FenError::BadRankCount(7));
        let many = Position::from_fen("4k3/8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap_err();
        assert_eq!(many, FenError::BadRankCount(9));
    }

    #[test]
    fn test_premature_end() {
        let cases = [
            ("4k3/8/8/8", FenField::Placement),
            ("4k3/8/8/8/8/8/8/4K3 ", FenField::SideToMove),
            ("4k3/8/8/8/8/8/8/4K3 w", FenField::Castling),
            ("4k3/8/8/8/8/8/8/4K3 w -", FenField::EnPassant),
            ("4k3/8/8/8/8/8/8/4K3 w - -", FenField::HalfmoveClock),
            ("4k3/8/8/8/8/8/8/4K3 w - - 0", FenField::FullmoveNumber),
        ];
        for (fen, field) in cases {
            assert_eq!(
                Position::from_fen(fen).unwrap_err(),
                FenError::UnexpectedEnd(field),
                "fen: {fen:?}"
            );
        }
    }

    #[test]
    fn test_bad_fields() {
        let no_king = Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap_err();
        assert!(matches!(
            no_king,
            FenError::BadField {
                field: FenField::Placement,
                ..
            }
        ));
        let zero_move = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 0").unwrap_err();
        assert!(matches!(
            zero_move,
            FenError::BadField {
                field: FenField::FullmoveNumber,
                ..
            }
        ));
        let wrong_ep_rank = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e3 0 1").unwrap_err();
        assert!(matches!(
            wrong_ep_rank,
            FenError::BadField {
                field: FenField::EnPassant,
                ..
            }
        ));
        let dup = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KKq - 0 1").unwrap_err();
        assert!(matches!(
            dup,
            FenError::BadField {
                field: FenField::Castling,
                ..
            }
        ));
    }

    #[test]
    fn test_huge_fullmove_number() {
        let overflow = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 4294967295").unwrap_err();
        assert!(matches!(
            overflow,
            FenError::BadField {
                field: FenField::FullmoveNumber,
                ..
            }
        ));
        // 手数が u32 に収まる最大の値は受け付ける
        let fen = "4k3/8/8/8/8/8/8/4K3 b - - 0 2147483648";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.game_ply(), u32::MAX);
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn test_castling_normalized() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert_eq!(pos.castling_rights(), CastlingRights::WHITE_KING);
    }
}
