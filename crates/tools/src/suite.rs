//! 局面集の読み込み
//!
//! 1行1局面。`#` 以降はコメント。FEN（6フィールド）のほか、EPD（4フィールド +
//! `;` 区切りのオペレーション）も受け付け、EPD の手数は `0 1` とみなす。

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rchess_core::position::Position;

use crate::common::io::open_reader;

/// 局面集の1エントリ
#[derive(Debug, Clone)]
pub struct SuiteEntry {
    /// 元ファイルの行番号（1始まり）
    pub line: usize,
    /// 正規化した FEN
    pub fen: String,
    /// EPD の `id` オペレーション
    pub id: Option<String>,
    pub position: Position,
}

/// 1行を解析する（空行・コメント行は `None`）
pub fn parse_line(text: &str, line: usize) -> Result<Option<SuiteEntry>> {
    let text = text.split('#').next().unwrap_or_default().trim();
    if text.is_empty() {
        return Ok(None);
    }

    let mut fields = text.split_whitespace();
    let head: Vec<&str> = fields.by_ref().take(4).collect();
    if head.len() < 4 {
        bail!("line {line}: expected at least 4 FEN fields");
    }
    let rest: Vec<&str> = fields.collect();

    let counters_present =
        rest.len() >= 2 && rest[0].parse::<u32>().is_ok() && rest[1].parse::<u32>().is_ok();
    let (counters, ops) = if counters_present {
        (format!("{} {}", rest[0], rest[1]), rest[2..].join(" "))
    } else {
        ("0 1".to_string(), rest.join(" "))
    };

    let fen = format!("{} {counters}", head.join(" "));
    let position =
        Position::from_fen(&fen).with_context(|| format!("line {line}: invalid FEN {fen:?}"))?;
    let id = ops.split(';').map(str::trim).find_map(|op| {
        op.strip_prefix("id ").map(|v| v.trim().trim_matches('"').to_string())
    });

    Ok(Some(SuiteEntry { line, fen: position.to_fen(), id, position }))
}

/// ファイルから局面集を読み込む
pub fn load_suite<P: AsRef<Path>>(path: P) -> Result<Vec<SuiteEntry>> {
    let path = path.as_ref();
    let reader =
        open_reader(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut entries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("line {line_no}: read failed"))?;
        if let Some(entry) = parse_line(&line, line_no)? {
            entries.push(entry);
        }
    }
    if entries.is_empty() {
        bail!("{} contains no positions", path.display());
    }
    Ok(entries)
}

/// ファイル指定が無いときに使う局面集
pub fn default_suite() -> Vec<SuiteEntry> {
    const FENS: &[&str] = &[
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1",
    ];
    FENS.iter()
        .enumerate()
        .filter_map(|(i, fen)| parse_line(fen, i + 1).ok().flatten())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fen_and_epd() {
        let fen = parse_line("8/8/8/8/8/8/8/K6k w - - 3 9", 1).unwrap().unwrap();
        assert_eq!(fen.fen, "8/8/8/8/8/8/8/K6k w - - 3 9");
        assert!(fen.id.is_none());

        let epd = parse_line(r#"8/8/8/8/8/8/8/K6k b - - bm Kg2; id "kings";"#, 7)
            .unwrap()
            .unwrap();
        assert_eq!(epd.fen, "8/8/8/8/8/8/8/K6k b - - 0 1");
        assert_eq!(epd.id.as_deref(), Some("kings"));
        assert_eq!(epd.line, 7);
    }

    #[test]
    fn test_comments_and_errors() {
        assert!(parse_line("   # only a comment", 1).unwrap().is_none());
        assert!(parse_line("8/8/8 w", 2).is_err());
        assert!(parse_line("8/8/8/8/8/8/8/8 w - - 0 1", 3).is_err());
    }

    #[test]
    fn test_default_suite_is_complete() {
        assert_eq!(default_suite().len(), 8);
    }
}
