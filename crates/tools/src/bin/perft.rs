//! perft: 指し手生成の検証と計測

use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rchess_core::movegen::{perft, perft_divide};
use rchess_core::position::{Position, START_FEN};

#[derive(Parser, Debug)]
#[command(author, version, about = "指定局面の perft（葉ノード数）を数える")]
struct Cli {
    /// 対象局面（省略時は初期局面）
    #[arg(long, default_value = START_FEN)]
    fen: String,

    /// 探索深さ
    #[arg(long, short, default_value_t = 5)]
    depth: u32,

    /// ルートの指し手ごとの内訳を表示する
    #[arg(long)]
    divide: bool,

    /// 期待値（一致しなければ終了コード 1）
    #[arg(long)]
    expect: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    rchess_core::init();

    let mut pos = Position::from_fen(&cli.fen).with_context(|| format!("invalid FEN: {}", cli.fen))?;
    log::info!("perft depth {} on {}", cli.depth, pos.to_fen());

    let start = Instant::now();
    let total = if cli.divide {
        let mut divide = perft_divide(&mut pos, cli.depth);
        divide.sort_by_key(|(mv, _)| mv.to_string());
        for (mv, count) in &divide {
            println!("{mv}: {count}");
        }
        println!();
        divide.iter().map(|(_, count)| count).sum()
    } else {
        perft(&mut pos, cli.depth)
    };
    let elapsed = start.elapsed();

    let nps = if elapsed.as_secs_f64() > 0.0 {
        (total as f64 / elapsed.as_secs_f64()) as u64
    } else {
        0
    };
    println!("nodes {total}");
    println!("time {} ms", elapsed.as_millis());
    println!("nps {nps}");

    if let Some(expected) = cli.expect
        && expected != total
    {
        bail!("perft mismatch: expected {expected}, got {total}");
    }
    Ok(())
}
