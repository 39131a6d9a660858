//! analyze: 1局面を時間・ノード・深さ制限つきで探索し、反復ごとの情報を表示する

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rchess_core::config::EngineConfig;
use rchess_core::position::{Position, START_FEN};
use rchess_core::search::{SearchLimits, SearchWorker};

#[derive(Parser, Debug)]
#[command(author, version, about = "1局面を探索して info 行と最善手を表示する")]
struct Cli {
    /// 対象局面（省略時は初期局面）
    #[arg(long, default_value = START_FEN)]
    fen: String,

    /// 局面に適用する指し手（UCI 形式、空白区切り）
    #[arg(long, num_args = 1.., value_delimiter = ' ')]
    moves: Vec<String>,

    /// 最大深さ
    #[arg(long, short)]
    depth: Option<i32>,

    /// 次の反復を始めない時間（ms）
    #[arg(long)]
    soft_time: Option<u64>,

    /// 探索を打ち切る時間（ms）
    #[arg(long)]
    movetime: Option<u64>,

    /// 探索を打ち切るノード数
    #[arg(long)]
    nodes: Option<u64>,

    /// 次の反復を始めないノード数
    #[arg(long)]
    soft_nodes: Option<u64>,

    /// 置換表サイズ（MB）
    #[arg(long)]
    hash: Option<usize>,

    /// エンジン設定 JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// 指定ミリ秒後に外部から停止する
    #[arg(long)]
    stop_after: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    rchess_core::init();

    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            EngineConfig::from_json_str(&text)?
        }
        None => EngineConfig::default(),
    };
    if let Some(hash) = cli.hash {
        config.hash_mb = hash;
    }
    config.validate()?;

    let mut pos = Position::from_fen(&cli.fen).with_context(|| format!("invalid FEN: {}", cli.fen))?;
    for text in cli.moves.iter().filter(|m| !m.is_empty()) {
        let mv = pos.parse_move(text).with_context(|| format!("illegal move: {text}"))?;
        if mv.is_none() {
            bail!("null move is not allowed in --moves");
        }
        let _ = pos.make_move(mv);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let mut builder = SearchLimits::builder()
        .stop(Arc::clone(&stop))
        .debug(log::log_enabled!(log::Level::Debug))
        .info(|info| println!("info {info}"));
    if let Some(depth) = cli.depth {
        builder = builder.depth(depth);
    }
    if let Some(ms) = cli.soft_time {
        builder = builder.soft_time_ms(ms);
    }
    if let Some(ms) = cli.movetime {
        builder = builder.hard_time_ms(ms);
    }
    if let Some(nodes) = cli.nodes {
        builder = builder.hard_nodes(nodes);
    }
    if let Some(nodes) = cli.soft_nodes {
        builder = builder.soft_nodes(nodes);
    }
    let limits = builder.build();
    if limits.is_unbounded() && cli.stop_after.is_none() {
        log::warn!("no limit given; searching until the maximum depth");
    }

    if let Some(ms) = cli.stop_after {
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(ms));
            stop.store(true, Ordering::Relaxed);
        });
    }

    let mut worker = SearchWorker::with_material(&config);
    let result = worker.search(&mut pos, &limits);

    match result.ponder_move() {
        Some(ponder) => println!("bestmove {} ponder {ponder}", result.best_move),
        None => println!("bestmove {}", result.best_move),
    }
    Ok(())
}
