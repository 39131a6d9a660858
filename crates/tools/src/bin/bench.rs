//! bench: 局面集を固定深さで探索し、ノード数と速度を集計する
//!
//! ノード数は決定的なので、探索の変更が挙動を変えたかどうかの確認に使える。

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rchess_core::config::EngineConfig;
use rchess_core::search::{SearchCounters, SearchLimits, SearchStats, SearchWorker};
use serde::Serialize;
use tools::common::io::open_writer;
use tools::suite::{SuiteEntry, default_suite, load_suite};

#[derive(Parser, Debug)]
#[command(author, version, about = "局面集を固定深さで探索してノード数と NPS を計測する")]
struct Cli {
    /// 局面集（FEN / EPD、1行1局面、.gz 可）。省略時は組み込みの局面集
    #[arg(long)]
    suite: Option<PathBuf>,

    /// 探索深さ
    #[arg(long, short, default_value_t = 8)]
    depth: i32,

    /// 置換表サイズ（MB）。--config の値より優先する
    #[arg(long)]
    hash: Option<usize>,

    /// エンジン設定 JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// 局面ごとに置換表と履歴を消さない
    #[arg(long)]
    keep_tables: bool,

    /// JSON サマリの出力先（`-` で標準出力）
    #[arg(long)]
    output: Option<PathBuf>,

    /// 統計の詳細を表示する
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct PositionReport {
    line: usize,
    id: Option<String>,
    fen: String,
    best_move: String,
    score: String,
    depth: i32,
    sel_depth: usize,
    nodes: u64,
    time_ms: u64,
}

#[derive(Debug, Serialize)]
struct BenchSummary {
    depth: i32,
    hash_mb: usize,
    positions: usize,
    total_nodes: u64,
    total_qnodes: u64,
    total_time_ms: u64,
    nps: u64,
    tt_hits: u64,
    beta_cutoffs: u64,
    first_move_cutoff_rate: f64,
    results: Vec<PositionReport>,
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            EngineConfig::from_json_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(hash) = cli.hash {
        config.hash_mb = hash;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli, config: &EngineConfig, suite: &[SuiteEntry]) -> (Vec<PositionReport>, SearchStats) {
    let mut worker = SearchWorker::with_material(config);
    let counters = Arc::new(SearchCounters::new());
    let mut reports = Vec::with_capacity(suite.len());

    for entry in suite {
        if !cli.keep_tables {
            worker.clear();
        }
        let mut pos = entry.position.clone();
        let limits = SearchLimits::builder().depth(cli.depth).stats(Arc::clone(&counters)).build();

        let start = Instant::now();
        let result = worker.search(&mut pos, &limits);
        let time_ms = start.elapsed().as_millis() as u64;

        log::info!(
            "[{}/{}] {} bestmove {} score {} nodes {} time {} ms",
            reports.len() + 1,
            suite.len(),
            entry.id.as_deref().unwrap_or(&entry.fen),
            result.best_move,
            result.score,
            result.nodes,
            time_ms
        );
        if cli.verbose {
            log::info!("\n{}", worker.stats().format_report());
        }

        reports.push(PositionReport {
            line: entry.line,
            id: entry.id.clone(),
            fen: entry.fen.clone(),
            best_move: result.best_move.to_string(),
            score: result.score.to_string(),
            depth: result.depth,
            sel_depth: result.sel_depth,
            nodes: result.nodes,
            time_ms,
        });
    }
    (reports, counters.snapshot())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    if cli.depth < 1 {
        bail!("--depth must be at least 1");
    }
    rchess_core::init();

    let config = load_config(&cli)?;
    let suite = match &cli.suite {
        Some(path) => load_suite(path)?,
        None => default_suite(),
    };
    log::info!("bench: {} positions, depth {}, hash {} MB", suite.len(), cli.depth, config.hash_mb);

    let start = Instant::now();
    let (results, totals) = run(&cli, &config, &suite);
    let total_time_ms = start.elapsed().as_millis() as u64;

    let total_nodes: u64 = results.iter().map(|r| r.nodes).sum();
    let nps = total_nodes * 1000 / total_time_ms.max(1);
    let first_move_cutoff_rate = if totals.beta_cutoffs > 0 {
        totals.first_move_cutoffs as f64 / totals.beta_cutoffs as f64
    } else {
        0.0
    };

    println!("===========================");
    println!("Total time (ms) : {total_time_ms}");
    println!("Nodes searched  : {total_nodes}");
    println!("Nodes/second    : {nps}");

    if let Some(path) = &cli.output {
        let summary = BenchSummary {
            depth: cli.depth,
            hash_mb: config.hash_mb,
            positions: results.len(),
            total_nodes,
            total_qnodes: totals.qnodes,
            total_time_ms,
            nps,
            tt_hits: totals.tt_hits,
            beta_cutoffs: totals.beta_cutoffs,
            first_move_cutoff_rate,
            results,
        };
        let mut w = open_writer(path).with_context(|| format!("failed to open {}", path.display()))?;
        serde_json::to_writer_pretty(&mut w, &summary)?;
        writeln!(w)?;
        w.flush()?;
    }
    Ok(())
}
