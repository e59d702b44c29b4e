//! Quiz Slice headless entry point
//!
//! Plays a player's rounds with the seeded bot, saves each result and prints
//! the leaderboard.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use quiz_slice::Leaderboard;
use quiz_slice::autoplay::{AutoPlayConfig, AutoPlayer};
use quiz_slice::leaderboard::DEFAULT_TOP;
use quiz_slice::persistence::{GameRecord, JsonFileStore, RecordStore, finish_round};
use quiz_slice::session::PlayerSession;
use quiz_slice::sim::{QuestionBank, RoundResult, seed_from_entropy, start_round};
use quiz_slice::tuning::{Tuning, Variant};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Base seed; round N uses seed + N - 1
    #[arg(long)]
    seed: Option<u64>,
    /// Player code (normalized to 10 uppercase chars)
    #[arg(long, default_value = "BOT")]
    player: String,
    /// Rounds to attempt (the per-player allowance still applies)
    #[arg(long, default_value_t = 2)]
    rounds: u32,
    /// Tuning JSON file
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Question bank JSON file
    #[arg(long)]
    questions: Option<PathBuf>,
    /// Record store JSON file
    #[arg(long, default_value = "quiz-slice-records.json")]
    records: PathBuf,
    /// Spawn/quiz variant, overrides the tuning file
    #[arg(long, value_parser = parse_variant)]
    variant: Option<Variant>,
    /// Bot chance to pick the right option
    #[arg(long, default_value_t = 0.7)]
    accuracy: f32,
}

fn parse_variant(s: &str) -> Result<Variant, String> {
    Variant::from_str(s).ok_or_else(|| format!("unknown variant `{}`", s))
}

#[derive(Serialize)]
struct RoundLine<'a> {
    player: &'a str,
    round: u32,
    seed: u64,
    /// Leaderboard position this score takes among earlier rounds
    rank: usize,
    #[serde(flatten)]
    result: &'a RoundResult,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Quiz Slice (headless) starting...");

    let mut tuning = match &cli.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    if let Some(variant) = cli.variant {
        tuning.variant = variant;
    }
    tuning.validate()?;

    let bank = match &cli.questions {
        Some(path) => QuestionBank::load(path)
            .with_context(|| format!("loading questions from {}", path.display()))?,
        None => QuestionBank::builtin()?,
    };
    log::info!("{} questions, variant {}", bank.len(), tuning.variant.as_str());

    let mut store = JsonFileStore::new(&cli.records);
    let mut seen = store.fetch_records().unwrap_or_else(|e| {
        log::warn!("Could not read records from {}: {}", store.path().display(), e);
        Vec::new()
    });
    let mut session = PlayerSession::from_records(&cli.player, &seen)?;

    let base_seed = cli.seed.unwrap_or_else(seed_from_entropy);
    let bot_config = AutoPlayConfig {
        accuracy: cli.accuracy.clamp(0.0, 1.0),
        ..AutoPlayConfig::default()
    };

    for _ in 0..cli.rounds {
        let round_number = match session.begin_round() {
            Ok(n) => n,
            Err(e) => {
                log::warn!("{}", e);
                println!("{}", e);
                break;
            }
        };
        let seed = base_seed.wrapping_add(round_number as u64 - 1);

        let mut round = start_round(tuning.clone(), bank.clone(), seed);
        let mut bot = AutoPlayer::new(bot_config.clone(), seed);
        let Some(result) = bot.play_round(&mut round) else {
            bail!("round {} with seed {} never ended", round_number, seed);
        };
        let result = finish_round(&mut store, &session, result);

        let board = Leaderboard::from_records(&seen);
        let rank = board.potential_rank(result.score);
        if board.top_score().is_none_or(|top| result.score > top) {
            log::info!("New top score: {}", result.score);
        }
        seen.push(GameRecord::new(session.code(), round_number, &result));

        let line = RoundLine {
            player: session.code(),
            round: round_number,
            seed,
            rank,
            result: &result,
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    let records = match store.fetch_records() {
        Ok(records) => records,
        Err(e) => {
            log::warn!("Leaderboard unavailable: {}", e);
            return Ok(());
        }
    };
    let board = Leaderboard::from_records(&records);
    println!("\nLeaderboard");
    for entry in board.top(DEFAULT_TOP) {
        println!(
            "{:>3}. {:<10} {:>5}  ({}/{} quiz)",
            entry.rank, entry.player_code, entry.score, entry.correct_answers, entry.total_questions
        );
    }
    if let Some(best) = board.personal_best(session.code()) {
        println!("\n{} best: {} (rank {})", session.code(), best.score, best.rank);
    }
    Ok(())
}
