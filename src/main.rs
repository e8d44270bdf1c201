//! Replay a recorded pose sequence through an exercise session.
//!
//! Input is JSON lines, one `PoseFrame` (world landmarks) per line.
//! Prints one JSON line per frame and a summary at the end.
//!
//! Usage: talava-trainer [config.toml] <poses.jsonl>

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use talava_trainer::analysis::RepState;
use talava_trainer::config::Config;
use talava_trainer::exercise::ExerciseProfile;
use talava_trainer::pose::PoseFrame;
use talava_trainer::predictor::OnnxPredictor;
use talava_trainer::session::{ExerciseSession, FrameOutput, FrameStatus};

const CONFIG_PATH: &str = "config.toml";

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: usize,
    status: &'static str,
    reps: u32,
    state: RepState,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flagged: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    predicted: Option<&'a [f32]>,
}

impl<'a> FrameRecord<'a> {
    fn new(frame: usize, output: &'a FrameOutput) -> Self {
        let (status, error) = match &output.status {
            FrameStatus::NotVisible => ("adjust_position", None),
            FrameStatus::WarmingUp { .. } => ("warming_up", None),
            FrameStatus::Scored(_) => ("scored", None),
            FrameStatus::PredictionFailed(e) => ("prediction_failed", Some(e.to_string())),
        };
        Self {
            frame,
            status,
            reps: output.rep_count,
            state: output.rep_state,
            score: output.score(),
            flagged: output
                .report()
                .map(|r| r.flagged.iter().map(|j| j.index()).collect()),
            error,
            degraded: output.degraded,
            predicted: output.predicted.as_deref(),
        }
    }
}

/// `[config.toml] <poses.jsonl>`
fn parse_args(args: &[String]) -> Result<(Option<&str>, &str)> {
    match args {
        [input] => Ok((None, input.as_str())),
        [config, input] => Ok((Some(config.as_str()), input.as_str())),
        _ => bail!("usage: talava-trainer [config.toml] <poses.jsonl>"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, input_path) = parse_args(&args)?;
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(CONFIG_PATH),
    };

    eprintln!("talava-trainer {}", env!("GIT_VERSION"));

    let id = config.session.validate()?;
    let profile = ExerciseProfile::get(id);
    let predictor = OnnxPredictor::for_profile(&config.model.dir, profile)?;
    let mut session = ExerciseSession::new(&config.session, predictor)?;

    let reader = BufReader::new(
        File::open(input_path).with_context(|| format!("failed to open {input_path}"))?,
    );
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: PoseFrame = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid pose frame", input_path, i + 1))?;

        let output = session.process(&frame)?;
        let record = FrameRecord::new(i, &output);
        writeln!(out, "{}", serde_json::to_string(&record)?)?;
    }

    let summary = session.summary();
    eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
