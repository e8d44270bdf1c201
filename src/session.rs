//! Exercise session
//!
//! 1ストリーム = 1セッション。フレームは到着順に1つずつ `process` に渡す。
//! 窓とレップカウンタはセッションが専有するので同期は不要。

use std::borrow::Borrow;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{
    deviation, DeviationReport, RepState, RepetitionCounter, SequenceWindow, VisibilityGate,
};
use crate::config::SessionConfig;
use crate::error::{AnalysisError, PredictError};
use crate::exercise::{ExerciseId, ExerciseProfile};
use crate::pose::PoseFrame;
use crate::predictor::Predictor;

/// 1フレームの処理結果の種類
#[derive(Debug, Clone, PartialEq)]
pub enum FrameStatus {
    /// 追跡ランドマークが見えていない（表示側で「位置を調整」を出す）
    NotVisible,
    /// 窓がまだ埋まっていない
    WarmingUp { buffered: usize, required: usize },
    /// 採点済み
    Scored(DeviationReport),
    /// 予測に失敗（このフレームの採点・カウントはスキップ）
    PredictionFailed(PredictError),
}

/// 1フレーム分の出力
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub status: FrameStatus,
    pub rep_count: u32,
    pub rep_state: RepState,
    /// 予測失敗が連続上限に達している
    pub degraded: bool,
    /// 予測ベクトル（draw_predicted_lm 有効かつ採点できた時のみ）
    pub predicted: Option<Vec<f32>>,
}

impl FrameOutput {
    pub fn report(&self) -> Option<&DeviationReport> {
        match &self.status {
            FrameStatus::Scored(report) => Some(report),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<f32> {
        self.report().map(|r| r.score)
    }

    pub fn is_warming_up(&self) -> bool {
        matches!(self.status, FrameStatus::WarmingUp { .. })
    }
}

/// セッション統計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub frames_processed: u64,
    pub frames_admitted: u64,
    pub frames_rejected: u64,
    pub frames_scored: u64,
    pub prediction_failures: u64,
    #[serde(skip)]
    score_sum: f64,
}

impl SessionStats {
    /// 採点済みフレームの平均スコア
    pub fn mean_score(&self) -> Option<f32> {
        if self.frames_scored == 0 {
            None
        } else {
            Some((self.score_sum / self.frames_scored as f64) as f32)
        }
    }
}

/// `run` の結果
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub exercise: ExerciseId,
    pub rep_count: u32,
    pub mean_score: Option<f32>,
    pub degraded: bool,
    #[serde(flatten)]
    pub stats: SessionStats,
}

/// 1ストリーム分の解析セッション
pub struct ExerciseSession<P> {
    profile: &'static ExerciseProfile,
    gate: VisibilityGate,
    window: SequenceWindow,
    counter: RepetitionCounter,
    predictor: P,
    error_threshold: f32,
    draw_predicted_lm: bool,
    max_consecutive_failures: u32,
    failure_streak: u32,
    stats: SessionStats,
}

impl<P: Predictor> ExerciseSession<P> {
    pub fn new(config: &SessionConfig, predictor: P) -> Result<Self, AnalysisError> {
        let id = config.validate()?;
        let profile = ExerciseProfile::get(id);
        let window = SequenceWindow::new(config.sequence_length, profile.frame_len())?;

        info!(
            "session started: {} (N={}, error_threshold={}, visibility_threshold={})",
            profile.name(),
            config.sequence_length,
            config.error_threshold,
            config.visibility_threshold
        );

        Ok(Self {
            profile,
            gate: VisibilityGate::new(config.visibility_threshold),
            window,
            counter: RepetitionCounter::from_profile(profile),
            predictor,
            error_threshold: config.error_threshold,
            draw_predicted_lm: config.draw_predicted_lm,
            max_consecutive_failures: config.max_consecutive_failures,
            failure_streak: 0,
            stats: SessionStats::default(),
        })
    }

    /// 1フレームを処理する
    ///
    /// 1. 可視度ゲート
    /// 2. FrameVector を窓へ追加（埋まるまでは暖機中）
    /// 3. 予測 → 採点 → 最古を evict → レップカウンタ更新
    ///
    /// 予測に失敗した場合は窓を N 個のまま残し、次の受理フレームで再試行する
    pub fn process(&mut self, frame: &PoseFrame) -> Result<FrameOutput, AnalysisError> {
        self.stats.frames_processed += 1;

        if !self.gate.admit(frame, self.profile) {
            self.stats.frames_rejected += 1;
            debug!("frame rejected: tracked joints not visible");
            return Ok(self.output(FrameStatus::NotVisible, None));
        }
        self.stats.frames_admitted += 1;

        let frame_vector = self
            .profile
            .frame_vector(frame)
            .ok_or(AnalysisError::ShapeMismatch {
                expected: self.profile.frame_len(),
                actual: 0,
            })?;

        if !self.window.push(frame_vector)? {
            let status = FrameStatus::WarmingUp {
                buffered: self.window.len(),
                required: self.window.capacity(),
            };
            debug!("warming up: {}/{}", self.window.len(), self.window.capacity());
            return Ok(self.output(status, None));
        }

        let scored = self
            .predictor
            .predict(&self.window)
            .and_then(|predicted| {
                match deviation::score(self.profile, frame, &predicted, self.error_threshold) {
                    Ok(report) => Ok((report, predicted)),
                    Err(e) => Err(PredictError::InferenceError(e.to_string())),
                }
            });

        match scored {
            Ok((report, predicted)) => {
                self.window.evict_oldest();
                self.counter.update_from_frame(frame, self.profile.rep_joint());
                if self.failure_streak >= self.max_consecutive_failures {
                    info!("predictor recovered after {} failures", self.failure_streak);
                }
                self.failure_streak = 0;
                self.stats.frames_scored += 1;
                self.stats.score_sum += report.score as f64;

                let predicted = self.draw_predicted_lm.then_some(predicted);
                Ok(self.output(FrameStatus::Scored(report), predicted))
            }
            Err(e) => {
                self.failure_streak = self.failure_streak.saturating_add(1);
                self.stats.prediction_failures += 1;
                if self.failure_streak == self.max_consecutive_failures {
                    warn!(
                        "session degraded: {} consecutive prediction failures (last: {})",
                        self.failure_streak, e
                    );
                } else {
                    warn!("prediction failed: {}", e);
                }
                Ok(self.output(FrameStatus::PredictionFailed(e), None))
            }
        }
    }

    /// フレーム列をまとめて処理する（録画ファイル向け）
    pub fn run<I>(&mut self, frames: I) -> Result<SessionSummary, AnalysisError>
    where
        I: IntoIterator,
        I::Item: Borrow<PoseFrame>,
    {
        for frame in frames {
            self.process(frame.borrow())?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            exercise: self.profile.id(),
            rep_count: self.counter.count(),
            mean_score: self.stats.mean_score(),
            degraded: self.is_degraded(),
            stats: self.stats.clone(),
        }
    }

    /// 窓・カウンタ・統計を初期化（新しいセットの開始）
    pub fn reset(&mut self) {
        self.window.clear();
        self.counter.reset();
        self.failure_streak = 0;
        self.stats = SessionStats::default();
    }

    pub fn profile(&self) -> &'static ExerciseProfile {
        self.profile
    }

    pub fn window(&self) -> &SequenceWindow {
        &self.window
    }

    pub fn rep_count(&self) -> u32 {
        self.counter.count()
    }

    pub fn rep_state(&self) -> RepState {
        self.counter.state()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn is_degraded(&self) -> bool {
        self.failure_streak >= self.max_consecutive_failures
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    fn output(&self, status: FrameStatus, predicted: Option<Vec<f32>>) -> FrameOutput {
        FrameOutput {
            status,
            rep_count: self.counter.count(),
            rep_state: self.counter.state(),
            degraded: self.is_degraded(),
            predicted,
        }
    }
}
