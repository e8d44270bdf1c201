use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::AnalysisError;
use crate::exercise::ExerciseId;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

/// 種目の指定（名前 or 旧数値ID）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExerciseRef {
    Number(u32),
    Name(String),
}

impl ExerciseRef {
    pub fn resolve(&self) -> Result<ExerciseId, AnalysisError> {
        match self {
            ExerciseRef::Number(n) => ExerciseId::from_number(*n),
            ExerciseRef::Name(name) => name.parse(),
        }
    }
}

impl From<ExerciseId> for ExerciseRef {
    fn from(id: ExerciseId) -> Self {
        ExerciseRef::Name(id.as_str().to_string())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// 種目 ("curl" / "squat" / "deadlift" または 1〜3)
    #[serde(default = "default_exercise")]
    pub exercise: ExerciseRef,
    /// 予測に使うフレーム数 N
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,
    /// ランドマーク誤差の閾値
    #[serde(default = "default_error_threshold")]
    pub error_threshold: f32,
    /// 可視度の閾値（範囲は検証しない）
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,
    /// 予測姿勢のオーバーレイを出力するか
    #[serde(default = "default_draw_predicted_lm")]
    pub draw_predicted_lm: bool,
    /// 予測失敗がこの回数連続したらセッションを劣化扱いにする
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

fn default_exercise() -> ExerciseRef { ExerciseRef::Name("curl".to_string()) }
fn default_sequence_length() -> usize { 10 }
fn default_error_threshold() -> f32 { 0.1 }
fn default_visibility_threshold() -> f32 { 0.5 }
fn default_draw_predicted_lm() -> bool { true }
fn default_max_consecutive_failures() -> u32 { 5 }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exercise: default_exercise(),
            sequence_length: default_sequence_length(),
            error_threshold: default_error_threshold(),
            visibility_threshold: default_visibility_threshold(),
            draw_predicted_lm: default_draw_predicted_lm(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

impl SessionConfig {
    /// 種目だけ指定し、他はデフォルト
    pub fn for_exercise(id: ExerciseId) -> Self {
        Self {
            exercise: id.into(),
            ..Self::default()
        }
    }

    /// 値を検証して種目IDを返す
    pub fn validate(&self) -> Result<ExerciseId, AnalysisError> {
        let id = self.exercise.resolve()?;
        if self.sequence_length == 0 {
            return Err(AnalysisError::InvalidConfig(
                "sequence_length must be positive".to_string(),
            ));
        }
        if !self.error_threshold.is_finite() || self.error_threshold < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "error_threshold must be a non-negative number, got {}",
                self.error_threshold
            )));
        }
        if self.max_consecutive_failures == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_consecutive_failures must be positive".to_string(),
            ));
        }
        Ok(id)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// ONNXモデルの置き場 (<dir>/<model_id>.onnx)
    #[serde(default = "default_model_dir")]
    pub dir: String,
}

fn default_model_dir() -> String { "model".to_string() }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// 読めなければデフォルト
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }
}
