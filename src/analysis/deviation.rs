use nalgebra::Vector3;
use serde::Serialize;

use crate::error::AnalysisError;
use crate::exercise::ExerciseProfile;
use crate::pose::{LandmarkIndex, PoseFrame};

/// スコアの二次ペナルティ係数
pub const SCORE_PENALTY: f32 = 15.0;

/// 1ランドマーク分の誤差
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointError {
    pub joint: LandmarkIndex,
    /// 実測と予測のユークリッド距離
    pub distance: f32,
}

/// 1フレーム分の偏差レポート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationReport {
    /// 追跡ランドマークごとの誤差（プロファイル順）
    pub errors: Vec<JointError>,
    /// 誤差が閾値を超えたランドマーク
    pub flagged: Vec<LandmarkIndex>,
    /// 平均誤差（距離が1つもなければ 0）
    pub mae: f32,
    /// 総合スコア（クランプしない）
    pub score: f32,
}

impl DeviationReport {
    pub fn error_for(&self, joint: LandmarkIndex) -> Option<f32> {
        self.errors
            .iter()
            .find(|e| e.joint == joint)
            .map(|e| e.distance)
    }

    pub fn is_flagged(&self, joint: LandmarkIndex) -> bool {
        self.flagged.contains(&joint)
    }
}

/// 平均誤差からスコアを計算
///
/// mae == 0 なら 100、それ以外は 100 * (1 - 15 * mae²)。
/// [0, 100] にクランプしないため mae が大きいと負になる。
pub fn performance_score(mae: f32) -> f32 {
    if mae == 0.0 {
        100.0
    } else {
        100.0 * (1.0 - SCORE_PENALTY * mae * mae)
    }
}

/// 実測ランドマークと予測ベクトルを比較する
///
/// 座標系の正規化はしない（実測と予測は同じ座標系である前提）。
/// フレームに無い追跡ランドマークは距離を計算せずスキップする。
pub fn score(
    profile: &ExerciseProfile,
    frame: &PoseFrame,
    predicted: &[f32],
    error_threshold: f32,
) -> Result<DeviationReport, AnalysisError> {
    if predicted.len() != profile.frame_len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: profile.frame_len(),
            actual: predicted.len(),
        });
    }

    let mut errors = Vec::with_capacity(profile.tracked_joints().len());
    let mut flagged = Vec::new();

    for (i, &joint) in profile.tracked_joints().iter().enumerate() {
        let Some(lm) = frame.get(joint) else {
            continue;
        };
        let observed = Vector3::new(lm.x, lm.y, lm.z);
        let expected = Vector3::new(predicted[i * 3], predicted[i * 3 + 1], predicted[i * 3 + 2]);
        let distance = (observed - expected).norm();

        errors.push(JointError { joint, distance });
        if distance > error_threshold {
            flagged.push(joint);
        }
    }

    let mae = if errors.is_empty() {
        0.0
    } else {
        errors.iter().map(|e| e.distance).sum::<f32>() / errors.len() as f32
    };

    Ok(DeviationReport {
        errors,
        flagged,
        mae,
        score: performance_score(mae),
    })
}
