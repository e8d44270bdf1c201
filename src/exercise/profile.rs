use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::pose::{LandmarkIndex, PoseFrame, POSE_CONNECTIONS};

/// 対応種目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseId {
    Curl,
    Squat,
    Deadlift,
}

impl ExerciseId {
    pub const ALL: [ExerciseId; 3] = [ExerciseId::Curl, ExerciseId::Squat, ExerciseId::Deadlift];

    /// 旧来の数値ID (1: カール, 2: スクワット, 3: デッドリフト)
    pub fn from_number(number: u32) -> Result<Self, AnalysisError> {
        match number {
            1 => Ok(ExerciseId::Curl),
            2 => Ok(ExerciseId::Squat),
            3 => Ok(ExerciseId::Deadlift),
            _ => Err(AnalysisError::UnknownExercise(number.to_string())),
        }
    }

    pub fn number(self) -> u32 {
        match self {
            ExerciseId::Curl => 1,
            ExerciseId::Squat => 2,
            ExerciseId::Deadlift => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseId::Curl => "curl",
            ExerciseId::Squat => "squat",
            ExerciseId::Deadlift => "deadlift",
        }
    }
}

impl FromStr for ExerciseId {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "curl" | "biceps_curl" | "barbell_biceps_curl" => Ok(ExerciseId::Curl),
            "squat" | "squats" => Ok(ExerciseId::Squat),
            "deadlift" | "deadlifts" => Ok(ExerciseId::Deadlift),
            _ => match key.parse::<u32>() {
                Ok(number) => Self::from_number(number),
                Err(_) => Err(AnalysisError::UnknownExercise(s.to_string())),
            },
        }
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// レップ検出に使う座標軸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// 種目ごとの静的設定
struct ProfileDef {
    id: ExerciseId,
    name: &'static str,
    model_id: &'static str,
    tracked: &'static [LandmarkIndex],
    rep_joint: LandmarkIndex,
    axis: Axis,
    min_threshold: f32,
    max_threshold: f32,
}

const PROFILE_DEFS: [ProfileDef; 3] = {
    use LandmarkIndex::*;
    [
        ProfileDef {
            id: ExerciseId::Curl,
            name: "Barbell Biceps Curl",
            model_id: "barbell_biceps_curl",
            tracked: &[
                LeftShoulder, RightShoulder, LeftElbow, RightElbow,
                LeftWrist, RightWrist, LeftHip, RightHip,
            ],
            rep_joint: LeftWrist,
            axis: Axis::Y,
            min_threshold: -0.15,
            max_threshold: -0.3,
        },
        ProfileDef {
            id: ExerciseId::Squat,
            name: "Squats",
            model_id: "squats",
            tracked: &[
                LeftShoulder, RightShoulder, LeftHip, RightHip,
                LeftKnee, RightKnee, LeftAnkle, RightAnkle,
            ],
            // 他の種目と違い左手首ではなく左足首で数える。
            // スクワットでは手首が上下せず、腰中心のワールド座標では腰も動かない
            rep_joint: LeftAnkle,
            axis: Axis::Y,
            min_threshold: 0.6,
            max_threshold: 0.6,
        },
        ProfileDef {
            id: ExerciseId::Deadlift,
            name: "Deadlift",
            model_id: "deadlift",
            tracked: &[
                LeftShoulder, RightShoulder, LeftElbow, RightElbow,
                LeftWrist, RightWrist, LeftHip, RightHip,
                LeftKnee, RightKnee, LeftAnkle, RightAnkle,
            ],
            rep_joint: LeftWrist,
            axis: Axis::Y,
            min_threshold: 0.6,
            max_threshold: 0.6,
        },
    ]
};

/// 種目プロファイル（読み取り専用）
///
/// - `tracked`: FrameVector のレイアウトを決める追跡ランドマーク（順序付き）
/// - `index_mapping`: ランドマーク番号 → FrameVector 内の連番
/// - `connections`: 追跡ランドマーク同士の骨格接続（連番で表現、描画用）
///
/// `max_threshold` は `<` で動作の「下端」を、`min_threshold` は `>` で「上端」を検出する。
/// 種目によっては max < min になるが、名前どおりの大小関係ではなく独立した較正値として扱う。
#[derive(Debug)]
pub struct ExerciseProfile {
    id: ExerciseId,
    name: &'static str,
    model_id: &'static str,
    tracked: Vec<LandmarkIndex>,
    index_mapping: [Option<usize>; LandmarkIndex::COUNT],
    connections: Vec<(usize, usize)>,
    rep_joint: LandmarkIndex,
    axis: Axis,
    min_threshold: f32,
    max_threshold: f32,
}

static PROFILES: OnceLock<Vec<ExerciseProfile>> = OnceLock::new();

impl ExerciseProfile {
    fn build(def: &ProfileDef) -> Self {
        let mut index_mapping = [None; LandmarkIndex::COUNT];
        for (compact, joint) in def.tracked.iter().enumerate() {
            index_mapping[joint.index()] = Some(compact);
        }

        // 両端が追跡対象の接続だけ残して連番に振り直す
        let connections = POSE_CONNECTIONS
            .iter()
            .filter_map(|&(start, end)| {
                Some((index_mapping[start.index()]?, index_mapping[end.index()]?))
            })
            .collect();

        debug_assert!(index_mapping[def.rep_joint.index()].is_some());

        Self {
            id: def.id,
            name: def.name,
            model_id: def.model_id,
            tracked: def.tracked.to_vec(),
            index_mapping,
            connections,
            rep_joint: def.rep_joint,
            axis: def.axis,
            min_threshold: def.min_threshold,
            max_threshold: def.max_threshold,
        }
    }

    fn registry() -> &'static [ExerciseProfile] {
        PROFILES.get_or_init(|| PROFILE_DEFS.iter().map(Self::build).collect())
    }

    /// 種目IDからプロファイルを取得
    pub fn get(id: ExerciseId) -> &'static ExerciseProfile {
        // PROFILE_DEFS は ExerciseId::ALL と同じ順序
        let slot = match id {
            ExerciseId::Curl => 0,
            ExerciseId::Squat => 1,
            ExerciseId::Deadlift => 2,
        };
        &Self::registry()[slot]
    }

    /// 種目名（または旧数値ID）からプロファイルを取得
    pub fn lookup(name: &str) -> Result<&'static ExerciseProfile, AnalysisError> {
        let id: ExerciseId = name.parse()?;
        Ok(Self::get(id))
    }

    pub fn all() -> &'static [ExerciseProfile] {
        Self::registry()
    }

    pub fn id(&self) -> ExerciseId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn model_id(&self) -> &'static str {
        self.model_id
    }

    pub fn tracked_joints(&self) -> &[LandmarkIndex] {
        &self.tracked
    }

    /// FrameVector の長さ (3 × 追跡ランドマーク数)
    pub fn frame_len(&self) -> usize {
        self.tracked.len() * 3
    }

    /// ランドマーク番号 → FrameVector 内の連番
    pub fn compact_index(&self, joint: LandmarkIndex) -> Option<usize> {
        self.index_mapping[joint.index()]
    }

    pub fn connections(&self) -> &[(usize, usize)] {
        &self.connections
    }

    pub fn rep_joint(&self) -> LandmarkIndex {
        self.rep_joint
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn min_threshold(&self) -> f32 {
        self.min_threshold
    }

    pub fn max_threshold(&self) -> f32 {
        self.max_threshold
    }

    /// 追跡ランドマークの (x, y, z) を平坦化した FrameVector を作る
    ///
    /// 追跡ランドマークが1つでも欠けていれば None
    pub fn frame_vector(&self, frame: &PoseFrame) -> Option<Vec<f32>> {
        let mut data = Vec::with_capacity(self.frame_len());
        for &joint in &self.tracked {
            let lm = frame.get(joint)?;
            data.extend_from_slice(&[lm.x, lm.y, lm.z]);
        }
        Some(data)
    }
}
