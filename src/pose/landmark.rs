use serde::{Deserialize, Serialize};

use crate::exercise::Axis;

/// MediaPipe Pose の 33 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// 単一ランドマーク（姿勢推定器の出力1点分）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// MediaPipe のランドマーク番号
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// 可視度スコア（大きいほど信頼できる）
    pub visibility: f32,
}

impl Landmark {
    pub fn new(id: usize, x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { id, x, y, z, visibility }
    }

    /// 可視度が閾値以上か
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }

    /// 指定軸の座標値
    pub fn coord(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// 1フレーム分の姿勢推定結果
///
/// 通常は33点が番号順に並ぶが、欠けや順不同も許容する
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// 全ランドマークを同じ可視度で埋めたフレーム（座標は原点）
    pub fn uniform(visibility: f32) -> Self {
        let landmarks = (0..LandmarkIndex::COUNT)
            .map(|id| Landmark::new(id, 0.0, 0.0, 0.0, visibility))
            .collect();
        Self { landmarks }
    }

    /// ランドマーク番号で取得
    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        let id = index.index();
        // 番号順に並んでいれば O(1)
        match self.landmarks.get(id) {
            Some(lm) if lm.id == id => Some(lm),
            _ => self.landmarks.iter().find(|lm| lm.id == id),
        }
    }

    pub fn get_mut(&mut self, index: LandmarkIndex) -> Option<&mut Landmark> {
        let id = index.index();
        if matches!(self.landmarks.get(id), Some(lm) if lm.id == id) {
            return self.landmarks.get_mut(id);
        }
        self.landmarks.iter_mut().find(|lm| lm.id == id)
    }

    /// 座標を上書き（存在しない番号は追加）
    pub fn set(&mut self, index: LandmarkIndex, x: f32, y: f32, z: f32, visibility: f32) {
        match self.get_mut(index) {
            Some(lm) => *lm = Landmark::new(index.index(), x, y, z, visibility),
            None => self
                .landmarks
                .push(Landmark::new(index.index(), x, y, z, visibility)),
        }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}
