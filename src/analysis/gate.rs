//! Visibility gate
//!
//! 追跡ランドマークが1点でも閾値未満のフレームは窓にもレップ判定にも入れない。
//! 却下時に窓の中身はリセットしないので、遮蔽の前後のフレームが同じ窓に混ざりうる。

use crate::exercise::ExerciseProfile;
use crate::pose::PoseFrame;

/// 全追跡ランドマークの可視度が閾値以上なら true
///
/// フレームに存在しない追跡ランドマークは不可視扱い
pub fn admit(frame: &PoseFrame, profile: &ExerciseProfile, visibility_threshold: f32) -> bool {
    profile
        .tracked_joints()
        .iter()
        .all(|&joint| frame.get(joint).is_some_and(|lm| lm.is_visible(visibility_threshold)))
}

/// 閾値を保持するゲート
#[derive(Debug, Clone, Copy)]
pub struct VisibilityGate {
    threshold: f32,
}

impl VisibilityGate {
    /// 閾値は範囲検証しない（負値なら常に通過、1超なら常に却下）
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn admit(&self, frame: &PoseFrame, profile: &ExerciseProfile) -> bool {
        admit(frame, profile, self.threshold)
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::ExerciseId;
    use crate::pose::LandmarkIndex;

    #[test]
    fn test_all_visible() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let frame = PoseFrame::uniform(0.9);
        assert!(admit(&frame, p, 0.5));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let frame = PoseFrame::uniform(0.5);
        assert!(admit(&frame, p, 0.5));
        assert!(!admit(&frame, p, 0.51));
    }

    #[test]
    fn test_single_occluded_tracked_joint_rejects() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let mut frame = PoseFrame::uniform(0.9);
        frame.set(LandmarkIndex::RightElbow, 0.0, 0.0, 0.0, 0.2);
        assert!(!admit(&frame, p, 0.5));
    }

    #[test]
    fn test_untracked_joint_is_ignored() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let mut frame = PoseFrame::uniform(0.9);
        // 膝はカールの追跡対象外
        frame.set(LandmarkIndex::LeftKnee, 0.0, 0.0, 0.0, 0.0);
        assert!(admit(&frame, p, 0.5));
        // スクワットでは追跡対象
        assert!(!admit(&frame, ExerciseProfile::get(ExerciseId::Squat), 0.5));
    }

    #[test]
    fn test_missing_joint_rejects() {
        let p = ExerciseProfile::get(ExerciseId::Deadlift);
        let mut frame = PoseFrame::uniform(1.0);
        frame.landmarks.retain(|lm| lm.id != LandmarkIndex::LeftAnkle.index());
        assert!(!admit(&frame, p, 0.0));
    }

    #[test]
    fn test_unbounded_threshold() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let frame = PoseFrame::uniform(-3.0);
        assert!(VisibilityGate::new(-10.0).admit(&frame, p));
        assert!(!VisibilityGate::new(10.0).admit(&PoseFrame::uniform(1.0), p));
    }

    #[test]
    fn test_nan_visibility_rejects() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let frame = PoseFrame::uniform(f32::NAN);
        assert!(!VisibilityGate::default().admit(&frame, p));
    }

    #[test]
    fn test_default_threshold() {
        assert_eq!(VisibilityGate::default().threshold(), 0.5);
        assert_eq!(VisibilityGate::new(0.8).threshold(), 0.8);
    }
}
