use serde::Serialize;

use crate::exercise::{Axis, ExerciseProfile};
use crate::pose::{LandmarkIndex, PoseFrame};

/// レップ判定の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RepState {
    /// まだ観測なし
    #[default]
    Unknown,
    Down,
    Up,
}

/// 2閾値ヒステリシスによるレップカウンタ
///
/// 1フレームごとに値 v で評価する:
/// - v < max_threshold → Down
/// - それ以外で v > min_threshold かつ Down → Up、カウント +1
/// - それ以外は変化なし
///
/// 閾値の名前は大小関係を表さない。max_threshold が下端、min_threshold が上端の検出に使われる。
#[derive(Debug, Clone)]
pub struct RepetitionCounter {
    axis: Axis,
    min_threshold: f32,
    max_threshold: f32,
    state: RepState,
    count: u32,
}

impl RepetitionCounter {
    pub fn new(axis: Axis, min_threshold: f32, max_threshold: f32) -> Self {
        Self {
            axis,
            min_threshold,
            max_threshold,
            state: RepState::Unknown,
            count: 0,
        }
    }

    /// 単一閾値（上端・下端に同じ値を使う）
    pub fn with_threshold(axis: Axis, threshold: f32) -> Self {
        Self::new(axis, threshold, threshold)
    }

    /// プロファイルの軸と閾値から作成
    pub fn from_profile(profile: &ExerciseProfile) -> Self {
        Self::new(profile.axis(), profile.min_threshold(), profile.max_threshold())
    }

    /// 値を1つ入力して状態を更新
    pub fn update(&mut self, value: f32) -> RepState {
        if value < self.max_threshold {
            self.state = RepState::Down;
        } else if value > self.min_threshold && self.state == RepState::Down {
            self.state = RepState::Up;
            self.count += 1;
        }
        self.state
    }

    /// フレームから指定ランドマークの軸の値を取り出して更新
    ///
    /// ランドマークが無ければ何もしない
    pub fn update_from_frame(&mut self, frame: &PoseFrame, joint: LandmarkIndex) -> RepState {
        match frame.get(joint) {
            Some(lm) => self.update(lm.coord(self.axis)),
            None => self.state,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn state(&self) -> RepState {
        self.state
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn reset(&mut self) {
        self.state = RepState::Unknown;
        self.count = 0;
    }
}

impl Default for RepetitionCounter {
    fn default() -> Self {
        Self::with_threshold(Axis::Y, 0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::ExerciseId;
    use proptest::prelude::*;

    fn curl_counter() -> RepetitionCounter {
        RepetitionCounter::from_profile(ExerciseProfile::get(ExerciseId::Curl))
    }

    #[test]
    fn test_initial_state() {
        let c = curl_counter();
        assert_eq!(c.state(), RepState::Unknown);
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn test_curl_scenario() {
        let mut c = curl_counter();
        let states: Vec<(RepState, u32)> = [-0.4, -0.4, -0.1, -0.4, -0.1]
            .iter()
            .map(|&v| (c.update(v), c.count()))
            .collect();
        assert_eq!(
            states,
            vec![
                (RepState::Down, 0),
                (RepState::Down, 0),
                (RepState::Up, 1),
                (RepState::Down, 1),
                (RepState::Up, 2),
            ]
        );
    }

    #[test]
    fn test_up_without_down_does_not_count() {
        let mut c = curl_counter();
        assert_eq!(c.update(-0.1), RepState::Unknown);
        assert_eq!(c.update(0.5), RepState::Unknown);
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn test_repeated_top_does_not_double_count() {
        let mut c = curl_counter();
        c.update(-0.4);
        c.update(-0.1);
        c.update(-0.05);
        c.update(0.0);
        assert_eq!(c.count(), 1);
        assert_eq!(c.state(), RepState::Up);
    }

    #[test]
    fn test_band_oscillation_never_counts() {
        // カールの帯は [-0.3, -0.15]
        let mut c = curl_counter();
        c.update(-0.4);
        for v in [-0.2, -0.25, -0.16, -0.29, -0.15, -0.3] {
            c.update(v);
        }
        assert_eq!(c.count(), 0);
        assert_eq!(c.state(), RepState::Down);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let mut c = curl_counter();
        // -0.3 は < -0.3 を満たさない
        assert_eq!(c.update(-0.3), RepState::Unknown);
        c.update(-0.31);
        // -0.15 は > -0.15 を満たさない
        assert_eq!(c.update(-0.15), RepState::Down);
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn test_single_threshold() {
        let mut c = RepetitionCounter::with_threshold(Axis::Y, 0.6);
        c.update(0.5);
        c.update(0.6); // 帯幅ゼロ: 0.6 はどちらも満たさない
        assert_eq!(c.count(), 0);
        c.update(0.7);
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn test_default_counter() {
        let mut c = RepetitionCounter::default();
        assert_eq!(c.axis(), Axis::Y);
        assert_eq!(c.update(0.05), RepState::Down);
        assert_eq!(c.update(0.1), RepState::Down);
        assert_eq!(c.update(0.15), RepState::Up);
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn test_nan_is_ignored() {
        let mut c = curl_counter();
        c.update(-0.4);
        assert_eq!(c.update(f32::NAN), RepState::Down);
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn test_update_from_frame_uses_axis() {
        let mut c = RepetitionCounter::new(Axis::Z, 0.5, 0.0);
        let mut frame = PoseFrame::uniform(1.0);
        frame.set(LandmarkIndex::LeftWrist, 9.0, 9.0, -1.0, 1.0);
        assert_eq!(c.update_from_frame(&frame, LandmarkIndex::LeftWrist), RepState::Down);
        frame.set(LandmarkIndex::LeftWrist, -9.0, -9.0, 1.0, 1.0);
        assert_eq!(c.update_from_frame(&frame, LandmarkIndex::LeftWrist), RepState::Up);
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn test_update_from_frame_missing_joint() {
        let mut c = curl_counter();
        c.update(-0.4);
        let frame = PoseFrame::default();
        assert_eq!(c.update_from_frame(&frame, LandmarkIndex::LeftWrist), RepState::Down);
    }

    #[test]
    fn test_reset() {
        let mut c = curl_counter();
        c.update(-0.4);
        c.update(-0.1);
        c.reset();
        assert_eq!(c.state(), RepState::Unknown);
        assert_eq!(c.count(), 0);
    }

    /// ルールを素直に数え直した参照値
    fn expected_count(values: &[f32], min: f32, max: f32) -> u32 {
        let mut down = false;
        let mut count = 0;
        for &v in values {
            if v < max {
                down = true;
            } else if v > min && down {
                down = false;
                count += 1;
            }
        }
        count
    }

    proptest! {
        #[test]
        fn prop_count_matches_down_up_transitions(
            values in proptest::collection::vec(-1.0f32..1.0, 0..200),
            min in -0.5f32..0.5,
            max in -0.5f32..0.5,
        ) {
            let mut c = RepetitionCounter::new(Axis::Y, min, max);
            let mut prev = c.count();
            for &v in &values {
                c.update(v);
                prop_assert!(c.count() >= prev);
                prev = c.count();
            }
            prop_assert_eq!(c.count(), expected_count(&values, min, max));
        }

        #[test]
        fn prop_in_band_values_never_count(
            values in proptest::collection::vec(-0.3f32..=-0.15, 0..100),
        ) {
            let mut c = curl_counter();
            c.update(-0.4);
            for &v in &values {
                c.update(v);
            }
            prop_assert_eq!(c.count(), 0);
        }
    }
}
