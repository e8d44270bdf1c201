use crate::analysis::DeviationReport;
use crate::error::AnalysisError;
use crate::exercise::ExerciseProfile;
use crate::pose::PoseFrame;

/// 正しい接続の色 (RGB)
pub const CORRECT_COLOR: u32 = 0x00FF00; // 緑

/// 誤差が大きい接続の色 (RGB)
pub const INCORRECT_COLOR: u32 = 0xFF0000; // 赤

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStyle {
    Correct,
    Incorrect,
}

impl ConnectionStyle {
    pub fn color(self) -> u32 {
        match self {
            ConnectionStyle::Correct => CORRECT_COLOR,
            ConnectionStyle::Incorrect => INCORRECT_COLOR,
        }
    }
}

/// プロファイルの骨格接続（連番）ごとの描画スタイル
///
/// どちらかの端点が flagged なら Incorrect。レポートが無ければ全て Correct。
pub fn connection_styles(
    profile: &ExerciseProfile,
    report: Option<&DeviationReport>,
) -> Vec<((usize, usize), ConnectionStyle)> {
    let flagged: Vec<usize> = report
        .map(|r| {
            r.flagged
                .iter()
                .filter_map(|&joint| profile.compact_index(joint))
                .collect()
        })
        .unwrap_or_default();

    profile
        .connections()
        .iter()
        .map(|&(start, end)| {
            let style = if flagged.contains(&start) || flagged.contains(&end) {
                ConnectionStyle::Incorrect
            } else {
                ConnectionStyle::Correct
            };
            ((start, end), style)
        })
        .collect()
}

/// 予測姿勢を画像座標系に重ねるための点列（連番順）
///
/// 予測はワールド座標なので、ワールド座標での差分 (predicted - world) を
/// 画像座標のランドマークに足して表示位置にする
pub fn predicted_landmarks(
    profile: &ExerciseProfile,
    image: &PoseFrame,
    world: &PoseFrame,
    predicted: &[f32],
) -> Result<Vec<[f32; 3]>, AnalysisError> {
    if predicted.len() != profile.frame_len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: profile.frame_len(),
            actual: predicted.len(),
        });
    }

    let mut points = Vec::with_capacity(profile.tracked_joints().len());
    for (i, &joint) in profile.tracked_joints().iter().enumerate() {
        let (Some(actual), Some(world_lm)) = (image.get(joint), world.get(joint)) else {
            return Err(AnalysisError::MissingLandmark(joint.index()));
        };
        let actual = actual.position();
        let world_pos = world_lm.position();
        points.push([
            actual[0] + (predicted[i * 3] - world_pos[0]),
            actual[1] + (predicted[i * 3 + 1] - world_pos[1]),
            actual[2] + (predicted[i * 3 + 2] - world_pos[2]),
        ]);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::JointError;
    use crate::exercise::ExerciseId;
    use crate::pose::LandmarkIndex;

    fn report_with_flags(flagged: Vec<LandmarkIndex>) -> DeviationReport {
        DeviationReport {
            errors: flagged
                .iter()
                .map(|&joint| JointError { joint, distance: 1.0 })
                .collect(),
            flagged,
            mae: 1.0,
            score: -1400.0,
        }
    }

    #[test]
    fn test_no_report_all_correct() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let styles = connection_styles(p, None);
        assert_eq!(styles.len(), p.connections().len());
        assert!(styles.iter().all(|(_, s)| *s == ConnectionStyle::Correct));
    }

    #[test]
    fn test_flagged_wrist_marks_forearm() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let report = report_with_flags(vec![LandmarkIndex::LeftWrist]);
        let styles = connection_styles(p, Some(&report));

        // 左肘(2) - 左手首(4) のみ
        let incorrect: Vec<(usize, usize)> = styles
            .iter()
            .filter(|(_, s)| *s == ConnectionStyle::Incorrect)
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(incorrect, vec![(2, 4)]);
        assert_eq!(ConnectionStyle::Incorrect.color(), INCORRECT_COLOR);
    }

    #[test]
    fn test_predicted_landmarks_offset() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let mut image = PoseFrame::uniform(1.0);
        let world = PoseFrame::uniform(1.0);
        image.set(LandmarkIndex::LeftShoulder, 0.5, 0.5, 0.0, 1.0);

        let mut predicted = vec![0.0; 24];
        predicted[0] = 0.1;
        predicted[1] = -0.2;

        let points = predicted_landmarks(p, &image, &world, &predicted).unwrap();
        assert_eq!(points.len(), 8);
        assert!((points[0][0] - 0.6).abs() < 1e-6);
        assert!((points[0][1] - 0.3).abs() < 1e-6);
        assert_eq!(points[1], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_predicted_landmarks_shape() {
        let p = ExerciseProfile::get(ExerciseId::Squat);
        let frame = PoseFrame::uniform(1.0);
        assert!(matches!(
            predicted_landmarks(p, &frame, &frame, &[0.0; 3]),
            Err(AnalysisError::ShapeMismatch { expected: 24, actual: 3 })
        ));
    }

    #[test]
    fn test_predicted_landmarks_missing_joint() {
        let p = ExerciseProfile::get(ExerciseId::Curl);
        let image = PoseFrame::uniform(1.0);
        let mut world = PoseFrame::new(Vec::new());
        for &joint in &p.tracked_joints()[..4] {
            world.set(joint, 0.0, 0.0, 0.0, 1.0);
        }
        // 連番4 = 左手首が world に無い
        assert_eq!(
            predicted_landmarks(p, &image, &world, &[0.0; 24]),
            Err(AnalysisError::MissingLandmark(15))
        );
    }
}
