use super::landmark::LandmarkIndex;

/// 全身の骨格接続定義 (開始ランドマーク, 終了ランドマーク)
///
/// MediaPipe Pose の POSE_CONNECTIONS と同じ35本
pub const POSE_CONNECTIONS: [(LandmarkIndex, LandmarkIndex); 35] = {
    use LandmarkIndex::*;
    [
        // 顔
        (Nose, LeftEyeInner),
        (LeftEyeInner, LeftEye),
        (LeftEye, LeftEyeOuter),
        (LeftEyeOuter, LeftEar),
        (Nose, RightEyeInner),
        (RightEyeInner, RightEye),
        (RightEye, RightEyeOuter),
        (RightEyeOuter, RightEar),
        (MouthLeft, MouthRight),
        // 上半身
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (LeftWrist, LeftPinky),
        (LeftWrist, LeftIndex),
        (LeftWrist, LeftThumb),
        (LeftPinky, LeftIndex),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (RightWrist, RightPinky),
        (RightWrist, RightIndex),
        (RightWrist, RightThumb),
        (RightPinky, RightIndex),
        // 胴体
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
        (LeftHip, RightHip),
        // 下半身
        (LeftHip, LeftKnee),
        (RightHip, RightKnee),
        (LeftKnee, LeftAnkle),
        (RightKnee, RightAnkle),
        (LeftAnkle, LeftHeel),
        (RightAnkle, RightHeel),
        (LeftHeel, LeftFootIndex),
        (RightHeel, RightFootIndex),
        (LeftAnkle, LeftFootIndex),
        (RightAnkle, RightFootIndex),
    ]
};
