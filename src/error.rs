use thiserror::Error;

/// 予測モデル呼び出しのエラー
///
/// フレーム単位で回復される（そのフレームの採点・カウントのみスキップ）
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// モデルが読み込めない / 利用できない
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// 推論に失敗した
    #[error("inference failed: {0}")]
    InferenceError(String),
}

/// 解析エンジンのエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// 未対応の種目ID（セッション開始時に致命的）
    #[error("unknown exercise: {0}")]
    UnknownExercise(String),

    /// 設定値が不正
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// ベクトル長がプロファイルのレイアウトと一致しない（呼び出し側の契約違反）
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// 必要なランドマークがフレームに含まれていない
    #[error("landmark {0} missing from frame")]
    MissingLandmark(usize),

    #[error(transparent)]
    Prediction(#[from] PredictError),
}
