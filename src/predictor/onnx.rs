use ndarray::Array3;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use super::Predictor;
use crate::analysis::SequenceWindow;
use crate::error::PredictError;
use crate::exercise::ExerciseProfile;

fn build_session(model_path: &Path) -> ort::Result<Session> {
    let builder = Session::builder()?.with_optimization_level(GraphOptimizationLevel::Level3)?;

    #[cfg(feature = "cuda")]
    let builder = {
        tracing::info!("[ort] Attempting CUDA execution provider...");
        builder.with_execution_providers([
            ort::execution_providers::CUDAExecutionProvider::default().build(),
        ])?
    };

    builder.commit_from_file(model_path)
}

/// ONNX の系列モデルを使った予測器
///
/// 入力: [1, N, 3J] の f32 テンソル
/// 出力: [1, 3J]（先頭行を予測 FrameVector として使う）
pub struct OnnxPredictor {
    session: Session,
    input_name: String,
    output_name: String,
}

impl OnnxPredictor {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self, PredictError> {
        let model_path = model_path.as_ref();
        let session = build_session(model_path).map_err(|e| {
            PredictError::ModelUnavailable(format!("{}: {}", model_path.display(), e))
        })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| PredictError::ModelUnavailable("model has no inputs".to_string()))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| PredictError::ModelUnavailable("model has no outputs".to_string()))?;

        tracing::info!(
            "loaded model {} (input: {}, output: {})",
            model_path.display(),
            input_name,
            output_name
        );

        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }

    /// `<model_dir>/<model_id>.onnx` を読み込む
    pub fn for_profile<P: AsRef<Path>>(
        model_dir: P,
        profile: &ExerciseProfile,
    ) -> Result<Self, PredictError> {
        let path = model_dir.as_ref().join(format!("{}.onnx", profile.model_id()));
        Self::new(path)
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&mut self, window: &SequenceWindow) -> Result<Vec<f32>, PredictError> {
        let input = Array3::from_shape_vec((1, window.len(), window.frame_len()), window.as_flat())
            .map_err(|e| PredictError::InferenceError(e.to_string()))?;
        let input_tensor =
            Tensor::from_array(input).map_err(|e| PredictError::InferenceError(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| PredictError::InferenceError(e.to_string()))?;

        let output: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .map_err(|e| PredictError::InferenceError(format!("failed to extract output: {e}")))?;

        Ok(output.iter().copied().collect())
    }
}
