#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::OnnxPredictor;

use crate::analysis::SequenceWindow;
use crate::error::PredictError;

/// 「正しいフォーム」を予測する外部モデル
///
/// 入力は長さ N の窓（ready 状態）、出力は FrameVector と同じ長さのベクトル
pub trait Predictor {
    fn predict(&mut self, window: &SequenceWindow) -> Result<Vec<f32>, PredictError>;
}

impl<F> Predictor for F
where
    F: FnMut(&SequenceWindow) -> Result<Vec<f32>, PredictError>,
{
    fn predict(&mut self, window: &SequenceWindow) -> Result<Vec<f32>, PredictError> {
        self(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<P: Predictor>(predictor: &mut P, window: &SequenceWindow) -> Result<Vec<f32>, PredictError> {
        predictor.predict(window)
    }

    #[test]
    fn test_closure_predictor() {
        let mut window = SequenceWindow::new(2, 3).unwrap();
        window.push(vec![1.0, 2.0, 3.0]).unwrap();
        window.push(vec![4.0, 5.0, 6.0]).unwrap();

        // 最新フレームをそのまま返す
        let mut last = |w: &SequenceWindow| -> Result<Vec<f32>, PredictError> {
            w.iter()
                .last()
                .map(<[f32]>::to_vec)
                .ok_or_else(|| PredictError::InferenceError("empty window".to_string()))
        };
        assert_eq!(run(&mut last, &window).unwrap(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_closure_predictor_error() {
        let window = SequenceWindow::new(1, 3).unwrap();
        let mut unavailable = |_: &SequenceWindow| -> Result<Vec<f32>, PredictError> {
            Err(PredictError::ModelUnavailable("model/curl.onnx".to_string()))
        };
        assert_eq!(
            run(&mut unavailable, &window),
            Err(PredictError::ModelUnavailable("model/curl.onnx".to_string()))
        );
    }
}
