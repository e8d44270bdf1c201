use std::collections::VecDeque;

use crate::error::AnalysisError;

/// 予測モデルへ渡す固定長のスライディング窓
///
/// FrameVector を古い順に保持する。長さが容量 N に達したら ready。
/// 予測後に `evict_oldest` で N-1 に戻すので、暖機後は受理フレームごとに予測できる。
#[derive(Debug, Clone)]
pub struct SequenceWindow {
    frames: VecDeque<Vec<f32>>,
    capacity: usize,
    frame_len: usize,
}

impl SequenceWindow {
    pub fn new(capacity: usize, frame_len: usize) -> Result<Self, AnalysisError> {
        if capacity == 0 {
            return Err(AnalysisError::InvalidConfig(
                "sequence_length must be positive".to_string(),
            ));
        }
        if frame_len == 0 {
            return Err(AnalysisError::InvalidConfig(
                "frame vector must not be empty".to_string(),
            ));
        }
        Ok(Self {
            frames: VecDeque::new(),
            capacity,
            frame_len,
        })
    }

    /// 末尾に追加し、長さが N になったら true を返す
    ///
    /// 満杯のまま呼ばれた場合（前回の予測が失敗して evict されなかった）は
    /// 先に最古を捨てるので長さは N を超えない
    pub fn push(&mut self, frame: Vec<f32>) -> Result<bool, AnalysisError> {
        if frame.len() != self.frame_len {
            return Err(AnalysisError::ShapeMismatch {
                expected: self.frame_len,
                actual: frame.len(),
            });
        }
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        Ok(self.is_ready())
    }

    /// 最古のフレームを捨てる
    pub fn evict_oldest(&mut self) -> Option<Vec<f32>> {
        self.frames.pop_front()
    }

    pub fn is_ready(&self) -> bool {
        self.frames.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// 古い順に走査
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.frames.iter().map(Vec::as_slice)
    }

    /// 古い順の平坦化データ (len × frame_len)
    pub fn as_flat(&self) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.frames.len() * self.frame_len);
        for frame in &self.frames {
            result.extend_from_slice(frame);
        }
        result
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
