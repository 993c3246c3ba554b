use crate::{FitOutcome, LaneFit};
use serde::{Deserialize, Serialize};

/// Last accepted lane state, owned by the caller and threaded through frames.
///
/// Starts at zero curves and zero bases. Always holds a fit for both sides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneMemory {
    pub left_fit: LaneFit,
    pub right_fit: LaneFit,
    pub left_base_x: usize,
    pub right_base_x: usize,
}

impl LaneMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// State after a frame: fitted sides take this frame's curve and seed,
    /// sides that fell back keep the remembered ones.
    ///
    /// A fallback side does not take this frame's histogram base either, even
    /// though the base is always computed. An empty frame therefore leaves the
    /// memory exactly as it was.
    pub fn advance(
        &self,
        left: &FitOutcome,
        right: &FitOutcome,
        left_base_x: usize,
        right_base_x: usize,
    ) -> Self {
        let (left_fit, left_base_x) = match left {
            FitOutcome::Fitted(fit) => (*fit, left_base_x),
            FitOutcome::Fallback(_) => (self.left_fit, self.left_base_x),
        };
        let (right_fit, right_base_x) = match right {
            FitOutcome::Fitted(fit) => (*fit, right_base_x),
            FitOutcome::Fallback(_) => (self.right_fit, self.right_base_x),
        };
        Self {
            left_fit,
            right_fit,
            left_base_x,
            right_base_x,
        }
    }
}
