use crate::SamplingStrategy;

/// Tag written into the diagnostic log, one per mirror pixel.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub enum DiagnosticTag {
    /// Slot wasn't written (e.g. diagnostics got disabled, or the workgroup
    /// fell outside of the pixel buffer)
    Skipped,
    SingleFace,
    EdgeCrossing,
    Degenerate,
}

impl DiagnosticTag {
    pub fn from_strategy(strategy: SamplingStrategy) -> Self {
        match strategy {
            SamplingStrategy::Undefined => Self::Degenerate,
            SamplingStrategy::SingleFace => Self::SingleFace,
            SamplingStrategy::EdgeCrossing => Self::EdgeCrossing,
        }
    }

    pub fn serialize(self) -> u32 {
        match self {
            Self::Skipped => 0,
            Self::SingleFace => 1,
            Self::EdgeCrossing => 2,
            Self::Degenerate => 3,
        }
    }

    pub fn deserialize(val: u32) -> Self {
        match val {
            1 => Self::SingleFace,
            2 => Self::EdgeCrossing,
            3 => Self::Degenerate,
            _ => Self::Skipped,
        }
    }
}
