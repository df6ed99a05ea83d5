use glam::Vec4;

/// Law used to combine the primary cubemap's sample with samples of the
/// accumulation cubemaps.
///
/// Layers are always visited front to back: primary first, then accumulation
/// cubemaps in their binding order.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub enum BlendMode {
    /// Arithmetic mean of all active layers.
    #[default]
    Average,

    /// Mean weighted with `primary_weight` and `accumulation_weights`; falls
    /// back to the primary layer when the weights sum up to zero.
    Weighted,

    /// Each layer is composited over the running result using its own alpha.
    AlphaOver,

    /// Last layer with a non-zero alpha wins; primary is used when no layer
    /// covers given direction.
    NearestWins,
}

impl BlendMode {
    pub fn serialize(self) -> u32 {
        match self {
            Self::Average => 0,
            Self::Weighted => 1,
            Self::AlphaOver => 2,
            Self::NearestWins => 3,
        }
    }

    /// Unknown values decode as [`BlendMode::Average`].
    pub fn deserialize(val: u32) -> Self {
        match val {
            1 => Self::Weighted,
            2 => Self::AlphaOver,
            3 => Self::NearestWins,
            _ => Self::Average,
        }
    }
}

/// Running blend of layer samples.
#[derive(Clone, Copy)]
pub struct BlendAccumulator {
    mode: BlendMode,
    primary: Vec4,
    color: Vec4,
    weight_sum: f32,
}

impl BlendAccumulator {
    pub fn new(mode: BlendMode, primary: Vec4, primary_weight: f32) -> Self {
        let (color, weight_sum) = match mode {
            BlendMode::Average => (primary, 1.0),
            BlendMode::Weighted => (primary * primary_weight, primary_weight),
            BlendMode::AlphaOver | BlendMode::NearestWins => (primary, 0.0),
        };

        Self {
            mode,
            primary,
            color,
            weight_sum,
        }
    }

    /// Adds next accumulation layer's sample; `weight` is used only by
    /// [`BlendMode::Weighted`].
    pub fn push(&mut self, sample: Vec4, weight: f32) {
        match self.mode {
            BlendMode::Average => {
                self.color += sample;
                self.weight_sum += 1.0;
            }

            BlendMode::Weighted => {
                self.color += sample * weight;
                self.weight_sum += weight;
            }

            BlendMode::AlphaOver => {
                let alpha = sample.w.clamp(0.0, 1.0);
                let rgb = sample.truncate() * alpha
                    + self.color.truncate() * (1.0 - alpha);

                let a = alpha + self.color.w * (1.0 - alpha);

                self.color = rgb.extend(a);
            }

            BlendMode::NearestWins => {
                if sample.w > 0.0 {
                    self.color = sample;
                }
            }
        }
    }

    pub fn finish(self) -> Vec4 {
        match self.mode {
            BlendMode::Average => self.color / self.weight_sum,

            BlendMode::Weighted => {
                if self.weight_sum > 0.0 {
                    self.color / self.weight_sum
                } else {
                    self.primary
                }
            }

            BlendMode::AlphaOver | BlendMode::NearestWins => self.color,
        }
    }
}
