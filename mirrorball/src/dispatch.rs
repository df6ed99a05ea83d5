/// Two-dimensional grid of workgroups, one workgroup per mirror pixel.
///
/// Devices limit the number of workgroups per dimension, so longer pixel
/// buffers get folded into rows of `width` workgroups; the kernel unfolds them
/// back through `y * width + x`, and the workgroups sticking out past the
/// buffer's end stay idle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchGrid {
    pub width: u32,
    pub height: u32,
}

impl DispatchGrid {
    /// Per-dimension limit guaranteed by every WebGPU device.
    pub const DEFAULT_MAX_WORKGROUPS: u32 = 65535;

    pub fn for_pixels(count: u32, max_workgroups_per_dim: u32) -> Self {
        assert!(max_workgroups_per_dim > 0);

        if count == 0 {
            return Self::default();
        }

        let width = count.min(max_workgroups_per_dim);
        let height = (count + width - 1) / width;

        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn workgroups(&self) -> u32 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(count: u32) -> DispatchGrid {
        DispatchGrid::for_pixels(count, DispatchGrid::DEFAULT_MAX_WORKGROUPS)
    }

    #[test]
    fn for_pixels() {
        assert_eq!(
            DispatchGrid {
                width: 3,
                height: 1
            },
            grid(3)
        );

        assert_eq!(
            DispatchGrid {
                width: 65535,
                height: 1
            },
            grid(65535)
        );

        assert_eq!(
            DispatchGrid {
                width: 65535,
                height: 2
            },
            grid(65536)
        );

        assert_eq!(
            DispatchGrid {
                width: 65535,
                height: 5
            },
            grid(640 * 480)
        );
    }

    #[test]
    fn empty() {
        assert!(grid(0).is_empty());
        assert_eq!(0, grid(0).workgroups());
        assert!(!grid(1).is_empty());
    }

    #[test]
    fn covers_all_pixels() {
        for count in 1..200 {
            for max in 1..20 {
                let target = DispatchGrid::for_pixels(count, max);

                assert!(target.width <= max);
                assert!(target.workgroups() >= count);
                assert!(target.workgroups() - count < target.width);
            }
        }
    }
}
