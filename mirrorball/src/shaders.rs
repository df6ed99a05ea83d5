use std::borrow::Cow;
use std::fs;

use log::info;

use crate::{Error, Result, ShaderSource};

#[derive(Debug)]
pub struct Shaders {
    pub mirror_compose: (wgpu::ShaderModule, &'static str),
}

impl Shaders {
    /// Entry point of the compositor's kernel, as named by rust-gpu.
    pub const MIRROR_COMPOSE_ENTRY_POINT: &'static str = "mirror_compose::main";

    const SPIRV_MAGIC: u32 = 0x07230203;

    pub fn new(device: &wgpu::Device, source: &ShaderSource) -> Result<Self> {
        info!("Loading shaders; source={source:?}");

        let mirror_compose = match source {
            ShaderSource::Embedded => Self::embedded(device)?,

            ShaderSource::Path(path) => {
                let bytes = fs::read(path)?;

                if bytes.len() % 4 != 0 {
                    return Err(Error::ShaderUnavailable(format!(
                        "`{}` is not a SPIR-V module (its length is not a \
                         multiple of four)",
                        path.display()
                    )));
                }

                let words: Vec<_> = bytes
                    .chunks_exact(4)
                    .map(|word| {
                        u32::from_le_bytes([word[0], word[1], word[2], word[3]])
                    })
                    .collect();

                (
                    Self::load(device, &words)?,
                    Self::MIRROR_COMPOSE_ENTRY_POINT,
                )
            }

            ShaderSource::Spirv(words) => {
                (Self::load(device, words)?, Self::MIRROR_COMPOSE_ENTRY_POINT)
            }
        };

        Ok(Self { mirror_compose })
    }

    #[cfg(feature = "embedded-shaders")]
    fn embedded(
        device: &wgpu::Device,
    ) -> Result<(wgpu::ShaderModule, &'static str)> {
        let module = device.create_shader_module(wgpu::include_spirv!(env!(
            "mirrorball_shaders::mirror_compose.path"
        )));

        let entry_point =
            env!("mirrorball_shaders::mirror_compose.entry_point");

        Ok((module, entry_point))
    }

    #[cfg(not(feature = "embedded-shaders"))]
    fn embedded(
        _: &wgpu::Device,
    ) -> Result<(wgpu::ShaderModule, &'static str)> {
        Err(Error::ShaderUnavailable(
            "mirrorball got compiled without the `embedded-shaders` feature"
                .into(),
        ))
    }

    fn load(
        device: &wgpu::Device,
        words: &[u32],
    ) -> Result<wgpu::ShaderModule> {
        Self::check(words)?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mirrorball_mirror_compose"),
            source: wgpu::ShaderSource::SpirV(Cow::Borrowed(words)),
        }))
    }

    fn check(words: &[u32]) -> Result<()> {
        match words.first() {
            Some(&Self::SPIRV_MAGIC) => Ok(()),

            Some(magic) => Err(Error::ShaderUnavailable(format!(
                "invalid SPIR-V magic number: {magic:#010x}"
            ))),

            None => Err(Error::ShaderUnavailable("empty SPIR-V module".into())),
        }
    }
}
