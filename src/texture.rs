use std::path::Path;

use anyhow::Context as _;
use glow::HasContext;
use image::{imageops, Rgba, RgbaImage};

/// Decodes an image file, flipped so the first row is the bottom one as GL expects.
pub fn load(path: &Path) -> anyhow::Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to decode texture {}", path.display()))?
        .to_rgba8();
    Ok(imageops::flip_vertical(&image))
}

/// Two-tone checkerboard, used when no texture file is given.
pub fn checkerboard(size: u32, cells: u32) -> RgbaImage {
    let cell = (size / cells.max(1)).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba([230, 230, 230, 255])
        } else {
            Rgba([90, 110, 160, 255])
        }
    })
}

pub struct Texture {
    handle: glow::Texture,
}

impl Texture {
    pub fn new(gl: &glow::Context, image: &RgbaImage) -> Result<Self, String> {
        let (width, height) = image.dimensions();
        let width = i32::try_from(width).map_err(|e| e.to_string())?;
        let height = i32::try_from(height).map_err(|e| e.to_string())?;
        unsafe {
            let handle = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(handle));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(image.as_raw().as_slice()),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(Self { handle })
        }
    }

    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.handle));
        }
    }

    pub fn delete(self, gl: &glow::Context) {
        unsafe { gl.delete_texture(self.handle) }
    }
}
