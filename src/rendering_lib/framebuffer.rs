// src/rendering_lib/framebuffer.rs

use crate::error::{LessonError, Result};

use super::texture::Texture;

/// Offscreen colour target with a depth/stencil attachment.
pub struct Framebuffer {
    pub color: Texture,
    pub depth_stencil: Texture,
    color_format: wgpu::TextureFormat,
}

impl Framebuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, color_format: wgpu::TextureFormat) -> Result<Self> {
        check_dimensions(width, height)?;
        let framebuffer = Self {
            color: Texture::render_target(device, width, height, color_format, "Framebuffer Color"),
            depth_stencil: Texture::depth_stencil(device, width, height, "Framebuffer Depth Stencil"),
            color_format,
        };
        framebuffer.check_complete()?;
        Ok(framebuffer)
    }

    pub fn check_complete(&self) -> Result<()> {
        check_attachments(self.color.size, self.depth_stencil.size)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.color.size.width, self.color.size.height)
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    /// Recreates both attachments. Zero sizes (a minimised window) are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if check_dimensions(width, height).is_err() {
            log::warn!("Ignoring framebuffer resize to {}x{}", width, height);
            return false;
        }
        if self.size() == (width, height) {
            return false;
        }
        self.color = Texture::render_target(device, width, height, self.color_format, "Framebuffer Color");
        self.depth_stencil = Texture::depth_stencil(device, width, height, "Framebuffer Depth Stencil");
        true
    }

    pub fn color_attachment(&self, clear: wgpu::Color) -> wgpu::RenderPassColorAttachment<'_> {
        wgpu::RenderPassColorAttachment {
            view: &self.color.view,
            resolve_target: None,
            ops: wgpu::Operations { load: wgpu::LoadOp::Clear(clear), store: wgpu::StoreOp::Store },
        }
    }

    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        depth_clear_attachment(&self.depth_stencil.view)
    }
}

pub fn depth_clear_attachment(view: &wgpu::TextureView) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
        stencil_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(0), store: wgpu::StoreOp::Store }),
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(LessonError::FramebufferIncomplete(format!("zero-sized attachment {}x{}", width, height)));
    }
    Ok(())
}

fn check_attachments(color: wgpu::Extent3d, depth: wgpu::Extent3d) -> Result<()> {
    check_dimensions(color.width, color.height)?;
    if color.width != depth.width || color.height != depth.height {
        return Err(LessonError::FramebufferIncomplete(format!(
            "color {}x{} does not match depth {}x{}",
            color.width, color.height, depth.width, depth.height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(width: u32, height: u32) -> wgpu::Extent3d {
        wgpu::Extent3d { width, height, depth_or_array_layers: 1 }
    }

    #[test]
    fn matching_attachments_are_complete() {
        assert!(check_attachments(extent(800, 600), extent(800, 600)).is_ok());
    }

    #[test]
    fn mismatched_attachments_are_incomplete() {
        let err = check_attachments(extent(800, 600), extent(400, 300)).unwrap_err();
        assert!(matches!(err, LessonError::FramebufferIncomplete(_)));
    }

    #[test]
    fn zero_size_is_incomplete() {
        assert!(check_dimensions(0, 600).is_err());
        assert!(check_attachments(extent(0, 0), extent(0, 0)).is_err());
    }
}
