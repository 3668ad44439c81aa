use super::helpers::create_color_texture;
use super::HDR_FORMAT;

/// Offscreen HDR scene target plus two half-resolution bloom buffers.
pub(crate) struct RenderTargets {
    pub(crate) hdr: wgpu::Texture,
    pub(crate) hdr_view: wgpu::TextureView,
    pub(crate) bloom_a: wgpu::Texture,
    pub(crate) bloom_a_view: wgpu::TextureView,
    pub(crate) bloom_b: wgpu::Texture,
    pub(crate) bloom_b_view: wgpu::TextureView,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let (bw, bh) = bloom_size(width, height);
        let (hdr, hdr_view) = create_color_texture(device, "hdr_tex", width, height, HDR_FORMAT);
        let (bloom_a, bloom_a_view) = create_color_texture(device, "bloom_a", bw, bh, HDR_FORMAT);
        let (bloom_b, bloom_b_view) = create_color_texture(device, "bloom_b", bw, bh, HDR_FORMAT);
        Self {
            hdr,
            hdr_view,
            bloom_a,
            bloom_a_view,
            bloom_b,
            bloom_b_view,
            width,
            height,
        }
    }

    pub(crate) fn bloom_size(&self) -> (u32, u32) {
        bloom_size(self.width, self.height)
    }

    pub(crate) fn destroy(&self) {
        self.hdr.destroy();
        self.bloom_a.destroy();
        self.bloom_b.destroy();
    }
}

#[inline]
fn bloom_size(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}
