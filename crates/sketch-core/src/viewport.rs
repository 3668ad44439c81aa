//! Container measurement and resize propagation.
//!
//! The viewport is measured in CSS pixels; the backing store of the canvas is
//! `css size * pixel_ratio`, with the pixel ratio capped at
//! [`MAX_PIXEL_RATIO`].

use crate::constants::MAX_PIXEL_RATIO;

/// Anything the viewport can be measured from (a DOM element, a test fixture).
pub trait ContainerMetrics {
    /// CSS width and height of the container.
    fn css_size(&self) -> (f32, f32);
    /// Raw device pixel ratio reported by the host.
    fn device_pixel_ratio(&self) -> f32;
    /// Client-space position of the container's top-left corner.
    fn origin(&self) -> (f32, f32) {
        (0.0, 0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            pixel_ratio: 1.0,
        }
    }
}

impl ViewportSize {
    /// Build a viewport from raw container measurements.
    ///
    /// `header_offset` is subtracted from the height; a non-finite or
    /// non-positive pixel ratio falls back to 1.
    pub fn measure(
        css_width: f32,
        css_height: f32,
        device_pixel_ratio: f32,
        header_offset: f32,
    ) -> Self {
        let pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        Self {
            width: css_width.max(0.0),
            height: (css_height - header_offset).max(0.0),
            pixel_ratio,
        }
    }

    pub fn from_container(container: &impl ContainerMetrics, header_offset: f32) -> Self {
        let (w, h) = container.css_size();
        Self::measure(w, h, container.device_pixel_ratio(), header_offset)
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Renderer backing size in physical pixels, never smaller than 1x1.
    #[inline]
    pub fn backing_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round() as u32;
        let h = (self.height * self.pixel_ratio).round() as u32;
        (w.max(1), h.max(1))
    }
}

/// Owns the current [`ViewportSize`] of one sketch.
#[derive(Debug, Clone)]
pub struct ViewportManager {
    size: ViewportSize,
    header_offset: f32,
}

impl ViewportManager {
    pub fn new(header_offset: f32) -> Self {
        Self {
            size: ViewportSize::default(),
            header_offset: header_offset.max(0.0),
        }
    }

    /// Measure the container and adopt the result unconditionally.
    pub fn configure(&mut self, container: &impl ContainerMetrics) -> ViewportSize {
        self.size = ViewportSize::from_container(container, self.header_offset);
        log::debug!(
            "[viewport] configured {}x{} @{}",
            self.size.width,
            self.size.height,
            self.size.pixel_ratio
        );
        self.size
    }

    /// Re-measure the container. Returns the new size only when it differs
    /// from the current one, so repeated resizes with the same dimensions do
    /// not re-propagate.
    pub fn resize(&mut self, container: &impl ContainerMetrics) -> Option<ViewportSize> {
        let next = ViewportSize::from_container(container, self.header_offset);
        if next == self.size {
            return None;
        }
        self.size = next;
        Some(next)
    }

    #[inline]
    pub fn size(&self) -> ViewportSize {
        self.size
    }

    #[inline]
    pub fn header_offset(&self) -> f32 {
        self.header_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        let v = ViewportSize::measure(800.0, 600.0, 3.0, 0.0);
        assert_eq!(v.pixel_ratio, MAX_PIXEL_RATIO);
        assert_eq!(v.backing_size(), (1600, 1200));
    }

    #[test]
    fn header_offset_reduces_height() {
        let v = ViewportSize::measure(800.0, 660.0, 1.0, 60.0);
        assert_eq!(v.height, 600.0);
        assert!((v.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_container_still_has_backing_pixels() {
        let v = ViewportSize::measure(0.0, 10.0, f32::NAN, 40.0);
        assert_eq!(v.pixel_ratio, 1.0);
        assert_eq!(v.height, 0.0);
        assert_eq!(v.aspect(), 1.0);
        assert_eq!(v.backing_size(), (1, 1));
    }
}
