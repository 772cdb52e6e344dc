//! Fractional coverage output

/// Row-major grid of coverage values in `[0.0, 1.0]`
///
/// Row 0 is the top of the bitmap. A value is the fraction of the pixel's
/// area that lies inside the outline.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageBitmap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl CoverageBitmap {
    pub fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Zeroed bitmap whose samples are written once by `fill`, row-major
    pub fn from_fill<E>(
        width: u32,
        height: u32,
        fill: impl FnOnce(&mut [f32]) -> std::result::Result<(), E>,
    ) -> std::result::Result<Self, E> {
        let mut bitmap = Self::zeroed(width, height);
        fill(&mut bitmap.data)?;
        Ok(bitmap)
    }

    /// Wrap existing samples; `None` when `data` does not hold exactly
    /// `width * height` values
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn row(&self, y: u32) -> Option<&[f32]> {
        if y >= self.height {
            return None;
        }
        let w = self.width as usize;
        let start = y as usize * w;
        self.data.get(start..start + w)
    }

    /// Total covered area in square pixels
    pub fn coverage_sum(&self) -> f64 {
        self.data.iter().map(|&c| c as f64).sum()
    }

    /// Quantise to 8-bit alpha, one byte per pixel
    pub fn to_alpha8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&c| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8)
            .collect()
    }
}
