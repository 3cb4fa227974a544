use glam::UVec2;

/// Row-major 2D image with clamp-to-edge sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct Image2d<T> {
    size: UVec2,
    data: Vec<T>,
}

impl<T: Copy> Image2d<T> {
    pub fn filled(size: UVec2, value: T) -> Self {
        Self {
            size,
            data: vec![value; (size.x * size.y) as usize],
        }
    }

    pub fn from_fn(size: UVec2, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut data = Vec::with_capacity((size.x * size.y) as usize);
        for y in 0..size.y {
            for x in 0..size.x {
                data.push(f(x, y));
            }
        }
        Self { size, data }
    }

    /// Wraps row-major `data`. Returns `None` when the length does not match.
    pub fn from_vec(size: UVec2, data: Vec<T>) -> Option<Self> {
        (data.len() == (size.x * size.y) as usize).then_some(Self { size, data })
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.y
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> T {
        self.data[(y * self.size.x + x) as usize]
    }

    /// Sample with coordinates clamped to the image edge.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> T {
        let cx = x.clamp(0, self.size.x as i64 - 1) as u32;
        let cy = y.clamp(0, self.size.y as i64 - 1) as u32;
        self.get(cx, cy)
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let i = (y * self.size.x + x) as usize;
        self.data[i] = value;
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_reads_repeat_the_edge() {
        let img = Image2d::from_fn(UVec2::new(3, 2), |x, y| x + 10 * y);
        assert_eq!(img.get_clamped(-5, 0), 0);
        assert_eq!(img.get_clamped(7, 0), 2);
        assert_eq!(img.get_clamped(1, 9), 11);
        assert_eq!(img.get_clamped(-1, -1), 0);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Image2d::from_vec(UVec2::new(2, 2), vec![0u8; 3]).is_none());
        assert!(Image2d::from_vec(UVec2::new(2, 2), vec![0u8; 4]).is_some());
    }

    #[test]
    fn set_then_get() {
        let mut img = Image2d::filled(UVec2::new(4, 4), 0.0f32);
        img.set(3, 1, 2.5);
        assert_eq!(img.get(3, 1), 2.5);
        assert_eq!(img.as_slice().iter().filter(|v| **v != 0.0).count(), 1);
    }
}
