//! Binary mask helpers

use super::BinaryImage;

impl BinaryImage {
    /// Number of set pixels
    pub fn count(&self) -> usize {
        self.data().iter().filter(|&&v| v).count()
    }

    /// True if at least one pixel is set
    pub fn any(&self) -> bool {
        self.data().iter().any(|&v| v)
    }

    /// True if every pixel is set
    pub fn all(&self) -> bool {
        self.data().iter().all(|&v| v)
    }
}
