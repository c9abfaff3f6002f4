use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in container-local CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either axis is zero, negative, or not a number. Degenerate
    /// sizes must never reach a division.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_sizes() {
        assert!(Size::new(0.0, 100.0).is_degenerate());
        assert!(Size::new(100.0, 0.0).is_degenerate());
        assert!(Size::new(-5.0, 100.0).is_degenerate());
        assert!(Size::new(f64::NAN, 100.0).is_degenerate());
        assert!(!Size::new(800.0, 600.0).is_degenerate());
    }
}
