//! Synthetic ring test image, used when no input image is given.

use image::Luma;
use maskpath_core::{Coord, GrayImage};

/// Side length of the square ring image.
pub const RING_SIZE: u32 = 100;

/// Radius of the sampled circle.
pub const RING_RADIUS: f64 = 20.0;

/// Number of angle samples (in whole radians) used to draw the circle.
pub const RING_SAMPLES: u32 = 1000;

/// Default start point on the left of the ring.
pub const RING_START: Coord = Coord::new(30, 49);

/// Default end point on the right of the ring.
pub const RING_END: Coord = Coord::new(69, 44);

/// Draw a one-pixel circle of white samples on a black square.
///
/// Sample `i` lands at `(r cos i + c, r sin i + c)` truncated toward
/// zero. Integer radian steps wrap around the circle many times, which
/// fills it densely enough to be 8-connected.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ring_image() -> GrayImage {
    let mut image = GrayImage::new(RING_SIZE, RING_SIZE);
    let centre = f64::from(RING_SIZE / 2);
    for i in 0..RING_SAMPLES {
        let angle = f64::from(i);
        let x = (RING_RADIUS * angle.cos() + centre) as u32;
        let y = (RING_RADIUS * angle.sin() + centre) as u32;
        image.put_pixel(x, y, Luma([u8::MAX]));
    }
    image
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maskpath_core::{Mask, shortest_path};

    use super::*;

    #[test]
    fn default_endpoints_are_on_the_ring() {
        let img = ring_image();
        assert_eq!(img.dimensions(), (RING_SIZE, RING_SIZE));
        for c in [RING_START, RING_END] {
            assert_eq!(img.get_pixel(c.x as u32, c.y as u32).0[0], 255, "{c}");
        }
        assert_eq!(img.get_pixel(50, 50).0[0], 0, "centre stays black");
    }

    #[test]
    fn ring_connects_the_default_endpoints() {
        let mask = Mask::from_gray(&ring_image(), 0).unwrap();
        let path = shortest_path(&mask, RING_START, RING_END).unwrap();
        assert_eq!(path.end(), Some(RING_END));
        assert_eq!(path.start(), Some(RING_START));
        // Must go around, so longer than the straight chord.
        assert!(path.steps().unwrap() > RING_START.chebyshev(RING_END) as usize);
    }
}
