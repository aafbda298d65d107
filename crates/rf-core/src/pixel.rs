use crate::image::{Image, ImageView};

/// Three 8-bit channels, stored in `r, g, b` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self::gray(0);
    pub const WHITE: Self = Self::gray(255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Same value replicated into every channel.
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub const fn from_channels(c: [u8; 3]) -> Self {
        Self {
            r: c[0],
            g: c[1],
            b: c[2],
        }
    }

    /// ITU-R BT.601 luma, rounded to the nearest integer.
    pub fn luma(self) -> u8 {
        let sum = 299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b);
        ((sum + 500) / 1000) as u8
    }
}

/// Replaces every pixel by its luma replicated into all three channels.
pub fn to_grayscale(img: &ImageView<'_, Rgb8>) -> Image<Rgb8> {
    Image::from_fn(img.width(), img.height(), |x, y| {
        Rgb8::gray(img.row(y)[x].luma())
    })
}

#[cfg(test)]
mod tests {
    use super::{Rgb8, to_grayscale};
    use crate::Image;

    #[test]
    fn luma_extremes_and_weights() {
        assert_eq!(Rgb8::WHITE.luma(), 255);
        assert_eq!(Rgb8::BLACK.luma(), 0);
        assert_eq!(Rgb8::new(255, 0, 0).luma(), 76);
        assert_eq!(Rgb8::new(0, 255, 0).luma(), 150);
        assert_eq!(Rgb8::new(0, 0, 255).luma(), 29);
    }

    #[test]
    fn grayscale_replicates_channels() {
        let img = Image::from_vec(2, 1, vec![Rgb8::new(10, 200, 30), Rgb8::gray(42)])
            .expect("valid image");
        let gray = to_grayscale(&img.as_view());

        for px in gray.data() {
            assert_eq!(px.r, px.g);
            assert_eq!(px.g, px.b);
        }
        assert_eq!(gray.data()[1], Rgb8::gray(42));
    }
}
