//! RGBA8888 pixels and their packed `u32` form.
//!
//! Every decoded surface produced by the texture decoders is a run of `u32` words, one per pixel,
//! whose in-memory byte order is `R, G, B, A`. On a little endian machine that is
//! `r | g << 8 | b << 16 | a << 24`; [`Color8888::to_packed`] and [`Color8888::from_packed`]
//! convert between the two forms on any endianness.

/// Represents a single RGBA8888 pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Color8888 {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
    /// Alpha component (0-255)
    pub a: u8,
}

impl Color8888 {
    /// Fully transparent black, used by the punch-through modes of BC1 and ETC2.
    pub const TRANSPARENT_BLACK: Self = Self::new(0, 0, 0, 0);

    /// Constructs a new [`Color8888`] from the specified red, green, blue, and alpha components.
    ///
    /// # Examples
    ///
    /// ```
    /// use texture_decoder_common::color_8888::Color8888;
    ///
    /// let pixel = Color8888::new(255, 0, 0, 255);
    /// assert_eq!(pixel.r, 255);
    /// assert_eq!(pixel.a, 255);
    /// ```
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs an opaque pixel.
    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Packs the pixel into the output word layout (`R, G, B, A` in memory).
    ///
    /// # Examples
    ///
    /// ```
    /// use texture_decoder_common::color_8888::Color8888;
    ///
    /// let packed = Color8888::new(1, 2, 3, 4).to_packed();
    /// assert_eq!(packed.to_ne_bytes(), [1, 2, 3, 4]);
    /// ```
    #[inline(always)]
    pub const fn to_packed(self) -> u32 {
        u32::from_ne_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpacks a word in the output layout back into its components.
    #[inline(always)]
    pub const fn from_packed(value: u32) -> Self {
        let [r, g, b, a] = value.to_ne_bytes();
        Self { r, g, b, a }
    }

    /// Returns the same pixel with alpha replaced.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

impl From<Color8888> for u32 {
    #[inline(always)]
    fn from(value: Color8888) -> Self {
        value.to_packed()
    }
}
