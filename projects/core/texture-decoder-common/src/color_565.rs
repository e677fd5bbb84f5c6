use crate::color_8888::Color8888;

/// Represents a 16-bit RGB565 color (5 bits red, 6 bits green, 5 bits blue)
/// As encountered in BC1, BC3 and ATC colour endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color565 {
    /// The underlying 16-bit RGB565 value
    value: u16,
}

impl Color565 {
    /// Creates a new [`Color565`] from the raw 16-bit value
    #[inline]
    pub const fn from_raw(value: u16) -> Self {
        Self { value }
    }

    /// Reads a little endian [`Color565`] from the first two bytes of `bytes`.
    ///
    /// # Panics
    ///
    /// If `bytes` holds fewer than two bytes.
    #[inline]
    pub fn from_le_slice(bytes: &[u8]) -> Self {
        Self::from_raw(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Creates a new [`Color565`] from separate 8-bit RGB components, truncating the low bits.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            value: ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3),
        }
    }

    /// Returns the raw 16-bit value
    #[inline]
    pub const fn raw_value(&self) -> u16 {
        self.value
    }

    // NOTE: https://fgiesen.wordpress.com/2021/10/04/gpu-bcn-decoding/
    // Endpoints are expanded from 5 or 6 bits to 8 bits by replicating the top bits.

    /// Extracts the expanded 8-bit red component
    #[inline]
    pub const fn red(&self) -> u8 {
        let r = (self.value & 0b11111000_00000000) >> 11;
        ((r << 3) | (r >> 2)) as u8
    }

    /// Extracts the expanded 8-bit green component
    #[inline]
    pub const fn green(&self) -> u8 {
        let g = (self.value & 0b00000111_11100000) >> 5;
        ((g << 2) | (g >> 4)) as u8
    }

    /// Extracts the expanded 8-bit blue component
    #[inline]
    pub const fn blue(&self) -> u8 {
        let b = self.value & 0b00000000_00011111;
        ((b << 3) | (b >> 2)) as u8
    }

    /// Compares two [`Color565`] values
    #[inline]
    pub const fn greater_than(&self, other: &Self) -> bool {
        self.value > other.value
    }

    /// Converts this [`Color565`] to a [`Color8888`] with full opacity (alpha=255)
    ///
    /// # Examples
    ///
    /// ```
    /// use texture_decoder_common::color_565::Color565;
    ///
    /// let rgba8888 = Color565::from_rgb(255, 0, 0).to_color_8888();
    /// assert_eq!((rgba8888.r, rgba8888.g, rgba8888.b, rgba8888.a), (255, 0, 0, 255));
    /// ```
    #[inline]
    pub const fn to_color_8888(&self) -> Color8888 {
        Color8888::new(self.red(), self.green(), self.blue(), 255)
    }

    /// Converts this RGB565 color to a RGBA8888 color with the specified alpha value
    #[inline]
    pub const fn to_color_8888_with_alpha(&self, alpha: u8) -> Color8888 {
        Color8888::new(self.red(), self.green(), self.blue(), alpha)
    }
}
