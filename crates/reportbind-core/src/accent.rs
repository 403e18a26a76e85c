//! Theme accent colors for chart series
//!
//! Office themes define six accent colors. Series beyond the sixth reuse the
//! accents, lightened by 20% per full cycle, up to 80%.

/// Number of accent colors in an Office theme
pub const ACCENT_COUNT: usize = 6;

/// Highest tint level (80% lighter)
pub const MAX_TINT: u8 = 4;

/// Luminance step per tint level, in DrawingML thousandths of a percent
const TINT_STEP: u32 = 20_000;

/// A theme accent plus a lightening level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccentColor {
    /// Accent slot (0-5 = accent1-accent6)
    pub slot: u8,
    /// Tint level (0-4)
    pub tint: u8,
}

impl AccentColor {
    /// Accent color for a zero-based series position
    ///
    /// # Examples
    /// ```
    /// use reportbind_core::AccentColor;
    ///
    /// assert_eq!(AccentColor::for_series(0), AccentColor { slot: 0, tint: 0 });
    /// assert_eq!(AccentColor::for_series(7), AccentColor { slot: 1, tint: 1 });
    /// assert_eq!(AccentColor::for_series(60), AccentColor { slot: 0, tint: 4 });
    /// ```
    pub fn for_series(index: usize) -> Self {
        let slot = (index % ACCENT_COUNT) as u8;
        let tint = (index / ACCENT_COUNT).min(MAX_TINT as usize) as u8;
        Self { slot, tint }
    }

    /// Scheme color name as used by `a:schemeClr/@val`
    pub fn scheme_name(&self) -> String {
        format!("accent{}", self.slot + 1)
    }

    /// Luminance modulation (`a:lumMod/@val`), 100000 = 100%
    pub fn lum_mod(&self) -> u32 {
        100_000 - self.tint as u32 * TINT_STEP
    }

    /// Luminance offset (`a:lumOff/@val`)
    pub fn lum_off(&self) -> u32 {
        self.tint as u32 * TINT_STEP
    }
}
