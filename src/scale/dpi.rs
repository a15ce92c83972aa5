// ── DPI values ────────────────────────────────────────────────────────────────

use crate::error::{Result, ScaleError};

/// Dots-per-inch along each axis of a monitor.
///
/// Both components are always non-zero; the only ways to build one are
/// [`DpiValue::new`] and [`decode_dpi_changed`], and both reject zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DpiValue {
    x: u32,
    y: u32,
}

impl DpiValue {
    /// The reference DPI that corresponds to a scale factor of 1.0.
    pub(crate) const DEFAULT: DpiValue = DpiValue { x: 96, y: 96 };

    /// Returns `None` if either axis is zero.
    pub(crate) fn new(x: u32, y: u32) -> Option<Self> {
        (x > 0 && y > 0).then_some(Self { x, y })
    }

    #[cfg(test)]
    pub(crate) fn x(self) -> u32 {
        self.x
    }

    #[cfg(test)]
    pub(crate) fn y(self) -> u32 {
        self.y
    }

    /// Scale factor along the X axis relative to [`DpiValue::DEFAULT`].
    pub(crate) fn scale_x(self) -> f64 {
        f64::from(self.x) / f64::from(Self::DEFAULT.x)
    }

    /// Scale factor along the Y axis relative to [`DpiValue::DEFAULT`].
    pub(crate) fn scale_y(self) -> f64 {
        f64::from(self.y) / f64::from(Self::DEFAULT.y)
    }
}

impl std::fmt::Display for DpiValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} dpi", self.x, self.y)
    }
}

/// Decode the WPARAM of a DPI-change message.
///
/// Low word = X DPI, high word = Y DPI.  Bits above the low 32 are ignored.
/// A zero on either axis is rejected rather than propagated into a scale.
pub(crate) fn decode_dpi_changed(raw: usize) -> Result<DpiValue> {
    let x = (raw & 0xFFFF) as u32;
    let y = ((raw >> 16) & 0xFFFF) as u32;
    DpiValue::new(x, y).ok_or(ScaleError::MalformedMessageParameter { raw })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
