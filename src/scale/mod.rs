// ── DPI scaling core ──────────────────────────────────────────────────────────
//
// Platform-neutral: no Win32 imports, no `unsafe`.  The Win32 shell feeds DPI
// observations in through `WindowScaleController` and nothing else writes the
// window size or the published scale factors.

pub(crate) mod controller;
pub(crate) mod dpi;

pub(crate) use controller::{ScaleState, WindowScaleController};
pub(crate) use dpi::DpiValue;
