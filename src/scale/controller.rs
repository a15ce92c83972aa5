// ── Window scale controller ───────────────────────────────────────────────────
//
// The single authority over the window's scaled size and the published scale
// factors.  Two entry points (startup query, DPI-change message) both end in
// `apply_dpi`.

use std::rc::Rc;

use crate::{
    binding::ScaleBinding,
    error::Result,
    platform::{
        DpiQuery, DpiResolver, MessageHook, WindowHandle, WindowHost, WindowMessage, WM_DPICHANGED,
    },
    scale::dpi::{decode_dpi_changed, DpiValue},
};

/// Design-time window size: the size at scale 1.0.  Captured once, never
/// changed; every scaled size is computed from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WindowGeometry {
    pub(crate) design_width: f64,
    pub(crate) design_height: f64,
}

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScaleState {
    /// Constructed; no DPI has been applied yet.
    Unscaled,
    /// The last DPI that was successfully applied.
    Scaled(DpiValue),
}

#[derive(Debug)]
pub(crate) struct WindowScaleController {
    geometry: WindowGeometry,
    width: f64,
    height: f64,
    binding: Rc<ScaleBinding>,
    state: ScaleState,
}

impl WindowScaleController {
    /// Record the design-time size and reset `binding` to (1.0, 1.0).
    pub(crate) fn new(design_width: f64, design_height: f64, binding: Rc<ScaleBinding>) -> Self {
        binding.set_scales(1.0, 1.0);
        Self {
            geometry: WindowGeometry {
                design_width,
                design_height,
            },
            width: design_width,
            height: design_height,
            binding,
            state: ScaleState::Unscaled,
        }
    }

    #[cfg(test)]
    pub(crate) fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    /// Current (scaled) window size.
    pub(crate) fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub(crate) fn state(&self) -> ScaleState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn binding(&self) -> &Rc<ScaleBinding> {
        &self.binding
    }

    /// Resize the window to design size x `dpi` scale and publish the factors.
    ///
    /// The window is resized first; if that fails nothing else changes.
    /// Applying the same DPI twice is the same as applying it once.
    pub(crate) fn apply_dpi(&mut self, host: &mut dyn WindowHost, dpi: DpiValue) -> Result<()> {
        let scale_x = dpi.scale_x();
        let scale_y = dpi.scale_y();
        let width = self.geometry.design_width * scale_x;
        let height = self.geometry.design_height * scale_y;

        log::debug!("resizing to {width:.1}x{height:.1} for {dpi}");
        host.resize(width.round() as i32, height.round() as i32)?;

        self.width = width;
        self.height = height;
        self.state = ScaleState::Scaled(dpi);
        self.binding.set_scales(scale_x, scale_y);
        Ok(())
    }

    /// Startup path: look up the DPI of the window's monitor and apply it.
    ///
    /// Failures are logged and leave the previous scale in place.
    pub(crate) fn apply_current_dpi<Q: DpiQuery>(
        &mut self,
        host: &mut dyn WindowHost,
        resolver: &DpiResolver<Q>,
        window: WindowHandle,
    ) {
        let dpi = match resolver.resolve_current_dpi(window) {
            Ok(dpi) => dpi,
            Err(e) => {
                log::warn!("could not resolve monitor DPI, keeping current scale: {e}");
                return;
            }
        };
        log::info!("initial monitor DPI is {dpi}");
        if let Err(e) = self.apply_dpi(host, dpi) {
            log::warn!("could not apply {dpi}: {e}");
        }
    }
}

impl MessageHook for WindowScaleController {
    fn intercept(&mut self, host: &mut dyn WindowHost, message: WindowMessage) -> Option<isize> {
        if message.code != WM_DPICHANGED {
            return None;
        }
        match decode_dpi_changed(message.wparam) {
            Ok(dpi) => {
                log::info!("monitor DPI changed to {dpi}");
                // Position follows the OS suggestion; size always comes from
                // the design baseline.
                if let Some((x, y)) = message.suggested_origin {
                    if let Err(e) = host.move_to(x, y) {
                        log::warn!("could not move to suggested origin: {e}");
                    }
                }
                if let Err(e) = self.apply_dpi(host, dpi) {
                    log::warn!("could not apply {dpi}: {e}");
                }
            }
            // Neither moved nor resized.
            Err(e) => log::warn!("ignoring DPI change: {e}"),
        }
        // Handled either way; default processing would resize the window again.
        Some(0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
