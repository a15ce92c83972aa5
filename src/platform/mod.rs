// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface that the scaling core uses to talk to the
// OS: a DPI query, a resizable window, and a per-message hook.  No `unsafe`
// lives here; all Win32 FFI is confined to the `win32` sub-module and never
// leaks outward.

#[cfg(windows)]
pub mod win32;

use crate::{
    error::{Result, ScaleError},
    scale::DpiValue,
};

// ── Messages ──────────────────────────────────────────────────────────────────

/// Message code the OS sends when the DPI of a window's monitor changes.
pub(crate) const WM_DPICHANGED: u32 = 0x02E0;

/// Opaque platform window handle.  Zero means "no window".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowHandle(pub(crate) isize);

impl WindowHandle {
    pub(crate) fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Opaque platform monitor handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MonitorHandle(pub(crate) isize);

/// A message addressed to the window, before default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowMessage {
    pub(crate) code: u32,
    pub(crate) wparam: usize,
    /// For [`WM_DPICHANGED`]: top-left of the rectangle the OS suggests for
    /// the window at its new DPI, already read out of lParam.
    pub(crate) suggested_origin: Option<(i32, i32)>,
}

/// The parts of a live window the scaling core is allowed to change.
pub(crate) trait WindowHost {
    /// Set the window's outer size in device pixels.
    fn resize(&mut self, width: i32, height: i32) -> Result<()>;

    /// Move the window's top-left corner to (`x`, `y`) in screen pixels.
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;
}

/// A callback run for every message addressed to the window.
pub(crate) trait MessageHook {
    /// Return `Some(result)` to mark the message handled and skip default
    /// processing, or `None` to pass it on.
    fn intercept(&mut self, host: &mut dyn WindowHost, message: WindowMessage) -> Option<isize>;
}

// ── DPI query ─────────────────────────────────────────────────────────────────

/// Which monitor to return when a window is on none of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)] // the resolver only asks for `Nearest`
pub(crate) enum MonitorFallback {
    Null,
    Primary,
    Nearest,
}

/// Which DPI measurement to ask a monitor for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(dead_code)] // the resolver only asks for `Effective`
pub(crate) enum MonitorDpiType {
    /// The DPI the user's scaling setting asks applications to render at.
    #[default]
    Effective,
    Angular,
    Raw,
}

/// The two OS queries needed to find a window's DPI.
pub(crate) trait DpiQuery {
    /// The monitor hosting `window`, or `None` if there is none under
    /// `fallback`.
    fn monitor_from_window(
        &self,
        window: WindowHandle,
        fallback: MonitorFallback,
    ) -> Option<MonitorHandle>;

    /// Raw (x, y) DPI of `monitor`.
    fn dpi_for_monitor(&self, monitor: MonitorHandle, kind: MonitorDpiType) -> Result<(u32, u32)>;
}

/// Resolves the DPI of the monitor currently displaying a window.
pub(crate) struct DpiResolver<Q> {
    query: Q,
}

impl<Q: DpiQuery> DpiResolver<Q> {
    pub(crate) fn new(query: Q) -> Self {
        Self { query }
    }

    /// Effective DPI of the monitor nearest to `window`.
    ///
    /// Falls back to [`DpiValue::DEFAULT`] when there is no window or no
    /// monitor to ask.  A failed lookup, or a zero DPI from the platform, is a
    /// `PlatformQuery` error.
    pub(crate) fn resolve_current_dpi(&self, window: WindowHandle) -> Result<DpiValue> {
        if window.is_null() {
            return Ok(DpiValue::DEFAULT);
        }
        let Some(monitor) = self
            .query
            .monitor_from_window(window, MonitorFallback::Nearest)
        else {
            return Ok(DpiValue::DEFAULT);
        };
        let (x, y) = self
            .query
            .dpi_for_monitor(monitor, MonitorDpiType::Effective)?;
        DpiValue::new(x, y).ok_or(ScaleError::PlatformQuery {
            query: "dpi_for_monitor",
            code: 0,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Scripted stand-in for the OS.
    struct FakeQuery {
        monitor: Option<MonitorHandle>,
        dpi: Result<(u32, u32)>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeQuery {
        fn new(monitor: Option<MonitorHandle>, dpi: Result<(u32, u32)>) -> Self {
            Self {
                monitor,
                dpi,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl DpiQuery for FakeQuery {
        fn monitor_from_window(
            &self,
            window: WindowHandle,
            fallback: MonitorFallback,
        ) -> Option<MonitorHandle> {
            self.calls
                .borrow_mut()
                .push(format!("monitor({}, {fallback:?})", window.0));
            self.monitor
        }

        fn dpi_for_monitor(
            &self,
            monitor: MonitorHandle,
            kind: MonitorDpiType,
        ) -> Result<(u32, u32)> {
            self.calls
                .borrow_mut()
                .push(format!("dpi({}, {kind:?})", monitor.0));
            match &self.dpi {
                Ok(v) => Ok(*v),
                Err(_) => Err(ScaleError::PlatformQuery {
                    query: "GetDpiForMonitor",
                    code: 0x8007_0057,
                }),
            }
        }
    }

    #[test]
    fn resolves_nearest_monitor_effective_dpi() {
        let resolver = DpiResolver::new(FakeQuery::new(Some(MonitorHandle(7)), Ok((144, 144))));
        let dpi = resolver.resolve_current_dpi(WindowHandle(42)).expect("resolve");
        assert_eq!((dpi.x(), dpi.y()), (144, 144));
        assert_eq!(
            *resolver.query.calls.borrow(),
            vec!["monitor(42, Nearest)", "dpi(7, Effective)"]
        );
    }

    #[test]
    fn null_window_falls_back_to_default() {
        let resolver = DpiResolver::new(FakeQuery::new(Some(MonitorHandle(7)), Ok((144, 144))));
        let dpi = resolver.resolve_current_dpi(WindowHandle(0)).expect("resolve");
        assert_eq!(dpi, DpiValue::DEFAULT);
        assert!(resolver.query.calls.borrow().is_empty());
    }

    #[test]
    fn no_monitor_falls_back_to_default() {
        let resolver = DpiResolver::new(FakeQuery::new(None, Ok((144, 144))));
        let dpi = resolver.resolve_current_dpi(WindowHandle(42)).expect("resolve");
        assert_eq!(dpi, DpiValue::DEFAULT);
    }

    #[test]
    fn failed_lookup_is_platform_query_error() {
        let resolver = DpiResolver::new(FakeQuery::new(
            Some(MonitorHandle(7)),
            Err(ScaleError::PlatformQuery { query: "", code: 0 }),
        ));
        let err = resolver.resolve_current_dpi(WindowHandle(42)).unwrap_err();
        assert!(matches!(
            err,
            ScaleError::PlatformQuery { query: "GetDpiForMonitor", .. }
        ));
    }

    #[test]
    fn zero_dpi_from_platform_is_rejected() {
        let resolver = DpiResolver::new(FakeQuery::new(Some(MonitorHandle(7)), Ok((0, 96))));
        assert!(matches!(
            resolver.resolve_current_dpi(WindowHandle(42)),
            Err(ScaleError::PlatformQuery { .. })
        ));
    }

    #[test]
    fn default_dpi_type_is_effective() {
        assert_eq!(MonitorDpiType::default(), MonitorDpiType::Effective);
    }
}
