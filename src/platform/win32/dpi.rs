#![allow(unsafe_code)]

use std::ffi::c_void;

use windows::Win32::{
    Foundation::HWND,
    Graphics::Gdi::{
        MonitorFromWindow, HMONITOR, MONITOR_DEFAULTTONEAREST, MONITOR_DEFAULTTONULL,
        MONITOR_DEFAULTTOPRIMARY,
    },
    UI::HiDpi::{
        GetDpiForMonitor, SetProcessDpiAwarenessContext,
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, MDT_ANGULAR_DPI, MDT_EFFECTIVE_DPI,
        MDT_RAW_DPI,
    },
};

use crate::{
    error::{Result, ScaleError},
    platform::{DpiQuery, MonitorDpiType, MonitorFallback, MonitorHandle, WindowHandle},
};

/// Opt into Per-Monitor v2 DPI awareness so that WM_DPICHANGED carries the
/// real per-monitor DPI.
/// MUST be called before any window is created on the calling thread.
pub(crate) fn init() {
    // SAFETY: Must precede all window creation; single call at process start.
    let result =
        unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) };
    if let Err(e) = result {
        // Already set by a manifest, or pre-1703 Windows.  Not fatal.
        log::debug!("SetProcessDpiAwarenessContext: {e}");
    }
}

pub(crate) fn to_hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

pub(crate) fn from_hwnd(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

/// `MonitorFromWindow` + `GetDpiForMonitor`.
pub(crate) struct Win32DpiQuery;

impl DpiQuery for Win32DpiQuery {
    fn monitor_from_window(
        &self,
        window: WindowHandle,
        fallback: MonitorFallback,
    ) -> Option<MonitorHandle> {
        let flags = match fallback {
            MonitorFallback::Null => MONITOR_DEFAULTTONULL,
            MonitorFallback::Primary => MONITOR_DEFAULTTOPRIMARY,
            MonitorFallback::Nearest => MONITOR_DEFAULTTONEAREST,
        };
        // SAFETY: MonitorFromWindow accepts any HWND value; an invalid handle
        // yields a null HMONITOR (or the fallback monitor), never UB.
        let hmonitor = unsafe { MonitorFromWindow(to_hwnd(window), flags) };
        if hmonitor.is_invalid() {
            None
        } else {
            Some(MonitorHandle(hmonitor.0 as isize))
        }
    }

    fn dpi_for_monitor(&self, monitor: MonitorHandle, kind: MonitorDpiType) -> Result<(u32, u32)> {
        let dpi_type = match kind {
            MonitorDpiType::Effective => MDT_EFFECTIVE_DPI,
            MonitorDpiType::Angular => MDT_ANGULAR_DPI,
            MonitorDpiType::Raw => MDT_RAW_DPI,
        };
        let mut x = 0u32;
        let mut y = 0u32;
        let hmonitor = HMONITOR(monitor.0 as *mut c_void);
        // SAFETY: monitor came from MonitorFromWindow; x and y are valid
        // out-pointers for the duration of the call.
        unsafe { GetDpiForMonitor(hmonitor, dpi_type, &mut x, &mut y) }
            .map_err(|e| ScaleError::PlatformQuery {
                query: "GetDpiForMonitor",
                code: e.code().0 as u32,
            })?;
        Ok((x, y))
    }
}
