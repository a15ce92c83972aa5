// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class and create the top-level window.
//   • Own the per-window state (scale controller, binding, DPI resolver).
//   • Run the startup DPI query once the HWND exists, before first show.
//   • Route every message through the scale controller's hook.
//   • Keep the window-state pointer in GWLP_USERDATA (x86 and x64).
//   • Paint the contents at the current scale factors.
//   • Expose a safe error-dialog helper for use by main().

#![allow(unsafe_code)]

use std::{
    cell::{Cell, RefCell},
    ffi::c_void,
    rc::Rc,
};

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{
            BeginPaint, EndPaint, GetStockObject, InvalidateRect, Rectangle, TextOutW, HBRUSH,
            PAINTSTRUCT, WHITE_BRUSH,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
            LoadCursorW, LoadIconW, MessageBoxW, PostQuitMessage, RegisterClassExW,
            SetWindowPos, ShowWindow, TranslateMessage,
            UpdateWindow, CREATESTRUCTW, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, GWLP_USERDATA,
            HMENU, IDC_ARROW, IDI_APPLICATION, MB_ICONERROR, MB_OK, MSG, SWP_NOACTIVATE,
            SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_SHOW, WINDOW_EX_STYLE, WM_CLOSE,
            WM_DESTROY, WM_DPICHANGED, WM_NCCREATE, WM_NCDESTROY, WM_PAINT, WNDCLASSEXW,
            WS_OVERLAPPEDWINDOW,
        },
    },
};

// The pointer-sized variants only exist on 64-bit targets; on x86 the plain
// ones are pointer-sized already.
#[cfg(target_pointer_width = "64")]
use windows::Win32::UI::WindowsAndMessaging::{GetWindowLongPtrW, SetWindowLongPtrW};
#[cfg(target_pointer_width = "32")]
use windows::Win32::UI::WindowsAndMessaging::{GetWindowLongW, SetWindowLongW};

use super::dpi::{self, Win32DpiQuery};
use crate::{
    binding::{ScaleBinding, Subscription},
    config::WindowConfig,
    error::{Result, ScaleError},
    platform::{DpiResolver, MessageHook, WindowHost, WindowMessage},
    scale::{DpiValue, ScaleState, WindowScaleController},
};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
const CLASS_NAME: PCWSTR = w!("DpiScaleMainWindow");

// ── Contents layout (design units, i.e. pixels at 96 DPI) ─────────────────────

const CONTENT_MARGIN: f64 = 24.0;
const CARD_WIDTH: f64 = 320.0;
const CARD_HEIGHT: f64 = 120.0;
const TEXT_INSET: f64 = 16.0;

// ── Per-window state ──────────────────────────────────────────────────────────

/// Owned by the HWND through `GWLP_USERDATA`; freed on WM_NCDESTROY.
struct WindowState {
    binding: Rc<ScaleBinding>,
    /// The repaint observer; removed on WM_DESTROY.
    repaint: Cell<Option<Subscription>>,
    // RefCell: SetWindowPos inside `apply_dpi` re-enters wnd_proc.
    controller: RefCell<WindowScaleController>,
    resolver: DpiResolver<Win32DpiQuery>,
}

/// The live window as seen by the scale controller.
struct Win32Host {
    hwnd: HWND,
}

impl WindowHost for Win32Host {
    fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        // SAFETY: hwnd is the live main window; SWP_NOMOVE | SWP_NOZORDER
        // leaves position and z-order alone so the insert-after handle is unused.
        unsafe {
            SetWindowPos(
                self.hwnd,
                HWND::default(),
                0,
                0,
                width,
                height,
                SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        }
        .map_err(|e| ScaleError::Win32 {
            function: "SetWindowPos",
            code: e.code().0 as u32,
        })
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        // SAFETY: hwnd is the live main window; SWP_NOSIZE | SWP_NOZORDER
        // leaves size and z-order alone so the insert-after handle is unused.
        unsafe {
            SetWindowPos(
                self.hwnd,
                HWND::default(),
                x,
                y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        }
        .map_err(|e| ScaleError::Win32 {
            function: "SetWindowPos",
            code: e.code().0 as u32,
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Register the main window class, create the window at its design size,
/// scale it to the current monitor, and drive the message loop until the user
/// closes it.
pub(crate) fn run(config: &WindowConfig) -> Result<()> {
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    dpi::init();

    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime and never fails in practice.
    let hmodule = unsafe { GetModuleHandleW(None) }?;
    let hinstance = HINSTANCE(hmodule.0);

    register_class(hinstance)?;

    // Scale factors start at 1.0 before there is any window handle.
    let binding = Rc::new(ScaleBinding::new());
    let controller =
        WindowScaleController::new(config.design_width, config.design_height, Rc::clone(&binding));
    let state = Box::new(WindowState {
        binding,
        repaint: Cell::new(None),
        controller: RefCell::new(controller),
        resolver: DpiResolver::new(Win32DpiQuery),
    });

    let hwnd = create_window(hinstance, config, state)?;
    on_source_initialized(hwnd);

    // SAFETY: hwnd was just returned by CreateWindowExW and is valid.
    // ShowWindow returns the previous visibility state; UpdateWindow returns
    // a success BOOL — both are intentionally ignored here.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);
    }

    #[cfg(debug_assertions)]
    log::debug!("window visible in {:.1} ms", t0.elapsed().as_secs_f64() * 1000.0);

    message_loop()
}

/// Show a modal error dialog with the given message.
///
/// Used by `main()` when `run()` returns an error.
pub(crate) fn show_error_dialog(message: &str) {
    let msg_wide = wide(message);
    let title_wide = wide("dpiscale: fatal error");

    // SAFETY: msg_wide and title_wide are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    // HWND::default() (null) means the dialog has no owner window.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: IDI_APPLICATION is a built-in icon resource that exists on all
    // Windows versions.
    let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }?;

    // SAFETY: IDC_ARROW is a built-in cursor resource that exists on all
    // Windows versions.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }?;

    // SAFETY: GetStockObject with WHITE_BRUSH always returns a valid HGDIOBJ.
    let bg_brush = unsafe { HBRUSH(GetStockObject(WHITE_BRUSH).0) };

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        // Repaint everything on resize: the contents scale with the window.
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: hinstance,
        hIcon: icon,
        hCursor: cursor,
        hbrBackground: bg_brush,
        lpszMenuName: PCWSTR::null(),
        lpszClassName: CLASS_NAME,
        hIconSm: icon,
    };

    // SAFETY: wndclass is fully initialised with valid handles;
    // CLASS_NAME is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW"));
    }

    Ok(())
}

// ── Window creation ───────────────────────────────────────────────────────────

fn create_window(
    hinstance: HINSTANCE,
    config: &WindowConfig,
    state: Box<WindowState>,
) -> Result<HWND> {
    let title = wide(&config.title);
    let raw = Box::into_raw(state);

    // SAFETY: CLASS_NAME was just registered; title outlives the call.
    // `raw` is handed to WM_NCCREATE via lpCreateParams and owned by the
    // window from then on (released in WM_NCDESTROY).
    let created = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            config.design_width.round() as i32,
            config.design_height.round() as i32,
            HWND::default(),
            HMENU::default(),
            hinstance,
            Some(raw as *const c_void),
        )
    };

    // On failure the state is released by WM_NCDESTROY if WM_NCCREATE got to
    // adopt it; otherwise it leaks, and main() is about to exit anyway.
    created.map_err(|e| ScaleError::Win32 {
        function: "CreateWindowExW",
        code: e.code().0 as u32,
    })
}

/// Runs once the HWND exists: wire repaint to scale changes, then apply the
/// DPI of whatever monitor the window landed on.
fn on_source_initialized(hwnd: HWND) {
    let Some(state) = window_state(hwnd) else {
        return;
    };

    let hwnd_bits = hwnd.0 as isize;
    let repaint = state.binding.subscribe(move |_, property| {
        log::trace!("{} changed, repainting", property.as_str());
        // SAFETY: the binding lives inside the window's own state and is
        // dropped in WM_NCDESTROY, so the handle is valid whenever this runs.
        unsafe {
            let _ = InvalidateRect(HWND(hwnd_bits as *mut c_void), None, true);
        }
    });
    state.repaint.set(Some(repaint));

    let mut host = Win32Host { hwnd };
    if let Ok(mut controller) = state.controller.try_borrow_mut() {
        controller.apply_current_dpi(&mut host, &state.resolver, dpi::from_hwnd(hwnd));
        let (width, height) = controller.size();
        log::info!("window sized {width:.0}x{height:.0}");
    }
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop() -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            -1 => return Err(last_error("GetMessageW")),
            // WM_QUIT
            0 => break,
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessageW call.
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            },
        }
    }

    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

/// Read the `GWLP_USERDATA` slot.
///
/// # Safety
/// `hwnd` must be a window owned by this thread.
#[cfg(target_pointer_width = "64")]
unsafe fn user_data(hwnd: HWND) -> isize {
    GetWindowLongPtrW(hwnd, GWLP_USERDATA)
}

#[cfg(target_pointer_width = "32")]
unsafe fn user_data(hwnd: HWND) -> isize {
    GetWindowLongW(hwnd, GWLP_USERDATA) as isize
}

/// Store `value` in the `GWLP_USERDATA` slot and return the previous value.
///
/// # Safety
/// `hwnd` must be a window owned by this thread.
#[cfg(target_pointer_width = "64")]
unsafe fn set_user_data(hwnd: HWND, value: isize) -> isize {
    SetWindowLongPtrW(hwnd, GWLP_USERDATA, value)
}

#[cfg(target_pointer_width = "32")]
unsafe fn set_user_data(hwnd: HWND, value: isize) -> isize {
    SetWindowLongW(hwnd, GWLP_USERDATA, value as i32) as isize
}

/// Borrow the state stored in `GWLP_USERDATA`, if any.
fn window_state<'a>(hwnd: HWND) -> Option<&'a WindowState> {
    // SAFETY: wnd_proc and on_source_initialized only pass windows of this
    // thread's main window class.
    let ptr = unsafe { user_data(hwnd) } as *const WindowState;

    // SAFETY: the slot is either 0 or the pointer stored in WM_NCCREATE, which
    // stays valid until WM_NCDESTROY clears it.  Only shared references are
    // ever formed; mutation goes through RefCell.
    unsafe { ptr.as_ref() }
}

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCCREATE => {
            // SAFETY: for WM_NCCREATE, lparam points to the CREATESTRUCTW whose
            // lpCreateParams is the Box<WindowState> pointer from create_window.
            let create = &*(lparam.0 as *const CREATESTRUCTW);
            set_user_data(hwnd, create.lpCreateParams as isize);
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }
        WM_NCDESTROY => {
            let ptr = set_user_data(hwnd, 0) as *mut WindowState;
            if !ptr.is_null() {
                // SAFETY: ptr is the Box pointer adopted in WM_NCCREATE; the
                // userdata slot is now cleared so nothing can reach it again.
                drop(Box::from_raw(ptr));
            }
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }
        _ => {}
    }

    let Some(state) = window_state(hwnd) else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };

    // Every message goes through the scale hook before default handling.
    if let Ok(mut controller) = state.controller.try_borrow_mut() {
        let mut host = Win32Host { hwnd };
        let suggested_origin = if msg == WM_DPICHANGED {
            suggested_origin(lparam)
        } else {
            None
        };
        let message = WindowMessage {
            code: msg,
            wparam: wparam.0,
            suggested_origin,
        };
        if let Some(result) = controller.intercept(&mut host, message) {
            return LRESULT(result);
        }
    }

    match msg {
        WM_PAINT => {
            let dpi = match state.controller.try_borrow().map(|c| c.state()) {
                Ok(ScaleState::Scaled(dpi)) => Some(dpi),
                _ => None,
            };
            paint(hwnd, &state.binding, dpi);
            LRESULT(0)
        }

        WM_CLOSE => {
            // DestroyWindow triggers WM_DESTROY, which posts WM_QUIT.
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            if let Some(repaint) = state.repaint.take() {
                state.binding.unsubscribe(repaint);
            }
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Top-left of the rectangle Windows suggests in a WM_DPICHANGED lparam.
fn suggested_origin(lparam: LPARAM) -> Option<(i32, i32)> {
    let rect_ptr = lparam.0 as *const RECT;
    if rect_ptr.is_null() {
        return None;
    }
    // SAFETY: for WM_DPICHANGED, lparam points to a RECT owned by the sender
    // that is valid for the duration of the message.
    let rect = unsafe { *rect_ptr };
    Some((rect.left, rect.top))
}

// ── Painting ──────────────────────────────────────────────────────────────────

/// Draw a card and a status line, both laid out in design units and scaled
/// by the bound factors.
fn paint(hwnd: HWND, binding: &ScaleBinding, dpi: Option<DpiValue>) {
    let sx = binding.scale_x();
    let sy = binding.scale_y();
    let px = |v: f64, s: f64| (v * s).round() as i32;

    let label = match dpi {
        Some(dpi) => format!("Scale {sx:.2} x {sy:.2} ({dpi})"),
        None => format!("Scale {sx:.2} x {sy:.2}"),
    };
    let label_wide: Vec<u16> = label.encode_utf16().collect();

    let mut ps = PAINTSTRUCT::default();
    // SAFETY: hwnd is receiving WM_PAINT; BeginPaint/EndPaint are paired and
    // the HDC is used only between them.
    unsafe {
        let hdc = BeginPaint(hwnd, &mut ps);
        let _ = Rectangle(
            hdc,
            px(CONTENT_MARGIN, sx),
            px(CONTENT_MARGIN, sy),
            px(CONTENT_MARGIN + CARD_WIDTH, sx),
            px(CONTENT_MARGIN + CARD_HEIGHT, sy),
        );
        let _ = TextOutW(
            hdc,
            px(CONTENT_MARGIN + TEXT_INSET, sx),
            px(CONTENT_MARGIN + TEXT_INSET, sy),
            &label_wide,
        );
        let _ = EndPaint(hwnd, &ps);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Null-terminated UTF-16 copy of `s`.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Capture the current Win32 last-error code and wrap it in a `ScaleError`.
///
/// Call immediately after a Win32 function that signals failure — `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> ScaleError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    let code = unsafe { GetLastError() };
    ScaleError::Win32 {
        function,
        code: code.0,
    }
}
