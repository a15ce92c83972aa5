// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// These modules are driven by the Win32 shell.  Off Windows only their tests
// reach them.
#[cfg_attr(not(windows), allow(dead_code))]
mod binding;
#[cfg_attr(not(windows), allow(dead_code))]
mod config;
#[cfg_attr(not(windows), allow(dead_code))]
mod error;
#[cfg_attr(not(windows), allow(dead_code))]
mod platform;
#[cfg_attr(not(windows), allow(dead_code, unused_imports))]
mod scale;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(windows)]
    {
        let config = config::load();
        if let Err(e) = platform::win32::window::run(&config) {
            // Startup failed before or during the message loop.
            log::error!("{e}");
            platform::win32::window::show_error_dialog(&e.to_string());
            std::process::exit(1);
        }
    }

    #[cfg(not(windows))]
    {
        log::error!("dpiscale needs a Windows desktop to run");
        std::process::exit(1);
    }
}
