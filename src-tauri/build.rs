//! Build script for the Scenario OCR desktop shell.
//!
//! Only the `desktop` feature needs Tauri's generated context; the library
//! and CLI build with a no-op script.

fn main() {
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
