//! Compile-time platform facts. Window-system structures only exist in the
//! layer's pNext registry on platforms that have the matching API surface.

/// Returns the platform name string.
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "windows")]
    { "windows" }
    #[cfg(target_os = "linux")]
    { "linux" }
    #[cfg(target_os = "android")]
    { "android" }
    #[cfg(target_os = "macos")]
    { "macos" }
    #[cfg(not(any(
        target_os = "windows",
        target_os = "linux",
        target_os = "android",
        target_os = "macos"
    )))]
    { "unknown" }
}

/// Win32 keyed-mutex and external-handle structures are available.
pub const WIN32_EXTENSIONS: bool = cfg!(windows);

/// Metal-backed (portability) structures are available.
pub const METAL_EXTENSIONS: bool = cfg!(any(target_os = "macos", target_os = "ios"));

/// Short list of the platform-gated extension families compiled in, for logs.
pub fn platform_extension_families() -> Vec<&'static str> {
    let mut families = Vec::new();
    if WIN32_EXTENSIONS {
        families.push("win32");
    }
    if METAL_EXTENSIONS {
        families.push("metal");
    }
    families
}
