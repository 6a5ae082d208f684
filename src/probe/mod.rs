//! Host version probing.
//!
//! [`VersionProbe`] is the single capability the platform plugin needs. The
//! OS-specific implementation behind [`SystemVersionProbe`] is chosen at
//! build time:
//!
//! - Linux and other Unix: `uname(2)` release, e.g. `"Linux 6.1.0-18-amd64"`
//! - macOS: `kern.osproductversion` sysctl, e.g. `"macOS 14.2.1"`
//! - Windows: `RtlGetVersion`, e.g. `"Windows 10.0.19045"`
//!
//! Probing never fails: if the OS query does not succeed the release is
//! reported as [`UNKNOWN_RELEASE`].

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

/// Release placeholder used when the OS query fails.
pub const UNKNOWN_RELEASE: &str = "unknown";

/// Something that can report a human-readable host version.
pub trait VersionProbe: Send + Sync {
    /// Return `"<OS family> <release>"`. Never empty.
    fn probe(&self) -> String;
}

/// Probe backed by the running operating system. Re-queries on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemVersionProbe;

impl SystemVersionProbe {
    pub fn new() -> Self {
        Self
    }
}

impl VersionProbe for SystemVersionProbe {
    fn probe(&self) -> String {
        let (family, release) = query_os();
        format_version(&family, release.as_deref())
    }
}

/// Probe that always reports the same string.
#[derive(Debug, Clone)]
pub struct StaticVersionProbe(String);

impl StaticVersionProbe {
    /// The first whitespace-separated token is taken as the family and the
    /// rest as the release, normalized like [`format_version`]. A blank
    /// string reports `"<family> unknown"`.
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        let mut parts = version.trim().splitn(2, char::is_whitespace);
        let family = parts.next().unwrap_or_default();
        Self(format_version(family, parts.next()))
    }
}

impl VersionProbe for StaticVersionProbe {
    fn probe(&self) -> String {
        self.0.clone()
    }
}

#[cfg(unix)]
fn query_os() -> (String, Option<String>) {
    unix::query()
}

#[cfg(windows)]
fn query_os() -> (String, Option<String>) {
    ("Windows".to_string(), windows::query())
}

#[cfg(not(any(unix, windows)))]
fn query_os() -> (String, Option<String>) {
    (fallback_family(), None)
}

/// OS family name derived from the compile target.
pub fn fallback_family() -> String {
    match std::env::consts::OS {
        "linux" => "Linux".to_string(),
        "macos" => "macOS".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "" => "Unknown".to_string(),
        other => other.to_string(),
    }
}

/// Format a version string as `"<family> <release>"`.
///
/// Whitespace inside either part is collapsed to `_` so the result always
/// has exactly one space separating two non-empty tokens.
pub fn format_version(family: &str, release: Option<&str>) -> String {
    let family = normalize_token(family)
        .or_else(|| normalize_token(&fallback_family()))
        .unwrap_or_else(|| "Unknown".to_string());
    let release = release
        .and_then(normalize_token)
        .unwrap_or_else(|| UNKNOWN_RELEASE.to_string());
    format!("{} {}", family, release)
}

fn normalize_token(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("_"))
    }
}
