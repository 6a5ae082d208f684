use nix::sys::utsname::{uname, UtsName};

/// Query `(family, release)` from the running Unix kernel.
pub(super) fn query() -> (String, Option<String>) {
    #[cfg(target_os = "macos")]
    if let Some(version) = macos_product_version() {
        return ("macOS".to_string(), Some(version));
    }

    query_with(uname)
}

/// Resolve `(family, release)` from a `uname` result, falling back to the
/// target family with no release when the call fails.
fn query_with<F>(uname: F) -> (String, Option<String>)
where
    F: FnOnce() -> nix::Result<UtsName>,
{
    match uname() {
        Ok(uts) => from_utsname(&uts),
        Err(e) => {
            tracing::warn!("uname failed: {}", e);
            (super::fallback_family(), None)
        }
    }
}

fn from_utsname(uts: &UtsName) -> (String, Option<String>) {
    let family = uts.sysname().to_string_lossy().into_owned();
    let release = uts.release().to_string_lossy().into_owned();

    let family = if family.trim().is_empty() {
        super::fallback_family()
    } else {
        family
    };

    (family, Some(release))
}

/// Marketing version from the `kern.osproductversion` sysctl, e.g. `14.2.1`.
#[cfg(target_os = "macos")]
fn macos_product_version() -> Option<String> {
    use std::ffi::CStr;

    const NAME: &[u8] = b"kern.osproductversion\0";

    let name = CStr::from_bytes_with_nul(NAME).ok()?;
    let mut buf = [0u8; 64];
    let mut len = buf.len();

    // SAFETY: `name` is NUL-terminated, `buf` is valid for `len` bytes and
    // the call writes at most `len` bytes, updating `len`.
    let rc = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            buf.as_mut_ptr().cast(),
            &mut len,
            std::ptr::null_mut(),
            0,
        )
    };
    if rc != 0 {
        tracing::debug!(
            "kern.osproductversion unavailable: {}",
            std::io::Error::last_os_error()
        );
        return None;
    }

    parse_sysctl_string(&buf[..len.min(buf.len())])
}

/// Decode a sysctl string value, which may carry a trailing NUL.
#[cfg(any(target_os = "macos", test))]
fn parse_sysctl_string(raw: &[u8]) -> Option<String> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let value = String::from_utf8_lossy(&raw[..end]).trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
