use windows_sys::Wdk::System::SystemServices::RtlGetVersion;
use windows_sys::Win32::System::SystemInformation::OSVERSIONINFOW;

/// Query the Windows build as `major.minor.build` via `RtlGetVersion`.
pub(super) fn query() -> Option<String> {
    // SAFETY: OSVERSIONINFOW is plain data; all-zero is a valid value.
    let mut info: OSVERSIONINFOW = unsafe { std::mem::zeroed() };
    info.dwOSVersionInfoSize = std::mem::size_of::<OSVERSIONINFOW>() as u32;

    // SAFETY: `info` is a properly sized, writable OSVERSIONINFOW.
    let status = unsafe { RtlGetVersion(&mut info) };
    if status != 0 {
        tracing::warn!("RtlGetVersion failed with status {:#010x}", status);
        return None;
    }

    format_build(info.dwMajorVersion, info.dwMinorVersion, info.dwBuildNumber)
}

/// Format version parts, rejecting an all-zero answer.
fn format_build(major: u32, minor: u32, build: u32) -> Option<String> {
    if major == 0 && minor == 0 && build == 0 {
        tracing::warn!("RtlGetVersion reported version 0.0.0");
        return None;
    }
    Some(format!("{}.{}.{}", major, minor, build))
}
