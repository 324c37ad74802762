//! Best-effort browser launching for login flows.
//!
//! Login never depends on this succeeding - the authorization URL is always
//! printed so the user can open it by hand.

use tracing::debug;

/// Tries to open the given URL in the user's default browser.
///
/// Returns true when the opener process was spawned.
pub fn open_in_browser(url: &str) -> bool {
    let spawned = spawn_opener(url);
    debug!(url, spawned, "Browser open attempt");
    spawned
}

#[cfg(target_os = "macos")]
fn spawn_opener(url: &str) -> bool {
    std::process::Command::new("open").arg(url).spawn().is_ok()
}

#[cfg(target_os = "windows")]
fn spawn_opener(url: &str) -> bool {
    std::process::Command::new("cmd")
        .args(["/C", "start", "", url])
        .spawn()
        .is_ok()
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn spawn_opener(url: &str) -> bool {
    std::process::Command::new("xdg-open").arg(url).spawn().is_ok()
}
