//! Serial port enumeration
//!
//! Used for the `list_ports` accessor and for the diagnostics attached to
//! a failed open.

use serialport::available_ports;
use tracing::{info, warn};

/// Enumerate the names of the serial ports present on this machine
///
/// Enumeration failure is not fatal anywhere this is used, so it degrades
/// to an empty list with a warning.
pub fn list_ports() -> Vec<String> {
    let mut names: Vec<String> = match available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            warn!("serial port enumeration failed: {e}");
            return Vec::new();
        }
    };

    names.sort();
    if names.is_empty() {
        info!("no serial ports found");
    } else {
        info!("found {} serial port(s): {:?}", names.len(), names);
    }
    names
}
