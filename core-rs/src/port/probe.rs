//! OS-level port availability probing
//!
//! A port counts as available when a TCP listener can bind it on all
//! interfaces. The listener is dropped before the probe returns.

use std::net::{Ipv4Addr, TcpListener};

use tracing::debug;

use crate::port::roles::PortRole;

/// A derived port that is already bound on this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyPort {
    pub role: PortRole,
    pub port: u64,
}

/// Test if port is available
///
/// # Returns
/// true if a listener could bind the port, false otherwise
pub fn is_port_available(port: u16) -> bool {
    match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)) {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(e) => {
            debug!(port, error = %e, "port bind failed");
            false
        }
    }
}

/// Probe all seven ports of a suffix
///
/// # Returns
/// Busy ports in role order; empty when every port is free. Ports that do
/// not fit in the TCP range are reported busy, since nothing can bind them.
pub fn check_all_ports_for_suffix(suffix: u32) -> Vec<BusyPort> {
    PortRole::ALL
        .iter()
        .filter_map(|role| {
            let port = role.port(suffix);
            let available = u16::try_from(port)
                .map(is_port_available)
                .unwrap_or(false);
            (!available).then_some(BusyPort { role: *role, port })
        })
        .collect()
}
