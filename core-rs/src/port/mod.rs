/**
 * port module
 * Suffix → port family mapping, range validation and host probing
 */

pub mod probe;
pub mod roles;
pub mod validator;

pub use probe::{check_all_ports_for_suffix, is_port_available, BusyPort};
pub use roles::{derived_ports, PortRole};
pub use validator::{validate_suffix, MAX_SUFFIX, MAX_TCP_PORT};
