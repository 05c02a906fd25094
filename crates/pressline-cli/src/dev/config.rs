//! Development server configuration.

use crate::error::{CliError, Result};
use pressline_config::ServerSettings;
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::path::PathBuf;

/// How many ports above the requested one are tried.
const PORT_FALLBACK_RANGE: u16 = 10;

/// Resolved development server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server socket address (IP + port)
    pub addr: SocketAddr,

    /// Open browser automatically on start
    pub open: bool,

    /// Generated site served by the server
    pub site_dir: PathBuf,
}

impl ServerConfig {
    /// Resolve the bind address from settings.
    ///
    /// # Errors
    ///
    /// Returns error if the host is not an IP address or no port in the
    /// fallback range is free.
    pub fn from_settings(settings: &ServerSettings, site_dir: PathBuf) -> Result<Self> {
        let ip: IpAddr = settings.host.parse().map_err(|_| {
            CliError::InvalidArgument(format!(
                "server.host must be an IP address, got '{}'",
                settings.host
            ))
        })?;

        Ok(Self {
            addr: find_available_port(ip, settings.port)?,
            open: settings.open,
            site_dir,
        })
    }

    /// Get the server URL as a string.
    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Find an available port starting from the requested port.
///
/// Tries the requested port first, then the next ten.
pub fn find_available_port(ip: IpAddr, requested_port: u16) -> Result<SocketAddr> {
    if requested_port < 1024 {
        crate::ui::warning(&format!(
            "Port {} is in privileged range, may require root access",
            requested_port
        ));
    }

    let addr = SocketAddr::new(ip, requested_port);
    if TcpListener::bind(addr).is_ok() {
        return Ok(addr);
    }

    for offset in 1..=PORT_FALLBACK_RANGE {
        let port = requested_port.saturating_add(offset);
        let addr = SocketAddr::new(ip, port);
        if TcpListener::bind(addr).is_ok() {
            crate::ui::warning(&format!(
                "Port {} is busy, using port {} instead",
                requested_port, port
            ));
            return Ok(addr);
        }
    }

    Err(CliError::Server(format!(
        "Ports {}-{} are all in use. Set PORT or server.port to a free port.",
        requested_port,
        requested_port.saturating_add(PORT_FALLBACK_RANGE)
    )))
}
