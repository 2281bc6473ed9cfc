// src/network.rs
// Network utilities: port availability and address discovery

use local_ip_address::local_ip;
use port_check::is_port_reachable;
use std::net::IpAddr;
use std::time::Duration;

/// Echoes the caller's public IP. Plain HTTP keeps the probe free of a TLS
/// stack; the result is best-effort either way.
const PUBLIC_IP_ENDPOINT: &str = "http://api.ipify.org";
const PUBLIC_IP_TIMEOUT: Duration = Duration::from_secs(5);

/// Displayable URLs for the startup banner.
#[derive(Debug, Clone)]
pub struct ServerAddresses {
    pub local: String,
    pub network: Option<String>,
    pub public: Option<String>,
}

pub struct NetworkUtils;

impl NetworkUtils {
    /// Check if a port is available on the given host
    pub fn is_port_available(host: &str, port: u16) -> bool {
        // is_port_reachable means something is already listening there;
        // we want the opposite
        !is_port_reachable(format!("{}:{}", host, port))
    }

    /// LAN address of this machine, if any interface is up
    pub fn local_address() -> Option<IpAddr> {
        local_ip().ok()
    }

    /// Best-effort public address lookup, bounded by a short timeout.
    /// Never an error: on any failure the caller just skips the line.
    pub async fn public_address() -> Option<IpAddr> {
        let client = awc::Client::default();
        let mut response = client
            .get(PUBLIC_IP_ENDPOINT)
            .timeout(PUBLIC_IP_TIMEOUT)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let body = response.body().await.ok()?;
        std::str::from_utf8(&body).ok()?.trim().parse().ok()
    }

    /// Assemble the addresses under which the server is reachable
    pub fn create_server_addresses(
        host: &str,
        port: u16,
        public_ip: Option<IpAddr>,
    ) -> ServerAddresses {
        // A wildcard bind is reachable via loopback
        let display_host = match host {
            "0.0.0.0" | "::" => "localhost",
            other => other,
        };

        let local = format!("http://{}:{}", display_host, port);

        let network = Self::local_address().map(|ip| format!("http://{}:{}", format_ip(ip), port));
        let public = public_ip.map(|ip| format!("http://{}:{}", format_ip(ip), port));

        ServerAddresses {
            local,
            network,
            public,
        }
    }
}

fn format_ip(ip: IpAddr) -> String {
    // IPv6 addresses need brackets inside a URL
    match ip {
        IpAddr::V6(v6) => format!("[{}]", v6),
        IpAddr::V4(v4) => v4.to_string(),
    }
}
