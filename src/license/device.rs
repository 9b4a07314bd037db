//! Identity of the machine a license is activated on

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: String,
    pub device_name: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl DeviceInfo {
    /// Describe the current host
    pub fn detect() -> Self {
        let device_name = hostname();
        Self {
            device_id: device_id(&device_name),
            ip_address: local_ip().to_string(),
            user_agent: user_agent(),
            device_name,
        }
    }
}

fn hostname() -> String {
    let name = gethostname::gethostname().to_string_lossy().trim().to_string();
    if name.is_empty() {
        "Unknown Device".to_string()
    } else {
        name
    }
}

/// 32 hex characters of a SHA-256 over host-stable inputs
pub fn device_id(hostname: &str) -> String {
    let identifier = format!(
        "{}-{}-{}",
        hostname,
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    let digest = Sha256::digest(identifier.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(32);
    id
}

/// Address of the outbound interface; connecting a UDP socket sends nothing
fn local_ip() -> IpAddr {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn user_agent() -> String {
    format!(
        "magic-mark/{} {}/{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
