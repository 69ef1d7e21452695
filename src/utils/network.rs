use reqwest::Client;
use std::time::Duration;

use crate::error::{Result, SactlError};

/// Configuration for the HTTP client used against Azure Resource Manager
pub struct NetworkConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            user_agent: format!("sactl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a properly configured HTTP client with timeouts
pub fn create_http_client(config: &NetworkConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| SactlError::network(format!("Failed to create HTTP client: {}", e)))
}

/// Classify a transport-level error into the sactl error taxonomy with a
/// message a user can act on
pub fn classify_network_error(error: &reqwest::Error, url: &str) -> SactlError {
    let host = extract_host_from_url(url);

    if error.is_timeout() {
        return SactlError::connection_timeout(format!(
            "Request to '{}' timed out. The Azure management endpoint may be unreachable from this network.",
            host
        ));
    }

    if error.is_connect() {
        if is_dns_resolution_error(error) {
            return SactlError::network(format!(
                "Unable to resolve '{}'. Check your DNS configuration and network connection.",
                host
            ));
        }

        if error
            .to_string()
            .to_lowercase()
            .contains("connection refused")
        {
            return SactlError::connection_refused(format!(
                "Connection to '{}' was refused. The service may be temporarily unavailable.",
                host
            ));
        }

        return SactlError::network(format!(
            "Failed to connect to '{}'. Check your network connection.",
            host
        ));
    }

    if error.to_string().to_lowercase().contains("ssl")
        || error.to_string().to_lowercase().contains("tls")
        || error.to_string().to_lowercase().contains("certificate")
    {
        return SactlError::ssl_error(format!(
            "SSL/TLS error when connecting to '{}'. This may be due to certificate issues or network security policies.",
            host
        ));
    }

    if error.is_request() {
        return SactlError::invalid_url(format!("Invalid request to '{}'.", host));
    }

    if let Some(status) = error.status() {
        match status.as_u16() {
            503 => {
                return SactlError::network(format!(
                    "'{}' is temporarily unavailable. Please try again later.",
                    host
                ))
            }
            502 | 504 => {
                return SactlError::network(format!(
                    "Gateway error from '{}'. The Azure service may be experiencing issues.",
                    host
                ))
            }
            _ => {}
        }
    }

    SactlError::network(format!("Network error when accessing '{}': {}", host, error))
}

/// DNS failure detection from transport error text
fn is_dns_resolution_error(error: &reqwest::Error) -> bool {
    let error_msg = error.to_string().to_lowercase();
    let dns_indicators = [
        "dns",
        "name resolution",
        "resolve",
        "lookup",
        "name or service not known",
        "nodename nor servname provided",
        "temporary failure in name resolution",
        "no such host",
        "host not found",
        "getaddrinfo failed",
        "could not resolve host",
    ];

    dns_indicators
        .iter()
        .any(|&indicator| error_msg.contains(indicator))
}

/// Extract the host portion of a URL for error messages
fn extract_host_from_url(url: &str) -> String {
    if let Ok(parsed_url) = url::Url::parse(url) {
        if let Some(host) = parsed_url.host_str() {
            return host.to_string();
        }
    }
    "management.azure.com".to_string()
}

/// Check if an error represents a transient fault worth retrying.
///
/// Throttling (429) and gateway-class failures retry; DNS, refused
/// connections, TLS misconfiguration, and URL errors do not.
pub fn is_retryable_error(error: &SactlError) -> bool {
    match error {
        SactlError::ConnectionTimeout(_) => true,
        SactlError::NetworkError(msg) => {
            let msg_lower = msg.to_lowercase();
            msg_lower.contains("timeout")
                || msg_lower.contains("temporary")
                || msg_lower.contains("503")
                || msg_lower.contains("502")
                || msg_lower.contains("504")
        }
        SactlError::AzureApiError(msg) => {
            let msg_lower = msg.to_lowercase();
            msg_lower.contains("429")
                || msg_lower.contains("503")
                || msg_lower.contains("502")
                || msg_lower.contains("504")
                || msg_lower.contains("throttl")
                || msg_lower.contains("toomanyrequests")
        }
        SactlError::ConnectionRefused(_) => false,
        SactlError::SslError(_) => false,
        SactlError::InvalidUrl(_) => false,
        _ => false,
    }
}
