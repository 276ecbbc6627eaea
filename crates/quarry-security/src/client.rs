//! Security negotiation for the authorization service client

use serde::{Deserialize, Serialize};

use crate::site::SecuritySite;

/// SASL mechanism on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mechanism {
    #[serde(rename = "NOSASL")]
    NoSasl,
    #[serde(rename = "GSSAPI")]
    Gssapi,
}

impl Mechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mechanism::NoSasl => "NOSASL",
            Mechanism::Gssapi => "GSSAPI",
        }
    }
}

/// How a connection to the service must authenticate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDescriptor {
    pub mechanism: Mechanism,
    pub use_sasl: bool,
    /// Service part of the server principal, `None` if no principal is configured
    pub kerberos_principal_short_name: Option<String>,
}

/// Client of the authorization service at `host:port`
#[derive(Debug, Clone)]
pub struct SecurityClient {
    pub host: String,
    pub port: u16,
    pub username: String,
    site: SecuritySite,
}

impl SecurityClient {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        site: SecuritySite,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            site,
        }
    }

    pub fn site(&self) -> &SecuritySite {
        &self.site
    }

    /// Negotiate the transport security from the site configuration
    ///
    /// A `kerberos` mode (any case) selects GSSAPI over SASL; any other or
    /// absent mode selects plaintext.
    pub fn security(&self) -> SecurityDescriptor {
        let kerberos = self
            .site
            .security_mode()
            .map(|mode| mode.trim().eq_ignore_ascii_case("kerberos"))
            .unwrap_or(false);

        let descriptor = SecurityDescriptor {
            mechanism: if kerberos {
                Mechanism::Gssapi
            } else {
                Mechanism::NoSasl
            },
            use_sasl: kerberos,
            kerberos_principal_short_name: self.site.server_principal().map(principal_short_name),
        };

        tracing::debug!(
            host = %self.host,
            port = self.port,
            user = %self.username,
            mechanism = descriptor.mechanism.as_str(),
            "security negotiated"
        );
        descriptor
    }
}

/// `service/host@REALM` -> `service`
pub fn principal_short_name(principal: &str) -> String {
    let name = principal.split('@').next().unwrap_or(principal);
    name.split('/').next().unwrap_or(name).to_string()
}
