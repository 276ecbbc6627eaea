//! Security site file
//!
//! The cluster ships it as a Hadoop-style XML configuration:
//!
//! ```xml
//! <configuration>
//!   <property>
//!     <name>sentry.service.security.mode</name>
//!     <value>kerberos</value>
//!   </property>
//!   <property>
//!     <name>sentry.service.admin.group</name>
//!     <value>hive,impala,hue</value>
//!   </property>
//! </configuration>
//! ```
//!
//! A flat YAML map of the same properties (`sentry-site.yaml`) is read when
//! no XML site exists.

use std::collections::BTreeMap;
use std::path::Path;

use quarry_core::errors::{ExError, ExErrorKind, ExResult};

pub const SECURITY_MODE: &str = "sentry.service.security.mode";
pub const SERVER_PRINCIPAL: &str = "sentry.service.server.principal";
pub const ADMIN_GROUP: &str = "sentry.service.admin.group";
pub const PROVIDER: &str = "hive.sentry.provider";

/// File name looked up inside a configuration directory
pub const SITE_FILE_NAME: &str = "sentry-site.xml";
/// Fallback looked up when the XML site is absent
pub const YAML_SITE_FILE_NAME: &str = "sentry-site.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecuritySite {
    properties: BTreeMap<String, String>,
}

fn config_error(message: String) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_security_site")
        .with_message(message)
}

impl SecuritySite {
    /// Parse an XML site
    ///
    /// Every `<property>` under `<configuration>` contributes its trimmed
    /// `<name>` and `<value>`. Properties without a name or with an empty
    /// value are skipped; a repeated name keeps its last value.
    ///
    /// # Errors
    ///
    /// `Config` for malformed XML or a root other than `<configuration>`.
    pub fn from_xml_str(content: &str) -> ExResult<Self> {
        let doc = roxmltree::Document::parse(content)
            .map_err(|e| config_error(format!("XML parse error: {}", e)))?;

        let root = doc.root_element();
        if !root.has_tag_name("configuration") {
            return Err(config_error(format!(
                "Expected <configuration> root, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut properties = BTreeMap::new();
        for property in root.children().filter(|n| n.has_tag_name("property")) {
            let child_text = |tag: &str| {
                property
                    .children()
                    .find(|n| n.has_tag_name(tag))
                    .and_then(|n| n.text())
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
            };
            let (Some(name), Some(value)) = (child_text("name"), child_text("value")) else {
                continue;
            };
            properties.insert(name.to_string(), value.to_string());
        }
        Ok(Self { properties })
    }

    /// Parse a YAML site; scalar values are kept as their text
    ///
    /// # Errors
    ///
    /// `Config` for malformed YAML, a non-map document or non-scalar values.
    pub fn from_yaml_str(content: &str) -> ExResult<Self> {
        let raw: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(content)
            .map_err(|e| config_error(format!("YAML parse error: {}", e)))?;

        let mut properties = BTreeMap::new();
        for (name, value) in raw {
            let text = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Null => continue,
                _ => {
                    return Err(config_error(format!(
                        "Property {} must be a scalar value",
                        name
                    )))
                }
            };
            properties.insert(name, text);
        }
        Ok(Self { properties })
    }

    /// Load a site file, YAML when the extension says so and XML otherwise
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Config` if it does not parse.
    pub fn load(path: &Path) -> ExResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_security_site")
                .with_entity_id(path.display().to_string())
                .with_message(format!("Failed to read security site: {}", e))
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let site = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_xml_str(&content)?
        };
        tracing::debug!(path = %path.display(), properties = site.properties.len(), "security site loaded");
        Ok(site)
    }

    /// Load `sentry-site.xml`, or else `sentry-site.yaml`, from a
    /// configuration directory
    ///
    /// A directory with neither file yields an empty site.
    ///
    /// # Errors
    ///
    /// As for `load` when a file exists.
    pub fn load_dir(dir: &Path) -> ExResult<Self> {
        for name in [SITE_FILE_NAME, YAML_SITE_FILE_NAME] {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        tracing::debug!(dir = %dir.display(), "no security site file, using defaults");
        Ok(Self::default())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn security_mode(&self) -> Option<&str> {
        self.get(SECURITY_MODE)
    }

    /// Kerberos principal of the server, e.g. `sentry/host@REALM`
    pub fn server_principal(&self) -> Option<&str> {
        self.get(SERVER_PRINCIPAL)
    }

    /// Groups with administrative rights; blank entries dropped
    pub fn admin_groups(&self) -> Vec<String> {
        self.get(ADMIN_GROUP)
            .map(|groups| {
                groups
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn provider(&self) -> Option<&str> {
        self.get(PROVIDER)
    }
}
