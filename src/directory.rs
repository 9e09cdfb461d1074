// Authentication oracle and an XML-backed user directory
// The directory mirrors a `<users><user>…</user></users>` document; it is
// a reference adapter, account policy and password hashing live elsewhere.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    // True when the credentials identify a known user
    async fn verify(&self, username: &str, password: &str) -> bool;
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("XML parse error: {0}")]
    XmlParseError(String),

    #[error("Conversion error: {0}")]
    ConversionError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename = "users")]
pub struct XmlUsers {
    #[serde(rename = "user", default)]
    pub users: Vec<XmlUser>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct XmlUser {
    pub username: String,
    pub password: String,
}

#[derive(Default)]
pub struct XmlUserDirectory {
    users: RwLock<XmlUsers>,
}

impl XmlUserDirectory {
    pub fn from_xml(xml: &str) -> Result<Self, DirectoryError> {
        let users: XmlUsers = quick_xml::de::from_str(xml)
            .map_err(|e| DirectoryError::XmlParseError(e.to_string()))?;
        debug!(users = users.users.len(), "user directory loaded");

        Ok(Self {
            users: RwLock::new(users),
        })
    }

    pub fn load(path: &str) -> Result<Self, DirectoryError> {
        let xml = std::fs::read_to_string(path)?;
        Self::from_xml(&xml)
    }

    pub fn to_xml(&self) -> Result<String, DirectoryError> {
        quick_xml::se::to_string(&*self.users.read())
            .map_err(|e| DirectoryError::ConversionError(e.to_string()))
    }

    pub fn user_exists(&self, username: &str) -> bool {
        self.users
            .read()
            .users
            .iter()
            .any(|user| user.username == username)
    }

    // Adds a user unless the name is taken (case-insensitively)
    pub fn register(&self, username: &str, password: &str) -> bool {
        let mut users = self.users.write();
        if users
            .users
            .iter()
            .any(|user| user.username.eq_ignore_ascii_case(username))
        {
            return false;
        }

        users.users.push(XmlUser {
            username: username.to_string(),
            password: password.to_string(),
        });
        info!(username, "user registered");
        true
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.users
            .read()
            .users
            .iter()
            .any(|user| user.username == username && user.password == password)
    }
}

#[async_trait]
impl Authenticator for XmlUserDirectory {
    async fn verify(&self, username: &str, password: &str) -> bool {
        self.matches(username, password)
    }
}
