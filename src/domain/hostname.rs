// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hostname and DNS Label Value Objects with DNS Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Hostname validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostnameError {
    #[error("Hostname is empty")]
    Empty,

    #[error("Hostname exceeds maximum length of 253 characters: {0}")]
    TooLong(usize),

    #[error("Label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("Invalid character in hostname: {0}")]
    InvalidCharacter(char),

    #[error("Label cannot start or end with hyphen: {0}")]
    InvalidLabelFormat(String),

    #[error("Top-level label cannot be all numeric: {0}")]
    NumericLabel(String),

    #[error("Expected a single DNS label, got a dotted name: {0}")]
    NotALabel(String),
}

/// Maximum total length for FQDN (RFC 1123)
pub const MAX_HOSTNAME_LENGTH: usize = 253;

/// Maximum length for a single label (RFC 1123)
pub const MAX_LABEL_LENGTH: usize = 63;

/// Validate a single DNS label
fn validate_label(label: &str) -> Result<(), HostnameError> {
    if label.is_empty() {
        return Err(HostnameError::Empty);
    }

    if label.len() > MAX_LABEL_LENGTH {
        return Err(HostnameError::LabelTooLong(label.to_string()));
    }

    for ch in label.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' {
            return Err(HostnameError::InvalidCharacter(ch));
        }
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(HostnameError::InvalidLabelFormat(label.to_string()));
    }

    Ok(())
}

/// Fully Qualified Domain Name (FQDN) value object
///
/// Represents a DNS zone apex or hostname following RFC 1123. Stored in
/// lowercase canonical form.
///
/// # Examples
///
/// ```rust
/// use cim_app_stack::domain::Hostname;
///
/// let domain = Hostname::new("Example.COM").unwrap();
/// assert_eq!(domain.as_str(), "example.com");
///
/// assert!(Hostname::new("").is_err());
/// assert!(Hostname::new("-invalid.com").is_err());
/// assert!(Hostname::new("example.123").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hostname(String);

impl Hostname {
    /// Create a new hostname with validation
    ///
    /// # Invariants
    /// - Non-empty, total length ≤ 253 characters
    /// - Each label ≤ 63 characters, alphanumeric and hyphens only
    /// - No label starts or ends with a hyphen
    /// - The top-level label is not all numeric
    pub fn new(hostname: impl Into<String>) -> Result<Self, HostnameError> {
        let hostname = hostname.into().to_ascii_lowercase();
        let hostname = hostname.strip_suffix('.').unwrap_or(&hostname).to_string();

        if hostname.is_empty() {
            return Err(HostnameError::Empty);
        }

        if hostname.len() > MAX_HOSTNAME_LENGTH {
            return Err(HostnameError::TooLong(hostname.len()));
        }

        for label in hostname.split('.') {
            validate_label(label)?;
        }

        if let Some(tld) = hostname.rsplit('.').next() {
            if tld.chars().all(|c| c.is_ascii_digit()) {
                return Err(HostnameError::NumericLabel(tld.to_string()));
            }
        }

        Ok(Self(hostname))
    }

    /// Get the hostname as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get labels as a vector
    pub fn labels(&self) -> Vec<&str> {
        self.0.split('.').collect()
    }

    /// Prefix this name with a single label: `{label}.{self}`
    pub fn with_label(&self, label: &DnsLabel) -> Result<Hostname, HostnameError> {
        Hostname::new(format!("{}.{}", label.as_str(), self.0))
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Hostname {
    type Error = HostnameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Hostname {
    type Error = HostnameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Hostname> for String {
    fn from(value: Hostname) -> Self {
        value.0
    }
}

/// A single DNS label, such as the `app` in `app.example.com`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DnsLabel(String);

impl DnsLabel {
    pub fn new(label: impl Into<String>) -> Result<Self, HostnameError> {
        let label = label.into().to_ascii_lowercase();
        if label.contains('.') {
            return Err(HostnameError::NotALabel(label));
        }
        validate_label(&label)?;
        Ok(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DnsLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DnsLabel {
    type Error = HostnameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DnsLabel> for String {
    fn from(value: DnsLabel) -> Self {
        value.0
    }
}
