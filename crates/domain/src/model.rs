//! Data structures shared across the SDK crates: publisher credentials,
//! wallet addresses, and the resolved ad payload.

use hex::encode as hex_encode;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use strum_macros::{AsRefStr, EnumString};
use thiserror::Error;

/// Required prefix for publisher keys issued by the ad service.
pub const PUBLISHER_KEY_PREFIX: &str = "spk_";

/// Required total length (prefix included) of a publisher key.
pub const PUBLISHER_KEY_LENGTH: usize = 34;

/// Required total length of a wallet address (`0x` + 40 hex characters).
pub const WALLET_ADDRESS_LENGTH: usize = 42;

/// Upper bound on unique wallet addresses accepted per resolution call.
pub const MAX_WALLET_ADDRESSES: usize = 50;

/// Errors emitted when a publisher key fails the shape check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyFormatError {
    #[error("publisher key must start with `{PUBLISHER_KEY_PREFIX}`")]
    WrongPrefix,
    #[error("publisher key must be exactly {PUBLISHER_KEY_LENGTH} characters")]
    WrongLength,
}

/// Errors emitted when a wallet address fails the shape check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressFormatError {
    #[error("wallet address must start with `0x`")]
    MissingPrefix,
    #[error("wallet address must be exactly {WALLET_ADDRESS_LENGTH} characters")]
    WrongLength,
    #[error("wallet address contains non-hex characters")]
    NonHex,
}

/// Validates that the supplied key matches the `spk_` + fixed-length contract.
pub fn validate_publisher_key(key: &str) -> Result<(), KeyFormatError> {
    if !key.starts_with(PUBLISHER_KEY_PREFIX) {
        return Err(KeyFormatError::WrongPrefix);
    }

    if key.len() != PUBLISHER_KEY_LENGTH {
        return Err(KeyFormatError::WrongLength);
    }

    Ok(())
}

/// Validates that the supplied address matches `0x` + 40 hex characters.
/// Hex digits are accepted in either case; nothing is normalized.
pub fn validate_wallet_address(address: &str) -> Result<(), AddressFormatError> {
    if !address.starts_with("0x") {
        return Err(AddressFormatError::MissingPrefix);
    }

    if address.len() != WALLET_ADDRESS_LENGTH {
        return Err(AddressFormatError::WrongLength);
    }

    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressFormatError::NonHex);
    }

    Ok(())
}

/// Credential identifying the integrating application to the ad service.
/// Immutable once parsed; the raw value only ever travels in the `x-api-key`
/// header and must never appear in logs (use [`PublisherKey::fingerprint`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherKey(String);

impl PublisherKey {
    pub fn parse(key: &str) -> Result<Self, KeyFormatError> {
        validate_publisher_key(key)?;
        Ok(Self(key.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic SHA3-256 fingerprint of the key, truncated to 16 hex
    /// characters. Safe to attach to log lines and metrics.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(self.0.as_bytes());
        let digest = hasher.finalize();
        let mut fingerprint = hex_encode(digest);
        fingerprint.truncate(16);
        fingerprint
    }
}

/// EVM-style wallet address. Equality is exact string equality: two addresses
/// differing only in hex case are distinct values, matching the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(address: &str) -> Result<Self, AddressFormatError> {
        validate_wallet_address(address)?;
        Ok(Self(address.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = AddressFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_wallet_address(&value)?;
        Ok(Self(value))
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Intended rendering shape of the ad creative. Passed through to the server
/// verbatim; membership is the only validation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageFormat {
    Landscape,
    Square,
    LongBanner,
    ShortBanner,
    NoImage,
}

/// Resolved ad payload returned to the caller. Produced only by a successful
/// resolution; the embedded cache identifier is stripped before this value is
/// handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecifyAd {
    pub wallet_address: WalletAddress,
    pub campaign_id: String,
    pub ad_id: String,
    pub headline: String,
    pub content: String,
    pub cta_url: String,
    pub cta_label: String,
    pub image_url: String,
    pub community_name: String,
    pub community_logo: String,
    pub image_format: ImageFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_unit_id: Option<String>,
}

/// Field-level detail attached to server-side validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDetail {
    pub field: String,
    pub message: String,
}
