use std::collections::HashSet;

use specify_domain::model::{WalletAddress, MAX_WALLET_ADDRESSES};
use specify_domain::session::CachedSession;

use crate::client::ServeOptions;
use crate::error::SpecifyError;
use crate::transport::AdRequest;

/// Builds the outgoing wire request from caller-supplied addresses plus the
/// cached session. All validation happens here, before any network traffic.
///
/// Supplied addresses are validated and deduplicated preserving first-seen
/// order, and the count bound applies to that unique set. Cached addresses
/// union in behind the supplied ones, capped at [`MAX_WALLET_ADDRESSES`], so
/// a grown cache can never fail a call that would otherwise succeed.
pub(crate) fn compose_request<I>(
    supplied: I,
    cached: Option<&CachedSession>,
    options: &ServeOptions,
) -> Result<AdRequest, SpecifyError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut addresses = Vec::new();

    for raw in supplied {
        let raw = raw.as_ref();
        let address = WalletAddress::parse(raw).map_err(|err| {
            SpecifyError::validation(format!("invalid wallet address `{raw}`: {err}"))
        })?;
        if seen.insert(address.clone()) {
            addresses.push(address);
        }
    }

    if addresses.len() > MAX_WALLET_ADDRESSES {
        return Err(SpecifyError::validation(format!(
            "maximum {MAX_WALLET_ADDRESSES} wallet addresses allowed"
        )));
    }

    let local_id = cached.and_then(|session| session.local_id.clone());

    if let Some(session) = cached {
        for address in &session.addresses {
            if addresses.len() >= MAX_WALLET_ADDRESSES {
                break;
            }
            if seen.insert(address.clone()) {
                addresses.push(address.clone());
            }
        }
    }

    if addresses.is_empty() && local_id.is_none() {
        return Err(SpecifyError::validation(
            "at least one wallet address is required",
        ));
    }

    Ok(AdRequest {
        wallet_addresses: addresses,
        local_id,
        image_format: options.image_format,
        ad_unit_id: options.ad_unit_id.clone(),
    })
}
