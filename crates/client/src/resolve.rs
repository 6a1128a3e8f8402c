use serde::Deserialize;
use specify_domain::model::{FieldDetail, SpecifyAd};
use specify_domain::session::VOID_LOCAL_ID;

use crate::error::SpecifyError;
use crate::transport::RawResponse;

/// Success payload as the server sends it: the ad plus the session identifier
/// the SDK strips before handing the ad to the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdPayload {
    #[serde(flatten)]
    ad: SpecifyAd,
    #[serde(default)]
    local_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ValidationBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Vec<FieldDetail>,
}

/// Body shape probed on 404 responses for the cache-void sentinel.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct NotFoundBody {
    #[serde(default)]
    local_id: Option<String>,
}

/// Cache side-effect the resolver instructs the client to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CacheDirective {
    Remember(String),
    Clear,
    Keep,
}

#[derive(Debug)]
pub(crate) struct Resolution {
    pub ad: Option<SpecifyAd>,
    pub cache: CacheDirective,
}

/// Maps the raw HTTP outcome onto the SDK contract. Total over all statuses:
/// every path yields exactly one of resolved ad, no fill, or typed error.
pub(crate) fn resolve_response(response: RawResponse) -> Result<Resolution, SpecifyError> {
    match response.status {
        200..=299 => {
            let payload: AdPayload =
                serde_json::from_str(&response.body).map_err(|err| SpecifyError::Api {
                    status: 0,
                    message: format!("malformed ad payload: {err}"),
                })?;

            let cache = match payload.local_id.as_deref() {
                Some(VOID_LOCAL_ID) => CacheDirective::Clear,
                Some(id) => CacheDirective::Remember(id.to_owned()),
                None => CacheDirective::Keep,
            };

            Ok(Resolution {
                ad: Some(payload.ad),
                cache,
            })
        }
        404 => {
            let body: NotFoundBody = serde_json::from_str(&response.body).unwrap_or_default();
            let cache = if body.local_id.as_deref() == Some(VOID_LOCAL_ID) {
                CacheDirective::Clear
            } else {
                CacheDirective::Keep
            };

            Ok(Resolution { ad: None, cache })
        }
        401 => Err(SpecifyError::Authentication(
            "invalid publisher key".to_string(),
        )),
        400 => {
            let body: ValidationBody = serde_json::from_str(&response.body).unwrap_or_default();
            Err(SpecifyError::Validation {
                message: body.error.unwrap_or_else(|| "invalid request".to_string()),
                details: body.details,
            })
        }
        status => Err(SpecifyError::Api {
            status,
            message: format!("unexpected response status {status}"),
        }),
    }
}
