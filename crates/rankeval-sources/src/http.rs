//! Shared `ureq` agent construction and error mapping.

use crate::source::SourceError;
use rankeval_core::config::FetchConfig;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build the blocking HTTP agent shared by all requests of one source.
#[must_use]
pub fn build_agent(fetch: &FetchConfig, user_agent: &str) -> ureq::Agent {
    let mut builder = ureq::AgentBuilder::new().user_agent(user_agent);
    if fetch.timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(fetch.timeout_secs));
    }
    builder.build()
}

/// Convert a `ureq` failure into a [`SourceError`] tagged with `url`.
#[must_use]
pub fn map_error(url: &str, err: ureq::Error) -> SourceError {
    match err {
        ureq::Error::Status(status, _) => SourceError::Status {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(transport) => SourceError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

/// Send `request` and decode a JSON body.
///
/// # Errors
///
/// Returns [`SourceError`] on transport failure, a non-2xx status, or a body
/// that does not decode as `T`.
pub fn call_json<T: DeserializeOwned>(url: &str, request: ureq::Request) -> Result<T, SourceError> {
    let response = request.call().map_err(|err| map_error(url, err))?;
    response
        .into_json::<T>()
        .map_err(|err| SourceError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
}

/// Join a base URL and a relative path with exactly one slash.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalises_slashes() {
        assert_eq!(
            join_url("http://localhost:8983/solr/wiki/", "/browse"),
            "http://localhost:8983/solr/wiki/browse"
        );
        assert_eq!(
            join_url("http://localhost:8983/solr/wiki", "update?commit=true"),
            "http://localhost:8983/solr/wiki/update?commit=true"
        );
    }

    #[test]
    fn agent_builds_without_timeout() {
        let fetch = FetchConfig {
            timeout_secs: 0,
            max_in_flight: 0,
        };
        let _agent = build_agent(&fetch, "rankeval-test");
    }
}
