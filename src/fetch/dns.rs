//! DNS pre-check for upstream hosts.

use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use log::{debug, warn};
use url::{Host, Url};

use crate::config::DNS_TIMEOUT_SECS;

/// Returns the domain name of `url`, or `None` for IP literals and unparsable URLs.
pub(crate) fn dns_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.host()? {
        Host::Domain(domain) => Some(domain.trim_end_matches('.').to_string()),
        Host::Ipv4(_) | Host::Ipv6(_) => None,
    }
}

/// Resolves the host of `url` once before fetching it.
///
/// A failed lookup is only logged: the request itself still runs and reports
/// the real transport error. Returns the first resolved address, if any.
pub(crate) async fn precheck_host(url: &str, resolver: &TokioAsyncResolver) -> Option<String> {
    let host = dns_host(url)?;
    let lookup = tokio::time::timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        resolver.lookup_ip(host.as_str()),
    )
    .await;

    match lookup {
        Ok(Ok(response)) => match response.iter().next() {
            Some(ip) => {
                debug!("Resolved {host} to {ip}");
                Some(ip.to_string())
            }
            None => {
                warn!("DNS lookup for {host} returned no addresses");
                None
            }
        },
        Ok(Err(e)) => {
            warn!("DNS lookup for {host} failed: {e}");
            None
        }
        Err(_) => {
            warn!("DNS lookup for {host} timed out after {DNS_TIMEOUT_SECS}s");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_host_domain() {
        assert_eq!(
            dns_host("https://restcountries.com/v2/all?fields=name").as_deref(),
            Some("restcountries.com")
        );
        assert_eq!(
            dns_host("http://open.er-api.com./v6/latest/USD").as_deref(),
            Some("open.er-api.com")
        );
    }

    #[test]
    fn test_dns_host_skips_ip_literals() {
        assert_eq!(dns_host("http://127.0.0.1:8080/all"), None);
        assert_eq!(dns_host("http://[::1]:8080/all"), None);
    }

    #[test]
    fn test_dns_host_invalid_url() {
        assert_eq!(dns_host("not a url"), None);
    }

    #[tokio::test]
    async fn test_precheck_skips_ip_literal_without_lookup() {
        let resolver = crate::initialization::init_resolver();
        assert_eq!(precheck_host("http://127.0.0.1:1/x", &resolver).await, None);
    }

    #[tokio::test]
    async fn test_precheck_unresolvable_host_is_not_fatal() {
        let resolver = crate::initialization::init_resolver();
        // .invalid is reserved and never resolves
        let result = precheck_host("http://country-status.invalid/all", &resolver).await;
        assert_eq!(result, None);
    }
}
