use hmac::{Hmac, Mac};
use sha2::Sha512;
use url::Url;

type HmacSha512 = Hmac<Sha512>;

/// Webservice name mixed into every signature.
pub const HMAC_SERVICE_NAME: &str = "paystation";

const TIMESTAMP_PARAM: &str = "pstn_HMACTimestamp";
const HMAC_PARAM: &str = "pstn_HMAC";

/// HMAC-SHA512 over `timestamp || "paystation" || body`, lowercase hex.
///
/// The three parts are concatenated without separators, the remote verifier
/// rebuilds the exact same byte string.
pub fn sign(timestamp: i64, body: &str, key: &str) -> String {
    let mut mac =
        HmacSha512::new_from_slice(key.as_bytes()).expect("hmac accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(HMAC_SERVICE_NAME.as_bytes());
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEndpoint {
    pub base_url: &'static str,
    pub timestamp: i64,
    pub hmac: String,
}

impl SignedEndpoint {
    pub fn new(base_url: &'static str, timestamp: i64, body: &str, key: &str) -> Self {
        Self {
            base_url,
            timestamp,
            hmac: sign(timestamp, body, key),
        }
    }

    pub fn to_url(&self) -> Url {
        let mut url = Url::parse(self.base_url).expect("endpoint constants are valid urls");
        url.query_pairs_mut()
            .append_pair(TIMESTAMP_PARAM, &self.timestamp.to_string())
            .append_pair(HMAC_PARAM, &self.hmac);
        url
    }
}

/// Resolve the url a request body is posted to. Signed when a key is present.
pub fn endpoint(base_url: &'static str, body: &str, hmac_key: Option<&str>) -> Url {
    match hmac_key {
        Some(key) => {
            let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
            SignedEndpoint::new(base_url, timestamp, body, key).to_url()
        }
        None => Url::parse(base_url).expect("endpoint constants are valid urls"),
    }
}

/// Reads the signature query pair back out of a signed url.
pub fn signature_of(url: &Url) -> Option<(i64, String)> {
    let mut timestamp = None;
    let mut hmac = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            TIMESTAMP_PARAM => timestamp = value.parse().ok(),
            HMAC_PARAM => hmac = Some(value.into_owned()),
            _ => {}
        }
    }
    Some((timestamp?, hmac?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.paystation.co.nz/direct/paystation.dll";

    #[test]
    fn signature_is_deterministic() {
        let body = "paystation=_empty&pstn_pi=500600";
        assert_eq!(sign(1_400_000_000, body, "abc"), sign(1_400_000_000, body, "abc"));
    }

    #[test]
    fn signature_is_lowercase_sha512_hex() {
        let sig = sign(1_400_000_000, "body", "abc");
        assert_eq!(sig.len(), 128);
        assert!(sig.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn every_input_changes_signature() {
        let base = sign(1_400_000_000, "body", "abc");
        assert_ne!(base, sign(1_400_000_001, "body", "abc"));
        assert_ne!(base, sign(1_400_000_000, "body2", "abc"));
        assert_ne!(base, sign(1_400_000_000, "body", "abd"));
    }

    #[test]
    fn signs_plain_concatenation() {
        // Same bytes once concatenated, so the signature must match.
        let mut mac = HmacSha512::new_from_slice(b"abc").unwrap();
        mac.update(b"1400000000paystationbody");
        let expected = hex::encode(mac.finalize().into_bytes());
        assert_eq!(sign(1_400_000_000, "body", "abc"), expected);
    }

    #[test]
    fn unsigned_endpoint_is_untouched() {
        let url = endpoint(BASE, "a=b", None);
        assert_eq!(url.as_str(), BASE);
        assert_eq!(signature_of(&url), None);
    }

    #[test]
    fn signed_endpoint_round_trips() {
        let body = "paystation=_empty&pstn_pi=500600&pstn_gi=FOOBAR";
        let url = endpoint(BASE, body, Some("abc"));
        assert!(url.as_str().starts_with(BASE));
        let (timestamp, hmac) = signature_of(&url).unwrap();
        assert_eq!(hmac, sign(timestamp, body, "abc"));
    }

    #[test]
    fn signed_endpoint_query_layout() {
        let endpoint = SignedEndpoint {
            base_url: BASE,
            timestamp: 42,
            hmac: "beef".into(),
        };
        assert_eq!(
            endpoint.to_url().as_str(),
            format!("{BASE}?pstn_HMACTimestamp=42&pstn_HMAC=beef")
        );
    }
}
