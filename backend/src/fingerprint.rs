//! Server-side fingerprint derived from stable request headers. The same
//! browser/OS produces the same hash even in incognito, so submissions can be
//! limited per (fingerprint, name) as a secondary deduplication key. The
//! optional secret keeps the hash unforgeable by the client. Not a security
//! boundary.

use rocket::request::{FromRequest, Outcome, Request};
use sha2::{Digest, Sha256};

use crate::AppState;

const FINGERPRINT_HASH_LEN: usize = 32;

/// Hash of the stable client headers, or None when every header is absent.
pub fn fingerprint_hash(
    secret: Option<&str>,
    user_agent: &str,
    accept_language: &str,
    ch_ua: &str,
    ch_ua_platform: &str,
) -> Option<String> {
    let input = [
        secret.unwrap_or(""),
        user_agent,
        accept_language,
        ch_ua,
        ch_ua_platform,
    ]
    .join("|");
    if input.replace('|', "").trim().is_empty() {
        return None;
    }
    let mut hash = hex::encode(Sha256::digest(input.as_bytes()));
    hash.truncate(FINGERPRINT_HASH_LEN);
    Some(hash)
}

/// Request guard carrying the computed fingerprint for the current request.
pub struct ClientFingerprint(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientFingerprint {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let secret = request
            .rocket()
            .state::<AppState>()
            .and_then(|state| state.fingerprint_secret.as_deref());

        let header = |name: &str| request.headers().get_one(name).unwrap_or("");

        Outcome::Success(ClientFingerprint(fingerprint_hash(
            secret,
            header("user-agent"),
            header("accept-language"),
            header("sec-ch-ua"),
            header("sec-ch-ua-platform"),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::fingerprint_hash;

    #[test]
    fn stable_for_identical_headers() {
        let a = fingerprint_hash(Some("s"), "UA", "en-US", "\"Chromium\"", "\"Windows\"");
        let b = fingerprint_hash(Some("s"), "UA", "en-US", "\"Chromium\"", "\"Windows\"");
        assert_eq!(a, b);
        assert_eq!(a.unwrap().len(), 32);
    }

    #[test]
    fn none_when_all_headers_empty() {
        assert_eq!(fingerprint_hash(None, "", "", "", ""), None);
        assert_eq!(fingerprint_hash(None, "  ", "", "", ""), None);
    }

    #[test]
    fn secret_changes_the_hash() {
        let with = fingerprint_hash(Some("secret"), "UA", "en", "", "");
        let without = fingerprint_hash(None, "UA", "en", "", "");
        assert_ne!(with, without);
    }

    #[test]
    fn secret_alone_still_produces_hash() {
        assert_ne!(fingerprint_hash(Some("secret"), "", "", "", ""), None);
    }
}
