use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::error;

/// Header Telegram sets when the webhook was registered with a `secret_token`.
pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

type HmacSha256 = Hmac<Sha256>;

fn digest(key: &[u8], value: &str) -> Option<HmacSha256> {
    match HmacSha256::new_from_slice(key) {
        Ok(mut mac) => {
            mac.update(value.as_bytes());
            Some(mac)
        }
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            None
        }
    }
}

/// Compare the received secret token against the configured one.
///
/// Both values are MACed under the expected secret and compared with
/// `verify_slice`, so timing does not leak how much of the token matched.
#[must_use]
pub fn verify_webhook_secret(received: &str, expected: &str) -> bool {
    let key = expected.as_bytes();
    let (Some(expected_mac), Some(received_mac)) = (digest(key, expected), digest(key, received))
    else {
        return false;
    };

    let expected_tag = expected_mac.finalize().into_bytes();
    if received_mac.verify_slice(&expected_tag).is_ok() {
        true
    } else {
        error!("Webhook secret token mismatch");
        false
    }
}
