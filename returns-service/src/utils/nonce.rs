//! Anti-forgery tokens: hex-encoded HMAC-SHA256 over the action name and a
//! coarse time bucket. A token verifies in the bucket it was issued in and
//! the one after, giving roughly a day of validity.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const BUCKET_SECS: i64 = 12 * 60 * 60;

pub fn issue(secret: &Secret<String>, action: &str, now: i64) -> String {
    sign(secret, action, now / BUCKET_SECS)
}

pub fn verify(secret: &Secret<String>, action: &str, token: &str, now: i64) -> bool {
    let bucket = now / BUCKET_SECS;
    [bucket, bucket - 1].iter().any(|candidate| {
        let expected = sign(secret, action, *candidate);
        expected.as_bytes().ct_eq(token.as_bytes()).into()
    })
}

pub fn now_ts() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

fn sign(secret: &Secret<String>, action: &str, bucket: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(format!("{}|{}", action, bucket).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
