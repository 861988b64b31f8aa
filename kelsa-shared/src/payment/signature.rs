/// Payment signature computation
///
/// The gateway signs a completed payment as the lowercase hex
/// HMAC-SHA256 of `"{order_id}|{payment_id}"` keyed with the merchant
/// secret. The server recomputes it and compares in constant time.
///
/// # Example
///
/// ```
/// use kelsa_shared::payment::signature::{compute_signature, verify_signature};
///
/// # fn example() -> Result<(), kelsa_shared::payment::PaymentError> {
/// let sig = compute_signature("merchant-secret", "order_1", "pay_1")?;
/// assert_eq!(sig.len(), 64);
/// assert!(verify_signature("merchant-secret", "order_1", "pay_1", &sig)?);
/// # Ok(())
/// # }
/// ```

use super::PaymentError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signature the gateway is expected to send for this order and payment
pub fn compute_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
) -> Result<String, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Signature(e.to_string()))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// True if `signature` is exactly the expected signature
pub fn verify_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<bool, PaymentError> {
    let expected = compute_signature(secret, order_id, payment_id)?;
    Ok(constant_time_compare(&expected, signature))
}

/// Compares two strings without short-circuiting on the first difference
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |diff, (x, y)| diff | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let mut mac = HmacSha256::new_from_slice(b"key").unwrap();
        mac.update(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(
            hex::encode(mac.finalize().into_bytes()),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_signature_covers_both_references() {
        let sig = compute_signature("secret", "order_1", "pay_1").unwrap();

        assert_eq!(sig, compute_signature("secret", "order_1", "pay_1").unwrap());
        assert_ne!(sig, compute_signature("secret", "order_1", "pay_2").unwrap());
        assert_ne!(sig, compute_signature("secret", "order_2", "pay_1").unwrap());
        assert_ne!(sig, compute_signature("other", "order_1", "pay_1").unwrap());
        assert_eq!(sig, sig.to_lowercase());
    }

    #[test]
    fn test_single_bit_flip_is_rejected() {
        let sig = compute_signature("secret", "order_1", "pay_1").unwrap();
        let mut tampered = sig.clone().into_bytes();
        tampered[10] ^= 0x01;
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(verify_signature("secret", "order_1", "pay_1", &sig).unwrap());
        assert!(!verify_signature("secret", "order_1", "pay_1", &tampered).unwrap());
        assert!(!verify_signature("secret", "order_1", "pay_1", &sig.to_uppercase()).unwrap());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("", ""));
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
