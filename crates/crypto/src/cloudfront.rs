//! # Canned Policy 署名付きURL
//!
//! CloudFrontのCanned Policy形式で署名付きURLを生成・検証する。
//!
//! ## URL形式
//! ```text
//! {resource}?Expires={epoch}&Signature={signature}&Key-Pair-Id={key_pair_id}
//! ```
//!
//! ## 署名対象（Canned Policy）
//! ```text
//! {"Statement":[{"Resource":"{resource}","Condition":{"DateLessThan":{"AWS:EpochTime":{epoch}}}}]}
//! ```
//! 空白を含まないJSON。RSASSA-PKCS1-v1_5 (SHA-1) で署名する。

use base64::Engine;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::canonical::encode_path_segment;
use crate::{unix_now, CryptoError};

/// 有効期限パラメータ名
pub const EXPIRES_PARAM: &str = "Expires";
/// 署名パラメータ名
pub const SIGNATURE_PARAM: &str = "Signature";
/// 公開鍵IDパラメータ名
pub const KEY_PAIR_ID_PARAM: &str = "Key-Pair-Id";

/// Base64エンジン（Standard）
fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

// ---------------------------------------------------------------------------
// Canned Policy
// ---------------------------------------------------------------------------

/// Canned Policy。フィールド順がそのまま署名対象のバイト列になる。
#[derive(Serialize)]
struct CannedPolicy<'a> {
    #[serde(rename = "Statement")]
    statement: [PolicyStatement<'a>; 1],
}

#[derive(Serialize)]
struct PolicyStatement<'a> {
    #[serde(rename = "Resource")]
    resource: &'a str,
    #[serde(rename = "Condition")]
    condition: PolicyCondition,
}

#[derive(Serialize)]
struct PolicyCondition {
    #[serde(rename = "DateLessThan")]
    date_less_than: EpochTime,
}

#[derive(Serialize)]
struct EpochTime {
    #[serde(rename = "AWS:EpochTime")]
    epoch_time: u64,
}

/// リソースURLと有効期限からCanned Policyの署名対象文字列を構築する。
pub fn canned_policy(resource: &str, expires_at: u64) -> Result<String, CryptoError> {
    let policy = CannedPolicy {
        statement: [PolicyStatement {
            resource,
            condition: PolicyCondition {
                date_less_than: EpochTime {
                    epoch_time: expires_at,
                },
            },
        }],
    };
    serde_json::to_string(&policy)
        .map_err(|e| CryptoError::Signing(format!("ポリシーのシリアライズに失敗: {e}")))
}

// ---------------------------------------------------------------------------
// 署名エンコード
// ---------------------------------------------------------------------------

/// 署名をURLに埋め込める形にエンコードする（`+`→`-`, `=`→`_`, `/`→`~`）。
fn encode_signature(signature: &[u8]) -> String {
    b64()
        .encode(signature)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

/// [`encode_signature`] の逆変換。
fn decode_signature(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    let standard: String = encoded
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '=',
            '~' => '/',
            other => other,
        })
        .collect();
    b64()
        .decode(standard)
        .map_err(|e| CryptoError::InvalidSignedUrl(format!("署名のBase64デコードに失敗: {e}")))
}

// ---------------------------------------------------------------------------
// 署名
// ---------------------------------------------------------------------------

/// Canned Policyで署名付きURLを生成する。
///
/// - `resource_url`: 署名対象の絶対URL（[`crate::canonicalize`] の出力）
/// - `private_key`: 署名用RSA秘密鍵
/// - `key_pair_id`: CloudFrontに登録された公開鍵のID
/// - `expires_at`: 有効期限（UNIXエポック秒）。現在時刻より後でなければならない。
///
/// PKCS#1 v1.5署名は決定的であり、同じ入力からは同じURLが得られる。
pub fn sign_canned_url(
    resource_url: &str,
    private_key: &RsaPrivateKey,
    key_pair_id: &str,
    expires_at: u64,
) -> Result<String, CryptoError> {
    let parsed = url::Url::parse(resource_url)
        .map_err(|e| CryptoError::InvalidUrl(format!("{e}: {resource_url}")))?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(CryptoError::InvalidUrl(format!(
            "ホストを持つ絶対URLではありません: {resource_url}"
        )));
    }

    if key_pair_id.is_empty() {
        return Err(CryptoError::EmptyKeyPairId);
    }

    let now = unix_now()?;
    if expires_at <= now {
        return Err(CryptoError::Signing(format!(
            "有効期限が現在時刻以前です (expires={expires_at}, now={now})"
        )));
    }

    let policy = canned_policy(resource_url, expires_at)?;
    let hashed = Sha1::digest(policy.as_bytes());
    let signature = private_key
        .sign(Pkcs1v15Sign::new::<Sha1>(), &hashed)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;

    let separator = if resource_url.contains('?') { '&' } else { '?' };
    Ok(format!(
        "{resource_url}{separator}{EXPIRES_PARAM}={expires_at}&{SIGNATURE_PARAM}={}&{KEY_PAIR_ID_PARAM}={}",
        encode_signature(&signature),
        encode_path_segment(key_pair_id),
    ))
}

// ---------------------------------------------------------------------------
// 検証
// ---------------------------------------------------------------------------

/// 検証に成功した署名付きURLの内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUrl {
    /// 署名対象のリソースURL
    pub resource: String,
    /// 公開鍵ID
    pub key_pair_id: String,
    /// 有効期限（UNIXエポック秒）
    pub expires_at: u64,
}

/// 署名付きURLを公開鍵で検証する。
///
/// `now` が有効期限以降であれば [`CryptoError::Expired`]、署名が一致しなければ
/// [`CryptoError::SignatureMismatch`] を返す。
pub fn verify_signed_url(
    signed_url: &str,
    public_key: &RsaPublicKey,
    now: u64,
) -> Result<VerifiedUrl, CryptoError> {
    // 署名パラメータはURL末尾に付与されている
    let start = ['?', '&']
        .iter()
        .filter_map(|sep| signed_url.rfind(&format!("{sep}{EXPIRES_PARAM}=")))
        .max()
        .ok_or_else(|| {
            CryptoError::InvalidSignedUrl(format!("{EXPIRES_PARAM}パラメータがありません"))
        })?;
    let resource = &signed_url[..start];

    let mut expires = None;
    let mut signature = None;
    let mut key_pair_id = None;
    for (name, value) in url::form_urlencoded::parse(signed_url[start + 1..].as_bytes()) {
        match name.as_ref() {
            EXPIRES_PARAM => expires = Some(value.into_owned()),
            SIGNATURE_PARAM => signature = Some(value.into_owned()),
            KEY_PAIR_ID_PARAM => key_pair_id = Some(value.into_owned()),
            _ => {}
        }
    }

    let expires_at: u64 = expires
        .ok_or_else(|| {
            CryptoError::InvalidSignedUrl(format!("{EXPIRES_PARAM}パラメータがありません"))
        })?
        .parse()
        .map_err(|e| CryptoError::InvalidSignedUrl(format!("{EXPIRES_PARAM}が不正です: {e}")))?;
    let signature = signature.ok_or_else(|| {
        CryptoError::InvalidSignedUrl(format!("{SIGNATURE_PARAM}パラメータがありません"))
    })?;
    let key_pair_id = key_pair_id.ok_or_else(|| {
        CryptoError::InvalidSignedUrl(format!("{KEY_PAIR_ID_PARAM}パラメータがありません"))
    })?;

    if now >= expires_at {
        return Err(CryptoError::Expired { expires_at });
    }

    let signature = decode_signature(&signature)?;
    let policy = canned_policy(resource, expires_at)?;
    let hashed = Sha1::digest(policy.as_bytes());
    public_key
        .verify(Pkcs1v15Sign::new::<Sha1>(), &hashed, &signature)
        .map_err(|_| CryptoError::SignatureMismatch)?;

    Ok(VerifiedUrl {
        resource: resource.to_string(),
        key_pair_id,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_private_key;

    const TEST_KEY: &str = include_str!("../tests/fixtures/test_rsa_2048.pem");
    const OTHER_KEY: &str = include_str!("../tests/fixtures/test_rsa_2048_other.pem");
    const RESOURCE: &str = "https://cards-bucket.s3.amazonaws.com/abc-123.jpeg";

    fn future_expiry() -> u64 {
        unix_now().unwrap() + 3600
    }

    /// Canned Policyが空白なしの固定レイアウトで構築されることを確認
    #[test]
    fn test_canned_policy_layout() {
        let policy = canned_policy(RESOURCE, 1_700_000_000).unwrap();
        assert_eq!(
            policy,
            r#"{"Statement":[{"Resource":"https://cards-bucket.s3.amazonaws.com/abc-123.jpeg","Condition":{"DateLessThan":{"AWS:EpochTime":1700000000}}}]}"#
        );
    }

    /// クエリパラメータの順序と形式を確認
    #[test]
    fn test_signed_url_query_layout() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let expires = future_expiry();
        let signed = sign_canned_url(RESOURCE, &key, "PK123", expires).unwrap();

        let prefix = format!("{RESOURCE}?Expires={expires}&Signature=");
        assert!(signed.starts_with(&prefix), "unexpected layout: {signed}");
        assert!(signed.ends_with("&Key-Pair-Id=PK123"));

        let signature = &signed[prefix.len()..signed.len() - "&Key-Pair-Id=PK123".len()];
        assert!(signature
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '~'));
    }

    /// 既にクエリを持つURLには `&` で連結されることを確認
    #[test]
    fn test_signed_url_appends_to_existing_query() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let resource = format!("{RESOURCE}?versionId=3");
        let signed = sign_canned_url(&resource, &key, "PK123", future_expiry()).unwrap();
        assert!(signed.starts_with(&format!("{resource}&Expires=")));

        let verified =
            verify_signed_url(&signed, &key.to_public_key(), unix_now().unwrap()).unwrap();
        assert_eq!(verified.resource, resource);
    }

    /// 同じ入力から同じ署名付きURLが得られることを確認
    #[test]
    fn test_signing_is_deterministic() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let expires = future_expiry();
        let first = sign_canned_url(RESOURCE, &key, "PK123", expires).unwrap();
        let second = sign_canned_url(RESOURCE, &key, "PK123", expires).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sign_and_verify() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let expires = future_expiry();
        let signed = sign_canned_url(RESOURCE, &key, "PK123", expires).unwrap();

        let verified =
            verify_signed_url(&signed, &key.to_public_key(), unix_now().unwrap()).unwrap();
        assert_eq!(
            verified,
            VerifiedUrl {
                resource: RESOURCE.to_string(),
                key_pair_id: "PK123".to_string(),
                expires_at: expires,
            }
        );
    }

    /// 有効期限ちょうどの時刻で期限切れと判定されることを確認
    #[test]
    fn test_verify_rejects_at_expiry() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let expires = future_expiry();
        let signed = sign_canned_url(RESOURCE, &key, "PK123", expires).unwrap();

        let result = verify_signed_url(&signed, &key.to_public_key(), expires);
        assert!(matches!(result, Err(CryptoError::Expired { expires_at }) if expires_at == expires));

        let result = verify_signed_url(&signed, &key.to_public_key(), expires - 1);
        assert!(result.is_ok());
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let other = parse_private_key(OTHER_KEY).unwrap();
        let signed = sign_canned_url(RESOURCE, &key, "PK123", future_expiry()).unwrap();

        let result = verify_signed_url(&signed, &other.to_public_key(), unix_now().unwrap());
        assert!(matches!(result, Err(CryptoError::SignatureMismatch)));
    }

    /// リソースや有効期限を書き換えたURLが拒否されることを確認
    #[test]
    fn test_verify_rejects_tampering() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let public_key = key.to_public_key();
        let expires = future_expiry();
        let signed = sign_canned_url(RESOURCE, &key, "PK123", expires).unwrap();
        let now = unix_now().unwrap();

        let other_resource = signed.replace("abc-123.jpeg", "abc-124.jpeg");
        assert!(matches!(
            verify_signed_url(&other_resource, &public_key, now),
            Err(CryptoError::SignatureMismatch)
        ));

        let extended = signed.replace(
            &format!("Expires={expires}"),
            &format!("Expires={}", expires + 86_400),
        );
        assert!(matches!(
            verify_signed_url(&extended, &public_key, now),
            Err(CryptoError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_verify_rejects_missing_parameters() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let public_key = key.to_public_key();
        let now = unix_now().unwrap();

        assert!(matches!(
            verify_signed_url(RESOURCE, &public_key, now),
            Err(CryptoError::InvalidSignedUrl(_))
        ));

        let no_signature = format!("{RESOURCE}?Expires={}&Key-Pair-Id=PK123", now + 60);
        assert!(matches!(
            verify_signed_url(&no_signature, &public_key, now),
            Err(CryptoError::InvalidSignedUrl(_))
        ));
    }

    #[test]
    fn test_sign_rejects_past_expiry() {
        let key = parse_private_key(TEST_KEY).unwrap();
        let now = unix_now().unwrap();
        assert!(matches!(
            sign_canned_url(RESOURCE, &key, "PK123", now),
            Err(CryptoError::Signing(_))
        ));
        assert!(matches!(
            sign_canned_url(RESOURCE, &key, "PK123", now - 10),
            Err(CryptoError::Signing(_))
        ));
    }

    #[test]
    fn test_sign_rejects_relative_url() {
        let key = parse_private_key(TEST_KEY).unwrap();
        assert!(matches!(
            sign_canned_url("/abc-123.jpeg", &key, "PK123", future_expiry()),
            Err(CryptoError::InvalidUrl(_))
        ));
        assert!(matches!(
            sign_canned_url(RESOURCE, &key, "", future_expiry()),
            Err(CryptoError::EmptyKeyPairId)
        ));
    }
}
