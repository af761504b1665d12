//! # リソースURLの正規化
//!
//! バケット名とオブジェクトキーから、署名対象となる正規URLを構築する。

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::CryptoError;

/// パスセグメントとしてエスケープする文字集合。
/// 英数字と `- _ . ~`（RFC 3986 unreserved）以外はすべてエスケープする。
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// オブジェクトキーをパスセグメントとしてパーセントエンコードする。
pub(crate) fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// バケット名とオブジェクトキーから正規URLを構築する。
///
/// 形式: `https://{container_name}.s3.amazonaws.com/{encoded_object_key}`
///
/// オブジェクトキー中の `/` もエスケープされるため、キー全体が1つのパス
/// セグメントになる。同じ入力には常に同じバイト列を返す。
pub fn canonicalize(container_name: &str, object_key: &str) -> Result<String, CryptoError> {
    if container_name.is_empty() || object_key.is_empty() {
        return Err(CryptoError::InvalidReference(
            "バケット名とオブジェクトキーは必須です".to_string(),
        ));
    }

    // バケット名はホスト名の一部になる
    if !container_name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
    {
        return Err(CryptoError::InvalidReference(format!(
            "バケット名に使用できない文字が含まれています: {container_name}"
        )));
    }

    Ok(format!(
        "https://{container_name}.s3.amazonaws.com/{}",
        encode_path_segment(object_key)
    ))
}
