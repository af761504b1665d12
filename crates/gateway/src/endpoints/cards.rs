//! # /cards
//!
//! カード画像をオブジェクトストアに保存し、メタデータテーブルに登録する。
//! 取得時は保存先の署名付きURLを発行して返す。

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use cards_types::{CardRecord, GetCardResponse, PostCardResponse, ResourceReference};

use crate::config::GatewayState;
use crate::error::GatewayError;

/// 表示名を受け取るリクエストヘッダー
pub const CARD_NAME_HEADER: &str = "card-name";
/// カードIDを受け取るリクエストヘッダー
pub const CARD_ID_HEADER: &str = "card-id";
/// 保存するカード画像のContent-Type
pub const CARD_CONTENT_TYPE: &str = "image/jpeg";

/// 必須ヘッダーをUTF-8文字列として取り出す。
fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, GatewayError> {
    let value = headers
        .get(name)
        .ok_or_else(|| GatewayError::BadRequest(format!("{name}ヘッダーがありません")))?;
    let value = std::str::from_utf8(value.as_bytes())
        .map_err(|_| GatewayError::BadRequest(format!("{name}ヘッダーがUTF-8ではありません")))?
        .trim();
    if value.is_empty() {
        return Err(GatewayError::BadRequest(format!("{name}ヘッダーが空です")));
    }
    Ok(value)
}

/// POST /cards — カード画像のアップロード。
///
/// `{uuid}.jpeg` をカードID兼オブジェクトキーとして採番し、
/// 画像の保存 → メタデータ登録の順に行う。
pub async fn handle_post_card(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PostCardResponse>, GatewayError> {
    let display_name = required_header(&headers, CARD_NAME_HEADER)?;

    if body.is_empty() {
        return Err(GatewayError::BadRequest(
            "カード画像が空です".to_string(),
        ));
    }
    if body.len() > state.max_upload_size {
        return Err(GatewayError::BadRequest(format!(
            "カード画像が上限を超えています: {} bytes (上限: {} bytes)",
            body.len(),
            state.max_upload_size
        )));
    }

    let card_id = format!("{}.jpeg", uuid::Uuid::new_v4());

    state
        .object_store
        .put_object(&card_id, &body, CARD_CONTENT_TYPE)
        .await?;

    let record = CardRecord {
        id: card_id.clone(),
        display_name: display_name.to_string(),
        resource_reference: ResourceReference::new(state.bucket_name.clone(), card_id.clone()),
    };
    state.metadata_store.put_card(&record).await?;

    tracing::info!(card_id = %card_id, size = body.len(), "カードを登録");

    Ok(Json(PostCardResponse { card_id }))
}

/// GET /cards — カード情報と署名付きURLの取得。
pub async fn handle_get_card(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> Result<Json<GetCardResponse>, GatewayError> {
    let card_id = required_header(&headers, CARD_ID_HEADER)?;

    let record = state
        .metadata_store
        .get_card(card_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("カードが存在しません: {card_id}")))?;

    let signed = state.issuer.issue_signed_url(
        &record.resource_reference.container_name,
        &record.resource_reference.object_key,
    )?;

    Ok(Json(GetCardResponse {
        card_id: record.id,
        card_name: record.display_name,
        card_template_url: signed.url,
        expires_at: signed.expires_at,
    }))
}
