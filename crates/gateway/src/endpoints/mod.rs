//! # Gatewayエンドポイント
//!
//! - `POST /cards` — カード画像のアップロード
//! - `GET /cards` — カード情報と署名付きURLの取得
//!
//! すべてのレスポンスにCORSヘッダーを付与する。

pub mod cards;

pub use cards::{handle_get_card, handle_post_card};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::HeaderValue;
use axum::routing::post;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayState;

/// `Access-Control-Allow-Headers` に列挙するヘッダー
pub const CORS_ALLOW_HEADERS: &str = "card-name,card-id,X-Amz-Date,X-Api-Key,X-Amz-Security-Token,\
X-Requested-With,X-Auth-Token,Referer,User-Agent,Origin,Content-Type,Authorization,Accept,\
Access-Control-Allow-Methods,Access-Control-Allow-Origin,Access-Control-Allow-Headers";

/// ルーターを構築する。
pub fn router(state: Arc<GatewayState>) -> Router {
    let max_upload_size = state.max_upload_size;

    Router::new()
        .route("/cards", post(handle_post_card).get(handle_get_card))
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
