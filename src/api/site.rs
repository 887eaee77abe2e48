//! Site surface endpoints
//!
//! Public metadata for the frontend shell, plus robots.txt and sitemap.xml
//! served at the root.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/info", get(site_info))
}

#[derive(Debug, Serialize)]
struct SiteInfo {
    name: String,
    description: String,
    base_url: String,
}

/// GET /api/v1/site/info - Public site metadata
async fn site_info(State(state): State<AppState>) -> Json<SiteInfo> {
    Json(SiteInfo {
        name: state.site_config.name.clone(),
        description: state.site_config.description.clone(),
        base_url: state.site_config.base_url.clone(),
    })
}

/// GET /robots.txt - Keep crawlers out of the dashboard and the API
pub async fn robots_txt() -> impl IntoResponse {
    let body = "User-agent: *\nDisallow: /dashboard\nDisallow: /api\nAllow: /\n";
    ([(header::CONTENT_TYPE, "text/plain")], body)
}

/// GET /sitemap.xml - Static pages plus a sample of dynamic content paths.
// TODO: generate the dynamic entries from the database instead of this
// hardcoded sample
pub async fn sitemap_xml(State(state): State<AppState>) -> impl IntoResponse {
    let base = state.site_config.base_url.trim_end_matches('/');
    let static_paths = ["", "/about", "/programs", "/news", "/gallery", "/contact", "/donate"];
    let sample_paths = ["/news/1", "/news/2", "/programs/1", "/programs/2"];

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for path in static_paths.iter().chain(sample_paths.iter()) {
        xml.push_str(&format!("  <url><loc>{}{}</loc></url>\n", base, path));
    }
    xml.push_str("</urlset>\n");

    ([(header::CONTENT_TYPE, "application/xml")], xml)
}
