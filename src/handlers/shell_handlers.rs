//! HTTP surface for the offline shell: serves `/shell/*` through the cache
//! worker so the PWA assets keep working when the asset origin is unreachable.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::offline::router::ShellRequest;
use crate::offline::store::CachedResponse;
use crate::offline::worker::{CacheWorker, FsOrigin, ServedFrom};

fn to_http(response: CachedResponse, served_from: ServedFrom) -> HttpResponse {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    HttpResponse::build(status)
        .insert_header(("X-Served-From", served_from_label(served_from)))
        .content_type(response.content_type)
        .body(response.body)
}

fn served_from_label(served_from: ServedFrom) -> &'static str {
    match served_from {
        ServedFrom::Network => "network",
        ServedFrom::Cache => "cache",
        ServedFrom::OfflineFallback => "offline-fallback",
        ServedFrom::Timeout => "timeout",
    }
}

/// The browser-side worker script. A worker's maximum scope is the directory
/// it was served from, so this must come from the root path, not /static.
pub async fn worker_script() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(include_str!("../../static/service-worker.js"))
}

pub async fn serve(
    worker: web::Data<CacheWorker<FsOrigin>>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let tail = path.into_inner();
    let url = format!("/{tail}");

    // A top-level document load advertises text/html; those get the offline
    // page instead of a bare 408 when nothing can answer.
    let navigation = req
        .headers()
        .get("Accept")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"));

    let shell_req = if navigation {
        ShellRequest::navigate(&url)
    } else {
        ShellRequest::get(&url)
    };

    match worker.handle(&shell_req) {
        Some((response, served_from)) => to_http(response, served_from),
        None => match worker.passthrough(&shell_req) {
            Ok(response) => to_http(response, ServedFrom::Network),
            Err(e) => {
                log::warn!("Shell passthrough failed for {url}: {e}");
                HttpResponse::NotFound().finish()
            }
        },
    }
}
