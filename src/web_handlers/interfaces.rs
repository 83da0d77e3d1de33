use actix_web::http::header::USER_AGENT;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error, info, warn};
use serde::Deserialize;

use crate::generator::rewrite_subscription;
use crate::models::ClientKind;
use crate::template::{render_template, TemplateArgs};
use crate::utils::fetch_subscription;

/// Query parameters for subscription rewriting
#[derive(Deserialize, Debug, Default, Clone)]
pub struct SubsQuery {
    /// Upstream subscription URL
    pub url: Option<String>,
    /// Client kind, detected from the `User-Agent` when absent
    #[serde(rename = "clientType", alias = "client_type")]
    pub client_type: Option<String>,
}

/// Rebuild the URL the client used to reach us, honoring reverse proxy headers
pub fn request_url(req: &HttpRequest) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let scheme = header("X-Forwarded-Proto").unwrap_or_else(|| "https".to_string());
    let host = header("X-Forwarded-Host").unwrap_or_else(|| {
        let info = req.connection_info();
        info.host().to_string()
    });

    let mut url = format!("{}://{}{}", scheme, host, req.path());
    if !req.query_string().is_empty() {
        url.push('?');
        url.push_str(req.query_string());
    }
    url
}

/// Resolve the client kind from the query or the `User-Agent`
pub fn resolve_client_kind(
    query: &SubsQuery,
    req: &HttpRequest,
) -> Result<ClientKind, &'static str> {
    if let Some(client_type) = query.client_type.as_deref().filter(|s| !s.is_empty()) {
        return ClientKind::from_str(client_type).ok_or("Invalid clientType parameter");
    }

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    ClientKind::from_user_agent(user_agent).ok_or("unknown client type")
}

/// Handler for subscription rewriting
pub async fn sub_handler(req: HttpRequest, query: web::Query<SubsQuery>) -> HttpResponse {
    info!("Request query: {}", req.query_string());

    let upstream_url = match query.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return HttpResponse::BadRequest().body("Url cannot be empty"),
    };
    if let Err(e) = url::Url::parse(&upstream_url) {
        return HttpResponse::BadRequest().body(format!("Invalid url: {}", e));
    }

    let kind = match resolve_client_kind(&query, &req) {
        Ok(kind) => kind,
        Err(message) => return HttpResponse::BadRequest().body(message),
    };
    debug!("Resolved client kind {:?} for {}", kind, upstream_url);

    let upstream = match fetch_subscription(&upstream_url, kind).await {
        Ok(upstream) => upstream,
        Err(e) => {
            warn!("Failed to fetch {}: {}", upstream_url, e);
            return HttpResponse::BadGateway().body(format!("Failed to fetch remote config: {}", e));
        }
    };

    let result = match rewrite_subscription(kind, &upstream.body, &upstream.headers) {
        Ok(result) => result,
        Err(e) => {
            warn!("Failed to rewrite {}: {}", upstream_url, e);
            return HttpResponse::UnprocessableEntity().body(e.to_string());
        }
    };

    let args = TemplateArgs {
        url: request_url(&req),
        body: result.body,
    };
    let body = match render_template(kind, &args) {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to render {:?} template: {}", kind, e);
            return HttpResponse::InternalServerError().body(format!("Template error: {}", e));
        }
    };

    let mut resp = HttpResponse::Ok();
    for (name, value) in result.headers.to_pairs() {
        resp.append_header((name, value));
    }
    resp.content_type(kind.content_type());
    resp.body(body)
}

/// Register the API endpoints with Actix Web
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(sub_handler));
}
