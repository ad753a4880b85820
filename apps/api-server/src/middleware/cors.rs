//! Cross-origin policy: only configured origins may call the API.

use actix_cors::Cors;
use actix_web::http::{Method, Uri, header};

/// Build the CORS middleware from the configured allow-list.
///
/// A single `*` entry allows any origin. Entries that are not absolute
/// `scheme://host[:port]` origins are skipped with a warning.
pub fn cors(allowed_origins: &[String]) -> Cors {
    let base = Cors::default()
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if allowed_origins.len() == 1 && allowed_origins[0] == "*" {
        return base.allow_any_origin();
    }

    allowed_origins
        .iter()
        .filter(|origin| {
            let valid = origin
                .parse::<Uri>()
                .map(|uri| uri.scheme().is_some() && uri.host().is_some())
                .unwrap_or(false);
            if !valid {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
            }
            valid
        })
        .fold(base, |cors, origin| cors.allowed_origin(origin))
}
