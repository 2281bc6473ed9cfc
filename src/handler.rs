// src/handler.rs
// Request handling: file serving, favicon suppression and request logging

use actix_files::NamedFile;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error, get, Error, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::logger;
use crate::resolve::{self, Resolved};

/// File served when a directory path is requested.
pub const DEFAULT_DOCUMENT: &str = "index.html";

pub const FAVICON_PATH: &str = "/favicon.ico";

/// Request paths that never produce a log entry. Browsers probe these on
/// their own and the noise drowns out real traffic.
pub fn is_suppressed(path: &str) -> bool {
    path == FAVICON_PATH || path.starts_with("/.well-known")
}

/// Answer favicon probes with 204 without touching the filesystem,
/// whether or not a favicon exists on disk.
#[get("/favicon.ico")]
pub async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Default service: translate the request path and stream the file.
///
/// The root path is rewritten to the default document first. Resolution
/// failures map to 403, a missing file to 404, and unexpected I/O errors to
/// 500; none of them affect any other request.
pub async fn serve_file(req: HttpRequest, document_root: PathBuf) -> Result<NamedFile, Error> {
    let mut path = req.path().to_string();

    if path == "/" {
        path = format!("/{}", DEFAULT_DOCUMENT);
    }

    let file_path = match resolve::resolve(&document_root, &path) {
        Resolved::File(file_path) => file_path,
        Resolved::Forbidden => {
            return Err(error::ErrorForbidden("Path escapes document root"));
        }
    };

    log::debug!("Trying to serve file: {:?}", file_path);

    match try_open(&file_path) {
        Ok(file) => Ok(file),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            Err(error::ErrorForbidden(err))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(error::ErrorNotFound(err)),
        Err(_) => {
            // Directory requests fall back to the default document inside it.
            let index_path = file_path.join(DEFAULT_DOCUMENT);
            match try_open(&index_path) {
                Ok(file) => Ok(file),
                Err(index_err) => Err(map_open_error(index_err, &file_path)),
            }
        }
    }
}

fn try_open(candidate: &Path) -> Result<NamedFile, io::Error> {
    let file = NamedFile::open(candidate)?;
    Ok(file.use_etag(false).use_last_modified(true))
}

fn map_open_error(err: io::Error, path: &Path) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => error::ErrorNotFound(err),
        io::ErrorKind::PermissionDenied => error::ErrorForbidden(err),
        _ => {
            log::error!("I/O error serving {:?}: {}", path, err);
            error::ErrorInternalServerError(err)
        }
    }
}

/// Per-request data captured for the log line. Built only for requests that
/// pass the suppression rules, so suppressed requests never allocate one.
struct RequestInfo {
    method: String,
    path: String,
    peer: String,
    started: Instant,
}

impl RequestInfo {
    fn capture(req: &ServiceRequest) -> Self {
        Self {
            method: req.method().to_string(),
            path: req.path().to_string(),
            peer: req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string(),
            started: Instant::now(),
        }
    }
}

// HTTP request logging middleware
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerMiddleware<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let info = if is_suppressed(req.path()) {
            None
        } else {
            Some(RequestInfo::capture(&req))
        };

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;

            if let Some(info) = info {
                let response_time = info.started.elapsed().as_millis();
                let status = res.status().as_u16();

                logger::get_logger().http(
                    &info.peer,
                    &info.method,
                    &info.path,
                    Some(status),
                    Some(response_time),
                );
            }

            Ok(res)
        })
    }
}
