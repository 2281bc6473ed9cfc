// src/server.rs
// Server lifecycle: socket ownership, serve task and the start/stop state machine

use actix_web::{
    dev::ServerHandle as ActixServerHandle,
    middleware::{Compress, DefaultHeaders},
    web, App, HttpRequest, HttpServer,
};
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::handler;
use crate::{PKG_NAME, SERVER_SIGNATURE};

/// How long a graceful stop waits for in-flight requests before the workers
/// are torn down anyway.
const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Lifecycle states. Owned by [`ServerLifecycle`] and shared with the serve
/// task; every access goes through the mutex, so the serve loop can never
/// observe a stale state after a stop is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug)]
pub enum BindError {
    /// Binding the listening socket failed: address in use, unresolvable or
    /// invalid host.
    Bind { addr: String, source: io::Error },
    /// `start` was called while the server was not idle.
    AlreadyRunning,
}

impl BindError {
    pub fn is_addr_in_use(&self) -> bool {
        matches!(
            self,
            BindError::Bind { source, .. } if source.kind() == io::ErrorKind::AddrInUse
        )
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Bind { addr, source } => {
                write!(f, "Failed to bind http://{}: {}", addr, source)
            }
            BindError::AlreadyRunning => write!(f, "Server is already running"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Bind { source, .. } => Some(source),
            BindError::AlreadyRunning => None,
        }
    }
}

/// Owns the listening socket and the serve task.
///
/// `start` binds synchronously, so an occupied port or a bad bind address is
/// reported to the caller before any background work begins. The accept loop
/// itself runs on a spawned task; the returned [`ServerHandle`] is the only
/// way to stop it.
pub struct ServerLifecycle {
    config: ServerConfig,
    state: Arc<Mutex<ServerState>>,
}

impl ServerLifecycle {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(ServerState::Idle)),
        }
    }

    pub fn state(&self) -> ServerState {
        *self.state.lock().unwrap()
    }

    pub fn start(&self) -> Result<ServerHandle, BindError> {
        {
            let state = self.state.lock().unwrap();
            if *state != ServerState::Idle {
                return Err(BindError::AlreadyRunning);
            }
        }

        let document_root = self.config.document_root.clone();

        let server = HttpServer::new(move || {
            let headers = DefaultHeaders::new()
                .add(("Server", PKG_NAME))
                .add(("X-Server", SERVER_SIGNATURE));

            let file_handler = {
                let document_root = document_root.clone();
                move |req: HttpRequest| handler::serve_file(req, document_root.clone())
            };

            App::new()
                .wrap(handler::RequestLogger)
                .wrap(headers)
                .wrap(Compress::default())
                .service(handler::favicon)
                .default_service(web::get().to(file_handler))
        })
        // One worker serializes request handling and keeps log lines in
        // dispatch order, like the reference accept loop.
        .workers(1)
        .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
        // Shutdown is driven through ServerHandle, not actix's own ctrl-c hook.
        .disable_signals()
        .bind((self.config.bind_host.as_str(), self.config.bind_port))
        .map_err(|source| BindError::Bind {
            addr: self.config.bind_addr(),
            source,
        })?;

        let server = server.run();
        let actix_handle = server.handle();

        *self.state.lock().unwrap() = ServerState::Running;

        let state = Arc::clone(&self.state);
        let serve_task = tokio::spawn(async move {
            let result = server.await;
            // Reached on clean stop or on a loop-fatal error; either way the
            // socket is gone.
            *state.lock().unwrap() = ServerState::Stopped;
            result
        });

        Ok(ServerHandle {
            actix_handle,
            state: Arc::clone(&self.state),
            serve_task: Some(serve_task),
        })
    }
}

pub struct ServerHandle {
    actix_handle: ActixServerHandle,
    state: Arc<Mutex<ServerState>>,
    serve_task: Option<JoinHandle<io::Result<()>>>,
}

impl ServerHandle {
    pub fn state(&self) -> ServerState {
        *self.state.lock().unwrap()
    }

    /// Graceful stop. No new connections are accepted, in-flight requests
    /// drain (bounded by the shutdown timeout) and the listening socket is
    /// released before this returns. Stopping an already stopped server is a
    /// no-op.
    pub async fn stop(&mut self) {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                ServerState::Running => *state = ServerState::Stopping,
                _ => return,
            }
        }

        self.actix_handle.stop(true).await;

        if let Some(task) = self.serve_task.take() {
            let _ = task.await;
        }

        *self.state.lock().unwrap() = ServerState::Stopped;
    }

    /// Wait for the serve task to finish on its own. Resolves with the
    /// loop-fatal error if the listening socket became unusable; per-request
    /// errors never end up here.
    pub async fn stopped(&mut self) -> io::Result<()> {
        match self.serve_task.as_mut() {
            Some(task) => {
                let result = task.await;
                self.serve_task = None;
                match result {
                    Ok(server_result) => server_result,
                    Err(join_err) => Err(io::Error::new(io::ErrorKind::Other, join_err)),
                }
            }
            None => Ok(()),
        }
    }
}
