//! Scrape-job progress monitor.
//!
//! One job gets exactly one WebSocket on `/ws/scrape-jobs/{id}`. Messages are
//! handled one at a time by a [`JobSession`]; the monitor performs the
//! effects it returns (log lines, progress, toasts, closing the socket,
//! registry bookkeeping and the delayed refresh after a successful job).
//! There is no reconnection: a failed connection ends the job's session.

pub mod protocol;
pub mod session;

pub use protocol::{clamp_percent, decode, Decoded, Progress, Terminal};
pub use session::{Closure, Effect, JobSession, Phase};

use std::collections::HashSet;
use std::net::TcpStream;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::config;
use crate::connection::Connection;
use crate::error::{PriceMonitorError, Result};
use crate::models::JobId;
use crate::ui::Ui;

/// Callback run once, off-thread, after a job completes successfully.
pub type RefreshHook = Arc<dyn Fn() + Send + Sync>;

// ---------------------------------------------------------------------------
// MessageSource
// ---------------------------------------------------------------------------

/// Inbound side of a job socket.
pub trait MessageSource {
    /// Next text frame. `None` once the peer has closed the connection.
    fn next_text(&mut self) -> Option<Result<String>>;

    /// Close the connection from our side.
    fn close(&mut self);
}

impl MessageSource for WebSocket<MaybeTlsStream<TcpStream>> {
    fn next_text(&mut self) -> Option<Result<String>> {
        loop {
            match self.read() {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => debug!("ignoring non-UTF-8 binary frame"),
                },
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                    return None
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    fn close(&mut self) {
        if let Err(e) = WebSocket::close(self, None) {
            debug!(error = %e, "close handshake failed");
        }
        let _ = self.flush();
    }
}

// ---------------------------------------------------------------------------
// JobMonitor
// ---------------------------------------------------------------------------

/// Opens and drives scrape-job sockets, tracking which jobs are live.
///
/// Cloning shares the registry.
#[derive(Clone)]
pub struct JobMonitor {
    conn: Connection,
    ui: Arc<dyn Ui>,
    active: Arc<Mutex<HashSet<JobId>>>,
    refresh_delay: Duration,
}

impl JobMonitor {
    pub fn new(conn: Connection, ui: Arc<dyn Ui>, refresh_delay: Duration) -> Self {
        Self {
            conn,
            ui,
            active: Arc::new(Mutex::new(HashSet::new())),
            refresh_delay,
        }
    }

    /// Jobs whose socket is currently open.
    pub fn active_jobs(&self) -> Vec<JobId> {
        let mut jobs: Vec<JobId> = self.registry().iter().cloned().collect();
        jobs.sort();
        jobs
    }

    pub fn is_active(&self, job_id: &JobId) -> bool {
        self.registry().contains(job_id)
    }

    /// Watch `job_id` on a background thread.
    ///
    /// `on_success` runs once, `refresh_delay` after a successful terminal
    /// message. The job is registered before this returns. The returned
    /// handle yields how the session ended.
    pub fn connect(&self, job_id: JobId, on_success: Option<RefreshHook>) -> JoinHandle<Closure> {
        self.registry().insert(job_id.clone());
        let monitor = self.clone();
        thread::spawn(move || monitor.watch(job_id, on_success))
    }

    /// Watch `job_id` on the current thread until the session closes.
    ///
    /// Registers the job if [`connect`](Self::connect) has not already.
    pub fn watch(&self, job_id: JobId, on_success: Option<RefreshHook>) -> Closure {
        let mut session = JobSession::new(job_id.clone(), self.refresh_delay);
        self.registry().insert(job_id.clone());
        self.apply(&job_id, session.connect(), &mut Unopened, None);

        let opened = self
            .conn
            .ws_url(&config::scrape_job_socket_path(job_id.as_str()))
            .and_then(|url| {
                info!(job_id = %job_id, url = %url, "opening job socket");
                tungstenite::connect(url.as_str())
                    .map(|(socket, _)| socket)
                    .map_err(PriceMonitorError::from)
            });

        match opened {
            Ok(mut socket) => self.drive(&mut session, &mut socket, on_success.as_ref()),
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "job socket unavailable");
                let effects = session.connection_failed(&e.to_string());
                self.apply(&job_id, effects, &mut Unopened, None);
                session
                    .closure()
                    .cloned()
                    .unwrap_or_else(|| Closure::ConnectionError(e.to_string()))
            }
        }
    }

    /// Feed every frame from `source` through `session` until it closes.
    ///
    /// `session` must have been moved out of `Idle` with [`JobSession::connect`].
    pub fn drive<S: MessageSource>(
        &self,
        session: &mut JobSession,
        source: &mut S,
        on_success: Option<&RefreshHook>,
    ) -> Closure {
        let job_id = session.job_id().clone();
        let opened = session.opened();
        self.apply(&job_id, opened, source, on_success);

        while !session.is_closed() {
            let effects = match source.next_text() {
                Some(Ok(text)) => session.receive(&text),
                Some(Err(e)) => session.connection_failed(&e.to_string()),
                None => break,
            };
            self.apply(&job_id, effects, source, on_success);
        }

        let effects = session.disconnected();
        self.apply(&job_id, effects, source, on_success);

        let closure = session.closure().cloned().unwrap_or_else(|| {
            Closure::ConnectionError("connection closed before the job finished".to_string())
        });
        info!(job_id = %job_id, closure = ?closure, "job session closed");
        closure
    }

    fn apply<S: MessageSource>(
        &self,
        job_id: &JobId,
        effects: Vec<Effect>,
        source: &mut S,
        on_success: Option<&RefreshHook>,
    ) {
        for effect in effects {
            match effect {
                Effect::Log(line) => self.ui.append_scrape_log(&line),
                Effect::Progress(percent) => self.ui.set_scrape_progress(percent),
                Effect::Toast(level, message) => self.ui.toast(level, &message),
                Effect::CloseSocket => source.close(),
                Effect::Unregister => {
                    self.registry().remove(job_id);
                }
                Effect::ScheduleRefresh(delay) => {
                    if let Some(hook) = on_success {
                        schedule_refresh(Arc::clone(hook), delay);
                    }
                }
            }
        }
    }

    fn registry(&self) -> MutexGuard<'_, HashSet<JobId>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Run `hook` once after `delay` on a detached thread. Not cancellable.
fn schedule_refresh(hook: RefreshHook, delay: Duration) {
    thread::spawn(move || {
        thread::sleep(delay);
        debug!("running post-job refresh");
        hook();
    });
}

/// Stand-in source for a socket that never opened.
struct Unopened;

impl MessageSource for Unopened {
    fn next_text(&mut self) -> Option<Result<String>> {
        None
    }

    fn close(&mut self) {}
}
