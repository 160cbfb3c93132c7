// Handle converter session concerns

use std::{collections::HashMap, time::Duration};

use chrono::Local;
use log::{debug, info};
use rand::RngCore;
use smol_str::SmolStr;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use temperature_converter_model::{ConversionRecord, Session, Timestamp, Unit, ValidationError};

pub type SessionId = SmolStr;

// The maximum number of session commands to retain in memory at any one time.
// Exceeding this number will back-pressure any senders of commands.
pub const MAX_COMMANDS: usize = 10;

// Session ids are this many random bytes, hex encoded.
const SESSION_ID_BYTES: usize = 16;

// Idle sessions are looked for at least this often.
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session with id {0}")]
    NotFound(SessionId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("the session manager is not running")]
    Unavailable,
}

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

pub enum Command {
    Open {
        reply: Reply<SessionId>,
    },
    Convert {
        session_id: SessionId,
        value: f64,
        unit: Unit,
        reply: Reply<ConversionRecord>,
    },
    Recent {
        session_id: SessionId,
        limit: usize,
        reply: Reply<Vec<ConversionRecord>>,
    },
    Clear {
        session_id: SessionId,
        reply: Reply<()>,
    },
    Close {
        session_id: SessionId,
        reply: Reply<()>,
    },
}

/// A handle on the session manager task. Cloning it is cheap; every clone
/// talks to the same sessions.
#[derive(Clone)]
pub struct Sessions {
    commands: mpsc::Sender<Command>,
}

impl Sessions {
    pub async fn open(&self) -> Result<SessionId, SessionError> {
        self.request(|reply| Command::Open { reply }).await
    }

    pub async fn convert(
        &self,
        session_id: SessionId,
        value: f64,
        unit: Unit,
    ) -> Result<ConversionRecord, SessionError> {
        self.request(|reply| Command::Convert {
            session_id,
            value,
            unit,
            reply,
        })
        .await
    }

    pub async fn recent(
        &self,
        session_id: SessionId,
        limit: usize,
    ) -> Result<Vec<ConversionRecord>, SessionError> {
        self.request(|reply| Command::Recent {
            session_id,
            limit,
            reply,
        })
        .await
    }

    pub async fn clear(&self, session_id: SessionId) -> Result<(), SessionError> {
        self.request(|reply| Command::Clear { session_id, reply })
            .await
    }

    pub async fn close(&self, session_id: SessionId) -> Result<(), SessionError> {
        self.request(|reply| Command::Close { session_id, reply })
            .await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, reply_receiver) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| SessionError::Unavailable)?;
        reply_receiver
            .await
            .map_err(|_| SessionError::Unavailable)?
    }
}

struct Entry {
    session: Session,
    last_used: Instant,
}

// Owns every session. Only the manager task touches it, so no session is
// ever shared between two requests in flight.
struct Manager {
    sessions: HashMap<SessionId, Entry>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl Manager {
    fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Open { reply } => {
                let _ = reply.send(Ok(self.open()));
            }

            Command::Convert {
                session_id,
                value,
                unit,
                reply,
            } => {
                let result = self.session(&session_id).and_then(|session| {
                    let now: Timestamp = Local::now().into();
                    Ok(session.on_convert(value, unit, now)?)
                });
                let _ = reply.send(result);
            }

            Command::Recent {
                session_id,
                limit,
                reply,
            } => {
                let result = self
                    .session(&session_id)
                    .map(|session| session.recent(limit).cloned().collect());
                let _ = reply.send(result);
            }

            Command::Clear { session_id, reply } => {
                let result = self.session(&session_id).map(Session::on_clear);
                let _ = reply.send(result);
            }

            Command::Close { session_id, reply } => {
                let result = match self.sessions.remove(&session_id) {
                    Some(_) => {
                        info!("Closed session {session_id}");
                        Ok(())
                    }
                    None => Err(SessionError::NotFound(session_id)),
                };
                let _ = reply.send(result);
            }
        }
    }

    fn open(&mut self) -> SessionId {
        if self.sessions.len() >= self.max_sessions {
            self.evict_least_recently_used();
        }

        let session_id = new_session_id();
        self.sessions.insert(
            session_id.clone(),
            Entry {
                session: Session::new(),
                last_used: Instant::now(),
            },
        );
        info!("Opened session {session_id}");
        session_id
    }

    fn session(&mut self, session_id: &SessionId) -> Result<&mut Session, SessionError> {
        let entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;
        entry.last_used = Instant::now();
        Ok(&mut entry.session)
    }

    fn evict_least_recently_used(&mut self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(session_id, _)| session_id.clone());
        if let Some(session_id) = oldest {
            self.sessions.remove(&session_id);
            info!("Evicted session {session_id} to make room");
        }
    }

    fn expire(&mut self, now: Instant) {
        let idle_timeout = self.idle_timeout;
        self.sessions.retain(|session_id, entry| {
            let alive = now.saturating_duration_since(entry.last_used) < idle_timeout;
            if !alive {
                info!("Session {session_id} expired");
            }
            alive
        });
    }
}

fn new_session_id() -> SessionId {
    let mut bytes = [0; SESSION_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    SessionId::from(hex::encode(bytes))
}

async fn task(mut commands: mpsc::Receiver<Command>, mut manager: Manager) {
    let mut sweep = time::interval((manager.idle_timeout / 4).max(MIN_SWEEP_PERIOD));
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => manager.handle(command),
                None => break,
            },

            _ = sweep.tick() => manager.expire(Instant::now()),
        }
    }

    debug!("Session manager stopped with {} sessions", manager.sessions.len());
}

// A task that will be run to manage converter sessions. It stops once every
// `Sessions` handle has been dropped.
pub fn spawn(max_sessions: usize, idle_timeout: Duration) -> (JoinHandle<()>, Sessions) {
    let (commands, command_receiver) = mpsc::channel(MAX_COMMANDS);
    let handle = tokio::spawn(task(
        command_receiver,
        Manager::new(max_sessions, idle_timeout),
    ));
    (handle, Sessions { commands })
}
