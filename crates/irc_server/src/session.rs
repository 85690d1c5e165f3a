//! The reader loop and pre-registration gate (§4.3). Grounded in the
//! teacher's `handlers/client.rs` read loop, restructured around
//! [`crate::liveness::next_event`] instead of a bare `socket.read`, and
//! around an explicit pre-registration draft instead of always indexing
//! the registry by client id.
//!
//! NICK, USER, CAP, PONG, and QUIT are handled directly here rather than
//! through [`crate::handlers::dispatch`] (see that module's doc comment):
//! they are the only verbs a not-yet-registered connection may send, and
//! routing them here lets the same field-mutation functions run whether
//! the `User` is still a local draft or already living in the registry.

use log::{info, warn};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;

use crate::handlers;
use crate::handlers::client::process_pong;
use crate::handlers::registration::{
    process_cap, process_user, register_first_nick, rename_nick, FirstNickOutcome,
};
use crate::liveness::{drain_after_close, next_event, ReadEvent};
use crate::motd::build_welcome_burst;
use crate::registry::{OutboundItem, ServerState, User};
use crate::replies::IrcReply;
use crate::wire::{parse_line, LineBuffer};

/// Which side of the NICK/USER handshake this connection currently sits
/// on (§9's `NEW → GOT_NICK | GOT_USER → GOT_BOTH → REGISTERED`): either a
/// local draft that has never touched `registry.users`, or an installed
/// registry entry addressed by its case-folded key.
enum Identity {
    Draft(User),
    Registered(String),
}

/// Drives one connection end to end: splits the socket, spawns the writer
/// task, then runs the reader loop until disconnect. Returns once the
/// writer has finished the clean-close protocol (§4.2).
pub async fn run_session(stream: TcpStream, state: ServerState) {
    let host = stream
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "unknown".to_owned());

    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    let writer_handle = tokio::spawn(crate::outbound::run_writer(
        write_half,
        rx,
        state.clone(),
        "*".to_owned(),
    ));

    run_reader(read_half, &state, tx, host).await;

    let _ = writer_handle.await;
}

async fn run_reader(
    mut read_half: tokio::net::tcp::OwnedReadHalf,
    state: &ServerState,
    tx: UnboundedSender<OutboundItem>,
    host: String,
) {
    let liveness_config = {
        let registry = state.0.lock().await;
        registry.liveness.clone()
    };

    let mut identity = Identity::Draft(User::new(host, tx.clone()));
    let mut line_buffer = LineBuffer::new();
    let mut awaiting_pong = false;
    let mut buf = [0u8; 4096];

    loop {
        match next_event(&mut read_half, &mut buf, &liveness_config, awaiting_pong).await {
            ReadEvent::Data(bytes) => {
                if awaiting_pong {
                    awaiting_pong = false;
                    set_pong_received(&mut identity, state, false).await;
                }
                for line in line_buffer.feed(&bytes) {
                    let Some(parsed) = parse_line(&line) else {
                        continue;
                    };
                    if handle_line(&mut identity, state, &tx, &parsed.command, &parsed.params)
                        .await
                    {
                        drain_after_close(&mut read_half, liveness_config.close_drain_secs).await;
                        return;
                    }
                }
            }
            ReadEvent::Eof => {
                let _ = tx.send(OutboundItem::Disconnect {
                    reason: "Connection closed".to_owned(),
                });
                drain_after_close(&mut read_half, liveness_config.close_drain_secs).await;
                return;
            }
            ReadEvent::IoError(e) => {
                warn!("read error: {e}");
                let _ = tx.send(OutboundItem::Disconnect {
                    reason: e.to_string(),
                });
                drain_after_close(&mut read_half, liveness_config.close_drain_secs).await;
                return;
            }
            ReadEvent::PingDue => {
                let server_name = {
                    let registry = state.0.lock().await;
                    registry.server_name.clone()
                };
                let _ = tx.send(OutboundItem::Line(IrcReply::Ping { tok: server_name }));
                awaiting_pong = true;
            }
            ReadEvent::PongOverdue => {
                let _ = tx.send(OutboundItem::Disconnect {
                    reason: "Ping timeout...".to_owned(),
                });
                drain_after_close(&mut read_half, liveness_config.close_drain_secs).await;
                return;
            }
        }
    }
}

async fn set_pong_received(identity: &mut Identity, state: &ServerState, value: bool) {
    match identity {
        Identity::Draft(user) => user.pong_received = value,
        Identity::Registered(key) => {
            let mut registry = state.0.lock().await;
            if let Some(user) = registry.user_mut(key) {
                user.pong_received = value;
            }
        }
    }
}

/// Processes one parsed line. Returns `true` if the session should end
/// (QUIT, or a disconnect sentinel was already enqueued upstream).
async fn handle_line(
    identity: &mut Identity,
    state: &ServerState,
    tx: &UnboundedSender<OutboundItem>,
    command: &str,
    params: &[String],
) -> bool {
    if command == "QUIT" {
        let reason = params
            .first()
            .cloned()
            .unwrap_or_else(|| "Client quit".to_owned());
        let _ = tx.send(OutboundItem::Disconnect { reason });
        return true;
    }

    match command {
        "NICK" => handle_nick(identity, state, tx, params).await,
        "USER" => handle_user(identity, state, params).await,
        "CAP" => handle_cap(identity, state, params).await,
        "PONG" => handle_pong(identity, state, params).await,
        other => {
            if is_gated(identity, state).await {
                match identity {
                    Identity::Registered(key) => {
                        let registry = state.0.lock().await;
                        if let Some(user) = registry.user(key) {
                            user.enqueue(IrcReply::ErrNotRegistered {
                                nick: user.nick.clone(),
                            });
                        }
                    }
                    Identity::Draft(user) => {
                        user.enqueue(IrcReply::ErrNotRegistered {
                            nick: user.nick.clone(),
                        });
                    }
                }
            } else if let Identity::Registered(key) = identity {
                let mut registry = state.0.lock().await;
                handlers::dispatch(&mut registry, key, other, params);
            }
        }
    }

    fire_welcome_if_ready(identity, state).await;
    false
}

/// The pre-registration gate (§4.3): `true` while nick is still `"*"`,
/// `user_name` unset, or the welcome burst hasn't fired yet.
async fn is_gated(identity: &Identity, state: &ServerState) -> bool {
    match identity {
        Identity::Draft(_) => true,
        Identity::Registered(key) => {
            let registry = state.0.lock().await;
            match registry.user(key) {
                Some(user) => user.nick == "*" || user.user_name.is_none() || !user.motd_sent,
                None => true,
            }
        }
    }
}

async fn handle_nick(
    identity: &mut Identity,
    state: &ServerState,
    tx: &UnboundedSender<OutboundItem>,
    params: &[String],
) {
    match identity {
        Identity::Draft(_) => {
            let Identity::Draft(draft) = std::mem::replace(
                identity,
                Identity::Registered(String::new()),
            ) else {
                unreachable!()
            };
            let mut registry = state.0.lock().await;
            match register_first_nick(&mut registry, draft, params) {
                FirstNickOutcome::Inserted(key) => {
                    info!("nick registered: {key}");
                    // Side channel only: never written to the socket, but
                    // tells the writer task which registry key now
                    // addresses this connection so disconnect cleanup
                    // (§4.2) can find it (see `OutboundItem::Identify`).
                    let _ = tx.send(OutboundItem::Identify(key.clone()));
                    *identity = Identity::Registered(key);
                }
                FirstNickOutcome::Rejected(draft) => {
                    *identity = Identity::Draft(draft);
                }
            }
        }
        Identity::Registered(key) => {
            let mut registry = state.0.lock().await;
            if let Some(new_key) = rename_nick(&mut registry, key, params) {
                let _ = tx.send(OutboundItem::Identify(new_key.clone()));
                *key = new_key;
            }
        }
    }
}

async fn handle_user(identity: &mut Identity, state: &ServerState, params: &[String]) {
    match identity {
        Identity::Draft(draft) => {
            if let Some(reply) = process_user(draft, params) {
                draft.enqueue(reply);
            }
        }
        Identity::Registered(key) => {
            let mut registry = state.0.lock().await;
            if let Some(user) = registry.user_mut(key) {
                if let Some(reply) = process_user(user, params) {
                    user.enqueue(reply);
                }
            }
        }
    }
}

async fn handle_cap(identity: &mut Identity, state: &ServerState, params: &[String]) {
    match identity {
        Identity::Draft(draft) => {
            for reply in process_cap(draft, crate::constants::SERVER_CAPABILITIES, params) {
                draft.enqueue(reply);
            }
        }
        Identity::Registered(key) => {
            let mut registry = state.0.lock().await;
            if let Some(user) = registry.user_mut(key) {
                let replies = process_cap(user, crate::constants::SERVER_CAPABILITIES, params);
                for reply in replies {
                    user.enqueue(reply);
                }
            }
        }
    }
}

async fn handle_pong(identity: &mut Identity, state: &ServerState, params: &[String]) {
    match identity {
        Identity::Draft(draft) => {
            let server_name = {
                let registry = state.0.lock().await;
                registry.server_name.clone()
            };
            if let Some(reply) = process_pong(draft, &server_name, params) {
                draft.enqueue(reply);
            }
        }
        Identity::Registered(key) => {
            let mut registry = state.0.lock().await;
            let server_name = registry.server_name.clone();
            if let Some(user) = registry.user_mut(key) {
                if let Some(reply) = process_pong(user, &server_name, params) {
                    user.enqueue(reply);
                }
            }
        }
    }
}

/// Fires the 001-005 + MOTD burst exactly once, per §4.3's trigger
/// condition: identified, CAP negotiation over, not already sent. Only
/// reachable once `identity` is [`Identity::Registered`] — a draft can
/// never be fully identified, since the first successful NICK is what
/// inserts it into the registry in the first place.
async fn fire_welcome_if_ready(identity: &Identity, state: &ServerState) {
    let Identity::Registered(key) = identity else {
        return;
    };
    let mut registry = state.0.lock().await;
    let Some(user) = registry.users.get(key) else {
        return;
    };
    if !user.is_ready_for_welcome() || user.motd_sent {
        return;
    }
    let burst = build_welcome_burst(&registry, user);
    let user = registry.users.get_mut(key).unwrap();
    for reply in burst {
        user.enqueue(reply);
    }
    user.motd_sent = true;
}
