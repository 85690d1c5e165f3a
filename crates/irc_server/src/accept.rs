//! The accept loop (§1 non-goal: "specify only their interfaces, not
//! their internals"). Its whole contract is the handoff in §2's data
//! flow — "accept loop → spawn session" — so this is a thin `listen,
//! accept, spawn` shim over [`crate::session::run_session`], grounded in
//! the teacher's own `TcpListener::bind` + `tokio::spawn` loop in
//! `bin/irc_server.rs`.

use log::{error, info};
use tokio::net::TcpListener;

use crate::registry::ServerState;

/// Accepts connections on `listener` forever, spawning one session task
/// per connection. Never returns under normal operation; a bind-time
/// error is the caller's concern, not this loop's.
pub async fn run(listener: TcpListener, state: ServerState) -> ! {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("accepted connection from {addr}");
                let state = state.clone();
                tokio::spawn(async move {
                    crate::session::run_session(stream, state).await;
                });
            }
            Err(e) => {
                error!("accept failed: {e}");
            }
        }
    }
}
