//! The idle-PING / PONG-timeout watchdog (§4.6). Grounded in the
//! teacher's plain `socket.read(&mut buf)` loop in `bin/irc_server.rs`,
//! wrapped in a `tokio::select!` race against the two timers the spec
//! describes, rather than the teacher's timeout-free read.

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;

use crate::config::LivenessConfig;

/// What happened while the reader was waiting for the next chunk of
/// bytes (§4.6, §4.3 step (a)-(c)).
pub enum ReadEvent {
    Data(Vec<u8>),
    Eof,
    IoError(std::io::Error),
    /// The idle timer fired; caller should enqueue an unsolicited PING
    /// and keep reading (the next call arms the pong-grace timer).
    PingDue,
    /// The pong-grace timer fired and `pong_received` is still false;
    /// caller should disconnect with reason "Ping timeout...".
    PongOverdue,
}

/// The clean-close drain (§4.2, §9 "reader owns the read half"): once this
/// session's reader loop has exited for any reason, wait up to
/// `timeout_secs` for the peer to close its end (observed as EOF or an
/// error on a 1-byte read) so the TCP four-way close completes before the
/// socket is dropped. Never reported upward — best-effort only.
pub async fn drain_after_close(read_half: &mut OwnedReadHalf, timeout_secs: u64) {
    let mut scratch = [0u8; 1];
    let _ = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        read_half.read(&mut scratch),
    )
    .await;
}

/// Blocks on the socket with the liveness timers racing it (§4.3: "arms
/// the idle-PING timer ... performs a socket read ... cancels the
/// timer"). `awaiting_pong` tracks which of the two timers is currently
/// armed; the caller flips it to `true` after a [`ReadEvent::PingDue`]
/// and back to `false` once `pong_received` is observed true (or on any
/// fresh NICK/registration activity that resets the cycle).
pub async fn next_event(
    read_half: &mut OwnedReadHalf,
    buf: &mut [u8],
    config: &LivenessConfig,
    awaiting_pong: bool,
) -> ReadEvent {
    let timer = if awaiting_pong {
        Duration::from_secs(config.pong_grace_secs)
    } else {
        Duration::from_secs(config.ping_interval_secs)
    };

    tokio::select! {
        biased;
        result = read_half.read(buf) => match result {
            Ok(0) => ReadEvent::Eof,
            Ok(n) => ReadEvent::Data(buf[..n].to_vec()),
            Err(e) => ReadEvent::IoError(e),
        },
        _ = tokio::time::sleep(timer) => {
            if awaiting_pong {
                ReadEvent::PongOverdue
            } else {
                ReadEvent::PingDue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn loopback_read_half() -> OwnedReadHalf {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (server_stream, _) = listener.accept().await.unwrap();
        server_stream.into_split().0
    }

    #[tokio::test]
    async fn ping_due_fires_when_interval_elapses_with_no_data() {
        let mut read_half = loopback_read_half().await;
        let config = LivenessConfig {
            ping_interval_secs: 0,
            pong_grace_secs: 5,
            close_drain_secs: 10,
        };
        let mut buf = [0u8; 64];
        match next_event(&mut read_half, &mut buf, &config, false).await {
            ReadEvent::PingDue => {}
            _ => panic!("expected PingDue"),
        }
    }

    #[tokio::test]
    async fn pong_overdue_fires_when_grace_elapses_while_awaiting() {
        let mut read_half = loopback_read_half().await;
        let config = LivenessConfig {
            ping_interval_secs: 300,
            pong_grace_secs: 0,
            close_drain_secs: 10,
        };
        let mut buf = [0u8; 64];
        match next_event(&mut read_half, &mut buf, &config, true).await {
            ReadEvent::PongOverdue => {}
            _ => panic!("expected PongOverdue"),
        }
    }
}
