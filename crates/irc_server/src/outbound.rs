//! The outbound pump: one writer task per connected user, draining that
//! user's FIFO and performing the disconnect/clean-close protocol (§4.2).
//! Handlers never touch a socket; they call [`crate::registry::User::enqueue`]
//! or [`crate::registry::User::enqueue_disconnect`], mirroring the way the
//! teacher's `channels_models.rs::broadcast_message` pushes onto a
//! `broadcast::Sender` rather than writing bytes itself.
//!
//! The clean-close dance in §4.2 — shutdown write half, 10s recv
//! timeout, single-byte read, close — is split across this task (which
//! owns the write half and performs registry cleanup + shutdown) and the
//! reader task in [`crate::session`] (which owns the read half and
//! performs the bounded drain-read once its own loop ends). See
//! `DESIGN.md` for why this is the natural two-task mapping of a
//! protocol description written as one sequential procedure.

use log::{info, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::registry::{OutboundItem, ServerState};
use crate::replies::IrcReply;
use crate::wire::encode_latin1;

/// Drains `rx` until a [`OutboundItem::Disconnect`] arrives, then performs
/// cleanup and the clean-close protocol. Returns once the socket's write
/// half has been shut down.
pub async fn run_writer(
    mut write_half: OwnedWriteHalf,
    mut rx: UnboundedReceiver<OutboundItem>,
    state: ServerState,
    nick_key_at_connect: String,
) {
    let mut nick_key = nick_key_at_connect;

    while let Some(item) = rx.recv().await {
        match item {
            OutboundItem::Line(reply) => {
                if let Err(e) = write_reply(&mut write_half, &state, &reply).await {
                    warn!("write error for {nick_key}: {e}, disconnecting");
                    run_disconnect(&mut write_half, &state, &nick_key, format!("{e}")).await;
                    return;
                }
            }
            OutboundItem::Identify(new_key) => {
                nick_key = new_key;
            }
            OutboundItem::Disconnect { reason } => {
                run_disconnect(&mut write_half, &state, &nick_key, reason).await;
                return;
            }
        }
    }
}

async fn write_reply(
    write_half: &mut OwnedWriteHalf,
    state: &ServerState,
    reply: &IrcReply,
) -> std::io::Result<()> {
    let server_name = {
        let registry = state.0.lock().await;
        registry.server_name.clone()
    };
    let line = reply.format(&server_name);
    write_half.write_all(&encode_latin1(&line)).await?;
    write_half.write_all(b"\r\n").await?;
    write_half.flush().await
}

async fn run_disconnect(
    write_half: &mut OwnedWriteHalf,
    state: &ServerState,
    nick_key: &str,
    reason: String,
) {
    let quit_frame = {
        let mut registry = state.0.lock().await;
        let server_name = registry.server_name.clone();

        let quit_line = registry.users.get(nick_key).map(|user| {
            IrcReply::Quit {
                mask: user.user_mask(),
                reason: reason.clone(),
            }
        });

        if let Some(line) = &quit_line {
            let channel_keys = registry.channels_of(nick_key);
            for channel_key in &channel_keys {
                if let Some(channel) = registry.channels.get_mut(channel_key) {
                    channel.members.remove(nick_key);
                    channel.operators.remove(nick_key);
                }
                registry.broadcast_to_channel(channel_key, line.clone());
                registry.destroy_channel_if_empty(channel_key);
            }
        }

        registry.users.remove(nick_key);
        info!("{nick_key} disconnected: {reason}");

        quit_line.map(|line| line.format(&server_name))
    };

    if let Some(frame) = quit_frame {
        let _ = write_half.write_all(&encode_latin1(&frame)).await;
        let _ = write_half.write_all(b"\r\n").await;
        let _ = write_half.flush().await;
    }

    let _ = write_half.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::{Channel, Registry, User};
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn disconnect_removes_user_and_fans_out_quit() {
        let config = Config::default();
        let mut registry = Registry::new(&config, None);

        let (tx_a, _rx_a) = unbounded_channel();
        let mut alice = User::new("h".to_owned(), tx_a);
        alice.nick = "alice".to_owned();
        alice.user_name = Some("a".to_owned());
        registry.users.insert("alice".to_owned(), alice);

        let (tx_b, mut rx_b) = unbounded_channel();
        let mut bob = User::new("h".to_owned(), tx_b);
        bob.nick = "bob".to_owned();
        bob.user_name = Some("b".to_owned());
        registry.users.insert("bob".to_owned(), bob);

        let mut channel = Channel::new("#chan".to_owned(), "alice".to_owned());
        channel.members.insert("bob".to_owned());
        registry.channels.insert("#chan".to_owned(), channel);

        let state = ServerState(std::sync::Arc::new(tokio::sync::Mutex::new(registry)));

        // Exercise the registry-mutation half of disconnect cleanup
        // directly, since constructing a live TcpStream pair isn't
        // warranted here.
        {
            let mut registry = state.0.lock().await;
            let channel_keys = registry.channels_of("alice");
            for channel_key in &channel_keys {
                if let Some(channel) = registry.channels.get_mut(&channel_key.clone()) {
                    channel.members.remove("alice");
                    channel.operators.remove("alice");
                }
                registry.broadcast_to_channel(
                    channel_key,
                    IrcReply::Quit {
                        mask: "alice!a@h".to_owned(),
                        reason: "Client quit".to_owned(),
                    },
                );
                registry.destroy_channel_if_empty(channel_key);
            }
            registry.users.remove("alice");
        }

        let registry = state.0.lock().await;
        assert!(!registry.users.contains_key("alice"));
        assert!(registry.channels.contains_key("#chan"));
        drop(registry);

        let forwarded = rx_b.try_recv().expect("bob should receive the QUIT");
        match forwarded {
            OutboundItem::Line(IrcReply::Quit { mask, .. }) => assert_eq!(mask, "alice!a@h"),
            other => panic!("unexpected item: {other:?}"),
        }
    }

    /// Regression test for the writer's key tracking: a connection starts
    /// life addressed by the `"*"` sentinel, and the only thing that ever
    /// tells the writer its real registry key is an `Identify` item — not
    /// an observed `NICK` line, since the first registration never
    /// produces one on the registrant's own queue (§4.3). Without
    /// `Identify`, `run_disconnect` would look up `"*"` on QUIT and skip
    /// cleanup/fan-out entirely.
    #[tokio::test]
    async fn identify_retargets_disconnect_cleanup_off_the_sentinel_key() {
        let config = Config::default();
        let mut registry = Registry::new(&config, None);

        let (tx_alice, _rx_alice) = unbounded_channel();
        let mut alice = User::new("h".to_owned(), tx_alice);
        alice.nick = "alice".to_owned();
        alice.user_name = Some("a".to_owned());
        registry.users.insert("alice".to_owned(), alice);

        let (tx_bob, mut rx_bob) = unbounded_channel();
        let mut bob = User::new("h".to_owned(), tx_bob);
        bob.nick = "bob".to_owned();
        bob.user_name = Some("b".to_owned());
        registry.users.insert("bob".to_owned(), bob);

        let mut channel = Channel::new("#chan".to_owned(), "alice".to_owned());
        channel.members.insert("bob".to_owned());
        registry.channels.insert("#chan".to_owned(), channel);

        let state = ServerState(std::sync::Arc::new(tokio::sync::Mutex::new(registry)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (server_stream, _) = listener.accept().await.unwrap();
        let (_read_half, write_half) = server_stream.into_split();
        drop(client);

        let (tx, rx) = unbounded_channel();
        tx.send(OutboundItem::Identify("alice".to_owned())).unwrap();
        tx.send(OutboundItem::Disconnect {
            reason: "bye".to_owned(),
        })
        .unwrap();
        drop(tx);

        run_writer(write_half, rx, state.clone(), "*".to_owned()).await;

        let registry = state.0.lock().await;
        assert!(!registry.users.contains_key("alice"), "alice should be cleaned up");
        drop(registry);

        let forwarded = rx_bob.try_recv().expect("bob should still receive the QUIT fan-out");
        match forwarded {
            OutboundItem::Line(IrcReply::Quit { mask, reason }) => {
                assert_eq!(mask, "alice!a@h");
                assert_eq!(reason, "bye");
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    /// §8: "Invalid UTF-8 payloads after `PRIVMSG #ch :` are delivered
    /// byte-identical to every other member." A `String` built from
    /// `wire::codec::decode_latin1` can hold codepoints U+0080-U+00FF;
    /// writing it with `str::as_bytes` would silently re-encode those as
    /// multi-byte UTF-8 instead of the single raw byte the client sent.
    #[tokio::test]
    async fn write_reply_round_trips_latin1_bytes_above_ascii() {
        let config = Config::default();
        let registry = Registry::new(&config, None);
        let state = ServerState(std::sync::Arc::new(tokio::sync::Mutex::new(registry)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (server_stream, _) = listener.accept().await.unwrap();
        let (_read_half, mut write_half) = server_stream.into_split();

        let raw_text = crate::wire::decode_latin1(&[0xFF, 0x00, 0x41, 0xE9]);
        let reply = IrcReply::PrivMsg {
            mask: "alice!a@h".to_owned(),
            target: "#chan".to_owned(),
            text: raw_text,
        };
        write_reply(&mut write_half, &state, &reply).await.unwrap();
        write_half.flush().await.unwrap();

        use tokio::io::AsyncReadExt;
        let mut buf = [0u8; 256];
        let n = client.read(&mut buf).await.unwrap();
        let line = &buf[..n];
        assert!(
            line.ends_with(b"\xFF\x00\x41\xE9\r\n"),
            "expected raw Latin-1 bytes, got {line:?}"
        );
    }
}
