//! Per-connection session logic, independent of the transport.
//!
//! A `Session` is created once the room lookup succeeds and lives until the
//! connection goes away. The WebSocket plumbing in `handler` feeds it decoded
//! text frames and calls `close` on every exit path. Keeping the logic here,
//! off the socket types, is what makes the protocol testable with plain
//! channels.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{RoomStore, StoreError};
use crate::protocol::{ClientMessage, ServerMessage};

use super::broadcast::BroadcastEngine;
use super::registry::{Connection, RoomRegistry};

/// Why a session could not be established.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No record for the requested room; the client is rejected before
    /// anything is registered.
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    /// The storage layer failed during the room lookup.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the session loop should do after handling one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Terminate,
}

/// One client's joined state in a room.
pub struct Session {
    room_id: String,
    conn: Connection,
    registry: Arc<RoomRegistry>,
    engine: BroadcastEngine,
    store: Arc<dyn RoomStore>,
}

impl Session {
    /// Validate the room and join it.
    ///
    /// On success the new client has been registered, sent its `init`
    /// snapshot, and announced to the rest of the room via `user_joined`.
    /// On failure nothing has been registered.
    pub async fn join(
        registry: Arc<RoomRegistry>,
        engine: BroadcastEngine,
        store: Arc<dyn RoomStore>,
        room_id: String,
        conn: Connection,
    ) -> Result<Self, SessionError> {
        let record = store
            .get_room(&room_id)
            .await?
            .ok_or_else(|| SessionError::RoomNotFound(room_id.clone()))?;

        registry.join(&room_id, conn.clone()).await;

        let session = Self {
            room_id,
            conn,
            registry,
            engine,
            store,
        };

        // Current room state for the newly connected client
        let init = ServerMessage::Init {
            code: record.code,
            language: record.language,
            active_users: session.registry.count(&session.room_id).await,
        };
        if !session.engine.send_to(&session.conn, &init) {
            tracing::error!("Failed to send init snapshot in room {}", session.room_id);
        }

        // Notify the rest of the room about the new connection
        let joined = ServerMessage::UserJoined {
            active_users: session.registry.count(&session.room_id).await,
        };
        session
            .engine
            .broadcast_to_room(&session.room_id, &joined, Some(session.conn.id()))
            .await;

        Ok(session)
    }

    /// Handle one inbound text frame.
    ///
    /// A payload that does not parse is a protocol violation and terminates
    /// the session; an unknown `type` tag is ignored. Relay failures toward
    /// individual peers never terminate the sender's session.
    pub async fn handle_text(&self, text: &str) -> SessionFlow {
        let msg: ClientMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(
                    "Malformed message in room {}, closing session: {}",
                    self.room_id,
                    e
                );
                return SessionFlow::Terminate;
            }
        };

        match msg {
            ClientMessage::CodeUpdate { code, user_id } => {
                // Persist before broadcasting so a concurrently-joining
                // client's init snapshot is never older than this update.
                if let Err(e) = self.store.set_code(&self.room_id, &code).await {
                    tracing::error!(
                        "Failed to persist code update for room {}: {}",
                        self.room_id,
                        e
                    );
                }

                let update = ServerMessage::CodeUpdate { code, user_id };
                self.engine
                    .broadcast_to_room(&self.room_id, &update, Some(self.conn.id()))
                    .await;
            }
            ClientMessage::CursorPosition {
                user_id,
                position,
                line,
                column,
            } => {
                let cursor = ServerMessage::CursorPosition {
                    user_id,
                    position,
                    line,
                    column,
                };
                self.engine
                    .broadcast_to_room(&self.room_id, &cursor, Some(self.conn.id()))
                    .await;
            }
            ClientMessage::Ping => {
                if !self.engine.send_to(&self.conn, &ServerMessage::Pong) {
                    tracing::warn!("Failed to send pong in room {}", self.room_id);
                }
            }
            ClientMessage::Unrecognized => {
                tracing::debug!("Ignoring unrecognized message type in room {}", self.room_id);
            }
        }

        SessionFlow::Continue
    }

    /// Leave the room and tell the remaining members.
    ///
    /// Runs on every exit path, including faults.
    pub async fn close(self) {
        self.registry.leave(&self.room_id, self.conn.id()).await;

        let left = ServerMessage::UserLeft {
            active_users: self.registry.count(&self.room_id).await,
        };
        self.engine
            .broadcast_to_room(&self.room_id, &left, None)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockRoomStore;
    use crate::infrastructure::store::InMemoryRoomStore;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    struct Fixture {
        registry: Arc<RoomRegistry>,
        engine: BroadcastEngine,
        store: Arc<dyn RoomStore>,
        room_id: String,
    }

    async fn fixture(language: &str) -> Fixture {
        let registry = Arc::new(RoomRegistry::new());
        let engine = BroadcastEngine::new(registry.clone());
        let store = Arc::new(InMemoryRoomStore::new());
        let room = store.create_room(language).await.unwrap();
        Fixture {
            registry,
            engine,
            store,
            room_id: room.id,
        }
    }

    impl Fixture {
        async fn join(&self) -> (Session, mpsc::UnboundedReceiver<String>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let session = Session::join(
                self.registry.clone(),
                self.engine.clone(),
                self.store.clone(),
                self.room_id.clone(),
                Connection::new(tx),
            )
            .await
            .unwrap();
            (session, rx)
        }
    }

    fn recv_json(rx: &mut mpsc::UnboundedReceiver<String>) -> Value {
        let raw = rx.try_recv().expect("expected a queued message");
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_join_sends_init_snapshot() {
        // given (precondition): an empty room created with language "go"
        let fx = fixture("go").await;

        // when (operation):
        let (_session, mut rx) = fx.join().await;

        // then (expected result):
        let init = recv_json(&mut rx);
        assert_eq!(init["type"], "init");
        assert_eq!(init["code"], "# Start coding in go...\n");
        assert_eq!(init["language"], "go");
        assert_eq!(init["active_users"], 1);
    }

    #[tokio::test]
    async fn test_join_announces_user_joined_to_others_only() {
        // given (precondition): a already joined
        let fx = fixture("python").await;
        let (_a, mut rx_a) = fx.join().await;
        recv_json(&mut rx_a); // a's init

        // when (operation): b joins
        let (_b, mut rx_b) = fx.join().await;

        // then (expected result): a gets user_joined, b only gets its init
        let joined = recv_json(&mut rx_a);
        assert_eq!(joined["type"], "user_joined");
        assert_eq!(joined["active_users"], 2);

        let init_b = recv_json(&mut rx_b);
        assert_eq!(init_b["type"], "init");
        assert_eq!(init_b["active_users"], 2);
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_unknown_room_is_rejected_without_registration() {
        // given (precondition):
        let fx = fixture("python").await;
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (operation):
        let result = Session::join(
            fx.registry.clone(),
            fx.engine.clone(),
            fx.store.clone(),
            "no-such-room".to_string(),
            Connection::new(tx),
        )
        .await;

        // then (expected result): rejected, nothing in the registry
        assert!(matches!(result, Err(SessionError::RoomNotFound(_))));
        assert_eq!(fx.registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_code_update_persists_then_relays_to_peers_only() {
        // given (precondition): a and b joined
        let fx = fixture("python").await;
        let (a, mut rx_a) = fx.join().await;
        let (_b, mut rx_b) = fx.join().await;
        recv_json(&mut rx_a); // a's init
        recv_json(&mut rx_a); // user_joined for b
        recv_json(&mut rx_b); // b's init

        // when (operation): a sends a code update
        let flow = a
            .handle_text(r#"{"type":"code_update","code":"x=1","user_id":"A"}"#)
            .await;

        // then (expected result):
        assert_eq!(flow, SessionFlow::Continue);

        // the store now holds the new code
        let record = fx.store.get_room(&fx.room_id).await.unwrap().unwrap();
        assert_eq!(record.code, "x=1");

        // b receives the relayed update, a receives nothing for its own edit
        let update = recv_json(&mut rx_b);
        assert_eq!(update["type"], "code_update");
        assert_eq!(update["code"], "x=1");
        assert_eq!(update["user_id"], "A");
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sequential_code_updates_stay_ordered_per_peer() {
        // given (precondition):
        let fx = fixture("python").await;
        let (a, _rx_a) = fx.join().await;
        let (_b, mut rx_b) = fx.join().await;
        recv_json(&mut rx_b); // b's init

        // when (operation):
        a.handle_text(r#"{"type":"code_update","code":"x=1"}"#).await;
        a.handle_text(r#"{"type":"code_update","code":"x=2"}"#).await;

        // then (expected result): second is never observed before first
        assert_eq!(recv_json(&mut rx_b)["code"], "x=1");
        assert_eq!(recv_json(&mut rx_b)["code"], "x=2");
        let record = fx.store.get_room(&fx.room_id).await.unwrap().unwrap();
        assert_eq!(record.code, "x=2");
    }

    #[tokio::test]
    async fn test_cursor_position_is_relayed_verbatim_without_persistence() {
        // given (precondition):
        let fx = fixture("python").await;
        let (a, _rx_a) = fx.join().await;
        let (_b, mut rx_b) = fx.join().await;
        recv_json(&mut rx_b); // b's init

        // when (operation):
        let flow = a
            .handle_text(
                r#"{"type":"cursor_position","user_id":"A","position":42,"line":3,"column":7}"#,
            )
            .await;

        // then (expected result):
        assert_eq!(flow, SessionFlow::Continue);
        let cursor = recv_json(&mut rx_b);
        assert_eq!(cursor["type"], "cursor_position");
        assert_eq!(cursor["user_id"], "A");
        assert_eq!(cursor["position"], 42);
        assert_eq!(cursor["line"], 3);
        assert_eq!(cursor["column"], 7);

        // the code buffer is untouched
        let record = fx.store.get_room(&fx.room_id).await.unwrap().unwrap();
        assert_eq!(record.code, "# Start coding in python...\n");
    }

    #[tokio::test]
    async fn test_ping_gets_pong_to_sender_only() {
        // given (precondition):
        let fx = fixture("python").await;
        let (a, mut rx_a) = fx.join().await;
        let (_b, mut rx_b) = fx.join().await;
        recv_json(&mut rx_a); // a's init
        recv_json(&mut rx_a); // user_joined for b
        recv_json(&mut rx_b); // b's init

        // when (operation):
        let flow = a.handle_text(r#"{"type":"ping"}"#).await;

        // then (expected result):
        assert_eq!(flow, SessionFlow::Continue);
        assert_eq!(recv_json(&mut rx_a), json!({"type": "pong"}));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unrecognized_type_is_ignored() {
        // given (precondition):
        let fx = fixture("python").await;
        let (a, mut rx_a) = fx.join().await;
        recv_json(&mut rx_a); // a's init

        // when (operation):
        let flow = a
            .handle_text(r#"{"type":"selection_change","range":[1,5]}"#)
            .await;

        // then (expected result): session continues, nothing is sent
        assert_eq!(flow, SessionFlow::Continue);
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_payload_terminates_the_session() {
        // given (precondition):
        let fx = fixture("python").await;
        let (a, _rx_a) = fx.join().await;

        // when (operation):
        let flow = a.handle_text("this is not json").await;

        // then (expected result):
        assert_eq!(flow, SessionFlow::Terminate);
    }

    #[tokio::test]
    async fn test_close_removes_member_and_announces_user_left() {
        // given (precondition): a and b joined (count = 2)
        let fx = fixture("python").await;
        let (a, mut rx_a) = fx.join().await;
        let (b, _rx_b) = fx.join().await;
        recv_json(&mut rx_a); // a's init
        recv_json(&mut rx_a); // user_joined for b

        // when (operation): b disconnects
        b.close().await;

        // then (expected result):
        assert_eq!(fx.registry.count(&fx.room_id).await, 1);
        let left = recv_json(&mut rx_a);
        assert_eq!(left["type"], "user_left");
        assert_eq!(left["active_users"], 1);

        // last member leaving removes the room entry entirely
        a.close().await;
        assert_eq!(fx.registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_block_the_relay() {
        // given (precondition): a store whose writes fail
        let room_id = "r1".to_string();
        let mut mock = MockRoomStore::new();
        mock.expect_get_room().returning(|id| {
            let mut record = crate::domain::RoomRecord::new("python", 1000);
            record.id = id.to_string();
            Ok(Some(record))
        });
        mock.expect_set_code()
            .returning(|_, _| Err(StoreError::Backend("db down".to_string())));

        let registry = Arc::new(RoomRegistry::new());
        let engine = BroadcastEngine::new(registry.clone());
        let store: Arc<dyn RoomStore> = Arc::new(mock);

        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let a = Session::join(
            registry.clone(),
            engine.clone(),
            store.clone(),
            room_id.clone(),
            Connection::new(tx_a),
        )
        .await
        .unwrap();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let _b = Session::join(registry, engine, store, room_id, Connection::new(tx_b))
            .await
            .unwrap();
        recv_json(&mut rx_b); // b's init

        // when (operation): a sends a code update that fails to persist
        let flow = a
            .handle_text(r#"{"type":"code_update","code":"x=1","user_id":"A"}"#)
            .await;

        // then (expected result): session survives and the relay went out
        assert_eq!(flow, SessionFlow::Continue);
        let update = recv_json(&mut rx_b);
        assert_eq!(update["type"], "code_update");
        assert_eq!(update["code"], "x=1");
    }
}
