//! Per-connection control flow.
//!
//! A connection starts unmatched and runs the matchmaking protocol against
//! the registry. Once seated it relays lines between its transport and the
//! seat until the session releases it. The transport is closed exactly once,
//! when [`ConnectionHandler::run`] returns.

use crate::codec::{ClientCodec, Inbound};
use crate::config::ServerConfig;
use crate::error::{CommandError, RegistryError, ServerError};
use crate::protocol::{Command, messages};
use crate::registry::{GameId, GameRegistry};
use crate::seat::{self, Forward, SeatLink};
use crate::session::GameSession;
use crate::slot::Slot;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

/// Stands in for an undecodable line on its way to the session, which then
/// rejects it like any other unparsable move.
const NOT_TEXT_MOVE: &str = "\u{FFFD}";

/// Shared services every connection handler needs.
#[derive(Debug, Clone, derive_new::new)]
pub struct LobbyContext {
    /// Game registry.
    pub registry: GameRegistry,
    /// Cancelled on server shutdown.
    pub shutdown: CancellationToken,
    /// Tracks spawned turn loops so shutdown can wait for them.
    pub tracker: TaskTracker,
    /// Server settings.
    pub config: ServerConfig,
}

/// A connection that has taken a seat.
struct Seated {
    id: GameId,
    slot: Slot,
    link: SeatLink,
    session: Option<GameSession>,
}

/// Drives one client connection from welcome to close.
pub struct ConnectionHandler<S> {
    lines: Framed<S, ClientCodec>,
    context: LobbyContext,
    peer: String,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Wraps a transport; `peer` labels it in logs.
    pub fn new(stream: S, peer: impl Into<String>, context: LobbyContext) -> Self {
        let codec = ClientCodec::new(*context.config.max_line_length());
        Self {
            lines: Framed::new(stream, codec),
            context,
            peer: peer.into(),
        }
    }

    /// Serves the connection until the client leaves, its game ends, or
    /// the server shuts down, then closes the transport.
    #[instrument(skip(self), fields(peer = %self.peer))]
    pub async fn run(mut self) -> Result<(), ServerError> {
        info!("Client connected");
        let result = self.serve().await;

        if let Err(err) = SinkExt::<String>::close(&mut self.lines).await {
            debug!(error = %err, "Error closing transport");
        }
        info!("Connection closed");
        result
    }

    async fn serve(&mut self) -> Result<(), ServerError> {
        self.send(messages::welcome()).await?;
        match self.matchmake().await? {
            Some(seated) => self.relay(seated).await,
            None => Ok(()),
        }
    }

    async fn send(&mut self, message: String) -> Result<(), ServerError> {
        self.lines.send(message).await?;
        Ok(())
    }

    async fn reject_long_line(&mut self) -> Result<(), ServerError> {
        let max = self.lines.codec().max_length();
        debug!(max, "Discarded overlong line");
        self.send(messages::line_too_long(max)).await
    }

    /// Unmatched state: read commands until seated, gone, or shut down.
    async fn matchmake(&mut self) -> Result<Option<Seated>, ServerError> {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.context.shutdown.cancelled() => {
                    self.send(messages::shutting_down()).await?;
                    return Ok(None);
                }
                next = self.lines.next() => next,
            };

            let line = match next {
                Some(Ok(Inbound::Line(line))) => line,
                Some(Ok(Inbound::TooLong)) => {
                    self.reject_long_line().await?;
                    continue;
                }
                Some(Ok(Inbound::NotText)) => {
                    debug!("Discarded undecodable line");
                    self.send(messages::invalid_input(&CommandError::NotText)).await?;
                    continue;
                }
                Some(Err(err)) => return Err(err.into()),
                None => {
                    info!("Client disconnected before joining a game");
                    return Ok(None);
                }
            };

            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(err) => {
                    debug!(%line, error = %err, "Invalid matchmaking input");
                    self.send(messages::invalid_input(&err)).await?;
                    continue;
                }
            };

            let seating = match command {
                Command::Create => self.create(),
                Command::Join(id) => self.seat(id),
                Command::List => {
                    let open = self.context.registry.open_games();
                    self.send(messages::open_games(&open)).await?;
                    continue;
                }
                Command::Help => {
                    self.send(messages::welcome()).await?;
                    continue;
                }
                Command::Quit => {
                    self.send(messages::goodbye()).await?;
                    return Ok(None);
                }
            };

            match seating {
                Ok(seated) => return Ok(Some(seated)),
                Err(err) => {
                    warn!(error = %err, "Matchmaking failed");
                    self.send(messages::join_failed(&err)).await?;
                }
            }
        }
    }

    fn create(&self) -> Result<Seated, RegistryError> {
        let id = self.context.registry.create_game()?;
        self.seat(id)
    }

    fn seat(&self, id: GameId) -> Result<Seated, RegistryError> {
        let (seat, link) = seat::channel(*self.context.config.input_backlog());
        let seating = self.context.registry.seat_player(id, seat)?;
        Ok(Seated {
            id,
            slot: seating.slot,
            link,
            session: seating.session,
        })
    }

    /// Seated state: shuttle lines until the session lets go of the seat.
    #[instrument(skip(self, seated), fields(game_id = %seated.id, slot = ?seated.slot))]
    async fn relay(&mut self, seated: Seated) -> Result<(), ServerError> {
        let Seated {
            id,
            slot,
            mut link,
            session,
        } = seated;

        let greeting = match session {
            Some(session) => {
                info!("Game full, starting turn loop");
                self.context.tracker.spawn(session.run());
                messages::joined(id, slot)
            }
            None => messages::waiting_for_opponent(id),
        };

        let result = match self.send(greeting).await {
            Ok(()) => self.pump(&mut link).await,
            Err(err) => Err(err),
        };

        // Only removes the game if it never started; running games notice
        // the dropped link and abort themselves.
        if self.context.registry.abandon(id) {
            info!("Left before an opponent joined");
        }
        result
    }

    async fn pump(&mut self, link: &mut SeatLink) -> Result<(), ServerError> {
        loop {
            tokio::select! {
                message = link.next_message() => match message {
                    Some(message) => self.send(message).await?,
                    None => {
                        debug!("Seat released");
                        return Ok(());
                    }
                },
                next = self.lines.next() => match next {
                    Some(Ok(Inbound::Line(line))) => self.forward(link, line).await?,
                    Some(Ok(Inbound::NotText)) => {
                        debug!("Forwarding undecodable line as an invalid move");
                        self.forward(link, NOT_TEXT_MOVE.to_string()).await?;
                    }
                    Some(Ok(Inbound::TooLong)) => self.reject_long_line().await?,
                    Some(Err(err)) => return Err(err.into()),
                    None => {
                        info!("Client disconnected while seated");
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn forward(&mut self, link: &SeatLink, line: String) -> Result<(), ServerError> {
        match link.forward(line) {
            Forward::Queued => Ok(()),
            Forward::Dropped => self.send(messages::input_dropped()).await,
            Forward::Closed => {
                debug!("Session no longer reading");
                Ok(())
            }
        }
    }
}
