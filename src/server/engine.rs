//! Per-connection engine: read loop, dispatch, and the write drain task
//!
//! One engine task per accepted socket. It owns the session and the framer;
//! responses travel through the pending output queue to a writer task so a
//! handler never blocks on a slow client. Closing is idempotent whether it
//! comes from QUIT, an I/O error, or the reaper.

use super::handle::{output_channel, ConnectionHandle};
use super::ServerContext;
use crate::command::HandlerStatus;
use crate::protocol::{responses, FramerError, LineFramer};
use crate::session::Session;
use anyhow::Result;
use bytes::{Bytes, BytesMut};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::constants::buffer::READ_CHUNK;

/// Drive one connection from greeting to close
///
/// Deregisters from the connection registry on the way out, whatever path
/// ended the connection.
pub async fn run_connection(
    stream: TcpStream,
    handle: Arc<ConnectionHandle>,
    server: Arc<ServerContext>,
) -> Result<()> {
    let peer = handle.peer();
    let (mut read_half, write_half) = stream.into_split();
    let (sender, rx) = output_channel(handle.clone());
    let writer = tokio::spawn(write_loop(write_half, rx, handle.clone()));

    sender.send_line(&server.greeting_line);

    let mut session = Session::new(handle.id());
    let mut framer = LineFramer::new(server.max_line_length);
    let mut read_buf = BytesMut::with_capacity(READ_CHUNK);

    'connection: loop {
        tokio::select! {
            _ = handle.closed() => {
                debug!("{} close requested", handle.id());
                break 'connection;
            }
            result = read_half.read_buf(&mut read_buf) => {
                match result {
                    Ok(0) => {
                        debug!("{} disconnected", handle.id());
                        break 'connection;
                    }
                    Ok(_) => {
                        framer.feed(&read_buf);
                        read_buf.clear();
                        loop {
                            match framer.next_line() {
                                Ok(Some(line)) => {
                                    handle.touch();
                                    let status = server
                                        .dispatcher
                                        .dispatch(&mut session, &sender, &server.command_ctx, &line)
                                        .await;
                                    match status {
                                        Ok(HandlerStatus::Quit) => break 'connection,
                                        Ok(_) => {}
                                        Err(e) => {
                                            warn!("{} dispatch failed: {:#}", handle.id(), e);
                                            break 'connection;
                                        }
                                    }
                                }
                                Ok(None) => break,
                                Err(FramerError::LineTooLong { limit }) => {
                                    // Conservative policy: reply and drop the
                                    // connection rather than resynchronize
                                    info!("{} sent a line over {} octets", handle.id(), limit);
                                    sender.send_line(responses::LINE_TOO_LONG);
                                    break 'connection;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        debug!("{} read error: {}", handle.id(), e);
                        break 'connection;
                    }
                }
            }
        }
    }

    handle.begin_close();
    // Dropping the sender closes the queue; the writer drains what is
    // already enqueued before the socket shuts down, so the client gets
    // the full response to its final command.
    drop(sender);
    let _ = writer.await;

    server.registry.remove(handle.id());
    info!("connection from {} closed ({})", peer, handle.id());
    Ok(())
}

/// Drain the pending output queue to the socket, in enqueue order
async fn write_loop(
    mut write_half: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<Bytes>,
    handle: Arc<ConnectionHandle>,
) {
    while let Some(buf) = rx.recv().await {
        let result = write_half.write_all(&buf).await;
        handle.output_drained();
        match result {
            Ok(()) => handle.touch(),
            Err(e) => {
                debug!("{} write error: {}", handle.id(), e);
                handle.begin_close();
                // Account for buffers that will never reach the socket
                rx.close();
                while rx.try_recv().is_ok() {
                    handle.output_drained();
                }
                return;
            }
        }
    }
    let _ = write_half.shutdown().await;
}
