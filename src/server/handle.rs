//! Shared per-connection liveness state and the pending output queue
//!
//! The engine task owns the socket; everything another task may need to
//! observe (last activity, undrained output, close state) lives here behind
//! atomics so the reaper never touches a connection's I/O path.

use crate::protocol::dot_stuff;
use crate::types::ConnectionId;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Registry-visible state of one live connection
#[derive(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    peer: SocketAddr,
    /// Monotonic origin for the activity clock
    epoch: Instant,
    /// Milliseconds since `epoch` of the last line received or sent;
    /// advanced with `fetch_max` so it never decreases
    last_activity_ms: AtomicU64,
    /// Buffers enqueued but not yet fully written to the socket
    pending: AtomicUsize,
    /// Latched by the first closer; later closers observe a no-op
    close_started: AtomicBool,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    #[must_use]
    pub fn new(id: ConnectionId, peer: SocketAddr) -> Arc<Self> {
        Arc::new(Self {
            id,
            peer,
            epoch: Instant::now(),
            last_activity_ms: AtomicU64::new(0),
            pending: AtomicUsize::new(0),
            close_started: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        })
    }

    #[must_use]
    #[inline]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    #[must_use]
    #[inline]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Record activity now; monotonically non-decreasing
    pub fn touch(&self) {
        let now = self.epoch.elapsed().as_millis() as u64;
        self.last_activity_ms.fetch_max(now, Ordering::Relaxed);
    }

    /// Time since the last recorded activity
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        let now = self.epoch.elapsed().as_millis() as u64;
        let last = self.last_activity_ms.load(Ordering::Relaxed);
        Duration::from_millis(now.saturating_sub(last))
    }

    /// Number of output buffers not yet drained to the socket
    #[must_use]
    pub fn pending_outputs(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Begin closing this connection
    ///
    /// Safe to call concurrently from the reaper, the QUIT handler, and
    /// the engine's error path; exactly one caller wins the latch and
    /// triggers the cancellation, the rest observe `false`.
    pub fn begin_close(&self) -> bool {
        let won = self
            .close_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.cancel.cancel();
        }
        won
    }

    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.close_started.load(Ordering::Acquire)
    }

    /// Future that resolves once closing has begun
    pub fn closed(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    fn output_enqueued(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.touch();
    }

    pub(crate) fn output_drained(&self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
        self.touch();
    }
}

/// Handler-side end of the pending output queue
///
/// Appends never block; the connection's writer task drains buffers in
/// enqueue order. Cloned freely into whatever needs to emit a response.
#[derive(Debug, Clone)]
pub struct ResponseSender {
    tx: mpsc::UnboundedSender<Bytes>,
    handle: Arc<ConnectionHandle>,
}

impl ResponseSender {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<Bytes>, handle: Arc<ConnectionHandle>) -> Self {
        Self { tx, handle }
    }

    fn enqueue(&self, buf: Bytes) {
        self.handle.output_enqueued();
        if self.tx.send(buf).is_err() {
            // Writer already gone; the close path owns cleanup
            self.handle.output_drained();
        }
    }

    /// Queue a single response line, appending CRLF
    pub fn send_line(&self, line: &str) {
        let mut buf = BytesMut::with_capacity(line.len() + 2);
        buf.put_slice(line.as_bytes());
        buf.put_slice(b"\r\n");
        self.enqueue(buf.freeze());
    }

    /// Queue a status line followed by a dot-stuffed multi-line payload
    /// and the terminating `.` line
    pub fn send_multiline<I, L>(&self, status: &str, payload: I)
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut buf = BytesMut::with_capacity(status.len() + 64);
        buf.put_slice(status.as_bytes());
        buf.put_slice(b"\r\n");
        for line in payload {
            buf.put_slice(&dot_stuff(line.as_ref()));
            buf.put_slice(b"\r\n");
        }
        buf.put_slice(b".\r\n");
        self.enqueue(buf.freeze());
    }

    /// Lines received count as activity too
    pub fn touch(&self) {
        self.handle.touch();
    }

    #[must_use]
    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }
}

/// Build a connected handle/sender/receiver triple
///
/// The receiver side goes to the connection's writer task.
#[must_use]
pub fn output_channel(
    handle: Arc<ConnectionHandle>,
) -> (ResponseSender, mpsc::UnboundedReceiver<Bytes>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ResponseSender::new(tx, handle), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handle() -> Arc<ConnectionHandle> {
        ConnectionHandle::new(ConnectionId::new(1), "127.0.0.1:9999".parse().unwrap())
    }

    #[test]
    fn test_begin_close_is_idempotent() {
        let handle = test_handle();
        assert!(!handle.is_closing());
        assert!(handle.begin_close());
        assert!(!handle.begin_close());
        assert!(!handle.begin_close());
        assert!(handle.is_closing());
    }

    #[test]
    fn test_touch_never_decreases() {
        let handle = test_handle();
        handle.touch();
        let first = handle.idle_for();
        handle.touch();
        assert!(handle.idle_for() <= first + Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_pending_counts_enqueued_buffers() {
        let handle = test_handle();
        let (sender, mut rx) = output_channel(handle.clone());

        sender.send_line("200 hi");
        sender.send_line("205 bye");
        assert_eq!(handle.pending_outputs(), 2);

        rx.recv().await.unwrap();
        handle.output_drained();
        assert_eq!(handle.pending_outputs(), 1);

        rx.recv().await.unwrap();
        handle.output_drained();
        assert_eq!(handle.pending_outputs(), 0);
    }

    #[tokio::test]
    async fn test_send_line_appends_crlf() {
        let handle = test_handle();
        let (sender, mut rx) = output_channel(handle);

        sender.send_line("205 bye");
        assert_eq!(rx.recv().await.unwrap().as_ref(), b"205 bye\r\n");
    }

    #[tokio::test]
    async fn test_multiline_is_dot_stuffed_and_terminated() {
        let handle = test_handle();
        let (sender, mut rx) = output_channel(handle);

        sender.send_multiline("220 1 <a@b>", [b"hello".as_ref(), b".".as_ref()]);
        let buf = rx.recv().await.unwrap();
        assert_eq!(buf.as_ref(), b"220 1 <a@b>\r\nhello\r\n..\r\n.\r\n");
    }

    #[tokio::test]
    async fn test_enqueue_after_writer_gone() {
        let handle = test_handle();
        let (sender, rx) = output_channel(handle.clone());
        drop(rx);

        sender.send_line("200 hi");
        // Buffer was never queued, so pending must not leak
        assert_eq!(handle.pending_outputs(), 0);
    }

    #[tokio::test]
    async fn test_closed_future_resolves() {
        let handle = test_handle();
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.closed().await });
        handle.begin_close();
        task.await.unwrap();
    }
}
