//! Socket tuning for accepted connections

use socket2::SockRef;
use std::io;
use tokio::net::TcpStream;

/// Apply per-connection socket options
///
/// NNTP is a chatty request/response protocol, so Nagle's algorithm only
/// adds latency. Keepalive catches silently dead peers that the idle
/// reaper would otherwise carry until its timeout.
pub fn tune_stream(stream: &TcpStream) -> io::Result<()> {
    let sock = SockRef::from(stream);

    sock.set_nodelay(true)?;
    sock.set_keepalive(true)?;

    // Probe after 60s idle, then every 10s; timing is left at OS
    // defaults on platforms without the knobs
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        use std::time::Duration;
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(Duration::from_secs(60))
            .with_interval(Duration::from_secs(10));
        sock.set_tcp_keepalive(&keepalive)?;
    }

    Ok(())
}
