use may::coroutine::JoinHandle;
use may_minihttp::{HttpServer, HttpService};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

/// Handle to a running accept loop.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the listen address until it accepts connections.
    ///
    /// # Errors
    ///
    /// `TimedOut` when the listener is not reachable within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        let target = match self.addr {
            SocketAddr::V4(a) if a.ip().is_unspecified() => {
                SocketAddr::from(([127, 0, 0, 1], a.port()))
            }
            SocketAddr::V6(a) if a.ip().is_unspecified() => {
                SocketAddr::from((std::net::Ipv6Addr::LOCALHOST, a.port()))
            }
            addr => addr,
        };
        for _ in 0..50 {
            if TcpStream::connect(target).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the accept loop and wait for it to finish. In-flight requests
    /// are not interrupted.
    pub fn stop(self) {
        // SAFETY: cancelling our own accept coroutine; the handle is valid and
        // is joined right after.
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            tracing::debug!(addr = %self.addr, "Accept loop ended with a panic");
        }
    }

    /// Block until the accept loop ends.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the accept loop panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

/// Bind `service` to `addr` and start accepting.
///
/// # Errors
///
/// An unresolvable address or a port that cannot be bound.
pub fn start<T, A>(service: T, addr: A) -> io::Result<ServerHandle>
where
    T: HttpService + Clone + Send + Sync + 'static,
    A: ToSocketAddrs,
{
    let addr = addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
    let handle = HttpServer(service).start(addr)?;
    Ok(ServerHandle { addr, handle })
}
