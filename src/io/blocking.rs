// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the blocking I/O provider.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};

use super::RECEIVE_BUF_SIZE;
use crate::server::{Response, Server};
use crate::zone::Policy;

/// A blocking I/O provider.
///
/// This provider uses a standard library [`UdpSocket`] and a single
/// thread that receives, handles, and answers datagrams one after
/// another.
///
/// Shutdown is cooperative: the receive loop checks a shared flag
/// between receives, and receives time out after
/// [`BlockingIoConfig::read_timeout`] so that the flag is checked
/// regularly even when no datagrams arrive.
pub struct BlockingIoProvider {
    config: BlockingIoConfig,
    socket: UdpSocket,
}

/// Configuration options for the [`BlockingIoProvider`].
#[derive(Clone, Debug)]
pub struct BlockingIoConfig {
    /// The maximum interval between checks for shutdown. This is also
    /// the longest [`BlockingShutdownController::shut_down`] can take.
    pub read_timeout: Duration,
}

impl Default for BlockingIoConfig {
    fn default() -> Self {
        Self {
            read_timeout: CHECK_FOR_SHUTDOWN_TIMEOUT,
        }
    }
}

/// The default for [`BlockingIoConfig::read_timeout`].
const CHECK_FOR_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

impl BlockingIoProvider {
    /// Creates a new `BlockingIoProvider`. This call binds the UDP
    /// socket in preparation, but does not start the server.
    pub fn bind(config: BlockingIoConfig, addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(config.read_timeout))?;
        Ok(Self { config, socket })
    }

    /// Returns the address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Returns the provider's configuration.
    pub fn config(&self) -> &BlockingIoConfig {
        &self.config
    }

    /// Runs the receive loop on the current thread until `shutdown` is
    /// set. Returns early only on a receive error other than a timeout
    /// or interruption.
    pub fn run<P>(&self, server: &Server<P>, shutdown: &AtomicBool) -> io::Result<()>
    where
        P: Policy,
    {
        run_udp_receiver(&self.socket, server, shutdown)
    }

    /// Starts the receive loop on a new thread.
    ///
    /// The returned [`BlockingShutdownController`] stops the thread;
    /// dropping it without calling
    /// [`BlockingShutdownController::shut_down`] leaves the thread
    /// running.
    pub fn start<P>(self, server: Arc<Server<P>>) -> io::Result<BlockingShutdownController>
    where
        P: Policy + Send + Sync + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let thread = thread::Builder::new()
            .name("udp receiver".to_owned())
            .spawn(move || {
                log_io_errors(self.run(&server, &shutdown_clone));
            })?;
        Ok(BlockingShutdownController { shutdown, thread })
    }
}

/// Controls the shutdown of the thread started by
/// [`BlockingIoProvider::start`].
pub struct BlockingShutdownController {
    shutdown: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl BlockingShutdownController {
    /// Returns the flag the receive loop checks. Setting it (e.g. from
    /// a signal handler) starts shutdown.
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Requests that the receive loop stop, and waits for it to do so.
    pub fn shut_down(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if self.thread.join().is_err() {
            error!("The UDP receiver thread panicked.");
        }
        info!("Shutdown complete.");
    }
}

/// The UDP receive/handle/send loop.
fn run_udp_receiver<P>(
    socket: &UdpSocket,
    server: &Server<P>,
    shutdown: &AtomicBool,
) -> io::Result<()>
where
    P: Policy,
{
    let mut received_buf = [0; RECEIVE_BUF_SIZE];

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }

        // Receive a DNS message. If interrupted, we skip the rest of
        // the loop body and check for shutdown again before retrying.
        let (received_len, src) = match socket.recv_from(&mut received_buf) {
            Ok(pair) => pair,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        // Process the DNS message and send the response, if any.
        match server.handle_message(&received_buf[..received_len], src) {
            Response::Single(response) => {
                // Don't exit the loop if the send fails.
                log_io_errors(retry_if_interrupted(|| socket.send_to(&response, src)));
            }
            Response::None => (),
        }
    }
}

/// Executes `f`, retrying the operation if it is interrupted.
fn retry_if_interrupted<F, R>(mut f: F) -> io::Result<R>
where
    F: FnMut() -> io::Result<R>,
{
    loop {
        match f() {
            Ok(r) => return Ok(r),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Logs errors if an I/O operation fails.
fn log_io_errors<T>(result: io::Result<T>) {
    if let Err(e) = result {
        let current_thread = thread::current();
        let thread_name = current_thread.name().unwrap_or("anonymous thread");
        error!("I/O error in thread {}: {}", thread_name, e);
    }
}
