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

//! Implementation of the Tokio I/O provider.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::error;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::RECEIVE_BUF_SIZE;
use crate::server::{Response, Server};
use crate::zone::Policy;

/// A Tokio I/O provider.
///
/// This provider receives on a Tokio [`UdpSocket`] in a single spawned
/// task, handling each datagram to completion before receiving the
/// next, just like the [`BlockingIoProvider`](super::BlockingIoProvider).
/// It is for embedding the responder in an application that already
/// runs a Tokio runtime.
pub struct TokioIoProvider {
    socket: UdpSocket,
}

impl TokioIoProvider {
    /// Creates a new `TokioIoProvider`. This call binds the UDP socket
    /// in preparation, but does not start the server. This function
    /// requires that the Tokio runtime be active.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    /// Returns the address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Starts the server on the active Tokio runtime.
    ///
    /// The returned [`TokioShutdownController`] must be held as long as
    /// the server should be running, since dropping it triggers
    /// shutdown.
    pub fn start<P>(self, server: Arc<Server<P>>) -> TokioShutdownController
    where
        P: Policy + Send + Sync + 'static,
    {
        let (request_sender, request_receiver) = broadcast::channel(1);
        let task = tokio::spawn(async move {
            if let Err(e) = run_udp_receiver(request_receiver, &server, self.socket).await {
                error!("I/O error: {e}");
            }
        });
        TokioShutdownController {
            request_sender,
            task,
        }
    }
}

/// The UDP receive/handle/send loop.
async fn run_udp_receiver<P>(
    mut shutdown: broadcast::Receiver<()>,
    server: &Server<P>,
    socket: UdpSocket,
) -> io::Result<()>
where
    P: Policy,
{
    let mut received_buf = vec![0; RECEIVE_BUF_SIZE];

    loop {
        let (received_len, src) = tokio::select! {
            _ = shutdown.recv() => return Ok(()),
            res = socket.recv_from(&mut received_buf) => res?,
        };

        match server.handle_message(&received_buf[..received_len], src) {
            Response::Single(response) => {
                if let Err(e) = socket.send_to(&response, src).await {
                    error!("I/O error: {e}");
                }
            }
            Response::None => (),
        }
    }
}

/// Controls the shutdown of the task spawned by
/// [`TokioIoProvider::start`].
///
/// Use [`TokioShutdownController::shut_down`] to stop the task and wait
/// for it to finish. Dropping the controller also stops the task (but
/// does not wait).
#[must_use]
pub struct TokioShutdownController {
    request_sender: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl TokioShutdownController {
    /// Requests that the server task shut down, and then waits for it
    /// to terminate.
    pub async fn shut_down(self) {
        drop(self.request_sender);
        let _ = self.task.await;
    }
}
