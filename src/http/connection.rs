use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, warn};

use crate::config::ServerConfig;
use crate::http::handler::Handler;
use crate::http::parser::{find_frame_end, parse_request, InvalidRequest};
use crate::http::request::{Request, HTTP_1_1};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// One accepted connection: the socket, the bytes received but not yet
/// consumed as a frame, and the idle deadline.
pub struct Connection<S, H> {
    stream: S,
    handler: Arc<H>,
    settings: ServerConfig,
    buffer: BytesMut,
    deadline: Instant,
    state: ConnectionState,
}

pub enum ConnectionState {
    AwaitingData,
    ExtractingFrames,
    Dispatching(Result<Request, InvalidRequest>),
    Writing(ResponseWriter, bool), // bool = close after write?
    Closed,
}

impl<S, H> Connection<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: Handler,
{
    pub fn new(stream: S, handler: Arc<H>, settings: ServerConfig) -> Self {
        let deadline = Instant::now() + settings.recv_timeout();
        Self {
            stream,
            handler,
            buffer: BytesMut::with_capacity(settings.recv_buf_size),
            settings,
            deadline,
            state: ConnectionState::AwaitingData,
        }
    }

    /// Drives the connection until it closes.
    ///
    /// Timeouts, end of stream, read failures and malformed requests all end
    /// in an orderly close and `Ok(())`. Only a failed write is returned as
    /// an error.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::AwaitingData => self.await_data().await,

                ConnectionState::ExtractingFrames => self.extract_frame(),

                ConnectionState::Dispatching(parsed) => {
                    let response = Self::dispatch(&self.handler, parsed).await;
                    Self::writing(&response)
                }

                ConnectionState::Writing(mut writer, close) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if close {
                        ConnectionState::Closed
                    } else {
                        // new request cycle: drain pipelined frames before reading again
                        self.deadline = Instant::now() + self.settings.recv_timeout();
                        ConnectionState::ExtractingFrames
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "shutdown after close failed");
        }

        Ok(())
    }

    async fn await_data(&mut self) -> ConnectionState {
        self.buffer.reserve(self.settings.recv_buf_size);

        match timeout_at(self.deadline, self.stream.read_buf(&mut self.buffer)).await {
            Err(_) if self.buffer.is_empty() => {
                debug!("idle timeout, closing connection");
                ConnectionState::Closed
            }
            Err(_) => {
                warn!(
                    pending = self.buffer.len(),
                    "incomplete request at idle timeout"
                );
                Self::writing(&Response::bad_request(HTTP_1_1))
            }
            Ok(Ok(0)) => {
                debug!("peer closed connection");
                ConnectionState::Closed
            }
            Ok(Ok(_)) => ConnectionState::ExtractingFrames,
            Ok(Err(e)) => {
                warn!(error = %e, "failed receiving request");
                ConnectionState::Closed
            }
        }
    }

    fn extract_frame(&mut self) -> ConnectionState {
        match find_frame_end(&self.buffer) {
            Some(end) => {
                let frame = self.buffer.split_to(end + 4);
                ConnectionState::Dispatching(parse_request(&frame[..end + 2]))
            }
            None if self.buffer.len() > self.settings.max_frame_size => {
                warn!(
                    pending = self.buffer.len(),
                    limit = self.settings.max_frame_size,
                    "request headers too large"
                );
                Self::writing(&Response::bad_request(HTTP_1_1))
            }
            None => ConnectionState::AwaitingData,
        }
    }

    async fn dispatch(handler: &H, parsed: Result<Request, InvalidRequest>) -> Response {
        let request = match parsed {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "rejecting malformed request");
                return Response::bad_request(HTTP_1_1);
            }
        };

        debug!(
            method = request.method.as_str(),
            url = %request.url,
            host = %request.host,
            "dispatching request"
        );

        match handler.handle(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, url = %request.url, "handler failed");
                Response::internal_error(&request.proto)
            }
        }
    }

    fn writing(response: &Response) -> ConnectionState {
        ConnectionState::Writing(ResponseWriter::new(response), response.is_close())
    }
}
