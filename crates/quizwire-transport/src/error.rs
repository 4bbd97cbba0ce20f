/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting or upgrading an incoming connection failed.
    #[error("accept failed: {0}")]
    Accept(String),

    /// Sending data failed (peer gone, socket closed).
    #[error("send failed: {0}")]
    Send(String),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    Receive(String),
}
