use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, instrument};

use crate::{Email, SmtpConfig, SmtpError};

/// Client for sending email through an SMTP relay.
///
/// Uses connection pooling so a digest run to many recipients reuses sessions.
pub struct SmtpClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpClient {
    /// Create a new client with the given configuration.
    ///
    /// The connection is opened lazily on the first send.
    pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
        let creds = Credentials::new(config.username.clone(), config.password().to_string());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| SmtpError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(creds)
            .timeout(Some(config.timeout))
            .build();

        info!(
            host = %config.host,
            port = config.port,
            from = %config.from_address,
            "Created SMTP client"
        );

        Ok(Self {
            transport,
            from_address: config.from_address,
        })
    }

    /// Send an email.
    #[instrument(skip(self, email), fields(to = ?email.to, subject = %email.subject))]
    pub async fn send(&self, email: &Email) -> Result<(), SmtpError> {
        let message = build_message(&self.from_address, email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| SmtpError::Send(e.to_string()))?;

        info!(to = ?email.to, "Email sent successfully");
        Ok(())
    }
}

/// Build a lettre Message from our Email type.
fn build_message(from_address: &str, email: &Email) -> Result<Message, SmtpError> {
    if email.to.is_empty() {
        return Err(SmtpError::InvalidAddress("no recipients".to_string()));
    }

    let from: Mailbox = from_address
        .parse()
        .map_err(|e| SmtpError::InvalidAddress(format!("From: {}", e)))?;

    let mut builder = Message::builder().from(from).subject(&email.subject);

    for to in &email.to {
        let addr: Mailbox = to
            .parse()
            .map_err(|e| SmtpError::InvalidAddress(format!("To '{}': {}", to, e)))?;
        builder = builder.to(addr);
    }

    builder
        .body(email.body.clone())
        .map_err(|e| SmtpError::BuildEmail(e.to_string()))
}
