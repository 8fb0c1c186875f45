use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use super::{Notification, Notifier, NotifyResult};
use crate::config::EmailConfig;

/// Sends notifications as plain-text mail over SMTP
pub struct EmailNotifier {
    from: String,
    to: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> NotifyResult<Self> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_server)
        }
        .port(config.smtp_port);

        if let Some(username) = &config.username {
            let password = config.resolved_password().unwrap_or_default();
            builder = builder.credentials(Credentials::new(username.clone(), password));
        }

        Ok(Self {
            from: config.from.clone(),
            to: config.to.clone(),
            transport: builder.build(),
        })
    }

    fn build_message(&self, notification: &Notification) -> NotifyResult<Message> {
        let from: Mailbox = self.from.parse()?;
        let to: Mailbox = self.to.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&notification.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())?;

        Ok(message)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    #[instrument(skip_all, fields(to = %self.to))]
    async fn send(&self, notification: &Notification) -> NotifyResult<()> {
        let message = self.build_message(notification)?;

        self.transport.send(message).await?;

        info!("alert email sent: {}", notification.subject);
        Ok(())
    }
}
