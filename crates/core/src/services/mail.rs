//! Outbound mail service.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::Mailbox,
    transport::smtp::authentication::Credentials,
};
use tracing::info;
use yamdb_common::{AppError, AppResult, Config};

/// Sends confirmation codes over SMTP.
///
/// When no mail configuration is present the service degrades to logging
/// the code, which keeps local development working without a relay.
#[derive(Clone)]
pub struct MailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl MailService {
    /// Build the service from application configuration.
    pub fn new(config: &Config) -> AppResult<Self> {
        let Some(mail) = &config.mail else {
            return Ok(Self {
                transport: None,
                from: None,
            });
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.smtp_host)
            .map_err(|e| AppError::Mail(e.to_string()))?
            .port(mail.smtp_port);

        if let (Some(username), Some(password)) = (&mail.username, &mail.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from: Mailbox = mail
            .from_address
            .parse()
            .map_err(|e| AppError::Mail(format!("invalid from address: {e}")))?;

        Ok(Self {
            transport: Some(builder.build()),
            from: Some(from),
        })
    }

    /// Send a signup confirmation code to a user.
    pub async fn send_confirmation_code(
        &self,
        email: &str,
        username: &str,
        code: &str,
    ) -> AppResult<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            info!(%username, %code, "mail transport not configured, logging confirmation code");
            return Ok(());
        };

        let to: Mailbox = email
            .parse()
            .map_err(|e| AppError::Mail(format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject("YaMDb confirmation code")
            .body(format!(
                "Hello {username},\n\nYour confirmation code is: {code}\n"
            ))
            .map_err(|e| AppError::Mail(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        info!(%username, "confirmation code sent");
        Ok(())
    }
}
