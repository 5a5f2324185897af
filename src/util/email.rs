use crate::config::{ConfigError, EmailConfig};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;
use strum_macros::{Display, EnumString};
use tracing::{error, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
}

impl EmailMessage {
    pub fn new(to: String, subject: String) -> Self {
        Self {
            to,
            subject,
            text_body: None,
            html_body: None,
        }
    }

    pub fn with_text_body(mut self, body: String) -> Self {
        self.text_body = Some(body);
        self
    }

    pub fn with_html_body(mut self, body: String) -> Self {
        self.html_body = Some(body);
        self
    }
}

/// Notifications sent by the service. Clients receive the quote and its
/// reminders; the artisan hears about answers and expirations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmailType {
    QuoteSent,
    QuoteAccepted,
    QuoteRejected,
    FollowUpReminder,
    QuoteExpired,
}

/// Values substituted into the templates. Every field is plain text and is
/// escaped when rendered as HTML.
#[derive(Debug, Clone, Default)]
pub struct EmailContext {
    pub recipient_name: String,
    pub company_name: String,
    pub quote_number: String,
    pub quote_title: String,
    /// Formatted amount including VAT, e.g. "145.20"
    pub total_amount: String,
    pub valid_until: Option<String>,
    pub share_url: Option<String>,
    pub follow_up_stage: Option<u32>,
}

pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub fn render_email(email_type: EmailType, ctx: &EmailContext) -> RenderedEmail {
    let subject = match email_type {
        EmailType::QuoteSent => format!("Quote {} from {}", ctx.quote_number, ctx.company_name),
        EmailType::QuoteAccepted => format!("Quote {} was accepted", ctx.quote_number),
        EmailType::QuoteRejected => format!("Quote {} was declined", ctx.quote_number),
        EmailType::FollowUpReminder => {
            format!("Reminder: quote {} from {}", ctx.quote_number, ctx.company_name)
        }
        EmailType::QuoteExpired => format!("Quote {} has expired", ctx.quote_number),
    };

    let validity = ctx
        .valid_until
        .as_ref()
        .map(|d| format!(" It is valid until {}.", d))
        .unwrap_or_default();

    let lines: Vec<String> = match email_type {
        EmailType::QuoteSent => vec![
            format!(
                "{} sent you the quote \"{}\" for a total of {} (VAT included).{}",
                ctx.company_name, ctx.quote_title, ctx.total_amount, validity
            ),
            "You can review, accept or decline it online:".to_string(),
        ],
        EmailType::FollowUpReminder => vec![
            format!(
                "{} is waiting for your answer on the quote \"{}\" ({}).{}",
                ctx.company_name, ctx.quote_title, ctx.total_amount, validity
            ),
            "The quote is still available online:".to_string(),
        ],
        EmailType::QuoteAccepted => vec![format!(
            "Good news: your client accepted the quote \"{}\" ({}).",
            ctx.quote_title, ctx.total_amount
        )],
        EmailType::QuoteRejected => vec![format!(
            "Your client declined the quote \"{}\" ({}).",
            ctx.quote_title, ctx.total_amount
        )],
        EmailType::QuoteExpired => vec![format!(
            "The quote \"{}\" ({}) reached its validity date without an answer and is now expired.",
            ctx.quote_title, ctx.total_amount
        )],
    };

    let mut text = format!("Hello {},\n\n", ctx.recipient_name);
    for line in &lines {
        text.push_str(line);
        text.push('\n');
    }
    if let Some(url) = &ctx.share_url {
        text.push_str(&format!("\n{}\n", url));
    }
    text.push_str(&format!("\nBest regards,\n{}\n", ctx.company_name));

    let mut body = String::new();
    for line in &lines {
        body.push_str(&format!("<p>{}</p>\n", html_escape::encode_text(line)));
    }
    if let Some(url) = &ctx.share_url {
        body.push_str(&format!(
            "<p style=\"text-align:center\"><a href=\"{href}\" class=\"button\">View the quote</a></p>\n<p style=\"word-break:break-all\">{text}</p>\n",
            href = html_escape::encode_double_quoted_attribute(url),
            text = html_escape::encode_text(url)
        ));
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #2f6f4f; color: #ffffff; text-decoration: none; border-radius: 4px; }}
        .footer {{ font-size: 12px; color: #6c757d; }}
    </style>
</head>
<body>
    <h2>{title}</h2>
    <p>Hello {recipient},</p>
{body}    <p>Best regards,<br>{company}</p>
    <p class="footer">This is an automated message. Please do not reply to this email.</p>
</body>
</html>"#,
        title = html_escape::encode_text(&subject),
        recipient = html_escape::encode_text(&ctx.recipient_name),
        company = html_escape::encode_text(&ctx.company_name),
        body = body,
    );

    RenderedEmail { subject, text, html }
}

pub fn build_email(to: &str, email_type: EmailType, ctx: &EmailContext) -> EmailMessage {
    let rendered = render_email(email_type, ctx);
    EmailMessage::new(to.to_string(), rendered.subject)
        .with_text_body(rendered.text)
        .with_html_body(rendered.html)
}

pub fn validate_email_address(email: &str) -> Result<(), EmailError> {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(EmailError::AddressError(format!("Invalid email format: {}", email))),
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError>;
}

pub struct SmtpEmailService {
    pub config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");

        config.validate().map_err(EmailError::from)?;

        let mut transport_builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        if config.use_tls {
            let tls_parameters = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;

            if config.use_starttls {
                transport_builder = transport_builder.tls(Tls::Required(tls_parameters));
            } else {
                transport_builder = transport_builder.tls(Tls::Wrapper(tls_parameters));
            }
        } else {
            transport_builder = transport_builder.tls(Tls::None);
        }

        if config.has_credentials() {
            let credentials = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );
            transport_builder = transport_builder.credentials(credentials);
        }

        let transport = transport_builder.build();

        info!("SMTP email service initialized successfully");
        Ok(Self { config, transport })
    }

    fn build_message(&self, email_message: EmailMessage) -> Result<Message, EmailError> {
        let from_mailbox: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = email_message.to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        let message_builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email_message.subject);

        match (email_message.text_body, email_message.html_body) {
            (Some(text), Some(html)) => message_builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(text))
                        .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html)),
                )
                .map_err(|e| EmailError::MessageError(format!("Failed to build multipart message: {}", e))),
            (Some(text), None) => message_builder
                .body(text)
                .map_err(|e| EmailError::MessageError(format!("Failed to build text message: {}", e))),
            (None, Some(html)) => message_builder
                .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html))
                .map_err(|e| EmailError::MessageError(format!("Failed to build HTML message: {}", e))),
            (None, None) => Err(EmailError::MessageError("No message body provided".to_string())),
        }
    }
}

#[async_trait]
impl EmailSender for SmtpEmailService {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        validate_email_address(&message.to)?;

        let email_message = self.build_message(message)?;

        self.transport.send(email_message).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(format!("Failed to send email: {}", e))
        })?;

        info!("Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EmailContext {
        EmailContext {
            recipient_name: "Marie".to_string(),
            company_name: "Dupont & Fils".to_string(),
            quote_number: "DEV-2026-0007".to_string(),
            quote_title: "Kitchen <tiles>".to_string(),
            total_amount: "145.20".to_string(),
            valid_until: Some("2026-11-30".to_string()),
            share_url: Some("http://localhost:3000/quote-share/abc?x=1&y=2".to_string()),
            follow_up_stage: None,
        }
    }

    #[test]
    fn test_quote_sent_mentions_link_and_validity() {
        let rendered = render_email(EmailType::QuoteSent, &context());
        assert_eq!(rendered.subject, "Quote DEV-2026-0007 from Dupont & Fils");
        assert!(rendered.text.starts_with("Hello Marie,"));
        assert!(rendered.text.contains("valid until 2026-11-30"));
        assert!(rendered.text.contains("http://localhost:3000/quote-share/abc?x=1&y=2"));
    }

    #[test]
    fn test_html_is_escaped() {
        let rendered = render_email(EmailType::FollowUpReminder, &context());
        assert!(rendered.html.contains("Kitchen &lt;tiles&gt;"));
        assert!(rendered.html.contains("Dupont &amp; Fils"));
        assert!(rendered.html.contains("x=1&amp;y=2"));
        assert!(!rendered.html.contains("<tiles>"));
    }

    #[test]
    fn test_issuer_notifications_have_no_link_when_absent() {
        let mut ctx = context();
        ctx.share_url = None;
        let rendered = render_email(EmailType::QuoteExpired, &ctx);
        assert_eq!(rendered.subject, "Quote DEV-2026-0007 has expired");
        assert!(!rendered.html.contains("View the quote"));
    }

    #[test]
    fn test_build_email_sets_both_bodies() {
        let message = build_email("client@example.com", EmailType::QuoteAccepted, &context());
        assert_eq!(message.to, "client@example.com");
        assert!(message.text_body.is_some());
        assert!(message.html_body.is_some());
    }

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("client@example.com").is_ok());
        assert!(validate_email_address("client.example.com").is_err());
        assert!(validate_email_address("@example.com").is_err());
        assert!(validate_email_address("a@b@example.com").is_err());
    }
}
