use std::sync::Arc;

use anyhow::Context;
use axum::async_trait;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info};

use crate::config::SmtpConfig;

#[derive(Debug, Clone)]
pub struct ReviewCreated {
    pub recipe_title: String,
    pub author: String,
    pub rating: i32,
    pub comment: String,
}

/// Side-channel notifications. Best effort: callers must never let a failed
/// notification fail the write that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn review_created(&self, event: ReviewCreated) -> anyhow::Result<()>;
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn from_config(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
            .context("smtp relay")?
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();
        Ok(Self {
            transport,
            from: cfg.from.parse().context("parse SMTP_FROM")?,
            to: cfg.to.parse().context("parse SMTP_TO")?,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn review_created(&self, event: ReviewCreated) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!("New review: {}", event.recipe_title))
            .body(format!(
                "{} rated \"{}\" {}/5\n\n{}",
                event.author, event.recipe_title, event.rating, event.comment
            ))
            .context("build notification mail")?;
        self.transport.send(email).await.context("smtp send")?;
        Ok(())
    }
}

/// Used when no SMTP config is present (and in tests).
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn review_created(&self, event: ReviewCreated) -> anyhow::Result<()> {
        info!(
            recipe = %event.recipe_title,
            author = %event.author,
            rating = event.rating,
            "review created"
        );
        Ok(())
    }
}

/// Fire-and-forget dispatch, called after the primary transaction commits.
pub fn dispatch_review_created(notifier: Arc<dyn Notifier>, event: ReviewCreated) {
    tokio::spawn(async move {
        if let Err(e) = notifier.review_created(event.clone()).await {
            error!(error = %e, recipe = %event.recipe_title, "review notification failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_never_fails() {
        let event = ReviewCreated {
            recipe_title: "Cá hồi".into(),
            author: "anon".into(),
            rating: 5,
            comment: "ngon".into(),
        };
        LogNotifier.review_created(event).await.expect("log notify");
    }
}
