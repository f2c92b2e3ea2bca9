use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{Notifier, RunSummary};

pub const SUBJECT: &str = "VC Sourcing Summary";

const ENV_VARS: [&str; 6] = [
    "SMTP_HOST",
    "SMTP_PORT",
    "SMTP_USERNAME",
    "SMTP_PASSWORD",
    "SMTP_FROM",
    "SMTP_TO",
];

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// `Ok(None)` when any SMTP_* variable is missing; `Err` when present but invalid.
    pub fn from_env() -> Result<Option<Self>> {
        let mut vals = Vec::with_capacity(ENV_VARS.len());
        for key in ENV_VARS {
            match std::env::var(key).ok().filter(|v| !v.trim().is_empty()) {
                Some(v) => vals.push(v),
                None => return Ok(None),
            }
        }
        let [host, port, user, pass, from, to]: [String; 6] = vals
            .try_into()
            .map_err(|_| anyhow::anyhow!("smtp env arity"))?;

        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("invalid SMTP_PORT {port:?}"))?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .with_context(|| format!("invalid SMTP_HOST {host:?}"))?
            .port(port)
            .credentials(Credentials::new(user, pass))
            .build();

        let from = from.parse().context("invalid SMTP_FROM")?;
        let to = to.parse().context("invalid SMTP_TO")?;
        Ok(Some(Self { mailer, from, to }))
    }

    fn build_message(&self, summary: &RunSummary) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(SUBJECT)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body(summary))
            .context("build email")
    }
}

pub fn body(summary: &RunSummary) -> String {
    format!("{}\nTimestamp: {}\n", summary.message(), summary.ts.to_rfc3339())
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, summary: &RunSummary) -> Result<()> {
        let msg = self.build_message(summary)?;
        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
