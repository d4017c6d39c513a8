use std::sync::Arc;

use formgate::{
    AppContext, ConfigBuilder, Mailer, MailerSettings, ResendMailer, SmtpMailer,
    config::delivery_from_env, router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    formgate::init_tracing();

    let config = ConfigBuilder::new().from_env().build()?;

    let ctx = match delivery_from_env(config.mailer) {
        Ok((contact, settings)) => {
            let mailer: Arc<dyn Mailer> = match settings {
                MailerSettings::Smtp(smtp) => Arc::new(SmtpMailer::new(smtp, contact.clone())?),
                MailerSettings::Resend(resend) => {
                    Arc::new(ResendMailer::new(resend, contact.clone()))
                }
            };
            tracing::info!(strategy = ?config.mailer, to = %contact.to, "delivery configured");
            AppContext::builder()
                .with_contact(contact)
                .with_mailer(mailer)
                .build()
        }
        Err(missing) => {
            // Keep serving: every request gets a configuration error
            // naming the absent keys, same as the rest of the API surface.
            tracing::warn!(%missing, "delivery settings incomplete");
            AppContext::builder().with_config_error(missing).build()
        }
    };

    let addr = config.server.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "formgate listening");

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
    }
}
