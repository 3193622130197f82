//! Email service for password reset and notification emails.
//!
//! Supports multiple providers:
//! - `console`: logs emails to the console (development)
//! - `sendgrid`: sends via the SendGrid API
//! - `smtp`: placeholder pending a full SMTP client

use crate::config::EmailConfig;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient name (optional)
    pub to_name: Option<String>,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body (optional)
    pub body_html: Option<String>,
}

/// Email service for transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "smtp" => self.send_smtp(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Send the password reset email with the recovery link.
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        reset_token: &str,
    ) -> Result<(), EmailError> {
        let reset_url = format!(
            "{}/reset-password?token={}",
            self.config.frontend_url, reset_token
        );

        let subject = "Recuperación de Contraseña";
        let greeting = to_name.map(|n| format!(" {}", n)).unwrap_or_default();

        let body_text = format!(
            r#"Hola{greeting},

Has solicitado recuperar tu contraseña.

Para crear una nueva contraseña, abre el siguiente enlace:
{reset_url}

Este enlace es válido por 1 hora y solo puede usarse una vez.

Si no solicitaste este cambio, puedes ignorar este correo.

Saludos,
{sender}"#,
            sender = self.config.sender_name,
        );

        let body_html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Recuperación de contraseña</title>
</head>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #f9f9f9; padding: 30px; border-radius: 10px;">
        <h2 style="margin-top: 0;">Recuperación de contraseña</h2>
        <p>Hola{greeting},</p>
        <p>Has solicitado recuperar tu contraseña. Haz clic en el botón para crear una nueva:</p>
        <div style="text-align: center; margin: 30px 0;">
            <a href="{reset_url}" style="background: #3b82f6; color: white; padding: 14px 28px; text-decoration: none; border-radius: 6px; font-weight: bold; display: inline-block;">Recuperar contraseña</a>
        </div>
        <p style="color: #666; font-size: 14px;">Este enlace es válido por 1 hora y solo puede usarse una vez.</p>
        <p style="color: #666; font-size: 14px;">Si no solicitaste este cambio, puedes ignorar este correo.</p>
        <hr style="border: none; border-top: 1px solid #ddd; margin: 30px 0;">
        <p style="color: #999; font-size: 12px;">O copia y pega este enlace en tu navegador:<br><a href="{reset_url}" style="color: #3b82f6;">{reset_url}</a></p>
    </div>
</body>
</html>"#,
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: to_name.map(|s| s.to_string()),
            subject: subject.to_string(),
            body_text,
            body_html: Some(body_html),
        })
        .await
    }

    /// Send the password-changed notification.
    pub async fn send_password_changed_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<(), EmailError> {
        let subject = "Contraseña Cambiada";
        let greeting = to_name.map(|n| format!(" {}", n)).unwrap_or_default();
        let when = Utc::now().format("%d/%m/%Y %H:%M");
        let ip = ip_address.unwrap_or("desconocida");

        let body_text = format!(
            r#"Hola{greeting},

Tu contraseña ha sido cambiada exitosamente.

Fecha: {when}
IP: {ip}

Si no fuiste tú, contacta inmediatamente con soporte.

Saludos,
{sender}"#,
            sender = self.config.sender_name,
        );

        let body_html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Contraseña cambiada</title>
</head>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #f9f9f9; padding: 30px; border-radius: 10px;">
        <h2 style="margin-top: 0;">Contraseña cambiada</h2>
        <p>Hola{greeting},</p>
        <p>Te confirmamos que tu contraseña ha sido cambiada exitosamente.</p>
        <ul>
            <li>Fecha: {when}</li>
            <li>IP: {ip}</li>
        </ul>
        <p style="color: #b45309; font-size: 14px;">Si no cambiaste tu contraseña, contacta inmediatamente con soporte.</p>
    </div>
</body>
</html>"#,
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: to_name.map(|s| s.to_string()),
            subject: subject.to_string(),
            body_text,
            body_html: Some(body_html),
        })
        .await
    }

    /// Console provider - logs the email (for development).
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            "Email (console provider)"
        );

        info!(body_text = %message.body_text, "Email body (plain text)");

        if let Some(html) = &message.body_html {
            debug!("Email body (HTML) - {} chars", html.len());
        }

        Ok(())
    }

    /// SMTP provider - pending a full SMTP client implementation.
    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.smtp_host.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        warn!(
            provider = "smtp",
            host = %self.config.smtp_host,
            port = %self.config.smtp_port,
            "SMTP provider configured but full implementation requires an SMTP client crate"
        );

        info!(
            to = %message.to,
            subject = %message.subject,
            "Email would be sent via SMTP"
        );

        Ok(())
    }

    /// SendGrid provider - sends via the SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let client = reqwest::Client::new();

        let mut personalizations = serde_json::json!({
            "to": [{
                "email": message.to
            }]
        });
        if let Some(name) = &message.to_name {
            personalizations["to"][0]["name"] = serde_json::json!(name);
        }

        let mut content = vec![serde_json::json!({
            "type": "text/plain",
            "value": message.body_text
        })];
        if let Some(html) = &message.body_html {
            content.push(serde_json::json!({
                "type": "text/html",
                "value": html
            }));
        }

        let body = serde_json::json!({
            "personalizations": [personalizations],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": content
        });

        let response = client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::ProviderError(e.to_string()))?;

        if response.status().is_success() {
            info!(to = %message.to, "Email sent via SendGrid");
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(EmailError::SendFailed(format!(
                "SendGrid returned {}: {}",
                status, text
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_service() -> EmailService {
        EmailService::new(EmailConfig::default())
    }

    #[tokio::test]
    async fn test_disabled_service_skips_send() {
        let service = disabled_service();
        let result = service
            .send(EmailMessage {
                to: "user@example.com".to_string(),
                to_name: None,
                subject: "Test".to_string(),
                body_text: "Body".to_string(),
                body_html: None,
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_reset_email_disabled_still_ok() {
        let service = disabled_service();
        let result = service
            .send_password_reset_email("user@example.com", Some("Ana"), "token123")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let mut config = EmailConfig::default();
        config.enabled = true;
        config.provider = "carrier-pigeon".to_string();

        let service = EmailService::new(config);
        let result = service
            .send(EmailMessage {
                to: "user@example.com".to_string(),
                to_name: None,
                subject: "Test".to_string(),
                body_text: "Body".to_string(),
                body_html: None,
            })
            .await;
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }
}
