use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

use crate::config::email::EmailConfig;
use crate::utils::errors::AppError;

/// Outbound notification service for the password-reset flow.
///
/// Callers treat send failures as non-fatal: the reset endpoints log them
/// and answer the client identically either way.
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Builds the reset link for a token.
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.config.frontend_url, token)
    }

    #[instrument(skip(self, reset_token))]
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        reset_token: &str,
    ) -> Result<(), AppError> {
        let reset_link = self.reset_link(reset_token);

        let html_body = self.password_reset_template(to_name, &reset_link);
        let text_body = format!(
            "Hi {},\n\n\
             We received a request to reset the password for your account.\n\n\
             Open the link below to choose a new password:\n\
             {}\n\n\
             The link expires in 1 hour.\n\n\
             If you didn't request a password reset, you can ignore this email\n\
             and your password will stay unchanged.\n\n\
             {} Team",
            to_name, reset_link, self.config.from_name
        );

        self.send_email(to_email, "Password Reset Request", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self))]
    pub async fn send_password_reset_confirmation_email(
        &self,
        to_email: &str,
        to_name: &str,
    ) -> Result<(), AppError> {
        let html_body = self.password_reset_confirmation_template(to_name);
        let text_body = format!(
            "Hi {},\n\n\
             Your password has been reset successfully.\n\n\
             If you didn't make this change, contact support immediately.\n\n\
             {} Team",
            to_name, self.config.from_name
        );

        self.send_email(
            to_email,
            "Password Reset Successful",
            &text_body,
            &html_body,
        )
        .await
    }

    #[instrument(skip(self, html_body, text_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            // Dev mode: print the mail instead of sending it.
            info!(to = %to_email, subject = %subject, body = %text_body, "SMTP disabled, logging email instead of sending");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal(anyhow::anyhow!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal(anyhow::anyhow!("Invalid to email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal(anyhow::anyhow!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to send email: {}", e)))?;

        Ok(())
    }

    fn password_reset_template(&self, name: &str, reset_link: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Password Reset Request</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" cellpadding="0" cellspacing="0" align="center" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
        <tr>
            <td style="background-color: #1D4ED8; padding: 24px; text-align: center;">
                <h1 style="margin: 0; color: #ffffff; font-size: 24px;">{app_name}</h1>
            </td>
        </tr>
        <tr>
            <td style="padding: 32px;">
                <h2 style="margin: 0 0 16px 0; color: #333333;">Password Reset Request</h2>
                <p style="color: #666666; line-height: 1.5;">Hi <strong>{name}</strong>,</p>
                <p style="color: #666666; line-height: 1.5;">
                    We received a request to reset the password for your account.
                    Click the button below to choose a new password:
                </p>
                <p style="text-align: center; margin: 28px 0;">
                    <a href="{reset_link}" style="display: inline-block; padding: 12px 36px; background-color: #1D4ED8; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: bold;">Reset Password</a>
                </p>
                <p style="color: #666666; font-size: 14px;">Or copy and paste this link into your browser:</p>
                <p style="color: #1D4ED8; font-size: 14px; word-break: break-all;">{reset_link}</p>
                <p style="color: #666666; font-size: 14px;"><strong>This link will expire in 1 hour.</strong></p>
                <p style="color: #666666; font-size: 14px;">
                    If you didn't request a password reset, you can ignore this email
                    and your password will stay unchanged.
                </p>
            </td>
        </tr>
        <tr>
            <td style="background-color: #f8f9fa; padding: 16px; text-align: center;">
                <p style="margin: 0; color: #999999; font-size: 12px;">
                    This is an automated email from {app_name}. Please do not reply.
                </p>
            </td>
        </tr>
    </table>
</body>
</html>"#,
            app_name = self.config.from_name,
            name = name,
            reset_link = reset_link
        )
    }

    fn password_reset_confirmation_template(&self, name: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Password Reset Successful</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" cellpadding="0" cellspacing="0" align="center" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
        <tr>
            <td style="background-color: #10B981; padding: 24px; text-align: center;">
                <h1 style="margin: 0; color: #ffffff; font-size: 24px;">{app_name}</h1>
            </td>
        </tr>
        <tr>
            <td style="padding: 32px;">
                <h2 style="margin: 0 0 16px 0; color: #333333;">Password Reset Successful</h2>
                <p style="color: #666666; line-height: 1.5;">Hi <strong>{name}</strong>,</p>
                <p style="color: #666666; line-height: 1.5;">Your password has been reset successfully.</p>
                <p style="color: #92400E; background-color: #FEF3C7; padding: 12px; border-left: 4px solid #F59E0B; font-size: 14px;">
                    <strong>Security notice:</strong> if you didn't make this change,
                    contact support immediately.
                </p>
            </td>
        </tr>
        <tr>
            <td style="background-color: #f8f9fa; padding: 16px; text-align: center;">
                <p style="margin: 0; color: #999999; font-size: 12px;">
                    This is an automated email from {app_name}. Please do not reply.
                </p>
            </td>
        </tr>
    </table>
</body>
</html>"#,
            app_name = self.config.from_name,
            name = name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@example.com".to_string(),
            from_name: "EdgProject".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }

    #[test]
    fn test_reset_link_embeds_token() {
        let svc = EmailService::new(test_config());
        assert_eq!(
            svc.reset_link("abc123"),
            "http://localhost:5173/reset-password?token=abc123"
        );
    }

    #[tokio::test]
    async fn test_disabled_transport_skips_send() {
        let svc = EmailService::new(test_config());
        // With SMTP disabled nothing is sent, so this never touches the network.
        let result = svc
            .send_password_reset_email("op@example.com", "Mario", "token123")
            .await;
        assert!(result.is_ok());
    }
}
