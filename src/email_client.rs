use crate::domain::{Subscription, UserEmail};
use reqwest::{Client, Error};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

#[derive(Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: UserEmail,
    authorization_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: UserEmail,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }

    pub async fn send_email(
        &self,
        recipient: &UserEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), Error> {
        let url = format!("{}/email", &self.base_url);
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: recipient.as_ref(),
            subject,
            html_body: html_content,
            text_body: text_content,
        };

        self.http_client
            .post(&url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Tells a subscription's owner that it renews in `days_before` days.
    pub async fn send_renewal_reminder(
        &self,
        recipient: &UserEmail,
        recipient_name: &str,
        subscription: &Subscription,
        days_before: i16,
    ) -> Result<(), Error> {
        let subject = format!(
            "Reminder: your {} subscription renews in {days_before} day(s)",
            subscription.name.as_ref()
        );
        let renewal_date = subscription.renewal_date.date();
        let price = format!(
            "{:.2} {}",
            subscription.price.value(),
            subscription.currency.as_ref()
        );
        let text_content = format!(
            "Hello {recipient_name},\n\n\
            Your {} subscription ({} plan, {price}) renews on {renewal_date} \
            and will be charged to your {}.",
            subscription.name.as_ref(),
            subscription.frequency.as_ref(),
            subscription.payment_method.as_ref(),
        );
        let html_content = format!(
            "<p>Hello {recipient_name},</p>\
            <p>Your <b>{}</b> subscription ({} plan, {price}) renews on \
            <b>{renewal_date}</b> and will be charged to your {}.</p>",
            subscription.name.as_ref(),
            subscription.frequency.as_ref(),
            subscription.payment_method.as_ref(),
        );

        self.send_email(recipient, &subject, &html_content, &text_content)
            .await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}
