use ratebot_core::domain::quote::{QuoteRequest, UserId};
use ratebot_core::errors::ApplicationError;
use ratebot_core::format::{format_quote, usage_hint};
use ratebot_core::parser::{parse_quote_request, ParseError};
use ratebot_core::pricing::PricingEngine;
use ratebot_directory::AliasDirectory;

use crate::admin::AdminPolicy;
use crate::messenger::Messenger;

/// Literal keyword opening a bind-alias command.
pub const BIND_KEYWORD: &str = "綁定";

/// One inbound chat message, as handed over by the transport adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    pub reply_token: String,
    pub sender_user_id: String,
    /// Set when the message arrived via a group chat.
    pub group_id: Option<String>,
}

/// What the dispatcher did with a message. Every variant corresponds to
/// exactly one reply, except `QuotePushed` which is one push plus one
/// confirmation reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    QuoteReplied,
    QuotePushed { alias: String },
    AliasBound { alias: String },
    UnknownAlias { alias: String },
    PermissionDenied,
    TokenRejected { token: String },
    UsageHintReplied,
}

pub struct Dispatcher<M, D> {
    engine: PricingEngine,
    messenger: M,
    directory: D,
    admin: AdminPolicy,
}

impl<M, D> Dispatcher<M, D>
where
    M: Messenger,
    D: AliasDirectory,
{
    pub fn new(engine: PricingEngine, messenger: M, directory: D, admin: AdminPolicy) -> Self {
        Self { engine, messenger, directory, admin }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Routes one inbound message to a reply or push. Infrastructure
    /// failures (directory I/O, delivery) bubble up as `ApplicationError`;
    /// everything a user can get wrong ends in an explanatory reply.
    pub async fn handle(
        &self,
        message: &InboundMessage,
    ) -> Result<DispatchOutcome, ApplicationError> {
        let outcome = match parse_quote_request(&message.text) {
            Ok(request) => match &request.target_alias {
                Some(alias) => self.push_quote(message, &request, alias.clone()).await?,
                None => {
                    let quote = self.engine.quote(&request);
                    self.reply(message, &format_quote(&quote)).await?;
                    DispatchOutcome::QuoteReplied
                }
            },
            Err(ParseError::UnrecognizedToken(token)) => {
                self.reply(message, &format!("無法辨識「{token}」\n{}", usage_hint())).await?;
                DispatchOutcome::TokenRejected { token }
            }
            Err(ParseError::NotAQuote) => match parse_bind_command(&message.text) {
                Some((alias, user_id)) => self.bind_alias(message, alias, user_id).await?,
                None => {
                    self.reply(message, usage_hint()).await?;
                    DispatchOutcome::UsageHintReplied
                }
            },
        };

        tracing::info!(
            event_name = "bot.dispatch.handled",
            sender_user_id = %message.sender_user_id,
            outcome = ?outcome,
            "inbound message dispatched"
        );
        Ok(outcome)
    }

    async fn push_quote(
        &self,
        message: &InboundMessage,
        request: &QuoteRequest,
        alias: String,
    ) -> Result<DispatchOutcome, ApplicationError> {
        if !self.admin.permits(&message.sender_user_id, message.group_id.as_deref()) {
            self.reply(message, "此指令僅限管理員使用").await?;
            return Ok(DispatchOutcome::PermissionDenied);
        }

        let target = match self.directory.lookup(&alias).await {
            Ok(target) => target,
            Err(error) => {
                let error = ApplicationError::Directory(error.to_string());
                self.notify_failure(message, &error).await;
                return Err(error);
            }
        };

        let Some(user_id) = target else {
            self.reply(message, &format!("找不到暱稱 @{alias}，請先綁定")).await?;
            return Ok(DispatchOutcome::UnknownAlias { alias });
        };

        let quote = self.engine.quote(request);
        if let Err(error) = self.messenger.push(&user_id, &format_quote(&quote)).await {
            let error = ApplicationError::Delivery(error.to_string());
            self.notify_failure(message, &error).await;
            return Err(error);
        }
        self.reply(message, &format!("已推播報價給 @{alias}")).await?;

        Ok(DispatchOutcome::QuotePushed { alias })
    }

    async fn bind_alias(
        &self,
        message: &InboundMessage,
        alias: String,
        user_id: String,
    ) -> Result<DispatchOutcome, ApplicationError> {
        if !self.admin.permits(&message.sender_user_id, message.group_id.as_deref()) {
            self.reply(message, "此指令僅限管理員使用").await?;
            return Ok(DispatchOutcome::PermissionDenied);
        }

        if let Err(error) = self.directory.bind(&alias, UserId(user_id)).await {
            let error = ApplicationError::Directory(error.to_string());
            self.notify_failure(message, &error).await;
            return Err(error);
        }
        self.reply(message, &format!("已綁定暱稱 @{alias}")).await?;

        Ok(DispatchOutcome::AliasBound { alias })
    }

    async fn reply(&self, message: &InboundMessage, text: &str) -> Result<(), ApplicationError> {
        self.messenger
            .reply(&message.reply_token, text)
            .await
            .map_err(|error| ApplicationError::Delivery(error.to_string()))
    }

    /// Best effort: the sender gets the sanitized message, the caller still
    /// gets the full error. A dropped notice is only logged; the reply
    /// channel may be the failing collaborator itself.
    async fn notify_failure(&self, message: &InboundMessage, error: &ApplicationError) {
        if let Err(reply_error) =
            self.messenger.reply(&message.reply_token, error.user_message()).await
        {
            tracing::warn!(
                event_name = "bot.dispatch.failure_notice_dropped",
                sender_user_id = %message.sender_user_id,
                error = %reply_error,
                "could not deliver failure notice"
            );
        }
    }
}

/// `綁定 <alias> <user-id>`, whitespace separated. A leading `@` on the
/// alias is tolerated since operators copy it from push commands.
fn parse_bind_command(text: &str) -> Option<(String, String)> {
    let mut tokens = text.split_whitespace();
    if tokens.next() != Some(BIND_KEYWORD) {
        return None;
    }

    let alias_token = tokens.next()?;
    let user_id = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }

    let alias = alias_token.strip_prefix('@').unwrap_or(alias_token);
    if alias.is_empty() {
        return None;
    }

    Some((alias.to_owned(), user_id.to_owned()))
}
