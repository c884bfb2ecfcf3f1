use thiserror::Error;

use crate::parser::ParseError;
use crate::tariff::TariffError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Tariff(#[from] TariffError),
}

/// Application-layer failure, as surfaced by the dispatcher to its caller.
/// Directory and delivery failures carry the collaborator's reason; the
/// caller decides whether to retry or drop.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("alias directory failure: {0}")]
    Directory(String),
    #[error("message delivery failure: {0}")]
    Delivery(String),
}

impl ApplicationError {
    /// Message safe to show a chat user, with collaborator detail elided.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "指令格式有誤，請重新輸入",
            Self::Directory(_) | Self::Delivery(_) => "系統忙碌中，請稍後再試",
        }
    }
}
