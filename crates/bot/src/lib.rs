//! Bot dispatch - inbound text to reply or push
//!
//! Glues the core (parser, pricing engine, formatter) to two external
//! collaborators:
//! - a [`Messenger`](messenger::Messenger) that can reply to the inbound
//!   message or push to an arbitrary user, and
//! - an `AliasDirectory` resolving operator-chosen nicknames to platform
//!   user identifiers.
//!
//! Privileged flows (push a quote to an alias, bind an alias) are gated by
//! the [`AdminPolicy`](admin::AdminPolicy) allow-list. The transport that
//! feeds [`InboundMessage`](dispatch::InboundMessage)s in (webhook, socket,
//! CLI) lives outside this crate.

pub mod admin;
pub mod dispatch;
pub mod messenger;

pub use admin::AdminPolicy;
pub use dispatch::{DispatchOutcome, Dispatcher, InboundMessage};
pub use messenger::{Delivery, Messenger, MessengerError, NoopMessenger, RecordingMessenger};
