//! Chat widget: renders messages and relays input to the chat endpoint.
//!
//! The widget never touches a concrete UI. It is handed a [`DisplaySurface`],
//! a [`TextInput`] and a [`DispatchControl`] through [`Controls`], and is
//! driven either directly ([`ChatWidget::send_message`]) or by an
//! [`ActivationSource`] through [`ChatWidget::run`].
//!
//! At most one request is in flight: `send_message` borrows the widget
//! mutably and keeps the dispatch control disabled until the call settles.

pub mod terminal;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    config::WidgetConfig,
    message::{BotReply, CONNECTION_ERROR, ChatRequest, Message, Sender},
    services::backend_client::ChatBackend,
};

/// Scrollable region where messages accumulate.
pub trait DisplaySurface {
    fn append(&mut self, message: &Message);
    fn scroll_to_latest(&mut self);
}

/// Single-line text entry.
pub trait TextInput {
    fn value(&self) -> String;
    fn clear(&mut self);
}

/// Send button.
pub trait DispatchControl {
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    Click,
    Key(String),
}

impl Activation {
    pub fn enter() -> Self {
        Activation::Key("Enter".to_string())
    }

    pub fn triggers_send(&self) -> bool {
        match self {
            Activation::Click => true,
            Activation::Key(key) => key == "Enter",
        }
    }
}

/// Source of clicks and key presses. `None` means the UI went away.
#[async_trait(?Send)]
pub trait ActivationSource {
    async fn next_activation(&mut self) -> Option<Activation>;
}

pub struct Controls<S, I, D> {
    pub surface: S,
    pub input: I,
    pub dispatch: D,
}

/// Which branch a send went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was blank, nothing happened.
    Ignored,
    Replied,
    ServerError,
    Malformed,
    Unreachable,
}

/// Keeps the dispatch control disabled while alive.
struct DispatchGuard<'a, D: DispatchControl> {
    control: &'a mut D,
}

impl<'a, D: DispatchControl> DispatchGuard<'a, D> {
    fn engage(control: &'a mut D) -> Self {
        control.set_enabled(false);
        Self { control }
    }
}

impl<D: DispatchControl> Drop for DispatchGuard<'_, D> {
    fn drop(&mut self) {
        self.control.set_enabled(true);
    }
}

pub struct ChatWidget<B, S, I, D> {
    config: WidgetConfig,
    backend: B,
    surface: S,
    input: I,
    dispatch: D,
}

impl<B, S, I, D> ChatWidget<B, S, I, D>
where
    B: ChatBackend,
    S: DisplaySurface,
    I: TextInput,
    D: DispatchControl,
{
    /// Builds the widget and renders the greeting.
    pub fn new(config: WidgetConfig, backend: B, controls: Controls<S, I, D>) -> Self {
        let Controls { surface, input, dispatch } = controls;
        let mut widget = Self { config, backend, surface, input, dispatch };

        let greeting = widget.config.greeting.clone();
        widget.render_message(greeting, Sender::Bot);
        info!(
            endpoint = %widget.config.endpoint_url,
            session_id = %widget.config.session_id,
            "chat widget ready"
        );
        widget
    }

    pub fn render_message(&mut self, text: impl Into<String>, sender: Sender) {
        render(&mut self.surface, Message::new(text, sender));
    }

    pub async fn send_message(&mut self) -> SendOutcome {
        let text = self.input.value().trim().to_string();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        render(&mut self.surface, Message::new(text.clone(), Sender::User));
        self.input.clear();
        let _guard = DispatchGuard::engage(&mut self.dispatch);

        let request = ChatRequest::new(self.config.session_id.clone(), text);
        let result = self
            .backend
            .post(&request)
            .await
            .and_then(|body| BotReply::from_json(&body));

        let (reply, outcome) = match result {
            Ok(reply) => {
                let outcome = match &reply {
                    BotReply::Reply(_) => SendOutcome::Replied,
                    BotReply::ServerError(error) => {
                        warn!(%error, "chat endpoint reported an error");
                        SendOutcome::ServerError
                    }
                    BotReply::Malformed => {
                        warn!("chat endpoint answered without reply or error");
                        SendOutcome::Malformed
                    }
                };
                (reply.into_text(), outcome)
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                (CONNECTION_ERROR.to_string(), SendOutcome::Unreachable)
            }
        };

        render(&mut self.surface, Message::new(reply, Sender::Bot));
        debug!(?outcome, "send settled");
        outcome
    }

    /// Sends on a click or an Enter key press; other keys are ignored.
    pub async fn handle(&mut self, activation: Activation) -> Option<SendOutcome> {
        if !activation.triggers_send() {
            return None;
        }
        Some(self.send_message().await)
    }

    /// Handles activations until the source is exhausted.
    pub async fn run<A>(&mut self, source: &mut A) -> Vec<SendOutcome>
    where
        A: ActivationSource + ?Sized,
    {
        let mut outcomes = Vec::new();
        while let Some(activation) = source.next_activation().await {
            if let Some(outcome) = self.handle(activation).await {
                outcomes.push(outcome);
            }
        }
        info!(sends = outcomes.len(), "activation source closed");
        outcomes
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn dispatch(&self) -> &D {
        &self.dispatch
    }
}

fn render<S: DisplaySurface>(surface: &mut S, message: Message) {
    surface.append(&message);
    surface.scroll_to_latest();
}
