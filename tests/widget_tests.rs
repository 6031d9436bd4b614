use async_trait::async_trait;
use chat_widget::config::{DEFAULT_GREETING, WidgetConfig};
use chat_widget::error::ClientError;
use chat_widget::message::{
    CONNECTION_ERROR, ChatRequest, GENERIC_RESPONSE_ERROR, Message, Sender,
};
use chat_widget::services::backend_client::ChatBackend;
use chat_widget::widget::{
    Activation, ActivationSource, ChatWidget, Controls, DispatchControl, DisplaySurface,
    SendOutcome, TextInput,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct RecordingSurface {
    messages: Arc<Mutex<Vec<Message>>>,
    scrolls: Arc<AtomicUsize>,
}

impl RecordingSurface {
    fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

impl DisplaySurface for RecordingSurface {
    fn append(&mut self, message: &Message) {
        self.messages.lock().unwrap().push(message.clone());
    }

    fn scroll_to_latest(&mut self) {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
struct FakeInput(Arc<Mutex<String>>);

impl FakeInput {
    fn type_text(&self, text: &str) {
        *self.0.lock().unwrap() = text.to_string();
    }
}

impl TextInput for FakeInput {
    fn value(&self) -> String {
        self.0.lock().unwrap().clone()
    }

    fn clear(&mut self) {
        self.0.lock().unwrap().clear();
    }
}

#[derive(Clone)]
struct FakeButton(Arc<AtomicBool>);

impl Default for FakeButton {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl DispatchControl for FakeButton {
    fn set_enabled(&mut self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
enum Script {
    Body(Value),
    NotJson,
    Hang,
}

/// What the backend could see of the UI while the request was in flight.
#[derive(Clone, Debug)]
struct Observation {
    request: ChatRequest,
    button_enabled: bool,
    messages: Vec<Message>,
}

struct ScriptedBackend {
    script: Script,
    surface: RecordingSurface,
    button: FakeButton,
    calls: Arc<Mutex<Vec<Observation>>>,
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn post(&self, request: &ChatRequest) -> Result<Value, ClientError> {
        self.calls.lock().unwrap().push(Observation {
            request: request.clone(),
            button_enabled: self.button.is_enabled(),
            messages: self.surface.messages(),
        });
        match &self.script {
            Script::Body(body) => Ok(body.clone()),
            Script::NotJson => Err(serde_json::from_str::<Value>("<html>502</html>")
                .map_err(ClientError::from)
                .unwrap_err()),
            Script::Hang => std::future::pending().await,
        }
    }
}

type TestWidget = ChatWidget<ScriptedBackend, RecordingSurface, FakeInput, FakeButton>;

struct Harness {
    surface: RecordingSurface,
    input: FakeInput,
    button: FakeButton,
    calls: Arc<Mutex<Vec<Observation>>>,
}

impl Harness {
    fn last_message(&self) -> Message {
        self.surface.messages().last().cloned().unwrap()
    }

    fn calls(&self) -> Vec<Observation> {
        self.calls.lock().unwrap().clone()
    }
}

fn widget_with(script: Script) -> (TestWidget, Harness) {
    let surface = RecordingSurface::default();
    let input = FakeInput::default();
    let button = FakeButton::default();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let backend = ScriptedBackend {
        script,
        surface: surface.clone(),
        button: button.clone(),
        calls: calls.clone(),
    };
    let controls = Controls {
        surface: surface.clone(),
        input: input.clone(),
        dispatch: button.clone(),
    };
    let widget = ChatWidget::new(WidgetConfig::default(), backend, controls);

    (widget, Harness { surface, input, button, calls })
}

async fn send(script: Script, text: &str) -> (SendOutcome, Harness) {
    let (mut widget, harness) = widget_with(script);
    harness.input.type_text(text);
    let outcome = widget.send_message().await;
    (outcome, harness)
}

#[test]
fn greeting_is_the_only_message_on_load() {
    let (widget, harness) = widget_with(Script::Body(json!({})));

    let messages = harness.surface.messages();
    assert_eq!(messages, vec![Message::new(DEFAULT_GREETING, Sender::Bot)]);
    assert_eq!(harness.surface.scrolls.load(Ordering::SeqCst), 1);
    assert!(widget.dispatch().is_enabled());
}

#[tokio::test]
async fn blank_input_is_ignored() {
    for text in ["", "   ", "\t\n "] {
        let (outcome, harness) = send(Script::Body(json!({"reply": "Hola"})), text).await;

        assert_eq!(outcome, SendOutcome::Ignored);
        assert_eq!(harness.surface.messages().len(), 1, "input {:?}", text);
        assert!(harness.calls().is_empty());
        assert!(harness.button.is_enabled());
    }
}

#[tokio::test]
async fn user_message_is_rendered_before_the_call() {
    let (outcome, harness) = send(Script::Body(json!({"reply": "Hola"})), "  0957380330 ").await;
    assert_eq!(outcome, SendOutcome::Replied);

    let calls = harness.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.request, ChatRequest::new("demo-session-1", "0957380330"));
    assert!(!call.button_enabled, "dispatch must be disabled while in flight");
    assert_eq!(
        call.messages.last(),
        Some(&Message::new("0957380330", Sender::User))
    );

    assert_eq!(harness.input.value(), "");
    assert_eq!(harness.last_message(), Message::new("Hola", Sender::Bot));
    assert!(harness.button.is_enabled());
}

#[tokio::test]
async fn server_error_is_prefixed() {
    let (outcome, harness) = send(Script::Body(json!({"error": "bad session"})), "hola").await;

    assert_eq!(outcome, SendOutcome::ServerError);
    assert_eq!(harness.last_message(), Message::new("Error: bad session", Sender::Bot));
    assert!(harness.button.is_enabled());
}

#[tokio::test]
async fn empty_object_gets_generic_error() {
    let (outcome, harness) = send(Script::Body(json!({})), "hola").await;

    assert_eq!(outcome, SendOutcome::Malformed);
    assert_eq!(harness.last_message().text(), GENERIC_RESPONSE_ERROR);
    assert_eq!(harness.surface.messages().len(), 3);
    assert!(harness.button.is_enabled());
}

#[tokio::test]
async fn undecodable_body_reads_as_connection_failure() {
    let (outcome, harness) = send(Script::NotJson, "hola").await;

    assert_eq!(outcome, SendOutcome::Unreachable);
    assert_eq!(harness.last_message(), Message::new(CONNECTION_ERROR, Sender::Bot));
    assert!(harness.button.is_enabled());
}

#[tokio::test]
async fn null_body_reads_as_connection_failure() {
    let (outcome, harness) = send(Script::Body(Value::Null), "hola").await;

    assert_eq!(outcome, SendOutcome::Unreachable);
    assert_eq!(harness.last_message().text(), CONNECTION_ERROR);
}

#[tokio::test]
async fn dropped_send_still_restores_dispatch() {
    let (mut widget, harness) = widget_with(Script::Hang);
    harness.input.type_text("hola");

    let result = tokio::time::timeout(Duration::from_millis(20), widget.send_message()).await;

    assert!(result.is_err());
    assert_eq!(harness.calls().len(), 1);
    assert!(harness.button.is_enabled());
}

/// Types text and presses keys in order.
struct ScriptedUser {
    input: FakeInput,
    steps: VecDeque<(&'static str, Activation)>,
}

#[async_trait(?Send)]
impl ActivationSource for ScriptedUser {
    async fn next_activation(&mut self) -> Option<Activation> {
        let (text, activation) = self.steps.pop_front()?;
        self.input.type_text(text);
        Some(activation)
    }
}

#[tokio::test]
async fn click_and_enter_send_other_keys_do_not() {
    let (mut widget, harness) = widget_with(Script::Body(json!({"reply": "ok"})));
    let mut user = ScriptedUser {
        input: harness.input.clone(),
        steps: VecDeque::from([
            ("uno", Activation::Key("a".to_string())),
            ("uno", Activation::enter()),
            ("dos", Activation::Click),
            ("   ", Activation::Click),
        ]),
    };

    let outcomes = widget.run(&mut user).await;

    assert_eq!(
        outcomes,
        vec![SendOutcome::Replied, SendOutcome::Replied, SendOutcome::Ignored]
    );
    let sent: Vec<String> = harness.calls().into_iter().map(|c| c.request.message).collect();
    assert_eq!(sent, vec!["uno", "dos"]);

    let texts: Vec<(Sender, String)> = harness
        .surface
        .messages()
        .iter()
        .map(|m| (m.sender(), m.text().to_string()))
        .collect();
    assert_eq!(
        texts,
        vec![
            (Sender::Bot, DEFAULT_GREETING.to_string()),
            (Sender::User, "uno".to_string()),
            (Sender::Bot, "ok".to_string()),
            (Sender::User, "dos".to_string()),
            (Sender::Bot, "ok".to_string()),
        ]
    );
    assert!(harness.button.is_enabled());
}
