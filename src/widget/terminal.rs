// src/widget/terminal.rs
use std::{cell::RefCell, io::Write, rc::Rc};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::{debug, warn};

use super::{Activation, ActivationSource, DispatchControl, DisplaySurface, TextInput};
use crate::message::{Message, Sender};

/// Prints every message as `<label>: <text>` and keeps a copy of the log.
pub struct TerminalSurface<W: Write> {
    out: W,
    history: Vec<Message>,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out, history: Vec::new() }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "tú",
        Sender::Bot => "bot",
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn append(&mut self, message: &Message) {
        if let Err(e) = writeln!(self.out, "{}: {}", label(message.sender()), message.text()) {
            warn!(error = %e, "failed to write message to terminal");
        }
        self.history.push(message.clone());
    }

    fn scroll_to_latest(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!(error = %e, "failed to flush terminal");
        }
    }
}

/// Input shared between the widget and the line reader feeding it.
#[derive(Clone, Debug, Default)]
pub struct LineBuffer(Rc<RefCell<String>>);

impl LineBuffer {
    pub fn set(&self, text: impl Into<String>) {
        *self.0.borrow_mut() = text.into();
    }
}

impl TextInput for LineBuffer {
    fn value(&self) -> String {
        self.0.borrow().clone()
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clear();
    }
}

#[derive(Debug)]
pub struct TerminalDispatch {
    enabled: bool,
}

impl Default for TerminalDispatch {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl DispatchControl for TerminalDispatch {
    fn set_enabled(&mut self, enabled: bool) {
        debug!(enabled, "dispatch toggled");
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Turns each input line into an Enter press on the shared [`LineBuffer`].
pub struct LineActivations<R> {
    lines: Lines<BufReader<R>>,
    buffer: LineBuffer,
}

impl<R: AsyncRead + Unpin> LineActivations<R> {
    pub fn new(reader: R, buffer: LineBuffer) -> Self {
        Self { lines: BufReader::new(reader).lines(), buffer }
    }
}

#[async_trait(?Send)]
impl<R: AsyncRead + Unpin> ActivationSource for LineActivations<R> {
    async fn next_activation(&mut self) -> Option<Activation> {
        match self.lines.next_line().await {
            Ok(Some(line)) => {
                self.buffer.set(line);
                Some(Activation::enter())
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read input");
                None
            }
        }
    }
}
