//! Stub gateway and recording doubles shared by the unit tests.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::conversation_observer::ConversationObserver;
use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use crate::state::ChatSnapshot;
use async_trait::async_trait;
use gemchat_domain::{Model, StreamEvent};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// How a scripted stream ends after its fragments.
#[derive(Debug, Clone)]
pub enum Ending {
    Complete,
    Fail(String),
    /// Sender dropped without a terminal event.
    Hangup,
}

/// Scripted behaviour for [`StubGateway`].
#[derive(Debug, Clone)]
pub enum Script {
    FailOnOpen(GatewayError),
    Stream {
        fragments: Vec<String>,
        ending: Ending,
    },
}

impl Script {
    pub fn fragments(fragments: &[&str]) -> Self {
        Self::ending_with(fragments, Ending::Complete)
    }

    pub fn fail_after(fragments: &[&str], message: &str) -> Self {
        Self::ending_with(fragments, Ending::Fail(message.to_string()))
    }

    pub fn ending_with(fragments: &[&str], ending: Ending) -> Self {
        Script::Stream {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ending,
        }
    }
}

pub struct StubGateway {
    model: Model,
    script: Script,
    gate: Option<Arc<Notify>>,
    prompts: Mutex<Vec<String>>,
}

impl StubGateway {
    pub fn new(script: Script) -> Self {
        Self {
            model: Model::default(),
            script,
            gate: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Hold every stream open until `gate` is notified.
    pub fn gated(script: Script, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(script)
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for StubGateway {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::FailOnOpen(err) => Err(err.clone()),
            Script::Stream {
                ending: Ending::Fail(message),
                ..
            } => Err(GatewayError::RequestFailed(message.clone())),
            Script::Stream { fragments, .. } => Ok(fragments.concat()),
        }
    }

    async fn generate_stream(&self, prompt: &str) -> Result<StreamHandle, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let (fragments, ending) = match &self.script {
            Script::FailOnOpen(err) => return Err(err.clone()),
            Script::Stream { fragments, ending } => (fragments.clone(), ending.clone()),
        };

        let (tx, handle) = StreamHandle::channel(fragments.len() + 1);
        let gate = self.gate.clone();
        tokio::spawn(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            for fragment in fragments {
                if tx.send(StreamEvent::Delta(fragment)).await.is_err() {
                    return;
                }
            }
            match ending {
                Ending::Complete => {
                    let _ = tx.send(StreamEvent::Completed).await;
                }
                Ending::Fail(message) => {
                    let _ = tx.send(StreamEvent::Error(message)).await;
                }
                Ending::Hangup => {}
            }
        });
        Ok(handle)
    }
}

/// Observer that keeps every snapshot it is handed.
#[derive(Default)]
pub struct RecordingObserver {
    snapshots: Mutex<Vec<ChatSnapshot>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshots(&self) -> Vec<ChatSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

impl ConversationObserver for RecordingObserver {
    fn on_change(&self, snapshot: &ChatSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}

/// Logger that keeps events in order.
#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl RecordingLogger {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn payload(&self, event_type: &str) -> Option<serde_json::Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| *t == event_type)
            .map(|(_, p)| p.clone())
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}
