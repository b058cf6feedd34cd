//! Session controller and manager.
//!
//! The controller is a single task owning all mutable capture state: the
//! registered frames, the live session, the text aggregator, the navigation
//! detector and every debounce timer. Commands and raw events arrive over
//! channels and are processed strictly in arrival order, so no capture
//! state is ever shared across threads.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio_util::time::DelayQueue;
use tracing::{debug, info, trace, warn};

use rewind_config::RewindConfig;
use rewind_protocols::{
    ActionType, CaptureError, EventSink, FrameId, RawEvent, RawEventKind, RecordingSession,
    SemanticAction,
};

use crate::agent::CaptureAgent;
use crate::aggregator::{BufferKey, TextInputAggregator};
use crate::classifier::ActionClassifier;
use crate::descriptor::DescriptorBuilder;
use crate::frame::ContentFrame;
use crate::navigation::NavigationDetector;

enum Command {
    Start {
        session_id: String,
        reply: oneshot::Sender<Result<(), CaptureError>>,
    },
    Stop {
        reply: oneshot::Sender<Result<RecordingSession, CaptureError>>,
    },
    RegisterFrame {
        frame: Arc<dyn ContentFrame>,
        reply: oneshot::Sender<Result<(), CaptureError>>,
    },
    UnregisterFrame {
        frame: FrameId,
        reply: oneshot::Sender<Result<(), CaptureError>>,
    },
    IsRecording {
        reply: oneshot::Sender<bool>,
    },
}

/// Timer payloads. Every deadline carries the generation it was armed for;
/// a bumped generation makes the expired timer a no-op.
#[derive(Debug)]
enum Deadline {
    TextFlush { key: BufferKey, generation: u64 },
    MutationFlush { frame: FrameId, generation: u64 },
    ResultProbe { frame: FrameId },
}

/// Cloneable handle to the controller task.
#[derive(Clone)]
pub struct SessionManager {
    tx: mpsc::Sender<Command>,
}

impl SessionManager {
    pub async fn start_recording(
        &self,
        session_id: impl Into<String>,
    ) -> Result<(), CaptureError> {
        self.request(|reply| Command::Start {
            session_id: session_id.into(),
            reply,
        })
        .await?
    }

    /// Stop the live recording: every pending text buffer is flushed, the
    /// session is closed, and all agents are torn down.
    pub async fn stop_recording(&self) -> Result<RecordingSession, CaptureError> {
        self.request(|reply| Command::Stop { reply }).await?
    }

    pub async fn register_frame(
        &self,
        frame: Arc<dyn ContentFrame>,
    ) -> Result<(), CaptureError> {
        self.request(|reply| Command::RegisterFrame { frame, reply })
            .await?
    }

    pub async fn unregister_frame(&self, frame: &FrameId) -> Result<(), CaptureError> {
        self.request(|reply| Command::UnregisterFrame {
            frame: frame.clone(),
            reply,
        })
        .await?
    }

    pub async fn is_recording(&self) -> Result<bool, CaptureError> {
        self.request(|reply| Command::IsRecording { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, CaptureError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| CaptureError::ChannelClosed)?;
        rx.await.map_err(|_| CaptureError::ChannelClosed)
    }
}

struct FrameEntry {
    frame: Arc<dyn ContentFrame>,
    agent: Arc<CaptureAgent>,
}

pub struct SessionController {
    commands: mpsc::Receiver<Command>,
    events: mpsc::Receiver<RawEvent>,
    sink: EventSink,
    config: RewindConfig,
    frames: HashMap<FrameId, FrameEntry>,
    session: Option<RecordingSession>,
    aggregator: TextInputAggregator,
    classifier: ActionClassifier,
    detector: NavigationDetector,
    builder: DescriptorBuilder,
    timers: DelayQueue<Deadline>,
}

impl SessionController {
    /// Build the controller and its manager handle. The controller must be
    /// driven by awaiting [`SessionController::run`] on a task.
    pub fn new(config: RewindConfig) -> (SessionManager, SessionController) {
        let (tx, commands) = mpsc::channel(32);
        let (sink, events) = EventSink::channel(config.capture.channel_capacity);
        let builder = DescriptorBuilder::new(config.selectors.clone());
        let classifier = ActionClassifier::new(
            DescriptorBuilder::new(config.selectors.clone()),
            &config.privacy,
        );
        let detector = NavigationDetector::new(&config.capture, config.mutation.clone());
        let aggregator = TextInputAggregator::new(config.capture.max_buffer_len);
        let controller = SessionController {
            commands,
            events,
            sink,
            config,
            frames: HashMap::new(),
            session: None,
            aggregator,
            classifier,
            detector,
            builder,
            timers: DelayQueue::new(),
        };
        (SessionManager { tx }, controller)
    }

    /// Drive the controller until every manager handle is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                Some(event) = self.events.recv() => self.handle_event(event),
                Some(expired) = self.timers.next(), if !self.timers.is_empty() => {
                    self.handle_deadline(expired.into_inner()).await;
                }
            }
        }
        debug!("session controller shutting down");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { session_id, reply } => {
                let _ = reply.send(self.start(session_id).await);
            }
            Command::Stop { reply } => {
                let _ = reply.send(self.stop().await);
            }
            Command::RegisterFrame { frame, reply } => {
                let _ = reply.send(self.register(frame).await);
            }
            Command::UnregisterFrame { frame, reply } => {
                let _ = reply.send(self.unregister(&frame).await);
            }
            Command::IsRecording { reply } => {
                let _ = reply.send(self.session.is_some());
            }
        }
    }

    async fn start(&mut self, session_id: String) -> Result<(), CaptureError> {
        if self.session.is_some() {
            return Err(CaptureError::Instrumentation(
                "a recording is already active".to_string(),
            ));
        }
        let starting_url = match self.frames.values().next() {
            Some(entry) => entry.frame.page_context().await.url,
            None => String::new(),
        };
        for entry in self.frames.values() {
            if let Err(e) = entry.agent.install().await {
                // A frame that refuses hooks is skipped, not fatal.
                warn!(frame = %entry.agent.frame_id(), error = %e, "hook install failed");
            }
        }
        info!(session = %session_id, url = %starting_url, "recording started");
        self.session = Some(RecordingSession::new(session_id, starting_url));
        Ok(())
    }

    async fn stop(&mut self) -> Result<RecordingSession, CaptureError> {
        let Some(mut session) = self.session.take() else {
            return Err(CaptureError::Instrumentation(
                "no active recording".to_string(),
            ));
        };
        // Pending text buffers flush exactly once, before close.
        for action in self.aggregator.flush_all(&self.builder) {
            if let Err(e) = session.append(action) {
                warn!(error = %e, "dropped trailing text entry at stop");
            }
        }
        session.close();
        self.timers.clear();
        for entry in self.frames.values() {
            if let Err(e) = entry.agent.teardown().await {
                warn!(frame = %entry.agent.frame_id(), error = %e, "teardown failed");
            }
        }
        info!(
            session = %session.id,
            actions = session.action_count(),
            duration_ms = session.duration_ms,
            "recording stopped"
        );
        Ok(session)
    }

    async fn register(&mut self, frame: Arc<dyn ContentFrame>) -> Result<(), CaptureError> {
        let id = frame.id();
        let agent = Arc::new(CaptureAgent::new(frame.clone(), self.sink.clone()));
        if self.session.is_some() {
            agent.install().await?;
        }
        debug!(frame = %id, "frame registered");
        self.frames.insert(id, FrameEntry { frame, agent });
        Ok(())
    }

    async fn unregister(&mut self, id: &FrameId) -> Result<(), CaptureError> {
        let Some(entry) = self.frames.remove(id) else {
            return Err(CaptureError::FrameNotRegistered(id.to_string()));
        };
        // The frame's pending text flushes now or never.
        let flushed = self.aggregator.flush_frame(id, &self.builder);
        for action in flushed {
            self.append(action);
        }
        self.detector.forget_frame(id);
        entry.agent.teardown().await?;
        debug!(frame = %id, "frame unregistered");
        Ok(())
    }

    fn handle_event(&mut self, event: RawEvent) {
        if self.session.is_none() {
            trace!(kind = ?event.kind, "event dropped while idle");
            return;
        }
        if !self.frames.contains_key(&event.frame) {
            debug!(frame = %event.frame, "event from unregistered frame dropped");
            return;
        }

        match &event.kind {
            RawEventKind::Input | RawEventKind::KeyUp { .. } => self.on_text_event(event),
            RawEventKind::KeyDown { key } if key == "Enter" => {
                // Enter commits the buffer first, then records the key.
                let key = key.clone();
                if let Some(snapshot) = event.snapshot.as_ref().filter(|s| is_editable(s)) {
                    let buffer_key = BufferKey::from_snapshot(&event.frame, snapshot);
                    if let Some(action) = self.aggregator.flush_now(&buffer_key, &self.builder) {
                        self.append(action);
                    }
                }
                self.append(
                    SemanticAction::new(
                        ActionType::KeyPress,
                        event.timestamp_ms,
                        page_context(&event),
                    )
                    .with_value(key),
                );
            }
            RawEventKind::HistoryPushState | RawEventKind::HistoryReplaceState => {
                if let Some(action) = self.detector.on_history(&event) {
                    self.append(action);
                    self.arm_probes(event.frame.clone());
                }
            }
            RawEventKind::PageLoad => {
                let action = self.detector.on_page_load(&event);
                self.append(action);
                self.arm_probes(event.frame.clone());
            }
            RawEventKind::MutationBatch { .. } => {
                // Mutation traffic drives the periodic URL comparison, which
                // catches route changes the history hooks never reported.
                if let Some(action) = self.detector.observe_url(&event) {
                    self.append(action);
                    self.arm_probes(event.frame.clone());
                }
                if let Some(generation) = self.detector.on_mutation(&event) {
                    self.timers.insert(
                        Deadline::MutationFlush {
                            frame: event.frame.clone(),
                            generation,
                        },
                        Duration::from_millis(self.config.capture.mutation_window_ms),
                    );
                }
            }
            RawEventKind::FetchCompleted { status } => {
                trace!(frame = %event.frame, status, "fetch completed");
            }
            _ => match self.classifier.classify(&event) {
                Ok(Some(action)) => self.append(action),
                Ok(None) => {}
                Err(e) => {
                    // A malformed event drops that event only.
                    warn!(kind = ?event.kind, error = %e, "unclassifiable event dropped");
                }
            },
        }
    }

    fn on_text_event(&mut self, event: RawEvent) {
        let Some(snapshot) = event.snapshot.as_ref().filter(|s| is_editable(s)) else {
            trace!(frame = %event.frame, "text event without editable target dropped");
            return;
        };
        let key = BufferKey::from_snapshot(&event.frame, snapshot);
        let generation = self.aggregator.on_input(key.clone(), &event);
        self.timers.insert(
            Deadline::TextFlush { key, generation },
            Duration::from_millis(self.config.capture.text_debounce_ms),
        );
    }

    async fn handle_deadline(&mut self, deadline: Deadline) {
        if self.session.is_none() {
            return;
        }
        match deadline {
            Deadline::TextFlush { key, generation } => {
                if let Some(action) = self.aggregator.flush_due(&key, generation, &self.builder) {
                    self.append(action);
                }
            }
            Deadline::MutationFlush { frame, generation } => {
                if let Some(action) = self.detector.flush_window(&frame, generation) {
                    self.append(action);
                }
            }
            Deadline::ResultProbe { frame } => self.probe(&frame).await,
        }
    }

    /// Scheduled result-surface probe: ask the frame for its repeated-item
    /// count and let the detector decide whether it is a result page.
    async fn probe(&mut self, id: &FrameId) {
        if !self.detector.should_probe(id) {
            return;
        }
        let Some(entry) = self.frames.get(id) else {
            return;
        };
        let Some(count) = entry.frame.result_surface_count().await else {
            return;
        };
        let context = entry.frame.page_context().await;
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        if let Some(action) = self.detector.record_results(id, count, now_ms, context) {
            self.append(action);
        }
    }

    fn arm_probes(&mut self, frame: FrameId) {
        for delay in self.detector.probe_delays().to_vec() {
            self.timers.insert(
                Deadline::ResultProbe {
                    frame: frame.clone(),
                },
                Duration::from_millis(delay),
            );
        }
    }

    /// Append to the live session, enforcing size and duration limits.
    fn append(&mut self, action: SemanticAction) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let limits = &self.config.session;
        if session.action_count() >= limits.max_actions {
            warn!(session = %session.id, "max action count reached, action dropped");
            return;
        }
        let elapsed = (Utc::now() - session.created_at).num_seconds().max(0) as u64;
        if elapsed > limits.max_duration_secs {
            warn!(session = %session.id, "max duration exceeded, action dropped");
            return;
        }
        if let Err(e) = session.append(action) {
            warn!(session = %session.id, error = %e, "append failed");
        }
    }
}

fn is_editable(snapshot: &rewind_protocols::ElementSnapshot) -> bool {
    matches!(snapshot.tag.as_str(), "input" | "textarea")
        || snapshot.attr("contenteditable") == Some("true")
}

fn page_context(event: &RawEvent) -> rewind_protocols::PageContext {
    rewind_protocols::PageContext {
        url: event.url.clone(),
        title: event.title.clone(),
        viewport: event.viewport,
        landmarks: vec![],
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
