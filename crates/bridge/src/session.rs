//! Call session lifecycle and relay orchestration.
//!
//! One session per telephony connection. The session waits for the
//! start signal, fetches its negotiation context, connects the realtime
//! engine, then runs both relay directions until either side ends. The
//! surviving direction gets a bounded drain window, after which the
//! outcome is extracted and reported exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use haggle_core::{AudioFormat, CallReport, NegotiationContext, TranscriptEntry};
use haggle_outcome::OutcomeExtractor;
use haggle_persistence::{CallReportSink, ContextStore};
use haggle_transport::{
    AiToTelephony, RealtimeClientEvent, RealtimeConnector, RealtimeServerEvent, RealtimeSink,
    RealtimeStream, SessionConfig, TelephonyMessage, TelephonySink, TelephonyStream,
    TelephonyToAi, TransportError,
};

use crate::instructions::build_instructions;
use crate::registry::CallRegistry;
use crate::transcript::TranscriptLog;
use crate::BridgeError;

/// Lifecycle of a call session. `Closed` is the only terminal state;
/// failed setup passes through `Error` while the failure report is
/// written, then settles in `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    AwaitingStart,
    Streaming,
    Closing,
    Closed,
    Error,
}

/// Stream identity and context, written once when the start signal
/// arrives and immutable afterwards.
#[derive(Debug, Clone)]
pub struct StreamBinding {
    pub stream_sid: String,
    pub context: NegotiationContext,
}

/// Per-call tunables, derived from configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub voice: String,
    pub transcription_model: Option<String>,
    pub greet_on_connect: bool,
    pub barge_in_clear: bool,
    pub drain_timeout_ms: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            voice: "Rex".to_owned(),
            transcription_model: Some("whisper-1".to_owned()),
            greet_on_connect: true,
            barge_in_clear: true,
            drain_timeout_ms: 2_000,
        }
    }
}

/// Everything a session needs beyond its two telephony socket halves.
#[derive(Clone)]
pub struct SessionDeps {
    pub store: Arc<dyn ContextStore>,
    pub sink: Arc<dyn CallReportSink>,
    pub extractor: Arc<OutcomeExtractor>,
    pub connector: Arc<dyn RealtimeConnector>,
    pub options: SessionOptions,
}

pub struct CallSession {
    id: String,
    state: RwLock<CallState>,
    binding: OnceLock<StreamBinding>,
    transcript: Mutex<TranscriptLog>,
    reported: AtomicBool,
}

impl CallSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            state: RwLock::new(CallState::AwaitingStart),
            binding: OnceLock::new(),
            transcript: Mutex::new(TranscriptLog::new()),
            reported: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> CallState {
        *self.state.read()
    }

    pub(crate) fn set_state(&self, next: CallState) {
        let mut state = self.state.write();
        if *state != next {
            debug!(session_id = %self.id, from = ?*state, to = ?next, "call state transition");
            *state = next;
        }
    }

    /// Bind the stream identity. Fails on a second start signal.
    pub fn bind(&self, binding: StreamBinding) -> Result<(), BridgeError> {
        self.binding
            .set(binding)
            .map_err(|_| BridgeError::AlreadyBound)
    }

    pub fn binding(&self) -> Option<&StreamBinding> {
        self.binding.get()
    }

    /// Audio frames are only relayed while the call is streaming.
    pub fn accepts_media(&self) -> bool {
        self.state() == CallState::Streaming
    }

    pub fn record_event(&self, event: &RealtimeServerEvent) {
        self.transcript.lock().observe(event);
    }

    pub fn transcript_snapshot(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().snapshot()
    }

    pub fn render_transcript(&self) -> String {
        self.transcript.lock().render()
    }

    /// Claim the single report slot. True for exactly one caller.
    fn begin_report(&self) -> bool {
        !self.reported.swap(true, Ordering::SeqCst)
    }
}

/// Drive one call from socket accept to terminal state.
pub async fn run_call<R, W>(
    session: Arc<CallSession>,
    registry: Arc<CallRegistry>,
    deps: SessionDeps,
    mut telephony_rx: R,
    telephony_tx: W,
) where
    R: TelephonyStream,
    W: TelephonySink,
{
    let binding = match await_start(&session, &deps, &mut telephony_rx).await {
        Ok(binding) => binding,
        Err(e) => {
            warn!(session_id = %session.id(), error = %e, "call ended before streaming");
            fail_session(&session, &deps).await;
            return;
        }
    };
    if let Err(e) = session.bind(binding.clone()) {
        error!(session_id = %session.id(), error = %e, "could not bind stream");
        fail_session(&session, &deps).await;
        return;
    }

    let (mut ai_tx, ai_rx) = match deps.connector.connect().await {
        Ok(pair) => pair,
        Err(e) => {
            error!(session_id = %session.id(), error = %e, "realtime connect failed");
            fail_session(&session, &deps).await;
            return;
        }
    };

    let config = SessionConfig::new(
        deps.options.voice.clone(),
        build_instructions(&binding.context),
        AudioFormat::REALTIME.sample_rate,
        deps.options.transcription_model.clone(),
    );
    if let Err(e) = ai_tx
        .send(RealtimeClientEvent::SessionUpdate { session: config })
        .await
    {
        error!(session_id = %session.id(), error = %e, "session handshake failed");
        fail_session(&session, &deps).await;
        return;
    }
    if deps.options.greet_on_connect {
        if let Err(e) = ai_tx.send(RealtimeClientEvent::ResponseCreate).await {
            error!(session_id = %session.id(), error = %e, "greeting request failed");
            fail_session(&session, &deps).await;
            return;
        }
    }

    session.set_state(CallState::Streaming);
    registry.insert(binding.stream_sid.clone(), session.clone());
    info!(
        session_id = %session.id(),
        stream_sid = %binding.stream_sid,
        counterparty = %binding.context.counterparty,
        "call streaming"
    );

    let uplink = relay_telephony_to_ai(session.clone(), telephony_rx, ai_tx);
    let downlink = relay_ai_to_telephony(
        session.clone(),
        ai_rx,
        telephony_tx,
        binding.stream_sid.clone(),
        deps.options.barge_in_clear,
    );
    tokio::pin!(uplink);
    tokio::pin!(downlink);

    let drain = Duration::from_millis(deps.options.drain_timeout_ms);
    tokio::select! {
        _ = &mut uplink => {
            session.set_state(CallState::Closing);
            if timeout(drain, &mut downlink).await.is_err() {
                debug!(session_id = %session.id(), "downlink drain timed out");
            }
        }
        _ = &mut downlink => {
            session.set_state(CallState::Closing);
            if timeout(drain, &mut uplink).await.is_err() {
                debug!(session_id = %session.id(), "uplink drain timed out");
            }
        }
    }

    finalize(&session, &deps).await;
    let _ = registry.remove(&binding.stream_sid);
}

/// Consume frames until the start signal arrives and its context is
/// fetched. Media frames seen here are dropped, never buffered.
async fn await_start<R: TelephonyStream>(
    session: &CallSession,
    deps: &SessionDeps,
    rx: &mut R,
) -> Result<StreamBinding, BridgeError> {
    loop {
        let Some(next) = rx.recv().await else {
            return Err(BridgeError::NoStart);
        };
        match next {
            Err(TransportError::Frame(e)) => {
                warn!(session_id = %session.id(), error = %e, "dropping malformed telephony frame");
            }
            Err(e) => return Err(e.into()),
            Ok(TelephonyMessage::Connected { .. }) => {
                debug!(session_id = %session.id(), "telephony handshake received");
            }
            Ok(TelephonyMessage::Media { .. }) => {
                warn!(session_id = %session.id(), "media frame before start, dropping");
            }
            Ok(TelephonyMessage::Start { start, .. }) => {
                let key = start.context_key().ok_or_else(|| {
                    BridgeError::Context("start frame carried no provider_id".to_owned())
                })?;
                let context = deps
                    .store
                    .fetch(key)
                    .await
                    .map_err(|e| BridgeError::Context(e.to_string()))?
                    .ok_or_else(|| {
                        BridgeError::Context(format!("no context under key {key:?}"))
                    })?;
                info!(session_id = %session.id(), stream_sid = %start.stream_sid, key, "stream bound");
                return Ok(StreamBinding {
                    stream_sid: start.stream_sid,
                    context,
                });
            }
            Ok(TelephonyMessage::Stop { .. }) => return Err(BridgeError::NoStart),
            Ok(_) => {}
        }
    }
}

/// Telephony media toward the AI engine. Frame-level failures drop the
/// frame; a failed engine write ends the direction.
async fn relay_telephony_to_ai<R: TelephonyStream>(
    session: Arc<CallSession>,
    mut rx: R,
    mut ai_tx: Box<dyn RealtimeSink>,
) {
    let mut transcoder = TelephonyToAi::new();
    while let Some(next) = rx.recv().await {
        match next {
            Err(TransportError::Frame(e)) => {
                warn!(session_id = %session.id(), error = %e, "dropping malformed telephony frame");
            }
            Err(e) => {
                warn!(session_id = %session.id(), error = %e, "telephony read error");
                break;
            }
            Ok(TelephonyMessage::Media { media, .. }) => {
                if !session.accepts_media() {
                    debug!(session_id = %session.id(), "dropping media frame outside streaming");
                    continue;
                }
                match transcoder.transcode_payload(&media.payload) {
                    Ok(audio) => {
                        if let Err(e) = ai_tx
                            .send(RealtimeClientEvent::InputAudioAppend { audio })
                            .await
                        {
                            warn!(session_id = %session.id(), error = %e, "realtime write failed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(session_id = %session.id(), error = %e, "dropping undecodable media frame");
                    }
                }
            }
            Ok(TelephonyMessage::Stop { .. }) => {
                info!(session_id = %session.id(), "stop frame received");
                break;
            }
            Ok(_) => {}
        }
    }
}

/// AI events toward the telephony leg: audio out, barge-in clears, and
/// every transcript-bearing event folded into the log.
async fn relay_ai_to_telephony<W: TelephonySink>(
    session: Arc<CallSession>,
    mut ai_rx: Box<dyn RealtimeStream>,
    mut tx: W,
    stream_sid: String,
    barge_in_clear: bool,
) {
    let mut transcoder = AiToTelephony::new();
    while let Some(next) = ai_rx.recv().await {
        match next {
            Err(e) => {
                warn!(session_id = %session.id(), error = %e, "realtime read error");
                break;
            }
            Ok(RealtimeServerEvent::OutputAudioDelta { delta }) => {
                if !session.accepts_media() {
                    continue;
                }
                match transcoder.transcode_payload(&delta) {
                    Ok(payload) => {
                        if let Err(e) =
                            tx.send(TelephonyMessage::media(&stream_sid, payload)).await
                        {
                            warn!(session_id = %session.id(), error = %e, "telephony write failed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(session_id = %session.id(), error = %e, "dropping undecodable audio delta");
                    }
                }
            }
            Ok(RealtimeServerEvent::SpeechStarted) => {
                debug!(session_id = %session.id(), "barge-in detected");
                if barge_in_clear {
                    // Best effort: a failed clear should not end the call.
                    if let Err(e) = tx.send(TelephonyMessage::clear(&stream_sid)).await {
                        debug!(session_id = %session.id(), error = %e, "clear frame failed");
                    }
                }
            }
            Ok(RealtimeServerEvent::Error { error }) => {
                warn!(session_id = %session.id(), payload = %error, "realtime engine reported an error");
            }
            Ok(event) => session.record_event(&event),
        }
    }
}

/// Extract the outcome and write the one report this call gets.
async fn finalize(session: &Arc<CallSession>, deps: &SessionDeps) {
    if !session.begin_report() {
        return;
    }
    let entries = session.transcript_snapshot();
    let rendered = session.render_transcript();
    let outcome = deps.extractor.extract(&entries).await;
    info!(
        session_id = %session.id(),
        status = ?outcome.status,
        price = ?outcome.agreed_price,
        turns = entries.len(),
        "call finished"
    );
    let report = CallReport::from_outcome(session.id(), outcome, rendered);
    if let Err(e) = deps.sink.report(report).await {
        error!(session_id = %session.id(), error = %e, "failed to persist call report");
    }
    session.set_state(CallState::Closed);
}

/// Terminal path for calls that never streamed. Passes through `Error`,
/// reports the failure once, then settles in `Closed` like every other call.
async fn fail_session(session: &Arc<CallSession>, deps: &SessionDeps) {
    session.set_state(CallState::Error);
    if !session.begin_report() {
        return;
    }
    if let Err(e) = deps.sink.report(CallReport::setup_failure(session.id())).await {
        error!(session_id = %session.id(), error = %e, "failed to persist failure report");
    }
    session.set_state(CallState::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use parking_lot::Mutex as SyncMutex;
    use tokio::sync::mpsc;

    use haggle_core::CallStatus;
    use haggle_persistence::{MemorySink, MemoryStore};
    use haggle_transport::{MediaFrame, StartFrame, TransportError};

    struct ScriptedTelephony {
        rx: mpsc::UnboundedReceiver<Result<TelephonyMessage, TransportError>>,
    }

    #[async_trait]
    impl TelephonyStream for ScriptedTelephony {
        async fn recv(&mut self) -> Option<Result<TelephonyMessage, TransportError>> {
            self.rx.recv().await
        }
    }

    struct CollectingTelephonySink {
        sent: Arc<SyncMutex<Vec<TelephonyMessage>>>,
    }

    #[async_trait]
    impl TelephonySink for CollectingTelephonySink {
        async fn send(&mut self, msg: TelephonyMessage) -> Result<(), TransportError> {
            self.sent.lock().push(msg);
            Ok(())
        }
    }

    struct CollectingRealtimeSink {
        sent: Arc<SyncMutex<Vec<RealtimeClientEvent>>>,
    }

    #[async_trait]
    impl RealtimeSink for CollectingRealtimeSink {
        async fn send(&mut self, event: RealtimeClientEvent) -> Result<(), TransportError> {
            self.sent.lock().push(event);
            Ok(())
        }
    }

    struct ScriptedRealtime {
        rx: mpsc::UnboundedReceiver<RealtimeServerEvent>,
    }

    #[async_trait]
    impl RealtimeStream for ScriptedRealtime {
        async fn recv(&mut self) -> Option<Result<RealtimeServerEvent, TransportError>> {
            self.rx.recv().await.map(Ok)
        }
    }

    struct TestConnector {
        sent: Arc<SyncMutex<Vec<RealtimeClientEvent>>>,
        server_rx: SyncMutex<Option<mpsc::UnboundedReceiver<RealtimeServerEvent>>>,
    }

    #[async_trait]
    impl RealtimeConnector for TestConnector {
        async fn connect(
            &self,
        ) -> Result<(Box<dyn RealtimeSink>, Box<dyn RealtimeStream>), TransportError> {
            let rx = self
                .server_rx
                .lock()
                .take()
                .ok_or_else(|| TransportError::Connect("already connected".into()))?;
            Ok((
                Box::new(CollectingRealtimeSink {
                    sent: self.sent.clone(),
                }),
                Box::new(ScriptedRealtime { rx }),
            ))
        }
    }

    struct Harness {
        deps: SessionDeps,
        sink: Arc<MemorySink>,
        ai_sent: Arc<SyncMutex<Vec<RealtimeClientEvent>>>,
        tel_sent: Arc<SyncMutex<Vec<TelephonyMessage>>>,
        tel_tx: Option<mpsc::UnboundedSender<Result<TelephonyMessage, TransportError>>>,
        tel_rx: Option<ScriptedTelephony>,
        ai_tx: Option<mpsc::UnboundedSender<RealtimeServerEvent>>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            "prov-1",
            NegotiationContext::new("Ace Plumbing", "leaking water heater", "78704", 300.0),
        );
        let sink = Arc::new(MemorySink::new());
        let ai_sent = Arc::new(SyncMutex::new(Vec::new()));
        let tel_sent = Arc::new(SyncMutex::new(Vec::new()));
        let (tel_tx, tel_rx) = mpsc::unbounded_channel();
        let (ai_tx, ai_rx) = mpsc::unbounded_channel();
        let connector = Arc::new(TestConnector {
            sent: ai_sent.clone(),
            server_rx: SyncMutex::new(Some(ai_rx)),
        });
        let deps = SessionDeps {
            store,
            sink: sink.clone(),
            extractor: Arc::new(OutcomeExtractor::fallback_only()),
            connector,
            options: SessionOptions {
                drain_timeout_ms: 200,
                ..SessionOptions::default()
            },
        };
        Harness {
            deps,
            sink,
            ai_sent,
            tel_sent,
            tel_tx: Some(tel_tx),
            tel_rx: Some(ScriptedTelephony { rx: tel_rx }),
            ai_tx: Some(ai_tx),
        }
    }

    impl Harness {
        fn tel(&self) -> &mpsc::UnboundedSender<Result<TelephonyMessage, TransportError>> {
            self.tel_tx.as_ref().expect("telephony sender taken")
        }

        fn ai(&self) -> &mpsc::UnboundedSender<RealtimeServerEvent> {
            self.ai_tx.as_ref().expect("realtime sender taken")
        }

        async fn run(&mut self, session: Arc<CallSession>, registry: Arc<CallRegistry>) {
            let rx = self.tel_rx.take().expect("harness runs once");
            let tx = CollectingTelephonySink {
                sent: self.tel_sent.clone(),
            };
            run_call(session, registry, self.deps.clone(), rx, tx).await;
        }
    }

    fn start_msg(sid: &str, key: &str) -> TelephonyMessage {
        TelephonyMessage::Start {
            stream_sid: Some(sid.to_owned()),
            start: StartFrame {
                stream_sid: sid.to_owned(),
                call_sid: None,
                custom_parameters: [("provider_id".to_owned(), key.to_owned())].into(),
            },
        }
    }

    fn media_msg() -> TelephonyMessage {
        TelephonyMessage::Media {
            stream_sid: None,
            media: MediaFrame {
                payload: BASE64.encode([0x7fu8; 160]),
                timestamp: None,
                chunk: None,
            },
        }
    }

    #[tokio::test]
    async fn uplink_forwards_media_after_start_and_stops_on_stop() {
        let mut h = harness();
        h.tel().send(Ok(start_msg("MZ1", "prov-1"))).unwrap();
        h.tel().send(Ok(media_msg())).unwrap();
        h.tel().send(Ok(TelephonyMessage::Stop { stream_sid: None })).unwrap();
        // AI server side stays open; the drain window gives up on it.

        let session = CallSession::new();
        let registry = Arc::new(CallRegistry::new());
        h.run(session.clone(), registry.clone()).await;

        let sent = h.ai_sent.lock();
        assert!(matches!(sent[0], RealtimeClientEvent::SessionUpdate { .. }));
        assert!(matches!(sent[1], RealtimeClientEvent::ResponseCreate));
        let appends = sent
            .iter()
            .filter(|e| matches!(e, RealtimeClientEvent::InputAudioAppend { .. }))
            .count();
        assert_eq!(appends, 1);

        assert_eq!(session.state(), CallState::Closed);
        assert!(registry.is_empty());
        assert_eq!(h.sink.count(), 1);
        assert_eq!(h.sink.reports()[0].status, CallStatus::NoAgreement);
    }

    #[tokio::test]
    async fn malformed_and_unknown_frames_do_not_end_the_uplink() {
        let mut h = harness();
        h.tel()
            .send(Err(TransportError::Frame("not json".into())))
            .unwrap();
        h.tel().send(Ok(start_msg("MZ1", "prov-1"))).unwrap();
        h.tel().send(Ok(media_msg())).unwrap();
        h.tel()
            .send(Err(TransportError::Frame("not json".into())))
            .unwrap();
        h.tel().send(Ok(TelephonyMessage::Unknown)).unwrap();
        h.tel().send(Ok(media_msg())).unwrap();
        h.tel().send(Ok(TelephonyMessage::Stop { stream_sid: None })).unwrap();

        let session = CallSession::new();
        h.run(session.clone(), Arc::new(CallRegistry::new())).await;

        let appends = h
            .ai_sent
            .lock()
            .iter()
            .filter(|e| matches!(e, RealtimeClientEvent::InputAudioAppend { .. }))
            .count();
        assert_eq!(appends, 2);
        assert_eq!(session.state(), CallState::Closed);
        assert_eq!(h.sink.count(), 1);
    }

    #[tokio::test]
    async fn media_before_start_is_dropped() {
        let mut h = harness();
        h.tel().send(Ok(media_msg())).unwrap();
        h.tel().send(Ok(start_msg("MZ1", "prov-1"))).unwrap();
        h.tel().send(Ok(TelephonyMessage::Stop { stream_sid: None })).unwrap();

        let session = CallSession::new();
        h.run(session, Arc::new(CallRegistry::new())).await;

        assert!(h
            .ai_sent
            .lock()
            .iter()
            .all(|e| !matches!(e, RealtimeClientEvent::InputAudioAppend { .. })));
    }

    #[tokio::test]
    async fn downlink_relays_audio_transcript_and_barge_in() {
        let mut h = harness();
        h.tel().send(Ok(start_msg("MZ1", "prov-1"))).unwrap();
        // Telephony stays open; the AI side drives this test and closes.
        let pcm = BASE64.encode([0u8; 960]);
        h.ai()
            .send(RealtimeServerEvent::OutputAudioDelta { delta: pcm })
            .unwrap();
        h.ai().send(RealtimeServerEvent::SpeechStarted).unwrap();
        h.ai()
            .send(RealtimeServerEvent::InputTranscriptionCompleted {
                transcript: "I can do it for $150".to_owned(),
            })
            .unwrap();
        h.ai()
            .send(RealtimeServerEvent::AudioTranscriptDone {
                transcript: "deal".to_owned(),
            })
            .unwrap();
        h.ai_tx = None;

        let session = CallSession::new();
        let registry = Arc::new(CallRegistry::new());
        h.run(session.clone(), registry.clone()).await;

        let frames = h.tel_sent.lock();
        let media_at = frames
            .iter()
            .position(|f| matches!(f, TelephonyMessage::Media { stream_sid: Some(sid), .. } if sid == "MZ1"));
        let clear_at = frames
            .iter()
            .position(|f| matches!(f, TelephonyMessage::Clear { stream_sid } if stream_sid == "MZ1"));
        assert!(media_at.is_some(), "no outbound media frame: {frames:?}");
        assert!(clear_at.is_some(), "no clear frame: {frames:?}");
        assert!(media_at < clear_at);
        drop(frames);

        assert_eq!(session.state(), CallState::Closed);
        let reports = h.sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, CallStatus::Agreed);
        assert_eq!(reports[0].agreed_price, Some(150.0));
        assert!(reports[0]
            .transcript
            .contains("technician: I can do it for $150"));
        assert!(reports[0].transcript.contains("caller: deal"));
    }

    #[tokio::test]
    async fn unknown_context_key_reports_error_without_connecting() {
        let mut h = harness();
        h.tel().send(Ok(start_msg("MZ1", "missing"))).unwrap();

        let session = CallSession::new();
        h.run(session.clone(), Arc::new(CallRegistry::new())).await;

        assert_eq!(session.state(), CallState::Closed);
        assert!(h.ai_sent.lock().is_empty());
        let reports = h.sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, CallStatus::Error);
        assert!(reports[0].transcript.is_empty());
    }

    #[tokio::test]
    async fn closed_stream_without_start_reports_error_once() {
        let mut h = harness();
        h.tel_tx = None;

        let session = CallSession::new();
        h.run(session.clone(), Arc::new(CallRegistry::new())).await;

        assert_eq!(session.state(), CallState::Closed);
        assert_eq!(h.sink.count(), 1);
        assert_eq!(h.sink.reports()[0].status, CallStatus::Error);
    }

    #[test]
    fn media_gate_follows_state() {
        let session = CallSession::new();
        assert!(!session.accepts_media());
        session.set_state(CallState::Streaming);
        assert!(session.accepts_media());
        session.set_state(CallState::Closing);
        assert!(!session.accepts_media());
        session.set_state(CallState::Closed);
        assert!(!session.accepts_media());
    }

    #[test]
    fn report_slot_is_claimed_once() {
        let session = CallSession::new();
        assert!(session.begin_report());
        assert!(!session.begin_report());
    }

    #[test]
    fn second_bind_is_rejected() {
        let session = CallSession::new();
        let binding = StreamBinding {
            stream_sid: "MZ1".to_owned(),
            context: NegotiationContext::new("Ace", "leak", "78704", 300.0),
        };
        session.bind(binding.clone()).unwrap();
        assert!(matches!(
            session.bind(binding),
            Err(BridgeError::AlreadyBound)
        ));
        assert_eq!(session.binding().unwrap().stream_sid, "MZ1");
    }
}
