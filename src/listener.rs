//! Background listener
//!
//! Runs one [`MatchEngine`] on a dedicated worker thread. Key presses are
//! sent over a channel; while the idle timer is armed the worker waits for
//! the next key with a timeout equal to the time left, and fires the timer
//! itself when that wait runs out. Key handling and the timer therefore
//! never run at the same time.
//!
//! The backend is built on the worker thread because device handles (rodio's
//! output stream for one) are not `Send`.

use crate::audio::AudioBackend;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::engine::{EngineOptions, MatchEngine};
use crate::key::Key;
use crate::registry::SequenceDefinition;
use crate::Result;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

enum Command {
    Key(Key),
    Stop,
}

/// Handle to a running listener
pub struct KeySequenceListener {
    sender: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl KeySequenceListener {
    /// Start listening, reporting diagnostics through `tracing`
    pub fn start<B, F>(
        definitions: Vec<SequenceDefinition>,
        options: EngineOptions,
        backend_factory: F,
    ) -> Result<Self>
    where
        B: AudioBackend + 'static,
        F: FnOnce() -> B + Send + 'static,
    {
        Self::start_with_sink(definitions, options, backend_factory, Arc::new(TracingSink))
    }

    /// Start listening with an explicit diagnostic sink
    pub fn start_with_sink<B, F>(
        definitions: Vec<SequenceDefinition>,
        options: EngineOptions,
        backend_factory: F,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self>
    where
        B: AudioBackend + 'static,
        F: FnOnce() -> B + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("keyquence-listener".into())
            .spawn(move || {
                let engine =
                    MatchEngine::start_with_sink(definitions, options, backend_factory(), sink);
                run_worker(engine, receiver);
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Deliver a key press. Returns false once the listener has stopped.
    pub fn send(&self, key: Key) -> bool {
        self.sender
            .as_ref()
            .is_some_and(|sender| sender.send(Command::Key(key)).is_ok())
    }

    /// Stop the engine and wait for the worker to finish. Idempotent.
    ///
    /// Keys already sent are handled before the engine stops.
    pub fn stop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Command::Stop);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("listener worker panicked");
            }
        }
    }

    /// Returns true until [`stop`](Self::stop)
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for KeySequenceListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<B: AudioBackend>(mut engine: MatchEngine<B>, receiver: Receiver<Command>) {
    loop {
        let command = match engine.idle_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match receiver.recv_timeout(wait) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => {
                        engine.poll_idle(Instant::now());
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match receiver.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            Command::Key(key) => {
                engine.on_key_event(&key, Instant::now());
            }
            Command::Stop => break,
        }
    }
    engine.stop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioEvent, AudioLocator, RecordingBackend};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn send_text(listener: &KeySequenceListener, text: &str) {
        for c in text.chars() {
            assert!(listener.send(Key::Char(c)));
        }
    }

    #[test]
    fn test_detects_and_stops() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let backend = RecordingBackend::new();
        let factory_backend = backend.clone();
        let mut listener = KeySequenceListener::start(
            vec![SequenceDefinition::new("iddqd", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .with_audio("god.ogg")],
            EngineOptions::default(),
            move || factory_backend,
        )
        .unwrap();

        send_text(&listener, "IDDQD");
        listener.stop();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!listener.is_running());
        assert!(!listener.send(Key::Char('x')));
        assert!(backend
            .events()
            .contains(&AudioEvent::Unload(AudioLocator::from("god.ogg"))));
        listener.stop();
    }

    #[test]
    fn test_idle_timeout_resets_between_keys() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut listener = KeySequenceListener::start(
            vec![SequenceDefinition::new("abc", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })],
            EngineOptions::default().idle_timeout_ms(30),
            RecordingBackend::new,
        )
        .unwrap();

        send_text(&listener, "ab");
        thread::sleep(Duration::from_millis(300));
        send_text(&listener, "c");
        listener.stop();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_stops_worker() {
        let backend = RecordingBackend::new();
        let factory_backend = backend.clone();
        {
            let listener = KeySequenceListener::start(
                vec![SequenceDefinition::new("a", || {}).with_audio("a.ogg")],
                EngineOptions::default(),
                move || factory_backend,
            )
            .unwrap();
            send_text(&listener, "a");
        }
        assert!(backend
            .events()
            .contains(&AudioEvent::Unload(AudioLocator::from("a.ogg"))));
    }
}
