//! Voice input and output
//!
//! Speech recognition and synthesis are platform services the advisor
//! treats as black boxes. This module holds the control state around them:
//! whether capture is available, whether it is listening, whether speech
//! output is muted, and how recognition failures are downgraded.

use tracing::{debug, warn};

/// Recognition engine supplied by the host platform
pub trait SpeechRecognizer: Send {
    fn start(&mut self) -> Result<(), String>;
    fn stop(&mut self);
    fn abort(&mut self);
}

/// Speech output supplied by the host platform
pub trait SpeechSynthesizer: Send {
    fn speak(&mut self, text: &str);
    fn cancel(&mut self);
}

/// Failure reported by the recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// Expected during normal use, e.g. when capture is restarted
    Aborted,
    /// Microphone permission denied
    NotAllowed,
    Network,
    Other(String),
}

/// Something the user should be told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceNotice {
    pub title: &'static str,
    pub description: &'static str,
}

pub struct VoiceControl {
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    supported: bool,
    listening: bool,
    muted: bool,
}

impl VoiceControl {
    /// `None` for either side means the platform lacks that capability
    pub fn new(
        recognizer: Option<Box<dyn SpeechRecognizer>>,
        synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    ) -> Self {
        let supported = recognizer.is_some();
        Self {
            recognizer,
            synthesizer,
            supported,
            listening: false,
            muted: false,
        }
    }

    pub fn unsupported() -> Self {
        Self::new(None, None)
    }

    /// Notice shown once when capture is unavailable
    pub fn availability_notice(&self) -> Option<VoiceNotice> {
        if self.supported {
            None
        } else {
            Some(VoiceNotice {
                title: "Feature Not Available",
                description: "Speech recognition is not supported in your browser.",
            })
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Start or stop capture. Does nothing while disabled.
    pub fn toggle_listening(&mut self, input_disabled: bool) -> Option<VoiceNotice> {
        if input_disabled || !self.supported {
            return None;
        }
        let recognizer = self.recognizer.as_mut()?;

        if self.listening {
            recognizer.abort();
            self.listening = false;
            return None;
        }

        // Clear any stale capture before starting again
        recognizer.abort();
        match recognizer.start() {
            Ok(()) => {
                self.listening = true;
                debug!("Speech recognition started");
                None
            }
            Err(error) => {
                warn!("Failed to start speech recognition: {}", error);
                self.listening = false;
                Some(VoiceNotice {
                    title: "Voice Recognition Error",
                    description: "Failed to start voice recognition. Please try again later.",
                })
            }
        }
    }

    /// Feed a recognition result. Only final text is delivered, once.
    pub fn on_result(&mut self, transcript: &str, is_final: bool) -> Option<String> {
        if !is_final {
            return None;
        }

        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.listening = false;

        let text = transcript.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// Downgrade a recognition failure
    pub fn on_error(&mut self, error: RecognitionError) -> Option<VoiceNotice> {
        self.listening = false;

        match error {
            RecognitionError::Aborted => None,
            RecognitionError::NotAllowed => {
                warn!("Microphone access denied, disabling voice input");
                self.supported = false;
                Some(VoiceNotice {
                    title: "Voice Recognition Error",
                    description: "Microphone access denied. Please check your browser permissions.",
                })
            }
            RecognitionError::Network => {
                warn!("Speech recognition network failure");
                Some(VoiceNotice {
                    title: "Voice Recognition Error",
                    description: "Network error. Please check your connection.",
                })
            }
            RecognitionError::Other(reason) => {
                warn!("Speech recognition error: {}", reason);
                None
            }
        }
    }

    pub fn on_end(&mut self) {
        self.listening = false;
    }

    /// Mute or unmute speech output. Muting silences anything in progress.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if self.muted {
            if let Some(synthesizer) = self.synthesizer.as_mut() {
                synthesizer.cancel();
            }
        }
        self.muted
    }

    /// Read a reply aloud unless muted. Returns whether it was spoken.
    pub fn speak(&mut self, text: &str) -> bool {
        if self.muted {
            return false;
        }
        match self.synthesizer.as_mut() {
            Some(synthesizer) => {
                synthesizer.speak(text);
                true
            }
            None => false,
        }
    }

    /// Release platform resources
    pub fn shutdown(&mut self) {
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.abort();
        }
        if let Some(synthesizer) = self.synthesizer.as_mut() {
            synthesizer.cancel();
        }
        self.listening = false;
    }
}

impl Drop for VoiceControl {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls(Arc<Mutex<Vec<&'static str>>>);

    impl Calls {
        fn log(&self, call: &'static str) {
            self.0.lock().unwrap().push(call);
        }
    }

    struct FakeRecognizer {
        calls: Calls,
        fail_start: bool,
    }

    impl SpeechRecognizer for FakeRecognizer {
        fn start(&mut self) -> Result<(), String> {
            self.calls.log("start");
            if self.fail_start {
                Err("busy".to_string())
            } else {
                Ok(())
            }
        }
        fn stop(&mut self) {
            self.calls.log("stop");
        }
        fn abort(&mut self) {
            self.calls.log("abort");
        }
    }

    struct FakeSynth {
        calls: Calls,
    }

    impl SpeechSynthesizer for FakeSynth {
        fn speak(&mut self, _text: &str) {
            self.calls.log("speak");
        }
        fn cancel(&mut self) {
            self.calls.log("cancel");
        }
    }

    fn voice(fail_start: bool) -> (VoiceControl, Arc<Mutex<Vec<&'static str>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let control = VoiceControl::new(
            Some(Box::new(FakeRecognizer {
                calls: Calls(Arc::clone(&log)),
                fail_start,
            })),
            Some(Box::new(FakeSynth {
                calls: Calls(Arc::clone(&log)),
            })),
        );
        (control, log)
    }

    #[test]
    fn test_unsupported_is_disabled() {
        let mut control = VoiceControl::unsupported();
        assert!(control.availability_notice().is_some());
        assert!(control.toggle_listening(false).is_none());
        assert!(!control.is_listening());
        // mute still works without capture
        assert!(control.toggle_mute());
    }

    #[test]
    fn test_only_final_results_delivered() {
        let (mut control, _) = voice(false);
        control.toggle_listening(false);
        assert!(control.is_listening());

        assert_eq!(control.on_result("what are", false), None);
        assert!(control.is_listening());

        assert_eq!(
            control.on_result(" what are etfs ", true),
            Some("what are etfs".to_string())
        );
        assert!(!control.is_listening());
    }

    #[test]
    fn test_error_downgrade() {
        let (mut control, _) = voice(false);

        control.toggle_listening(false);
        assert!(control.on_error(RecognitionError::Aborted).is_none());
        assert!(control.is_supported());

        control.toggle_listening(false);
        assert!(control.on_error(RecognitionError::Network).is_some());
        assert!(control.is_supported());

        control.toggle_listening(false);
        assert!(control.on_error(RecognitionError::Other("no-speech".into())).is_none());

        control.toggle_listening(false);
        assert!(control.on_error(RecognitionError::NotAllowed).is_some());
        assert!(!control.is_supported());
        assert!(!control.is_listening());

        // permanently disabled for this session
        assert!(control.toggle_listening(false).is_none());
        assert!(!control.is_listening());
    }

    #[test]
    fn test_start_failure_surfaces_notice() {
        let (mut control, _) = voice(true);
        assert!(control.toggle_listening(false).is_some());
        assert!(!control.is_listening());
    }

    #[test]
    fn test_disabled_input_ignores_toggle() {
        let (mut control, log) = voice(false);
        assert!(control.toggle_listening(true).is_none());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_mute_independent_of_capture() {
        let (mut control, log) = voice(false);
        control.toggle_listening(false);

        assert!(control.speak("hello"));
        assert!(control.toggle_mute());
        assert!(control.is_listening());
        assert!(!control.speak("hello again"));
        assert!(!control.toggle_mute());

        let calls = log.lock().unwrap();
        assert_eq!(calls.iter().filter(|c| **c == "speak").count(), 1);
        assert!(calls.contains(&"cancel"));
    }
}
