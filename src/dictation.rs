//! One-shot speech-to-text sessions feeding a text field.
//!
//! The recognition engine itself lives in the browser; this is the session
//! logic around it, so the client and the tests agree on what each event does.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DictationError {
    #[error("already listening")]
    AlreadyListening,
    #[error("speech recognition is not supported")]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Final transcript of the single utterance.
    Result(String),
    Error(String),
    End,
}

#[derive(Debug, Clone)]
pub struct Dictation {
    language: String,
    supported: bool,
    listening: bool,
    last_error: Option<String>,
}

impl Dictation {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            supported: true,
            listening: false,
            last_error: None,
        }
    }

    pub fn unsupported(language: impl Into<String>) -> Self {
        Self {
            supported: false,
            ..Self::new(language)
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn start(&mut self) -> Result<(), DictationError> {
        if !self.supported {
            return Err(DictationError::Unsupported);
        }
        if self.listening {
            return Err(DictationError::AlreadyListening);
        }
        self.listening = true;
        self.last_error = None;
        Ok(())
    }

    /// Applies one engine event. A result is appended to `field`; every event ends the session.
    pub fn handle(&mut self, event: RecognitionEvent, field: &mut String) {
        if !self.listening {
            return;
        }
        match event {
            RecognitionEvent::Result(transcript) => {
                let transcript = transcript.trim();
                if !transcript.is_empty() {
                    if !field.is_empty() && !field.ends_with(char::is_whitespace) {
                        field.push(' ');
                    }
                    field.push_str(transcript);
                }
            }
            RecognitionEvent::Error(reason) => self.last_error = Some(reason),
            RecognitionEvent::End => {}
        }
        self.listening = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_appends_and_stops() {
        let mut dictation = Dictation::new("zh-CN");
        let mut field = String::from("Five days in Kyoto");
        dictation.start().expect("start");
        assert!(dictation.is_listening());

        dictation.handle(RecognitionEvent::Result(" 喜欢动漫和美食 ".into()), &mut field);
        assert_eq!(field, "Five days in Kyoto 喜欢动漫和美食");
        assert!(!dictation.is_listening());
    }

    #[test]
    fn result_into_empty_field_has_no_leading_space() {
        let mut dictation = Dictation::new("zh-CN");
        let mut field = String::new();
        dictation.start().expect("start");
        dictation.handle(RecognitionEvent::Result("去京都".into()), &mut field);
        assert_eq!(field, "去京都");
    }

    #[test]
    fn error_and_end_stop_without_touching_text() {
        let mut field = String::from("draft");
        let mut dictation = Dictation::new("en-US");

        dictation.start().expect("start");
        dictation.handle(RecognitionEvent::Error("no-speech".into()), &mut field);
        assert!(!dictation.is_listening());
        assert_eq!(dictation.last_error(), Some("no-speech"));

        dictation.start().expect("restart");
        assert_eq!(dictation.last_error(), None);
        dictation.handle(RecognitionEvent::End, &mut field);
        assert!(!dictation.is_listening());
        assert_eq!(field, "draft");
    }

    #[test]
    fn events_after_the_session_are_ignored() {
        let mut field = String::new();
        let mut dictation = Dictation::new("zh-CN");
        dictation.handle(RecognitionEvent::Result("stray".into()), &mut field);
        assert!(field.is_empty());
    }

    #[test]
    fn start_twice_or_unsupported_is_refused() {
        let mut dictation = Dictation::new("zh-CN");
        dictation.start().expect("start");
        assert_eq!(dictation.start(), Err(DictationError::AlreadyListening));

        let mut unsupported = Dictation::unsupported("zh-CN");
        assert_eq!(unsupported.start(), Err(DictationError::Unsupported));
        assert_eq!(unsupported.language(), "zh-CN");
    }
}
