//! Mode validation
//!
//! Each mode carries an ordered set of fatal precondition rules and a set of
//! advisory rules. The first fatal rule that matches aborts the request; a
//! request with no fatal match proceeds, carrying zero or more advisories
//! about fields that will be ignored.

use voice_gateway_core::{SynthesisEngine, PROMPT_SAMPLE_RATE};

use crate::request::{Mode, SynthesisRequest};
use crate::PipelineError;

/// Result of running the mode rules against one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Abort: no synthesis is attempted, the caller receives a silent
    /// placeholder instead
    Fatal { message: String },
    /// Proceed, surfacing any advisories to the caller
    Proceed { advisories: Vec<String> },
}

impl ValidationOutcome {
    fn fatal(message: impl Into<String>) -> Self {
        ValidationOutcome::Fatal { message: message.into() }
    }

    /// True when synthesis may proceed
    pub fn is_proceed(&self) -> bool {
        matches!(self, ValidationOutcome::Proceed { .. })
    }
}

/// Fixed messages, keyed one-for-one to the rules that raise them
pub mod messages {
    pub const INSTRUCT_UNSUPPORTED: &str =
        "You are using instruct control mode. The loaded model does not support this mode. Please load an instruct-capable model";
    pub const INSTRUCT_TEXT_EMPTY: &str =
        "You are using instruct control mode. Please enter instruct text";
    pub const INSTRUCT_PROMPT_IGNORED: &str =
        "You are using instruct control mode. Prompt audio/prompt text will be ignored";

    pub const CROSS_LINGUAL_UNSUPPORTED: &str =
        "You are using cross-lingual cloning mode. The loaded instruct model does not support this mode. Please load a non-instruct model";
    pub const CROSS_LINGUAL_INSTRUCT_IGNORED: &str =
        "You are using cross-lingual cloning mode. Instruct text will be ignored";
    pub const CROSS_LINGUAL_LANGUAGE_REMINDER: &str =
        "You are using cross-lingual cloning mode. Please ensure synthesis text and prompt text are in different languages";

    pub const PROMPT_AUDIO_MISSING: &str =
        "Prompt audio is empty. Did you forget to input prompt audio?";
    pub const PROMPT_TEXT_MISSING: &str =
        "Prompt text is empty. Did you forget to input prompt text?";

    pub const RAPID_CLONING_EXTRAS_IGNORED: &str =
        "You are using 3s rapid cloning mode. Pre-trained voice/instruct text will be ignored";
    pub const PRETRAINED_EXTRAS_IGNORED: &str =
        "You are using pre-trained voice mode. Prompt text/prompt audio/instruct text will be ignored";

    pub fn prompt_rate_too_low(rate: u32, required: u32) -> String {
        format!("Prompt audio sample rate {rate} is lower than {required}")
    }
}

/// Run the rule set for the request's mode.
///
/// The effective prompt-audio source is resolved once, before any rule. The
/// engine is consulted only for its instruct capability and, when a prompt
/// file is present, a header probe of its sample rate; no audio is loaded
/// and no synthesis compute is spent here.
pub fn validate(
    request: &SynthesisRequest,
    engine: &dyn SynthesisEngine,
) -> Result<ValidationOutcome, PipelineError> {
    let prompt_path = request.prompt_audio.effective();
    let has_prompt_audio = prompt_path.is_some();
    let has_prompt_text = !request.prompt_text.is_empty();
    let has_instruct_text = !request.instruct_text.is_empty();

    // Probe the prompt file's header rate where a rule needs it
    let prompt_rate = match (request.mode, prompt_path) {
        (Mode::RapidCloning | Mode::CrossLingual, Some(path)) => {
            Some(engine.waveform_info(path)?.sample_rate)
        }
        _ => None,
    };

    let outcome = match request.mode {
        Mode::InstructControl => {
            if !engine.supports_instruct() {
                ValidationOutcome::fatal(messages::INSTRUCT_UNSUPPORTED)
            } else if request.instruct_text.is_empty() {
                ValidationOutcome::fatal(messages::INSTRUCT_TEXT_EMPTY)
            } else {
                let mut advisories = Vec::new();
                if has_prompt_audio || has_prompt_text {
                    advisories.push(messages::INSTRUCT_PROMPT_IGNORED.to_string());
                }
                ValidationOutcome::Proceed { advisories }
            }
        }

        Mode::CrossLingual => {
            if engine.supports_instruct() {
                ValidationOutcome::fatal(messages::CROSS_LINGUAL_UNSUPPORTED)
            } else if !has_prompt_audio {
                ValidationOutcome::fatal(messages::PROMPT_AUDIO_MISSING)
            } else if let Some(rate) =
                prompt_rate.filter(|&rate| rate < PROMPT_SAMPLE_RATE)
            {
                ValidationOutcome::fatal(messages::prompt_rate_too_low(
                    rate,
                    PROMPT_SAMPLE_RATE,
                ))
            } else {
                let mut advisories = Vec::new();
                if has_instruct_text {
                    advisories.push(messages::CROSS_LINGUAL_INSTRUCT_IGNORED.to_string());
                }
                advisories.push(messages::CROSS_LINGUAL_LANGUAGE_REMINDER.to_string());
                ValidationOutcome::Proceed { advisories }
            }
        }

        Mode::RapidCloning => {
            if !has_prompt_audio {
                ValidationOutcome::fatal(messages::PROMPT_AUDIO_MISSING)
            } else if let Some(rate) =
                prompt_rate.filter(|&rate| rate < PROMPT_SAMPLE_RATE)
            {
                ValidationOutcome::fatal(messages::prompt_rate_too_low(
                    rate,
                    PROMPT_SAMPLE_RATE,
                ))
            } else if request.prompt_text.is_empty() {
                ValidationOutcome::fatal(messages::PROMPT_TEXT_MISSING)
            } else {
                let mut advisories = Vec::new();
                if has_instruct_text {
                    advisories.push(messages::RAPID_CLONING_EXTRAS_IGNORED.to_string());
                }
                ValidationOutcome::Proceed { advisories }
            }
        }

        Mode::PretrainedVoice => {
            let mut advisories = Vec::new();
            if has_instruct_text || has_prompt_audio || has_prompt_text {
                advisories.push(messages::PRETRAINED_EXTRAS_IGNORED.to_string());
            }
            ValidationOutcome::Proceed { advisories }
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_gateway_core::{StubEngine, Waveform};

    fn engine_with_clip(rate: u32) -> StubEngine {
        let engine = StubEngine::new();
        engine.register_waveform("prompt.wav", Waveform::silence(rate, 3.0));
        engine
    }

    fn request_with_prompt(mode: Mode) -> SynthesisRequest {
        let mut request = SynthesisRequest::new(mode, "hello there");
        request.prompt_audio.uploaded = Some("prompt.wav".into());
        request
    }

    #[test]
    fn test_instruct_requires_capability() {
        let engine = StubEngine::new().with_instruct(false);
        let mut request = SynthesisRequest::new(Mode::InstructControl, "hi");
        request.instruct_text = "speak slowly".to_string();

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Fatal { message: messages::INSTRUCT_UNSUPPORTED.to_string() }
        );
    }

    #[test]
    fn test_instruct_requires_text() {
        let engine = StubEngine::new().with_instruct(true);
        let request = SynthesisRequest::new(Mode::InstructControl, "hi");

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Fatal { message: messages::INSTRUCT_TEXT_EMPTY.to_string() }
        );
    }

    #[test]
    fn test_instruct_capability_checked_first() {
        // Both rules match; the capability rule wins
        let engine = StubEngine::new().with_instruct(false);
        let request = SynthesisRequest::new(Mode::InstructControl, "hi");

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Fatal { message: messages::INSTRUCT_UNSUPPORTED.to_string() }
        );
    }

    #[test]
    fn test_instruct_advisory_for_prompt_fields() {
        let engine = StubEngine::new().with_instruct(true);
        engine.register_waveform("prompt.wav", Waveform::silence(16_000, 3.0));
        let mut request = request_with_prompt(Mode::InstructControl);
        request.instruct_text = "whisper".to_string();
        request.prompt_text = "some transcript".to_string();

        match validate(&request, &engine).unwrap() {
            ValidationOutcome::Proceed { advisories } => {
                assert_eq!(advisories, vec![messages::INSTRUCT_PROMPT_IGNORED.to_string()]);
            }
            other => panic!("expected proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_lingual_rejects_instruct_engine() {
        let engine = StubEngine::new().with_instruct(true);
        let request = request_with_prompt(Mode::CrossLingual);
        engine.register_waveform("prompt.wav", Waveform::silence(16_000, 3.0));

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Fatal {
                message: messages::CROSS_LINGUAL_UNSUPPORTED.to_string()
            }
        );
    }

    #[test]
    fn test_cross_lingual_requires_prompt_audio() {
        let engine = StubEngine::new();
        let request = SynthesisRequest::new(Mode::CrossLingual, "bonjour");

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Fatal { message: messages::PROMPT_AUDIO_MISSING.to_string() }
        );
    }

    #[test]
    fn test_cross_lingual_rejects_low_sample_rate() {
        let engine = engine_with_clip(8000);
        let request = request_with_prompt(Mode::CrossLingual);

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Fatal {
                message: messages::prompt_rate_too_low(8000, 16_000)
            }
        );
    }

    #[test]
    fn test_cross_lingual_always_reminds_about_languages() {
        let engine = engine_with_clip(16_000);
        let request = request_with_prompt(Mode::CrossLingual);

        match validate(&request, &engine).unwrap() {
            ValidationOutcome::Proceed { advisories } => {
                assert_eq!(
                    advisories,
                    vec![messages::CROSS_LINGUAL_LANGUAGE_REMINDER.to_string()]
                );
            }
            other => panic!("expected proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_lingual_instruct_advisory_comes_first() {
        let engine = engine_with_clip(16_000);
        let mut request = request_with_prompt(Mode::CrossLingual);
        request.instruct_text = "cheerful".to_string();

        match validate(&request, &engine).unwrap() {
            ValidationOutcome::Proceed { advisories } => {
                assert_eq!(
                    advisories,
                    vec![
                        messages::CROSS_LINGUAL_INSTRUCT_IGNORED.to_string(),
                        messages::CROSS_LINGUAL_LANGUAGE_REMINDER.to_string(),
                    ]
                );
            }
            other => panic!("expected proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_rapid_cloning_requires_prompt_audio() {
        let engine = StubEngine::new();
        let mut request = SynthesisRequest::new(Mode::RapidCloning, "hello");
        request.prompt_text = "transcript".to_string();

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Fatal { message: messages::PROMPT_AUDIO_MISSING.to_string() }
        );
    }

    #[test]
    fn test_rapid_cloning_requires_prompt_text() {
        let engine = engine_with_clip(16_000);
        let request = request_with_prompt(Mode::RapidCloning);

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Fatal { message: messages::PROMPT_TEXT_MISSING.to_string() }
        );
    }

    #[test]
    fn test_rapid_cloning_rate_checked_before_prompt_text() {
        // Low-rate clip and missing prompt text: the rate rule wins
        let engine = engine_with_clip(8000);
        let request = request_with_prompt(Mode::RapidCloning);

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Fatal {
                message: messages::prompt_rate_too_low(8000, 16_000)
            }
        );
    }

    #[test]
    fn test_rapid_cloning_proceeds() {
        let engine = engine_with_clip(22_050);
        let mut request = request_with_prompt(Mode::RapidCloning);
        request.prompt_text = "transcript".to_string();

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(outcome, ValidationOutcome::Proceed { advisories: vec![] });
    }

    #[test]
    fn test_pretrained_voice_never_fatal() {
        let engine = engine_with_clip(8000);
        let mut request = request_with_prompt(Mode::PretrainedVoice);
        request.prompt_text = "transcript".to_string();
        request.instruct_text = "instruct".to_string();

        match validate(&request, &engine).unwrap() {
            ValidationOutcome::Proceed { advisories } => {
                assert_eq!(
                    advisories,
                    vec![messages::PRETRAINED_EXTRAS_IGNORED.to_string()]
                );
            }
            other => panic!("expected proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_pretrained_voice_clean_request_has_no_advisories() {
        let engine = StubEngine::new();
        let request = SynthesisRequest::new(Mode::PretrainedVoice, "hello");

        let outcome = validate(&request, &engine).unwrap();
        assert_eq!(outcome, ValidationOutcome::Proceed { advisories: vec![] });
    }
}
