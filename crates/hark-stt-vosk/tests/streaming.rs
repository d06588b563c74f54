//! Streaming-session properties over a scripted decoder: partial ordering,
//! stream/batch agreement, and failure isolation between sessions.

use hark_stt::plugins::mock::MockDecoder;
use hark_stt::{SttError, TranscriptionConfig, TranscriptionEvent};
use hark_stt_vosk::{BatchRecognizer, StreamingSession};

const TRANSCRIPT: &str = "what is the weather like tomorrow";

fn verbose_config() -> TranscriptionConfig {
    TranscriptionConfig {
        verbose: true,
        ..Default::default()
    }
}

/// Chunked streaming of an utterance emits monotonically growing partials,
/// the final comes last, and it equals the batch result for the same audio.
#[test]
fn stream_and_batch_agree_on_one_utterance() {
    let chunks = vec![vec![0i16; 1000]; 6];

    let mut session =
        StreamingSession::new(MockDecoder::recognizing(TRANSCRIPT), verbose_config());
    let mut partials = Vec::new();
    for chunk in &chunks {
        if let Some(TranscriptionEvent::Partial { partial, .. }) = session.feed(chunk).unwrap() {
            partials.push(partial.text);
        }
    }
    let (_, streamed) = session.end_utterance().unwrap();

    // Partials never lose information.
    for pair in partials.windows(2) {
        assert!(pair[1].starts_with(pair[0].as_str()));
    }
    // The final is at least as informative as the last partial.
    let last_partial = partials.last().expect("partials were emitted");
    assert!(streamed.text.starts_with(last_partial.as_str()));

    let complete: Vec<i16> = chunks.concat();
    let mut batch = BatchRecognizer::new(TranscriptionConfig::default(), || {
        Ok(MockDecoder::recognizing(TRANSCRIPT))
    });
    let batched = batch.transcribe(&complete, 16_000).unwrap();
    assert_eq!(streamed, batched);
}

/// A session survives back-to-back utterances on the same decoder.
#[test]
fn consecutive_utterances_start_clean() {
    let mut session =
        StreamingSession::new(MockDecoder::recognizing("one two three"), verbose_config());

    session.feed(&[0; 3000]).unwrap();
    let (_, first) = session.end_utterance().unwrap();
    assert_eq!(first.text, "one two three");

    // The decoder was reset: the next utterance starts from scratch.
    session.feed(&[0; 1000]).unwrap();
    let (_, second) = session.end_utterance().unwrap();
    assert_eq!(second.text, "one");
}

/// Abandoning a session releases the decoder without a spurious final, and
/// a chunk error in one session leaves an independent session untouched.
#[test]
fn abandoned_and_failed_sessions_stay_isolated() {
    let mut failing = StreamingSession::new(
        MockDecoder::recognizing(TRANSCRIPT).failing_after(500),
        verbose_config(),
    );
    let mut healthy =
        StreamingSession::new(MockDecoder::recognizing(TRANSCRIPT), verbose_config());

    assert!(matches!(
        failing.feed(&[0; 1000]),
        Err(SttError::RecognitionFailed(_))
    ));

    // The healthy session, fed concurrently in spirit, is unaffected.
    healthy.feed(&[0; 6000]).unwrap();
    let (_, hypothesis) = healthy.end_utterance().unwrap();
    assert_eq!(hypothesis.text, TRANSCRIPT);

    // Abandon path: no final, decoder released.
    let mut abandoned =
        StreamingSession::new(MockDecoder::recognizing(TRANSCRIPT), verbose_config());
    abandoned.feed(&[0; 2000]).unwrap();
    abandoned.abandon().unwrap();
    assert_eq!(abandoned.into_decoder().resets, 1);
}
