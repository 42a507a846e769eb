use super::*;
use crate::tokenizer::{BasicTokenizer, ModelLoader, TokenizeError};
use std::sync::atomic::{AtomicUsize, Ordering};

const FOX: &str = "The quick brown fox jumped quietly over the lazy dog sitting under the tree";

/// Refuses any text containing this marker
const POISON: &str = "<poison>";

struct PickyTokenizer;

impl Tokenizer for PickyTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizeError> {
        if text.contains(POISON) {
            return Err(TokenizeError::EncodingFailed("unencodable input".to_string()));
        }
        BasicTokenizer.tokenize(text)
    }
}

/// Serves `basic` and `picky`; every other model id is unknown
struct TestLoader {
    loads: Arc<AtomicUsize>,
}

impl ModelLoader for TestLoader {
    fn load(&self, model: &str, _credential: Option<&str>) -> Result<Arc<dyn Tokenizer>, TokenizeError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match model {
            "basic" => Ok(Arc::new(BasicTokenizer)),
            "picky" => Ok(Arc::new(PickyTokenizer)),
            _ => Err(TokenizeError::unavailable(model, "repository not found")),
        }
    }
}

fn service() -> (TokenizeService, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let registry = TokenizerRegistry::new(TestLoader {
        loads: loads.clone(),
    });
    (
        TokenizeService::new(Arc::new(registry), RequestLimits::default()),
        loads,
    )
}

fn expect_single(response: TokenizeResponse) -> TextResult {
    match response {
        TokenizeResponse::Single(result) => result,
        other => panic!("expected single-text response, got {:?}", other),
    }
}

fn expect_batch(response: TokenizeResponse) -> Vec<TextOutcome> {
    match response {
        TokenizeResponse::Batch(batch) => batch.results,
        other => panic!("expected batch response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_single_text_without_chunking() {
    let (service, _) = service();
    let response = service
        .handle(TokenizeRequest::single("basic", "Here is 1!"))
        .await
        .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("chunks").is_none());

    let result = expect_single(response);
    assert_eq!(result.text, "Here is 1!");
    assert_eq!(result.sha256, sha256_hex("Here is 1!"));
    assert_eq!(result.tokens, vec!["here", "is", "1", "!"]);
    assert!(result.chunks.is_none());
}

#[tokio::test]
async fn test_single_text_with_chunking() {
    let (service, _) = service();
    let request = TokenizeRequest::single("basic", FOX).with_chunking(5, 2);
    let result = expect_single(service.handle(request).await.unwrap());

    assert_eq!(result.tokens.len(), 14);
    let chunks = result.chunks.unwrap();
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks[3].text, "dog sitting under the tree");
    assert!(chunks.iter().all(|c| c.token_count == 5));
    assert!(chunks.iter().all(|c| c.sha256 == sha256_hex(&c.text)));
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let (service, _) = service();
    let texts = [
        "this is a very simple sentence",
        "hello, how's your day going today?",
        FOX,
    ];
    let request = TokenizeRequest::batch("basic", texts)
        .with_chunking(5, 2)
        .with_max_chunk_length(128);
    let results = expect_batch(service.handle(request).await.unwrap());

    assert_eq!(results.len(), 3);
    for (outcome, text) in results.iter().zip(texts) {
        match outcome {
            TextOutcome::Completed(result) => {
                assert_eq!(result.text, text);
                assert!(result.chunks.is_some());
            }
            TextOutcome::Failed(failure) => panic!("unexpected failure: {:?}", failure),
        }
    }

    if let TextOutcome::Completed(result) = &results[1] {
        let chunks = result.chunks.as_ref().unwrap();
        assert_eq!(chunks[0].text, "hello , how ' s");
    }
}

#[tokio::test]
async fn test_duplicate_texts_share_fingerprints() {
    let (service, _) = service();
    let request = TokenizeRequest::batch("basic", ["same text", "same text"]).with_chunking(1, 0);
    let results = expect_batch(service.handle(request).await.unwrap());

    assert_eq!(results[0], results[1]);
}

#[tokio::test]
async fn test_batch_element_failure_does_not_abort_siblings() {
    let (service, _) = service();
    let poisoned = format!("bad {}", POISON);
    let request = TokenizeRequest::batch("picky", vec!["first".to_string(), poisoned.clone(), "third".to_string()]);
    let results = expect_batch(service.handle(request).await.unwrap());

    assert!(results[0].is_completed());
    assert!(results[2].is_completed());
    match &results[1] {
        TextOutcome::Failed(failure) => {
            assert_eq!(failure.text, poisoned);
            assert_eq!(failure.error.code, "tokenization_failed");
        }
        other => panic!("expected failure marker, got {:?}", other),
    }

    let json = serde_json::to_value(&results[1]).unwrap();
    assert!(json.get("tokens").is_none());
    assert!(json.get("chunks").is_none());
}

#[tokio::test]
async fn test_single_element_failure_fails_request() {
    let (service, _) = service();
    let err = service
        .handle(TokenizeRequest::single("picky", POISON))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::TokenizationFailed(_)));
}

#[tokio::test]
async fn test_invalid_overlap_rejected_before_loading() {
    let (service, loads) = service();
    let request = TokenizeRequest::batch("basic", ["a b c"]).with_chunking(3, 3);
    let err = service.handle(request).await.unwrap_err();

    assert!(matches!(err, ServiceError::InvalidChunkParameters(_)));
    assert_eq!(err.code(), "invalid_chunk_parameters");
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_text_and_texts_are_exclusive() {
    let (service, loads) = service();

    let mut both = TokenizeRequest::single("basic", "one");
    both.texts = Some(vec!["two".to_string()]);
    let err = service.handle(both).await.unwrap_err();
    assert!(matches!(err, ServiceError::MalformedRequest(_)));

    let neither = TokenizeRequest {
        model: "basic".to_string(),
        ..Default::default()
    };
    let err = service.handle(neither).await.unwrap_err();
    assert_eq!(err.code(), "malformed_request");

    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_model_rejected() {
    let (service, _) = service();
    let err = service
        .handle(TokenizeRequest::single("  ", "text"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::MalformedRequest(_)));
}

#[tokio::test]
async fn test_unknown_model_fails_whole_request() {
    let (service, _) = service();
    let err = service
        .handle(TokenizeRequest::batch("nobody/nothing", ["a", "b"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ModelUnavailable(_)));
}

#[tokio::test]
async fn test_tiny_character_cap_never_empties_chunks() {
    let (service, _) = service();
    let request = TokenizeRequest::batch("basic", ["hello, how's your day going today?", FOX])
        .with_chunking(5, 2)
        .with_max_chunk_length(1);
    let results = expect_batch(service.handle(request).await.unwrap());

    for outcome in results {
        let TextOutcome::Completed(result) = outcome else {
            panic!("unexpected failure");
        };
        for chunk in result.chunks.unwrap() {
            assert!(chunk.token_count >= 1);
            assert!(!chunk.text.is_empty());
        }
    }
}

#[tokio::test]
async fn test_overlap_without_window_skips_chunking() {
    let (service, _) = service();
    let mut request = TokenizeRequest::single("basic", "a b c");
    request.token_overlap = Some(1);
    request.max_chunk_length = Some(10);

    let result = expect_single(service.handle(request).await.unwrap());
    assert!(result.chunks.is_none());
}

#[tokio::test]
async fn test_empty_inputs() {
    let (service, _) = service();

    let results = expect_batch(
        service
            .handle(TokenizeRequest::batch("basic", Vec::<String>::new()))
            .await
            .unwrap(),
    );
    assert!(results.is_empty());

    let request = TokenizeRequest::single("basic", "").with_chunking(5, 2);
    let result = expect_single(service.handle(request).await.unwrap());
    assert!(result.tokens.is_empty());
    assert_eq!(result.chunks, Some(vec![]));
    assert_eq!(result.sha256, sha256_hex(""));
}

#[test]
fn test_limits_enforced() {
    let limits = RequestLimits {
        max_batch_size: 2,
        max_text_bytes: 8,
    };

    let err = TokenizeRequest::batch("basic", ["a", "b", "c"])
        .into_validated(&limits)
        .unwrap_err();
    assert!(err.to_string().contains("exceeds maximum of 2"));

    let err = TokenizeRequest::single("basic", "longer than eight")
        .into_validated(&limits)
        .unwrap_err();
    assert!(matches!(err, ServiceError::MalformedRequest(_)));

    let long_model = "m".repeat(MAX_MODEL_ID_LENGTH + 1);
    assert!(TokenizeRequest::single(long_model, "ok")
        .into_validated(&limits)
        .is_err());
}

#[test]
fn test_blank_credential_is_dropped() {
    let validated = TokenizeRequest::single("basic", "x")
        .with_credential("")
        .into_validated(&RequestLimits::default())
        .unwrap();
    assert!(validated.credential.is_none());

    let validated = TokenizeRequest::single("basic", "x")
        .with_credential("hf_secret")
        .into_validated(&RequestLimits::default())
        .unwrap();
    assert_eq!(validated.credential.as_deref(), Some("hf_secret"));
}

#[test]
fn test_decodes_reference_payload() {
    let payload = serde_json::json!({
        "model": "sentence-transformers/all-MiniLM-L6-v2",
        "huggingface_api_key": null,
        "max_chunk_length": 128,
        "max_tokens_per_chunk": 5,
        "token_overlap": 2,
        "texts": [
            "this is a very simple sentence",
            "hello, how's your day going today?"
        ]
    });
    let request: TokenizeRequest = serde_json::from_value(payload).unwrap();
    let validated = request.into_validated(&RequestLimits::default()).unwrap();

    assert_eq!(validated.model, "sentence-transformers/all-MiniLM-L6-v2");
    assert!(validated.credential.is_none());
    assert!(matches!(validated.inputs, Inputs::Batch(ref texts) if texts.len() == 2));

    let chunking = validated.chunking.unwrap();
    assert_eq!(chunking.max_tokens_per_chunk(), 5);
    assert_eq!(chunking.token_overlap(), 2);
    assert_eq!(chunking.max_chunk_length(), Some(128));
}

#[test]
fn test_negative_overlap_is_a_parameter_error() {
    let err = TokenizeRequest::single("basic", "x")
        .with_chunking(4, -1)
        .into_validated(&RequestLimits::default())
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidChunkParameters(_)));
}
