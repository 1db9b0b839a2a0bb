//! Contract tests for IdentityVerifier against a simulated record store.
//!
//! The store is played by wiremock responders that sign with a real Ed25519
//! key, so every trust check runs against genuine signatures.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST | `/v1/record/vetted` | `fetch_*` |
//! | POST | `/v1/identity` | `connect_*` |

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use sumd_core::{CanonicalBytes, ReleaseDescriptor};
use sumd_crypto::{Challenge, Ed25519KeyPair, FullIdentity};
use sumd_record_client::types::{IdentityRequest, VettedRecordRequest};
use sumd_record_client::{IdentityVerifier, RecordStoreConfig, RecordStoreError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn store_key() -> Arc<Ed25519KeyPair> {
    Arc::new(Ed25519KeyPair::from_seed(&[42u8; 32]))
}

fn sample_record(token: &str) -> Value {
    json!({
        "token": token,
        "metadata": [
            {"id": 1, "payload": json!({
                "checksum": "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
                "product": "foo",
                "version": "1.0",
                "file": "foo.tgz"
            }).to_string()}
        ]
    })
}

fn sign_record(key: &Ed25519KeyPair, record: &Value) -> String {
    key.sign(&CanonicalBytes::new(record).unwrap()).to_hex()
}

fn sign_challenge(key: &Ed25519KeyPair, challenge_hex: &str) -> String {
    key.sign(&Challenge::from_hex(challenge_hex).unwrap()).to_hex()
}

/// A well-behaved store: signs the record and the caller's challenge.
fn honest_store(key: Arc<Ed25519KeyPair>, record: Value) -> impl Fn(&Request) -> ResponseTemplate {
    move |req: &Request| {
        let body: VettedRecordRequest = req.body_json().unwrap();
        ResponseTemplate::new(200).set_body_json(json!({
            "response": sign_challenge(&key, &body.challenge),
            "record": record,
            "signature": sign_record(&key, &record),
        }))
    }
}

async fn verifier(server: &MockServer, authority: &Ed25519KeyPair) -> IdentityVerifier {
    let config = RecordStoreConfig::new(server.uri().parse().unwrap())
        .with_timeout(Duration::from_secs(5));
    IdentityVerifier::with_authority(
        config,
        Arc::new(FullIdentity::generate()),
        authority.public_key(),
    )
    .unwrap()
}

// ── POST /v1/record/vetted ───────────────────────────────────────────

#[tokio::test]
async fn fetch_returns_authenticated_record() {
    let server = MockServer::start().await;
    let key = store_key();

    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(honest_store(key.clone(), sample_record("rec-1")))
        .expect(1)
        .mount(&server)
        .await;

    let v = verifier(&server, &key).await;
    let record = v.fetch_authenticated_record("rec-1").await.unwrap();
    assert_eq!(record.token, "rec-1");

    let release = ReleaseDescriptor::new("foo", "1.0", "foo.tgz").unwrap();
    let entry = record.checksum_for(&release).unwrap();
    assert!(entry.checksum.starts_with("ba7816bf"));
}

#[tokio::test]
async fn fetch_sends_signed_challenge_and_identity() {
    let server = MockServer::start().await;
    let key = store_key();

    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(honest_store(key.clone(), sample_record("rec-1")))
        .mount(&server)
        .await;

    let v = verifier(&server, &key).await;
    v.fetch_authenticated_record("rec-1").await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body: VettedRecordRequest = received[0].body_json().unwrap();
    assert_eq!(body.token, "rec-1");
    assert_eq!(body.publickey, v.public_key());
    let challenge = Challenge::from_hex(&body.challenge).unwrap();
    sumd_crypto::verify(&challenge, &body.signature, &body.publickey).unwrap();
}

#[tokio::test]
async fn fetch_uses_fresh_challenge_per_call() {
    let server = MockServer::start().await;
    let key = store_key();

    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(honest_store(key.clone(), sample_record("rec-1")))
        .expect(2)
        .mount(&server)
        .await;

    let v = verifier(&server, &key).await;
    v.fetch_authenticated_record("rec-1").await.unwrap();
    v.fetch_authenticated_record("rec-1").await.unwrap();

    let received = server.received_requests().await.unwrap();
    let a: VettedRecordRequest = received[0].body_json().unwrap();
    let b: VettedRecordRequest = received[1].body_json().unwrap();
    assert_ne!(a.challenge, b.challenge);
}

#[tokio::test]
async fn fetch_rejects_tampered_record() {
    let server = MockServer::start().await;
    let key = store_key();
    let signed = sample_record("rec-1");

    let responder_key = key.clone();
    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(move |req: &Request| {
            let body: VettedRecordRequest = req.body_json().unwrap();
            let mut tampered = signed.clone();
            tampered["metadata"][0]["payload"] = json!("{}");
            ResponseTemplate::new(200).set_body_json(json!({
                "response": sign_challenge(&responder_key, &body.challenge),
                "record": tampered,
                "signature": sign_record(&responder_key, &signed),
            }))
        })
        .mount(&server)
        .await;

    let v = verifier(&server, &key).await;
    let err = v.fetch_authenticated_record("rec-1").await.unwrap_err();
    assert!(matches!(err, RecordStoreError::SignatureInvalid(_)), "{err:?}");
    assert_eq!(err.authentication_failure(), Some("signature invalid"));
}

#[tokio::test]
async fn fetch_rejects_reply_from_unknown_key() {
    let server = MockServer::start().await;
    let impostor = Arc::new(Ed25519KeyPair::from_seed(&[7u8; 32]));

    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(honest_store(impostor, sample_record("rec-1")))
        .mount(&server)
        .await;

    let v = verifier(&server, &store_key()).await;
    let err = v.fetch_authenticated_record("rec-1").await.unwrap_err();
    assert!(matches!(err, RecordStoreError::SignatureInvalid(_)), "{err:?}");
}

#[tokio::test]
async fn fetch_rejects_replayed_challenge_response() {
    let server = MockServer::start().await;
    let key = store_key();
    let record = sample_record("rec-1");

    // A response captured from some other exchange.
    let stale = {
        let other = FullIdentity::generate();
        let exchange = sumd_crypto::ChallengeExchange::new(&other.public_key()).unwrap();
        key.sign(exchange.challenge()).to_hex()
    };

    let responder_key = key.clone();
    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(move |_: &Request| {
            ResponseTemplate::new(200).set_body_json(json!({
                "response": stale,
                "record": record,
                "signature": sign_record(&responder_key, &record),
            }))
        })
        .mount(&server)
        .await;

    let v = verifier(&server, &key).await;
    let err = v.fetch_authenticated_record("rec-1").await.unwrap_err();
    assert!(matches!(err, RecordStoreError::ChallengeMismatch(_)), "{err:?}");
}

#[tokio::test]
async fn fetch_rejects_record_for_other_token() {
    let server = MockServer::start().await;
    let key = store_key();

    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(honest_store(key.clone(), sample_record("rec-other")))
        .mount(&server)
        .await;

    let v = verifier(&server, &key).await;
    let err = v.fetch_authenticated_record("rec-1").await.unwrap_err();
    assert!(matches!(err, RecordStoreError::RecordMismatch { .. }), "{err:?}");
}

#[tokio::test]
async fn fetch_maps_404_to_record_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let v = verifier(&server, &store_key()).await;
    let err = v.fetch_authenticated_record("missing").await.unwrap_err();
    match err {
        RecordStoreError::RecordNotFound { token } => assert_eq!(token, "missing"),
        other => panic!("expected RecordNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_maps_5xx_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let v = verifier(&server, &store_key()).await;
    let err = v.fetch_authenticated_record("rec-1").await.unwrap_err();
    match &err {
        RecordStoreError::ApiError { status, body, .. } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn fetch_reports_malformed_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let v = verifier(&server, &store_key()).await;
    let err = v.fetch_authenticated_record("rec-1").await.unwrap_err();
    assert!(matches!(err, RecordStoreError::MalformedReply { .. }), "{err:?}");
}

#[tokio::test]
async fn fetch_times_out_without_retry() {
    let server = MockServer::start().await;
    let key = store_key();

    Mock::given(method("POST"))
        .and(path("/v1/record/vetted"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = RecordStoreConfig::new(server.uri().parse().unwrap())
        .with_timeout(Duration::from_millis(200));
    let v = IdentityVerifier::with_authority(
        config,
        Arc::new(FullIdentity::generate()),
        key.public_key(),
    )
    .unwrap();

    let err = v.fetch_authenticated_record("rec-1").await.unwrap_err();
    match &err {
        RecordStoreError::Http { source, .. } => assert!(source.is_timeout()),
        other => panic!("expected Http timeout, got {other:?}"),
    }
}

// ── POST /v1/identity ────────────────────────────────────────────────

#[tokio::test]
async fn connect_fetches_store_key_via_handshake() {
    let server = MockServer::start().await;
    let key = store_key();

    let responder_key = key.clone();
    Mock::given(method("POST"))
        .and(path("/v1/identity"))
        .respond_with(move |req: &Request| {
            let body: IdentityRequest = req.body_json().unwrap();
            ResponseTemplate::new(200).set_body_json(json!({
                "publickey": responder_key.public_key().to_hex(),
                "response": sign_challenge(&responder_key, &body.challenge),
            }))
        })
        .expect(1)
        .mount(&server)
        .await;

    let config = RecordStoreConfig::new(server.uri().parse().unwrap());
    let v = IdentityVerifier::connect(config, Arc::new(FullIdentity::generate()))
        .await
        .unwrap();
    assert_eq!(v.authority(), &key.public_key());
}

#[tokio::test]
async fn connect_rejects_key_that_cannot_sign_challenge() {
    let server = MockServer::start().await;
    let claimed = store_key();
    let signer = Arc::new(Ed25519KeyPair::from_seed(&[9u8; 32]));

    Mock::given(method("POST"))
        .and(path("/v1/identity"))
        .respond_with(move |req: &Request| {
            let body: IdentityRequest = req.body_json().unwrap();
            ResponseTemplate::new(200).set_body_json(json!({
                "publickey": claimed.public_key().to_hex(),
                "response": sign_challenge(&signer, &body.challenge),
            }))
        })
        .mount(&server)
        .await;

    let config = RecordStoreConfig::new(server.uri().parse().unwrap());
    let err = IdentityVerifier::connect(config, Arc::new(FullIdentity::generate()))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordStoreError::ChallengeMismatch(_)), "{err:?}");
}

#[tokio::test]
async fn connect_with_pinned_key_does_not_call_store() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/identity"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let pinned = store_key().public_key();
    let config = RecordStoreConfig::new(server.uri().parse().unwrap()).with_pinned_key(pinned);
    let v = IdentityVerifier::connect(config, Arc::new(FullIdentity::generate()))
        .await
        .unwrap();
    assert_eq!(v.authority(), &pinned);
}
