//! Integration tests for the Consent Gateway
//! Covers:
//! - Fail-closed behavior (authority errors, timeouts)
//! - Release only on a positive consent verdict
//! - Uniform refusal for denial and absence
//! - Last-write-wins, key isolation, idempotent re-checks
//! - Cancellation leaves no audit trace

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use consent_gateway::authority::InMemoryConsentAuthority;
use consent_gateway::engine_core::audit::{AuditLogger, AuditSink, SignedAuditEntry};
use consent_gateway::engine_core::crypto::CryptoSigner;
use consent_gateway::engine_core::models::ConsentQuery;
use consent_gateway::{ConsentAuthority, ConsentError, ConsentGateway, Refusal, Scope};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Helpers ---

const SUBJECT: &str = "0xABC";
const LENDER: &str = "0xLENDER";
const PAYLOAD: &str = "RAW{score:720}";

#[derive(Default)]
struct CollectingSink(Mutex<Vec<SignedAuditEntry>>);

impl CollectingSink {
    fn entries(&self) -> Vec<SignedAuditEntry> {
        self.0.lock().unwrap().clone()
    }
}

impl AuditSink for CollectingSink {
    fn record(&self, entry: &SignedAuditEntry) {
        self.0.lock().unwrap().push(entry.clone());
    }
}

/// Authority that answers after a fixed delay
struct SlowAuthority {
    delay: Duration,
    verdict: bool,
}

#[async_trait]
impl ConsentAuthority for SlowAuthority {
    async fn check_consent(&self, _query: &ConsentQuery) -> Result<bool, ConsentError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.verdict)
    }
}

fn credit_score() -> Scope {
    Scope::from_label("credit_score")
}

fn setup() -> (Arc<InMemoryConsentAuthority>, ConsentGateway) {
    let authority = Arc::new(InMemoryConsentAuthority::new());
    let gateway = ConsentGateway::new(authority.clone());
    (authority, gateway)
}

fn setup_audited(
    authority: Arc<dyn ConsentAuthority>,
) -> (Arc<CollectingSink>, ConsentGateway) {
    let sink = Arc::new(CollectingSink::default());
    let gateway = ConsentGateway::new(authority)
        .with_audit(AuditLogger::with_sink(CryptoSigner::ephemeral(), sink.clone()));
    (sink, gateway)
}

fn grant(authority: &InMemoryConsentAuthority, subject: &str, requester: &str, scope: Scope) {
    authority.grant(subject, requester, &[scope], ChronoDuration::days(7));
}

// --- Concrete scenario ---

#[tokio::test]
async fn test_refused_before_consent_released_after() {
    let (authority, gateway) = setup();
    gateway.register(SUBJECT, credit_score(), PAYLOAD);

    let before = gateway.fetch(LENDER, SUBJECT, credit_score()).await;
    assert_eq!(before, Err(Refusal));

    grant(&authority, SUBJECT, LENDER, credit_score());

    let after = gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap();
    assert_eq!(after.as_str(), Some(PAYLOAD));
}

// --- Fail-closed ---

#[tokio::test]
async fn test_authority_error_refuses_even_with_grant() {
    let (authority, gateway) = setup();
    gateway.register(SUBJECT, credit_score(), PAYLOAD);
    grant(&authority, SUBJECT, LENDER, credit_score());

    for error in [
        ConsentError::Transport("connection reset".to_string()),
        ConsentError::Malformed("result was a string".to_string()),
        ConsentError::Rejected {
            code: 3,
            message: "execution reverted".to_string(),
        },
    ] {
        authority.fail_with(Some(error));
        assert_eq!(gateway.fetch(LENDER, SUBJECT, credit_score()).await, Err(Refusal));
    }

    authority.fail_with(None);
    assert!(gateway.fetch(LENDER, SUBJECT, credit_score()).await.is_ok());
}

#[tokio::test]
async fn test_authority_timeout_refuses() {
    let slow = Arc::new(SlowAuthority {
        delay: Duration::from_secs(5),
        verdict: true,
    });
    let (sink, gateway) = setup_audited(slow);
    let gateway = gateway.with_check_timeout(Duration::from_millis(50));
    gateway.register(SUBJECT, credit_score(), PAYLOAD);

    let started = std::time::Instant::now();
    let outcome = gateway.fetch(LENDER, SUBJECT, credit_score()).await;

    assert_eq!(outcome, Err(Refusal));
    assert!(started.elapsed() < Duration::from_secs(2));
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry.cause, Some("unverified"));
}

// --- Authorization is exact ---

#[tokio::test]
async fn test_consent_for_other_requester_does_not_release() {
    let (authority, gateway) = setup();
    gateway.register(SUBJECT, credit_score(), PAYLOAD);
    grant(&authority, SUBJECT, "0xSOMEONE_ELSE", credit_score());

    assert_eq!(gateway.fetch(LENDER, SUBJECT, credit_score()).await, Err(Refusal));
}

#[tokio::test]
async fn test_consent_for_other_scope_does_not_release() {
    let (authority, gateway) = setup();
    gateway.register(SUBJECT, credit_score(), PAYLOAD);
    grant(&authority, SUBJECT, LENDER, Scope::from_label("income"));

    assert_eq!(gateway.fetch(LENDER, SUBJECT, credit_score()).await, Err(Refusal));
}

#[tokio::test]
async fn test_revoked_consent_refuses_next_fetch() {
    let (authority, gateway) = setup();
    gateway.register(SUBJECT, credit_score(), PAYLOAD);
    grant(&authority, SUBJECT, LENDER, credit_score());

    assert!(gateway.fetch(LENDER, SUBJECT, credit_score()).await.is_ok());
    authority.revoke(SUBJECT, LENDER, credit_score());
    assert_eq!(gateway.fetch(LENDER, SUBJECT, credit_score()).await, Err(Refusal));
}

#[tokio::test]
async fn test_identities_match_case_insensitively() {
    let (authority, gateway) = setup();
    gateway.register("0xAbC", credit_score(), PAYLOAD);
    grant(&authority, "0xabc", "0xlender", credit_score());

    let payload = gateway.fetch("0XLENDER", "0XABC", credit_score()).await.unwrap();
    assert_eq!(payload.as_str(), Some(PAYLOAD));
}

// --- No leakage through absence ---

#[tokio::test]
async fn test_absent_and_unauthorized_refusals_are_identical() {
    let (authority, gateway) = setup();
    gateway.register(SUBJECT, credit_score(), PAYLOAD);

    // Authorized, but nothing registered under this scope
    let empty_scope = Scope::from_label("income");
    grant(&authority, SUBJECT, LENDER, empty_scope);
    let absent = gateway.fetch(LENDER, SUBJECT, empty_scope).await.unwrap_err();

    // Record exists, no consent
    let unauthorized = gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap_err();

    // Authority down
    authority.fail_with(Some(ConsentError::Transport("down".to_string())));
    let unverified = gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap_err();

    assert_eq!(absent, unauthorized);
    assert_eq!(unauthorized, unverified);
    assert_eq!(absent.to_string(), unauthorized.to_string());
    assert_eq!(format!("{:?}", absent), format!("{:?}", unverified));
    assert!(!absent.to_string().contains(SUBJECT));
}

#[tokio::test]
async fn test_audit_distinguishes_causes_internally() {
    let authority = Arc::new(InMemoryConsentAuthority::new());
    let (sink, gateway) = setup_audited(authority.clone());
    gateway.register(SUBJECT, credit_score(), PAYLOAD);

    let _ = gateway.fetch(LENDER, SUBJECT, credit_score()).await;
    grant(&authority, SUBJECT, LENDER, Scope::from_label("income"));
    let _ = gateway
        .fetch(LENDER, SUBJECT, Scope::from_label("income"))
        .await;

    let causes: Vec<_> = sink.entries().iter().map(|e| e.entry.cause).collect();
    assert_eq!(causes, vec![Some("denied"), Some("not_found")]);
}

#[tokio::test]
async fn test_audit_never_contains_payload() {
    let authority = Arc::new(InMemoryConsentAuthority::new());
    let (sink, gateway) = setup_audited(authority.clone());
    gateway.register(SUBJECT, credit_score(), PAYLOAD);
    grant(&authority, SUBJECT, LENDER, credit_score());

    gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap();

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry.event_type, "FetchReleased");
    assert!(!entries[0].canonical.contains("score:720"));
}

// --- Store semantics ---

#[tokio::test]
async fn test_last_write_wins() {
    let (authority, gateway) = setup();
    grant(&authority, SUBJECT, LENDER, credit_score());

    gateway.register(SUBJECT, credit_score(), "p1");
    gateway.register(SUBJECT, credit_score(), "p2");

    let payload = gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap();
    assert_eq!(payload.as_str(), Some("p2"));
    assert_eq!(gateway.record_count(), 1);
}

#[tokio::test]
async fn test_key_isolation() {
    let (authority, gateway) = setup();
    let income = Scope::from_label("income");
    for (subject, scope) in [(SUBJECT, credit_score()), ("0xDEF", credit_score()), (SUBJECT, income)] {
        grant(&authority, subject, LENDER, scope);
    }

    gateway.register(SUBJECT, credit_score(), PAYLOAD);

    assert_eq!(gateway.fetch(LENDER, "0xDEF", credit_score()).await, Err(Refusal));
    assert_eq!(gateway.fetch(LENDER, SUBJECT, income).await, Err(Refusal));

    gateway.register("0xDEF", credit_score(), "other");
    let original = gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap();
    assert_eq!(original.as_str(), Some(PAYLOAD));
}

#[tokio::test]
async fn test_repeated_fetch_is_stable_and_read_only() {
    let (authority, gateway) = setup();
    gateway.register(SUBJECT, credit_score(), PAYLOAD);
    grant(&authority, SUBJECT, LENDER, credit_score());

    let first = gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap();
    let second = gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(gateway.record_count(), 1);
}

#[tokio::test]
async fn test_binary_payload_released_verbatim() {
    let (authority, gateway) = setup();
    let bytes = vec![0u8, 159, 146, 150, 255];
    gateway.register(SUBJECT, credit_score(), bytes.clone());
    grant(&authority, SUBJECT, LENDER, credit_score());

    let payload = gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap();
    assert_eq!(payload.as_bytes(), bytes.as_slice());
}

// --- Concurrency & cancellation ---

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_register_and_fetch() {
    let authority = Arc::new(InMemoryConsentAuthority::new());
    let gateway = Arc::new(ConsentGateway::new(authority.clone()));

    let mut handles = Vec::new();
    for i in 0..32 {
        let subject = format!("0xSUBJECT{}", i);
        grant(&authority, &subject, LENDER, credit_score());
        let gateway = Arc::clone(&gateway);
        handles.push(tokio::spawn(async move {
            gateway.register(subject.as_str(), credit_score(), format!("payload-{}", i));
            gateway.fetch(LENDER, subject.as_str(), credit_score()).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let payload = handle.await.unwrap().unwrap();
        assert_eq!(payload.as_str(), Some(format!("payload-{}", i).as_str()));
    }
    assert_eq!(gateway.record_count(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_to_one_key_never_tear() {
    let authority = Arc::new(InMemoryConsentAuthority::new());
    let gateway = Arc::new(ConsentGateway::new(authority.clone()));
    grant(&authority, SUBJECT, LENDER, credit_score());

    let written: Vec<String> = (0..16).map(|i| format!("RAW{{version:{}}}", i)).collect();
    gateway.register(SUBJECT, credit_score(), written[0].as_str());

    let mut writers = Vec::new();
    for payload in written.iter().cloned() {
        let gateway = Arc::clone(&gateway);
        writers.push(tokio::spawn(async move {
            for _ in 0..20 {
                gateway.register(SUBJECT, credit_score(), payload.as_str());
                tokio::task::yield_now().await;
            }
        }));
    }

    let mut readers = Vec::new();
    for _ in 0..8 {
        let gateway = Arc::clone(&gateway);
        readers.push(tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..20 {
                let payload = gateway
                    .fetch(LENDER, SUBJECT, credit_score())
                    .await
                    .unwrap();
                seen.push(payload.as_str().unwrap().to_string());
            }
            seen
        }));
    }

    for writer in writers {
        writer.await.unwrap();
    }
    for reader in readers {
        for payload in reader.await.unwrap() {
            assert!(written.contains(&payload), "torn payload {}", payload);
        }
    }

    assert_eq!(gateway.record_count(), 1);
    let last = gateway.fetch(LENDER, SUBJECT, credit_score()).await.unwrap();
    assert!(written.iter().any(|p| Some(p.as_str()) == last.as_str()));
}

#[tokio::test]
async fn test_abandoned_fetch_emits_no_audit() {
    let slow = Arc::new(SlowAuthority {
        delay: Duration::from_millis(200),
        verdict: true,
    });
    let (sink, gateway) = setup_audited(slow);
    gateway.register(SUBJECT, credit_score(), PAYLOAD);

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        gateway.fetch(LENDER, SUBJECT, credit_score()),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(sink.entries().is_empty());
}
