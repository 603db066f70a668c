//! End-to-end tests for the dialog event package engine:
//! publish pipeline, aggregate generation, version numbering, and the
//! content-type gate.

use std::sync::{Arc, Once};
use std::time::Duration;

use pretty_assertions::assert_eq;
use sipevent_dialog_info::{
    AliasTable, DialogEventEngine, DialogInfoError, FragmentStore, InstancePrefix,
    MemoryFragmentStore, DIALOG_INFO_CONTENT_TYPE,
};

const TTL: Duration = Duration::from_secs(3600);

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

fn engine_with_prefix(store: Arc<MemoryFragmentStore>, prefix: &str) -> DialogEventEngine {
    DialogEventEngine::with_prefix(store, InstancePrefix::new(prefix))
}

fn envelope(entity: &str, dialogs: &str) -> String {
    format!(
        r#"<?xml version="1.0"?><dialog-info xmlns="urn:ietf:params:xml:ns:dialog-info" version="0" state="full" entity="{entity}">{dialogs}</dialog-info>"#
    )
}

#[tokio::test]
async fn test_empty_aggregate_round_trip() {
    init_logging();
    let engine = DialogEventEngine::new(Arc::new(MemoryFragmentStore::new()));

    let content = engine.notify("sip:nobody@example.org", &[]).await.unwrap();
    assert_eq!(content.version, 1);
    assert_eq!(content.content_type, DIALOG_INFO_CONTENT_TYPE);
    assert_eq!(
        content.body,
        "<?xml version=\"1.0\"?>\n\
         <dialog-info xmlns=\"urn:ietf:params:xml:ns:dialog-info\"\n\
         \x20            version=\"1\" state=\"full\"\n\
         \x20            entity=\"sip:nobody@example.org\">\n\
         </dialog-info>\n"
    );
}

#[tokio::test]
async fn test_versions_strictly_increase_per_subject() {
    init_logging();
    let engine = DialogEventEngine::new(Arc::new(MemoryFragmentStore::new()));

    let first = engine.notify("sip:a@example.org", &[]).await.unwrap();
    let second = engine.notify("sip:a@example.org", &[]).await.unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);
    assert!(second.body.contains("version=\"2\""));

    // a different subject has its own counter
    let other = engine.notify("sip:b@example.org", &[]).await.unwrap();
    assert_eq!(other.version, 1);
}

#[tokio::test]
async fn test_no_version_repeats_under_concurrent_notifies() {
    init_logging();
    let engine = Arc::new(DialogEventEngine::new(Arc::new(MemoryFragmentStore::new())));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let mut versions = Vec::new();
            for _ in 0..25 {
                let content = engine.notify("sip:busy@example.org", &[]).await.unwrap();
                versions.push(content.version);
            }
            versions
        }));
    }

    let mut seen = std::collections::HashSet::new();
    for handle in handles {
        for version in handle.await.unwrap() {
            assert!(seen.insert(version), "version {version} issued twice");
        }
    }
    assert_eq!(seen.len(), 100);
}

#[tokio::test]
async fn test_publishers_with_same_local_id_do_not_collide() {
    init_logging();
    let store = Arc::new(MemoryFragmentStore::new());
    let engine_one = engine_with_prefix(store.clone(), "node1");
    let engine_two = engine_with_prefix(store.clone(), "node2");
    let subject = "sip:shared@example.org";

    let doc = envelope(subject, r#"<dialog id="42"><state>early</state></dialog>"#);
    engine_one.publish(subject, &doc, TTL).await.unwrap();
    engine_two.publish(subject, &doc, TTL).await.unwrap();

    let stored = store.fetch_all(subject).await;
    let ids: Vec<_> = stored.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["node1-42", "node2-42"]);
}

#[tokio::test]
async fn test_republish_replaces_rather_than_appends() {
    init_logging();
    let store = Arc::new(MemoryFragmentStore::new());
    let engine = engine_with_prefix(store.clone(), "node1");
    let subject = "sip:alice@example.org";

    let early = envelope(subject, r#"<dialog id="42"><state>early</state></dialog>"#);
    let confirmed = envelope(subject, r#"<dialog id="42"><state>confirmed</state></dialog>"#);
    engine.publish(subject, &early, TTL).await.unwrap();
    engine.publish(subject, &confirmed, TTL).await.unwrap();

    let stored = store.fetch_all(subject).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, "node1-42");
    assert!(stored[0].xml.contains("<state>confirmed</state>"));
}

#[tokio::test]
async fn test_bad_documents_leave_store_untouched() {
    init_logging();
    let store = Arc::new(MemoryFragmentStore::new());
    let engine = engine_with_prefix(store.clone(), "node1");
    let subject = "sip:alice@example.org";

    let truncated = r#"<?xml version="1.0"?><dialog-info version="1" entity="sip:a@b"><dia"#;
    let wrong_root = r#"<presence entity="sip:a@b" version="1"></presence>"#;
    let missing_entity = envelope(subject, "").replace(r#" entity="sip:alice@example.org""#, "");

    for input in [truncated, wrong_root, missing_entity.as_str()] {
        let err = engine.publish(subject, input, TTL).await.unwrap_err();
        assert!(matches!(err, DialogInfoError::BadDocument(_)));
    }
    assert!(store.fetch_all(subject).await.is_empty());
}

#[tokio::test]
async fn test_prefixed_root_publishes_like_bare_root() {
    init_logging();
    let store = Arc::new(MemoryFragmentStore::new());
    let engine = engine_with_prefix(store.clone(), "node1");
    let subject = "sip:alice@example.org";

    let prefixed = format!(
        r#"<?xml version="1.0"?><di:dialog-info xmlns:di="urn:ietf:params:xml:ns:dialog-info" version="0" state="full" entity="{subject}"><di:dialog id="7"/></di:dialog-info>"#
    );
    let receipt = engine.publish(subject, &prefixed, TTL).await.unwrap();
    assert_eq!(receipt.entity, subject);
    assert_eq!(receipt.fragment_ids, vec!["node1-7".to_string()]);
}

#[tokio::test]
async fn test_regression_yxa_single_dialog_document() {
    init_logging();
    let store = Arc::new(MemoryFragmentStore::new());
    let engine = engine_with_prefix(store.clone(), "node1");
    let subject = "sip:dialog1@yxa.sipit.net";

    let dialog = r#"<dialog id="(null)" call-id="hpabltqlp@host.example.net" local-tag="7f3n2l2910" remote-tag="f8an2p108p" direction="initiator"><state>confirmed</state><local><identity>sip:dialog1@yxa.sipit.net</identity></local><remote><identity>sip:caller@example.net</identity></remote></dialog>"#;
    let receipt = engine
        .publish(subject, &envelope(subject, dialog), TTL)
        .await
        .unwrap();
    assert_eq!(receipt.version, "0");
    assert_eq!(receipt.entity, subject);

    let stored = store.fetch_all(subject).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, "node1-(null)");
    assert_eq!(
        stored[0].xml,
        dialog.replace(r#"id="(null)""#, r#"id="node1-(null)""#)
    );

    let content = engine.notify(subject, &[]).await.unwrap();
    assert_eq!(
        content.body,
        format!(
            "<?xml version=\"1.0\"?>\n\
             <dialog-info xmlns=\"urn:ietf:params:xml:ns:dialog-info\"\n\
             \x20            version=\"1\" state=\"full\"\n\
             \x20            entity=\"{subject}\">\n\
             {fragment}\n</dialog-info>\n",
            fragment = stored[0].xml
        )
    );
}

#[tokio::test]
async fn test_notify_refuses_foreign_content_types() {
    init_logging();
    let engine = DialogEventEngine::new(Arc::new(MemoryFragmentStore::new()));

    let err = engine
        .notify(
            "sip:alice@example.org",
            &["application/pidf+xml".to_string()],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DialogInfoError::UnsupportedContentType(_)));

    // a refused notify must not burn a version number
    let content = engine.notify("sip:alice@example.org", &[]).await.unwrap();
    assert_eq!(content.version, 1);
}

#[tokio::test]
async fn test_legacy_subject_alias_is_applied_on_notify() {
    init_logging();
    let store = Arc::new(MemoryFragmentStore::new());
    let engine = engine_with_prefix(store.clone(), "node1");
    let canonical = "sip:dialog1@yxa.sipit.net";

    let doc = envelope(canonical, r#"<dialog id="1"><state>trying</state></dialog>"#);
    engine.publish(canonical, &doc, TTL).await.unwrap();

    let content = engine.notify("sip:dialog@yxa.sipit.net", &[]).await.unwrap();
    assert!(content.body.contains(r#"entity="sip:dialog1@yxa.sipit.net""#));
    assert!(content.body.contains("<state>trying</state>"));
}

#[tokio::test]
async fn test_aliasing_can_be_disabled() {
    init_logging();
    let store = Arc::new(MemoryFragmentStore::new());
    let engine =
        engine_with_prefix(store.clone(), "node1").with_aliases(AliasTable::empty());

    let content = engine.notify("sip:dialog@yxa.sipit.net", &[]).await.unwrap();
    assert!(content.body.contains(r#"entity="sip:dialog@yxa.sipit.net""#));
}
