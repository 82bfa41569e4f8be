// ────────────────────────────────────────────────────────────────
//  rabbithole-embed — integration tests
//
//  Strategy:
//    • HashVectorizer is fully exercised (deterministic, no fixtures).
//    • RemoteVectorizer is tested for construction and graceful
//      connection failure; real providers are out of test scope.
//    • The Vectorizer trait is checked for object safety since the
//      orchestrator holds it as Box<dyn Vectorizer>.
// ────────────────────────────────────────────────────────────────

use rabbithole_embed::{from_env, EmbedError, HashVectorizer, RemoteVectorizer, Vectorizer};

#[tokio::test]
async fn hash_vectorizer_contract() {
    let v = HashVectorizer::new(384).expect("new");
    let out = v.vectorize("the rabbit hole goes deeper").await.expect("vectorize");

    assert_eq!(out.len(), 384);
    let norm_sq: f64 = out.iter().map(|x| f64::from(*x).powi(2)).sum();
    assert!((norm_sq - 1.0).abs() < 1e-6, "norm² = {norm_sq}");
}

#[tokio::test]
async fn hash_vectorizer_deterministic_across_instances() {
    let a = HashVectorizer::new(96).expect("new");
    let b = HashVectorizer::new(96).expect("new");
    assert_eq!(
        a.vectorize("same text").await.expect("a"),
        b.vectorize("same text").await.expect("b"),
    );
}

#[tokio::test]
async fn vectorizer_trait_dispatch_via_dyn() {
    let v: Box<dyn Vectorizer> = Box::new(HashVectorizer::new(32).expect("new"));
    let out = v.vectorize("boxed").await.expect("vectorize");
    assert_eq!(out.len(), 32);
    assert_eq!(v.dimension(), 32);
}

#[tokio::test]
async fn remote_vectorizer_reports_zero_dim_until_first_call() {
    let v = RemoteVectorizer::new(
        "http://localhost:9999/v1/embeddings".into(),
        Some("key".into()),
        "all-MiniLM-L6-v2".into(),
    );
    assert_eq!(v.dimension(), 0);
}

#[tokio::test]
async fn remote_vectorizer_connection_error() {
    let v = RemoteVectorizer::new(
        "http://127.0.0.1:1/v1/embeddings".into(),
        None,
        "model".into(),
    );
    let err = v.vectorize("test").await.unwrap_err();
    assert!(matches!(err, EmbedError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn from_env_defaults_to_hash_backend() {
    // no RABBITHOLE_EMBED_BACKEND in the test environment
    let v = from_env().expect("from_env");
    let out = v.vectorize("default backend").await.expect("vectorize");
    assert_eq!(out.len(), v.dimension());
    assert!(v.dimension() > 0);
}
