//! End-to-end session tests for lockbox-core
//!
//! Every test runs against a real DuckDB file in a temp directory. A "restart"
//! drops the whole context and opens a new one on the same directory.
//!
//! Run with: cargo test --test session_flow_test -- --nocapture

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use lockbox_core::adapters::DuckDbStore;
use lockbox_core::ports::KeyValueStore;
use lockbox_core::{EntryPoint, Error, LockboxContext, OperationResult, SessionState, User};

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("lockbox_core=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Open a context on `dir` and run the startup restore
async fn open(dir: &TempDir) -> LockboxContext {
    let ctx = LockboxContext::new(dir.path(), EntryPoint::Mobile)
        .expect("Failed to create context");
    ctx.session.restore().await;
    ctx
}

async fn raw(ctx: &LockboxContext, key: &str) -> Option<String> {
    ctx.store.get(key).await.expect("Failed to read store")
}

// ============================================================================
// Walkthrough
// ============================================================================

/// Signup, logout, login for one account, then a rejected second signup
#[tokio::test]
async fn test_alice_and_bob_walkthrough() {
    let dir = TempDir::new().unwrap();
    let ctx = open(&dir).await;
    assert_eq!(ctx.session.state(), SessionState::Unauthenticated);

    let alice = ctx.session.signup("Alice", "alice@x.com", "secret1").await.unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.email, "alice@x.com");
    assert_eq!(alice.password, "secret1");
    assert!(!alice.id.is_empty());
    assert_eq!(ctx.session.state(), SessionState::Authenticated(alice.clone()));

    ctx.session.logout().await.unwrap();
    assert_eq!(ctx.session.state(), SessionState::Unauthenticated);
    assert_eq!(ctx.user_store.load_all().await.unwrap(), vec![alice.clone()]);

    ctx.session.login("alice@x.com", "secret1").await.unwrap();
    assert_eq!(ctx.session.state(), SessionState::Authenticated(alice.clone()));

    let err = ctx.session.signup("Bob", "bob@x.com", "123").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(ctx.user_store.load_all().await.unwrap(), vec![alice]);
}

// ============================================================================
// Restart Tests
// ============================================================================

/// A logged-in session comes back after the process restarts
#[tokio::test]
async fn test_session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let alice = {
        let ctx = open(&dir).await;
        ctx.session.signup("Alice", "alice@x.com", "secret1").await.unwrap()
    };

    let ctx = open(&dir).await;
    assert_eq!(ctx.session.current_user(), Some(alice));
    assert!(!ctx.session.is_loading());
}

/// After logout the restart is logged out, but the account still works
#[tokio::test]
async fn test_logout_survives_restart_and_account_remains() {
    let dir = TempDir::new().unwrap();
    {
        let ctx = open(&dir).await;
        ctx.session.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        ctx.session.logout().await.unwrap();
    }

    let ctx = open(&dir).await;
    assert_eq!(ctx.session.state(), SessionState::Unauthenticated);
    assert_eq!(ctx.user_store.load_all().await.unwrap().len(), 1);

    let user = ctx.session.login("alice@x.com", "secret1").await.unwrap();
    assert_eq!(raw(&ctx, "currentUserId").await, Some(user.id));
}

/// A pointer to a removed account restores as logged out, with no error
#[tokio::test]
async fn test_removed_user_restores_unauthenticated() {
    let dir = TempDir::new().unwrap();
    {
        let ctx = open(&dir).await;
        let alice = ctx.session.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        assert!(ctx.session.remove_user(&alice.id).await.unwrap());
        // Pointer is still there
        assert_eq!(raw(&ctx, "currentUserId").await, Some(alice.id));
    }

    let ctx = open(&dir).await;
    assert_eq!(ctx.session.state(), SessionState::Unauthenticated);
}

/// Corrupt user data degrades restore, while direct reads still fail loudly
#[tokio::test]
async fn test_corrupt_users_degrade_restore() {
    let dir = TempDir::new().unwrap();
    {
        let ctx = open(&dir).await;
        ctx.session.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        ctx.store.set("users", "[{\"id\": 1").await.unwrap();
    }

    let ctx = open(&dir).await;
    assert_eq!(ctx.session.state(), SessionState::Unauthenticated);
    assert!(ctx.user_store.load_all().await.unwrap_err().is_storage());

    let errors = ctx.event_log.as_ref().unwrap().get_errors(10).unwrap();
    assert!(errors.iter().any(|e| e.event == "session_restore_failed"));
}

// ============================================================================
// User Store Invariants
// ============================================================================

/// Signups with distinct emails all persist, in order
#[tokio::test]
async fn test_distinct_signups_persist_in_order() {
    let dir = TempDir::new().unwrap();
    let ctx = open(&dir).await;

    let mut created = Vec::new();
    for i in 0..5 {
        let user = ctx
            .session
            .signup(&format!("User {}", i), &format!("user{}@x.com", i), "secret1")
            .await
            .unwrap();
        created.push(user);
    }

    assert_eq!(ctx.user_store.load_all().await.unwrap(), created);
}

/// A duplicate email is rejected and the stored bytes do not change
#[tokio::test]
async fn test_duplicate_email_leaves_store_unchanged() {
    let dir = TempDir::new().unwrap();
    let ctx = open(&dir).await;
    ctx.session.signup("Alice", "alice@x.com", "secret1").await.unwrap();
    let before = raw(&ctx, "users").await;

    let err = ctx
        .session
        .signup("Alice Again", "alice@x.com", "secret9")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Email already exists");
    assert_eq!(raw(&ctx, "users").await, before);
}

/// A wrong password touches neither the users nor the pointer
#[tokio::test]
async fn test_wrong_password_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let ctx = open(&dir).await;
    ctx.session.signup("Alice", "alice@x.com", "secret1").await.unwrap();
    ctx.session.logout().await.unwrap();
    let users_before = raw(&ctx, "users").await;

    let err = ctx.session.login("alice@x.com", "secret2").await.unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
    assert_eq!(raw(&ctx, "users").await, users_before);
    assert_eq!(raw(&ctx, "currentUserId").await, None);
}

// ============================================================================
// Persisted Layout
// ============================================================================

/// `users` is a JSON array of plain objects, `currentUserId` a bare id
#[tokio::test]
async fn test_persisted_layout() {
    let dir = TempDir::new().unwrap();
    let ctx = open(&dir).await;
    let alice = ctx.session.signup("Alice", "alice@x.com", "secret1").await.unwrap();

    let users: serde_json::Value = serde_json::from_str(&raw(&ctx, "users").await.unwrap()).unwrap();
    assert_eq!(
        users,
        serde_json::json!([{
            "id": alice.id,
            "name": "Alice",
            "email": "alice@x.com",
            "password": "secret1"
        }])
    );
    assert_eq!(raw(&ctx, "currentUserId").await.as_deref(), Some(alice.id.as_str()));
}

/// Data written by another tool in the same layout is picked up on restore
#[tokio::test]
async fn test_restores_externally_written_data() {
    let dir = TempDir::new().unwrap();
    {
        let store = DuckDbStore::new(&dir.path().join("lockbox.duckdb")).unwrap();
        let users = vec![User::new("1700000000000", "Carol", "carol@x.com", "pa55word")];
        store
            .set("users", &serde_json::to_string(&users).unwrap())
            .await
            .unwrap();
        store.set("currentUserId", "1700000000000").await.unwrap();
    }

    let ctx = open(&dir).await;
    assert_eq!(
        ctx.session.current_user().map(|u| u.name),
        Some("Carol".to_string())
    );
}

// ============================================================================
// Collaborator Envelope
// ============================================================================

/// Results convert into the serializable envelope UI bridges consume
#[tokio::test]
async fn test_operation_result_envelope() {
    let ctx = LockboxContext::in_memory();
    ctx.session.restore().await;

    let ok: OperationResult<User> = ctx
        .session
        .signup("Alice", "alice@x.com", "secret1")
        .await
        .into();
    assert!(ok.success);
    assert_eq!(ok.data.map(|u| u.email), Some("alice@x.com".to_string()));

    let failed: OperationResult<User> = ctx.session.login("alice@x.com", "nope").await.into();
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "invalid_credentials");
    assert_eq!(json["error"], "Invalid credentials");
}

/// The in-memory context keeps nothing between instances
#[tokio::test]
async fn test_in_memory_context_is_volatile() {
    {
        let ctx = LockboxContext::in_memory();
        ctx.session.restore().await;
        ctx.session.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        assert!(ctx.data_dir.is_none());
        assert!(ctx.event_log.is_none());
    }

    let ctx = LockboxContext::in_memory();
    ctx.session.restore().await;
    assert_eq!(ctx.session.state(), SessionState::Unauthenticated);
    assert!(ctx.user_store.load_all().await.unwrap().is_empty());
}
