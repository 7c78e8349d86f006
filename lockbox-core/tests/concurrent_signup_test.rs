//! Concurrent signup tests
//!
//! Signup rewrites the whole `users` collection. These tests hammer one
//! context from many tasks at once and check that no record is lost.
//!
//! Run with: cargo test --test concurrent_signup_test -- --nocapture

use std::collections::HashSet;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::Barrier;

use lockbox_core::domain::SignupForm;
use lockbox_core::{EntryPoint, LockboxContext};

/// Number of concurrent tasks for stress tests.
const TASK_COUNT: usize = 6;

/// Number of signups per task
const SIGNUPS_PER_TASK: usize = 5;

/// Many tasks creating users through one UserStore, all on a DuckDB file
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_lose_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = Arc::new(LockboxContext::new(temp_dir.path(), EntryPoint::Mobile).unwrap());
    ctx.session.restore().await;

    let barrier = Arc::new(Barrier::new(TASK_COUNT));
    let mut handles = vec![];

    for task_id in 0..TASK_COUNT {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            for i in 0..SIGNUPS_PER_TASK {
                let form = SignupForm::new(
                    format!("User {}-{}", task_id, i),
                    format!("t{}_i{}@x.com", task_id, i),
                    "secret1",
                );
                ctx.user_store.create(form).await.unwrap();
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let users = ctx.user_store.load_all().await.unwrap();
    assert_eq!(users.len(), TASK_COUNT * SIGNUPS_PER_TASK);

    let ids: HashSet<_> = users.iter().map(|u| u.id.as_str()).collect();
    let emails: HashSet<_> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(ids.len(), users.len(), "ids must be unique");
    assert_eq!(emails.len(), users.len(), "emails must be unique");
}

/// Racing signups for the same email: exactly one wins
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_email_single_winner() {
    let ctx = Arc::new(LockboxContext::in_memory());
    ctx.session.restore().await;

    let barrier = Arc::new(Barrier::new(TASK_COUNT));
    let mut handles = vec![];

    for task_id in 0..TASK_COUNT {
        let ctx = Arc::clone(&ctx);
        let barrier = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            ctx.session
                .signup(&format!("Racer {}", task_id), "same@x.com", "secret1")
                .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(e.to_string(), "Email already exists"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(ctx.user_store.load_all().await.unwrap().len(), 1);
    assert!(ctx.session.state().is_authenticated());
}
