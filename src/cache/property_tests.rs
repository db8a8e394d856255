//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the engine's tiering invariants under random
//! operation sequences.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::cache::{Tier, TieredCache};
use crate::storage::{FileStore, SecondaryStore};

// == Strategies ==
/// Small key pool so sequences revisit the same keys across tiers
fn key_strategy() -> impl Strategy<Value = String> {
    "k[0-9]"
}

fn value_strategy() -> impl Strategy<Value = Value> {
    "[a-zA-Z0-9 ]{0,32}".prop_map(|s| json!(s))
}

/// Generates a sequence of facade operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Delete { key: String },
    Sweep,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        2 => Just(CacheOp::Sweep),
    ]
}

/// Engine with an aggressive demotion default and manual sweeps, so random
/// sequences move entries between tiers constantly.
fn demoting_engine() -> (TempDir, Arc<FileStore>, TieredCache) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::new(dir.path()).unwrap());
    let cache = TieredCache::new(Some(Duration::from_millis(1)), None, None, store.clone());
    (dir, store, cache)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // **Property: Map semantics survive tier movements**
    // *For any* sequence of Set/Get/Delete/Sweep operations, the facade
    // SHALL behave exactly like a plain map: Get returns the last Set value,
    // Delete errors only on absent keys, no matter which tier a key sits in.
    #[test]
    fn prop_map_semantics_across_tiers(ops in prop::collection::vec(cache_op_strategy(), 1..40)) {
        tokio_test::block_on(async {
            let (_dir, _store, cache) = demoting_engine();
            let mut model: HashMap<String, Value> = HashMap::new();

            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        cache.set(&key, value.clone(), None, None).await.unwrap();
                        model.insert(key, value);
                    }
                    CacheOp::Get { key } => {
                        let got = cache.get(&key).await;
                        prop_assert_eq!(got.as_ref(), model.get(&key), "Get mismatch for '{}'", key);
                    }
                    CacheOp::Delete { key } => {
                        let result = cache.delete(&key).await;
                        prop_assert_eq!(
                            result.is_ok(),
                            model.remove(&key).is_some(),
                            "Delete outcome mismatch for '{}'",
                            key
                        );
                    }
                    CacheOp::Sweep => {
                        let summary = cache.sweep().await;
                        prop_assert_eq!(summary.failures, 0, "Sweep reported failures");
                    }
                }
            }
            Ok(())
        })?;
    }

    // **Property: Tier exclusivity**
    // *For any* sequence of operations and sweeps, every key SHALL be
    // resident in exactly one place afterwards: in memory with no durable
    // record, in durable storage with a shadow slot, or nowhere at all.
    #[test]
    fn prop_tier_exclusivity(ops in prop::collection::vec(cache_op_strategy(), 1..40)) {
        tokio_test::block_on(async {
            let (_dir, store, cache) = demoting_engine();
            let mut touched: Vec<String> = Vec::new();
            let mut live: HashSet<String> = HashSet::new();

            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        cache.set(&key, value, None, None).await.unwrap();
                        live.insert(key.clone());
                        touched.push(key);
                    }
                    CacheOp::Get { key } => {
                        let _ = cache.get(&key).await;
                        touched.push(key);
                    }
                    CacheOp::Delete { key } => {
                        let _ = cache.delete(&key).await;
                        live.remove(&key);
                        touched.push(key);
                    }
                    CacheOp::Sweep => {
                        cache.sweep().await;
                    }
                }
            }

            for key in &touched {
                match cache.locate(key).await {
                    Some(Tier::Primary) => {
                        prop_assert!(
                            !store.contains(key).await,
                            "'{}' resident in primary but a durable record exists",
                            key
                        );
                    }
                    Some(Tier::Secondary) => {
                        prop_assert!(
                            store.contains(key).await,
                            "'{}' tracked as secondary but no durable record exists",
                            key
                        );
                    }
                    None => {
                        prop_assert!(
                            !live.contains(key),
                            "'{}' was stored but is in neither tier",
                            key
                        );
                        prop_assert!(
                            !store.contains(key).await,
                            "'{}' absent from both tiers but a durable record exists",
                            key
                        );
                    }
                }
                if live.contains(key) {
                    prop_assert!(
                        cache.locate(key).await.is_some(),
                        "live key '{}' has no tier",
                        key
                    );
                }
            }
            Ok(())
        })?;
    }
}

// Separate proptest block with fewer cases for time-sensitive tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    // **Property: Overwrite supersedes the demoted copy**
    // *For any* two values, writing the second after the first was demoted
    // SHALL leave the key primary-resident with the new value and no durable
    // record of the old one.
    #[test]
    fn prop_overwrite_supersedes(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        tokio_test::block_on(async {
            let (_dir, store, cache) = demoting_engine();

            cache.set(&key, value1, None, None).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
            let summary = cache.sweep().await;
            prop_assert_eq!(summary.demoted, 1, "Demotion did not happen");

            // Overwrite pinned to primary so nothing moves afterwards
            cache.set(&key, value2.clone(), None, Some(Duration::ZERO)).await.unwrap();

            prop_assert_eq!(cache.locate(&key).await, Some(Tier::Primary));
            prop_assert!(!store.contains(&key).await, "Stale record survived overwrite");
            prop_assert_eq!(cache.get(&key).await, Some(value2));
            Ok(())
        })?;
    }
}

// == Property Test for Error Response Format ==
// This tests the CacheError -> HTTP response conversion

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property: Error response format**
    // *For any* error condition, the HTTP response SHALL include a JSON body
    // with an "error" field containing a descriptive message.
    #[test]
    fn prop_error_response_format(
        error_msg in "[a-zA-Z0-9 _-]{1,100}"
    ) {
        use crate::error::CacheError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::NotFound(error_msg.clone()),
            CacheError::InvalidKey(error_msg.clone()),
            CacheError::Storage(error_msg.clone()),
        ];

        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let body = response.into_body();
            let bytes = tokio_test::block_on(async {
                to_bytes(body, usize::MAX).await.unwrap()
            });

            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            let error_value = json.get("error");
            prop_assert!(error_value.is_some(), "JSON response should contain 'error' field");

            let error_str = error_value.and_then(|v| v.as_str()).unwrap_or_default();
            prop_assert!(
                error_str.contains(&expected_msg) || expected_msg.contains(error_str),
                "Error message '{}' should relate to expected '{}'",
                error_str,
                expected_msg
            );
        }
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    #[test]
    fn test_error_status_codes() {
        use crate::error::CacheError;
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::InvalidKey("bad".to_string()), StatusCode::BAD_REQUEST),
            (CacheError::Storage("disk".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(
                response.status(),
                expected_status,
                "Error should map to correct HTTP status"
            );
        }
    }
}
