//! Redis tests. The ones that need a server are ignored by default; run
//! them with `REDIS_URL` set and `--ignored`.

use chrono::{Duration, Utc};

use ec_core::repositories::RevocationStore;
use ec_shared::config::CacheConfig;

use super::revocation_cache::ttl_seconds;
use super::{RedisClient, RedisRevocationStore};

#[test]
fn test_ttl_rounds_up_partial_seconds() {
    let now = Utc::now();
    assert_eq!(ttl_seconds(now + Duration::milliseconds(1500), now), Some(2));
    assert_eq!(ttl_seconds(now + Duration::seconds(60), now), Some(60));
    assert_eq!(ttl_seconds(now, now), None);
    assert_eq!(ttl_seconds(now - Duration::seconds(1), now), None);
}

fn test_config() -> CacheConfig {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    CacheConfig::new(url).with_key_prefix(format!("ec-test-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
#[ignore]
async fn test_revoked_jti_visible_until_expiry() {
    let client = RedisClient::new(test_config()).await.unwrap();
    let store = RedisRevocationStore::new(client.clone());

    store
        .revoke("jti-1", Utc::now() + Duration::seconds(30))
        .await
        .unwrap();

    assert!(store.is_revoked("jti-1").await.unwrap());
    assert!(!store.is_revoked("jti-2").await.unwrap());

    let ttl = client.ttl(&client.key(&["revoked", "jti-1"])).await.unwrap();
    assert!(ttl > 0 && ttl <= 30);
}

#[tokio::test]
#[ignore]
async fn test_expired_token_not_written() {
    let client = RedisClient::new(test_config()).await.unwrap();
    let store = RedisRevocationStore::new(client);

    store
        .revoke("old", Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    assert!(!store.is_revoked("old").await.unwrap());
}
