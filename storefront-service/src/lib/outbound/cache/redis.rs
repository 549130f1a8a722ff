use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::RedisError;
use redis::RedisResult;
use redis::Script;

use crate::domain::session::errors::SessionStoreError;
use crate::domain::session::ports::SessionStore;
use crate::domain::user::models::UserId;

const KEY_PREFIX: &str = "refresh_token:";

/// Compare-and-swap on a single key: overwrite only if the current value is ARGV[1].
const ROTATE_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
    return 1
end
return 0
"#;

/// Refresh token ledger stored in Redis, one key per user.
pub struct RedisSessionStore {
    connection: ConnectionManager,
    timeout: Duration,
    rotate_script: Script,
}

impl RedisSessionStore {
    /// Create a store on top of an established connection manager.
    ///
    /// Every command is abandoned with `Timeout` once `timeout` elapses.
    pub fn new(connection: ConnectionManager, timeout: Duration) -> Self {
        Self {
            connection,
            timeout,
            rotate_script: Script::new(ROTATE_SCRIPT),
        }
    }

    async fn bounded<T, F>(&self, command: F) -> Result<T, SessionStoreError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        tokio::time::timeout(self.timeout, command)
            .await
            .map_err(|_| SessionStoreError::Timeout(self.timeout.as_millis() as u64))?
            .map_err(|e| SessionStoreError::Unavailable(e.to_string()))
    }
}

pub fn session_key(user_id: &UserId) -> String {
    format!("{}{}", KEY_PREFIX, user_id)
}

/// Redis rejects `EX 0`, so sub-second TTLs are rounded up.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn store(
        &self,
        user_id: &UserId,
        token: &str,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let mut connection = self.connection.clone();
        let key = session_key(user_id);

        self.bounded(async move {
            let _: () = connection.set_ex(key, token, ttl_secs(ttl)).await?;
            Ok::<_, RedisError>(())
        })
        .await?;

        tracing::debug!(user_id = %user_id, ttl_secs = ttl_secs(ttl), "Refresh token stored");
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<String>, SessionStoreError> {
        let mut connection = self.connection.clone();
        let key = session_key(user_id);

        self.bounded(async move {
            let token: Option<String> = connection.get(key).await?;
            Ok::<_, RedisError>(token)
        })
        .await
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), SessionStoreError> {
        let mut connection = self.connection.clone();
        let key = session_key(user_id);

        self.bounded(async move {
            let _: () = connection.del(key).await?;
            Ok::<_, RedisError>(())
        })
        .await
    }

    async fn rotate(
        &self,
        user_id: &UserId,
        expected: &str,
        replacement: &str,
        ttl: Duration,
    ) -> Result<bool, SessionStoreError> {
        let mut connection = self.connection.clone();
        let mut invocation = self.rotate_script.key(session_key(user_id));
        invocation.arg(expected).arg(replacement).arg(ttl_secs(ttl));

        let swapped = self
            .bounded(async move {
                let swapped: i32 = invocation.invoke_async(&mut connection).await?;
                Ok::<_, RedisError>(swapped)
            })
            .await?;

        Ok(swapped == 1)
    }
}
