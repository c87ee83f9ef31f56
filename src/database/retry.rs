use crate::error::{AppError, AppResult};
use sea_orm::DbErr;
use std::future::Future;

/// 事务最多尝试次数（含首次）
pub const MAX_TX_ATTEMPTS: u32 = 3;

/// 以事务为单位整体重试
///
/// `op` 每次调用都必须开启新的事务; 仅对 [`AppError::is_retryable`] 的错误重试,
/// 校验/权限类错误直接返回。重试耗尽后返回最后一次的错误。
pub async fn with_retry<T, F, Fut>(op_name: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_retryable() => {
                if attempt >= MAX_TX_ATTEMPTS {
                    log::error!("{op_name}: giving up after {attempt} attempts: {e}");
                    return Err(e);
                }
                log::warn!("{op_name}: retrying after attempt {attempt} failed: {e}");
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// 条件更新未命中任何行 (`UPDATE ... WHERE <旧值>`) 视为并发冲突
pub fn conflict_on_stale(what: &'static str) -> impl FnOnce(DbErr) -> AppError {
    move |err| match err {
        DbErr::RecordNotUpdated => AppError::Conflict(format!("{what} was modified concurrently")),
        other => AppError::DatabaseError(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_conflicts_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry("test", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::Conflict("stale read".into()))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: AppResult<()> = with_retry("test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Conflict("always".into()))
        })
        .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_TX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_does_not_retry_validation() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: AppResult<()> = with_retry("test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::ValidationError("bad".into()))
        })
        .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_update_becomes_conflict() {
        let err = conflict_on_stale("order")(DbErr::RecordNotUpdated);
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(err.is_retryable());

        let err = conflict_on_stale("order")(DbErr::Custom("boom".into()));
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
