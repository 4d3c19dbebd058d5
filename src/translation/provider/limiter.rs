//! 提供者请求限速
//!
//! 所有提供者调用（单键和批量）共享同一个令牌桶，多个并发批量操作也不会
//! 超出提供者的速率限制。

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// 令牌桶限速器
#[derive(Debug)]
pub struct RateLimiter {
    rate_per_second: f64,
    capacity: f64,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// 创建限速器，初始时令牌桶是满的
    pub fn new(rate_per_second: f64, burst: usize) -> Self {
        let capacity = burst.max(1) as f64;
        Self {
            rate_per_second: rate_per_second.max(f64::MIN_POSITIVE),
            capacity,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// 获取一个令牌，必要时异步等待
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                self.refill(&mut state);

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }

                let missing = 1.0 - state.tokens;
                Duration::from_secs_f64(missing / self.rate_per_second)
            };

            tracing::trace!("提供者限速，等待 {:?}", wait);
            sleep(wait).await;
        }
    }

    /// 当前可用令牌数（向下取整）
    pub async fn available(&self) -> usize {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        state.tokens.floor() as usize
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate_per_second).min(self.capacity);
        state.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_is_immediate() {
        let limiter = RateLimiter::new(1.0, 3);
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(limiter.available().await, 0);
    }

    #[tokio::test]
    async fn test_waits_when_bucket_empty() {
        let limiter = RateLimiter::new(20.0, 1);
        limiter.acquire().await;

        let start = Instant::now();
        limiter.acquire().await;
        // 20 次/秒 => 约 50ms 补充一个令牌
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
