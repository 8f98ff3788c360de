use std::time::{Duration, Instant};

/// バナーを表示しておく時間
pub const BANNER_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// ユーザー保存結果のバナー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    shown_at: Instant,
}

impl Banner {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self::new(BannerKind::Success, message, Instant::now())
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::new(BannerKind::Error, message, Instant::now())
    }

    pub fn new<S: Into<String>>(kind: BannerKind, message: S, shown_at: Instant) -> Self {
        Self {
            kind,
            message: message.into(),
            shown_at,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= BANNER_DURATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_expires_after_three_seconds() {
        let shown_at = Instant::now();
        let banner = Banner::new(BannerKind::Success, "User created successfully!", shown_at);

        assert!(!banner.is_expired_at(shown_at));
        assert!(!banner.is_expired_at(shown_at + Duration::from_millis(2999)));
        assert!(banner.is_expired_at(shown_at + BANNER_DURATION));
    }
}
