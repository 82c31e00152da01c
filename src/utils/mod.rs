pub mod patterns;
pub mod rate_limiter;

pub use patterns::PatternUtils;
pub use rate_limiter::RateLimiter;
