use crate::rate_limit::RateLimiter;

// App's shared state
pub struct AppState {
    pub client: reqwest::Client,
    pub upstream_url: String,
    pub rate_limiter: RateLimiter,
    pub history_limit: usize,
    pub default_model: String,
}
