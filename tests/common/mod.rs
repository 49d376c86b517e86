use std::sync::Once;

static INIT: Once = Once::new();

/// Configures the process once for router tests. No server is started and no
/// database is reached; the pool is created lazily and never connected.
pub fn init() {
    INIT.call_once(|| {
        std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        std::env::set_var(
            "DATABASE_URL",
            "postgres://postgres@127.0.0.1:1/leadhub_test",
        );
        std::env::set_var("JWT_SECRET", "router-test-secret");
        std::env::set_var("ENVIRONMENT", "test");
        let _ = leadhub_backend::config::init_config();
    });
}

pub fn test_state() -> leadhub_backend::AppState {
    init();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&leadhub_backend::config::get_config().database_url)
        .expect("lazy pool");
    leadhub_backend::AppState::new(pool).expect("app state")
}

pub fn app() -> axum::Router {
    leadhub_backend::app(test_state())
}
