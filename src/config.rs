use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    /// Trailing window for phase evaluation, in days.
    pub phase_window_days: i64,
    /// Trailing window for workout analytics, in days.
    pub analytics_window_days: i64,
    /// How many ISO weeks of trend data to report.
    pub trend_weeks: usize,
    /// Default leaderboard size.
    pub leaderboard_limit: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .unwrap_or(20),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            phase_window_days: env::var("PHASE_WINDOW_DAYS")
                .unwrap_or_else(|_| "28".into())
                .parse()
                .unwrap_or(28),
            analytics_window_days: env::var("ANALYTICS_WINDOW_DAYS")
                .unwrap_or_else(|_| "90".into())
                .parse()
                .unwrap_or(90),
            trend_weeks: env::var("TREND_WEEKS")
                .unwrap_or_else(|_| "8".into())
                .parse()
                .unwrap_or(8),
            leaderboard_limit: env::var("LEADERBOARD_LIMIT")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .unwrap_or(20),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
