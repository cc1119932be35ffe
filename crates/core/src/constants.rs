/// Reserved demo-mode email. Checked before any gateway call.
pub const DEMO_EMAIL: &str = "maria@email.com";

/// Reserved demo-mode password.
pub const DEMO_PASSWORD: &str = "password123";

/// Simulated sign-in delay for demo mode, so consumers exercise their
/// loading states.
pub const DEMO_LOGIN_DELAY_MS: u64 = 500;

/// The high-expense rule only fires once strictly more than this many
/// approved expenses exist in the history.
pub const HIGH_EXPENSE_MIN_HISTORY: usize = 5;

/// Number of transactions surfaced by the dashboard's recent list.
pub const RECENT_TRANSACTIONS_LIMIT: usize = 5;

/// Months covered by the statistics page's temporal evolution, counting
/// the current month.
pub const MONTHLY_SUMMARY_WINDOW: u32 = 6;
