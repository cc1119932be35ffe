//! Session controller.
//!
//! `AppContext` owns the signed-in user, the four entity collections, and
//! the session lifecycle. Consumers read cloned snapshots and route every
//! mutation through the operations here; the collections themselves are
//! never handed out by reference.
//!
//! Storage is reached exclusively through the repository traits in
//! [`Backends`]. A live session talks to the remote gateway, a demo session
//! swaps in the in-memory backend set, and no operation ever branches on
//! the mode itself.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::alerts::{
    default_rules, AlertRule, NewSmartAlert, RuleEvent, SmartAlert, SmartAlertRepositoryTrait,
};
use crate::auth::{AuthEvent, AuthProviderTrait, SessionArtifactsTrait};
use crate::constants::{DEMO_EMAIL, DEMO_LOGIN_DELAY_MS, DEMO_PASSWORD};
use crate::constants::{MONTHLY_SUMMARY_WINDOW, RECENT_TRANSACTIONS_LIMIT};
use crate::demo::DemoDataset;
use crate::errors::{AuthError, Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::goals::{
    NewSavingGoal, SavingGoal, SavingGoalRepositoryTrait, SavingGoalUpdate,
};
use crate::insights::{
    category_breakdown, dashboard_stats, monthly_summaries, recent_transactions, CategoryTotals,
    DashboardStats, MonthlySummary,
};
use crate::recurring::{
    next_due_date, NewRecurringTransaction, RecurringRepositoryTrait, RecurringTransaction,
    RecurringUpdate,
};
use crate::store::demo_backends;
use crate::transactions::{
    NewTransaction, Transaction, TransactionRepositoryTrait, TransactionStatus, TransactionType,
    TransactionUpdate,
};
use crate::users::{ProfileRepositoryTrait, ProfileUpdate, User};

/// Origin of the data behind an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Live,
    Demo,
}

/// Lifecycle state of the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Constructed, `initialize` not called yet.
    Uninitialized,
    /// A sign-in or session restore is in flight.
    Loading,
    /// No signed-in user.
    Unauthenticated,
    Authenticated(SessionMode),
}

/// One complete set of storage backends behind the repository seam.
#[derive(Clone)]
pub struct Backends {
    pub auth: Arc<dyn AuthProviderTrait>,
    pub artifacts: Arc<dyn SessionArtifactsTrait>,
    pub profiles: Arc<dyn ProfileRepositoryTrait>,
    pub transactions: Arc<dyn TransactionRepositoryTrait>,
    pub goals: Arc<dyn SavingGoalRepositoryTrait>,
    pub recurring: Arc<dyn RecurringRepositoryTrait>,
    pub alerts: Arc<dyn SmartAlertRepositoryTrait>,
}

/// User-facing outcome of a registration attempt. Registration never
/// authenticates the caller, so failures travel as a message instead of an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOutcome {
    pub success: bool,
    pub message: String,
}

pub struct AppContext {
    live: Backends,
    /// Backend set of the active demo session, if any. While this is
    /// `Some`, every operation resolves against it instead of `live`.
    demo: RwLock<Option<Backends>>,
    phase: RwLock<SessionPhase>,
    current_user: RwLock<Option<User>>,
    transactions: RwLock<Vec<Transaction>>,
    goals: RwLock<Vec<SavingGoal>>,
    recurring: RwLock<Vec<RecurringTransaction>>,
    alerts: RwLock<Vec<SmartAlert>>,
    rules: Vec<Arc<dyn AlertRule>>,
    events: Arc<dyn DomainEventSink>,
}

impl AppContext {
    pub fn new(live: Backends, events: Arc<dyn DomainEventSink>) -> Arc<Self> {
        Self::with_rules(live, events, default_rules())
    }

    /// Constructor with an explicit rule list, mainly for tests that pin
    /// down rule behavior.
    pub fn with_rules(
        live: Backends,
        events: Arc<dyn DomainEventSink>,
        rules: Vec<Arc<dyn AlertRule>>,
    ) -> Arc<Self> {
        Arc::new(AppContext {
            live,
            demo: RwLock::new(None),
            phase: RwLock::new(SessionPhase::Uninitialized),
            current_user: RwLock::new(None),
            transactions: RwLock::new(Vec::new()),
            goals: RwLock::new(Vec::new()),
            recurring: RwLock::new(Vec::new()),
            alerts: RwLock::new(Vec::new()),
            rules,
            events,
        })
    }

    // ----- read surface -------------------------------------------------

    pub async fn session_phase(&self) -> SessionPhase {
        *self.phase.read().await
    }

    pub async fn session_mode(&self) -> Option<SessionMode> {
        match *self.phase.read().await {
            SessionPhase::Authenticated(mode) => Some(mode),
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session_mode().await.is_some()
    }

    pub async fn is_demo_mode(&self) -> bool {
        self.session_mode().await == Some(SessionMode::Demo)
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current_user.read().await.clone()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.transactions.read().await.clone()
    }

    pub async fn saving_goals(&self) -> Vec<SavingGoal> {
        self.goals.read().await.clone()
    }

    pub async fn recurring_transactions(&self) -> Vec<RecurringTransaction> {
        self.recurring.read().await.clone()
    }

    pub async fn smart_alerts(&self) -> Vec<SmartAlert> {
        self.alerts.read().await.clone()
    }

    pub async fn get_unread_alerts(&self) -> Vec<SmartAlert> {
        self.alerts
            .read()
            .await
            .iter()
            .filter(|alert| !alert.read)
            .cloned()
            .collect()
    }

    pub async fn get_dashboard_stats(&self) -> DashboardStats {
        dashboard_stats(&self.transactions.read().await)
    }

    pub async fn get_category_breakdown(&self) -> BTreeMap<String, CategoryTotals> {
        category_breakdown(&self.transactions.read().await)
    }

    pub async fn get_monthly_summaries(&self) -> Vec<MonthlySummary> {
        monthly_summaries(
            &self.transactions.read().await,
            MONTHLY_SUMMARY_WINDOW,
            Utc::now().date_naive(),
        )
    }

    pub async fn get_recent_transactions(&self) -> Vec<Transaction> {
        recent_transactions(&self.transactions.read().await, RECENT_TRANSACTIONS_LIMIT)
    }

    // ----- session lifecycle --------------------------------------------

    /// Restores a persisted gateway session, then starts mirroring
    /// gateway auth-state changes into this controller. Call once after
    /// construction; every failure path resolves to Unauthenticated.
    pub async fn initialize(self: Arc<Self>) {
        self.set_phase(SessionPhase::Loading).await;

        match self.live.auth.current_session().await {
            Ok(Some(session)) => match self.live.profiles.fetch(&session.user_id).await {
                Ok(Some(profile)) => {
                    *self.current_user.write().await = Some(profile.clone());
                    if let Err(error) = self.reload_collections().await {
                        log::error!("[session] could not load collections on restore: {error}");
                    }
                    self.set_phase(SessionPhase::Authenticated(SessionMode::Live))
                        .await;
                    self.events
                        .emit(DomainEvent::session_started(profile.id, SessionMode::Live));
                }
                Ok(None) | Err(_) => {
                    // a session without a profile row is unusable, force a
                    // clean sign-out
                    log::error!(
                        "[session] no profile for restored session {}, signing out",
                        session.user_id
                    );
                    if let Err(error) = self.live.auth.sign_out().await {
                        log::warn!("[session] forced sign out failed: {error}");
                    }
                    self.clear_all().await;
                }
            },
            Ok(None) => {
                self.clear_all().await;
            }
            Err(error) => {
                log::error!("[session] could not restore session: {error}");
                self.clear_all().await;
            }
        }

        Self::spawn_auth_listener(&self);
    }

    /// Signs in with the given credentials.
    ///
    /// The reserved demo credentials switch to a demo session without any
    /// gateway traffic. Returns `Ok(false)` when the gateway rejects the
    /// credentials; other failures reset to Unauthenticated and propagate.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool> {
        self.clear_all().await;
        self.set_phase(SessionPhase::Loading).await;

        if email == DEMO_EMAIL && password == DEMO_PASSWORD {
            self.login_demo().await;
            return Ok(true);
        }

        match self.login_live(email, password).await {
            Ok(outcome) => {
                if !outcome {
                    self.set_phase(SessionPhase::Unauthenticated).await;
                }
                Ok(outcome)
            }
            Err(error) => {
                self.clear_all().await;
                Err(error)
            }
        }
    }

    async fn login_demo(&self) {
        // brief simulated latency so consumers exercise their loading states
        tokio::time::sleep(Duration::from_millis(DEMO_LOGIN_DELAY_MS)).await;

        let dataset = DemoDataset::build(Utc::now().date_naive());
        let user = dataset.primary_user().clone();
        *self.demo.write().await = Some(demo_backends(dataset));
        *self.current_user.write().await = Some(user.clone());

        if let Err(error) = self.reload_collections().await {
            log::error!("[session] could not load demo collections: {error}");
        }
        self.set_phase(SessionPhase::Authenticated(SessionMode::Demo))
            .await;
        self.events
            .emit(DomainEvent::session_started(user.id, SessionMode::Demo));
    }

    async fn login_live(&self, email: &str, password: &str) -> Result<bool> {
        let session = match self.live.auth.sign_in(email, password).await {
            Ok(session) => session,
            Err(Error::Auth(AuthError::InvalidCredentials)) => return Ok(false),
            Err(error) => return Err(error),
        };

        let profile = match self.live.profiles.fetch(&session.user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) | Err(_) => {
                // first sign-in after confirmation: the profile row does
                // not exist yet, create it from the session identity
                let fallback = User {
                    id: session.user_id.clone(),
                    email: session.email.clone(),
                    name: session.name.clone().unwrap_or_else(|| session.email.clone()),
                    avatar: None,
                };
                self.live.profiles.upsert(fallback).await?
            }
        };

        *self.current_user.write().await = Some(profile.clone());
        if let Err(error) = self.reload_collections().await {
            log::error!("[session] could not load collections after login: {error}");
        }
        self.set_phase(SessionPhase::Authenticated(SessionMode::Live))
            .await;
        self.events
            .emit(DomainEvent::session_started(profile.id, SessionMode::Live));
        Ok(true)
    }

    /// Ends the session. The gateway sign-out is attempted first, but the
    /// local teardown happens regardless of its outcome; a failure here is
    /// logged, never propagated.
    pub async fn logout(&self) {
        let backends = self.backends().await;
        if let Err(error) = backends.auth.sign_out().await {
            log::error!("[session] gateway sign out failed: {error}");
        }
        self.clear_all().await;
        self.events.emit(DomainEvent::SessionEnded);
    }

    /// Creates an account through the gateway. Does not authenticate the
    /// caller; with email confirmation enabled the profile row is created
    /// on first sign-in instead.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> RegisterOutcome {
        match self.live.auth.sign_up(email, password, name).await {
            Ok(result) => {
                if let Some(session) = result.session {
                    let profile = User {
                        id: session.user_id,
                        email: email.to_string(),
                        name: name.to_string(),
                        avatar: None,
                    };
                    if let Err(error) = self.live.profiles.upsert(profile).await {
                        log::warn!(
                            "[session] profile creation deferred until confirmation: {error}"
                        );
                    }
                } else {
                    log::info!(
                        "[session] skipping profile upsert until email confirmation is completed"
                    );
                }
                RegisterOutcome {
                    success: true,
                    message: "Registro exitoso! Revisa tu email para confirmar tu cuenta."
                        .to_string(),
                }
            }
            Err(error) => {
                log::error!("[session] registration failed: {error}");
                let message = match &error {
                    Error::Gateway(gateway) if gateway.is_rate_limited() => {
                        "Has intentado registrarte demasiadas veces. Por favor, espera antes de volver a intentarlo."
                            .to_string()
                    }
                    other => other.to_string(),
                };
                RegisterOutcome {
                    success: false,
                    message,
                }
            }
        }
    }

    /// Writes profile changes through the active backend, then mirrors
    /// them into the signed-in user. Email stays as it is, no code path
    /// offers to change it.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        let user = self.require_user().await?;
        if update.is_empty() {
            return Ok(());
        }
        let backends = self.backends().await;
        backends.profiles.update(&user.id, update.clone()).await?;

        if let Some(current) = self.current_user.write().await.as_mut() {
            update.apply_to(current);
        }
        self.events.emit(DomainEvent::profile_updated(user.id));
        Ok(())
    }

    /// Reloads the four collections from the active backend.
    pub async fn refresh_data(&self) -> Result<()> {
        if self.current_user().await.is_none() {
            return Ok(());
        }
        self.reload_collections().await
    }

    // ----- transactions -------------------------------------------------

    pub async fn add_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;
        let user = self.require_user().await?;
        let backends = self.backends().await;

        let priors = self.transactions.read().await.clone();
        let inserted = backends
            .transactions
            .insert(&user.id, new_transaction)
            .await?;

        let raised = self
            .apply_rules(
                &backends,
                &user.id,
                RuleEvent::TransactionAdded {
                    transaction: &inserted,
                    prior_transactions: &priors,
                },
            )
            .await;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::transactions_changed(vec![inserted.id.clone()]));
        self.emit_raised(raised);
        Ok(inserted)
    }

    pub async fn update_transaction(&self, id: &str, update: TransactionUpdate) -> Result<()> {
        update.validate()?;
        let user = self.require_user().await?;
        let backends = self.backends().await;
        backends.transactions.update(&user.id, id, update).await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::transactions_changed(vec![id.to_string()]));
        Ok(())
    }

    /// Removes a transaction. Goal progress the transaction contributed
    /// while approved is deliberately left in place; deleting history does
    /// not rewind a goal.
    pub async fn delete_transaction(&self, id: &str) -> Result<()> {
        let user = self.require_user().await?;
        let backends = self.backends().await;
        backends.transactions.delete(&user.id, id).await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::transactions_changed(vec![id.to_string()]));
        Ok(())
    }

    /// Approves a pending transaction. Anything other than pending, or an
    /// unknown id, is a no-op.
    ///
    /// Approving a saving transaction that references a goal also advances
    /// that goal's accumulated amount. If the goal write fails after the
    /// approval went through, the controller reconciles with a full reload
    /// and surfaces the goal error.
    pub async fn approve_transaction(&self, id: &str) -> Result<()> {
        let user = self.require_user().await?;
        let Some(transaction) = self.find_transaction(id).await else {
            return Ok(());
        };
        if transaction.status != TransactionStatus::Pending {
            return Ok(());
        }

        let backends = self.backends().await;
        backends
            .transactions
            .update(
                &user.id,
                id,
                TransactionUpdate::status_change(TransactionStatus::Approved),
            )
            .await?;

        let mut touched_goal = None;
        let mut raised = Vec::new();
        if transaction.transaction_type == TransactionType::Saving {
            if let Some(goal_id) = &transaction.goal_id {
                if let Some(goal) = self.find_goal(goal_id).await {
                    let previous_amount = goal.current_amount;
                    let new_amount = previous_amount + transaction.amount;
                    if let Err(error) = backends
                        .goals
                        .update(
                            &user.id,
                            goal_id,
                            SavingGoalUpdate::amount_change(new_amount),
                        )
                        .await
                    {
                        log::error!(
                            "[session] goal progress write failed after approval: {error}"
                        );
                        self.reload_after_write().await;
                        return Err(error);
                    }

                    let mut progressed = goal;
                    progressed.current_amount = new_amount;
                    raised = self
                        .apply_rules(
                            &backends,
                            &user.id,
                            RuleEvent::GoalProgressed {
                                goal: &progressed,
                                previous_amount,
                                new_amount,
                            },
                        )
                        .await;
                    touched_goal = Some(goal_id.clone());
                }
            }
        }

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::transactions_changed(vec![id.to_string()]));
        if let Some(goal_id) = touched_goal {
            self.events.emit(DomainEvent::goals_changed(vec![goal_id]));
        }
        self.emit_raised(raised);
        Ok(())
    }

    /// Marks a transaction rejected. Rejected transactions never count
    /// toward statistics or goal progress.
    pub async fn reject_transaction(&self, id: &str) -> Result<()> {
        self.update_transaction(id, TransactionUpdate::status_change(TransactionStatus::Rejected))
            .await
    }

    // ----- saving goals -------------------------------------------------

    pub async fn add_saving_goal(&self, new_goal: NewSavingGoal) -> Result<SavingGoal> {
        new_goal.validate()?;
        let user = self.require_user().await?;
        let backends = self.backends().await;
        let inserted = backends.goals.insert(&user.id, new_goal).await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::goals_changed(vec![inserted.id.clone()]));
        Ok(inserted)
    }

    pub async fn update_saving_goal(&self, id: &str, update: SavingGoalUpdate) -> Result<()> {
        update.validate()?;
        let user = self.require_user().await?;
        let backends = self.backends().await;
        backends.goals.update(&user.id, id, update).await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::goals_changed(vec![id.to_string()]));
        Ok(())
    }

    pub async fn delete_saving_goal(&self, id: &str) -> Result<()> {
        let user = self.require_user().await?;
        let backends = self.backends().await;
        backends.goals.delete(&user.id, id).await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::goals_changed(vec![id.to_string()]));
        Ok(())
    }

    // ----- recurring transactions ---------------------------------------

    pub async fn add_recurring_transaction(
        &self,
        new_recurring: NewRecurringTransaction,
    ) -> Result<RecurringTransaction> {
        new_recurring.validate()?;
        let user = self.require_user().await?;
        let backends = self.backends().await;

        let due = next_due_date(
            new_recurring.frequency,
            new_recurring.day_of_month,
            new_recurring.start_date,
            Utc::now().date_naive(),
        );
        let inserted = backends
            .recurring
            .insert(&user.id, new_recurring, due)
            .await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::recurring_changed(vec![inserted.id.clone()]));
        Ok(inserted)
    }

    pub async fn update_recurring_transaction(
        &self,
        id: &str,
        mut update: RecurringUpdate,
    ) -> Result<()> {
        update.validate()?;
        let user = self.require_user().await?;

        // schedule inputs changed: derive the due date from the merged
        // template before it reaches storage
        if update.changes_schedule() {
            if let Some(existing) = self.find_recurring(id).await {
                let frequency = update.frequency.unwrap_or(existing.frequency);
                let day_of_month = update.day_of_month.unwrap_or(existing.day_of_month);
                let start_date = update.start_date.unwrap_or(existing.start_date);
                update.next_due_date = Some(next_due_date(
                    frequency,
                    day_of_month,
                    start_date,
                    Utc::now().date_naive(),
                ));
            }
        }

        let backends = self.backends().await;
        backends.recurring.update(&user.id, id, update).await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::recurring_changed(vec![id.to_string()]));
        Ok(())
    }

    pub async fn delete_recurring_transaction(&self, id: &str) -> Result<()> {
        let user = self.require_user().await?;
        let backends = self.backends().await;
        backends.recurring.delete(&user.id, id).await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::recurring_changed(vec![id.to_string()]));
        Ok(())
    }

    // ----- smart alerts -------------------------------------------------

    pub async fn mark_alert_as_read(&self, id: &str) -> Result<()> {
        let user = self.require_user().await?;
        let backends = self.backends().await;
        backends.alerts.mark_read(&user.id, id).await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::alerts_changed(vec![id.to_string()]));
        Ok(())
    }

    pub async fn delete_alert(&self, id: &str) -> Result<()> {
        let user = self.require_user().await?;
        let backends = self.backends().await;
        backends.alerts.delete(&user.id, id).await?;

        self.reload_after_write().await;
        self.events
            .emit(DomainEvent::alerts_changed(vec![id.to_string()]));
        Ok(())
    }

    // ----- internals ----------------------------------------------------

    async fn backends(&self) -> Backends {
        match self.demo.read().await.as_ref() {
            Some(demo) => demo.clone(),
            None => self.live.clone(),
        }
    }

    async fn require_user(&self) -> Result<User> {
        self.current_user()
            .await
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }

    async fn set_phase(&self, phase: SessionPhase) {
        *self.phase.write().await = phase;
    }

    async fn find_transaction(&self, id: &str) -> Option<Transaction> {
        self.transactions
            .read()
            .await
            .iter()
            .find(|transaction| transaction.id == id)
            .cloned()
    }

    async fn find_goal(&self, id: &str) -> Option<SavingGoal> {
        self.goals.read().await.iter().find(|goal| goal.id == id).cloned()
    }

    async fn find_recurring(&self, id: &str) -> Option<RecurringTransaction> {
        self.recurring
            .read()
            .await
            .iter()
            .find(|recurring| recurring.id == id)
            .cloned()
    }

    /// Drops the user, the collections, the demo backend set, and the
    /// persisted session artifacts, landing in Unauthenticated. Safe to
    /// call from any state.
    async fn clear_all(&self) {
        *self.current_user.write().await = None;
        *self.demo.write().await = None;
        self.clear_collections().await;
        if let Err(error) = self.live.artifacts.clear().await {
            log::warn!("[session] could not clear session artifacts: {error}");
        }
        self.set_phase(SessionPhase::Unauthenticated).await;
    }

    async fn clear_collections(&self) {
        self.transactions.write().await.clear();
        self.goals.write().await.clear();
        self.recurring.write().await.clear();
        self.alerts.write().await.clear();
    }

    /// Fetches all four collections from the active backend. On any
    /// failure the collections are cleared rather than left stale, and the
    /// error is returned for the caller to log or surface.
    async fn reload_collections(&self) -> Result<()> {
        let user = self.require_user().await?;
        let backends = self.backends().await;

        let loaded = futures::try_join!(
            backends.transactions.list_for_user(&user.id),
            backends.goals.list_for_user(&user.id),
            backends.recurring.list_for_user(&user.id),
            backends.alerts.list_for_user(&user.id),
        );

        match loaded {
            Ok((transactions, goals, recurring, alerts)) => {
                *self.transactions.write().await = transactions;
                *self.goals.write().await = goals;
                *self.recurring.write().await = recurring;
                *self.alerts.write().await = alerts;
                self.events.emit(DomainEvent::collections_reloaded(user.id));
                Ok(())
            }
            Err(error) => {
                self.clear_collections().await;
                Err(error)
            }
        }
    }

    /// Post-write convergence pass. The write itself already succeeded, so
    /// a reload failure is logged instead of propagated; the read-path
    /// rule has cleared the collections by then.
    async fn reload_after_write(&self) {
        if let Err(error) = self.reload_collections().await {
            log::error!("[session] could not reload collections after write: {error}");
        }
    }

    /// Runs the rule list against one event and stores whatever alerts the
    /// rules produce. Alert storage is best-effort; a failure is logged
    /// and the remaining rules still run.
    async fn apply_rules(
        &self,
        backends: &Backends,
        user_id: &str,
        event: RuleEvent<'_>,
    ) -> Vec<(&'static str, SmartAlert)> {
        let pending: Vec<(&'static str, NewSmartAlert)> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(&event).map(|alert| (rule.name(), alert)))
            .collect();

        let mut raised = Vec::with_capacity(pending.len());
        for (rule_name, new_alert) in pending {
            match backends.alerts.insert(user_id, new_alert).await {
                Ok(alert) => raised.push((rule_name, alert)),
                Err(error) => {
                    log::warn!("[session] could not store alert from rule {rule_name}: {error}");
                }
            }
        }
        raised
    }

    fn emit_raised(&self, raised: Vec<(&'static str, SmartAlert)>) {
        if raised.is_empty() {
            return;
        }
        let mut alert_ids = Vec::with_capacity(raised.len());
        for (rule_name, alert) in raised {
            self.events
                .emit(DomainEvent::alert_raised(rule_name, alert.id.clone()));
            alert_ids.push(alert.id);
        }
        self.events.emit(DomainEvent::alerts_changed(alert_ids));
    }

    /// Mirrors gateway sign-out notifications into the state machine. A
    /// demo session has no gateway ties, so events arriving while demo is
    /// active are ignored.
    fn spawn_auth_listener(context: &Arc<Self>) {
        let weak = Arc::downgrade(context);
        let mut receiver = context.live.auth.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(AuthEvent::SignedOut) => {
                        let Some(context) = weak.upgrade() else { break };
                        if context.session_mode().await == Some(SessionMode::Live) {
                            log::info!("[session] gateway session ended, clearing state");
                            context.clear_all().await;
                            context.events.emit(DomainEvent::SessionEnded);
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("[session] auth event stream lagged, skipped {skipped}");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}
