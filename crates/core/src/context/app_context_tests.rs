#[cfg(test)]
mod tests {
    use crate::alerts::{AlertType, NewSmartAlert, SmartAlert, SmartAlertRepositoryTrait};
    use crate::auth::{
        AuthEvent, AuthProviderTrait, AuthSession, SessionArtifactsTrait, SignUpResult,
    };
    use crate::constants::{DEMO_EMAIL, DEMO_PASSWORD};
    use crate::context::{AppContext, Backends, SessionMode, SessionPhase};
    use crate::errors::{AuthError, GatewayError, Result};
    use crate::events::{DomainEvent, MockDomainEventSink};
    use crate::goals::{NewSavingGoal, SavingGoal, SavingGoalRepositoryTrait, SavingGoalUpdate};
    use crate::recurring::{
        Frequency, NewRecurringTransaction, RecurringRepositoryTrait, RecurringTransaction,
        RecurringType, RecurringUpdate,
    };
    use crate::store::{
        MemoryProfileRepository, MemoryRecurringRepository, MemorySavingGoalRepository,
        MemorySmartAlertRepository, MemoryTransactionRepository,
    };
    use crate::transactions::{
        NewTransaction, Transaction, TransactionRepositoryTrait, TransactionStatus,
        TransactionType, TransactionUpdate,
    };
    use crate::users::{ProfileRepositoryTrait, ProfileUpdate, User};
    use async_trait::async_trait;
    use chrono::{Datelike, NaiveDate, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::broadcast;

    // --- Scripted auth provider -----------------------------------------

    struct ScriptedAuth {
        /// Session handed out on sign_in; None rejects the credentials.
        account: Mutex<Option<AuthSession>>,
        /// Session handed out on current_session.
        persisted: Mutex<Option<AuthSession>>,
        sign_up_session: Mutex<Option<AuthSession>>,
        sign_up_rate_limited: AtomicBool,
        fail_sign_out: AtomicBool,
        sign_out_calls: AtomicUsize,
        events: broadcast::Sender<AuthEvent>,
    }

    impl ScriptedAuth {
        fn new() -> Arc<Self> {
            let (events, _) = broadcast::channel(8);
            Arc::new(Self {
                account: Mutex::new(None),
                persisted: Mutex::new(None),
                sign_up_session: Mutex::new(None),
                sign_up_rate_limited: AtomicBool::new(false),
                fail_sign_out: AtomicBool::new(false),
                sign_out_calls: AtomicUsize::new(0),
                events,
            })
        }

        fn with_account(self: Arc<Self>, session: AuthSession) -> Arc<Self> {
            *self.account.lock().unwrap() = Some(session);
            self
        }

        fn with_persisted(self: Arc<Self>, session: AuthSession) -> Arc<Self> {
            *self.persisted.lock().unwrap() = Some(session);
            self
        }

        fn broadcast_signed_out(&self) {
            let _ = self.events.send(AuthEvent::SignedOut);
        }
    }

    #[async_trait]
    impl AuthProviderTrait for ScriptedAuth {
        async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSession> {
            match self.account.lock().unwrap().clone() {
                Some(session) if session.email == email => Ok(session),
                _ => Err(AuthError::InvalidCredentials.into()),
            }
        }

        async fn sign_up(&self, email: &str, _password: &str, name: &str) -> Result<SignUpResult> {
            if self.sign_up_rate_limited.load(Ordering::SeqCst) {
                return Err(GatewayError::Api {
                    status: 429,
                    message: "over_email_send_rate_limit".to_string(),
                }
                .into());
            }
            let _ = (email, name);
            Ok(SignUpResult {
                session: self.sign_up_session.lock().unwrap().clone(),
            })
        }

        async fn sign_out(&self) -> Result<()> {
            self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_out.load(Ordering::SeqCst) {
                return Err(GatewayError::Transport("connection reset".to_string()).into());
            }
            Ok(())
        }

        async fn current_session(&self) -> Result<Option<AuthSession>> {
            Ok(self.persisted.lock().unwrap().clone())
        }

        fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
            self.events.subscribe()
        }
    }

    // --- Recording session artifacts ------------------------------------

    #[derive(Default)]
    struct RecordingArtifacts {
        cleared: AtomicUsize,
    }

    #[async_trait]
    impl SessionArtifactsTrait for RecordingArtifacts {
        async fn clear(&self) -> Result<()> {
            self.cleared.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    // --- Gateway call counter for demo isolation ------------------------

    #[derive(Default)]
    struct GatewayCounter {
        calls: AtomicUsize,
    }

    impl GatewayCounter {
        fn bump(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn total(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn unreachable_gateway() -> crate::errors::Error {
        GatewayError::Transport("gateway must not be reached".to_string()).into()
    }

    struct CountingAuth {
        counter: Arc<GatewayCounter>,
        events: broadcast::Sender<AuthEvent>,
    }

    impl CountingAuth {
        fn new(counter: Arc<GatewayCounter>) -> Self {
            let (events, _) = broadcast::channel(8);
            Self { counter, events }
        }
    }

    #[async_trait]
    impl AuthProviderTrait for CountingAuth {
        async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthSession> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn sign_up(&self, _e: &str, _p: &str, _n: &str) -> Result<SignUpResult> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn sign_out(&self) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn current_session(&self) -> Result<Option<AuthSession>> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
            self.events.subscribe()
        }
    }

    struct CountingProfiles {
        counter: Arc<GatewayCounter>,
    }

    #[async_trait]
    impl ProfileRepositoryTrait for CountingProfiles {
        async fn fetch(&self, _user_id: &str) -> Result<Option<User>> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn upsert(&self, _user: User) -> Result<User> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn update(&self, _user_id: &str, _update: ProfileUpdate) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }
    }

    struct CountingTransactions {
        counter: Arc<GatewayCounter>,
    }

    #[async_trait]
    impl TransactionRepositoryTrait for CountingTransactions {
        async fn list_for_user(&self, _user_id: &str) -> Result<Vec<Transaction>> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn insert(&self, _user_id: &str, _new: NewTransaction) -> Result<Transaction> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn update(&self, _user_id: &str, _id: &str, _update: TransactionUpdate) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn delete(&self, _user_id: &str, _id: &str) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }
    }

    struct CountingGoals {
        counter: Arc<GatewayCounter>,
    }

    #[async_trait]
    impl SavingGoalRepositoryTrait for CountingGoals {
        async fn list_for_user(&self, _user_id: &str) -> Result<Vec<SavingGoal>> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn insert(&self, _user_id: &str, _new: NewSavingGoal) -> Result<SavingGoal> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn update(&self, _user_id: &str, _id: &str, _update: SavingGoalUpdate) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn delete(&self, _user_id: &str, _id: &str) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }
    }

    struct CountingRecurring {
        counter: Arc<GatewayCounter>,
    }

    #[async_trait]
    impl RecurringRepositoryTrait for CountingRecurring {
        async fn list_for_user(&self, _user_id: &str) -> Result<Vec<RecurringTransaction>> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn insert(
            &self,
            _user_id: &str,
            _new: NewRecurringTransaction,
            _next_due_date: NaiveDate,
        ) -> Result<RecurringTransaction> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn update(&self, _user_id: &str, _id: &str, _update: RecurringUpdate) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn delete(&self, _user_id: &str, _id: &str) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }
    }

    struct CountingAlerts {
        counter: Arc<GatewayCounter>,
    }

    #[async_trait]
    impl SmartAlertRepositoryTrait for CountingAlerts {
        async fn list_for_user(&self, _user_id: &str) -> Result<Vec<SmartAlert>> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn insert(&self, _user_id: &str, _new: NewSmartAlert) -> Result<SmartAlert> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn mark_read(&self, _user_id: &str, _id: &str) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }

        async fn delete(&self, _user_id: &str, _id: &str) -> Result<()> {
            self.counter.bump();
            Err(unreachable_gateway())
        }
    }

    // --- Goal repository with a switchable failing update ---------------

    struct FlakyGoals {
        inner: MemorySavingGoalRepository,
        fail_update: AtomicBool,
    }

    impl FlakyGoals {
        fn new() -> Self {
            Self {
                inner: MemorySavingGoalRepository::default(),
                fail_update: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl SavingGoalRepositoryTrait for FlakyGoals {
        async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavingGoal>> {
            self.inner.list_for_user(user_id).await
        }

        async fn insert(&self, user_id: &str, new: NewSavingGoal) -> Result<SavingGoal> {
            self.inner.insert(user_id, new).await
        }

        async fn update(&self, user_id: &str, id: &str, update: SavingGoalUpdate) -> Result<()> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(GatewayError::Transport("write timed out".to_string()).into());
            }
            self.inner.update(user_id, id, update).await
        }

        async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
            self.inner.delete(user_id, id).await
        }
    }

    // --- Builders --------------------------------------------------------

    fn live_session() -> AuthSession {
        AuthSession {
            user_id: "u-live".to_string(),
            email: "ana@email.com".to_string(),
            name: Some("Ana Ruiz".to_string()),
        }
    }

    fn memory_backends(auth: Arc<ScriptedAuth>) -> (Backends, Arc<RecordingArtifacts>) {
        let artifacts = Arc::new(RecordingArtifacts::default());
        let backends = Backends {
            auth,
            artifacts: artifacts.clone(),
            profiles: Arc::new(MemoryProfileRepository::default()),
            transactions: Arc::new(MemoryTransactionRepository::default()),
            goals: Arc::new(MemorySavingGoalRepository::default()),
            recurring: Arc::new(MemoryRecurringRepository::default()),
            alerts: Arc::new(MemorySmartAlertRepository::default()),
        };
        (backends, artifacts)
    }

    fn counting_backends() -> (Backends, Arc<GatewayCounter>) {
        let counter = Arc::new(GatewayCounter::default());
        let backends = Backends {
            auth: Arc::new(CountingAuth::new(counter.clone())),
            artifacts: Arc::new(RecordingArtifacts::default()),
            profiles: Arc::new(CountingProfiles {
                counter: counter.clone(),
            }),
            transactions: Arc::new(CountingTransactions {
                counter: counter.clone(),
            }),
            goals: Arc::new(CountingGoals {
                counter: counter.clone(),
            }),
            recurring: Arc::new(CountingRecurring {
                counter: counter.clone(),
            }),
            alerts: Arc::new(CountingAlerts {
                counter: counter.clone(),
            }),
        };
        (backends, counter)
    }

    async fn live_context() -> Arc<AppContext> {
        let auth = ScriptedAuth::new().with_account(live_session());
        let (backends, _) = memory_backends(auth);
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));
        let logged_in = context.login("ana@email.com", "secret").await.unwrap();
        assert!(logged_in);
        context
    }

    fn expense(amount: Decimal, status: TransactionStatus) -> NewTransaction {
        NewTransaction {
            amount,
            description: "Gasto en Compras".to_string(),
            category: "Compras".to_string(),
            transaction_type: TransactionType::Expense,
            date: Utc::now(),
            goal_id: None,
            status,
            is_shared: false,
        }
    }

    fn saving(amount: Decimal, goal_id: Option<String>) -> NewTransaction {
        NewTransaction {
            amount,
            description: "Ahorro para Vacaciones".to_string(),
            category: "Vacaciones".to_string(),
            transaction_type: TransactionType::Saving,
            date: Utc::now(),
            goal_id,
            status: TransactionStatus::Pending,
            is_shared: false,
        }
    }

    fn completion_alerts(alerts: &[SmartAlert]) -> usize {
        alerts
            .iter()
            .filter(|alert| {
                alert.alert_type == AlertType::Success
                    && alert.title == "¡Meta de ahorro alcanzada!"
            })
            .count()
    }

    fn warning_alerts(alerts: &[SmartAlert]) -> usize {
        alerts
            .iter()
            .filter(|alert| alert.alert_type == AlertType::Warning)
            .count()
    }

    // --- Session lifecycle -----------------------------------------------

    #[tokio::test]
    async fn demo_credentials_start_a_seeded_demo_session() {
        let (backends, _) = counting_backends();
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        let logged_in = context.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert!(logged_in);
        assert_eq!(
            context.session_phase().await,
            SessionPhase::Authenticated(SessionMode::Demo)
        );
        assert!(context.is_demo_mode().await);

        let user = context.current_user().await.unwrap();
        assert_eq!(user.email, DEMO_EMAIL);

        let transactions = context.transactions().await;
        assert!(!transactions.is_empty());
        assert!(transactions.iter().all(|t| t.user_id == user.id));
        assert!(!context.saving_goals().await.is_empty());
        assert!(!context.recurring_transactions().await.is_empty());
        assert!(!context.smart_alerts().await.is_empty());
    }

    #[tokio::test]
    async fn demo_session_never_reaches_the_gateway() {
        let (backends, counter) = counting_backends();
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        context.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        context
            .add_transaction(expense(dec!(25), TransactionStatus::Approved))
            .await
            .unwrap();
        let goal = context
            .add_saving_goal(NewSavingGoal {
                name: "Escapada".to_string(),
                target_amount: dec!(300),
                deadline: None,
                is_shared: false,
            })
            .await
            .unwrap();
        context
            .update_saving_goal(&goal.id, SavingGoalUpdate::amount_change(dec!(50)))
            .await
            .unwrap();
        let alert_id = context.smart_alerts().await[0].id.clone();
        context.mark_alert_as_read(&alert_id).await.unwrap();
        context.get_dashboard_stats().await;
        context.logout().await;

        assert_eq!(counter.total(), 0);
    }

    #[tokio::test]
    async fn entering_demo_clears_previously_loaded_live_collections() {
        let context = live_context().await;
        context
            .add_transaction(expense(dec!(42), TransactionStatus::Approved))
            .await
            .unwrap();
        let live_ids: Vec<String> = context
            .transactions()
            .await
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert!(!live_ids.is_empty());

        context.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        let demo_transactions = context.transactions().await;
        assert!(!demo_transactions.is_empty());
        assert!(demo_transactions.iter().all(|t| !live_ids.contains(&t.id)));
    }

    #[tokio::test]
    async fn login_rejected_credentials_return_false_and_unauthenticated() {
        let auth = ScriptedAuth::new();
        let (backends, _) = memory_backends(auth);
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        let logged_in = context.login("nadie@email.com", "mala").await.unwrap();
        assert!(!logged_in);
        assert_eq!(context.session_phase().await, SessionPhase::Unauthenticated);
        assert!(context.current_user().await.is_none());
    }

    #[tokio::test]
    async fn login_creates_the_profile_row_when_missing() {
        let context = live_context().await;
        let user = context.current_user().await.unwrap();
        assert_eq!(user.id, "u-live");
        assert_eq!(user.email, "ana@email.com");
        // name comes from the account metadata, not the email fallback
        assert_eq!(user.name, "Ana Ruiz");
    }

    #[tokio::test]
    async fn logout_clears_everything_even_when_sign_out_fails() {
        let auth = ScriptedAuth::new().with_account(live_session());
        auth.fail_sign_out.store(true, Ordering::SeqCst);
        let (backends, artifacts) = memory_backends(auth.clone());
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));
        context.login("ana@email.com", "secret").await.unwrap();
        context
            .add_transaction(expense(dec!(10), TransactionStatus::Approved))
            .await
            .unwrap();

        context.logout().await;

        assert_eq!(auth.sign_out_calls.load(Ordering::SeqCst), 1);
        assert_eq!(context.session_phase().await, SessionPhase::Unauthenticated);
        assert!(context.current_user().await.is_none());
        assert!(context.transactions().await.is_empty());
        assert!(context.saving_goals().await.is_empty());
        assert!(context.recurring_transactions().await.is_empty());
        assert!(context.smart_alerts().await.is_empty());
        assert!(artifacts.cleared.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn initialize_restores_a_persisted_session() {
        let auth = ScriptedAuth::new().with_persisted(live_session());
        let (backends, _) = memory_backends(auth);
        backends
            .profiles
            .upsert(User {
                id: "u-live".to_string(),
                email: "ana@email.com".to_string(),
                name: "Ana Ruiz".to_string(),
                avatar: None,
            })
            .await
            .unwrap();
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        context.clone().initialize().await;

        assert_eq!(
            context.session_phase().await,
            SessionPhase::Authenticated(SessionMode::Live)
        );
        assert_eq!(
            context.current_user().await.map(|u| u.id),
            Some("u-live".to_string())
        );
    }

    #[tokio::test]
    async fn initialize_without_a_session_lands_unauthenticated() {
        let auth = ScriptedAuth::new();
        let (backends, _) = memory_backends(auth);
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        context.clone().initialize().await;

        assert_eq!(context.session_phase().await, SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn initialize_forces_sign_out_when_the_profile_is_gone() {
        let auth = ScriptedAuth::new().with_persisted(live_session());
        let (backends, _) = memory_backends(auth.clone());
        // no profile row upserted: the restored session points at nothing
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        context.clone().initialize().await;

        assert_eq!(auth.sign_out_calls.load(Ordering::SeqCst), 1);
        assert_eq!(context.session_phase().await, SessionPhase::Unauthenticated);
        assert!(context.current_user().await.is_none());
    }

    #[tokio::test]
    async fn external_sign_out_tears_down_a_live_session() {
        let auth = ScriptedAuth::new().with_account(live_session());
        let (backends, _) = memory_backends(auth.clone());
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));
        context.clone().initialize().await;
        context.login("ana@email.com", "secret").await.unwrap();
        assert!(context.is_authenticated().await);

        auth.broadcast_signed_out();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert_eq!(context.session_phase().await, SessionPhase::Unauthenticated);
        assert!(context.current_user().await.is_none());
    }

    #[tokio::test]
    async fn external_sign_out_does_not_touch_a_demo_session() {
        let auth = ScriptedAuth::new();
        let (backends, _) = memory_backends(auth.clone());
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));
        context.clone().initialize().await;
        context.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        auth.broadcast_signed_out();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(context.is_demo_mode().await);
        assert!(context.current_user().await.is_some());
    }

    #[tokio::test]
    async fn register_reports_success_without_authenticating() {
        let auth = ScriptedAuth::new();
        let (backends, _) = memory_backends(auth);
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        let outcome = context
            .register("nueva@email.com", "secreta", "Nueva")
            .await;

        assert!(outcome.success);
        assert!(outcome.message.contains("Revisa tu email"));
        assert!(!context.is_authenticated().await);
    }

    #[tokio::test]
    async fn register_maps_rate_limiting_to_a_friendly_message() {
        let auth = ScriptedAuth::new();
        auth.sign_up_rate_limited.store(true, Ordering::SeqCst);
        let (backends, _) = memory_backends(auth);
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        let outcome = context
            .register("nueva@email.com", "secreta", "Nueva")
            .await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("demasiadas veces"));
    }

    #[tokio::test]
    async fn register_upserts_the_profile_when_a_session_is_established() {
        let auth = ScriptedAuth::new();
        *auth.sign_up_session.lock().unwrap() = Some(AuthSession {
            user_id: "u-new".to_string(),
            email: "nueva@email.com".to_string(),
            name: Some("Nueva".to_string()),
        });
        let (backends, _) = memory_backends(auth);
        let profiles = backends.profiles.clone();
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        let outcome = context
            .register("nueva@email.com", "secreta", "Nueva")
            .await;

        assert!(outcome.success);
        let created = profiles.fetch("u-new").await.unwrap();
        assert_eq!(created.map(|u| u.name), Some("Nueva".to_string()));
    }

    // --- Mutations -------------------------------------------------------

    #[tokio::test]
    async fn mutations_require_a_signed_in_user() {
        let (backends, _) = memory_backends(ScriptedAuth::new());
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));

        let result = context
            .add_transaction(expense(dec!(10), TransactionStatus::Pending))
            .await;
        assert!(matches!(
            result,
            Err(crate::errors::Error::Auth(AuthError::NotAuthenticated))
        ));
    }

    #[tokio::test]
    async fn approving_a_non_pending_transaction_is_a_no_op() {
        let context = live_context().await;
        let approved = context
            .add_transaction(expense(dec!(30), TransactionStatus::Approved))
            .await
            .unwrap();

        let transactions_before = context.transactions().await;
        let alerts_before = context.smart_alerts().await;

        context.approve_transaction(&approved.id).await.unwrap();
        context.approve_transaction("missing-id").await.unwrap();

        assert_eq!(context.transactions().await, transactions_before);
        assert_eq!(context.smart_alerts().await, alerts_before);
    }

    #[tokio::test]
    async fn approving_a_saving_transaction_advances_its_goal_once() {
        let context = live_context().await;
        let goal = context
            .add_saving_goal(NewSavingGoal {
                name: "Vacaciones de verano".to_string(),
                target_amount: dec!(1000),
                deadline: None,
                is_shared: true,
            })
            .await
            .unwrap();
        context
            .update_saving_goal(&goal.id, SavingGoalUpdate::amount_change(dec!(900)))
            .await
            .unwrap();

        let crossing = context
            .add_transaction(saving(dec!(150), Some(goal.id.clone())))
            .await
            .unwrap();
        context.approve_transaction(&crossing.id).await.unwrap();

        let updated = context
            .saving_goals()
            .await
            .into_iter()
            .find(|g| g.id == goal.id)
            .unwrap();
        assert_eq!(updated.current_amount, dec!(1050));
        assert_eq!(completion_alerts(&context.smart_alerts().await), 1);

        // a second approved saving keeps the goal above target: no new alert
        let above = context
            .add_transaction(saving(dec!(50), Some(goal.id.clone())))
            .await
            .unwrap();
        context.approve_transaction(&above.id).await.unwrap();

        let updated = context
            .saving_goals()
            .await
            .into_iter()
            .find(|g| g.id == goal.id)
            .unwrap();
        assert_eq!(updated.current_amount, dec!(1100));
        assert_eq!(completion_alerts(&context.smart_alerts().await), 1);
    }

    #[tokio::test]
    async fn approving_twice_only_counts_the_goal_progress_once() {
        let context = live_context().await;
        let goal = context
            .add_saving_goal(NewSavingGoal {
                name: "Fondo".to_string(),
                target_amount: dec!(10000),
                deadline: None,
                is_shared: false,
            })
            .await
            .unwrap();
        let transaction = context
            .add_transaction(saving(dec!(100), Some(goal.id.clone())))
            .await
            .unwrap();

        context.approve_transaction(&transaction.id).await.unwrap();
        // second call sees an already-approved transaction
        context.approve_transaction(&transaction.id).await.unwrap();

        let updated = context
            .saving_goals()
            .await
            .into_iter()
            .find(|g| g.id == goal.id)
            .unwrap();
        assert_eq!(updated.current_amount, dec!(100));
    }

    #[tokio::test]
    async fn high_expense_alert_needs_history_multiplier_and_floor() {
        let context = live_context().await;
        for _ in 0..6 {
            context
                .add_transaction(expense(dec!(40), TransactionStatus::Approved))
                .await
                .unwrap();
        }
        assert_eq!(warning_alerts(&context.smart_alerts().await), 0);

        // above twice the mean of 40 but under the absolute floor
        context
            .add_transaction(expense(dec!(90), TransactionStatus::Approved))
            .await
            .unwrap();
        assert_eq!(warning_alerts(&context.smart_alerts().await), 0);

        // clears both bars
        context
            .add_transaction(expense(dec!(150), TransactionStatus::Approved))
            .await
            .unwrap();
        assert_eq!(warning_alerts(&context.smart_alerts().await), 1);
    }

    #[tokio::test]
    async fn high_expense_alert_stays_quiet_with_short_history() {
        let context = live_context().await;
        for _ in 0..5 {
            context
                .add_transaction(expense(dec!(50), TransactionStatus::Approved))
                .await
                .unwrap();
        }

        context
            .add_transaction(expense(dec!(500), TransactionStatus::Approved))
            .await
            .unwrap();

        assert_eq!(warning_alerts(&context.smart_alerts().await), 0);
    }

    #[tokio::test]
    async fn failed_goal_write_after_approval_reconciles_and_surfaces() {
        let auth = ScriptedAuth::new().with_account(live_session());
        let (mut backends, _) = memory_backends(auth);
        let goals = Arc::new(FlakyGoals::new());
        backends.goals = goals.clone();
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));
        context.login("ana@email.com", "secret").await.unwrap();

        let goal = context
            .add_saving_goal(NewSavingGoal {
                name: "Meta frágil".to_string(),
                target_amount: dec!(1000),
                deadline: None,
                is_shared: false,
            })
            .await
            .unwrap();
        let transaction = context
            .add_transaction(saving(dec!(100), Some(goal.id.clone())))
            .await
            .unwrap();

        goals.fail_update.store(true, Ordering::SeqCst);
        let result = context.approve_transaction(&transaction.id).await;
        assert!(result.is_err());

        // the approval itself went through and the reload converged on it
        let reloaded = context
            .transactions()
            .await
            .into_iter()
            .find(|t| t.id == transaction.id)
            .unwrap();
        assert_eq!(reloaded.status, TransactionStatus::Approved);

        // the goal write never landed
        let untouched = context
            .saving_goals()
            .await
            .into_iter()
            .find(|g| g.id == goal.id)
            .unwrap();
        assert_eq!(untouched.current_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn update_round_trip_merges_fields_in_live_mode() {
        let context = live_context().await;
        let inserted = context
            .add_transaction(expense(dec!(20), TransactionStatus::Pending))
            .await
            .unwrap();

        context
            .update_transaction(
                &inserted.id,
                TransactionUpdate {
                    amount: Some(dec!(35)),
                    description: Some("Gasto en Salud".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let read_back = context
            .transactions()
            .await
            .into_iter()
            .find(|t| t.id == inserted.id)
            .unwrap();
        assert_eq!(read_back.amount, dec!(35));
        assert_eq!(read_back.description, "Gasto en Salud");
        // untouched fields keep their prior values
        assert_eq!(read_back.category, "Compras");
        assert_eq!(read_back.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn update_round_trip_merges_fields_in_demo_mode() {
        let (backends, _) = counting_backends();
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));
        context.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        let inserted = context
            .add_transaction(expense(dec!(20), TransactionStatus::Pending))
            .await
            .unwrap();
        context
            .update_transaction(
                &inserted.id,
                TransactionUpdate {
                    amount: Some(dec!(35)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let read_back = context
            .transactions()
            .await
            .into_iter()
            .find(|t| t.id == inserted.id)
            .unwrap();
        assert_eq!(read_back.amount, dec!(35));
        assert_eq!(read_back.description, "Gasto en Compras");
    }

    #[tokio::test]
    async fn deleting_a_transaction_leaves_goal_progress_alone() {
        let context = live_context().await;
        let goal = context
            .add_saving_goal(NewSavingGoal {
                name: "Meta".to_string(),
                target_amount: dec!(1000),
                deadline: None,
                is_shared: false,
            })
            .await
            .unwrap();
        let transaction = context
            .add_transaction(saving(dec!(200), Some(goal.id.clone())))
            .await
            .unwrap();
        context.approve_transaction(&transaction.id).await.unwrap();

        context.delete_transaction(&transaction.id).await.unwrap();

        let kept = context
            .saving_goals()
            .await
            .into_iter()
            .find(|g| g.id == goal.id)
            .unwrap();
        assert_eq!(kept.current_amount, dec!(200));
        assert!(!context
            .transactions()
            .await
            .iter()
            .any(|t| t.id == transaction.id));
    }

    #[tokio::test]
    async fn recurring_schedule_changes_recompute_the_due_date() {
        let context = live_context().await;
        let today = Utc::now().date_naive();
        let inserted = context
            .add_recurring_transaction(NewRecurringTransaction {
                amount: dec!(12.99),
                description: "Suscripción Netflix".to_string(),
                category: "Entretenimiento".to_string(),
                recurring_type: RecurringType::Expense,
                frequency: Frequency::Monthly,
                day_of_month: 15,
                start_date: today - chrono::Duration::days(90),
                is_shared: false,
            })
            .await
            .unwrap();
        assert!(inserted.next_due_date >= today);

        context
            .update_recurring_transaction(
                &inserted.id,
                RecurringUpdate {
                    day_of_month: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = context
            .recurring_transactions()
            .await
            .into_iter()
            .find(|r| r.id == inserted.id)
            .unwrap();
        assert_eq!(updated.day_of_month, 1);
        assert!(updated.next_due_date >= today);
        assert_eq!(updated.next_due_date.day(), 1);
    }

    #[tokio::test]
    async fn profile_update_mirrors_into_the_current_user() {
        let context = live_context().await;

        context
            .update_profile(ProfileUpdate {
                name: Some("Ana M. Ruiz".to_string()),
                avatar: None,
            })
            .await
            .unwrap();

        let user = context.current_user().await.unwrap();
        assert_eq!(user.name, "Ana M. Ruiz");
        assert_eq!(user.email, "ana@email.com");
    }

    #[tokio::test]
    async fn dashboard_stats_follow_the_collection() {
        let context = live_context().await;
        context
            .add_transaction(NewTransaction {
                amount: dec!(1000),
                description: "Ingreso de Salario".to_string(),
                category: "Salario".to_string(),
                transaction_type: TransactionType::Income,
                date: Utc::now(),
                goal_id: None,
                status: TransactionStatus::Approved,
                is_shared: false,
            })
            .await
            .unwrap();
        context
            .add_transaction(expense(dec!(300), TransactionStatus::Approved))
            .await
            .unwrap();
        context
            .add_transaction(expense(dec!(9999), TransactionStatus::Pending))
            .await
            .unwrap();

        let stats = context.get_dashboard_stats().await;
        assert_eq!(stats.total_income, dec!(1000));
        assert_eq!(stats.total_expenses, dec!(300));
        assert_eq!(stats.balance, dec!(700));
    }

    #[tokio::test]
    async fn unread_alerts_shrink_as_alerts_are_read_or_deleted() {
        let (backends, _) = counting_backends();
        let context = AppContext::new(backends, Arc::new(MockDomainEventSink::new()));
        context.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        let unread = context.get_unread_alerts().await;
        assert_eq!(unread.len(), 2);

        context.mark_alert_as_read(&unread[0].id).await.unwrap();
        assert_eq!(context.get_unread_alerts().await.len(), 1);

        let remaining = context.get_unread_alerts().await[0].id.clone();
        context.delete_alert(&remaining).await.unwrap();
        assert!(context.get_unread_alerts().await.is_empty());
        assert_eq!(context.smart_alerts().await.len(), 2);
    }

    #[tokio::test]
    async fn session_events_reach_the_sink() {
        let sink = Arc::new(MockDomainEventSink::new());
        let auth = ScriptedAuth::new().with_account(live_session());
        let (backends, _) = memory_backends(auth);
        let context = AppContext::new(backends, sink.clone());

        context.login("ana@email.com", "secret").await.unwrap();
        context
            .add_transaction(expense(dec!(10), TransactionStatus::Pending))
            .await
            .unwrap();
        context.logout().await;

        let events = sink.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::SessionStarted { mode: SessionMode::Live, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::TransactionsChanged { .. })));
        assert!(events.iter().any(|e| matches!(e, DomainEvent::SessionEnded)));
    }
}
