//! In-memory repositories backing demo sessions.
//!
//! Rows live in a `tokio::sync::Mutex<Vec<_>>` for the lifetime of the
//! session and are gone on logout. Listing clones, so callers hold
//! snapshots and never a reference into the table.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::alerts::{NewSmartAlert, SmartAlert, SmartAlertRepositoryTrait};
use crate::errors::Result;
use crate::goals::{NewSavingGoal, SavingGoal, SavingGoalRepositoryTrait, SavingGoalUpdate};
use crate::recurring::{
    NewRecurringTransaction, RecurringRepositoryTrait, RecurringTransaction, RecurringUpdate,
};
use crate::transactions::{
    NewTransaction, Transaction, TransactionRepositoryTrait, TransactionUpdate,
};
use crate::users::{ProfileRepositoryTrait, ProfileUpdate, User};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Profile rows for the demo users.
#[derive(Default)]
pub struct MemoryProfileRepository {
    rows: Mutex<Vec<User>>,
}

impl MemoryProfileRepository {
    pub fn seeded(rows: Vec<User>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl ProfileRepositoryTrait for MemoryProfileRepository {
    async fn fetch(&self, user_id: &str) -> Result<Option<User>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|user| user.id == user_id).cloned())
    }

    async fn upsert(&self, user: User) -> Result<User> {
        let mut rows = self.rows.lock().await;
        match rows.iter_mut().find(|row| row.id == user.id) {
            Some(row) => *row = user.clone(),
            None => rows.push(user.clone()),
        }
        Ok(user)
    }

    async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows.iter_mut().find(|row| row.id == user_id) {
            update.apply_to(row);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTransactionRepository {
    rows: Mutex<Vec<Transaction>>,
}

impl MemoryTransactionRepository {
    pub fn seeded(rows: Vec<Transaction>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl TransactionRepositoryTrait for MemoryTransactionRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let rows = self.rows.lock().await;
        let mut listed: Vec<Transaction> = rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(listed)
    }

    async fn insert(&self, user_id: &str, new_transaction: NewTransaction) -> Result<Transaction> {
        let transaction = Transaction {
            id: new_id(),
            user_id: user_id.to_string(),
            amount: new_transaction.amount,
            description: new_transaction.description,
            category: new_transaction.category,
            transaction_type: new_transaction.transaction_type,
            date: new_transaction.date,
            goal_id: new_transaction.goal_id,
            status: new_transaction.status,
            is_shared: new_transaction.is_shared,
        };
        self.rows.lock().await.push(transaction.clone());
        Ok(transaction)
    }

    async fn update(&self, user_id: &str, id: &str, update: TransactionUpdate) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.id == id && row.user_id == user_id)
        {
            update.apply_to(row);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let mut rows = self.rows.lock().await;
        rows.retain(|row| !(row.id == id && row.user_id == user_id));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySavingGoalRepository {
    rows: Mutex<Vec<SavingGoal>>,
}

impl MemorySavingGoalRepository {
    pub fn seeded(rows: Vec<SavingGoal>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl SavingGoalRepositoryTrait for MemorySavingGoalRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavingGoal>> {
        let rows = self.rows.lock().await;
        // insertion order stands in for creation time, newest last
        Ok(rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn insert(&self, user_id: &str, new_goal: NewSavingGoal) -> Result<SavingGoal> {
        let goal = SavingGoal {
            id: new_id(),
            user_id: user_id.to_string(),
            name: new_goal.name,
            target_amount: new_goal.target_amount,
            current_amount: Decimal::ZERO,
            deadline: new_goal.deadline,
            is_shared: new_goal.is_shared,
        };
        self.rows.lock().await.push(goal.clone());
        Ok(goal)
    }

    async fn update(&self, user_id: &str, id: &str, update: SavingGoalUpdate) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.id == id && row.user_id == user_id)
        {
            update.apply_to(row);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let mut rows = self.rows.lock().await;
        rows.retain(|row| !(row.id == id && row.user_id == user_id));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRecurringRepository {
    rows: Mutex<Vec<RecurringTransaction>>,
}

impl MemoryRecurringRepository {
    pub fn seeded(rows: Vec<RecurringTransaction>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl RecurringRepositoryTrait for MemoryRecurringRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<RecurringTransaction>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        user_id: &str,
        new_recurring: NewRecurringTransaction,
        next_due_date: NaiveDate,
    ) -> Result<RecurringTransaction> {
        let recurring = RecurringTransaction {
            id: new_id(),
            user_id: user_id.to_string(),
            amount: new_recurring.amount,
            description: new_recurring.description,
            category: new_recurring.category,
            recurring_type: new_recurring.recurring_type,
            frequency: new_recurring.frequency,
            day_of_month: new_recurring.day_of_month,
            start_date: new_recurring.start_date,
            next_due_date,
            is_shared: new_recurring.is_shared,
        };
        self.rows.lock().await.push(recurring.clone());
        Ok(recurring)
    }

    async fn update(&self, user_id: &str, id: &str, update: RecurringUpdate) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.id == id && row.user_id == user_id)
        {
            update.apply_to(row);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let mut rows = self.rows.lock().await;
        rows.retain(|row| !(row.id == id && row.user_id == user_id));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySmartAlertRepository {
    rows: Mutex<Vec<SmartAlert>>,
}

impl MemorySmartAlertRepository {
    pub fn seeded(rows: Vec<SmartAlert>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl SmartAlertRepositoryTrait for MemorySmartAlertRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SmartAlert>> {
        let rows = self.rows.lock().await;
        let mut listed: Vec<SmartAlert> = rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn insert(&self, user_id: &str, new_alert: NewSmartAlert) -> Result<SmartAlert> {
        let alert = SmartAlert {
            id: new_id(),
            user_id: user_id.to_string(),
            alert_type: new_alert.alert_type,
            title: new_alert.title,
            message: new_alert.message,
            created_at: Utc::now(),
            read: false,
        };
        self.rows.lock().await.push(alert.clone());
        Ok(alert)
    }

    async fn mark_read(&self, user_id: &str, id: &str) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.id == id && row.user_id == user_id)
        {
            row.read = true;
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let mut rows = self.rows.lock().await;
        rows.retain(|row| !(row.id == id && row.user_id == user_id));
        Ok(())
    }
}
