//! Deterministic demo dataset.
//!
//! Demo mode operates on synthetic data held only in memory. The dataset is
//! derived arithmetically from the index of each row rather than drawn from
//! a random generator, so every demo session starts from the same state and
//! tests can assert against exact rows.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::alerts::{AlertType, SmartAlert};
use crate::goals::SavingGoal;
use crate::recurring::{next_due_date, Frequency, RecurringTransaction, RecurringType};
use crate::transactions::{Transaction, TransactionStatus, TransactionType};
use crate::users::User;

/// Categories offered for income transactions.
pub const INCOME_CATEGORIES: [&str; 4] = ["Salario", "Freelance", "Inversiones", "Otros ingresos"];

/// Categories offered for expense transactions.
pub const EXPENSE_CATEGORIES: [&str; 7] = [
    "Alimentación",
    "Transporte",
    "Entretenimiento",
    "Servicios",
    "Compras",
    "Salud",
    "Vivienda",
];

/// Categories offered for saving transactions.
pub const SAVING_CATEGORIES: [&str; 4] = ["Emergencias", "Vacaciones", "Inversión", "Educación"];

const DEMO_TRANSACTION_COUNT: usize = 50;

/// The full set of sample entities a demo session starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoDataset {
    pub users: Vec<User>,
    pub transactions: Vec<Transaction>,
    pub goals: Vec<SavingGoal>,
    pub recurring: Vec<RecurringTransaction>,
    pub alerts: Vec<SmartAlert>,
}

fn demo_users() -> Vec<User> {
    vec![
        User {
            id: "demo-user-1".to_string(),
            email: "maria@email.com".to_string(),
            name: "María García".to_string(),
            avatar: Some(
                "https://images.unsplash.com/photo-1494790108755-2616b612b1d7?w=150&h=150&fit=crop&crop=face"
                    .to_string(),
            ),
        },
        User {
            id: "demo-user-2".to_string(),
            email: "carlos@email.com".to_string(),
            name: "Carlos López".to_string(),
            avatar: Some(
                "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150&h=150&fit=crop&crop=face"
                    .to_string(),
            ),
        },
    ]
}

/// Cheap index-based spread over `[min, max)` with cent precision.
fn spread_amount(index: usize, min: i64, max: i64) -> Decimal {
    let span_cents = (max - min) * 100;
    let cents = min * 100 + ((index as i64 * 8311) % span_cents);
    Decimal::new(cents, 2)
}

fn demo_transactions(today: NaiveDate, users: &[User]) -> Vec<Transaction> {
    (0..DEMO_TRANSACTION_COUNT)
        .map(|index| {
            let transaction_type = match index % 3 {
                0 => TransactionType::Income,
                1 => TransactionType::Expense,
                _ => TransactionType::Saving,
            };
            let (category, description, amount) = match transaction_type {
                TransactionType::Income => {
                    let category = INCOME_CATEGORIES[index % INCOME_CATEGORIES.len()];
                    (
                        category,
                        format!("Ingreso de {category}"),
                        spread_amount(index, 800, 3000),
                    )
                }
                TransactionType::Expense => {
                    let category = EXPENSE_CATEGORIES[index % EXPENSE_CATEGORIES.len()];
                    (
                        category,
                        format!("Gasto en {category}"),
                        spread_amount(index, 10, 500),
                    )
                }
                TransactionType::Saving => {
                    let category = SAVING_CATEGORIES[index % SAVING_CATEGORIES.len()];
                    (
                        category,
                        format!("Ahorro para {category}"),
                        spread_amount(index, 10, 500),
                    )
                }
            };

            // Spread dates over the last six months, one in four pending.
            let days_back = (index * 137) % 180;
            let date = day_at(today - Duration::days(days_back as i64), (index % 24) as u32);
            let status = if index % 4 == 1 {
                TransactionStatus::Pending
            } else {
                TransactionStatus::Approved
            };

            Transaction {
                id: format!("demo-txn-{}", index + 1),
                user_id: users[index % users.len()].id.clone(),
                amount,
                description,
                category: category.to_string(),
                transaction_type,
                date,
                goal_id: None,
                status,
                is_shared: index % 5 == 0,
            }
        })
        .collect()
}

fn demo_goals(today: NaiveDate, users: &[User]) -> Vec<SavingGoal> {
    vec![
        SavingGoal {
            id: "demo-goal-1".to_string(),
            user_id: users[0].id.clone(),
            name: "Vacaciones de verano".to_string(),
            target_amount: dec!(2000),
            current_amount: dec!(800),
            deadline: Some(today + Duration::days(120)),
            is_shared: true,
        },
        SavingGoal {
            id: "demo-goal-2".to_string(),
            user_id: users[0].id.clone(),
            name: "Fondo de emergencia".to_string(),
            target_amount: dec!(5000),
            current_amount: dec!(2300),
            deadline: Some(today + Duration::days(365)),
            is_shared: true,
        },
        SavingGoal {
            id: "demo-goal-3".to_string(),
            user_id: users[1].id.clone(),
            name: "Nuevo ordenador".to_string(),
            target_amount: dec!(1200),
            current_amount: dec!(400),
            deadline: Some(today + Duration::days(90)),
            is_shared: false,
        },
    ]
}

fn demo_recurring(today: NaiveDate, users: &[User]) -> Vec<RecurringTransaction> {
    let netflix_start = today - Duration::days(365);
    let saving_start = today - Duration::days(180);
    vec![
        RecurringTransaction {
            id: "demo-rec-1".to_string(),
            user_id: users[0].id.clone(),
            amount: dec!(12.99),
            description: "Suscripción Netflix".to_string(),
            category: "Entretenimiento".to_string(),
            recurring_type: RecurringType::Expense,
            frequency: Frequency::Monthly,
            day_of_month: 15,
            start_date: netflix_start,
            next_due_date: next_due_date(Frequency::Monthly, 15, netflix_start, today),
            is_shared: true,
        },
        RecurringTransaction {
            id: "demo-rec-2".to_string(),
            user_id: users[0].id.clone(),
            amount: dec!(200),
            description: "Ahorro mensual".to_string(),
            category: "Emergencias".to_string(),
            recurring_type: RecurringType::Saving,
            frequency: Frequency::Monthly,
            day_of_month: 1,
            start_date: saving_start,
            next_due_date: next_due_date(Frequency::Monthly, 1, saving_start, today),
            is_shared: false,
        },
    ]
}

fn demo_alerts(today: NaiveDate, users: &[User]) -> Vec<SmartAlert> {
    vec![
        SmartAlert {
            id: "demo-alert-1".to_string(),
            user_id: users[0].id.clone(),
            alert_type: AlertType::Warning,
            title: "Gasto alto este mes".to_string(),
            message: "Has gastado €450 más que el mes pasado en entretenimiento.".to_string(),
            created_at: day_at(today - Duration::days(2), 9),
            read: false,
        },
        SmartAlert {
            id: "demo-alert-2".to_string(),
            user_id: users[0].id.clone(),
            alert_type: AlertType::Success,
            title: "¡Meta de ahorro alcanzada!".to_string(),
            message: "Has completado el 40% de tu meta de vacaciones de verano.".to_string(),
            created_at: day_at(today - Duration::days(5), 18),
            read: true,
        },
        SmartAlert {
            id: "demo-alert-3".to_string(),
            user_id: users[0].id.clone(),
            alert_type: AlertType::Info,
            title: "Recordatorio de transacción recurrente".to_string(),
            message: "Tu ahorro mensual se procesará mañana.".to_string(),
            created_at: day_at(today - Duration::days(1), 8),
            read: false,
        },
    ]
}

/// Clock times are cosmetic, they only keep same-day rows from sharing one
/// timestamp.
fn day_at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour % 24, 0, 0).unwrap_or_default();
    NaiveDateTime::new(date, time).and_utc()
}

impl DemoDataset {
    /// Builds the dataset anchored on `today`, so relative dates (deadlines,
    /// due dates, alert ages) look current regardless of when the demo runs.
    pub fn build(today: NaiveDate) -> Self {
        let users = demo_users();
        let transactions = demo_transactions(today, &users);
        let goals = demo_goals(today, &users);
        let recurring = demo_recurring(today, &users);
        let alerts = demo_alerts(today, &users);
        DemoDataset {
            users,
            transactions,
            goals,
            recurring,
            alerts,
        }
    }

    /// The account the reserved demo credentials sign into.
    pub fn primary_user(&self) -> &User {
        &self.users[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEMO_EMAIL;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn dataset_is_deterministic() {
        assert_eq!(DemoDataset::build(today()), DemoDataset::build(today()));
    }

    #[test]
    fn primary_user_matches_the_reserved_credentials() {
        let dataset = DemoDataset::build(today());
        assert_eq!(dataset.primary_user().email, DEMO_EMAIL);
        assert_eq!(dataset.primary_user().name, "María García");
    }

    #[test]
    fn transaction_amounts_stay_in_their_bands() {
        let dataset = DemoDataset::build(today());
        assert_eq!(dataset.transactions.len(), 50);
        for transaction in &dataset.transactions {
            match transaction.transaction_type {
                TransactionType::Income => {
                    assert!(transaction.amount >= dec!(800) && transaction.amount < dec!(3000));
                }
                _ => {
                    assert!(transaction.amount >= dec!(10) && transaction.amount < dec!(500));
                }
            }
        }
    }

    #[test]
    fn one_in_four_transactions_is_pending() {
        let dataset = DemoDataset::build(today());
        let pending = dataset
            .transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Pending)
            .count();
        assert_eq!(pending, 13);
    }

    #[test]
    fn dates_fall_within_the_last_six_months() {
        let dataset = DemoDataset::build(today());
        let oldest = today() - Duration::days(180);
        for transaction in &dataset.transactions {
            let date = transaction.date.date_naive();
            assert!(date > oldest && date <= today());
        }
    }

    #[test]
    fn recurring_due_dates_are_never_in_the_past() {
        let dataset = DemoDataset::build(today());
        for recurring in &dataset.recurring {
            assert!(recurring.next_due_date >= today());
        }
    }

    #[test]
    fn both_partners_own_rows() {
        let dataset = DemoDataset::build(today());
        for user in &dataset.users {
            assert!(dataset.transactions.iter().any(|t| t.user_id == user.id));
        }
        assert!(dataset.goals.iter().any(|g| g.user_id == "demo-user-2"));
    }
}
