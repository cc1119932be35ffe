mod dataset;

pub use dataset::{DemoDataset, EXPENSE_CATEGORIES, INCOME_CATEGORIES, SAVING_CATEGORIES};
