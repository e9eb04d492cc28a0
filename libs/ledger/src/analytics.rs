//! Dashboard aggregations over a user's expenses
//!
//! Expenses whose category does not resolve are reported under the
//! sentinel's name instead of being dropped.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Month};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::{ExpenseWithCategory, round2},
    sentinel::NO_CATEGORY_NAME,
};

/// Totals shown at the top of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_amount: f64,
    pub total_count: usize,
    pub average_expense: f64,
    pub category_breakdown: BTreeMap<String, f64>,
}

/// Spending for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalytics {
    pub category_id: Option<Uuid>,
    pub category_name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub total_amount: f64,
    pub count: usize,
    pub average_amount: f64,
}

/// Spending for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub month: u32,
    pub month_name: String,
    pub total_amount: f64,
    pub count: usize,
}

fn category_name(item: &ExpenseWithCategory) -> &str {
    item.category
        .as_ref()
        .map_or(NO_CATEGORY_NAME, |c| c.name.as_str())
}

pub fn summarize(expenses: &[ExpenseWithCategory]) -> DashboardSummary {
    let total_amount: f64 = expenses.iter().map(|e| e.expense.amount).sum();
    let total_count = expenses.len();

    let mut category_breakdown = BTreeMap::new();
    for item in expenses {
        *category_breakdown
            .entry(category_name(item).to_string())
            .or_insert(0.0) += item.expense.amount;
    }

    let average_expense = if total_count > 0 {
        round2(total_amount / total_count as f64)
    } else {
        0.0
    };

    DashboardSummary {
        total_amount,
        total_count,
        average_expense,
        category_breakdown,
    }
}

/// Per-category totals, in order of first appearance. Rows are keyed by
/// category name, so orphans share the row of a real "No Category".
pub fn category_analytics(expenses: &[ExpenseWithCategory]) -> Vec<CategoryAnalytics> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<CategoryAnalytics> = Vec::new();

    for item in expenses {
        let name = category_name(item);
        let position = *index.entry(name).or_insert_with(|| {
            rows.push(CategoryAnalytics {
                category_id: None,
                category_name: name.to_string(),
                color: None,
                icon: None,
                total_amount: 0.0,
                count: 0,
                average_amount: 0.0,
            });
            rows.len() - 1
        });

        let row = &mut rows[position];
        if let (None, Some(category)) = (row.category_id, item.category.as_ref()) {
            row.category_id = Some(category.id);
            row.color = category.color.clone();
            row.icon = category.icon.clone();
        }
        row.total_amount += item.expense.amount;
        row.count += 1;
    }

    for row in &mut rows {
        row.average_amount = round2(row.total_amount / row.count as f64);
    }

    rows
}

/// Twelve entries, January first. Expenses outside `year` are ignored.
pub fn monthly_trends(expenses: &[ExpenseWithCategory], year: i32) -> Vec<MonthlyTrend> {
    let mut trends: Vec<MonthlyTrend> = (1..=12u32)
        .map(|month| MonthlyTrend {
            month,
            month_name: Month::try_from(month as u8)
                .map(|m| m.name().to_string())
                .unwrap_or_default(),
            total_amount: 0.0,
            count: 0,
        })
        .collect();

    for item in expenses.iter().filter(|e| e.expense.date.year() == year) {
        let trend = &mut trends[item.expense.date.month0() as usize];
        trend.total_amount += item.expense.amount;
        trend.count += 1;
    }

    trends
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::{Category, Expense};

    fn category(name: &str) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: Some("#EF4444".to_string()),
            icon: Some("🍔".to_string()),
            user_id: Uuid::nil(),
            created_at: now,
            updated_at: now,
        }
    }

    fn expense(amount: f64, month: u32, category: Option<&Category>) -> ExpenseWithCategory {
        let date = Utc.with_ymd_and_hms(2024, month, 15, 12, 0, 0).unwrap();
        ExpenseWithCategory {
            expense: Expense {
                id: Uuid::new_v4(),
                title: "item".to_string(),
                amount,
                currency: "USD".to_string(),
                description: None,
                date,
                user_id: Uuid::nil(),
                category_id: category.map(|c| c.id),
                created_at: date,
                updated_at: date,
            },
            category: category.cloned(),
        }
    }

    #[test]
    fn test_summarize() {
        let food = category("Food & Dining");
        let expenses = vec![
            expense(10.0, 1, Some(&food)),
            expense(5.0, 2, Some(&food)),
            expense(5.0, 2, None),
        ];

        let summary = summarize(&expenses);

        assert_eq!(summary.total_amount, 20.0);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.average_expense, 6.67);
        assert_eq!(summary.category_breakdown["Food & Dining"], 15.0);
        assert_eq!(summary.category_breakdown[NO_CATEGORY_NAME], 5.0);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.average_expense, 0.0);
        assert!(summary.category_breakdown.is_empty());
    }

    #[test]
    fn test_category_analytics_groups_and_averages() {
        let food = category("Food & Dining");
        let travel = category("Travel");
        let expenses = vec![
            expense(9.0, 1, Some(&food)),
            expense(100.0, 1, Some(&travel)),
            expense(1.0, 3, Some(&food)),
            expense(2.0, 3, None),
        ];

        let rows = category_analytics(&expenses);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].category_name, "Food & Dining");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].average_amount, 5.0);
        assert_eq!(rows[1].category_id, Some(travel.id));
        assert_eq!(rows[2].category_id, None);
        assert_eq!(rows[2].category_name, NO_CATEGORY_NAME);
    }

    #[test]
    fn test_orphans_share_the_no_category_row() {
        let sentinel = category(NO_CATEGORY_NAME);
        let expenses = vec![
            expense(4.0, 1, None),
            expense(6.0, 2, Some(&sentinel)),
        ];

        let rows = category_analytics(&expenses);
        let summary = summarize(&expenses);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category_id, Some(sentinel.id));
        assert_eq!(rows[0].icon.as_deref(), Some("🍔"));
        assert_eq!(rows[0].total_amount, 10.0);
        assert_eq!(rows[0].count, 2);
        assert_eq!(summary.category_breakdown.len(), 1);
        assert_eq!(summary.category_breakdown[NO_CATEGORY_NAME], rows[0].total_amount);
    }

    #[test]
    fn test_monthly_trends() {
        let expenses = vec![expense(10.0, 1, None), expense(4.0, 1, None), expense(7.0, 12, None)];

        let trends = monthly_trends(&expenses, 2024);

        assert_eq!(trends.len(), 12);
        assert_eq!(trends[0].month_name, "January");
        assert_eq!(trends[0].total_amount, 14.0);
        assert_eq!(trends[0].count, 2);
        assert_eq!(trends[11].month_name, "December");
        assert_eq!(trends[11].count, 1);
        assert!(monthly_trends(&expenses, 2023).iter().all(|t| t.count == 0));
    }
}
