//! Monthly financial aggregation for the tracker.
//!
//! This module contains the one real computation in the system: joining a
//! group's transactions with its installment records and bucketing the
//! reference month's expense mass by category, card and member. The
//! aggregation itself is a pure function of its inputs plus an explicit
//! reference month; the service wrapper only fetches those inputs.

use anyhow::Result;
use log::warn;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::commands::summary::MonthlySummaryQuery;
use crate::domain::models::member::MemberProfile;
use crate::domain::models::summary::{
    CardBucket, CategoryBucket, FixedCategorySet, MonthRef, MonthlyEntry, MonthlySummary,
    UserBucket,
};
use crate::domain::models::transaction::{CardType, InstallmentRecord, Transaction};
use crate::storage::{Connection, InstallmentStorage, MemberStorage, TransactionStorage};

/// Service wrapper that fetches a group's records and aggregates them.
#[derive(Clone)]
pub struct SummaryService<C: Connection> {
    transaction_repository: C::TransactionRepository,
    installment_repository: C::InstallmentRepository,
    member_repository: C::MemberRepository,
    fixed_categories: FixedCategorySet,
}

impl<C: Connection> SummaryService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self::with_fixed_categories(connection, FixedCategorySet::default())
    }

    pub fn with_fixed_categories(connection: Arc<C>, fixed_categories: FixedCategorySet) -> Self {
        Self {
            transaction_repository: connection.create_transaction_repository(),
            installment_repository: connection.create_installment_repository(),
            member_repository: connection.create_member_repository(),
            fixed_categories,
        }
    }

    /// Compute the financial summary for one month of a group's records.
    pub async fn monthly_summary(&self, query: MonthlySummaryQuery) -> Result<MonthlySummary> {
        let transactions = self
            .transaction_repository
            .list_all_transactions(&query.group_id)
            .await?;
        let installments = self
            .installment_repository
            .list_installments(&query.group_id)
            .await?;
        let members = self.member_repository.list_members(&query.group_id).await?;
        let profiles: HashMap<String, MemberProfile> =
            members.into_iter().map(|m| (m.id.clone(), m)).collect();

        Ok(build_monthly_summary(
            &transactions,
            &installments,
            &profiles,
            query.month,
            &self.fixed_categories,
        ))
    }
}

/// Aggregate one month of expense mass across categories, cards and members.
///
/// Pure and total: no wall clock, no I/O, and degenerate (all-zero, empty)
/// output for empty input. A purchase split into installments contributes
/// through its installment records only - never through the raw transaction
/// amount - so the full purchase price is not double counted in the purchase
/// month. An installment whose owning transaction cannot be found is
/// excluded from every total and bucket.
pub fn build_monthly_summary(
    transactions: &[Transaction],
    installments: &[InstallmentRecord],
    profiles: &HashMap<String, MemberProfile>,
    month: MonthRef,
    fixed_categories: &FixedCategorySet,
) -> MonthlySummary {
    let by_id: HashMap<&str, &Transaction> =
        transactions.iter().map(|t| (t.id.as_str(), t)).collect();

    // The month's expense mass as one uniform entry list: single-payment
    // transactions dated in the month, plus each installment falling due in
    // the month paired with its owning transaction.
    let mut entries: Vec<MonthlyEntry> = transactions
        .iter()
        .filter(|t| month.contains(t.date) && !t.is_installment_purchase())
        .map(|t| MonthlyEntry::Actual(t.clone()))
        .collect();

    for record in installments
        .iter()
        .filter(|i| i.due_month == month.month && i.due_year == month.year)
    {
        match by_id.get(record.transaction_id.as_str()) {
            Some(owner) => entries.push(MonthlyEntry::Installment {
                record: record.clone(),
                owner: (*owner).clone(),
            }),
            None => warn!(
                "Installment {} references missing transaction {}; excluded from monthly summary",
                record.id, record.transaction_id
            ),
        }
    }

    let total_expenses: f64 = entries.iter().map(|e| e.amount()).sum();
    let credit_card_expenses: f64 = entries
        .iter()
        .filter(|e| e.card_type() == CardType::Credit)
        .map(|e| e.amount())
        .sum();
    let debit_expenses: f64 = entries
        .iter()
        .filter(|e| e.card_type() == CardType::Debit)
        .map(|e| e.amount())
        .sum();
    // Recurring subtotal counts real transactions only; installment plans
    // model their own schedule.
    let total_fixed: f64 = entries
        .iter()
        .filter(|e| matches!(e, MonthlyEntry::Actual(_)) && e.is_recurring())
        .map(|e| e.amount())
        .sum();
    let fixed_expenses: f64 = entries
        .iter()
        .filter(|e| fixed_categories.contains(e.category()))
        .map(|e| e.amount())
        .sum();

    let categories = bucket_by_category(&entries, total_expenses);
    let cards = bucket_by_card(transactions, &entries, month, total_expenses);
    let users = bucket_by_user(&entries, profiles, total_expenses);

    MonthlySummary {
        month,
        total_expenses,
        total_fixed,
        fixed_expenses,
        credit_card_expenses,
        debit_expenses,
        categories,
        cards,
        users,
    }
}

fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Descending by total; name breaks ties so identical inputs always produce
/// identical output.
fn descending_by_total(a: f64, b: f64, name_a: &str, name_b: &str) -> Ordering {
    b.partial_cmp(&a)
        .unwrap_or(Ordering::Equal)
        .then_with(|| name_a.cmp(name_b))
}

fn bucket_by_category(entries: &[MonthlyEntry], total_expenses: f64) -> Vec<CategoryBucket> {
    let mut groups: HashMap<String, Vec<MonthlyEntry>> = HashMap::new();
    for entry in entries {
        groups
            .entry(entry.category().to_string())
            .or_default()
            .push(entry.clone());
    }

    let mut buckets: Vec<CategoryBucket> = groups
        .into_iter()
        .map(|(name, entries)| {
            // Recomputed from the final entry list rather than accumulated
            // incrementally, so the bucket total cannot drift from its rows.
            let total: f64 = entries.iter().map(|e| e.amount()).sum();
            CategoryBucket {
                name,
                total,
                percentage: percentage_of(total, total_expenses),
                entries,
            }
        })
        .collect();

    buckets.sort_by(|a, b| descending_by_total(a.total, b.total, &a.name, &b.name));
    buckets
}

/// Card buckets differ from the other two dimensions: the entry list carries
/// the card's full transaction history so card views can render it, while
/// the reported total stays restricted to the reference month. Card names
/// merge case- and whitespace-insensitively; the display name keeps the
/// first-seen casing.
fn bucket_by_card(
    transactions: &[Transaction],
    entries: &[MonthlyEntry],
    month: MonthRef,
    total_expenses: f64,
) -> Vec<CardBucket> {
    struct CardAccum {
        name: String,
        month_total: f64,
        entries: Vec<MonthlyEntry>,
    }

    let mut groups: HashMap<String, CardAccum> = HashMap::new();

    for tx in transactions {
        let key = normalize_card_name(&tx.card_name);
        let accum = groups.entry(key).or_insert_with(|| CardAccum {
            name: tx.card_name.trim().to_string(),
            month_total: 0.0,
            entries: Vec::new(),
        });
        accum.entries.push(MonthlyEntry::Actual(tx.clone()));
        if month.contains(tx.date) && !tx.is_installment_purchase() {
            accum.month_total += tx.amount.abs();
        }
    }

    for entry in entries {
        if let MonthlyEntry::Installment { owner, .. } = entry {
            let key = normalize_card_name(&owner.card_name);
            let accum = groups.entry(key).or_insert_with(|| CardAccum {
                name: owner.card_name.trim().to_string(),
                month_total: 0.0,
                entries: Vec::new(),
            });
            accum.month_total += entry.amount();
            accum.entries.push(entry.clone());
        }
    }

    let mut buckets: Vec<CardBucket> = groups
        .into_values()
        .map(|accum| CardBucket {
            percentage: percentage_of(accum.month_total, total_expenses),
            name: accum.name,
            total: accum.month_total,
            entries: accum.entries,
        })
        .collect();

    buckets.sort_by(|a, b| descending_by_total(a.total, b.total, &a.name, &b.name));
    buckets
}

fn normalize_card_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Per-member buckets. Installment amounts follow the installment record's
/// own creator, which may differ from the owning transaction's creator when
/// an installment was reassigned; categories and cards attribute through the
/// owning transaction instead.
fn bucket_by_user(
    entries: &[MonthlyEntry],
    profiles: &HashMap<String, MemberProfile>,
    total_expenses: f64,
) -> Vec<UserBucket> {
    let mut groups: HashMap<String, Vec<MonthlyEntry>> = HashMap::new();
    for entry in entries {
        groups
            .entry(entry.spender().to_string())
            .or_default()
            .push(entry.clone());
    }

    let mut buckets: Vec<UserBucket> = groups
        .into_iter()
        .map(|(user_id, entries)| {
            let total_spent: f64 = entries.iter().map(|e| e.amount()).sum();
            let profile = profiles.get(&user_id);
            UserBucket {
                name: profile.map_or_else(|| user_id.clone(), |p| p.name.clone()),
                avatar_url: profile.and_then(|p| p.avatar_url.clone()),
                user_id,
                total_spent,
                percentage: percentage_of(total_spent, total_expenses),
                entries,
            }
        })
        .collect();

    buckets.sort_by(|a, b| descending_by_total(a.total_spent, b.total_spent, &a.user_id, &b.user_id));
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::transaction::CardType;

    fn tx(id: &str, amount: f64, date: &str, category: &str, card: &str, card_type: CardType) -> Transaction {
        Transaction {
            id: id.to_string(),
            group_id: "group-1".to_string(),
            description: format!("{} purchase", category),
            amount,
            date: date.parse().unwrap(),
            category: category.to_string(),
            card_name: card.to_string(),
            card_type,
            installments: None,
            is_recurring: false,
            created_by: "member-1".to_string(),
            created_at: "2025-01-01T12:00:00-03:00".parse().unwrap(),
        }
    }

    fn inst(id: &str, tx_id: &str, number: u32, total: u32, amount: f64, month: u32, year: i32) -> InstallmentRecord {
        InstallmentRecord {
            id: id.to_string(),
            transaction_id: tx_id.to_string(),
            group_id: "group-1".to_string(),
            installment_number: number,
            total_installments: total,
            amount,
            due_month: month,
            due_year: year,
            is_paid: false,
            paid_at: None,
            created_by: "member-1".to_string(),
        }
    }

    fn summarize(
        transactions: &[Transaction],
        installments: &[InstallmentRecord],
        month: MonthRef,
    ) -> MonthlySummary {
        build_monthly_summary(
            transactions,
            installments,
            &HashMap::new(),
            month,
            &FixedCategorySet::default(),
        )
    }

    #[test]
    fn test_empty_inputs_yield_degenerate_summary() {
        let summary = summarize(&[], &[], MonthRef::new(6, 2025));
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.credit_card_expenses, 0.0);
        assert_eq!(summary.debit_expenses, 0.0);
        assert!(summary.categories.is_empty());
        assert!(summary.cards.is_empty());
        assert!(summary.users.is_empty());
        assert!(summary.top_categories().is_empty());
        assert!(summary.top_card().is_none());
        assert!(summary.top_user().is_none());
    }

    #[test]
    fn test_categories_partition_total_expenses() {
        let transactions = vec![
            tx("tx-1-a", 120.0, "2025-06-02", "Alimentação", "Nubank", CardType::Credit),
            tx("tx-2-b", 80.0, "2025-06-10", "Transporte", "Itaú", CardType::Debit),
            tx("tx-3-c", 45.5, "2025-06-15", "Alimentação", "Nubank", CardType::Credit),
            tx("tx-4-d", 999.0, "2025-05-20", "Viagem", "Nubank", CardType::Credit),
        ];
        let summary = summarize(&transactions, &[], MonthRef::new(6, 2025));

        let category_sum: f64 = summary.categories.iter().map(|c| c.total).sum();
        assert!((category_sum - summary.total_expenses).abs() < 1e-9);
        assert_eq!(summary.total_expenses, 245.5);

        let percentage_sum: f64 = summary.categories.iter().map(|c| c.percentage).sum();
        assert!((percentage_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_is_credit_plus_debit() {
        let transactions = vec![
            tx("tx-1-a", 100.0, "2025-06-02", "Mercado", "Nubank", CardType::Credit),
            tx("tx-2-b", 60.0, "2025-06-03", "Farmácia", "Itaú", CardType::Debit),
        ];
        let summary = summarize(&transactions, &[], MonthRef::new(6, 2025));
        assert!(
            (summary.total_expenses - (summary.credit_card_expenses + summary.debit_expenses)).abs()
                < 1e-9
        );
        assert_eq!(summary.credit_card_expenses, 100.0);
        assert_eq!(summary.debit_expenses, 60.0);
    }

    #[test]
    fn test_installment_purchase_contributes_only_through_installments() {
        // One purchase of 300 in 3 installments, dated January.
        let mut purchase = tx("tx-1-a", 300.0, "2025-01-15", "Casa", "Nubank", CardType::Credit);
        purchase.installments = Some(3);
        let transactions = vec![purchase];
        let installments = vec![
            inst("inst-1-1", "tx-1-a", 1, 3, 100.0, 1, 2025),
            inst("inst-1-2", "tx-1-a", 2, 3, 100.0, 2, 2025),
            inst("inst-1-3", "tx-1-a", 3, 3, 100.0, 3, 2025),
        ];

        let january = summarize(&transactions, &installments, MonthRef::new(1, 2025));
        assert_eq!(january.total_expenses, 100.0);
        assert_eq!(january.credit_card_expenses, 100.0);

        let february = summarize(&transactions, &installments, MonthRef::new(2, 2025));
        assert_eq!(february.total_expenses, 100.0);

        let april = summarize(&transactions, &installments, MonthRef::new(4, 2025));
        assert_eq!(april.total_expenses, 0.0);
    }

    #[test]
    fn test_dangling_installment_is_excluded_everywhere() {
        let transactions = vec![tx("tx-1-a", 50.0, "2025-06-02", "Mercado", "Nubank", CardType::Credit)];
        let installments = vec![inst("inst-9-1", "tx-gone", 1, 3, 100.0, 6, 2025)];

        let summary = summarize(&transactions, &installments, MonthRef::new(6, 2025));
        assert_eq!(summary.total_expenses, 50.0);
        assert_eq!(summary.credit_card_expenses, 50.0);
        let category_sum: f64 = summary.categories.iter().map(|c| c.total).sum();
        assert_eq!(category_sum, 50.0);
        let user_sum: f64 = summary.users.iter().map(|u| u.total_spent).sum();
        assert_eq!(user_sum, 50.0);
    }

    #[test]
    fn test_card_buckets_merge_case_and_whitespace_insensitively() {
        let transactions = vec![
            tx("tx-1-a", 30.0, "2025-06-02", "Mercado", "Nubank", CardType::Credit),
            tx("tx-2-b", 20.0, "2025-06-03", "Padaria", " nubank ", CardType::Credit),
            tx("tx-3-c", 10.0, "2025-06-04", "Farmácia", "Itaú", CardType::Debit),
        ];
        let summary = summarize(&transactions, &[], MonthRef::new(6, 2025));

        assert_eq!(summary.cards.len(), 2);
        let nubank = &summary.cards[0];
        assert_eq!(nubank.name, "Nubank"); // first-seen casing
        assert_eq!(nubank.total, 50.0);
        assert_eq!(summary.top_card().unwrap().name, "Nubank");
    }

    #[test]
    fn test_card_entries_carry_full_history_but_total_is_monthly() {
        let transactions = vec![
            tx("tx-1-a", 500.0, "2025-05-10", "Viagem", "Nubank", CardType::Credit),
            tx("tx-2-b", 40.0, "2025-06-05", "Mercado", "Nubank", CardType::Credit),
        ];
        let summary = summarize(&transactions, &[], MonthRef::new(6, 2025));

        let nubank = &summary.cards[0];
        assert_eq!(nubank.total, 40.0);
        assert_eq!(nubank.entries.len(), 2); // May's purchase still listed
    }

    #[test]
    fn test_card_total_includes_installment_share() {
        let mut purchase = tx("tx-1-a", 300.0, "2025-01-15", "Casa", "Nubank", CardType::Credit);
        purchase.installments = Some(3);
        let transactions = vec![
            purchase,
            tx("tx-2-b", 25.0, "2025-02-10", "Mercado", "nubank", CardType::Credit),
        ];
        let installments = vec![
            inst("inst-1-1", "tx-1-a", 1, 3, 100.0, 1, 2025),
            inst("inst-1-2", "tx-1-a", 2, 3, 100.0, 2, 2025),
        ];

        let summary = summarize(&transactions, &installments, MonthRef::new(2, 2025));
        assert_eq!(summary.cards.len(), 1);
        assert_eq!(summary.cards[0].total, 125.0); // 25 actual + 100 installment
    }

    #[test]
    fn test_user_attribution_follows_installment_creator() {
        let mut purchase = tx("tx-1-a", 200.0, "2025-01-10", "Casa", "Nubank", CardType::Credit);
        purchase.installments = Some(2);
        purchase.created_by = "member-1".to_string();
        let mut reassigned = inst("inst-1-2", "tx-1-a", 2, 2, 100.0, 2, 2025);
        reassigned.created_by = "member-2".to_string();

        let summary = summarize(&[purchase], &[reassigned], MonthRef::new(2, 2025));
        assert_eq!(summary.users.len(), 1);
        assert_eq!(summary.users[0].user_id, "member-2");
        assert_eq!(summary.users[0].total_spent, 100.0);
    }

    #[test]
    fn test_user_names_resolve_through_profiles() {
        let transactions = vec![tx("tx-1-a", 10.0, "2025-06-02", "Mercado", "Nubank", CardType::Credit)];
        let mut profiles = HashMap::new();
        profiles.insert(
            "member-1".to_string(),
            MemberProfile {
                id: "member-1".to_string(),
                name: "Ana".to_string(),
                avatar_url: Some("https://example.com/ana.png".to_string()),
            },
        );

        let summary = build_monthly_summary(
            &transactions,
            &[],
            &profiles,
            MonthRef::new(6, 2025),
            &FixedCategorySet::default(),
        );
        assert_eq!(summary.users[0].name, "Ana");
        assert_eq!(summary.users[0].avatar_url.as_deref(), Some("https://example.com/ana.png"));

        // Unknown spenders fall back to the raw id
        let summary = summarize(&transactions, &[], MonthRef::new(6, 2025));
        assert_eq!(summary.users[0].name, "member-1");
    }

    #[test]
    fn test_fixed_subtotals() {
        let mut rent = tx("tx-1-a", 1500.0, "2025-06-01", "Aluguel", "Itaú", CardType::Debit);
        rent.is_recurring = true;
        let mut gym = tx("tx-2-b", 90.0, "2025-06-03", "Saúde", "Itaú", CardType::Debit);
        gym.is_recurring = true;
        let groceries = tx("tx-3-c", 200.0, "2025-06-05", "Mercado", "Nubank", CardType::Credit);

        // A subscription paid in installments still counts as a fixed
        // category through its owning transaction.
        let mut subscription = tx("tx-4-d", 120.0, "2025-05-20", "Assinaturas", "Nubank", CardType::Credit);
        subscription.installments = Some(2);
        let installments = vec![inst("inst-4-2", "tx-4-d", 2, 2, 60.0, 6, 2025)];

        let summary = summarize(
            &[rent, gym, groceries, subscription],
            &installments,
            MonthRef::new(6, 2025),
        );
        assert_eq!(summary.total_fixed, 1590.0); // recurring actuals only
        assert_eq!(summary.fixed_expenses, 1560.0); // Aluguel + Assinaturas installment
    }

    #[test]
    fn test_top_categories_are_first_three() {
        let transactions = vec![
            tx("tx-1-a", 400.0, "2025-06-01", "Mercado", "Nubank", CardType::Credit),
            tx("tx-2-b", 300.0, "2025-06-02", "Transporte", "Nubank", CardType::Credit),
            tx("tx-3-c", 200.0, "2025-06-03", "Lazer", "Nubank", CardType::Credit),
            tx("tx-4-d", 100.0, "2025-06-04", "Farmácia", "Nubank", CardType::Credit),
        ];
        let summary = summarize(&transactions, &[], MonthRef::new(6, 2025));

        let top: Vec<&str> = summary.top_categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(top, ["Mercado", "Transporte", "Lazer"]);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let transactions = vec![
            tx("tx-1-a", 10.0, "2025-06-01", "A", "Card A", CardType::Credit),
            tx("tx-2-b", 10.0, "2025-06-02", "B", "Card B", CardType::Credit),
            tx("tx-3-c", 10.0, "2025-06-03", "C", "Card C", CardType::Debit),
        ];
        let installments: Vec<InstallmentRecord> = Vec::new();

        let first = summarize(&transactions, &installments, MonthRef::new(6, 2025));
        let second = summarize(&transactions, &installments, MonthRef::new(6, 2025));
        assert_eq!(first, second);

        // Equal totals sort by name, so the order is stable too
        let names: Vec<&str> = first.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }
}
