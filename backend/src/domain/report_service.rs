//! Report text generation.
//!
//! Reports are pure string formatting over an already-computed monthly
//! summary: a totals header, the breakdown section(s) the report kind
//! selects, and the itemized transaction list, concatenated in a fixed
//! order so the same summary always renders the same text.

use anyhow::Result;
use log::{error, info};
use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;

use crate::domain::commands::reports::{
    ExportReportCommand, ExportReportResult, ReportKind, ReportQuery, ReportResult,
};
use crate::domain::commands::summary::MonthlySummaryQuery;
use crate::domain::models::summary::{MonthlyEntry, MonthlySummary};
use crate::domain::summary_service::SummaryService;
use crate::storage::Connection;

#[derive(Clone, Default)]
pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self
    }

    /// Generate the report text for one month of a group's records.
    pub async fn generate_report<C: Connection>(
        &self,
        query: ReportQuery,
        summary_service: &SummaryService<C>,
    ) -> Result<ReportResult> {
        let summary = summary_service
            .monthly_summary(MonthlySummaryQuery {
                group_id: query.group_id.clone(),
                month: query.month,
            })
            .await?;

        let report_text = render_report(&summary, query.kind);
        let filename = report_filename(&query.group_id, query.kind, &summary);
        info!(
            "Generated {} report for group {} ({} bytes)",
            query.kind.tag(),
            query.group_id,
            report_text.len()
        );

        Ok(ReportResult {
            report_text,
            filename,
            kind: query.kind,
            month: query.month,
        })
    }

    /// Write a generated report to disk. I/O problems come back as a
    /// failure response, not an error - a denied directory should not look
    /// like a crashed report.
    pub async fn export_to_path<C: Connection>(
        &self,
        cmd: ExportReportCommand,
        summary_service: &SummaryService<C>,
    ) -> Result<ExportReportResult> {
        let report = self
            .generate_report(
                ReportQuery {
                    group_id: cmd.group_id,
                    kind: cmd.kind,
                    month: cmd.month,
                },
                summary_service,
            )
            .await?;

        let export_dir = match cmd.custom_path {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => PathBuf::from("."),
        };
        let file_path = export_dir.join(&report.filename);

        if let Err(e) = fs::create_dir_all(&export_dir) {
            error!("Failed to create export directory {:?}: {}", export_dir, e);
            return Ok(ExportReportResult {
                success: false,
                message: format!("Failed to create export directory: {}", e),
                file_path: export_dir.to_string_lossy().to_string(),
            });
        }

        match fs::write(&file_path, &report.report_text) {
            Ok(_) => {
                let file_path = file_path.to_string_lossy().to_string();
                info!("Exported report to {}", file_path);
                Ok(ExportReportResult {
                    success: true,
                    message: format!("Report exported successfully to: {}", file_path),
                    file_path,
                })
            }
            Err(e) => {
                error!("Failed to write report to {:?}: {}", file_path, e);
                Ok(ExportReportResult {
                    success: false,
                    message: format!("Failed to write report: {}", e),
                    file_path: file_path.to_string_lossy().to_string(),
                })
            }
        }
    }
}

fn report_filename(group_id: &str, kind: ReportKind, summary: &MonthlySummary) -> String {
    format!(
        "{}_report_{}_{}{:02}.txt",
        group_id.replace(' ', "_").to_lowercase(),
        kind.tag(),
        summary.month.year,
        summary.month.month
    )
}

fn money(amount: f64) -> String {
    format!("R$ {:.2}", amount)
}

/// Render a summary as plain text. Pure; the section order is fixed.
pub fn render_report(summary: &MonthlySummary, kind: ReportKind) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "MONTHLY REPORT - {} {}\n",
        summary.month.month_name(),
        summary.month.year
    ));
    out.push_str("========================================\n\n");

    out.push_str("TOTALS\n");
    out.push_str(&format!("  {:<20} {:>14}\n", "Total expenses", money(summary.total_expenses)));
    out.push_str(&format!("  {:<20} {:>14}\n", "Recurring", money(summary.total_fixed)));
    out.push_str(&format!("  {:<20} {:>14}\n", "Fixed categories", money(summary.fixed_expenses)));
    out.push_str(&format!("  {:<20} {:>14}\n", "Credit card", money(summary.credit_card_expenses)));
    out.push_str(&format!("  {:<20} {:>14}\n", "Debit", money(summary.debit_expenses)));
    out.push('\n');

    if matches!(kind, ReportKind::Full | ReportKind::ByCategory) {
        out.push_str("BY CATEGORY\n");
        for category in &summary.categories {
            out.push_str(&format!(
                "  {:<24} {:>14}  {:>5.1}%\n",
                category.name,
                money(category.total),
                category.percentage
            ));
        }
        out.push('\n');
    }

    if matches!(kind, ReportKind::Full | ReportKind::ByCard) {
        out.push_str("BY CARD\n");
        for card in &summary.cards {
            out.push_str(&format!(
                "  {:<24} {:>14}  {:>5.1}%\n",
                card.name,
                money(card.total),
                card.percentage
            ));
        }
        out.push('\n');
    }

    if matches!(kind, ReportKind::Full | ReportKind::ByUser) {
        out.push_str("BY MEMBER\n");
        for user in &summary.users {
            out.push_str(&format!(
                "  {:<24} {:>14}  {:>5.1}%\n",
                user.name,
                money(user.total_spent),
                user.percentage
            ));
        }
        out.push('\n');
    }

    out.push_str("TRANSACTIONS\n");
    for entry in month_entries_in_order(summary) {
        let mut description = entry.description().to_string();
        if let MonthlyEntry::Installment { record, .. } = &entry {
            description.push_str(&format!(
                " ({}/{})",
                record.installment_number, record.total_installments
            ));
        }
        out.push_str(&format!(
            "  {}  {:<20} {:<32} {:>14}\n",
            entry.display_date(),
            entry.category(),
            description,
            money(entry.amount())
        ));
    }

    out
}

/// The month's entries, flattened back out of the category buckets (which
/// partition them exactly once) and put into a stable order.
fn month_entries_in_order(summary: &MonthlySummary) -> Vec<MonthlyEntry> {
    let mut entries: Vec<MonthlyEntry> = summary
        .categories
        .iter()
        .flat_map(|c| c.entries.iter().cloned())
        .collect();
    entries.sort_by(|a, b| {
        (a.display_date(), a.description())
            .cmp(&(b.display_date(), b.description()))
            .then_with(|| a.amount().partial_cmp(&b.amount()).unwrap_or(Ordering::Equal))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::summary::{FixedCategorySet, MonthRef};
    use crate::domain::models::transaction::{CardType, InstallmentRecord, Transaction};
    use crate::domain::summary_service::build_monthly_summary;
    use std::collections::HashMap;

    fn fixture_summary() -> MonthlySummary {
        let rent = Transaction {
            id: "tx-1-aaaa".to_string(),
            group_id: "group-1".to_string(),
            description: "Aluguel do apartamento".to_string(),
            amount: 1500.0,
            date: "2025-06-01".parse().unwrap(),
            category: "Aluguel".to_string(),
            card_name: "Itaú".to_string(),
            card_type: CardType::Debit,
            installments: None,
            is_recurring: true,
            created_by: "member-1".to_string(),
            created_at: "2025-06-01T08:00:00-03:00".parse().unwrap(),
        };

        let mut sofa = rent.clone();
        sofa.id = "tx-2-bbbb".to_string();
        sofa.description = "Sofá da sala".to_string();
        sofa.amount = 600.0;
        sofa.date = "2025-05-10".parse().unwrap();
        sofa.category = "Casa".to_string();
        sofa.card_name = "Nubank".to_string();
        sofa.card_type = CardType::Credit;
        sofa.installments = Some(3);
        sofa.is_recurring = false;

        let installment = InstallmentRecord {
            id: "inst-2-2".to_string(),
            transaction_id: "tx-2-bbbb".to_string(),
            group_id: "group-1".to_string(),
            installment_number: 2,
            total_installments: 3,
            amount: 200.0,
            due_month: 6,
            due_year: 2025,
            is_paid: false,
            paid_at: None,
            created_by: "member-2".to_string(),
        };

        build_monthly_summary(
            &[rent, sofa],
            &[installment],
            &HashMap::new(),
            MonthRef::new(6, 2025),
            &FixedCategorySet::default(),
        )
    }

    #[test]
    fn test_full_report_has_every_section() {
        let text = render_report(&fixture_summary(), ReportKind::Full);
        assert!(text.starts_with("MONTHLY REPORT - June 2025"));
        assert!(text.contains("TOTALS"));
        assert!(text.contains("BY CATEGORY"));
        assert!(text.contains("BY CARD"));
        assert!(text.contains("BY MEMBER"));
        assert!(text.contains("TRANSACTIONS"));
        assert!(text.contains("R$ 1700.00")); // total: rent + installment share
        assert!(text.contains("Sofá da sala (2/3)"));
    }

    #[test]
    fn test_dimension_reports_render_only_their_breakdown() {
        let summary = fixture_summary();

        let by_card = render_report(&summary, ReportKind::ByCard);
        assert!(by_card.contains("BY CARD"));
        assert!(!by_card.contains("BY CATEGORY"));
        assert!(!by_card.contains("BY MEMBER"));
        assert!(by_card.contains("TRANSACTIONS"));

        let by_category = render_report(&summary, ReportKind::ByCategory);
        assert!(by_category.contains("BY CATEGORY"));
        assert!(!by_category.contains("BY CARD"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let summary = fixture_summary();
        assert_eq!(
            render_report(&summary, ReportKind::Full),
            render_report(&summary, ReportKind::Full)
        );
    }

    #[test]
    fn test_report_filename() {
        let summary = fixture_summary();
        assert_eq!(
            report_filename("Casa Lar", ReportKind::ByUser, &summary),
            "casa_lar_report_user_202506.txt"
        );
    }

    #[tokio::test]
    async fn test_export_to_path_writes_file() {
        use crate::storage::csv::CsvConnection;
        use std::sync::Arc;
        use tempfile::TempDir;

        let data_dir = TempDir::new().unwrap();
        let export_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(data_dir.path()).unwrap());
        let summary_service = SummaryService::new(connection);
        let report_service = ReportService::new();

        let result = report_service
            .export_to_path(
                ExportReportCommand {
                    group_id: "group-1".to_string(),
                    kind: ReportKind::Full,
                    month: MonthRef::new(6, 2025),
                    custom_path: Some(export_dir.path().to_string_lossy().to_string()),
                },
                &summary_service,
            )
            .await
            .unwrap();

        assert!(result.success, "{}", result.message);
        let written = std::fs::read_to_string(&result.file_path).unwrap();
        assert!(written.starts_with("MONTHLY REPORT - June 2025"));
    }
}
