//! Mapping between the public report DTOs and domain report commands.

use anyhow::{anyhow, Result};

use crate::domain::commands::reports::ReportKind as DomainReportKind;

pub struct ReportMapper;

impl ReportMapper {
    pub fn kind_to_domain(kind: shared::ReportKind) -> DomainReportKind {
        match kind {
            shared::ReportKind::Full => DomainReportKind::Full,
            shared::ReportKind::ByCategory => DomainReportKind::ByCategory,
            shared::ReportKind::ByCard => DomainReportKind::ByCard,
            shared::ReportKind::ByUser => DomainReportKind::ByUser,
        }
    }

    pub fn kind_to_dto(kind: DomainReportKind) -> shared::ReportKind {
        match kind {
            DomainReportKind::Full => shared::ReportKind::Full,
            DomainReportKind::ByCategory => shared::ReportKind::ByCategory,
            DomainReportKind::ByCard => shared::ReportKind::ByCard,
            DomainReportKind::ByUser => shared::ReportKind::ByUser,
        }
    }

    /// Parse the `kind` query parameter; the tags match the generated
    /// filenames.
    pub fn parse_kind(value: &str) -> Result<DomainReportKind> {
        match value {
            "full" => Ok(DomainReportKind::Full),
            "category" => Ok(DomainReportKind::ByCategory),
            "card" => Ok(DomainReportKind::ByCard),
            "user" => Ok(DomainReportKind::ByUser),
            other => Err(anyhow!(
                "Unknown report kind '{}', expected full, category, card or user",
                other
            )),
        }
    }
}
