//! Mapping between domain installment records and their public DTOs.

use crate::domain::models::transaction::InstallmentRecord as DomainInstallment;

pub struct InstallmentMapper;

impl InstallmentMapper {
    pub fn to_dto(installment: DomainInstallment) -> shared::InstallmentRecord {
        shared::InstallmentRecord {
            id: installment.id,
            transaction_id: installment.transaction_id,
            group_id: installment.group_id,
            installment_number: installment.installment_number,
            total_installments: installment.total_installments,
            amount: installment.amount,
            due_month: installment.due_month,
            due_year: installment.due_year,
            is_paid: installment.is_paid,
            paid_at: installment.paid_at.map(|t| t.to_rfc3339()),
            created_by: installment.created_by,
        }
    }
}
