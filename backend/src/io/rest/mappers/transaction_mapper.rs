//! Mapping between domain transactions and their public DTOs.

use anyhow::{anyhow, Result};

use crate::domain::commands::transactions::CreateTransactionCommand;
use crate::domain::models::transaction::{CardType, Transaction as DomainTransaction};

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_dto(transaction: DomainTransaction) -> shared::Transaction {
        shared::Transaction {
            id: transaction.id,
            group_id: transaction.group_id,
            description: transaction.description,
            amount: transaction.amount,
            date: transaction.date.to_string(),
            category: transaction.category,
            card_name: transaction.card_name,
            card_type: Self::card_type_to_dto(transaction.card_type),
            installments: transaction.installments,
            installment_number: None,
            is_recurring: transaction.is_recurring,
            created_by: transaction.created_by,
            created_at: transaction.created_at.to_rfc3339(),
        }
    }

    pub fn card_type_to_dto(card_type: CardType) -> shared::CardType {
        match card_type {
            CardType::Credit => shared::CardType::Credit,
            CardType::Debit => shared::CardType::Debit,
        }
    }

    pub fn card_type_to_domain(card_type: shared::CardType) -> CardType {
        match card_type {
            shared::CardType::Credit => CardType::Credit,
            shared::CardType::Debit => CardType::Debit,
        }
    }

    /// Build the domain create command, parsing the optional date override.
    pub fn create_command(
        request: shared::CreateTransactionRequest,
    ) -> Result<CreateTransactionCommand> {
        let date = request
            .date
            .map(|d| {
                d.parse()
                    .map_err(|_| anyhow!("Invalid date '{}', expected YYYY-MM-DD", d))
            })
            .transpose()?;

        Ok(CreateTransactionCommand {
            group_id: request.group_id,
            description: request.description,
            amount: request.amount,
            date,
            category: request.category,
            card_name: request.card_name,
            card_type: Self::card_type_to_domain(request.card_type),
            installments: request.installments,
            is_recurring: request.is_recurring,
            created_by: request.created_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_command_rejects_bad_date() {
        let request = shared::CreateTransactionRequest {
            group_id: "group-1".to_string(),
            description: "Mercado".to_string(),
            amount: 10.0,
            date: Some("14/06/2025".to_string()),
            category: "Mercado".to_string(),
            card_name: "Nubank".to_string(),
            card_type: shared::CardType::Credit,
            installments: None,
            is_recurring: false,
            created_by: "member-1".to_string(),
        };
        assert!(TransactionMapper::create_command(request).is_err());
    }

    #[test]
    fn test_to_dto_formats_dates() {
        let transaction = DomainTransaction {
            id: "tx-1-aaaa".to_string(),
            group_id: "group-1".to_string(),
            description: "Mercado".to_string(),
            amount: 10.0,
            date: "2025-06-14".parse().unwrap(),
            category: "Mercado".to_string(),
            card_name: "Nubank".to_string(),
            card_type: CardType::Debit,
            installments: None,
            is_recurring: false,
            created_by: "member-1".to_string(),
            created_at: "2025-06-14T10:00:00-03:00".parse().unwrap(),
        };

        let dto = TransactionMapper::to_dto(transaction);
        assert_eq!(dto.date, "2025-06-14");
        assert_eq!(dto.created_at, "2025-06-14T10:00:00-03:00");
        assert_eq!(dto.card_type, shared::CardType::Debit);
        assert_eq!(dto.installment_number, None);
    }
}
