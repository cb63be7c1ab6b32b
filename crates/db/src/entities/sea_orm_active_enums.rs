//! `SeaORM` active enums stored as text columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer visibility flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Customer may log in.
    #[sea_orm(string_value = "visible")]
    Visible,
    /// Customer is suspended.
    #[sea_orm(string_value = "hidden")]
    Hidden,
}

impl From<ibank_core::access::Visibility> for Visibility {
    fn from(value: ibank_core::access::Visibility) -> Self {
        match value {
            ibank_core::access::Visibility::Visible => Self::Visible,
            ibank_core::access::Visibility::Hidden => Self::Hidden,
        }
    }
}

impl From<Visibility> for ibank_core::access::Visibility {
    fn from(value: Visibility) -> Self {
        match value {
            Visibility::Visible => Self::Visible,
            Visibility::Hidden => Self::Hidden,
        }
    }
}

/// Kind of operation log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Debit side of a card-to-card transfer.
    #[sea_orm(string_value = "send_debit")]
    SendDebit,
    /// Credit side of a card-to-card transfer.
    #[sea_orm(string_value = "receive_credit")]
    ReceiveCredit,
    /// Payment to a service.
    #[sea_orm(string_value = "service_payment")]
    ServicePayment,
}

impl From<ibank_core::ledger::OperationKind> for OperationKind {
    fn from(value: ibank_core::ledger::OperationKind) -> Self {
        match value {
            ibank_core::ledger::OperationKind::SendDebit => Self::SendDebit,
            ibank_core::ledger::OperationKind::ReceiveCredit => Self::ReceiveCredit,
            ibank_core::ledger::OperationKind::ServicePayment => Self::ServicePayment,
        }
    }
}

impl From<OperationKind> for ibank_core::ledger::OperationKind {
    fn from(value: OperationKind) -> Self {
        match value {
            OperationKind::SendDebit => Self::SendDebit,
            OperationKind::ReceiveCredit => Self::ReceiveCredit,
            OperationKind::ServicePayment => Self::ServicePayment,
        }
    }
}
