use crate::domain::commands::dues::{AdvancePaymentCommand, PaymentResult, RecordPaymentCommand, SetRateCommand};
use crate::domain::error::DomainResult;
use crate::domain::ledger::{LedgerLine, LedgerSummary, LineStatus, Period};
use crate::domain::models::dues::{DuesRate as DomainDuesRate, PaymentEvent as DomainPaymentEvent, PaymentKind as DomainPaymentKind};
use shared::{
    AdvancePaymentRequest, BalanceResponse, DuesRate as SharedDuesRate, DuesStatement, DuesStatus,
    PaymentEvent as SharedPaymentEvent, PaymentKind as SharedPaymentKind, PaymentResponse, RecordPaymentRequest,
    SetDuesRateRequest, StatementRow,
};

/// Mapper between shared dues DTOs and the ledger domain.
pub struct DuesMapper;

impl DuesMapper {
    pub fn event_to_dto(domain: DomainPaymentEvent) -> SharedPaymentEvent {
        SharedPaymentEvent {
            id: domain.id,
            resident_id: domain.resident_id,
            year: domain.period.year,
            month: domain.period.month,
            amount_cents: domain.amount_cents,
            kind: match domain.kind {
                DomainPaymentKind::Regular => SharedPaymentKind::Regular,
                DomainPaymentKind::Advance => SharedPaymentKind::Advance,
            },
            reference: domain.reference,
            note: domain.note,
            recorded_at: domain.recorded_at.to_rfc3339(),
        }
    }

    pub fn to_payment_response(result: PaymentResult) -> PaymentResponse {
        let success_message = if result.applied {
            format!("Recorded {} payment(s)", result.events.len())
        } else {
            "Payment reference already applied; nothing new recorded".to_string()
        };
        PaymentResponse {
            events: result.events.into_iter().map(Self::event_to_dto).collect(),
            applied: result.applied,
            success_message,
        }
    }

    pub fn rate_to_dto(domain: DomainDuesRate) -> SharedDuesRate {
        SharedDuesRate {
            id: domain.id,
            effective_year: domain.effective.year,
            effective_month: domain.effective.month,
            amount_cents: domain.amount_cents,
        }
    }

    pub fn to_record_command(resident_id: String, request: RecordPaymentRequest) -> DomainResult<RecordPaymentCommand> {
        Ok(RecordPaymentCommand {
            resident_id,
            period: Period::new(request.year, request.month)?,
            amount_cents: request.amount_cents,
            reference: request.reference,
            note: request.note,
        })
    }

    pub fn to_advance_command(resident_id: String, request: AdvancePaymentRequest) -> DomainResult<AdvancePaymentCommand> {
        Ok(AdvancePaymentCommand {
            resident_id,
            from: Period::new(request.from_year, request.from_month)?,
            months: request.months,
            reference: request.reference,
        })
    }

    pub fn to_set_rate_command(request: SetDuesRateRequest) -> DomainResult<SetRateCommand> {
        Ok(SetRateCommand {
            effective: Period::new(request.effective_year, request.effective_month)?,
            amount_cents: request.amount_cents,
        })
    }

    fn status_to_dto(status: LineStatus) -> DuesStatus {
        match status {
            LineStatus::Paid => DuesStatus::Paid,
            LineStatus::Partial => DuesStatus::Partial,
            LineStatus::Unpaid => DuesStatus::Unpaid,
        }
    }

    fn line_to_dto(line: LedgerLine) -> StatementRow {
        StatementRow {
            year: line.period.year,
            month: line.period.month,
            rate_cents: line.rate_cents,
            carried_in_cents: line.carried_in_cents,
            credit_in_cents: line.credit_in_cents,
            required_cents: line.required_cents,
            paid_cents: line.paid_cents,
            balance_cents: line.balance_cents,
            credit_out_cents: line.credit_out_cents,
            status: Self::status_to_dto(line.status),
        }
    }

    pub fn to_statement_dto(resident_id: String, summary: LedgerSummary) -> DuesStatement {
        DuesStatement {
            resident_id,
            rows: summary.lines.into_iter().map(Self::line_to_dto).collect(),
            total_billed_cents: summary.total_billed_cents,
            total_paid_cents: summary.total_paid_cents,
            balance_cents: summary.balance_cents,
            credit_cents: summary.credit_cents,
        }
    }

    pub fn to_balance_dto(resident_id: String, period: Period, summary: &LedgerSummary) -> BalanceResponse {
        BalanceResponse {
            resident_id,
            year: period.year,
            month: period.month,
            balance_cents: summary.balance_cents,
            credit_cents: summary.credit_cents,
        }
    }
}
