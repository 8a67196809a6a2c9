use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for loans in the book (`LD-<year>-<seq>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(pub String);

/// Reference to the borrower in whatever registry the surrounding system keeps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowerRef(pub String);

/// Fixed repayment periods offered at origination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPeriod {
    OneWeek,
    TwoWeeks,
    ThreeWeeks,
    FourWeeks,
}

impl LoanPeriod {
    pub const fn weeks(self) -> i64 {
        match self {
            Self::OneWeek => 1,
            Self::TwoWeeks => 2,
            Self::ThreeWeeks => 3,
            Self::FourWeeks => 4,
        }
    }

    /// Standard interest tier fixed at issuance, in percent.
    pub const fn standard_rate(self) -> Decimal {
        match self {
            Self::OneWeek => dec!(20),
            Self::TwoWeeks => dec!(28),
            Self::ThreeWeeks => dec!(32),
            Self::FourWeeks => dec!(35),
        }
    }

    pub fn from_weeks(weeks: i64) -> Option<Self> {
        match weeks {
            1 => Some(Self::OneWeek),
            2 => Some(Self::TwoWeeks),
            3 => Some(Self::ThreeWeeks),
            4 => Some(Self::FourWeeks),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OneWeek => "1 week",
            Self::TwoWeeks => "2 weeks",
            Self::ThreeWeeks => "3 weeks",
            Self::FourWeeks => "4 weeks",
        }
    }
}

/// Lifecycle states derived from dates and amounts.
///
/// The persisted value is a cache of the resolver's output; readers must
/// recompute through the engine rather than trust it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Due,
    PastDue,
    Defaulted,
    Paid,
}

impl LoanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Due => "due",
            Self::PastDue => "past_due",
            Self::Defaulted => "defaulted",
            Self::Paid => "paid",
        }
    }
}

/// Calendar anchors fixed at origination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSchedule {
    pub date_issued: NaiveDate,
    pub due_date: NaiveDate,
    /// Last penalty-accruing day; the loan defaults the day after.
    pub grace_period_end: NaiveDate,
}

/// Errors raised when a loan record fails boundary validation.
#[derive(Debug, thiserror::Error)]
pub enum LoanDataError {
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: Decimal },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: Decimal },
    #[error("total amount {total} is below principal {principal}")]
    TotalBelowPrincipal { principal: Decimal, total: Decimal },
    #[error("schedule dates are inverted: issued {date_issued}, due {due_date}, grace end {grace_period_end}")]
    InvertedSchedule {
        date_issued: NaiveDate,
        due_date: NaiveDate,
        grace_period_end: NaiveDate,
    },
}

/// A loan in the book.
///
/// `amount_repaid` and `penalties` are monotonically non-decreasing under
/// normal operation; `status` and `penalties` are caches maintained by the
/// sweep and the payment applicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub borrower: BorrowerRef,
    pub principal: Decimal,
    /// Percent, fixed per the period tier at issuance unless negotiable.
    pub interest_rate: Decimal,
    pub negotiable: bool,
    pub period: LoanPeriod,
    /// Principal plus interest, computed once at creation.
    pub total_amount: Decimal,
    pub amount_repaid: Decimal,
    /// Cached penalty accrual; overwritten by recomputation, never ratcheted.
    pub penalties: Decimal,
    pub schedule: LoanSchedule,
    /// Cached resolver output, possibly stale between sweep runs.
    pub status: LoanStatus,
    pub last_payment_date: Option<NaiveDate>,
}

impl Loan {
    /// Validate a full record at the boundary; rejects malformed rows instead
    /// of trusting the storage layer.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LoanId,
        borrower: BorrowerRef,
        principal: Decimal,
        interest_rate: Decimal,
        negotiable: bool,
        period: LoanPeriod,
        total_amount: Decimal,
        amount_repaid: Decimal,
        penalties: Decimal,
        schedule: LoanSchedule,
        status: LoanStatus,
        last_payment_date: Option<NaiveDate>,
    ) -> Result<Self, LoanDataError> {
        if principal <= Decimal::ZERO {
            return Err(LoanDataError::NotPositive {
                field: "principal",
                value: principal,
            });
        }
        if interest_rate <= Decimal::ZERO {
            return Err(LoanDataError::NotPositive {
                field: "interest_rate",
                value: interest_rate,
            });
        }
        if amount_repaid < Decimal::ZERO {
            return Err(LoanDataError::Negative {
                field: "amount_repaid",
                value: amount_repaid,
            });
        }
        if penalties < Decimal::ZERO {
            return Err(LoanDataError::Negative {
                field: "penalties",
                value: penalties,
            });
        }
        if total_amount < principal {
            return Err(LoanDataError::TotalBelowPrincipal {
                principal,
                total: total_amount,
            });
        }
        if schedule.due_date <= schedule.date_issued
            || schedule.grace_period_end < schedule.due_date
        {
            return Err(LoanDataError::InvertedSchedule {
                date_issued: schedule.date_issued,
                due_date: schedule.due_date,
                grace_period_end: schedule.grace_period_end,
            });
        }

        Ok(Self {
            id,
            borrower,
            principal,
            interest_rate,
            negotiable,
            period,
            total_amount,
            amount_repaid,
            penalties,
            schedule,
            status,
            last_payment_date,
        })
    }

    /// Principal plus interest still owed, floored at zero. Penalties are not
    /// part of this figure; they accrue on top of it.
    pub fn outstanding_balance(&self) -> Decimal {
        (self.total_amount - self.amount_repaid).max(Decimal::ZERO)
    }
}
