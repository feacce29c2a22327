use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::round2;

/// Kind tag of an append-only leave balance transaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionKind {
    CarryOver,
    Accrual,
    Reserve,
    Release,
    Deduct,
}

/// Raised when a reservation would exceed the available balance. The caller
/// maps it to the INSUFFICIENT_BALANCE condition; the counters are left
/// untouched when it fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsufficientBalance {
    pub requested: f64,
    pub available: f64,
}

/// The seven ledger counters of one (employee, leave type, year) account,
/// plus the two derived balances. Fields are private: the only way to move
/// credits is through the mutators below, each of which re-establishes
///
///   current   = opening + earned - used - forfeited - converted
///   available = current - pending
///
/// so the two derived figures can never drift from the base counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceCounters {
    opening_balance: f64,
    credits_earned: f64,
    credits_used: f64,
    credits_forfeited: f64,
    credits_converted: f64,
    credits_carried_over: f64,
    pending_requests: f64,
    current_balance: f64,
    available_balance: f64,
}

impl BalanceCounters {
    /// A fresh account as the year-initialization batch creates it: the
    /// carry-over amount becomes the opening balance, prorated entitlement
    /// the earned credits, everything else zero.
    pub fn open(carried_over: f64, earned: f64) -> Self {
        Self::from_parts(carried_over, earned, 0.0, 0.0, 0.0, carried_over, 0.0)
    }

    /// Rebuild counters from stored base fields, recomputing the derived
    /// balances rather than trusting stored copies.
    pub fn from_parts(
        opening_balance: f64,
        credits_earned: f64,
        credits_used: f64,
        credits_forfeited: f64,
        credits_converted: f64,
        credits_carried_over: f64,
        pending_requests: f64,
    ) -> Self {
        let mut counters = Self {
            opening_balance,
            credits_earned,
            credits_used,
            credits_forfeited,
            credits_converted,
            credits_carried_over,
            pending_requests,
            current_balance: 0.0,
            available_balance: 0.0,
        };
        counters.recompute();
        counters
    }

    fn recompute(&mut self) {
        self.current_balance = round2(
            self.opening_balance + self.credits_earned
                - self.credits_used
                - self.credits_forfeited
                - self.credits_converted,
        );
        self.available_balance = round2(self.current_balance - self.pending_requests);
    }

    /// Put a provisional hold on `quantity` credits. Fails without touching
    /// any counter when the available balance does not cover it.
    pub fn reserve(&mut self, quantity: f64) -> Result<(), InsufficientBalance> {
        if quantity > self.available_balance {
            return Err(InsufficientBalance {
                requested: quantity,
                available: self.available_balance,
            });
        }
        self.pending_requests = round2(self.pending_requests + quantity);
        self.recompute();
        Ok(())
    }

    /// Give a reservation back. State guards live on the originating
    /// request, not here: the ledger applies whatever the workflow decided.
    pub fn release(&mut self, quantity: f64) {
        self.pending_requests = round2(self.pending_requests - quantity);
        self.recompute();
    }

    /// Final approval: the reserved quantity moves from the pending bucket
    /// into used credits. The available balance already excluded the
    /// pending amount, so it stays put while the current balance drops.
    pub fn deduct(&mut self, quantity: f64) {
        self.pending_requests = round2(self.pending_requests - quantity);
        self.credits_used = round2(self.credits_used + quantity);
        self.recompute();
    }

    pub fn opening_balance(&self) -> f64 {
        self.opening_balance
    }

    pub fn credits_earned(&self) -> f64 {
        self.credits_earned
    }

    pub fn credits_used(&self) -> f64 {
        self.credits_used
    }

    pub fn credits_forfeited(&self) -> f64 {
        self.credits_forfeited
    }

    pub fn credits_converted(&self) -> f64 {
        self.credits_converted
    }

    pub fn credits_carried_over(&self) -> f64 {
        self.credits_carried_over
    }

    pub fn pending_requests(&self) -> f64 {
        self.pending_requests
    }

    pub fn current_balance(&self) -> f64 {
        self.current_balance
    }

    pub fn available_balance(&self) -> f64 {
        self.available_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invariant_holds(c: &BalanceCounters) -> bool {
        let current = c.opening_balance() + c.credits_earned()
            - c.credits_used()
            - c.credits_forfeited()
            - c.credits_converted();
        (c.current_balance() - round2(current)).abs() < 1e-9
            && (c.available_balance() + c.pending_requests() - c.current_balance()).abs() < 1e-9
    }

    #[test]
    fn open_account_derives_both_balances() {
        let c = BalanceCounters::open(2.5, 12.0);
        assert_eq!(c.opening_balance(), 2.5);
        assert_eq!(c.credits_carried_over(), 2.5);
        assert_eq!(c.credits_earned(), 12.0);
        assert_eq!(c.current_balance(), 14.5);
        assert_eq!(c.available_balance(), 14.5);
        assert!(invariant_holds(&c));
    }

    #[test]
    fn reserve_moves_only_the_pending_bucket() {
        let mut c = BalanceCounters::open(0.0, 10.0);
        c.reserve(3.0).unwrap();
        assert_eq!(c.pending_requests(), 3.0);
        assert_eq!(c.current_balance(), 10.0);
        assert_eq!(c.available_balance(), 7.0);
        assert!(invariant_holds(&c));
    }

    #[test]
    fn failed_reserve_changes_nothing() {
        let mut c = BalanceCounters::open(0.0, 2.0);
        let before = c;
        let err = c.reserve(2.5).unwrap_err();
        assert_eq!(err.requested, 2.5);
        assert_eq!(err.available, 2.0);
        assert_eq!(c, before);
    }

    #[test]
    fn reserve_release_round_trip_restores_exactly() {
        let mut c = BalanceCounters::open(1.0, 9.0);
        c.reserve(2.0).unwrap();
        let held = c;
        c.reserve(4.5).unwrap();
        c.release(4.5);
        assert_eq!(c, held);
        assert!(invariant_holds(&c));
    }

    #[test]
    fn deduct_converts_a_reservation_into_usage() {
        let mut c = BalanceCounters::open(0.0, 10.0);
        c.reserve(4.0).unwrap();
        let available_before = c.available_balance();
        c.deduct(4.0);
        assert_eq!(c.pending_requests(), 0.0);
        assert_eq!(c.credits_used(), 4.0);
        assert_eq!(c.current_balance(), 6.0);
        // Already excluded while pending: final approval leaves it alone.
        assert_eq!(c.available_balance(), available_before);
        assert!(invariant_holds(&c));
    }

    #[test]
    fn reserve_up_to_the_full_available_balance_succeeds() {
        let mut c = BalanceCounters::open(0.0, 5.0);
        assert!(c.reserve(5.0).is_ok());
        assert_eq!(c.available_balance(), 0.0);
        assert!(c.reserve(0.5).is_err());
    }

    #[test]
    fn invariant_survives_a_mixed_sequence() {
        let mut c = BalanceCounters::from_parts(5.0, 15.0, 3.0, 1.0, 0.5, 5.0, 0.0);
        assert_eq!(c.current_balance(), 15.5);
        c.reserve(2.0).unwrap();
        assert!(invariant_holds(&c));
        c.reserve(1.0).unwrap();
        c.deduct(2.0);
        assert!(invariant_holds(&c));
        c.release(1.0);
        assert!(invariant_holds(&c));
        assert_eq!(c.credits_used(), 5.0);
        assert_eq!(c.pending_requests(), 0.0);
    }

    #[test]
    fn transaction_kind_string_round_trip() {
        assert_eq!(TransactionKind::CarryOver.to_string(), "carry_over");
        assert_eq!(
            "deduct".parse::<TransactionKind>().unwrap(),
            TransactionKind::Deduct
        );
    }
}
