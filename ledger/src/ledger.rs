//! The token ledger: balances, allowances, delegation and voting power.
//!
//! Every mutating operation validates first and commits second, so a
//! rejected call leaves the ledger (clock included) untouched. A committed
//! call advances the sequence clock exactly once and writes the checkpoints
//! for every delegate whose power changed.

use crate::account::AccountState;
use crate::checkpoint::Checkpoint;
use crate::clock::SequenceClock;
use crate::error::LedgerError;
use crate::snapshot_index::SnapshotIndex;
use agora_types::{Address, Sequence};
use std::collections::HashMap;

/// Allowance value treated as unlimited; spending never decreases it.
pub const UNLIMITED_ALLOWANCE: u128 = u128::MAX;

/// Pending voting-power writes: `(delegate, new power)`.
type PowerWrites = Vec<(Address, u128)>;

#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    accounts: HashMap<Address, AccountState>,
    /// `(owner, spender)` → approved amount.
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
    clock: SequenceClock,
    index: SnapshotIndex,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        accounts: HashMap<Address, AccountState>,
        allowances: HashMap<(Address, Address), u128>,
        total_supply: u128,
        clock: SequenceClock,
        index: SnapshotIndex,
    ) -> Self {
        Self {
            accounts,
            allowances,
            total_supply,
            clock,
            index,
        }
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.accounts.get(account).map_or(0, |a| a.balance)
    }

    /// The account's current delegate, `None` if it never delegated.
    pub fn delegates(&self, account: &Address) -> Option<&Address> {
        self.accounts.get(account).and_then(|a| a.delegate.as_ref())
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Latest checkpointed voting power, or zero if none exists.
    pub fn voting_power_now(&self, account: &Address) -> u128 {
        self.index.power_now(account)
    }

    /// Current value of the sequence clock.
    ///
    /// Every checkpoint written so far has a sequence `<=` this value and
    /// every later one will be strictly greater, which makes it a valid
    /// snapshot point for a new proposal.
    pub fn snapshot(&self) -> Sequence {
        self.clock.current()
    }

    /// Voting power of `account` in force at a past `sequence`.
    pub fn power_at(&self, account: &Address, sequence: Sequence) -> Result<u128, LedgerError> {
        self.require_past(sequence)?;
        Ok(self.index.power_at(account, sequence))
    }

    /// Total supply in force at a past `sequence`.
    pub fn total_supply_at(&self, sequence: Sequence) -> Result<u128, LedgerError> {
        self.require_past(sequence)?;
        Ok(self.index.total_supply_at(sequence))
    }

    pub fn checkpoints(&self, account: &Address) -> &[Checkpoint] {
        self.index.checkpoints(account)
    }

    pub fn num_checkpoints(&self, account: &Address) -> usize {
        self.index.checkpoints(account).len()
    }

    pub fn index(&self) -> &SnapshotIndex {
        &self.index
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &AccountState)> {
        self.accounts.iter()
    }

    /// All non-zero allowances as `((owner, spender), amount)`.
    pub fn allowances(&self) -> impl Iterator<Item = (&(Address, Address), &u128)> {
        self.allowances.iter()
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Create `amount` new tokens for `to`.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<Sequence, LedgerError> {
        require_valid(to)?;
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let dst = self.delegates(to).cloned();
        let writes = self.plan_power_move(None, dst.as_ref(), amount)?;

        let seq = self.clock.advance();
        self.set_balance(to, balance);
        self.total_supply = supply;
        self.index.record_supply(seq, supply);
        self.commit_power(seq, writes);
        tracing::debug!(to = %to, amount, supply, sequence = seq, "mint");
        Ok(seq)
    }

    /// Destroy `amount` of `from`'s tokens.
    pub fn burn(&mut self, from: &Address, amount: u128) -> Result<Sequence, LedgerError> {
        let available = self.balance_of(from);
        let balance = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        let src = self.delegates(from).cloned();
        let writes = self.plan_power_move(src.as_ref(), None, amount)?;

        let seq = self.clock.advance();
        self.set_balance(from, balance);
        self.total_supply = supply;
        self.index.record_supply(seq, supply);
        self.commit_power(seq, writes);
        tracing::debug!(from = %from, amount, supply, sequence = seq, "burn");
        Ok(seq)
    }

    /// Move `amount` from `from` to `to`, shifting voting power between
    /// their delegates.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<Sequence, LedgerError> {
        require_valid(to)?;
        let available = self.balance_of(from);
        let from_balance = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        let to_balance = if from == to {
            available
        } else {
            self.balance_of(to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?
        };
        let src = self.delegates(from).cloned();
        let dst = self.delegates(to).cloned();
        let writes = self.plan_power_move(src.as_ref(), dst.as_ref(), amount)?;

        let seq = self.clock.advance();
        if from != to {
            self.set_balance(from, from_balance);
            self.set_balance(to, to_balance);
        }
        self.commit_power(seq, writes);
        tracing::debug!(from = %from, to = %to, amount, sequence = seq, "transfer");
        Ok(seq)
    }

    /// Authorize `spender` to move up to `amount` of `owner`'s tokens.
    /// Overwrites any previous approval.
    pub fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<Sequence, LedgerError> {
        require_valid(spender)?;
        let seq = self.clock.advance();
        self.set_allowance(owner, spender, amount);
        tracing::debug!(owner = %owner, spender = %spender, amount, sequence = seq, "approve");
        Ok(seq)
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<Sequence, LedgerError> {
        let remaining = self.remaining_allowance(from, spender, amount)?;
        let seq = self.transfer(from, to, amount)?;
        self.set_allowance(from, spender, remaining);
        Ok(seq)
    }

    /// Destroy `amount` of `from`'s tokens on behalf of `spender`, consuming
    /// allowance.
    pub fn burn_from(
        &mut self,
        spender: &Address,
        from: &Address,
        amount: u128,
    ) -> Result<Sequence, LedgerError> {
        let remaining = self.remaining_allowance(from, spender, amount)?;
        let seq = self.burn(from, amount)?;
        self.set_allowance(from, spender, remaining);
        Ok(seq)
    }

    /// Point `account`'s voting power at `to` (which may be `account`
    /// itself). The whole current balance moves from the old delegate to the
    /// new one.
    pub fn delegate(&mut self, account: &Address, to: &Address) -> Result<Sequence, LedgerError> {
        require_valid(to)?;
        let old = self.delegates(account).cloned();
        let balance = self.balance_of(account);
        let writes = self.plan_power_move(old.as_ref(), Some(to), balance)?;

        let seq = self.clock.advance();
        self.accounts.entry(account.clone()).or_default().delegate = Some(to.clone());
        self.commit_power(seq, writes);
        tracing::info!(
            account = %account,
            from = ?old.as_ref().map(Address::as_str),
            to = %to,
            moved = balance,
            sequence = seq,
            "delegate changed"
        );
        Ok(seq)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn require_past(&self, sequence: Sequence) -> Result<(), LedgerError> {
        let current = self.clock.current();
        if sequence > current {
            return Err(LedgerError::FutureLookup {
                requested: sequence,
                current,
            });
        }
        Ok(())
    }

    fn remaining_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        let current = self.allowance(owner, spender);
        if current == UNLIMITED_ALLOWANCE {
            return Ok(current);
        }
        current
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                needed: amount,
                available: current,
            })
    }

    /// Compute the new power of `src` and `dst` after `amount` moves from one
    /// to the other. `None` stands for "no delegate" (power appears or
    /// vanishes).
    fn plan_power_move(
        &self,
        src: Option<&Address>,
        dst: Option<&Address>,
        amount: u128,
    ) -> Result<PowerWrites, LedgerError> {
        let mut writes = Vec::new();
        if src == dst || amount == 0 {
            return Ok(writes);
        }
        if let Some(src) = src {
            let power = self
                .index
                .power_now(src)
                .checked_sub(amount)
                .ok_or(LedgerError::Overflow)?;
            writes.push((src.clone(), power));
        }
        if let Some(dst) = dst {
            let power = self
                .index
                .power_now(dst)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
            writes.push((dst.clone(), power));
        }
        Ok(writes)
    }

    fn commit_power(&mut self, sequence: Sequence, writes: PowerWrites) {
        for (delegate, power) in writes {
            self.index.record_power(&delegate, sequence, power);
        }
    }

    fn set_balance(&mut self, account: &Address, balance: u128) {
        let entry = self.accounts.entry(account.clone()).or_default();
        entry.balance = balance;
        if entry.is_empty() {
            self.accounts.remove(account);
        }
    }

    fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: u128) {
        let key = (owner.clone(), spender.clone());
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }
}

fn require_valid(address: &Address) -> Result<(), LedgerError> {
    if address.is_valid() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAddress(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(name: &str) -> Address {
        Address::new(name)
    }

    /// Ledger with alice=100, bob=100, carol=0; nobody delegated.
    fn funded() -> TokenLedger {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr("alice"), 100).unwrap();
        ledger.mint(&addr("bob"), 100).unwrap();
        ledger
    }

    // ── Balances ─────────────────────────────────────────────────────────

    #[test]
    fn mint_increases_balance_and_supply() {
        let ledger = funded();
        assert_eq!(ledger.balance_of(&addr("alice")), 100);
        assert_eq!(ledger.total_supply(), 200);
        assert_eq!(ledger.snapshot(), 2);
    }

    #[test]
    fn transfer_moves_balance() {
        let mut ledger = funded();
        ledger.transfer(&addr("alice"), &addr("carol"), 30).unwrap();
        assert_eq!(ledger.balance_of(&addr("alice")), 70);
        assert_eq!(ledger.balance_of(&addr("carol")), 30);
        assert_eq!(ledger.total_supply(), 200);
    }

    #[test]
    fn transfer_insufficient_balance_has_no_effect() {
        let mut ledger = funded();
        let before = ledger.snapshot();
        let err = ledger
            .transfer(&addr("alice"), &addr("bob"), 101)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                needed: 101,
                available: 100
            }
        );
        assert_eq!(ledger.balance_of(&addr("alice")), 100);
        assert_eq!(ledger.balance_of(&addr("bob")), 100);
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let mut ledger = funded();
        ledger.transfer(&addr("alice"), &addr("alice"), 40).unwrap();
        assert_eq!(ledger.balance_of(&addr("alice")), 100);
    }

    #[test]
    fn transfer_to_invalid_address_rejected() {
        let mut ledger = funded();
        assert!(matches!(
            ledger.transfer(&addr("alice"), &addr(""), 1),
            Err(LedgerError::InvalidAddress(_))
        ));
    }

    #[test]
    fn burn_reduces_supply() {
        let mut ledger = funded();
        ledger.burn(&addr("alice"), 25).unwrap();
        assert_eq!(ledger.balance_of(&addr("alice")), 75);
        assert_eq!(ledger.total_supply(), 175);
        assert!(matches!(
            ledger.burn(&addr("alice"), 76),
            Err(LedgerError::InsufficientBalance { needed: 76, available: 75 })
        ));
    }

    #[test]
    fn mint_overflow_rejected() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr("alice"), u128::MAX).unwrap();
        assert_eq!(ledger.mint(&addr("bob"), 1), Err(LedgerError::Overflow));
        assert_eq!(ledger.total_supply(), u128::MAX);
    }

    // ── Allowances ───────────────────────────────────────────────────────

    #[test]
    fn approve_then_transfer_from_consumes_allowance() {
        let mut ledger = funded();
        ledger.approve(&addr("alice"), &addr("gov"), 81).unwrap();
        ledger
            .transfer_from(&addr("gov"), &addr("alice"), &addr("gov"), 81)
            .unwrap();
        assert_eq!(ledger.balance_of(&addr("alice")), 19);
        assert_eq!(ledger.balance_of(&addr("gov")), 81);
        assert_eq!(ledger.allowance(&addr("alice"), &addr("gov")), 0);
    }

    #[test]
    fn transfer_from_checks_allowance_before_balance() {
        let mut ledger = funded();
        ledger.approve(&addr("alice"), &addr("gov"), 10).unwrap();
        let err = ledger
            .transfer_from(&addr("gov"), &addr("alice"), &addr("gov"), 500)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientAllowance {
                needed: 500,
                available: 10
            }
        );
    }

    #[test]
    fn transfer_from_insufficient_balance_keeps_allowance() {
        let mut ledger = funded();
        ledger.approve(&addr("alice"), &addr("gov"), 500).unwrap();
        let err = ledger
            .transfer_from(&addr("gov"), &addr("alice"), &addr("gov"), 200)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.allowance(&addr("alice"), &addr("gov")), 500);
    }

    #[test]
    fn unlimited_allowance_is_not_decreased() {
        let mut ledger = funded();
        ledger
            .approve(&addr("alice"), &addr("gov"), UNLIMITED_ALLOWANCE)
            .unwrap();
        ledger.burn_from(&addr("gov"), &addr("alice"), 50).unwrap();
        assert_eq!(
            ledger.allowance(&addr("alice"), &addr("gov")),
            UNLIMITED_ALLOWANCE
        );
        assert_eq!(ledger.total_supply(), 150);
    }

    #[test]
    fn approve_overwrites() {
        let mut ledger = funded();
        ledger.approve(&addr("alice"), &addr("gov"), 50).unwrap();
        ledger.approve(&addr("alice"), &addr("gov"), 5).unwrap();
        assert_eq!(ledger.allowance(&addr("alice"), &addr("gov")), 5);
        ledger.approve(&addr("alice"), &addr("gov"), 0).unwrap();
        assert_eq!(ledger.allowances().count(), 0);
    }

    // ── Delegation & voting power ────────────────────────────────────────

    #[test]
    fn undelegated_balance_has_no_power() {
        let ledger = funded();
        assert_eq!(ledger.voting_power_now(&addr("alice")), 0);
        assert_eq!(ledger.delegates(&addr("alice")), None);
    }

    #[test]
    fn self_delegation_activates_power() {
        let mut ledger = funded();
        ledger.delegate(&addr("alice"), &addr("alice")).unwrap();
        assert_eq!(ledger.voting_power_now(&addr("alice")), 100);
        assert_eq!(ledger.delegates(&addr("alice")), Some(&addr("alice")));
    }

    #[test]
    fn delegation_moves_exact_balance() {
        let mut ledger = funded();
        ledger.delegate(&addr("bob"), &addr("bob")).unwrap();
        ledger.delegate(&addr("alice"), &addr("bob")).unwrap();
        assert_eq!(ledger.voting_power_now(&addr("bob")), 200);
        assert_eq!(ledger.voting_power_now(&addr("alice")), 0);
    }

    #[test]
    fn redelegation_moves_power_between_delegates() {
        let mut ledger = funded();
        ledger.delegate(&addr("alice"), &addr("bob")).unwrap();
        ledger.delegate(&addr("alice"), &addr("carol")).unwrap();
        assert_eq!(ledger.voting_power_now(&addr("bob")), 0);
        assert_eq!(ledger.voting_power_now(&addr("carol")), 100);
    }

    #[test]
    fn delegation_is_one_hop() {
        let mut ledger = funded();
        // alice → bob, bob → carol: alice's balance stays with bob.
        ledger.delegate(&addr("alice"), &addr("bob")).unwrap();
        ledger.delegate(&addr("bob"), &addr("carol")).unwrap();
        assert_eq!(ledger.voting_power_now(&addr("bob")), 100);
        assert_eq!(ledger.voting_power_now(&addr("carol")), 100);
    }

    #[test]
    fn transfer_shifts_power_between_delegates() {
        let mut ledger = funded();
        ledger.delegate(&addr("alice"), &addr("alice")).unwrap();
        ledger.delegate(&addr("bob"), &addr("carol")).unwrap();
        ledger.transfer(&addr("alice"), &addr("bob"), 40).unwrap();
        assert_eq!(ledger.voting_power_now(&addr("alice")), 60);
        assert_eq!(ledger.voting_power_now(&addr("carol")), 140);
    }

    #[test]
    fn transfer_to_undelegated_account_drops_power() {
        let mut ledger = funded();
        ledger.delegate(&addr("alice"), &addr("alice")).unwrap();
        ledger.transfer(&addr("alice"), &addr("carol"), 100).unwrap();
        assert_eq!(ledger.voting_power_now(&addr("alice")), 0);
        assert_eq!(ledger.voting_power_now(&addr("carol")), 0);
    }

    #[test]
    fn burn_removes_power() {
        let mut ledger = funded();
        ledger.delegate(&addr("alice"), &addr("alice")).unwrap();
        ledger.burn(&addr("alice"), 30).unwrap();
        assert_eq!(ledger.voting_power_now(&addr("alice")), 70);
    }

    // ── Checkpoints ──────────────────────────────────────────────────────

    #[test]
    fn one_checkpoint_per_operation() {
        let mut ledger = funded();
        ledger.delegate(&addr("alice"), &addr("alice")).unwrap();
        ledger.transfer(&addr("bob"), &addr("alice"), 10).unwrap();
        ledger.transfer(&addr("alice"), &addr("bob"), 5).unwrap();

        let cps = ledger.checkpoints(&addr("alice"));
        assert_eq!(cps.len(), 3);
        assert_eq!(ledger.num_checkpoints(&addr("alice")), 3);
        assert_eq!(ledger.num_checkpoints(&addr("carol")), 0);
        assert!(cps.windows(2).all(|w| w[0].sequence < w[1].sequence));
        assert_eq!(cps.last().map(|c| c.value), Some(105));
    }

    #[test]
    fn power_at_reads_history() {
        let mut ledger = funded();
        let s1 = ledger.delegate(&addr("alice"), &addr("alice")).unwrap();
        let s2 = ledger.transfer(&addr("alice"), &addr("bob"), 60).unwrap();

        assert_eq!(ledger.power_at(&addr("alice"), s1 - 1).unwrap(), 0);
        assert_eq!(ledger.power_at(&addr("alice"), s1).unwrap(), 100);
        assert_eq!(ledger.power_at(&addr("alice"), s2).unwrap(), 40);
    }

    #[test]
    fn snapshot_power_survives_later_mutations() {
        let mut ledger = funded();
        ledger.delegate(&addr("alice"), &addr("alice")).unwrap();
        let snap = ledger.snapshot();

        ledger.transfer(&addr("bob"), &addr("alice"), 100).unwrap();
        ledger.burn(&addr("alice"), 150).unwrap();
        ledger.delegate(&addr("alice"), &addr("carol")).unwrap();

        assert_eq!(ledger.power_at(&addr("alice"), snap).unwrap(), 100);
        assert_eq!(ledger.total_supply_at(snap).unwrap(), 200);
    }

    #[test]
    fn future_lookup_rejected() {
        let ledger = funded();
        let current = ledger.snapshot();
        assert_eq!(
            ledger.power_at(&addr("alice"), current + 1),
            Err(LedgerError::FutureLookup {
                requested: current + 1,
                current
            })
        );
    }

    #[test]
    fn failed_operation_does_not_advance_clock() {
        let mut ledger = funded();
        let before = ledger.snapshot();
        let _ = ledger.burn(&addr("carol"), 1);
        let _ = ledger.transfer_from(&addr("gov"), &addr("alice"), &addr("gov"), 1);
        assert_eq!(ledger.snapshot(), before);
    }
}
