//! # Demo Walkthrough
//!
//! Four wallets (A1/A2, B1/B2, C1/C2/C3, D1) share one ledger. The demo
//! edits balances directly, checks aggregated debits, applies raw debit
//! and credit batches, verifies a correctly and an incorrectly signed
//! input, and finishes with a full transaction. Keys are seeded from the
//! aliases so every run prints the same identities.

use anyhow::{Context, Result};
use std::io::Write;

use tally_protocol::crypto::{Ed25519Verifier, Identity};
use tally_protocol::identity::{PublicKeyMap, Wallet};
use tally_protocol::ledger::{EntryBatch, Ledger};
use tally_protocol::transaction::{SignedInput, TransactionBuilder};

struct Cast {
    alice: Wallet,
    bob: Wallet,
    carol: Wallet,
    david: Wallet,
    names: PublicKeyMap,
}

impl Cast {
    fn new() -> Self {
        let alice = Wallet::from_aliases_seeded(["A1", "A2"]);
        let bob = Wallet::from_aliases_seeded(["B1", "B2"]);
        let carol = Wallet::from_aliases_seeded(["C1", "C2", "C3"]);
        let david = Wallet::from_aliases_seeded(["D1"]);

        let mut names = PublicKeyMap::new();
        for wallet in [&alice, &bob, &carol, &david] {
            names.merge(&wallet.to_public_key_map());
        }
        Self {
            alice,
            bob,
            carol,
            david,
            names,
        }
    }

    fn id(&self, alias: &str) -> Result<Identity> {
        self.names
            .identity_of(alias)
            .with_context(|| format!("no identity for alias {alias}"))
    }

    fn wallets(&self) -> [&Wallet; 4] {
        [&self.alice, &self.bob, &self.carol, &self.david]
    }
}

fn heading(out: &mut impl Write, step: usize, title: &str) -> Result<()> {
    writeln!(out, "\n========== Step {step}: {title} ==========\n")?;
    Ok(())
}

fn show(out: &mut impl Write, cast: &Cast, ledger: &Ledger, aliases: &[&str]) -> Result<()> {
    for alias in aliases {
        writeln!(out, "{alias}: {}", ledger.balance(&cast.id(alias)?))?;
    }
    Ok(())
}

/// Runs the walkthrough, writing human-readable results to `out`.
pub fn run_demo(out: &mut impl Write) -> Result<()> {
    let cast = Cast::new();
    let example_message = 1u32.to_be_bytes();
    let example_signature = cast.alice.sign_as("A1", &example_message)?;

    heading(out, 1, "wallets")?;
    for wallet in cast.wallets() {
        let aliases: Vec<&str> = wallet.aliases().collect();
        writeln!(out, "wallet with {}", aliases.join(", "))?;
    }

    heading(out, 2, "public key map")?;
    let names: Vec<&str> = cast.names.names().collect();
    writeln!(out, "{names:?}")?;

    heading(out, 3, "empty ledger")?;
    let mut ledger = Ledger::new();
    for name in cast.names.names() {
        ledger.set_balance(cast.id(name)?, 0);
    }
    show(out, &cast, &ledger, &names)?;

    heading(out, 4, "set A1 to 20")?;
    ledger.set_balance(cast.id("A1")?, 20);
    show(out, &cast, &ledger, &["A1"])?;

    heading(out, 5, "add 15 to B1")?;
    ledger.add_balance(cast.id("B1")?, 15)?;
    show(out, &cast, &ledger, &["B1"])?;

    heading(out, 6, "subtract 5 from B1")?;
    ledger.subtract_balance(cast.id("B1")?, 5)?;
    show(out, &cast, &ledger, &["B1"])?;

    heading(out, 7, "set C1 to 10")?;
    ledger.set_balance(cast.id("C1")?, 10);
    show(out, &cast, &ledger, &["C1"])?;

    heading(out, 8, "can deduct [(A1, 15), (B1, 5)]")?;
    let debit_one = EntryBatch::new()
        .with_entry(cast.id("A1")?, 15)
        .with_entry(cast.id("B1")?, 5);
    writeln!(out, "{}", ledger.can_deduct(&debit_one.to_aggregated_balance()?))?;

    heading(out, 9, "can deduct [(A1, 15), (A1, 15)]")?;
    let debit_two = EntryBatch::new()
        .with_entry(cast.id("A1")?, 15)
        .with_entry(cast.id("A1")?, 15);
    writeln!(out, "{}", ledger.can_deduct(&debit_two.to_aggregated_balance()?))?;

    heading(out, 10, "apply debit [(A1, 15), (B1, 5)]")?;
    show(out, &cast, &ledger, &["A1", "B1"])?;
    ledger.apply_debit(&debit_one)?;
    show(out, &cast, &ledger, &["A1", "B1"])?;

    heading(out, 11, "apply credit [(A1, 15), (A1, 15)]")?;
    let credit = EntryBatch::new()
        .with_entry(cast.id("A1")?, 15)
        .with_entry(cast.id("A1")?, 15);
    show(out, &cast, &ledger, &["A1"])?;
    ledger.apply_credit(&credit)?;
    show(out, &cast, &ledger, &["A1"])?;

    heading(out, 12, "correctly signed input")?;
    let outputs = EntryBatch::new()
        .with_entry(cast.id("B2")?, 10)
        .with_entry(cast.id("C1")?, 20);
    let signed = SignedInput::sign(&cast.alice, cast.id("A1")?, 30, &outputs)?;
    writeln!(out, "{}", signed.check_signature(&outputs, &Ed25519Verifier))?;

    heading(out, 13, "incorrectly signed input")?;
    let unsigned = SignedInput::new(cast.id("A1")?, 30, example_signature);
    writeln!(out, "{}", unsigned.check_signature(&outputs, &Ed25519Verifier))?;

    heading(out, 14, "transaction A1 -> B2 10, C1 20")?;
    let tx = TransactionBuilder::new()
        .input(cast.id("A1")?, 30)
        .outputs(outputs)
        .sign_with(&cast.alice)?;
    writeln!(out, "id {}", tx.compute_id())?;
    writeln!(out, "valid {}", tx.check_valid(&ledger, &Ed25519Verifier))?;
    tx.apply(&mut ledger, &Ed25519Verifier)?;
    show(out, &cast, &ledger, &["A1", "B2", "C1"])?;

    heading(out, 15, "replaying the same transaction")?;
    match tx.apply(&mut ledger, &Ed25519Verifier) {
        Ok(()) => writeln!(out, "applied again")?,
        Err(err) => writeln!(out, "rejected: {err}")?,
    }

    heading(out, 16, "final balances")?;
    write!(out, "{}", ledger.report(&cast.names))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> String {
        let mut buf = Vec::new();
        run_demo(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn section(text: &str, step: usize) -> &str {
        let marker = format!("Step {step}:");
        let start = text.find(&marker).unwrap();
        let rest = &text[start..];
        let end = rest.find("\n========== Step").unwrap_or(rest.len());
        &rest[..end]
    }

    #[test]
    fn aggregate_checks_match_expectations() {
        let text = transcript();
        assert!(section(&text, 8).contains("\ntrue\n"));
        assert!(section(&text, 9).contains("\nfalse\n"));
    }

    #[test]
    fn signature_checks_match_expectations() {
        let text = transcript();
        assert!(section(&text, 12).contains("\ntrue\n"));
        assert!(section(&text, 13).contains("\nfalse\n"));
    }

    #[test]
    fn final_balances_follow_the_walkthrough() {
        let text = transcript();
        // A1: 20 - 15 + 30 - 30; B1: 15 - 5 - 5.
        assert!(text.contains("The balance for A1 is 5\n"));
        assert!(text.contains("The balance for B1 is 5\n"));
        assert!(text.contains("The balance for B2 is 10\n"));
        assert!(text.contains("The balance for C1 is 30\n"));
        assert!(text.contains("rejected: insufficient balance"));
    }

    #[test]
    fn demo_is_deterministic() {
        assert_eq!(transcript(), transcript());
    }
}
