//! # Scenario Runner
//!
//! Loads a JSON description of opening balances and transactions, signs
//! every transaction with a deterministic wallet, and submits them one by
//! one through a [`SharedLedger`].
//!
//! ```json
//! {
//!   "accounts": [{ "alias": "alice", "balance": 25 }],
//!   "transactions": [
//!     {
//!       "label": "alice pays",
//!       "inputs":  [{ "alias": "alice", "amount": 25 }],
//!       "outputs": [{ "alias": "bob", "amount": 5 }, { "alias": "carol", "amount": 20 }]
//!     }
//!   ]
//! }
//! ```
//!
//! Every alias mentioned anywhere gets a key seeded from its name, so runs
//! are reproducible. Aliases without an account entry start at zero. A
//! transaction with `"forge": true` has its inputs signed over the wrong
//! payload and is expected to be rejected.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use tally_protocol::crypto::Ed25519Verifier;
use tally_protocol::identity::{PublicKeyMap, Wallet};
use tally_protocol::ledger::{Amount, EntryBatch, Ledger, SharedLedger};
use tally_protocol::transaction::{SignedInput, Transaction};

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<TxPlan>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    pub alias: String,
    #[serde(default)]
    pub balance: Amount,
}

/// One side of a transaction entry, by alias.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Leg {
    pub alias: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxPlan {
    #[serde(default)]
    pub label: Option<String>,
    pub inputs: Vec<Leg>,
    pub outputs: Vec<Leg>,
    #[serde(default)]
    pub forge: bool,
}

impl Scenario {
    /// Parses a scenario from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("malformed scenario JSON")
    }

    /// Reads and parses a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in scenario file {}", path.display()))
    }

    /// Every alias, accounts first, then in order of first mention.
    pub fn aliases(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        let legs = self
            .transactions
            .iter()
            .flat_map(|tx| tx.inputs.iter().chain(tx.outputs.iter()))
            .map(|leg| &leg.alias);
        for alias in self.accounts.iter().map(|a| &a.alias).chain(legs) {
            if !seen.contains(alias) {
                seen.push(alias.clone());
            }
        }
        seen
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What happened to one transaction.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub label: String,
    pub tx_id: Option<String>,
    pub accepted: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceLine {
    pub name: String,
    pub identity: String,
    pub balance: Amount,
}

/// Result of a full run.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub verdicts: Vec<Verdict>,
    pub balances: Vec<BalanceLine>,
    #[serde(skip)]
    pub report: String,
}

impl Outcome {
    pub fn balance_of(&self, name: &str) -> Option<Amount> {
        self.balances
            .iter()
            .find(|line| line.name == name)
            .map(|line| line.balance)
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Signs and submits every transaction in order.
///
/// Rejected transactions are recorded, not fatal. Only an inconsistent
/// scenario (which cannot happen for parsed input) returns `Err`.
pub fn run(scenario: &Scenario) -> Result<Outcome> {
    let wallet = Wallet::from_aliases_seeded(scenario.aliases());
    let directory = wallet.to_public_key_map();

    let mut opening = Ledger::new();
    for account in &scenario.accounts {
        opening.set_balance(lookup(&directory, &account.alias)?, account.balance);
    }
    let shared = SharedLedger::new(opening);

    let mut verdicts = Vec::with_capacity(scenario.transactions.len());
    for (index, plan) in scenario.transactions.iter().enumerate() {
        let label = plan
            .label
            .clone()
            .unwrap_or_else(|| format!("tx-{}", index + 1));
        let verdict = match build(plan, &wallet, &directory)? {
            Err(reason) => Verdict {
                label,
                tx_id: None,
                accepted: false,
                reason: Some(reason),
            },
            Ok(tx) => {
                let tx_id = tx.compute_id();
                let result = shared.submit(&tx, &Ed25519Verifier);
                Verdict {
                    label,
                    tx_id: Some(tx_id),
                    accepted: result.is_ok(),
                    reason: result.err().map(|e| e.to_string()),
                }
            }
        };
        tracing::info!(
            label = %verdict.label,
            accepted = verdict.accepted,
            "scenario transaction processed"
        );
        verdicts.push(verdict);
    }

    let ledger = shared.into_inner();
    let balances = ledger
        .iter()
        .map(|(identity, balance)| BalanceLine {
            name: directory.name_of(identity).unwrap_or_default().to_owned(),
            identity: identity.to_hex(),
            balance: *balance,
        })
        .collect();

    Ok(Outcome {
        verdicts,
        balances,
        report: ledger.report(&directory),
    })
}

/// Builds and signs one transaction. The inner `Err` is a structural
/// rejection to report; the outer one means the scenario is inconsistent.
fn build(
    plan: &TxPlan,
    wallet: &Wallet,
    directory: &PublicKeyMap,
) -> Result<std::result::Result<Transaction, String>> {
    let mut outputs = EntryBatch::new();
    for leg in &plan.outputs {
        outputs.append(lookup(directory, &leg.alias)?, leg.amount);
    }

    let mut inputs = Vec::with_capacity(plan.inputs.len());
    for leg in &plan.inputs {
        let identity = lookup(directory, &leg.alias)?;
        let input = if plan.forge {
            let signature = wallet.sign_as(&leg.alias, b"not the transaction")?;
            SignedInput::new(identity, leg.amount, signature)
        } else {
            SignedInput::sign(wallet, identity, leg.amount, &outputs)?
        };
        inputs.push(input);
    }

    Ok(Transaction::new(inputs, outputs).map_err(|e| e.to_string()))
}

fn lookup(directory: &PublicKeyMap, alias: &str) -> Result<tally_protocol::crypto::Identity> {
    directory
        .identity_of(alias)
        .ok_or_else(|| anyhow!("alias {alias:?} has no key"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PAYMENT: &str = r#"{
        "accounts": [{ "alias": "alice", "balance": 25 }],
        "transactions": [
            {
                "label": "overspend",
                "inputs":  [{ "alias": "alice", "amount": 25 }],
                "outputs": [{ "alias": "bob", "amount": 10 }, { "alias": "carol", "amount": 20 }]
            },
            {
                "label": "pay",
                "inputs":  [{ "alias": "alice", "amount": 25 }],
                "outputs": [{ "alias": "bob", "amount": 5 }, { "alias": "carol", "amount": 20 }]
            }
        ]
    }"#;

    #[test]
    fn loads_and_runs_scenario_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PAYMENT.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();
        let outcome = run(&scenario).unwrap();

        assert!(!outcome.verdicts[0].accepted);
        assert!(outcome.verdicts[1].accepted);
        assert_eq!(outcome.balance_of("alice"), Some(0));
        assert_eq!(outcome.balance_of("bob"), Some(5));
        assert_eq!(outcome.balance_of("carol"), Some(20));
        assert!(outcome
            .report
            .starts_with("The balance for alice is 0\n"));
    }

    #[test]
    fn forged_inputs_are_rejected() {
        let scenario = Scenario::parse(
            r#"{
                "accounts": [{ "alias": "alice", "balance": 9 }],
                "transactions": [{
                    "inputs":  [{ "alias": "alice", "amount": 9 }],
                    "outputs": [{ "alias": "bob", "amount": 9 }],
                    "forge": true
                }]
            }"#,
        )
        .unwrap();
        let outcome = run(&scenario).unwrap();

        let verdict = &outcome.verdicts[0];
        assert_eq!(verdict.label, "tx-1");
        assert!(!verdict.accepted);
        assert!(verdict.reason.as_deref().unwrap().contains("invalid signature"));
        assert_eq!(outcome.balance_of("alice"), Some(9));
    }

    #[test]
    fn zero_amount_is_a_structural_rejection() {
        let scenario = Scenario::parse(
            r#"{
                "accounts": [{ "alias": "alice", "balance": 9 }],
                "transactions": [{
                    "inputs":  [{ "alias": "alice", "amount": 0 }],
                    "outputs": [{ "alias": "bob", "amount": 0 }]
                }]
            }"#,
        )
        .unwrap();
        let outcome = run(&scenario).unwrap();
        assert!(outcome.verdicts[0].tx_id.is_none());
        assert!(!outcome.verdicts[0].accepted);
    }

    #[test]
    fn aliases_are_collected_once_in_order() {
        let scenario = Scenario::parse(PAYMENT).unwrap();
        assert_eq!(scenario.aliases(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = Scenario::parse(r#"{ "acounts": [] }"#).unwrap_err();
        assert!(format!("{err:#}").contains("malformed scenario JSON"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = Scenario::load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn outcome_serializes_without_report() {
        let outcome = run(&Scenario::parse(PAYMENT).unwrap()).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("report").is_none());
        assert_eq!(json["verdicts"].as_array().unwrap().len(), 2);
        assert_eq!(json["balances"][0]["name"], "alice");
    }
}
