//! Planning session
//!
//! `BudgetPlanner` wires the factor resolver, allocation calculator,
//! preference adjuster, ledger and assistant merger into one session. It
//! owns the ledger, saves a full snapshot through the injected
//! [`PersistenceGateway`] after every committed change, and optionally
//! writes an audit trail.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    BudgetCategory, BudgetData, BudgetLocation, BudgetPreferences, CategoryId, Contract, Money,
    ProposalId,
};
use crate::storage::PersistenceGateway;

use super::allocation::{describe_total, AllocationCalculator, AllocationPolicy};
use super::assistant::{AssistantGateway, AssistantReply, ChatTurn, MergeReport};
use super::factors::FactorResolver;
use super::ledger::CategoryLedger;

/// Inputs for a new plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub total_budget: Money,
    pub guest_count: u32,
    /// Must carry a wedding date
    pub location: BudgetLocation,
    pub preferences: BudgetPreferences,
}

/// Handle for an assistant round trip in flight
#[derive(Debug, Clone)]
pub struct ProposalTicket {
    pub id: ProposalId,
    /// Ledger revision when the request was dispatched
    pub revision: u64,
    /// What the assistant gets to see
    pub snapshot: BudgetData,
}

/// What happened to an assistant reply
#[derive(Debug, Clone, PartialEq)]
pub enum ProposalOutcome {
    Applied(MergeReport),
    /// No patches came back (including timeouts)
    NoProposal,
    /// The session was closed before the reply arrived
    Discarded,
}

/// Reply text plus what the engine did with the patches
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantExchange {
    pub reply: Option<String>,
    pub outcome: ProposalOutcome,
}

/// One planning session over a persisted budget
pub struct BudgetPlanner<G: PersistenceGateway> {
    gateway: G,
    ledger: CategoryLedger,
    guest_count: u32,
    location: BudgetLocation,
    preferences: BudgetPreferences,
    last_updated: DateTime<Utc>,
    audit: Option<AuditLogger>,
    revision: u64,
    closed: bool,
}

impl<G: PersistenceGateway> BudgetPlanner<G> {
    /// Plan a new budget with the default allocation policy
    pub fn start(gateway: G, request: PlanRequest) -> BudgetResult<Self> {
        Self::start_with_policy(gateway, request, AllocationPolicy::default())
    }

    /// Plan a new budget, then save it
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a non-positive total, zero guests or a missing
    /// date; `InvalidDate` for an unparseable date.
    pub fn start_with_policy(
        gateway: G,
        request: PlanRequest,
        policy: AllocationPolicy,
    ) -> BudgetResult<Self> {
        if !request.total_budget.is_positive() || request.total_budget > Money::MAX_INPUT {
            return Err(BudgetError::InvalidInput(format!(
                "total budget must be positive and at most {}, got {}",
                Money::MAX_INPUT,
                request.total_budget
            )));
        }
        if request.guest_count == 0 {
            return Err(BudgetError::InvalidInput(
                "guest count must be at least 1".into(),
            ));
        }
        policy.validate()?;

        let factors = FactorResolver::resolve_location(&request.location)?;
        let budget = AllocationCalculator::new(policy).calculate(
            request.total_budget,
            request.guest_count,
            &factors,
            Some(&request.preferences),
        )?;
        let ledger = CategoryLedger::seed(budget, request.total_budget)?;

        info!(
            total = %request.total_budget,
            guests = request.guest_count,
            location = %request.location,
            "Planned new budget"
        );

        let planner = Self {
            gateway,
            ledger,
            guest_count: request.guest_count,
            location: request.location,
            preferences: request.preferences,
            last_updated: Utc::now(),
            audit: None,
            revision: 0,
            closed: false,
        };
        planner.persist();
        Ok(planner)
    }

    /// Resume the session saved in `gateway`, if there is one
    pub fn resume(gateway: G) -> BudgetResult<Option<Self>> {
        let Some(data) = gateway.load()? else {
            return Ok(None);
        };
        let ledger = CategoryLedger::restore(&data)?;
        debug!(categories = ledger.len(), "Resumed budget session");

        Ok(Some(Self {
            gateway,
            ledger,
            guest_count: data.guest_count,
            location: data.location,
            preferences: data.preferences,
            last_updated: data.last_updated,
            audit: None,
            revision: 0,
            closed: false,
        }))
    }

    /// Builder: record every committed change in an audit log
    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    /// Write the initial state to the audit log
    pub fn audit_created(&self) {
        let snapshot = self.snapshot();
        self.audit(AuditEntry::create(
            EntityType::Budget,
            "budget",
            Some(snapshot.calculated_budget.rationale.total_budget.clone()),
            &snapshot,
        ));
    }

    pub fn ledger(&self) -> &CategoryLedger {
        &self.ledger
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn preferences(&self) -> &BudgetPreferences {
        &self.preferences
    }

    pub fn guest_count(&self) -> u32 {
        self.guest_count
    }

    pub fn location(&self) -> &BudgetLocation {
        &self.location
    }

    /// Number of changes committed in this session
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The full persisted shape of the session
    pub fn snapshot(&self) -> BudgetData {
        BudgetData {
            total_budget: self.ledger.total_budget(),
            guest_count: self.guest_count,
            location: self.location.clone(),
            preferences: self.preferences.clone(),
            calculated_budget: self.ledger.budget().clone(),
            last_updated: self.last_updated,
            retired_category_ids: self.ledger.retired_ids().clone(),
        }
    }

    /// Remove a category; see [`CategoryLedger::remove`]
    pub fn remove_category(&mut self, id: &CategoryId) -> BudgetResult<BudgetCategory> {
        self.ensure_open()?;
        let before = self.ledger.categories().to_vec();
        let removed = self.ledger.remove(id)?;

        let entry = AuditEntry::category_removed(&removed, &before, self.ledger.categories());
        self.committed(vec![entry]);
        Ok(removed)
    }

    /// Merge one category into another; see [`CategoryLedger::merge`]
    pub fn merge_categories(
        &mut self,
        source: &CategoryId,
        target: &CategoryId,
    ) -> BudgetResult<BudgetCategory> {
        self.ensure_open()?;
        let from = self.ledger.category(source).cloned();
        let into = self.ledger.category(target).cloned();
        let merged = self.ledger.merge(source, target)?;

        let mut entries = Vec::new();
        if let Some(from) = from {
            entries.push(AuditEntry::delete(
                EntityType::Category,
                from.id.as_str(),
                Some(from.name.clone()),
                &from,
            ));
        }
        if let Some(into) = into {
            entries.push(AuditEntry::category_updated(&into, &merged));
        }
        self.committed(entries);
        Ok(merged)
    }

    /// Add a category; see [`CategoryLedger::add`]
    pub fn add_category(&mut self, category: BudgetCategory) -> BudgetResult<BudgetCategory> {
        self.ensure_open()?;
        let before = self.ledger.categories().to_vec();
        let added = self.ledger.add(category)?;

        let entry = AuditEntry::category_added(&added, &before, self.ledger.categories());
        self.committed(vec![entry]);
        Ok(added)
    }

    /// Replace the preference set and re-weight costs
    pub fn apply_preferences(&mut self, preferences: BudgetPreferences) -> BudgetResult<()> {
        self.ensure_open()?;
        let before = self.ledger.categories().to_vec();
        self.ledger.apply_preferences(&preferences)?;

        let entry = AuditEntry::update(
            EntityType::Preferences,
            "preferences",
            None,
            &self.preferences,
            &preferences,
        )
        .with_ledger_changes(&before, self.ledger.categories());
        self.preferences = preferences;
        self.committed(vec![entry]);
        Ok(())
    }

    /// Record actual spending on a category
    pub fn record_actual_cost(&mut self, id: &CategoryId, amount: Money) -> BudgetResult<BudgetCategory> {
        self.ensure_open()?;
        let before = self.ledger.category(id).cloned();
        let updated = self.ledger.record_actual_cost(id, amount)?;
        self.committed(Self::category_update(before, &updated));
        Ok(updated)
    }

    /// Attach a vendor contract to a category
    pub fn attach_contract(&mut self, id: &CategoryId, contract: Contract) -> BudgetResult<BudgetCategory> {
        self.ensure_open()?;
        let before = self.ledger.category(id).cloned();
        let updated = self.ledger.attach_contract(id, contract)?;
        self.committed(Self::category_update(before, &updated));
        Ok(updated)
    }

    /// Change the total budget; shares stay, estimates scale
    pub fn set_total_budget(&mut self, total_budget: Money) -> BudgetResult<()> {
        self.ensure_open()?;
        let previous = self.ledger.total_budget();
        let before = self.ledger.categories().to_vec();
        let description = describe_total(total_budget, self.guest_count);
        self.ledger.set_total_budget(total_budget, description)?;

        let entry = AuditEntry::update(
            EntityType::Budget,
            "budget",
            None,
            &previous,
            &total_budget,
        )
        .with_ledger_changes(&before, self.ledger.categories())
        .with_summary(format!("totalBudget: {} -> {}", previous, total_budget));
        self.committed(vec![entry]);
        Ok(())
    }

    /// Capture the state to send to the assistant
    pub fn begin_proposal(&self) -> BudgetResult<ProposalTicket> {
        self.ensure_open()?;
        Ok(ProposalTicket {
            id: ProposalId::new(),
            revision: self.revision,
            snapshot: self.snapshot(),
        })
    }

    /// Apply the assistant's reply to whatever the ledger looks like now
    ///
    /// Patches are validated against the current ledger, not the ticket's
    /// snapshot, so edits made while the request was in flight win. A
    /// missing reply or one without patches is a no-op.
    pub fn complete_proposal(
        &mut self,
        ticket: ProposalTicket,
        reply: Option<AssistantReply>,
    ) -> BudgetResult<ProposalOutcome> {
        if self.closed {
            debug!(proposal = %ticket.id, "Session closed; discarding assistant reply");
            return Ok(ProposalOutcome::Discarded);
        }

        let patches = match reply.and_then(|r| r.patches) {
            Some(patches) if !patches.is_empty() => patches,
            _ => return Ok(ProposalOutcome::NoProposal),
        };

        if ticket.revision != self.revision {
            info!(
                proposal = %ticket.id,
                dispatched = ticket.revision,
                current = self.revision,
                "Ledger changed while the assistant was thinking; revalidating patches"
            );
        }

        let before = self.ledger.categories().to_vec();
        let report = self.ledger.apply_proposal(&patches)?;

        let entry = AuditEntry::update(
            EntityType::Proposal,
            ticket.id.to_string(),
            Some(format!(
                "{} applied, {} dropped",
                report.applied.len(),
                report.dropped.len()
            )),
            &before,
            &self.ledger.categories().to_vec(),
        )
        .with_ledger_changes(&before, self.ledger.categories());
        self.committed(vec![entry]);
        Ok(ProposalOutcome::Applied(report))
    }

    /// Ask the assistant and apply its patches in one step
    ///
    /// Assistant failures are logged and treated as "no proposal".
    pub fn ask_assistant(
        &mut self,
        assistant: &dyn AssistantGateway,
        message: &str,
        history: &[ChatTurn],
    ) -> BudgetResult<AssistantExchange> {
        let ticket = self.begin_proposal()?;
        match assistant.propose(message, &ticket.snapshot, history) {
            Ok(reply) => {
                let text = reply.reply.clone();
                let outcome = self.complete_proposal(ticket, Some(reply))?;
                Ok(AssistantExchange {
                    reply: Some(text),
                    outcome,
                })
            }
            Err(e) => {
                warn!(error = %e, "Assistant round trip failed; treating as no proposal");
                let outcome = self.complete_proposal(ticket, None)?;
                Ok(AssistantExchange {
                    reply: None,
                    outcome,
                })
            }
        }
    }

    /// Tear the session down; later replies are discarded
    pub fn close(&mut self) {
        if !self.closed {
            info!(revision = self.revision, "Closed budget session");
        }
        self.closed = true;
    }

    fn ensure_open(&self) -> BudgetResult<()> {
        if self.closed {
            return Err(BudgetError::SessionClosed);
        }
        Ok(())
    }

    fn category_update(before: Option<BudgetCategory>, after: &BudgetCategory) -> Vec<AuditEntry> {
        before
            .map(|before| {
                AuditEntry::category_updated(&before, after)
            })
            .into_iter()
            .collect()
    }

    fn committed(&mut self, entries: Vec<AuditEntry>) {
        self.revision += 1;
        self.last_updated = Utc::now();
        for entry in entries {
            self.audit(entry);
        }
        self.persist();
    }

    fn audit(&self, entry: AuditEntry) {
        if let Some(logger) = &self.audit {
            if let Err(e) = logger.log(&entry) {
                warn!(error = %e, "Failed to write audit entry");
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.gateway.save(&self.snapshot()) {
            warn!(error = %e, "Failed to save budget snapshot");
        }
    }
}
