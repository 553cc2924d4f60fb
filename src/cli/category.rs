//! Category commands: remove, merge, add, actual cost and contracts

use chrono::Local;
use clap::Args;

use crate::display::{format_breakdown, format_category_details};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{parse_wedding_date, BudgetCategory, Contract, ContractStatus, Money, Percentage, Priority};

use super::{parse_category_id, parse_money, parse_percent, CliContext};

/// Arguments for `add`
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Display name of the new category
    pub name: String,
    /// Share of the total budget (e.g. "5" or "5%")
    #[arg(long, conflicts_with = "cost")]
    pub percent: Option<String>,
    /// Estimated cost; the share is derived from it
    #[arg(long)]
    pub cost: Option<String>,
    /// Priority (high, medium, low)
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    /// Why this category is in the budget
    #[arg(long)]
    pub rationale: Option<String>,
}

/// Arguments for `contract`
#[derive(Args, Debug, Clone)]
pub struct ContractArgs {
    /// Category id
    pub category: String,
    /// Vendor name
    pub vendor: String,
    /// Contract amount
    pub amount: String,
    /// Contract date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<String>,
    /// Status (pending, signed, paid, cancelled)
    #[arg(long, default_value = "pending")]
    pub status: ContractStatus,
}

/// Handle `remove`
pub fn handle_remove(ctx: &CliContext, category: &str) -> BudgetResult<()> {
    let mut planner = ctx.open()?;
    let removed = planner.remove_category(&parse_category_id(category)?)?;

    println!(
        "Removed {} ({}); its share was spread over the remaining categories.",
        removed.name, removed.percentage
    );
    print!(
        "{}",
        format_breakdown(&planner.snapshot(), &ctx.settings.currency_symbol)
    );
    Ok(())
}

/// Handle `merge`
pub fn handle_merge(ctx: &CliContext, source: &str, target: &str) -> BudgetResult<()> {
    let mut planner = ctx.open()?;
    let merged = planner.merge_categories(&parse_category_id(source)?, &parse_category_id(target)?)?;

    println!("Merged {} into {}.", source, merged.name);
    print!("{}", format_category_details(&merged, &ctx.settings.currency_symbol));
    Ok(())
}

/// Handle `add`
pub fn handle_add(ctx: &CliContext, args: AddArgs) -> BudgetResult<()> {
    let mut planner = ctx.open()?;

    let percentage = match &args.percent {
        Some(percent) => parse_percent(percent)?,
        None => Percentage::zero(),
    };
    let cost = match &args.cost {
        Some(cost) => parse_money(cost)?.round_to_unit(),
        None => Money::zero(),
    };
    if percentage.is_zero() && cost.is_zero() {
        return Err(BudgetError::InvalidInput(
            "give the new category a --percent or a --cost".into(),
        ));
    }

    let id = planner.ledger().next_free_id(&args.name);
    let mut category = BudgetCategory::new(id, args.name.trim(), percentage)
        .with_priority(args.priority)
        .with_estimated_cost(cost);
    if let Some(rationale) = args.rationale {
        category = category.with_rationale(rationale);
    }

    let added = planner.add_category(category)?;
    println!("Added {} ({}) at {}.", added.name, added.id, added.percentage);
    print!(
        "{}",
        format_breakdown(&planner.snapshot(), &ctx.settings.currency_symbol)
    );
    Ok(())
}

/// Handle `actual`
pub fn handle_actual(ctx: &CliContext, category: &str, amount: &str) -> BudgetResult<()> {
    let mut planner = ctx.open()?;
    let updated = planner.record_actual_cost(&parse_category_id(category)?, parse_money(amount)?)?;

    println!(
        "{}: spent {} of {} ({} remaining)",
        updated.name,
        ctx.money(updated.actual_cost()),
        ctx.money(updated.estimated_cost()),
        ctx.money(updated.remaining())
    );
    if updated.is_over_budget() {
        println!("Warning: {} is over its estimate.", updated.name);
    }
    Ok(())
}

/// Handle `contract`
pub fn handle_contract(ctx: &CliContext, args: ContractArgs) -> BudgetResult<()> {
    let mut planner = ctx.open()?;

    let date = match &args.date {
        Some(date) => parse_wedding_date(date)?,
        None => Local::now().date_naive(),
    };
    let contract = Contract::new(args.vendor, parse_money(&args.amount)?, date).with_status(args.status);
    let contract_id = contract.id;

    let updated = planner.attach_contract(&parse_category_id(&args.category)?, contract)?;
    println!("Recorded contract {} on {}.", contract_id, updated.name);
    print!("{}", format_category_details(&updated, &ctx.settings.currency_symbol));
    Ok(())
}
