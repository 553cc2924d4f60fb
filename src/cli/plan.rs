//! Plan, show, preference and total commands

use clap::Args;

use crate::display::{format_breakdown, format_category_details, format_rationale};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetLocation, BudgetPreferences};
use crate::services::preferences::PREFERENCE_NOTE_PREFIX;
use crate::services::{BudgetPlanner, PlanRequest};

use super::{parse_category_id, parse_money, CliContext};

/// Preference flags shared by `plan` and `prefs`
#[derive(Args, Debug, Clone, Default)]
pub struct PreferenceArgs {
    /// Music choice (dj, band, playlist, string quartet)
    #[arg(long)]
    pub music: Option<String>,
    /// Hours of live music
    #[arg(long)]
    pub music_hours: Option<f64>,
    /// Photography coverage hours
    #[arg(long)]
    pub coverage_hours: Option<f64>,
    /// Makeup services, comma separated
    #[arg(long = "makeup", value_delimiter = ',')]
    pub makeup_services: Vec<String>,
    /// Transportation type (e.g. "Limo", "Standard sedan")
    #[arg(long)]
    pub transportation: Option<String>,
    /// Hours of transportation
    #[arg(long)]
    pub transportation_hours: Option<f64>,
    /// Catering style (plated, buffet, family style, food stations)
    #[arg(long)]
    pub catering_style: Option<String>,
    /// Bar service (open bar, beer & wine, cash bar)
    #[arg(long)]
    pub bar: Option<String>,
    /// Photo/video coverage (photo only, photo + video)
    #[arg(long)]
    pub photo_video: Option<String>,
    /// Floral style (minimal, classic, lavish)
    #[arg(long)]
    pub floral_style: Option<String>,
    /// DIY elements, comma separated
    #[arg(long = "diy", value_delimiter = ',')]
    pub diy_elements: Vec<String>,
    /// Beauty coverage (couple only, wedding party)
    #[arg(long)]
    pub beauty: Option<String>,
    /// Planning assistance (recorded only)
    #[arg(long)]
    pub planning: Option<String>,
}

impl PreferenceArgs {
    pub fn into_preferences(self) -> BudgetPreferences {
        BudgetPreferences {
            music_choice: self.music,
            music_hours: self.music_hours,
            coverage_hours: self.coverage_hours,
            makeup_services: self.makeup_services,
            transportation_type: self.transportation,
            transportation_hours: self.transportation_hours,
            catering_style: self.catering_style,
            bar_service: self.bar,
            photo_video_coverage: self.photo_video,
            floral_style: self.floral_style,
            diy_elements: self.diy_elements,
            beauty_coverage: self.beauty,
            planning_assistance: self.planning,
            ..Default::default()
        }
    }
}

/// Arguments for `plan`
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Total budget (e.g. "40000" or "$40,000")
    pub total: String,
    /// Number of guests
    pub guests: u32,
    /// City of the wedding
    #[arg(long)]
    pub city: String,
    /// State or region
    #[arg(long)]
    pub state: Option<String>,
    /// Country of the wedding
    #[arg(long)]
    pub country: String,
    /// Wedding date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,
    /// Destination wedding
    #[arg(long)]
    pub destination: bool,
    /// Overwrite an existing session
    #[arg(long)]
    pub force: bool,
    #[command(flatten)]
    pub preferences: PreferenceArgs,
}

/// Handle `plan`
pub fn handle_plan(ctx: &CliContext, args: PlanArgs) -> BudgetResult<()> {
    let store = ctx.store()?;
    if store.exists() && !args.force {
        return Err(BudgetError::InvalidInput(format!(
            "session '{}' already exists; pass --force to replace it",
            ctx.session
        )));
    }

    let mut location = BudgetLocation::new(args.city, args.country).with_wedding_date(args.date);
    if let Some(state) = args.state {
        location = location.with_state(state);
    }
    if args.destination {
        location = location.as_destination();
    }

    let request = PlanRequest {
        total_budget: parse_money(&args.total)?,
        guest_count: args.guests,
        location,
        preferences: args.preferences.into_preferences(),
    };

    let mut planner = BudgetPlanner::start_with_policy(store, request, ctx.settings.allocation.clone())?;
    if let Some(logger) = ctx.audit_logger() {
        planner = planner.with_audit(logger);
        planner.audit_created();
    }

    let data = planner.snapshot();
    print!("{}", format_breakdown(&data, &ctx.settings.currency_symbol));
    println!();
    print!("{}", format_rationale(&data));
    for key in data.preferences.unrecognized_keys() {
        println!("Note: preference '{}' is not recognized and was ignored.", key);
    }
    Ok(())
}

/// Handle `show`
pub fn handle_show(ctx: &CliContext, category: Option<String>, notes: bool) -> BudgetResult<()> {
    let planner = ctx.open()?;

    if let Some(category) = category {
        let id = parse_category_id(&category)?;
        let found = planner
            .ledger()
            .category(&id)
            .ok_or_else(|| BudgetError::category_not_found(id.as_str()))?;
        print!("{}", format_category_details(found, &ctx.settings.currency_symbol));
        return Ok(());
    }

    let data = planner.snapshot();
    print!("{}", format_breakdown(&data, &ctx.settings.currency_symbol));
    if notes {
        println!();
        print!("{}", format_rationale(&data));
    }
    Ok(())
}

/// Handle `prefs`
///
/// Flags overlay the saved preferences unless `replace` is set.
pub fn handle_prefs(ctx: &CliContext, args: PreferenceArgs, replace: bool) -> BudgetResult<()> {
    let mut planner = ctx.open()?;
    let update = args.into_preferences();
    let preferences = if replace {
        update
    } else {
        planner.preferences().merged_with(&update)
    };

    planner.apply_preferences(preferences)?;

    let data = planner.snapshot();
    print!("{}", format_breakdown(&data, &ctx.settings.currency_symbol));
    for note in data
        .calculated_budget
        .rationale
        .notes
        .iter()
        .filter(|n| n.starts_with(PREFERENCE_NOTE_PREFIX))
    {
        println!("  - {}", note);
    }
    Ok(())
}

/// Handle `total`
pub fn handle_total(ctx: &CliContext, total: &str) -> BudgetResult<()> {
    let mut planner = ctx.open()?;
    planner.set_total_budget(parse_money(total)?)?;
    print!(
        "{}",
        format_breakdown(&planner.snapshot(), &ctx.settings.currency_symbol)
    );
    Ok(())
}
