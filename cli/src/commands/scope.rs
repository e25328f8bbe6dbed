//! Scope item commands

use nomos_compliance::domain::{month_name, RecurrencePeriod, ScopeDefinition, ScopeItem};
use tabled::Tabled;

use super::{id, Session};
use crate::output::{or_dash, status_badge, tier_badge, OutputFormat};
use crate::{ScopeArgs, ScopeCommands};

#[derive(Tabled)]
struct ScopeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Period")]
    period: &'static str,
    #[tabled(rename = "Start")]
    start: &'static str,
    #[tabled(rename = "P×I")]
    grid: String,
    #[tabled(rename = "Tier")]
    tier: String,
}

impl From<&ScopeItem> for ScopeRow {
    fn from(item: &ScopeItem) -> Self {
        let risk = item.risk();
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            period: item.period().label(),
            start: month_name(item.start_month()),
            grid: format!("{}×{} = {}", risk.probability.value(), risk.impact.value(), risk.score),
            tier: tier_badge(risk.tier).to_string(),
        }
    }
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Entry")]
    id: String,
    #[tabled(rename = "Month")]
    month: &'static str,
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<ScopeArgs> for ScopeDefinition {
    fn from(args: ScopeArgs) -> Self {
        ScopeDefinition {
            name: args.name,
            purpose: args.purpose,
            area_id: id(&args.area),
            cost_center_id: args.cost_center.as_deref().map(id),
            area_tag: args.area_tag,
            procedures: args.procedures,
            period: RecurrencePeriod::parse(&args.period),
            start_month: args.start_month,
            normative_basis: args.normative_basis,
            probability: args.probability,
            impact: args.impact,
        }
    }
}

fn show(item: &ScopeItem, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let risk = item.risk();
            println!("ID:              {}", item.id());
            println!("Name:            {}", item.name());
            println!("Purpose:         {}", or_dash(item.purpose()));
            println!("Area:            {}", item.area_id());
            println!("Cost center:     {}", or_dash(item.cost_center_id()));
            println!("Area tag:        {}", or_dash(item.area_tag()));
            println!("Procedures:      {}", or_dash(item.procedures()));
            println!("Normative basis: {}", or_dash(item.normative_basis()));
            println!(
                "Recurrence:      {} from {}",
                item.period().label(),
                month_name(item.start_month())
            );
            println!(
                "Risk:            {}×{} = {} ({})",
                risk.probability.value(),
                risk.impact.value(),
                risk.score,
                tier_badge(risk.tier)
            );
        }
        format => format.print(item),
    }
}

pub async fn handle(action: ScopeCommands, session: &Session) -> Result<(), String> {
    let scopes = &session.engine.scopes;
    match action {
        ScopeCommands::Add(args) => {
            let item = scopes.create(args.into()).await.map_err(|e| e.to_string())?;
            println!("Created scope item: {} ({})", item.id(), tier_badge(item.risk_tier()));
        }
        ScopeCommands::List => {
            let institution = session.institution()?;
            let mut items = scopes.list(&institution).await.map_err(|e| e.to_string())?;
            items.sort_by(|a, b| a.name().cmp(b.name()));
            session
                .format
                .render(&items, |list| list.iter().map(ScopeRow::from).collect());
        }
        ScopeCommands::Show { id: scope_id } => {
            let item = scopes.get(&id(&scope_id)).await.map_err(|e| e.to_string())?;
            show(&item, session.format);
        }
        ScopeCommands::Update { id: scope_id, fields } => {
            let item = scopes
                .update(&id(&scope_id), fields.into())
                .await
                .map_err(|e| e.to_string())?;
            show(&item, session.format);
        }
        ScopeCommands::Rescore { id: scope_id, probability, impact } => {
            let risk = scopes
                .rescore(&id(&scope_id), probability, impact)
                .await
                .map_err(|e| e.to_string())?;
            match session.format {
                OutputFormat::Table => println!("Score {} ({})", risk.score, tier_badge(risk.tier)),
                format => format.print(&risk),
            }
        }
        ScopeCommands::Delete { id: scope_id } => {
            scopes.delete(&id(&scope_id)).await.map_err(|e| e.to_string())?;
            println!("Deleted scope item: {}", scope_id);
        }
        ScopeCommands::Plan { id: scope_id, year } => {
            let scope_id = id(&scope_id);
            let entries = match year {
                Some(year) => scopes.generate_schedule_for_year(&scope_id, year).await,
                None => scopes.generate_schedule(&scope_id).await,
            }
            .map_err(|e| e.to_string())?;
            session.format.render(&entries, |list| {
                list.iter()
                    .map(|e| EntryRow {
                        id: e.id.to_string(),
                        month: e.month_name(),
                        year: e.year,
                        status: status_badge(e.status).to_string(),
                    })
                    .collect()
            });
        }
    }
    Ok(())
}
