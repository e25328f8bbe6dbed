//! Schedule entries and calendar projection

use nomos_common::EntityId;
use serde::{Deserialize, Serialize};

use crate::domain::scope::ScopeItem;

/// Month names as shown to tenants
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho",
    "Julho", "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];

/// Display name for a 1-based month
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("")
}

/// 1-based month from a name ("março", "Marco") or a number ("3")
pub fn month_from_name(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let wanted = value.to_lowercase().replace('ç', "c");
    MONTH_NAMES
        .iter()
        .position(|name| name.to_lowercase().replace('ç', "c") == wanted)
        .map(|idx| idx as u32 + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Planned,
    Done,
}

impl ScheduleStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Planned => "Planejado",
            Self::Done => "Realizado",
        }
    }
}

/// One expected occurrence of a scope item test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: EntityId,
    pub scope_item_id: EntityId,
    /// 1-based month
    pub month: u32,
    pub year: i32,
    pub status: ScheduleStatus,
}

impl ScheduleEntry {
    pub fn planned(scope_item_id: EntityId, month: u32, year: i32) -> Self {
        Self {
            id: EntityId::new(),
            scope_item_id,
            month,
            year,
            status: ScheduleStatus::Planned,
        }
    }

    pub fn mark_done(&mut self) {
        self.status = ScheduleStatus::Done;
    }

    pub fn is_pending(&self) -> bool {
        self.status == ScheduleStatus::Planned
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }
}

/// Project a scope item's recurrence across one calendar year
///
/// Starts at the item's starting month and steps by the period until December.
pub fn project(scope: &ScopeItem, year: i32) -> Vec<ScheduleEntry> {
    let Some(step) = scope.period().step_months() else {
        return Vec::new();
    };
    (scope.start_month()..=12)
        .step_by(step as usize)
        .map(|month| ScheduleEntry::planned(scope.id().clone(), month, year))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scope::tests::definition;
    use crate::domain::scope::RecurrencePeriod;

    fn months(period: RecurrencePeriod, start: &str) -> Vec<u32> {
        let mut def = definition(EntityId::new(), 1, 1);
        def.period = period;
        def.start_month = start.into();
        let item = ScopeItem::create(def);
        project(&item, 2026).iter().map(|e| e.month).collect()
    }

    #[test]
    fn test_quarterly_from_february() {
        assert_eq!(months(RecurrencePeriod::Quarterly, "Fevereiro"), [2, 5, 8, 11]);
    }

    #[test]
    fn test_monthly_from_october() {
        assert_eq!(months(RecurrencePeriod::Monthly, "Outubro"), [10, 11, 12]);
    }

    #[test]
    fn test_semiannual_and_annual() {
        assert_eq!(months(RecurrencePeriod::Semiannual, "Janeiro"), [1, 7]);
        assert_eq!(months(RecurrencePeriod::Annual, "Dezembro"), [12]);
        assert_eq!(months(RecurrencePeriod::Bimonthly, "Agosto"), [8, 10, 12]);
    }

    #[test]
    fn test_non_recurring_projects_nothing() {
        assert!(months(RecurrencePeriod::None, "Janeiro").is_empty());
    }

    #[test]
    fn test_entries_start_planned() {
        let item = ScopeItem::create(definition(EntityId::new(), 1, 1));
        let entries = project(&item, 2026);
        assert!(entries.iter().all(|e| e.is_pending() && e.year == 2026));
        assert!(entries.iter().all(|e| e.scope_item_id == *item.id()));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_from_name("Março"), Some(3));
        assert_eq!(month_from_name("marco"), Some(3));
        assert_eq!(month_from_name("12"), Some(12));
        assert_eq!(month_from_name("13"), None);
        assert_eq!(month_name(3), "Março");
        assert_eq!(month_name(0), "");
    }
}
