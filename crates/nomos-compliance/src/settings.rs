//! Engine Settings

use serde::{Deserialize, Serialize};

/// Runtime settings for the decision engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Author name stamped on system-generated messages
    pub system_author: String,
    /// Actions that mean "no follow-up needed" (compared case-insensitively)
    pub no_action_sentinels: Vec<String>,
    /// Maximum pending tests listed by the home summary
    pub pending_test_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            system_author: "Sistema".into(),
            no_action_sentinels: vec![
                "Manutenção".into(),
                "Nenhuma".into(),
                "Sem Acompanhamento".into(),
                "Maintenance".into(),
                "None".into(),
                "No Follow-up".into(),
            ],
            pending_test_limit: 20,
        }
    }
}

impl EngineSettings {
    /// Load from a JSON file
    pub fn load(path: &str) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Whether an effective action calls for a remediation workflow
    ///
    /// Blank actions and the configured sentinels never do.
    pub fn requires_remediation(&self, action: Option<&str>) -> bool {
        let Some(action) = action.map(str::trim).filter(|a| !a.is_empty()) else {
            return false;
        };
        let action = action.to_lowercase();
        !self
            .no_action_sentinels
            .iter()
            .any(|sentinel| sentinel.trim().to_lowercase() == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_never_require_remediation() {
        let settings = EngineSettings::default();
        assert!(!settings.requires_remediation(Some("Nenhuma")));
        assert!(!settings.requires_remediation(Some("NENHUMA")));
        assert!(!settings.requires_remediation(Some("manutenção")));
        assert!(!settings.requires_remediation(Some("sem acompanhamento")));
        assert!(!settings.requires_remediation(Some("no follow-up")));
    }

    #[test]
    fn test_blank_or_missing_action() {
        let settings = EngineSettings::default();
        assert!(!settings.requires_remediation(None));
        assert!(!settings.requires_remediation(Some("   ")));
    }

    #[test]
    fn test_corrective_action_requires_remediation() {
        let settings = EngineSettings::default();
        assert!(settings.requires_remediation(Some("Corretiva")));
        assert!(settings.requires_remediation(Some("Plano de ação")));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: EngineSettings =
            serde_json::from_str(r#"{"system_author": "Robô"}"#).unwrap();
        assert_eq!(settings.system_author, "Robô");
        assert_eq!(settings.pending_test_limit, 20);
        assert_eq!(settings.no_action_sentinels.len(), 6);
    }
}
