//! Service role presets.
//!
//! Selecting a role is a caller convenience: roles with an opening prompt
//! send that prompt once, as an explicit submission, right after the role
//! changes. The session manager itself holds no role state.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// A named assistant role with an optional opening prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolePreset {
    #[default]
    CustomerService,
    WeatherOutfit,
    DinnerAdvisor,
    FinanceHelper,
    MoodSupport,
}

impl RolePreset {
    pub const ALL: [RolePreset; 5] = [
        RolePreset::CustomerService,
        RolePreset::WeatherOutfit,
        RolePreset::DinnerAdvisor,
        RolePreset::FinanceHelper,
        RolePreset::MoodSupport,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            RolePreset::CustomerService => "智慧客服",
            RolePreset::WeatherOutfit => "天氣+穿搭助理",
            RolePreset::DinnerAdvisor => "晚餐建議師",
            RolePreset::FinanceHelper => "理財小助理",
            RolePreset::MoodSupport => "情緒小幫手",
        }
    }

    /// Stable ASCII identifier used on the command line and in config files.
    pub fn slug(&self) -> &'static str {
        match self {
            RolePreset::CustomerService => "customer_service",
            RolePreset::WeatherOutfit => "weather_outfit",
            RolePreset::DinnerAdvisor => "dinner_advisor",
            RolePreset::FinanceHelper => "finance_helper",
            RolePreset::MoodSupport => "mood_support",
        }
    }

    /// Prompt submitted once when this role is selected, if any.
    pub fn opening_prompt(&self) -> Option<&'static str> {
        match self {
            RolePreset::CustomerService => None,
            RolePreset::WeatherOutfit => Some("幫我搜尋今天的天氣，我應該穿什麼服裝出門？"),
            RolePreset::DinnerAdvisor => Some("請幫我決定今天晚餐要吃什麼。"),
            RolePreset::FinanceHelper => Some("請給我簡單的理財或預算建議"),
            RolePreset::MoodSupport => Some("我心情不好，請給我一些安慰和建議"),
        }
    }
}

impl fmt::Display for RolePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for RolePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        RolePreset::ALL
            .into_iter()
            .find(|role| role.slug() == wanted || role.label() == s.trim())
            .ok_or_else(|| format!("invalid role: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in RolePreset::ALL {
            let parsed: RolePreset = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_role_parses_label_and_dashes() {
        assert_eq!("晚餐建議師".parse::<RolePreset>().unwrap(), RolePreset::DinnerAdvisor);
        assert_eq!("mood-support".parse::<RolePreset>().unwrap(), RolePreset::MoodSupport);
        assert!("pirate".parse::<RolePreset>().is_err());
    }

    #[test]
    fn test_default_role_has_no_opening_prompt() {
        assert_eq!(RolePreset::default(), RolePreset::CustomerService);
        assert!(RolePreset::default().opening_prompt().is_none());
    }

    #[test]
    fn test_other_roles_have_opening_prompts() {
        let with_prompt = RolePreset::ALL
            .iter()
            .filter(|r| r.opening_prompt().is_some())
            .count();
        assert_eq!(with_prompt, 4);
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&RolePreset::WeatherOutfit).unwrap();
        assert_eq!(json, "\"weather_outfit\"");
    }
}
