use crate::{Content, ProgressionRule, RunSnapshot, TalentDef, TalentEffect, UpgradeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub autosave_enabled: bool,
    pub autosave_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_enabled: true,
            autosave_interval_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LifetimeStats {
    pub runs_started: u32,
    pub runs_won: u32,
    pub runs_lost: u32,
    pub enemies_defeated: u32,
    pub elites_defeated: u32,
    pub bosses_defeated: u32,
    pub gold_earned: u64,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub cards_unlocked: u32,
    pub highest_floor: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpgradeCounts {
    pub health_upgrades_purchased: u32,
    pub max_energy_upgrades_purchased: u32,
    pub hand_size_upgrades_purchased: u32,
    pub starting_gold_upgrades_purchased: u32,
}

impl UpgradeCounts {
    pub fn get(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Health => self.health_upgrades_purchased,
            UpgradeKind::MaxEnergy => self.max_energy_upgrades_purchased,
            UpgradeKind::HandSize => self.hand_size_upgrades_purchased,
            UpgradeKind::StartingGold => self.starting_gold_upgrades_purchased,
        }
    }

    pub fn increment(&mut self, kind: UpgradeKind) -> u32 {
        let slot = match kind {
            UpgradeKind::Health => &mut self.health_upgrades_purchased,
            UpgradeKind::MaxEnergy => &mut self.max_energy_upgrades_purchased,
            UpgradeKind::HandSize => &mut self.hand_size_upgrades_purchased,
            UpgradeKind::StartingGold => &mut self.starting_gold_upgrades_purchased,
        };
        *slot = slot.saturating_add(1);
        *slot
    }
}

/// Sum of the effects of every unlocked talent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TalentBonuses {
    pub max_health: u32,
    pub max_energy: u32,
    pub hand_size: u32,
    pub starting_gold: u32,
    pub card_choices: u32,
    pub gold_gain_percent: u32,
    pub revive_percent: Option<u32>,
}

/// Cross-run progression; the only state that survives a reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub level: u32,
    pub experience: u32,
    pub talent_points: u32,
    pub unlocked_talents: Vec<String>,
    pub upgrades: UpgradeCounts,
    pub current_run: Option<RunSnapshot>,
    pub lifetime_stats: LifetimeStats,
    pub settings: Settings,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            talent_points: 0,
            unlocked_talents: Vec::new(),
            upgrades: UpgradeCounts::default(),
            current_run: None,
            lifetime_stats: LifetimeStats::default(),
            settings: Settings::default(),
        }
    }
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_talent(&self, id: &str) -> bool {
        self.unlocked_talents.iter().any(|talent| talent == id)
    }

    pub fn experience_to_next(&self, rule: &ProgressionRule) -> u32 {
        rule.experience_per_level.saturating_mul(self.level.max(1))
    }

    /// Adds experience and returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32, rule: &ProgressionRule) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.level < rule.max_level && rule.experience_per_level > 0 {
            let needed = self.experience_to_next(rule);
            if self.experience < needed {
                break;
            }
            self.experience -= needed;
            self.level += 1;
            self.talent_points = self
                .talent_points
                .saturating_add(rule.talent_points_per_level);
            gained += 1;
        }
        gained
    }

    pub fn missing_prerequisites(&self, talent: &TalentDef) -> Vec<String> {
        talent
            .prerequisites
            .iter()
            .filter(|id| !self.has_talent(id))
            .cloned()
            .collect()
    }

    /// Refunds every unlocked talent; returns the points returned.
    pub fn reset_talents(&mut self, content: &Content) -> u32 {
        let refund: u32 = self
            .unlocked_talents
            .iter()
            .filter_map(|id| content.talent(id))
            .map(|talent| talent.cost)
            .sum();
        self.unlocked_talents.clear();
        self.talent_points = self.talent_points.saturating_add(refund);
        refund
    }

    pub fn talent_bonuses(&self, content: &Content) -> TalentBonuses {
        let mut bonuses = TalentBonuses::default();
        for talent in self
            .unlocked_talents
            .iter()
            .filter_map(|id| content.talent(id))
        {
            for effect in &talent.effects {
                match effect {
                    TalentEffect::MaxHealth { amount } => bonuses.max_health += amount,
                    TalentEffect::MaxEnergy { amount } => bonuses.max_energy += amount,
                    TalentEffect::HandSize { amount } => bonuses.hand_size += amount,
                    TalentEffect::StartingGold { amount } => bonuses.starting_gold += amount,
                    TalentEffect::CardChoices { amount } => bonuses.card_choices += amount,
                    TalentEffect::GoldGainPercent { percent } => {
                        bonuses.gold_gain_percent += percent
                    }
                    TalentEffect::Revive { percent } => {
                        let best = bonuses.revive_percent.unwrap_or(0).max(*percent);
                        bonuses.revive_percent = Some(best);
                    }
                }
            }
        }
        bonuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_content;

    #[test]
    fn experience_levels_up_and_grants_points() {
        let rule = ProgressionRule::default();
        let mut profile = Profile::new();
        assert_eq!(profile.gain_experience(99, &rule), 0);
        assert_eq!(profile.gain_experience(1, &rule), 1);
        assert_eq!(profile.level, 2);
        assert_eq!(profile.talent_points, 1);
        assert_eq!(profile.experience, 0);
        // level 2 -> 3 needs 200, level 3 -> 4 needs 300
        assert_eq!(profile.gain_experience(500, &rule), 2);
        assert_eq!(profile.level, 4);
    }

    #[test]
    fn talent_bonuses_sum_unlocked_talents() {
        let content = sample_content();
        let mut profile = Profile::new();
        profile.unlocked_talents = vec!["vitality".to_string(), "second_wind".to_string()];
        let bonuses = profile.talent_bonuses(&content);
        assert_eq!(bonuses.max_health, 10);
        assert_eq!(bonuses.revive_percent, Some(50));
        assert_eq!(profile.reset_talents(&content), 3);
        assert!(profile.unlocked_talents.is_empty());
        assert_eq!(profile.talent_points, 3);
    }

    #[test]
    fn profile_round_trips_through_json_with_camel_case_keys() {
        let mut profile = Profile::new();
        profile.talent_points = 2;
        let json = serde_json::to_string(&profile).expect("serialize");
        assert!(json.contains("\"talentPoints\":2"));
        assert!(json.contains("\"lifetimeStats\""));
        let back: Profile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, profile);
    }
}
