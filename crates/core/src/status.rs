//! Stacking buffs and debuffs and their per-turn resolution.
//!
//! A holder carries at most one instance per [`StatusKind`]. Damage and
//! healing happen only in [`tick_statuses`]; the combat modifiers (strength,
//! weak, dodge, shield, thorns) are read when an attack resolves.

use crate::StatusRule;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Poison,
    Burn,
    Bleed,
    Regeneration,
    Strength,
    Weak,
    Dazed,
    Dodge,
    Shield,
    Thorns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationMerge {
    Longest,
    Replace,
}

impl StatusKind {
    pub fn deals_damage(self) -> bool {
        matches!(self, StatusKind::Poison | StatusKind::Burn | StatusKind::Bleed)
    }

    pub fn is_debuff(self) -> bool {
        matches!(
            self,
            StatusKind::Poison
                | StatusKind::Burn
                | StatusKind::Bleed
                | StatusKind::Weak
                | StatusKind::Dazed
        )
    }

    /// Consumed whole by the next incoming attack, whatever the stack count.
    pub fn is_charge(self) -> bool {
        matches!(self, StatusKind::Dodge | StatusKind::Shield)
    }

    pub fn duration_merge(self) -> DurationMerge {
        match self {
            StatusKind::Weak | StatusKind::Dazed => DurationMerge::Replace,
            _ => DurationMerge::Longest,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusInstance {
    #[serde(rename = "type")]
    pub kind: StatusKind,
    pub stacks: u32,
    pub duration: u32,
}

impl StatusInstance {
    pub fn new(kind: StatusKind, stacks: u32, duration: u32) -> Self {
        Self {
            kind,
            stacks,
            duration,
        }
    }

    pub fn is_live(&self) -> bool {
        self.stacks > 0 && self.duration > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub statuses: Vec<StatusInstance>,
    pub total_damage: u32,
    pub total_healing: u32,
}

pub fn apply_status(existing: &[StatusInstance], incoming: StatusInstance) -> Vec<StatusInstance> {
    let mut next = existing.to_vec();
    if !incoming.is_live() {
        return next;
    }
    match next.iter_mut().find(|status| status.kind == incoming.kind) {
        Some(current) => {
            current.stacks = current.stacks.saturating_add(incoming.stacks);
            current.duration = match incoming.kind.duration_merge() {
                DurationMerge::Longest => current.duration.max(incoming.duration),
                DurationMerge::Replace => incoming.duration,
            };
        }
        None => next.push(incoming),
    }
    next
}

/// Start-of-turn resolution for one holder.
pub fn tick_statuses(existing: &[StatusInstance], rule: &StatusRule) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    for status in existing {
        outcome.total_damage = outcome
            .total_damage
            .saturating_add(status.stacks.saturating_mul(rule.per_stack_damage(status.kind)));
        outcome.total_healing = outcome
            .total_healing
            .saturating_add(status.stacks.saturating_mul(rule.per_stack_heal(status.kind)));
        let duration = status.duration.saturating_sub(1);
        if duration > 0 {
            outcome.statuses.push(StatusInstance {
                duration,
                ..*status
            });
        }
    }
    outcome
}

pub fn clear_status(existing: &[StatusInstance], kind: StatusKind) -> Vec<StatusInstance> {
    existing
        .iter()
        .filter(|status| status.kind != kind)
        .copied()
        .collect()
}

pub fn clear_debuffs(existing: &[StatusInstance]) -> Vec<StatusInstance> {
    existing
        .iter()
        .filter(|status| !status.kind.is_debuff())
        .copied()
        .collect()
}

pub fn stacks_of(existing: &[StatusInstance], kind: StatusKind) -> u32 {
    existing
        .iter()
        .find(|status| status.kind == kind)
        .map(|status| status.stacks)
        .unwrap_or(0)
}

pub fn has_status(existing: &[StatusInstance], kind: StatusKind) -> bool {
    existing.iter().any(|status| status.kind == kind)
}

fn take_charge(existing: &mut Vec<StatusInstance>, kind: StatusKind) -> Option<StatusInstance> {
    let idx = existing.iter().position(|status| status.kind == kind)?;
    Some(existing.remove(idx))
}

/// Attack damage after the attacker's strength and weak.
pub fn outgoing_damage(base: u32, attacker: &[StatusInstance], rule: &StatusRule) -> u32 {
    let boosted = base.saturating_add(stacks_of(attacker, StatusKind::Strength));
    if has_status(attacker, StatusKind::Weak) {
        let reduced = u64::from(boosted) * u64::from(100u32.saturating_sub(rule.weak_percent)) / 100;
        return reduced as u32;
    }
    boosted
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitOutcome {
    /// Damage left after dodge and shield; block and health come next.
    pub damage: u32,
    pub dodged: bool,
    pub absorbed: u32,
    /// Damage reflected back at the attacker.
    pub thorns: u32,
}

/// Resolves an incoming attack against the defender's charges and thorns.
pub fn resolve_hit(amount: u32, defender: &mut Vec<StatusInstance>, rule: &StatusRule) -> HitOutcome {
    if take_charge(defender, StatusKind::Dodge).is_some() {
        return HitOutcome {
            damage: 0,
            dodged: true,
            absorbed: 0,
            thorns: 0,
        };
    }
    let mut outcome = HitOutcome {
        damage: amount,
        ..HitOutcome::default()
    };
    if amount > 0 {
        if let Some(shield) = take_charge(defender, StatusKind::Shield) {
            let capacity = shield.stacks.saturating_mul(rule.shield_absorb);
            outcome.absorbed = capacity.min(amount);
            outcome.damage = amount - outcome.absorbed;
        }
    }
    outcome.thorns = stacks_of(defender, StatusKind::Thorns);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bleed(stacks: u32, duration: u32) -> StatusInstance {
        StatusInstance::new(StatusKind::Bleed, stacks, duration)
    }

    #[test]
    fn duplicate_bleed_merges_into_one_instance() {
        let statuses = apply_status(&[], bleed(2, 3));
        let statuses = apply_status(&statuses, bleed(1, 1));
        assert_eq!(statuses, vec![bleed(3, 3)]);

        let rule = StatusRule::default();
        let tick = tick_statuses(&statuses, &rule);
        assert_eq!(tick.total_damage, 3 * rule.bleed_damage);
        assert_eq!(tick.statuses, vec![bleed(3, 2)]);
    }

    #[test]
    fn zero_stacks_or_duration_is_ignored() {
        assert!(apply_status(&[], bleed(0, 3)).is_empty());
        assert!(apply_status(&[], bleed(2, 0)).is_empty());
    }

    #[test]
    fn weak_duration_is_replaced_not_extended() {
        let weak = |duration| StatusInstance::new(StatusKind::Weak, 1, duration);
        let statuses = apply_status(&[weak(4)], weak(2));
        assert_eq!(statuses, vec![StatusInstance::new(StatusKind::Weak, 2, 2)]);
    }

    #[test]
    fn tick_expires_and_heals() {
        let rule = StatusRule::default();
        let statuses = vec![
            StatusInstance::new(StatusKind::Poison, 4, 1),
            StatusInstance::new(StatusKind::Regeneration, 2, 2),
            StatusInstance::new(StatusKind::Strength, 3, 1),
        ];
        let tick = tick_statuses(&statuses, &rule);
        assert_eq!(tick.total_damage, 4 * rule.poison_damage);
        assert_eq!(tick.total_healing, 2 * rule.regeneration_heal);
        assert_eq!(
            tick.statuses,
            vec![StatusInstance::new(StatusKind::Regeneration, 2, 1)]
        );
    }

    #[test]
    fn dodge_consumes_whole_instance() {
        let rule = StatusRule::default();
        let mut defender = vec![StatusInstance::new(StatusKind::Dodge, 3, 5)];
        let hit = resolve_hit(12, &mut defender, &rule);
        assert!(hit.dodged);
        assert_eq!(hit.damage, 0);
        assert!(defender.is_empty());
    }

    #[test]
    fn shield_absorbs_by_stacks_then_disappears() {
        let rule = StatusRule::default();
        let mut defender = vec![
            StatusInstance::new(StatusKind::Shield, 2, 3),
            StatusInstance::new(StatusKind::Thorns, 2, 3),
        ];
        let hit = resolve_hit(15, &mut defender, &rule);
        assert_eq!(hit.absorbed, 2 * rule.shield_absorb);
        assert_eq!(hit.damage, 15 - 2 * rule.shield_absorb);
        assert_eq!(hit.thorns, 2);
        assert!(!has_status(&defender, StatusKind::Shield));
        assert!(has_status(&defender, StatusKind::Thorns));
    }

    #[test]
    fn strength_then_weak_modify_outgoing_damage() {
        let rule = StatusRule::default();
        let attacker = vec![
            StatusInstance::new(StatusKind::Strength, 2, 3),
            StatusInstance::new(StatusKind::Weak, 1, 2),
        ];
        assert_eq!(outgoing_damage(6, &attacker, &rule), 6);
        assert_eq!(outgoing_damage(6, &attacker[..1], &rule), 8);
    }

    #[test]
    fn cleanse_keeps_buffs() {
        let statuses = vec![
            StatusInstance::new(StatusKind::Burn, 1, 2),
            StatusInstance::new(StatusKind::Thorns, 1, 2),
        ];
        assert_eq!(
            clear_debuffs(&statuses),
            vec![StatusInstance::new(StatusKind::Thorns, 1, 2)]
        );
        assert_eq!(clear_status(&statuses, StatusKind::Thorns).len(), 1);
    }
}
