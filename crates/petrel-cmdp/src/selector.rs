use crate::model::{ActionId, StateId};
use std::fmt;

/// Action used when a selection rule is undefined at every level at or
/// below the queried one.
pub const DEFAULT_ACTION: ActionId = 0;

/// The selection rule of a single state: a map from resource levels
/// `0..=capacity` to actions, with undefined entries.
///
/// A rule set at level `l` also governs every level above `l` until a
/// higher entry overrides it, so lookup walks downward from the queried
/// level to the greatest defined entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRule {
    slots: Vec<Option<ActionId>>,
}

impl SelectionRule {
    /// A rule undefined at every level `0..=capacity`.
    pub fn undefined(capacity: u32) -> Self {
        Self {
            slots: vec![None; capacity as usize + 1],
        }
    }

    /// Number of levels, `capacity + 1`.
    pub fn num_levels(&self) -> usize {
        self.slots.len()
    }

    /// Defines the rule at exactly `level`.
    pub fn set(&mut self, level: u32, action: ActionId) {
        self.slots[level as usize] = Some(action);
    }

    /// The raw entry at exactly `level`, without the downward walk.
    pub fn slot(&self, level: u32) -> Option<ActionId> {
        self.slots[level as usize]
    }

    /// The action governing `level`: the entry at the greatest defined
    /// level `l <= level`, or `None` when every such entry is undefined.
    pub fn action_at(&self, level: u32) -> Option<ActionId> {
        self.slots[..=level as usize]
            .iter()
            .rev()
            .find_map(|slot| *slot)
    }

    /// Like [`SelectionRule::action_at`], falling back to
    /// [`DEFAULT_ACTION`] when the rule is undefined at and below `level`.
    pub fn action_or_default(&self, level: u32) -> ActionId {
        self.action_at(level).unwrap_or(DEFAULT_ACTION)
    }

    pub fn is_fully_undefined(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// A counter selector: one selection rule per state.
///
/// Produced by the SafePR solver and read-only afterwards; the product
/// builder resolves the action for each `(state, level)` pair through
/// the rules' downward lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSelector {
    rules: Vec<SelectionRule>,
    capacity: u32,
}

impl CounterSelector {
    /// A selector with every rule undefined.
    pub fn new(num_states: usize, capacity: u32) -> Self {
        Self {
            rules: vec![SelectionRule::undefined(capacity); num_states],
            capacity,
        }
    }

    pub fn num_states(&self) -> usize {
        self.rules.len()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn rule(&self, state: StateId) -> &SelectionRule {
        &self.rules[state]
    }

    /// Defines the rule of `state` at exactly `level`.
    pub fn set(&mut self, state: StateId, level: u32, action: ActionId) {
        self.rules[state].set(level, action);
    }

    pub fn rules(&self) -> impl Iterator<Item = &SelectionRule> {
        self.rules.iter()
    }
}

/// The selector table: rows are states, columns are resource levels, and
/// cells hold the selected action or `-` for undefined entries.
impl fmt::Display for CounterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |x: usize| x.max(1).to_string().len();
        let state_width = digits(self.num_states().saturating_sub(1));
        let max_action = self
            .rules
            .iter()
            .flat_map(|rule| rule.slots.iter().flatten())
            .max()
            .copied()
            .unwrap_or(0);
        let cell_width = digits(self.capacity as usize).max(digits(max_action));

        let fill = " ".repeat(state_width);
        writeln!(f, "{fill} resource levels:")?;
        write!(f, "{fill}")?;
        for level in 0..=self.capacity {
            write!(f, " {level:>cell_width$}")?;
        }
        writeln!(f)?;
        writeln!(f, "{:>state_width$} actions:", "s")?;
        for (s, rule) in self.rules.iter().enumerate() {
            write!(f, "{s:>state_width$}")?;
            for level in 0..=self.capacity {
                match rule.slot(level) {
                    Some(action) => write!(f, " {action:>cell_width$}")?,
                    None => write!(f, " {:>cell_width$}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_down_to_the_greatest_defined_level() {
        let mut rule = SelectionRule::undefined(5);
        rule.set(1, 7);
        rule.set(4, 2);
        assert_eq!(rule.action_at(0), None);
        assert_eq!(rule.action_at(1), Some(7));
        assert_eq!(rule.action_at(3), Some(7));
        assert_eq!(rule.action_at(4), Some(2));
        assert_eq!(rule.action_at(5), Some(2));
    }

    #[test]
    fn lookup_falls_back_to_the_default_action() {
        let rule = SelectionRule::undefined(3);
        assert_eq!(rule.action_at(3), None);
        assert_eq!(rule.action_or_default(3), DEFAULT_ACTION);
        assert!(rule.is_fully_undefined());
    }

    #[test]
    fn slot_does_not_walk() {
        let mut rule = SelectionRule::undefined(4);
        rule.set(2, 1);
        assert_eq!(rule.slot(3), None);
        assert_eq!(rule.slot(2), Some(1));
    }

    #[test]
    fn rules_defined_below_govern_all_higher_levels() {
        let mut rule = SelectionRule::undefined(6);
        rule.set(2, 3);
        for level in 2..=6 {
            assert_eq!(rule.action_at(level), Some(3));
        }
    }

    #[test]
    fn selector_renders_the_level_table() {
        let mut selector = CounterSelector::new(2, 3);
        selector.set(0, 2, 1);
        selector.set(1, 0, 0);
        let rendered = selector.to_string();
        let expected = "\
  resource levels:
  0 1 2 3
s actions:
0 - - 1 -
1 0 - - -
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn selector_table_widens_columns_for_large_capacities() {
        let mut selector = CounterSelector::new(11, 10);
        selector.set(10, 10, 1);
        let rendered = selector.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        // Header row ends at level 10, two characters wide.
        assert!(lines[1].ends_with("10"));
        // State column is wide enough for "10".
        assert!(lines[3].starts_with(" 0"));
        assert!(lines[13].starts_with("10"));
    }
}
