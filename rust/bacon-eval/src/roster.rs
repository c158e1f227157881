//! Named, ordered policy collection used by tournaments and the CLI.

use rustc_hash::FxHashMap;

use bacon_core::{default_policy, ConstantPolicy, GameRules, Policy, RandomPolicy, SwapPolicy};

use crate::EvalError;

pub fn builtin_names(rules: &GameRules) -> Vec<String> {
    let mut names: Vec<String> = (0..=rules.max_rolls).map(|n| format!("always{n}")).collect();
    names.extend(["random", "swap", "default"].map(String::from));
    names
}

/// Look up one builtin by name. `alwaysN` is only valid for `N <= max_rolls`.
pub fn builtin_policy(rules: &GameRules, seed: u64, name: &str) -> Option<Box<dyn Policy>> {
    match name {
        "random" => Some(Box::new(RandomPolicy::new(rules.max_rolls, seed))),
        "swap" => Some(Box::new(SwapPolicy::with_defaults(*rules))),
        "default" => Some(Box::new(ConstantPolicy(
            default_policy().0.min(rules.max_rolls),
        ))),
        _ => {
            let n: u32 = name.strip_prefix("always")?.parse().ok()?;
            if n > rules.max_rolls {
                return None;
            }
            Some(Box::new(ConstantPolicy(n)))
        }
    }
}

#[derive(Default)]
pub struct Roster {
    entries: Vec<(String, Box<dyn Policy>)>,
    by_name: FxHashMap<String, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// `always0..=alwaysN`, `random`, `swap` and `default` (always four).
    pub fn builtin(rules: &GameRules, seed: u64) -> Self {
        let mut r = Self::new();
        for name in builtin_names(rules) {
            if let Some(policy) = builtin_policy(rules, seed, &name) {
                r.push_unique(name, policy);
            }
        }
        r
    }

    fn push_unique(&mut self, name: String, policy: Box<dyn Policy>) {
        self.by_name.insert(name.clone(), self.entries.len());
        self.entries.push((name, policy));
    }

    pub fn add(
        &mut self,
        name: impl Into<String>,
        policy: Box<dyn Policy>,
    ) -> Result<(), EvalError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(EvalError::DuplicateName(name));
        }
        self.push_unique(name, policy);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.entries[idx].0
    }

    pub fn policy(&self, idx: usize) -> &dyn Policy {
        self.entries[idx].1.as_ref()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Policy> {
        self.position(name).map(|i| self.policy(i))
    }

    /// Keep only the named entries, in the given order.
    pub fn select(mut self, names: &[&str]) -> Result<Self, EvalError> {
        let mut slots: Vec<Option<(String, Box<dyn Policy>)>> =
            self.entries.drain(..).map(Some).collect();
        let mut out = Self::new();
        for &name in names {
            let idx = self
                .by_name
                .get(name)
                .copied()
                .ok_or_else(|| EvalError::UnknownPolicy(name.to_string()))?;
            let (name, policy) = slots[idx]
                .take()
                .ok_or_else(|| EvalError::DuplicateName(name.to_string()))?;
            out.push_unique(name, policy);
        }
        Ok(out)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}
