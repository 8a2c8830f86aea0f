//! Fallback rules: target name -> ordered alternates

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Mapping from a target name to the targets tried after it, in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FallbackChains(BTreeMap<String, Vec<String>>);

impl FallbackChains {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the fallbacks of `primary`
    pub fn with_rule<I, S>(mut self, primary: impl Into<String>, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(primary.into(), fallbacks.into_iter().map(Into::into).collect());
        self
    }

    /// Configured fallbacks of `name`, empty when it has none
    pub fn fallbacks_for(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Find a rule path that leads back to where it started
    ///
    /// Returns the cycle as a list of names whose first and last entries match.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            chains: &'a FallbackChains,
            name: &'a str,
            marks: &mut HashMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            match marks.get(name) {
                Some(Mark::Done) => return None,
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|n| *n == name).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|n| n.to_string()).collect();
                    cycle.push(name.to_string());
                    return Some(cycle);
                }
                None => {}
            }

            marks.insert(name, Mark::Visiting);
            path.push(name);
            for next in chains.fallbacks_for(name) {
                if let Some(cycle) = visit(chains, next, marks, path) {
                    return Some(cycle);
                }
            }
            path.pop();
            marks.insert(name, Mark::Done);
            None
        }

        let mut marks = HashMap::new();
        let mut path = Vec::new();
        for primary in self.0.keys() {
            if let Some(cycle) = visit(self, primary, &mut marks, &mut path) {
                return Some(cycle);
            }
        }
        None
    }
}

impl<K, V, S> FromIterator<(K, V)> for FallbackChains
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |chains, (primary, fallbacks)| {
                chains.with_rule(primary, fallbacks)
            })
    }
}
