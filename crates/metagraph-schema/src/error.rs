use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

///
/// ErrorTree
///
/// Route-aware batch of validation problems. A single validation pass
/// reports everything it finds; the tree is only turned into an error at
/// the boundary that requires all-or-nothing acceptance.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct ErrorTree {
    entries: BTreeMap<String, Vec<String>>,
}

impl ErrorTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem at the root route.
    pub fn add(&mut self, message: impl Into<String>) {
        self.add_at("", message);
    }

    /// Record a problem at an explicit route (e.g. `Customer.name`).
    pub fn add_at(&mut self, route: impl Into<String>, message: impl Into<String>) {
        self.entries
            .entry(route.into())
            .or_default()
            .push(message.into());
    }

    /// Merge another tree under a route prefix.
    pub fn merge(&mut self, prefix: &str, other: Self) {
        for (route, messages) in other.entries {
            let key = join_route(prefix, &route);
            self.entries.entry(key).or_default().extend(messages);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Iterate `(route, message)` pairs in deterministic route order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(route, messages)| {
            messages
                .iter()
                .map(move |message| (route.as_str(), message.as_str()))
        })
    }

    /// Collapse into `Ok(())` when empty, `Err(self)` otherwise.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn join_route(prefix: &str, route: &str) -> String {
    match (prefix.is_empty(), route.is_empty()) {
        (true, _) => route.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{prefix}.{route}"),
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (route, message) in self.iter() {
            if !first {
                writeln!(f)?;
            }
            if route.is_empty() {
                write!(f, "{message}")?;
            } else {
                write!(f, "{route}: {message}")?;
            }
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorTree {}
