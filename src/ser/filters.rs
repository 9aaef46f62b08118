/*!
 * Serialization Filters
 * Hooks applied around record field emission
 *
 * All three hooks are pure functions of (owning value, property name,
 * property value). Chains are per-type; later filters see the effect of
 * earlier ones.
 */

use crate::graph::Node;
use std::sync::Arc;

/// Decides whether a named property is emitted at all
pub trait PropertyPreFilter: Send + Sync {
    fn accept(&self, owner: &dyn Node, name: &str) -> bool;
}

/// Substitutes a property's value before writing; `None` keeps the
/// current value
pub trait ValueFilter: Send + Sync {
    fn apply(&self, owner: &dyn Node, name: &str, value: &dyn Node) -> Option<Box<dyn Node>>;
}

/// Rewrites a property's output name; `None` keeps the current name
pub trait NameFilter: Send + Sync {
    fn rename(&self, owner: &dyn Node, name: &str, value: &dyn Node) -> Option<String>;
}

/// One filter of any kind, for registration
pub enum SerializeFilter {
    Pre(Arc<dyn PropertyPreFilter>),
    Value(Arc<dyn ValueFilter>),
    Name(Arc<dyn NameFilter>),
}

/// Per-type filter chain held by the registry
#[derive(Clone, Default)]
pub struct FilterChain {
    pub pre: Vec<Arc<dyn PropertyPreFilter>>,
    pub value: Vec<Arc<dyn ValueFilter>>,
    pub name: Vec<Arc<dyn NameFilter>>,
}

impl FilterChain {
    pub fn push(&mut self, filter: SerializeFilter) {
        match filter {
            SerializeFilter::Pre(f) => self.pre.push(f),
            SerializeFilter::Value(f) => self.value.push(f),
            SerializeFilter::Name(f) => self.name.push(f),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.value.is_empty() && self.name.is_empty()
    }
}

/// Upper-cases the first letter of every property name
pub struct PascalNameFilter;

impl NameFilter for PascalNameFilter {
    fn rename(&self, _owner: &dyn Node, name: &str, _value: &dyn Node) -> Option<String> {
        let mut chars = name.chars();
        let first = chars.next()?;
        if first.is_uppercase() {
            return None;
        }
        Some(first.to_uppercase().collect::<String>() + chars.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_name_filter() {
        let filter = PascalNameFilter;
        let owner = 0i64;
        assert_eq!(
            filter.rename(&owner, "name", &owner),
            Some(String::from("Name"))
        );
        assert_eq!(filter.rename(&owner, "Name", &owner), None);
        assert_eq!(filter.rename(&owner, "", &owner), None);
    }

    #[test]
    fn test_chain_push() {
        let mut chain = FilterChain::default();
        assert!(chain.is_empty());
        chain.push(SerializeFilter::Name(Arc::new(PascalNameFilter)));
        assert!(!chain.is_empty());
        assert_eq!(chain.name.len(), 1);
    }
}
