// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Entity filtering by type and free-text search

use crate::types::Entity;

/// Type allow-list plus case-insensitive search over name, slug, description and tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityFilter {
    /// Allowed entity types; empty allows every type
    pub types: Vec<String>,
    /// Lowercased search term
    search: Option<String>,
}

impl EntityFilter {
    /// Filter that accepts everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the given types
    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Require the search term; blank terms are ignored
    #[must_use]
    pub fn with_search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_lowercase());
        self
    }

    /// Active search term
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Whether the entity passes the filter
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        if !self.types.is_empty() && !self.types.contains(&entity.entity_type) {
            return false;
        }

        let Some(term) = &self.search else {
            return true;
        };
        let hit = |text: &str| text.to_lowercase().contains(term.as_str());

        hit(&entity.name)
            || hit(&entity.slug)
            || entity.description.as_deref().is_some_and(hit)
            || entity.tags.iter().any(|t| hit(t))
    }

    /// Entities that pass the filter, in input order
    pub fn apply<'a>(&'a self, entities: &'a [Entity]) -> impl Iterator<Item = &'a Entity> + 'a {
        entities.iter().filter(move |e| self.matches(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities() -> Vec<Entity> {
        let mut acala = Entity::new("acala", "Acala", "parachain");
        acala.description = Some("DeFi hub of Polkadot".into());
        let mut nova = Entity::new("nova-wallet", "Nova Wallet", "wallet");
        nova.tags = vec!["mobile".into()];
        vec![acala, nova, Entity::new("moonbeam", "Moonbeam", "parachain")]
    }

    fn slugs<'a>(filter: &'a EntityFilter, entities: &'a [Entity]) -> Vec<&'a str> {
        filter.apply(entities).map(|e| e.slug.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_accepts_all() {
        let all = entities();
        assert_eq!(slugs(&EntityFilter::new(), &all).len(), 3);
        assert_eq!(slugs(&EntityFilter::new().with_search("   "), &all).len(), 3);
    }

    #[test]
    fn test_type_allow_list() {
        let all = entities();
        let filter = EntityFilter::new().with_types(["parachain"]);
        assert_eq!(slugs(&filter, &all), vec!["acala", "moonbeam"]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let all = entities();
        assert_eq!(slugs(&EntityFilter::new().with_search("DEFI"), &all), vec!["acala"]);
        assert_eq!(slugs(&EntityFilter::new().with_search("Mobile"), &all), vec!["nova-wallet"]);
        assert_eq!(slugs(&EntityFilter::new().with_search("nova-"), &all), vec!["nova-wallet"]);
    }

    #[test]
    fn test_types_and_search_combine() {
        let all = entities();
        let filter = EntityFilter::new().with_types(["wallet"]).with_search("moon");
        assert!(slugs(&filter, &all).is_empty());
    }
}
