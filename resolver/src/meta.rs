//! Legacy metadata lookups.
//!
//! Metadata values are served by the online option providers; [`Meta`] is
//! kept for callers written against the older metadata API. New code should
//! use [`Options`] directly.

use errors::PermissionError;
use perm_core::{Source, SubjectReducer};

use crate::coercion::Coerced;
use crate::options::Options;

#[derive(Clone)]
pub struct Meta {
    options: Options,
}

impl Meta {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn global() -> Self {
        Self::new(Options::global())
    }

    pub fn value(&self, source: &dyn Source, key: &str) -> Result<Option<String>, PermissionError> {
        self.options.get(source, key)
    }

    pub fn value_or(
        &self,
        source: &dyn Source,
        key: &str,
        default: &str,
    ) -> Result<String, PermissionError> {
        self.options.get_or(source, key, default)
    }

    /// Transforms the resolved value. The transform sees the value, not the
    /// key it was stored under.
    pub fn value_as<T, R, F>(
        &self,
        source: &dyn Source,
        key: &str,
        transform: F,
    ) -> Result<Option<T>, PermissionError>
    where
        F: FnOnce(&str) -> R,
        R: Coerced<T>,
    {
        self.options.get_as(source, key, transform)
    }

    pub fn entity_value<E: ?Sized>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        key: &str,
    ) -> Result<Option<String>, PermissionError> {
        self.options.entity_get(reducer, entity, key)
    }

    pub fn entity_value_or<E: ?Sized>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        key: &str,
        default: &str,
    ) -> Result<String, PermissionError> {
        self.options.entity_get_or(reducer, entity, key, default)
    }

    pub fn entity_value_as<E, T, R, F>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        key: &str,
        transform: F,
    ) -> Result<Option<T>, PermissionError>
    where
        E: ?Sized,
        F: FnOnce(&str) -> R,
        R: Coerced<T>,
    {
        self.options.entity_get_as(reducer, entity, key, transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProviderRegistry;
    use errors::ProviderError;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Player;

    impl Source for Player {
        fn name(&self) -> &str {
            "player"
        }

        fn has_permission_level(&self, _level: u8) -> bool {
            false
        }
    }

    #[test]
    fn test_value_as_transforms_value_not_key() {
        let registry = Arc::new(ProviderRegistry::new());
        registry.add_option_provider(|_: &dyn Source, _: &str| {
            Ok::<_, ProviderError>(Some("12".to_string()))
        });
        let meta = Meta::new(Options::new(registry));

        let value: Option<u32> = meta
            .value_as(&Player, "home-limit", |v| v.parse::<u32>())
            .unwrap();
        assert_eq!(value, Some(12));
        assert_eq!(meta.value_or(&Player, "home-limit", "0").unwrap(), "12");
    }
}
