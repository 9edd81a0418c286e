//! The explicit set of known rules.

use crate::description::RuleDescription;
use crate::error::ConfigurationError;
use crate::rule::{ConfigurableRule, RuleBox};

/// Constructs a rule from its configuration payload.
pub type RuleFactory = fn(&toml::Table) -> Result<RuleBox, ConfigurationError>;

/// A registered rule: its metadata plus a constructor.
#[derive(Clone, Copy)]
pub struct RuleDescriptor {
    /// Static metadata.
    pub description: &'static RuleDescription,
    /// Builds a configured instance.
    pub factory: RuleFactory,
}

impl RuleDescriptor {
    /// The descriptor of `R`.
    #[must_use]
    pub fn of<R: ConfigurableRule>() -> Self {
        Self {
            description: R::DESCRIPTION,
            factory: |payload| R::from_payload(payload).map(|rule| Box::new(rule) as RuleBox),
        }
    }

    /// Builds the rule from `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the payload does not bind.
    pub fn instantiate(&self, payload: &toml::Table) -> Result<RuleBox, ConfigurationError> {
        (self.factory)(payload)
    }
}

impl std::fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("identifier", &self.description.identifier)
            .finish_non_exhaustive()
    }
}

/// Known rules in registration order.
///
/// Built once at startup and passed by reference to whatever needs it.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<RuleDescriptor>,
}

impl RuleRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `R`.
    #[must_use]
    pub fn with<R: ConfigurableRule>(mut self) -> Self {
        self.register(RuleDescriptor::of::<R>());
        self
    }

    /// Registers a descriptor. A second rule claiming an existing identifier
    /// or alias is ignored.
    pub fn register(&mut self, descriptor: RuleDescriptor) {
        let clash = descriptor
            .description
            .all_identifiers()
            .into_iter()
            .find(|id| self.get(id).is_some());
        if let Some(id) = clash {
            tracing::warn!(rule = id, "duplicate rule identifier, keeping the first registration");
            return;
        }
        self.rules.push(descriptor);
    }

    /// Looks up a rule by identifier or deprecated alias.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|r| r.description.answers_to(id))
    }

    /// All descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.rules.iter()
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::SeverityConfiguration;
    use crate::context::LintFile;
    use crate::description::RuleKind;
    use crate::error::RuleExecutionError;
    use crate::rule::{Rule, RuleVisitor};
    use crate::types::{ReasonedViolation, Severity};
    use crate::visitor::SyntaxVisitor;

    struct Silent;

    impl SyntaxVisitor for Silent {}

    impl RuleVisitor for Silent {
        fn finish(self: Box<Self>) -> Result<Vec<ReasonedViolation>, RuleExecutionError> {
            Ok(Vec::new())
        }
    }

    macro_rules! silent_rule {
        ($name:ident, $id:literal, $aliases:expr) => {
            struct $name(SeverityConfiguration);

            impl Rule for $name {
                fn description(&self) -> &'static RuleDescription {
                    Self::DESCRIPTION
                }
                fn severity(&self) -> Severity {
                    self.0.severity
                }
                fn make_visitor<'a>(&'a self, _file: &'a LintFile) -> Box<dyn RuleVisitor + 'a> {
                    Box::new(Silent)
                }
            }

            impl ConfigurableRule for $name {
                type Configuration = SeverityConfiguration;
                const DESCRIPTION: &'static RuleDescription = &RuleDescription {
                    deprecated_aliases: $aliases,
                    ..RuleDescription::new($id, $id, $id, RuleKind::Style)
                };
                fn with_configuration(configuration: Self::Configuration) -> Self {
                    Self(configuration)
                }
                fn configuration(&self) -> &Self::Configuration {
                    &self.0
                }
            }
        };
    }

    silent_rule!(First, "first", &["old_first"]);
    silent_rule!(Second, "second", &[]);
    silent_rule!(Impostor, "old_first", &[]);

    #[test]
    fn lookup_by_identifier_and_alias() {
        let registry = RuleRegistry::new().with::<First>().with::<Second>();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("old_first").map(|d| d.description.identifier),
            Some("first")
        );
        assert!(registry.get("third").is_none());
    }

    #[test]
    fn duplicates_keep_the_first_registration() {
        let registry = RuleRegistry::new().with::<First>().with::<Impostor>();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn factory_binds_payload() {
        let registry = RuleRegistry::new().with::<First>();
        let payload: toml::Table = "severity = \"error\"".parse().unwrap();
        let rule = registry.get("first").unwrap().instantiate(&payload).unwrap();
        assert_eq!(rule.severity(), Severity::Error);
        let bad: toml::Table = "unknown = 1".parse().unwrap();
        assert!(registry.get("first").unwrap().instantiate(&bad).is_err());
    }
}
