//! Boilerplate shared by every rule type.

/// Declares a rule struct holding its configuration and implements
/// [`lintel_core::Rule`] and [`lintel_core::ConfigurableRule`] for it.
///
/// The visitor type must provide `new(&Configuration, &LintFile) -> Self`.
macro_rules! syntax_rule {
    (
        $(#[$meta:meta])*
        $name:ident {
            configuration: $config:ty,
            visitor: $visitor:ident,
            description: $description:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            configuration: $config,
        }

        impl lintel_core::ConfigurableRule for $name {
            type Configuration = $config;
            const DESCRIPTION: &'static lintel_core::RuleDescription = $description;

            fn with_configuration(configuration: Self::Configuration) -> Self {
                Self { configuration }
            }

            fn configuration(&self) -> &Self::Configuration {
                &self.configuration
            }
        }

        impl lintel_core::Rule for $name {
            fn description(&self) -> &'static lintel_core::RuleDescription {
                <Self as lintel_core::ConfigurableRule>::DESCRIPTION
            }

            fn severity(&self) -> lintel_core::Severity {
                lintel_core::RuleConfiguration::severity(&self.configuration)
            }

            fn make_visitor<'a>(
                &'a self,
                file: &'a lintel_core::LintFile,
            ) -> Box<dyn lintel_core::RuleVisitor + 'a> {
                Box::new($visitor::new(&self.configuration, file))
            }
        }
    };
}
