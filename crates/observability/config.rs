use std::env;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    /// Filter used when RUST_LOG is unset or unparsable.
    pub(crate) default_filter: String,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(component: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let component = component.trim().to_string();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let service_name = non_empty("SERVICE_NAME").unwrap_or_else(|| component.clone());
        let environment = non_empty("STAGE").unwrap_or_else(|| "unknown".to_string());
        let default_filter = non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            default_filter,
        }
    }
}
