// Parameter and secret resolution

use std::collections::HashMap;
use std::env;

/// One strategy for resolving a namespaced parameter to a value.
///
/// Resolvers never fail; a parameter that cannot be found is simply absent.
pub trait ParameterResolver: Send + Sync {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String>;
}

/// Resolves parameters from the process environment.
///
/// `("perplexity", "api-key")` maps to `PERPLEXITY_API_KEY`. Empty values
/// count as absent so a blank assignment in a unit file does not shadow the
/// next resolver in the chain.
pub struct EnvResolver;

impl ParameterResolver for EnvResolver {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String> {
        let var = format!("{}_{}", namespace, key)
            .to_uppercase()
            .replace('-', "_");
        env::var(var).ok().filter(|value| !value.is_empty())
    }
}

/// Fixed in-memory parameter values.
#[derive(Default)]
pub struct StaticResolver {
    values: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, namespace: &str, key: &str, value: impl Into<String>) -> Self {
        self.values
            .insert(format!("{}/{}", namespace, key), value.into());
        self
    }
}

impl ParameterResolver for StaticResolver {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String> {
        self.values.get(&format!("{}/{}", namespace, key)).cloned()
    }
}

/// Ordered list of resolvers tried in sequence; the first present value wins.
pub struct ParameterChain {
    resolvers: Vec<Box<dyn ParameterResolver>>,
}

impl ParameterChain {
    pub fn new(resolvers: Vec<Box<dyn ParameterResolver>>) -> Self {
        Self { resolvers }
    }

    pub fn lookup(&self, namespace: &str, key: &str) -> Option<String> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.lookup(namespace, key))
    }
}
