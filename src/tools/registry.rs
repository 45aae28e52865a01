use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;

use crate::core::tool::Tool;
use crate::infra::config::Config;
use crate::tools::BUILTIN_TOOLS;
use crate::tools::context::ToolContext;

/// Name -> instance. `None` marks a name that is reserved but not instantiated.
pub type ToolMap = BTreeMap<String, Option<Arc<dyn Tool>>>;

type Listing = Box<dyn Fn() -> Vec<Arc<dyn Tool>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tools have not been loaded yet; call load_tools() first")]
    NotLoaded,

    #[error("two tools are registered under the name \"{0}\"")]
    DuplicateTool(String),

    #[error("tool \"{name}\" cannot be registered: {reason}")]
    InvalidTool { name: String, reason: String },
}

/// Builds the tool map once. Concurrent `load_tools` callers share the same
/// in-flight discovery and its outcome, failures included; `get_tools_sync`
/// is the lock-free read afterwards.
pub struct ToolRegistry {
    listing: Listing,
    disabled: BTreeSet<String>,
    tools: OnceCell<Result<ToolMap, RegistryError>>,
}

impl ToolRegistry {
    /// Registry over the compile-time tool table.
    pub fn new(ctx: &ToolContext) -> Self {
        let ctx = ctx.clone();
        Self::with_listing(move || BUILTIN_TOOLS.iter().map(|factory| factory(&ctx)).collect())
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&ToolContext::from_config(cfg)).disable(cfg.disabled_tools.iter().cloned())
    }

    pub fn with_listing<F>(listing: F) -> Self
    where
        F: Fn() -> Vec<Arc<dyn Tool>> + Send + Sync + 'static,
    {
        Self { listing: Box::new(listing), disabled: BTreeSet::new(), tools: OnceCell::new() }
    }

    pub fn disable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled.extend(names.into_iter().map(Into::into));
        self
    }

    pub async fn load_tools(&self) -> Result<(), RegistryError> {
        match self.tools.get_or_init(|| async { self.discover() }).await {
            Ok(_) => Ok(()),
            Err(e) => Err(e.clone()),
        }
    }

    pub fn get_tools_sync(&self) -> Result<&ToolMap, RegistryError> {
        match self.tools.get() {
            Some(Ok(map)) => Ok(map),
            Some(Err(e)) => Err(e.clone()),
            None => Err(RegistryError::NotLoaded),
        }
    }

    fn discover(&self) -> Result<ToolMap, RegistryError> {
        let mut map = ToolMap::new();
        for tool in (self.listing)() {
            let name = tool.name();
            check(tool.as_ref())?;
            if map.contains_key(name) {
                return Err(RegistryError::DuplicateTool(name.to_string()));
            }
            let slot = if self.disabled.contains(name) {
                tracing::info!(tool = name, "tool disabled by configuration");
                None
            } else {
                Some(tool)
            };
            map.insert(name.to_string(), slot);
        }
        for name in self.disabled.iter().filter(|n| !map.contains_key(n.as_str())) {
            tracing::warn!(tool = %name, "disabled tool is not registered");
        }
        let active = map.values().filter(|t| t.is_some()).count();
        tracing::info!(registered = map.len(), active, "tools loaded");
        Ok(map)
    }
}

fn check(tool: &dyn Tool) -> Result<(), RegistryError> {
    let name = tool.name();
    let invalid = |reason: String| RegistryError::InvalidTool { name: name.to_string(), reason };
    if name.trim().is_empty() {
        return Err(invalid("name is empty".into()));
    }
    let schema = tool.input_schema();
    let undeclared = schema.undeclared_required();
    if !undeclared.is_empty() {
        return Err(invalid(format!("required fields {undeclared:?} are not declared properties")));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::core::fetch::stub::StubFetch;
    use crate::tools::context::testing as ctx;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn get_before_load_fails() {
        let reg = fakes(&["a"]);
        let err = reg.get_tools_sync().err().unwrap();
        assert_eq!(err, RegistryError::NotLoaded);
        assert!(err.to_string().contains("have not been loaded"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_loads_discover_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let reg = Arc::new(ToolRegistry::with_listing(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(50));
            vec![Arc::new(FakeTool("a")) as Arc<dyn Tool>, Arc::new(FakeTool("b"))]
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = reg.clone();
                tokio::spawn(async move {
                    reg.load_tools().await.unwrap();
                    reg.get_tools_sync().unwrap().len()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.await.unwrap(), 2);
        }
        reg.load_tools().await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_listing_loads_an_empty_map() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let reg = ToolRegistry::with_listing(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        });
        let (a, b) = tokio::join!(reg.load_tools(), reg.load_tools());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(reg.get_tools_sync().unwrap().len(), 0);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_names_fail_loading() {
        let reg = fakes(&["a", "b", "a"]);
        assert_eq!(reg.load_tools().await, Err(RegistryError::DuplicateTool("a".into())));
        assert_eq!(reg.get_tools_sync().err().unwrap(), RegistryError::DuplicateTool("a".into()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failing_loads_discover_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let reg = Arc::new(ToolRegistry::with_listing(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(50));
            vec![Arc::new(FakeTool("a")) as Arc<dyn Tool>, Arc::new(FakeTool("a"))]
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = reg.clone();
                tokio::spawn(async move { reg.load_tools().await })
            })
            .collect();
        for h in handles {
            assert_eq!(h.await.unwrap(), Err(RegistryError::DuplicateTool("a".into())));
        }
        assert_eq!(reg.load_tools().await, Err(RegistryError::DuplicateTool("a".into())));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let reg = fakes(&[" "]);
        assert!(matches!(reg.load_tools().await, Err(RegistryError::InvalidTool { .. })));
    }

    #[tokio::test]
    async fn disabled_tools_keep_an_empty_slot() {
        let reg = fakes(&["a", "b"]).disable(["b", "ghost"]);
        reg.load_tools().await.unwrap();
        let map = reg.get_tools_sync().unwrap();
        assert!(map["a"].is_some());
        assert!(map["b"].is_none());
        assert!(!map.contains_key("ghost"));
    }

    #[tokio::test]
    async fn builtin_table_registers_every_weather_tool() {
        let reg = ToolRegistry::new(&ctx::stub_context(Arc::new(StubFetch::default()), ctx::identity()));
        reg.load_tools().await.unwrap();
        let names: Vec<&str> = reg.get_tools_sync().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "get_current_conditions",
                "get_daily_forecast",
                "get_grid_point",
                "get_hourly_forecast",
                "zip_to_coordinates",
            ]
        );
    }
}
