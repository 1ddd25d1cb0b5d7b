//! Boot registry: values registered outside the per-request scope.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;

use super::store::ParamValue;

/// Receives values from parameters defined with
/// [`Param::add_to_boot`](super::Param::add_to_boot).
///
/// Failures inside an implementation are its own concern; the parameter
/// middleware does not observe them.
pub trait BootRegistry: Send + Sync {
    fn add_to_boot(&self, alias: &str, value: ParamValue);
}

/// In-memory boot registry. The router installs one by default.
#[derive(Debug, Default)]
pub struct Boot {
    values: RwLock<HashMap<String, ParamValue>>,
}

impl Boot {
    pub fn get(&self, alias: &str) -> Option<ParamValue> {
        self.values.read().get(alias).cloned()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.values.read().contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl BootRegistry for Boot {
    fn add_to_boot(&self, alias: &str, value: ParamValue) {
        trace!(alias, "boot value registered");
        self.values.write().insert(alias.to_owned(), value);
    }
}
