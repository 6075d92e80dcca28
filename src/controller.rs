//! Binds one resolved model to a view for the lifetime of its scope.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{Decode, Model, Models, RuleDetail, RuleDetailDecoder};
use crate::scope::Scope;
use crate::types::DashboardError;

/// Route template of the rule page.
pub const RULE_ROUTE: &str = "/rules/rule/:appId";

/// Keeps a view's copy of a resource current until its scope is destroyed.
pub struct ResourceController<T> {
    view: watch::Receiver<T>,
    task: JoinHandle<()>,
}

pub type RuleController = ResourceController<RuleDetail>;

impl<T> ResourceController<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Publish `model`'s current data and follow its changes within `scope`.
    pub fn activate<D>(model: Model<D>, scope: &Scope) -> Self
    where
        D: Decode<Output = T>,
    {
        let (tx, view) = watch::channel(model.data());
        let mut subscription = model.subscribe(scope);

        let task = tokio::spawn(async move {
            while let Some(data) = subscription.next_data().await {
                if tx.is_closed() {
                    break;
                }
                tx.send_if_modified(|current| {
                    if *current == data {
                        return false;
                    }
                    *current = data;
                    true
                });
            }
            debug!(path = %subscription.path(), "View released");
        });

        Self { view, task }
    }

    /// Current state of the view.
    pub fn current(&self) -> T {
        self.view.borrow().clone()
    }

    /// Receiver for views that render on every change.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.view.clone()
    }

    /// Wait for the next change. Returns `false` once the scope is gone.
    pub async fn changed(&mut self) -> bool {
        self.view.changed().await.is_ok()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl RuleController {
    /// Resolve the rule before the view activates, then bind it to `scope`.
    pub async fn open(models: &Models, rule_id: i64, scope: &Scope) -> Result<Self, DashboardError> {
        let model = Self::resolve(models, rule_id).await?;
        Ok(Self::activate(model, scope))
    }

    pub async fn resolve(
        models: &Models,
        rule_id: i64,
    ) -> Result<Model<RuleDetailDecoder>, DashboardError> {
        models.rule(rule_id).await
    }

    pub fn rule(&self) -> RuleDetail {
        self.current()
    }
}

impl<T> Drop for ResourceController<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Rule id from a concrete rule route (`/rules/rule/12`).
pub fn rule_id_from_route(path: &str) -> Option<i64> {
    let prefix = RULE_ROUTE.trim_end_matches(":appId");
    let rest = path.trim_start_matches('#').strip_prefix(prefix)?;
    let id = rest.split('/').next()?;
    id.parse().ok()
}
