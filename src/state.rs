use crate::model::{NamespaceScope, ResourceKind, ResourceObject};
use chrono::{DateTime, Local};

/// Data source a surfaced error belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum ErrorSource {
    Catalog,
    Objects,
}

/// Everything the view layer reads. Mutated only through [`CatalogStore`](crate::store::CatalogStore).
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub(crate) resources: Vec<ResourceKind>,
    pub(crate) namespaces: Vec<String>,
    pub(crate) selected: Option<ResourceKind>,
    pub(crate) objects: Vec<ResourceObject>,
    pub(crate) resource_namespaces: Vec<String>,
    pub(crate) scope: NamespaceScope,
    pub(crate) in_flight: usize,
    pub(crate) catalog_error: Option<String>,
    pub(crate) objects_error: Option<String>,
    pub(crate) catalog_refreshed_at: Option<DateTime<Local>>,
    pub(crate) generation: u64,
}

impl CatalogState {
    pub fn resources(&self) -> &[ResourceKind] {
        &self.resources
    }

    /// Catalog ordered by `(group, name)`; entries that tie keep their catalog order.
    pub fn sorted_resources(&self) -> impl Iterator<Item = &ResourceKind> + '_ {
        let mut order = (0..self.resources.len()).collect::<Vec<_>>();
        order.sort_by(|&left, &right| {
            let (left, right) = (&self.resources[left], &self.resources[right]);
            left.group
                .cmp(&right.group)
                .then_with(|| left.name.cmp(&right.name))
        });
        order.into_iter().map(|index| &self.resources[index])
    }

    pub fn find_kind(&self, group: &str, version: &str, name: &str) -> Option<&ResourceKind> {
        self.resources
            .iter()
            .find(|kind| kind.group == group && kind.version == version && kind.name == name)
    }

    /// Resolves `group/version/name`, `version/name` (core group) or a bare name or kind.
    pub fn resolve_kind(&self, token: &str) -> Option<&ResourceKind> {
        self.sorted_resources()
            .find(|kind| kind.matches_token(token))
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn selected(&self) -> Option<&ResourceKind> {
        self.selected.as_ref()
    }

    pub fn objects(&self) -> &[ResourceObject] {
        &self.objects
    }

    pub fn visible_objects(&self, query: &str) -> Vec<&ResourceObject> {
        self.objects
            .iter()
            .filter(|object| object.matches_filter(query))
            .collect()
    }

    pub fn resource_namespaces(&self) -> &[String] {
        &self.resource_namespaces
    }

    pub fn scope(&self) -> &NamespaceScope {
        &self.scope
    }

    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    /// A catalog failure outranks an object failure.
    pub fn error(&self) -> Option<&str> {
        self.catalog_error
            .as_deref()
            .or(self.objects_error.as_deref())
    }

    pub fn catalog_refreshed_at(&self) -> Option<DateTime<Local>> {
        self.catalog_refreshed_at
    }

    /// Incremented on every selection change; fetches carry the value they were issued under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn replace_resources(&mut self, resources: Vec<ResourceKind>) {
        let mut unique: Vec<ResourceKind> = Vec::with_capacity(resources.len());
        for kind in resources {
            if !unique.iter().any(|existing| existing.same_identity(&kind)) {
                unique.push(kind);
            }
        }
        self.resources = unique;
    }

    pub(crate) fn set_error(&mut self, source: ErrorSource, message: String) {
        *self.error_slot(source) = Some(message);
    }

    pub(crate) fn clear_error_from(&mut self, source: ErrorSource) {
        *self.error_slot(source) = None;
    }

    fn error_slot(&mut self, source: ErrorSource) -> &mut Option<String> {
        match source {
            ErrorSource::Catalog => &mut self.catalog_error,
            ErrorSource::Objects => &mut self.objects_error,
        }
    }

    pub(crate) fn begin_blocking(&mut self) {
        self.in_flight += 1;
    }

    pub(crate) fn end_blocking(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogState, ErrorSource};
    use crate::model::{ResourceKind, ResourceObject};
    use serde_json::json;

    fn state_with(resources: Vec<ResourceKind>) -> CatalogState {
        let mut state = CatalogState::default();
        state.replace_resources(resources);
        state
    }

    #[test]
    fn sorted_resources_order_by_group_then_name() {
        let state = state_with(vec![
            ResourceKind::new("apps", "v1", "statefulsets", true),
            ResourceKind::new("", "v1", "pods", true),
            ResourceKind::new("apps", "v1", "deployments", true),
            ResourceKind::new("", "v1", "configmaps", true),
            ResourceKind::new("batch", "v1", "jobs", true),
        ]);

        let order = state
            .sorted_resources()
            .map(|kind| kind.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                "core/v1/configmaps",
                "core/v1/pods",
                "apps/v1/deployments",
                "apps/v1/statefulsets",
                "batch/v1/jobs",
            ]
        );
    }

    #[test]
    fn sorted_resources_keep_catalog_order_on_ties() {
        let state = state_with(vec![
            ResourceKind::new("autoscaling", "v2", "horizontalpodautoscalers", true),
            ResourceKind::new("autoscaling", "v1", "horizontalpodautoscalers", true),
        ]);

        let versions = state
            .sorted_resources()
            .map(|kind| kind.version.as_str())
            .collect::<Vec<_>>();
        assert_eq!(versions, vec!["v2", "v1"]);
    }

    #[test]
    fn sorted_resources_is_repeatable_and_leaves_state_alone() {
        let state = state_with(vec![
            ResourceKind::new("b", "v1", "x", false),
            ResourceKind::new("a", "v1", "y", false),
        ]);
        let first = state.sorted_resources().collect::<Vec<_>>();
        let second = state.sorted_resources().collect::<Vec<_>>();
        assert_eq!(first, second);
        assert_eq!(first[0].group, "a");
        assert_eq!(state.resources()[0].group, "b");
    }

    #[test]
    fn empty_catalog_sorts_to_empty_view() {
        assert!(CatalogState::default().sorted_resources().next().is_none());
    }

    #[test]
    fn duplicate_identities_keep_first_entry() {
        let mut first = ResourceKind::new("apps", "v1", "deployments", true);
        first.kind = "Deployment".to_string();
        let state = state_with(vec![
            first,
            ResourceKind::new("apps", "v1", "deployments", false),
            ResourceKind::new("apps", "v1beta1", "deployments", true),
        ]);
        assert_eq!(state.resources().len(), 2);
        assert_eq!(state.resources()[0].kind, "Deployment");
        assert!(
            state
                .find_kind("apps", "v1beta1", "deployments")
                .is_some()
        );
    }

    #[test]
    fn resolve_kind_prefers_sorted_order_for_bare_names() {
        let state = state_with(vec![
            ResourceKind::new("metrics.k8s.io", "v1beta1", "pods", true),
            ResourceKind::new("", "v1", "pods", true),
        ]);
        assert_eq!(state.resolve_kind("pods").map(|k| k.group.as_str()), Some(""));
        assert_eq!(
            state
                .resolve_kind("metrics.k8s.io/v1beta1/pods")
                .map(|k| k.group.as_str()),
            Some("metrics.k8s.io")
        );
        assert!(state.resolve_kind("widgets").is_none());
    }

    #[test]
    fn errors_clear_only_for_their_source() {
        let mut state = CatalogState::default();
        state.set_error(ErrorSource::Catalog, "catalog down".to_string());
        state.clear_error_from(ErrorSource::Objects);
        assert_eq!(state.error(), Some("catalog down"));
        state.clear_error_from(ErrorSource::Catalog);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn catalog_error_outlives_object_errors() {
        let mut state = CatalogState::default();
        state.set_error(ErrorSource::Catalog, "catalog down".to_string());
        state.set_error(ErrorSource::Objects, "objects down".to_string());
        assert_eq!(state.error(), Some("catalog down"));

        state.clear_error_from(ErrorSource::Objects);
        assert_eq!(state.error(), Some("catalog down"));

        state.set_error(ErrorSource::Objects, "objects down".to_string());
        state.clear_error_from(ErrorSource::Catalog);
        assert_eq!(state.error(), Some("objects down"));
    }

    #[test]
    fn loading_tracks_outstanding_blocking_fetches() {
        let mut state = CatalogState::default();
        state.begin_blocking();
        state.begin_blocking();
        state.end_blocking();
        assert!(state.loading());
        state.end_blocking();
        state.end_blocking();
        assert!(!state.loading());
    }

    #[test]
    fn visible_objects_filter_by_name_and_namespace() {
        let mut state = CatalogState::default();
        state.objects = vec![
            ResourceObject::new(json!({"metadata": {"name": "api", "namespace": "shop"}})),
            ResourceObject::new(json!({"metadata": {"name": "worker", "namespace": "jobs"}})),
        ];
        assert_eq!(state.visible_objects("").len(), 2);
        assert_eq!(state.visible_objects("JOB").len(), 1);
        assert_eq!(state.visible_objects("api")[0].name(), Some("api"));
    }
}
