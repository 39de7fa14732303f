//! 内置领域

use super::constants::{headings, labels, prompt};
use super::handler::DomainSpec;
use super::router::HandlerId;
use crate::error::Result;
use crate::state::ContextKind;
use crate::tools;

/// 构建某个路由对应的内置领域；拓扑默认都是执行一轮工具后结束
pub fn builtin(id: HandlerId) -> Result<DomainSpec> {
    let spec = match id {
        HandlerId::ProjectOverview => DomainSpec::new(id, labels::PROJECT, prompt::PROJECT)
            .with_context(ContextKind::Project, headings::PROJECT),
        HandlerId::ResourceOps => DomainSpec::new(id, labels::RESOURCE, prompt::RESOURCE)
            .with_emphasis(prompt::RESOURCE_EMPHASIS)
            .with_context(ContextKind::Resource, headings::RESOURCE)
            .with_tools(tools::resource::registry()?)
            .filter_by_resource_kind(),
        HandlerId::DeploymentProposal => DomainSpec::new(id, labels::PROPOSAL, prompt::PROPOSAL),
        HandlerId::ClusterOps => DomainSpec::new(id, labels::CLUSTER, prompt::CLUSTER)
            .with_context(ContextKind::Cluster, headings::CLUSTER)
            .with_tools(tools::cluster::registry()?),
        HandlerId::EnvironmentOps => DomainSpec::new(id, labels::DEVBOX, prompt::DEVBOX)
            .with_context(ContextKind::Devbox, headings::DEVBOX)
            .with_tools(tools::devbox::registry()?),
        HandlerId::LaunchpadOps => DomainSpec::new(id, labels::LAUNCHPAD, prompt::LAUNCHPAD)
            .with_context(ContextKind::Launchpad, headings::LAUNCHPAD)
            .with_tools(tools::launchpad::registry()?),
    };
    Ok(spec)
}

pub fn builtin_all() -> Result<Vec<DomainSpec>> {
    HandlerId::ALL.into_iter().map(builtin).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Topology;

    #[test]
    fn read_only_domains_bind_no_tools() {
        for id in [HandlerId::ProjectOverview, HandlerId::DeploymentProposal] {
            assert!(builtin(id).unwrap().tools.is_empty());
        }
    }

    #[test]
    fn builtin_domains_terminate_by_default() {
        for spec in builtin_all().unwrap() {
            assert_eq!(spec.topology, Topology::Terminate, "{}", spec.id);
        }
    }

    #[test]
    fn resource_domain_filters_by_kind() {
        let spec = builtin(HandlerId::ResourceOps).unwrap();
        assert!(spec.filter_by_resource_kind);
        assert!(spec.emphasis.is_some());
    }
}
