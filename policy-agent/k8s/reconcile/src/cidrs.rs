use network_policy_agent_core::Direction;
use network_policy_agent_k8s_api::PolicyEndpointSpec;

/// The address ranges a policy permits, by direction.
///
/// Ranges keep the order in which they appear in the policy and are neither deduplicated nor
/// validated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cidrs {
    pub ingress: Vec<String>,
    pub egress: Vec<String>,
}

// === impl Cidrs ===

impl Cidrs {
    pub fn extract(spec: &PolicyEndpointSpec) -> Self {
        let ingress = spec
            .ingress
            .iter()
            .flat_map(|rule| rule.from.iter())
            .map(|ep| ep.cidr.clone())
            .collect();

        let egress = spec
            .egress
            .iter()
            .flat_map(|rule| rule.to.iter())
            .map(|ep| ep.cidr.clone())
            .collect();

        Self { ingress, egress }
    }

    /// A direction is enforced only when the policy opens at least one range for it.
    #[inline]
    pub fn is_active(&self, direction: Direction) -> bool {
        !self.get(direction).is_empty()
    }

    #[inline]
    pub fn get(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Ingress => &self.ingress,
            Direction::Egress => &self.egress,
        }
    }
}
