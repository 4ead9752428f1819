use crate::data::{EndpointTemplate, MirrorPolicy};

/// One planned request: which round, which rank, which endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attempt<'a> {
    pub round: u32,
    pub rank: usize,
    pub endpoint: &'a EndpointTemplate,
}

/// Every request the policy allows, in the order they are tried.
///
/// Each round walks the full endpoint list in rank order before the next
/// round starts.
pub fn schedule(policy: &MirrorPolicy) -> impl Iterator<Item = Attempt<'_>> + '_ {
    (0..policy.max_rounds()).flat_map(move |round| {
        policy
            .endpoints()
            .iter()
            .enumerate()
            .map(move |(rank, endpoint)| Attempt {
                round,
                rank,
                endpoint,
            })
    })
}
