use std::collections::HashSet;

use ratebot_core::config::AdminConfig;

/// Allow-list gate for privileged commands. Earlier deployments gated by
/// group, later ones by user id; both are honored, either grants access.
#[derive(Clone, Debug, Default)]
pub struct AdminPolicy {
    user_ids: HashSet<String>,
    group_ids: HashSet<String>,
}

impl AdminPolicy {
    pub fn new(
        user_ids: impl IntoIterator<Item = String>,
        group_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            user_ids: user_ids.into_iter().collect(),
            group_ids: group_ids.into_iter().collect(),
        }
    }

    pub fn permits(&self, user_id: &str, group_id: Option<&str>) -> bool {
        if self.user_ids.contains(user_id) {
            return true;
        }
        group_id.is_some_and(|group| self.group_ids.contains(group))
    }
}

impl From<&AdminConfig> for AdminPolicy {
    fn from(config: &AdminConfig) -> Self {
        Self::new(config.user_ids.iter().cloned(), config.group_ids.iter().cloned())
    }
}
