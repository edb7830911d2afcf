use crate::id::GroupKey;

/// One civilization and what sets it apart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CivGroup {
    pub civ_id: i64,
    pub name: String,
    /// Effect bundle applied to the civ's tech tree.
    pub tech_tree_bundle: Option<i64>,
    pub team_bonus: Option<i64>,
    /// Techs bound to this civ.
    pub civ_bonuses: Vec<i64>,
    /// Unit lines unlocked by one of the civ's techs.
    pub unique_lines: Vec<GroupKey>,
}

impl CivGroup {
    pub fn new(civ_id: i64) -> Self {
        Self {
            civ_id,
            ..Default::default()
        }
    }

    pub fn has_unique_line(&self, key: GroupKey) -> bool {
        self.unique_lines.contains(&key)
    }
}
