use std::collections::HashMap;
use tracing::{debug, warn};

use crate::entities::UserLabel;
use crate::error::Result;
use crate::source::TrackerSource;
use crate::taxonomy::GroupTaxonomy;

/// ユーザーの所属グループを取得して分類ラベルに変換する
pub async fn resolve_user_labels(
    source: &dyn TrackerSource,
    taxonomy: &GroupTaxonomy,
    user_id: &str,
) -> Result<UserLabel> {
    let user = source.get_user_groups(user_id).await?;
    Ok(taxonomy.label(user_id, &user.group_names()))
}

/// 1回の実行の間だけ保持するユーザーラベルのキャッシュ
///
/// 同じユーザーIDに対する取得は実行中に高々1回。取得に失敗したユーザーは
/// 空のラベルとして記録し、再取得しない。
#[derive(Debug, Default)]
pub struct UserLabelCache {
    entries: HashMap<String, UserLabel>,
    lookups: usize,
    failures: usize,
}

impl UserLabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未解決のユーザーなら取得し、解決済みならキャッシュを返す
    pub async fn resolve(
        &mut self,
        source: &dyn TrackerSource,
        taxonomy: &GroupTaxonomy,
        user_id: &str,
    ) -> &UserLabel {
        if !self.entries.contains_key(user_id) {
            self.lookups += 1;
            let label = match resolve_user_labels(source, taxonomy, user_id).await {
                Ok(label) => {
                    debug!(user = %user_id, labels = label.labels.len(), "resolved user labels");
                    label
                }
                Err(err) => {
                    warn!(user = %user_id, error = %err, "user lookup failed, leaving labels empty");
                    self.failures += 1;
                    UserLabel::empty(user_id)
                }
            };
            self.entries.insert(user_id.to_string(), label);
        }

        &self.entries[user_id]
    }

    pub fn get(&self, user_id: &str) -> Option<&UserLabel> {
        self.entries.get(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ソースへの問い合わせ回数
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}
