use crate::features::expenses::models::Expense;
use crate::features::users::models::UserId;
use crate::shared::backend::ErsBackend;
use crate::shared::config::AggregationPolicy;
use crate::shared::errors::AppResult;
use futures::future::{join_all, try_join_all};

/// 部下の経費を集約した承認待ち一覧
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApprovalQueue {
    /// 部下の並び順で連結した経費
    pub expenses: Vec<Expense>,
    /// 取得に失敗した部下（BestEffortのときのみ）
    pub failed_reportees: Vec<UserId>,
}

/// 部下ごとの経費を並行して取得し、部下の並び順で連結する
pub async fn collect_approval_queue(
    backend: &dyn ErsBackend,
    reportees: &[UserId],
    policy: AggregationPolicy,
) -> AppResult<ApprovalQueue> {
    log::info!(
        "承認待ち一覧の取得開始: reportees={}, policy={policy:?}",
        reportees.len()
    );

    let fetches = reportees.iter().map(|id| backend.fetch_user_expenses(id));

    match policy {
        AggregationPolicy::AllOrNothing => {
            let lists = try_join_all(fetches).await?;
            Ok(ApprovalQueue {
                expenses: lists.into_iter().flatten().collect(),
                failed_reportees: Vec::new(),
            })
        }
        AggregationPolicy::BestEffort => {
            let results = join_all(fetches).await;
            let mut queue = ApprovalQueue::default();
            for (reportee, result) in reportees.iter().zip(results) {
                match result {
                    Ok(expenses) => queue.expenses.extend(expenses),
                    Err(e) => {
                        log::warn!("部下の経費取得に失敗: reportee={reportee}, error={e}");
                        queue.failed_reportees.push(reportee.clone());
                    }
                }
            }
            Ok(queue)
        }
    }
}
