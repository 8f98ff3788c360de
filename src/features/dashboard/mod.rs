//! 従業員向けダッシュボード
//!
//! 画面のマウント時にデータを取得し、経費一覧・承認待ち一覧・通知一覧を保持する。
//! 変更系の操作はバックエンドの呼び出しが成功した後にだけ一覧へ反映する。
pub mod approval;
pub mod view;

pub use approval::{collect_approval_queue, ApprovalQueue};
pub use view::{card_actions, CardActions, DashboardTab};

use crate::features::auth::session::SessionContext;
use crate::features::expenses::filter::ExpenseFilter;
use crate::features::expenses::form::{ExpenseDraft, ExpenseForm, ReceiptAttachment};
use crate::features::expenses::models::{
    CreateExpenseDto, Expense, ExpenseChanges, ExpenseStatus, UpdateExpenseDto,
};
use crate::features::notifications::models::Notification;
use crate::features::notifications::pagination::{self, NotificationPager};
use crate::features::notifications::template::StatusChangeNotice;
use crate::features::users::models::{ProfileView, User, UserId};
use crate::shared::backend::ErsBackend;
use crate::shared::config::AggregationPolicy;
use crate::shared::errors::{AppError, AppResult, ErrorSeverity};
use crate::shared::reconcile::{reconcile_in_place, Mutation};
use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 従業員・マネージャー向けダッシュボードの状態
pub struct Dashboard {
    backend: Arc<dyn ErsBackend>,
    session: SessionContext,
    user: User,
    policy: AggregationPolicy,
    expenses: Vec<Expense>,
    approval_queue: Vec<Expense>,
    failed_reportees: Vec<UserId>,
    notifications: Vec<Notification>,
    filter: ExpenseFilter,
    tab: DashboardTab,
    pager: NotificationPager,
    pending_delete: Option<i64>,
    last_error: Option<String>,
    cancel: CancellationToken,
}

impl Dashboard {
    /// ログイン中のユーザーでダッシュボードを作成する
    pub fn new(
        backend: Arc<dyn ErsBackend>,
        session: SessionContext,
        policy: AggregationPolicy,
    ) -> AppResult<Self> {
        let user = session
            .current_user()
            .ok_or_else(|| AppError::session("ログインしていません"))?;

        Ok(Self {
            backend,
            session,
            user,
            policy,
            expenses: Vec::new(),
            approval_queue: Vec::new(),
            failed_reportees: Vec::new(),
            notifications: Vec::new(),
            filter: ExpenseFilter::default(),
            tab: DashboardTab::default(),
            pager: NotificationPager::new(),
            pending_delete: None,
            last_error: None,
            cancel: CancellationToken::new(),
        })
    }

    /// マウント時のデータ取得
    ///
    /// 自分の経費・通知・（マネージャーなら）承認待ち一覧を並行して取得する。
    /// 取得中に`unmount`された場合は結果を反映せずに`AppError::Cancelled`を返す。
    pub async fn load(&mut self) -> AppResult<()> {
        let backend = Arc::clone(&self.backend);
        let user = self.user.clone();
        let policy = self.policy;

        let fetches = async {
            let approvals = async {
                if user.is_manager {
                    Some(collect_approval_queue(backend.as_ref(), &user.reportees, policy).await)
                } else {
                    None
                }
            };
            tokio::join!(
                backend.fetch_user_expenses(&user.wissen_id),
                backend.fetch_notifications(&user.wissen_id),
                approvals
            )
        };

        let (expenses, notifications, approvals) = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                info!("ダッシュボードがアンマウントされたため取得結果を破棄します");
                return Err(AppError::Cancelled("dashboard unmounted".to_string()));
            }
            results = fetches => results,
        };

        let mut first_error = None;

        match expenses {
            Ok(expenses) => self.expenses = expenses,
            Err(e) => {
                error!("経費一覧の取得に失敗: {e}");
                self.expenses.clear();
                first_error.get_or_insert(e);
            }
        }

        match notifications {
            Ok(notifications) => {
                self.notifications = notifications;
                self.pager.reset();
            }
            Err(e) => {
                error!("通知一覧の取得に失敗: {e}");
                first_error.get_or_insert(e);
            }
        }

        if let Some(result) = approvals {
            if let Err(e) = self.apply_approval_queue(result) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(self.fail(e)),
            None => {
                info!(
                    "ダッシュボード読み込み完了: expenses={}, approvals={}, notifications={}",
                    self.expenses.len(),
                    self.approval_queue.len(),
                    self.notifications.len()
                );
                Ok(())
            }
        }
    }

    /// 承認待ち一覧を取得し直す
    pub async fn refresh_approval_queue(&mut self) -> AppResult<()> {
        if !self.user.is_manager {
            return Ok(());
        }

        let backend = Arc::clone(&self.backend);
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(AppError::Cancelled("dashboard unmounted".to_string()));
            }
            result = collect_approval_queue(backend.as_ref(), &self.user.reportees, self.policy) => result,
        };

        self.apply_approval_queue(result).map_err(|e| self.fail(e))
    }

    fn apply_approval_queue(&mut self, result: AppResult<ApprovalQueue>) -> AppResult<()> {
        let queue = result.map_err(|e| {
            error!("承認待ち一覧の取得に失敗（一覧は更新しません）: {e}");
            e
        })?;

        self.approval_queue = queue.expenses;
        self.failed_reportees = queue.failed_reportees;

        if self.failed_reportees.is_empty() {
            Ok(())
        } else {
            warn!("一部の部下の経費を取得できませんでした: {:?}", self.failed_reportees);
            Err(AppError::Network(format!(
                "expenses of {} reportee(s) could not be loaded",
                self.failed_reportees.len()
            )))
        }
    }

    /// 経費を承認する
    ///
    /// ステータス変更が失敗した場合は一覧を変更しない。通知の作成だけが失敗した場合は
    /// ステータス変更の反映は残したままエラーを返す。
    pub async fn approve(&mut self, expense_id: i64) -> AppResult<Expense> {
        let target = self.pending_approval(expense_id)?;
        let owner_id = self.owner_of(&target)?;

        let updated = match self
            .backend
            .approve_expense(expense_id, &owner_id, &self.user.wissen_id)
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                error!("経費の承認に失敗: expense_id={expense_id}, error={e}");
                return Err(self.fail(e));
            }
        };

        self.apply_status_change(&updated);
        self.notify(&target, StatusChangeNotice::approved(&target))
            .await?;
        Ok(updated)
    }

    /// 経費を却下する
    pub async fn reject(&mut self, expense_id: i64, reason: &str) -> AppResult<Expense> {
        let target = self.pending_approval(expense_id)?;
        let owner_id = self.owner_of(&target)?;
        let reason = reason.trim();

        let updated = match self
            .backend
            .reject_expense(expense_id, &owner_id, reason, &self.user.wissen_id)
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                error!("経費の却下に失敗: expense_id={expense_id}, error={e}");
                return Err(self.fail(e));
            }
        };

        self.apply_status_change(&updated);
        let notice = StatusChangeNotice::rejected(&target, reason, &self.user);
        self.notify(&target, notice).await?;
        Ok(updated)
    }

    fn pending_approval(&mut self, expense_id: i64) -> AppResult<Expense> {
        let target = self
            .approval_queue
            .iter()
            .find(|expense| expense.id == expense_id)
            .cloned();

        match target {
            Some(expense) if expense.is_pending() => Ok(expense),
            Some(expense) => Err(self.fail(AppError::validation(format!(
                "This expense has already been {}",
                expense.status.label().to_lowercase()
            )))),
            None => Err(self.fail(AppError::not_found(format!("Expense {expense_id}")))),
        }
    }

    fn owner_of(&mut self, expense: &Expense) -> AppResult<UserId> {
        match expense.owner_id() {
            Some(owner) => Ok(owner.clone()),
            None => Err(self.fail(AppError::decode(format!(
                "expense {} has no owner",
                expense.id
            )))),
        }
    }

    /// ステータスが変わった経費を承認待ち一覧と自分の一覧に反映する
    fn apply_status_change(&mut self, updated: &Expense) {
        reconcile_in_place(&mut self.approval_queue, Mutation::Replace(updated.clone()));
        reconcile_in_place(&mut self.expenses, Mutation::Replace(updated.clone()));
    }

    async fn notify(&mut self, target: &Expense, notice: StatusChangeNotice) -> AppResult<()> {
        let dto = notice
            .to_dto(target, &self.user.wissen_id)
            .map_err(|e| self.fail(e))?;

        if let Err(e) = self.backend.create_notification(&dto).await {
            error!("通知の作成に失敗: expense_id={}, error={e}", dto.expense_id);
            return Err(self.fail(e));
        }

        reconcile_in_place(
            &mut self.notifications,
            Mutation::Prepend(dto.to_local_notification(Utc::now())),
        );
        Ok(())
    }

    /// 新規申請フォームを開く
    pub fn new_expense_form(&self) -> ExpenseForm {
        ExpenseForm::new()
    }

    /// 自分の経費の編集フォームを開く
    pub fn edit_expense_form(&mut self, expense_id: i64) -> AppResult<ExpenseForm> {
        match self.expenses.iter().find(|expense| expense.id == expense_id) {
            Some(expense) => Ok(ExpenseForm::edit(expense)),
            None => Err(self.fail(AppError::not_found(format!("Expense {expense_id}")))),
        }
    }

    /// 確認待ちのフォームを確定し、作成または更新を送信する
    pub async fn submit_form(&mut self, form: &mut ExpenseForm) -> AppResult<Expense> {
        let mut created = None;
        let mut updated = None;
        form.confirm(
            |draft| created = Some(draft),
            |expense_id, draft| updated = Some((expense_id, draft)),
        )?;

        match (created, updated) {
            (Some(draft), _) => self.create_expense(draft).await,
            (None, Some((expense_id, draft))) => self.update_expense(expense_id, draft).await,
            (None, None) => Err(AppError::validation("There is nothing to confirm")),
        }
    }

    /// 経費を申請する
    pub async fn create_expense(&mut self, draft: ExpenseDraft) -> AppResult<Expense> {
        let receipt = self.resolve_receipt(&draft.receipt).await?;
        let dto = CreateExpenseDto {
            user_id: self.user.wissen_id.clone(),
            category: draft.category,
            amount: draft.amount,
            description: draft.description,
            receipt,
        };

        let created = self
            .backend
            .create_expense(&dto)
            .await
            .map_err(|e| self.fail(e))?;

        reconcile_in_place(&mut self.expenses, Mutation::Prepend(created.clone()));
        Ok(created)
    }

    /// 自分の経費を更新する
    pub async fn update_expense(
        &mut self,
        expense_id: i64,
        draft: ExpenseDraft,
    ) -> AppResult<Expense> {
        let receipt = self.resolve_receipt(&draft.receipt).await?;
        let dto = UpdateExpenseDto {
            expense: ExpenseChanges {
                category: draft.category,
                amount: draft.amount,
                description: draft.description,
                receipt,
                status: draft.status.unwrap_or(ExpenseStatus::Pending),
            },
        };

        let updated = self
            .backend
            .update_expense(expense_id, &self.user.wissen_id, &dto)
            .await
            .map_err(|e| self.fail(e))?;

        reconcile_in_place(&mut self.expenses, Mutation::Replace(updated.clone()));
        Ok(updated)
    }

    async fn resolve_receipt(&mut self, receipt: &ReceiptAttachment) -> AppResult<String> {
        match receipt {
            ReceiptAttachment::Existing(reference) => Ok(reference.clone()),
            ReceiptAttachment::Upload(file) => self
                .backend
                .upload_receipt(file)
                .await
                .map_err(|e| self.fail(e)),
        }
    }

    /// 削除の確認を開始する
    pub fn request_delete(&mut self, expense_id: i64) -> AppResult<()> {
        if !self.expenses.iter().any(|expense| expense.id == expense_id) {
            return Err(self.fail(AppError::not_found(format!("Expense {expense_id}"))));
        }
        self.pending_delete = Some(expense_id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    /// 確認済みの削除を実行する（失敗した場合は確認状態を残す）
    pub async fn confirm_delete(&mut self) -> AppResult<()> {
        let expense_id = self
            .pending_delete
            .ok_or_else(|| AppError::validation("There is nothing to delete"))?;

        if let Err(e) = self
            .backend
            .delete_expense(expense_id, &self.user.wissen_id)
            .await
        {
            error!("経費の削除に失敗: expense_id={expense_id}, error={e}");
            return Err(self.fail(e));
        }

        reconcile_in_place(&mut self.expenses, Mutation::Remove(expense_id));
        self.pending_delete = None;
        Ok(())
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn profile(&self) -> ProfileView {
        ProfileView::for_employee(&self.user)
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn approval_queue(&self) -> &[Expense] {
        &self.approval_queue
    }

    /// 直近の集約で取得に失敗した部下
    pub fn failed_reportees(&self) -> &[UserId] {
        &self.failed_reportees
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn filter(&self) -> &ExpenseFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ExpenseFilter) {
        self.filter = filter;
    }

    /// 絞り込み・並べ替えを適用した自分の経費
    pub fn filtered_expenses(&self) -> Vec<Expense> {
        self.filter.apply(&self.expenses)
    }

    pub fn tab(&self) -> DashboardTab {
        self.tab
    }

    pub fn available_tabs(&self) -> Vec<DashboardTab> {
        DashboardTab::available(self.user.is_manager)
    }

    pub fn set_tab(&mut self, tab: DashboardTab) -> AppResult<()> {
        if !self.available_tabs().contains(&tab) {
            return Err(AppError::validation("Only managers can approve requests"));
        }
        self.tab = tab;
        Ok(())
    }

    /// 現在のタブに表示する経費
    pub fn visible_expenses(&self) -> Vec<Expense> {
        match self.tab {
            DashboardTab::Requests => self.filtered_expenses(),
            DashboardTab::Approvals => self.approval_queue.clone(),
        }
    }

    /// ヘッダーに表示する最新の通知
    pub fn notification_preview(&self) -> &[Notification] {
        pagination::preview(&self.notifications)
    }

    pub fn notification_page(&self) -> &[Notification] {
        self.pager.visible(&self.notifications)
    }

    pub fn notification_page_number(&self) -> usize {
        self.pager.current(self.notifications.len())
    }

    pub fn notification_page_count(&self) -> usize {
        pagination::total_pages(self.notifications.len())
    }

    pub fn go_to_notification_page(&mut self, page: usize) -> usize {
        self.pager.go_to(page, self.notifications.len())
    }

    pub fn next_notification_page(&mut self) -> usize {
        self.pager.next(self.notifications.len())
    }

    pub fn previous_notification_page(&mut self) -> usize {
        self.pager.previous(self.notifications.len())
    }

    /// 画面に表示するエラー
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// 取得中の処理を取り消すためのトークン
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 画面を閉じる（以降に届いた取得結果は反映しない）
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    /// ログアウトする
    pub fn logout(&mut self) -> AppResult<()> {
        self.unmount();
        self.session.logout()
    }

    fn fail(&mut self, error: AppError) -> AppError {
        match error.severity() {
            ErrorSeverity::High => error!("{}", error.details()),
            ErrorSeverity::Medium => warn!("{}", error.details()),
            ErrorSeverity::Low => info!("{}", error.details()),
        }
        self.last_error = Some(error.user_message().to_string());
        error
    }
}
