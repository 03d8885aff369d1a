use crate::domain::{self, LoanEvent, commands::UpdateLoanStatus, errors::TransitionError};
use crate::ports::BackendGateway;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::errors::{LoanAdminError, Result};
use super::loan_store::{LoanFilter, LoanStore, Notice, paginate};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// ストアはセッション単位で1つ。アンビエントなシングルトンは持たず、
/// 呼び出し側が明示的に渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub store: Arc<RwLock<LoanStore>>,
    pub gateway: Arc<dyn BackendGateway>,
}

/// スナップショット再取得の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// コミットされた件数
    pub loaded: usize,
    /// より新しい取得に追い越されて破棄された場合はtrue
    pub superseded: bool,
    /// 取得中に発生した非致命的な通知
    pub notices: Vec<Notice>,
}

/// 絞り込み・ページ切り出し後の貸出一覧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanPage {
    pub loans: Vec<LoanEvent>,
    /// 絞り込み後の総件数（ページ切り出し前）
    pub total: usize,
    pub page: i64,
    pub page_size: usize,
}

/// 貸出スナップショットをバックエンドから再取得する
///
/// 取得開始時に世代トークンを発行し、最新世代の結果のみをコミットする。
/// 新しい取得に追い越された結果は破棄される。
///
/// エラー設計：
/// - 空・null・配列以外のレスポンスは「データなし」として空集合をコミットし、
///   通知を1件記録する（エラーにしない）
/// - 輸送層の失敗は通知を記録し、直前のスナップショットを維持する
///
/// どちらの場合もこの関数はOkを返す。致命的な失敗は存在しない。
pub async fn refresh_loans(deps: &ServiceDependencies) -> RefreshOutcome {
    let token = deps.store.write().await.begin_load();

    match deps.gateway.fetch_loan_events().await {
        Ok(events) => {
            let count = events.len();
            let mut store = deps.store.write().await;
            let committed = store.commit(token, events);
            if !committed {
                tracing::info!("loan fetch superseded by a newer request, result discarded");
            }
            RefreshOutcome {
                loaded: if committed { count } else { 0 },
                superseded: !committed,
                notices: store.drain_notices(),
            }
        }
        Err(e) => {
            tracing::warn!("failed to fetch loan events: {}", e);
            let mut store = deps.store.write().await;
            store.record_fetch_failure(token, e.to_string());
            RefreshOutcome {
                loaded: 0,
                superseded: false,
                notices: store.drain_notices(),
            }
        }
    }
}

/// 貸出一覧を絞り込み・ページ切り出しして返す
///
/// スナップショットに対する純粋な導出。ネットワークアクセスは行わない。
pub async fn query_loans(
    deps: &ServiceDependencies,
    filter: &LoanFilter,
    page: i64,
    page_size: usize,
) -> LoanPage {
    let store = deps.store.read().await;
    let filtered = store.apply_filters(filter);
    let total = filtered.len();

    LoanPage {
        loans: paginate(&filtered, page, page_size),
        total,
        page,
        page_size,
    }
}

/// 貸出ステータスを更新する
///
/// ビジネスルール：
/// - 遷移はドメイン層の遷移表でネットワーク書き込みの前に検証される
/// - 終端状態（rejected, completed）からの変更は不可
/// - 成功時は`approved_at`が遷移時刻で更新される
///
/// 一貫性保証：
/// ローカルのスナップショットを楽観的に更新してからバックエンドに書き込む。
/// 書き込みが失敗した場合は更新前のエントリに巻き戻し、バックエンドとの
/// 乖離を防ぐ。リトライは行わない（失敗は1回だけ報告される）。
///
/// # 戻り値
/// 成功時は更新後のLoanEvent
pub async fn update_loan_status(
    deps: &ServiceDependencies,
    cmd: UpdateLoanStatus,
) -> Result<LoanEvent> {
    // 1. スナップショットから対象を取得し、遷移を検証
    let (updated, previous) = {
        let mut store = deps.store.write().await;
        let loan = store.get(cmd.event_id).ok_or(LoanAdminError::LoanNotFound)?;

        let updated = domain::loan::transition(loan, cmd.status, cmd.requested_at)
            .map_err(transition_error)?;

        // 2. 楽観的にローカルへ反映（置き換え前のエントリを保持）
        let previous = store
            .replace(updated.clone())
            .ok_or(LoanAdminError::LoanNotFound)?;
        (updated, previous)
    };

    // 3. バックエンドへ書き込み
    if let Err(e) = deps
        .gateway
        .update_event_status(cmd.event_id, cmd.status)
        .await
    {
        // 4. 失敗時は巻き戻し
        tracing::warn!(
            "status write for loan {} failed, rolling back local update: {}",
            cmd.event_id.value(),
            e
        );
        deps.store.write().await.replace(previous);
        return Err(LoanAdminError::GatewayError(e));
    }

    Ok(updated)
}

fn transition_error(err: TransitionError) -> LoanAdminError {
    match err {
        TransitionError::InvalidTransition { from, to } => {
            let from = from.map(|s| s.as_str()).unwrap_or("unknown");
            LoanAdminError::InvalidTransition(format!("{} -> {}", from, to.as_str()))
        }
        TransitionError::NoOpTransition { status } => {
            LoanAdminError::StatusUnchanged(status.as_str().to_string())
        }
    }
}
