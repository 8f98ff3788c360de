//! セッションストアとセッションコンテキスト
//!
//! ログイン中のユーザーはJSONストアの`"user"`キーに保存される。
//! 画面側は`SessionContext`を受け取り、ログアウトは`SessionContext::logout`の
//! 一箇所だけで行う。
use crate::features::users::models::User;
use crate::shared::errors::{AppError, AppResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// ストア内でユーザーを保存するキー
pub const SESSION_USER_KEY: &str = "user";

/// ログインユーザーの永続化先
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> AppResult<Option<User>>;

    fn save(&self, user: &User) -> AppResult<()>;

    fn clear(&self) -> AppResult<()>;
}

/// JSONファイルをキーバリューストアとして使うセッションストレージ
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_store(&self) -> AppResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::session(format!(
                "セッションストアの形式が不正です: {:?}",
                self.path
            ))),
        }
    }

    fn write_store(&self, store: &Map<String, Value>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                log::info!("セッションストアのディレクトリを作成しました: {parent:?}");
            }
        }

        // 同じディレクトリの一時ファイルに書いてから置き換える
        let content = serde_json::to_string_pretty(store)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, content)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> AppResult<Option<User>> {
        let store = self.read_store()?;
        match store.get(SESSION_USER_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| AppError::session(format!("保存されたユーザーを読み込めません: {e}"))),
        }
    }

    fn save(&self, user: &User) -> AppResult<()> {
        // 壊れたストアは上書きする
        let mut store = self.read_store().unwrap_or_default();
        store.insert(SESSION_USER_KEY.to_string(), serde_json::to_value(user)?);
        self.write_store(&store)?;
        log::info!("セッションを保存しました: wissen_id={}", user.wissen_id);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        let mut store = match self.read_store() {
            Ok(store) => store,
            Err(e) => {
                log::warn!("セッションストアを読み込めないため初期化します: {e}");
                Map::new()
            }
        };
        store.remove(SESSION_USER_KEY);
        self.write_store(&store)?;
        log::info!("セッションを削除しました");
        Ok(())
    }
}

/// メモリ上だけに保持するセッションストレージ
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    user: Mutex<Option<User>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> AppResult<std::sync::MutexGuard<'_, Option<User>>> {
        self.user
            .lock()
            .map_err(|e| AppError::session(format!("セッションのロックに失敗しました: {e}")))
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> AppResult<Option<User>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, user: &User) -> AppResult<()> {
        *self.slot()? = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// ログイン状態を保持し、変更を購読者に通知する
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    current: Arc<watch::Sender<Option<User>>>,
}

impl SessionContext {
    /// ストレージから保存済みのセッションを復元する
    ///
    /// 読み込みに失敗した場合は未ログインとして扱う
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Self {
        let user = match storage.load() {
            Ok(user) => user,
            Err(e) => {
                log::warn!("保存されたセッションを復元できませんでした: {e}");
                None
            }
        };

        if let Some(user) = &user {
            log::info!("セッションを復元しました: wissen_id={}", user.wissen_id);
        }

        let (sender, _) = watch::channel(user);
        Self {
            storage,
            current: Arc::new(sender),
        }
    }

    /// 現在のユーザー
    pub fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .map(User::is_admin)
            .unwrap_or(false)
    }

    /// ログイン成功時にユーザーを保存し、購読者に通知する
    pub fn sign_in(&self, user: User) -> AppResult<()> {
        self.storage.save(&user)?;
        self.current.send_replace(Some(user));
        Ok(())
    }

    /// ログアウトする
    ///
    /// ストレージの削除に失敗してもメモリ上のセッションは破棄する
    pub fn logout(&self) -> AppResult<()> {
        let cleared = self.storage.clear();
        self.current.send_replace(None);
        log::info!("ログアウトしました");
        cleared
    }

    /// セッションの変更を購読する
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("current", &*self.current.borrow())
            .finish()
    }
}
