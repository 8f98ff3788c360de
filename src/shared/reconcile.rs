//! バックエンド呼び出し結果を画面側のコレクションに反映する
//!
//! 経費一覧・承認待ち一覧・通知一覧・ユーザー一覧は、変更系APIが成功した後に
//! すべてこの関数を通して更新する。

/// コレクション内で要素を識別するためのキー
pub trait Keyed {
    type Key: PartialEq;

    fn key(&self) -> Self::Key;
}

/// コレクションに適用する変更
pub enum Mutation<T: Keyed> {
    /// 先頭に追加（新しいものが先頭）
    Prepend(T),
    /// 同じキーの要素を置き換える（存在しなければ何もしない）
    Replace(T),
    /// 同じキーの要素を削除する
    Remove(T::Key),
}

/// 変更を適用した新しいコレクションを返す
///
/// 元のコレクションは変更しない
pub fn reconcile<T>(collection: &[T], mutation: Mutation<T>) -> Vec<T>
where
    T: Keyed + Clone,
{
    match mutation {
        Mutation::Prepend(item) => {
            let mut updated = Vec::with_capacity(collection.len() + 1);
            updated.push(item);
            updated.extend_from_slice(collection);
            updated
        }
        Mutation::Replace(item) => {
            let key = item.key();
            collection
                .iter()
                .map(|existing| {
                    if existing.key() == key {
                        item.clone()
                    } else {
                        existing.clone()
                    }
                })
                .collect()
        }
        Mutation::Remove(key) => collection
            .iter()
            .filter(|existing| existing.key() != key)
            .cloned()
            .collect(),
    }
}

/// 変更をその場で適用する
pub fn reconcile_in_place<T>(collection: &mut Vec<T>, mutation: Mutation<T>)
where
    T: Keyed + Clone,
{
    *collection = reconcile(collection, mutation);
}
