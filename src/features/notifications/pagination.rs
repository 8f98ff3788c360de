/// コンパクト表示する通知の件数
pub const PREVIEW_SIZE: usize = 5;

/// 全件表示の1ページあたりの件数
pub const PAGE_SIZE: usize = 10;

/// コンパクト表示用に先頭の通知だけを返す
pub fn preview<T>(items: &[T]) -> &[T] {
    &items[..items.len().min(PREVIEW_SIZE)]
}

/// 総ページ数（0件なら0）
pub fn total_pages(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// 要求されたページ番号を`[1, max(total_pages, 1)]`に収める
pub fn clamp_page(page: usize, len: usize) -> usize {
    page.clamp(1, total_pages(len).max(1))
}

/// 指定ページの要素を返す（ページ番号は1始まり、範囲外は丸める）
pub fn page<T>(items: &[T], page: usize) -> &[T] {
    let page = clamp_page(page, items.len());
    let start = ((page - 1) * PAGE_SIZE).min(items.len());
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// 全件表示のページ位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPager {
    current: usize,
}

impl Default for NotificationPager {
    fn default() -> Self {
        Self { current: 1 }
    }
}

impl NotificationPager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 件数に対して有効な現在のページ
    pub fn current(&self, len: usize) -> usize {
        clamp_page(self.current, len)
    }

    pub fn go_to(&mut self, page: usize, len: usize) -> usize {
        self.current = clamp_page(page, len);
        self.current
    }

    pub fn next(&mut self, len: usize) -> usize {
        let current = self.current(len);
        self.go_to(current + 1, len)
    }

    pub fn previous(&mut self, len: usize) -> usize {
        let current = self.current(len);
        self.go_to(current.saturating_sub(1), len)
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.current(len) < total_pages(len)
    }

    pub fn has_previous(&self, len: usize) -> bool {
        self.current(len) > 1
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// 現在のページの要素を返す
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        page(items, self.current)
    }
}
