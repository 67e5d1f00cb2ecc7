/// 延迟加载字段
/// 记录从存储加载时的快照，只有当前值与快照不同时才需要写回
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    value: Option<T>,
    snapshot: Option<T>,
}

impl<T: Clone + PartialEq> Loaded<T> {
    /// 尚未加载
    pub fn unloaded() -> Self {
        Self {
            value: None,
            snapshot: None,
        }
    }

    /// 从存储加载，快照与当前值相同
    pub fn from_store(value: T) -> Self {
        Self {
            value: Some(value.clone()),
            snapshot: Some(value),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    /// 替换当前值，快照保持不变
    pub fn replace(&mut self, value: T) {
        self.value = Some(value);
    }

    /// 是否需要写回存储
    pub fn is_dirty(&self) -> bool {
        match (&self.value, &self.snapshot) {
            (Some(value), Some(snapshot)) => value != snapshot,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// 写回成功后更新快照
    pub fn commit(&mut self) {
        if let Some(value) = &self.value {
            self.snapshot = Some(value.clone());
        }
    }
}

impl<T: Clone + PartialEq> Default for Loaded<T> {
    fn default() -> Self {
        Self::unloaded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_is_never_dirty() {
        let field: Loaded<Vec<u8>> = Loaded::unloaded();
        assert!(!field.is_loaded());
        assert!(!field.is_dirty());
    }

    #[test]
    fn test_loaded_unmodified_is_clean() {
        let mut field = Loaded::from_store(vec![1, 2]);
        assert!(!field.is_dirty());

        // 写入相同的值不算修改
        field.replace(vec![1, 2]);
        assert!(!field.is_dirty());
    }

    #[test]
    fn test_replace_then_commit() {
        let mut field = Loaded::from_store(vec![1]);
        field.replace(vec![1, 2]);
        assert!(field.is_dirty());

        field.commit();
        assert!(!field.is_dirty());
        assert_eq!(field.get(), Some(&vec![1, 2]));
    }

    #[test]
    fn test_set_without_load_is_dirty() {
        let mut field: Loaded<Vec<u8>> = Loaded::unloaded();
        field.replace(Vec::new());
        assert!(field.is_dirty());
    }
}
