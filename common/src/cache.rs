//! 最近记录缓存
//!
//! 按插入顺序保存最近 N 个不同的标识，超出容量时淘汰最早的一个。

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RecencyCache<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: PartialEq> RecencyCache<T> {
    /// 容量为 0 时不做任何去重
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn contains(&self, id: &T) -> bool {
        self.items.contains(id)
    }

    /// 追加到队尾；已存在时不改变顺序
    pub fn insert(&mut self, id: T) {
        if self.capacity == 0 || self.contains(&id) {
            return;
        }

        self.items.push_back(id);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    /// 检查并记录，返回该标识此前是否不在缓存中
    pub fn remember(&mut self, id: T) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.insert(id);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
